//! # Unimigrate Sequencer
//!
//! Orders interdependent workspace objects (jobs, tasks, clusters, pipelines, tables, grants)
//! into migration steps.
//!
//! Callers feed facts through the type-specific registrars on [`MigrationSequencer`], in any
//! order and over as many passes as they like, then ask for the ordered steps:
//!
//! ```rust
//! use unimigrate_sequencer::MigrationSequencer;
//! use unimigrate_types::{JobDescriptor, ObjectKind, TaskDescriptor};
//!
//! let task = TaskDescriptor::new("test-task").on_cluster("cluster-123");
//! let job = JobDescriptor::new("1234", Some("test-job".into())).with_task(task.clone());
//!
//! let mut sequencer = MigrationSequencer::new();
//! sequencer.register_workflow_task(&task, &job)?;
//!
//! let steps = sequencer.generate_steps()?;
//! assert_eq!(steps.len(), 3);
//! assert_eq!(steps[2].object_type, ObjectKind::Cluster);
//! # Ok::<(), unimigrate_sequencer::SequencerError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`graph`**: node registry and edge store
//! - **`registrars`**: one entry point per object kind, all built on `ensure_node`/`add_reference`
//! - **`linearize`**: pre-order step numbering that survives repeated planning passes
//! - **`manifest`**: YAML/JSON registration manifests

pub mod error;
pub mod graph;
mod linearize;
pub mod manifest;
mod registrars;
pub mod sequencer;

pub use error::{ManifestError, SequencerError};
pub use graph::{MigrationGraph, Node, NodeRef};
pub use manifest::load_manifest;
pub use sequencer::MigrationSequencer;
