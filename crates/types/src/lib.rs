//! Shared data model for the unimigrate migration sequencer.
//!
//! The sequencer crate consumes these types to build its reference graph, the CLI reads them from
//! registration manifests, and downstream executors receive [`MigrationStep`] records.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod descriptor;
pub mod step;
pub mod validation;

pub use descriptor::{
    ClusterDescriptor, ClusterPolicyDescriptor, DEFAULT_GRANT_CATALOG, GrantDescriptor, GrantSecurable, JobDescriptor, LibraryDescriptor,
    MigrationManifest, PipelineDescriptor, ReferenceFact, Registration, TableDescriptor, TaskDescriptor, schema_id,
};
pub use step::MigrationStep;
pub use validation::{IdentityError, validate_object_id};

/// Closed set of workspace object kinds tracked by the sequencer.
///
/// Serialized with the upper-case spelling used in migration reports (`"CLUSTER"`, `"CLUSTER_POLICY"`).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Job,
    Task,
    Cluster,
    ClusterPolicy,
    Pipeline,
    Library,
    Catalog,
    Schema,
    Table,
    Grant,
    Principal,
}

impl ObjectKind {
    /// Every kind, in declaration order.
    pub const ALL: [ObjectKind; 11] = [
        Self::Job,
        Self::Task,
        Self::Cluster,
        Self::ClusterPolicy,
        Self::Pipeline,
        Self::Library,
        Self::Catalog,
        Self::Schema,
        Self::Table,
        Self::Grant,
        Self::Principal,
    ];

    /// Report spelling of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "JOB",
            Self::Task => "TASK",
            Self::Cluster => "CLUSTER",
            Self::ClusterPolicy => "CLUSTER_POLICY",
            Self::Pipeline => "PIPELINE",
            Self::Library => "LIBRARY",
            Self::Catalog => "CATALOG",
            Self::Schema => "SCHEMA",
            Self::Table => "TABLE",
            Self::Grant => "GRANT",
            Self::Principal => "PRINCIPAL",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseObjectKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseObjectKindError(s.to_string()))
    }
}

/// Returned when a string does not name a known [`ObjectKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object kind: '{0}'")]
pub struct ParseObjectKindError(pub String);

/// Identity of a node in the migration graph: one object kind plus its id within that kind.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeKey {
    pub kind: ObjectKind,
    pub id: String,
}

impl NodeKey {
    /// Build a validated key. Empty or malformed ids are rejected.
    pub fn new(kind: ObjectKind, id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();
        validate_object_id(kind, &id)?;
        Ok(Self { kind, id })
    }

    /// Re-check a key that may have been built without going through [`NodeKey::new`],
    /// for example one deserialized from a manifest.
    pub fn validate(&self) -> Result<(), IdentityError> {
        validate_object_id(self.kind, &self.id)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
