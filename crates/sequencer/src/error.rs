//! Error types for graph registration and manifest loading.

use std::path::PathBuf;

use thiserror::Error;
use unimigrate_types::{IdentityError, ObjectKind};

use crate::graph::NodeRef;

/// Errors raised while registering objects with the sequencer.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("invalid identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("node handle #{sequence} does not belong to this sequencer")]
    UnknownNode { sequence: usize },

    #[error("plan exceeds the maximum of {} steps", u32::MAX)]
    StepLimitExceeded,

    #[error("registration #{index} ({kind}) failed: {source}")]
    Registration {
        index: usize,
        kind: ObjectKind,
        #[source]
        source: Box<SequencerError>,
    },
}

impl SequencerError {
    /// Create an error for a handle that was not issued by this sequencer.
    pub fn unknown_node(node: NodeRef) -> Self {
        Self::UnknownNode {
            sequence: node.discovery_sequence(),
        }
    }

    /// Wrap an error with the position of the registration that produced it.
    pub fn at_registration(index: usize, kind: ObjectKind, source: SequencerError) -> Self {
        Self::Registration {
            index,
            kind,
            source: Box::new(source),
        }
    }
}

/// Errors raised while reading a registration manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON manifest {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML manifest {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
