//! Identity validation shared by every registrar.
//!
//! Node identities key the sequencer's registry, so a blank or malformed id would silently merge
//! unrelated objects. These checks run before any node or edge is written.

use thiserror::Error;

use crate::ObjectKind;

/// Raised when a registrar receives an identity that cannot key the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("{kind} id must not be empty")]
    Empty { kind: ObjectKind },

    #[error("{kind} id '{id}' contains control characters")]
    ControlCharacter { kind: ObjectKind, id: String },

    #[error("{kind} identity is missing its {component} component")]
    MissingComponent { kind: ObjectKind, component: &'static str },

    #[error("grant of {action_type} to '{principal}' does not name a catalog, database, table, or view")]
    MissingSecurable { principal: String, action_type: String },
}

impl IdentityError {
    /// Create an empty-id error.
    pub fn empty(kind: ObjectKind) -> Self {
        Self::Empty { kind }
    }

    /// Create a missing-component error for multi-part identities such as `catalog.schema.table`.
    pub fn missing_component(kind: ObjectKind, component: &'static str) -> Self {
        Self::MissingComponent { kind, component }
    }

    /// Create an error for a grant that has nothing to grant on.
    pub fn missing_securable(principal: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self::MissingSecurable {
            principal: principal.into(),
            action_type: action_type.into(),
        }
    }
}

/// Validate an object id for the given kind.
///
/// An id must contain at least one non-whitespace character and no control characters.
/// Surrounding whitespace is preserved; ids are compared exactly as supplied.
pub fn validate_object_id(kind: ObjectKind, id: &str) -> Result<(), IdentityError> {
    if id.trim().is_empty() {
        return Err(IdentityError::empty(kind));
    }
    if id.chars().any(char::is_control) {
        return Err(IdentityError::ControlCharacter { kind, id: id.to_string() });
    }
    Ok(())
}

/// Validate one component of a composite identity (for example the schema part of a table name).
pub fn validate_component(kind: ObjectKind, component: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::missing_component(kind, component));
    }
    validate_object_id(kind, value)
}
