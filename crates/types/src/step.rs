use serde::{Deserialize, Serialize};

use crate::{NodeKey, ObjectKind};

/// One entry of a migration plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStep {
    /// Position of the object in the plan, starting at 1 with no gaps.
    ///
    /// This is discovery order: an object is numbered when the planner first reaches it, and the
    /// objects it references are numbered after it. It is not a dependencies-first execution order,
    /// so executors that need referenced objects migrated first must walk `referenced_steps`.
    pub step_number: u32,
    pub object_type: ObjectKind,
    pub object_id: String,
    /// Display name, absent for objects that were only ever referenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    /// Step numbers of the objects this one references, in the order the references were recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_steps: Vec<u32>,
}

impl MigrationStep {
    /// Identity of the object this step migrates.
    pub fn node_key(&self) -> NodeKey {
        NodeKey {
            kind: self.object_type,
            id: self.object_id.clone(),
        }
    }

    /// Display name, falling back to the object id.
    pub fn display_name(&self) -> &str {
        self.object_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.object_id)
    }
}
