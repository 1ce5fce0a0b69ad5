//! Kind-specific descriptors accepted by the sequencer's registrars.
//!
//! Each descriptor carries only the attributes that determine a node's identity, its display
//! name, and the references it implies. Everything else about a workspace object belongs to the
//! inventory that produced the descriptor.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{IdentityError, NodeKey, ObjectKind};

/// Catalog assumed for hive-style grants that only name a database or table.
pub const DEFAULT_GRANT_CATALOG: &str = "hive_metastore";

/// A workflow job and the tasks it declares, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Job id. Manifests may spell it as a number or a string.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub job_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
}

impl JobDescriptor {
    pub fn new(job_id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            job_id: job_id.into(),
            name,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: TaskDescriptor) -> Self {
        self.tasks.push(task);
        self
    }

    /// Id of the task node for `task_key` within this job (`"{job_id}/{task_key}"`).
    pub fn task_id(&self, task_key: &str) -> String {
        format!("{}/{}", self.job_id, task_key)
    }
}

/// One task inside a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub task_key: String,
    /// Fixed all-purpose cluster the task is pinned to.
    #[serde(default)]
    pub existing_cluster_id: Option<String>,
    /// Pipeline triggered by a pipeline task.
    #[serde(default)]
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryDescriptor>,
    /// Keys of upstream tasks in the same job.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl TaskDescriptor {
    pub fn new(task_key: impl Into<String>) -> Self {
        Self {
            task_key: task_key.into(),
            ..Self::default()
        }
    }

    pub fn on_cluster(mut self, cluster_id: impl Into<String>) -> Self {
        self.existing_cluster_id = Some(cluster_id.into());
        self
    }

    pub fn running_pipeline(mut self, pipeline_id: impl Into<String>) -> Self {
        self.pipeline_id = Some(pipeline_id.into());
        self
    }

    pub fn with_library(mut self, library: LibraryDescriptor) -> Self {
        self.libraries.push(library);
        self
    }

    pub fn after(mut self, upstream_task_key: impl Into<String>) -> Self {
        self.depends_on.push(upstream_task_key.into());
        self
    }
}

/// A library attached to a task. The identity is its location or package coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryDescriptor {
    Jar(String),
    Whl(String),
    Egg(String),
    Requirements(String),
    Pypi { package: String },
    Maven { coordinates: String },
}

impl LibraryDescriptor {
    /// Library node id, prefixed by the library type so a wheel and a jar at the same path stay distinct.
    pub fn library_id(&self) -> String {
        match self {
            Self::Jar(path) => format!("jar:{path}"),
            Self::Whl(path) => format!("whl:{path}"),
            Self::Egg(path) => format!("egg:{path}"),
            Self::Requirements(path) => format!("requirements:{path}"),
            Self::Pypi { package } => format!("pypi:{package}"),
            Self::Maven { coordinates } => format!("maven:{coordinates}"),
        }
    }

    /// Location or coordinates without the type prefix.
    pub fn location(&self) -> &str {
        match self {
            Self::Jar(path) | Self::Whl(path) | Self::Egg(path) | Self::Requirements(path) => path,
            Self::Pypi { package } => package,
            Self::Maven { coordinates } => coordinates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub policy_id: Option<String>,
}

impl ClusterDescriptor {
    pub fn new(cluster_id: impl Into<String>, cluster_name: Option<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            cluster_name,
            policy_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPolicyDescriptor {
    pub policy_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A pipeline and the Unity Catalog destination it will be cloned into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub pipeline_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_catalog: Option<String>,
    /// Only meaningful together with `target_catalog`.
    #[serde(default)]
    pub target_schema: Option<String>,
    #[serde(default)]
    pub cluster_policy_id: Option<String>,
}

impl PipelineDescriptor {
    pub fn new(pipeline_id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            name,
            ..Self::default()
        }
    }

    pub fn targeting(mut self, catalog: impl Into<String>, schema: Option<String>) -> Self {
        self.target_catalog = Some(catalog.into());
        self.target_schema = schema;
        self
    }
}

/// A three-level table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub catalog: String,
    pub schema: String,
    pub name: String,
}

impl TableDescriptor {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// `catalog.schema.name`
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, self.name)
    }

    /// `catalog.schema`
    pub fn schema_id(&self) -> String {
        schema_id(&self.catalog, &self.schema)
    }
}

/// Id of a schema node (`catalog.schema`).
pub fn schema_id(catalog: &str, schema: &str) -> String {
    format!("{catalog}.{schema}")
}

/// A privilege granted to a principal on a catalog, database, table, or view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDescriptor {
    pub principal: String,
    pub action_type: String,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
}

/// The object a grant applies to, resolved from the most specific field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantSecurable {
    Catalog(String),
    Schema { catalog: String, schema: String },
    Table(TableDescriptor),
}

impl GrantSecurable {
    pub fn node_key(&self) -> NodeKey {
        match self {
            Self::Catalog(catalog) => NodeKey {
                kind: ObjectKind::Catalog,
                id: catalog.clone(),
            },
            Self::Schema { catalog, schema } => NodeKey {
                kind: ObjectKind::Schema,
                id: schema_id(catalog, schema),
            },
            Self::Table(table) => NodeKey {
                kind: ObjectKind::Table,
                id: table.full_name(),
            },
        }
    }
}

impl GrantDescriptor {
    pub fn new(principal: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            action_type: action_type.into(),
            ..Self::default()
        }
    }

    /// Resolve the securable: a view or table beats a database, which beats a catalog.
    pub fn securable(&self) -> Result<GrantSecurable, IdentityError> {
        let catalog = self.catalog.clone().unwrap_or_else(|| DEFAULT_GRANT_CATALOG.to_string());
        let relation = self.view.as_ref().or(self.table.as_ref());
        match (&self.database, relation) {
            (Some(database), Some(relation)) => Ok(GrantSecurable::Table(TableDescriptor::new(catalog, database, relation))),
            (None, Some(_)) => Err(IdentityError::missing_component(ObjectKind::Table, "database")),
            (Some(database), None) => Ok(GrantSecurable::Schema {
                catalog,
                schema: database.clone(),
            }),
            (None, None) => match &self.catalog {
                Some(catalog) => Ok(GrantSecurable::Catalog(catalog.clone())),
                None => Err(IdentityError::missing_securable(&self.principal, &self.action_type)),
            },
        }
    }

    /// Grant node id: `"{principal}:{action_type}:{securable}"`.
    pub fn grant_id(&self) -> Result<String, IdentityError> {
        let securable = self.securable()?.node_key();
        Ok(format!("{}:{}:{}", self.principal, self.action_type, securable))
    }
}

/// A raw reference discovered by code or dependency analysis (for example a notebook reading a table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFact {
    pub from: NodeKey,
    pub to: NodeKey,
}

/// One registrar invocation, tagged by kind.
///
/// Manifests hold a list of these; the sequencer applies them in list order, which fixes the
/// discovery order of the nodes they introduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registration {
    Job(JobDescriptor),
    Task { job: JobDescriptor, task: TaskDescriptor },
    Cluster(ClusterDescriptor),
    ClusterPolicy(ClusterPolicyDescriptor),
    Pipeline(PipelineDescriptor),
    Table(TableDescriptor),
    Grant(GrantDescriptor),
    Reference(ReferenceFact),
}

impl Registration {
    /// Kind of the primary object this registration introduces.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Job(_) => ObjectKind::Job,
            Self::Task { .. } => ObjectKind::Task,
            Self::Cluster(_) => ObjectKind::Cluster,
            Self::ClusterPolicy(_) => ObjectKind::ClusterPolicy,
            Self::Pipeline(_) => ObjectKind::Pipeline,
            Self::Table(_) => ObjectKind::Table,
            Self::Grant(_) => ObjectKind::Grant,
            Self::Reference(fact) => fact.from.kind,
        }
    }
}

/// A registration pass as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationManifest {
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Unsigned(number) => number.to_string(),
        RawId::Signed(number) => number.to_string(),
    })
}
