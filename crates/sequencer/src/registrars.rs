//! One registration entry point per object kind.
//!
//! Registrars translate a descriptor into node and reference facts. Facts are collected into a
//! [`FactBatch`] and validated first, then written to the graph in one go, so a rejected
//! registration leaves the graph untouched. Within a batch, facts are applied in the order they
//! were described, which fixes discovery order and reference order.

use tracing::{debug, warn};
use unimigrate_types::validation::validate_component;
use unimigrate_types::{
    ClusterDescriptor, ClusterPolicyDescriptor, GrantDescriptor, GrantSecurable, IdentityError, JobDescriptor, NodeKey, ObjectKind,
    PipelineDescriptor, ReferenceFact, Registration, TableDescriptor, TaskDescriptor, schema_id,
};

use crate::error::SequencerError;
use crate::sequencer::MigrationSequencer;

enum Fact {
    Node { key: NodeKey, name: Option<String> },
    Reference { from: NodeKey, to: NodeKey },
}

/// Validated facts pending application.
#[derive(Default)]
struct FactBatch {
    facts: Vec<Fact>,
}

impl FactBatch {
    fn node(&mut self, kind: ObjectKind, id: impl Into<String>, name: Option<&str>) -> Result<NodeKey, IdentityError> {
        let key = NodeKey::new(kind, id)?;
        self.facts.push(Fact::Node {
            key: key.clone(),
            name: name.map(str::to_string),
        });
        Ok(key)
    }

    fn reference(&mut self, from: &NodeKey, to: &NodeKey) {
        self.facts.push(Fact::Reference {
            from: from.clone(),
            to: to.clone(),
        });
    }
}

impl MigrationSequencer {
    fn apply(&mut self, batch: FactBatch) -> Result<(), SequencerError> {
        let nodes_before = self.graph.len();
        let mut new_edges = 0usize;
        for fact in batch.facts {
            match fact {
                Fact::Node { key, name } => {
                    self.graph.ensure_node(key, name.as_deref());
                }
                Fact::Reference { from, to } => {
                    let from = self.graph.ensure_node(from, None);
                    let to = self.graph.ensure_node(to, None);
                    if self.graph.add_reference(from, to)? {
                        new_edges += 1;
                    }
                }
            }
        }
        debug!(new_nodes = self.graph.len() - nodes_before, new_edges, "Applied registration facts");
        Ok(())
    }

    /// Register a job and every task it declares.
    ///
    /// The job is discovered first; each task follows in declaration order together with the
    /// objects it references.
    pub fn register_workflow_job(&mut self, job: &JobDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        let job_key = batch.node(ObjectKind::Job, job.job_id.as_str(), job.name.as_deref())?;
        for task in &job.tasks {
            describe_task(&mut batch, &job_key, job, task)?;
        }
        debug!(job_id = %job.job_id, tasks = job.tasks.len(), "Registering workflow job");
        self.apply(batch)
    }

    /// Register a single task of `job`. Sibling tasks listed in `job` are not registered.
    pub fn register_workflow_task(&mut self, task: &TaskDescriptor, job: &JobDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        let job_key = batch.node(ObjectKind::Job, job.job_id.as_str(), job.name.as_deref())?;
        describe_task(&mut batch, &job_key, job, task)?;
        debug!(job_id = %job.job_id, task_key = %task.task_key, "Registering workflow task");
        self.apply(batch)
    }

    pub fn register_cluster(&mut self, cluster: &ClusterDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        let cluster_key = batch.node(ObjectKind::Cluster, cluster.cluster_id.as_str(), cluster.cluster_name.as_deref())?;
        if let Some(policy_id) = &cluster.policy_id {
            let policy_key = batch.node(ObjectKind::ClusterPolicy, policy_id.as_str(), None)?;
            batch.reference(&cluster_key, &policy_key);
        }
        debug!(cluster_id = %cluster.cluster_id, "Registering cluster");
        self.apply(batch)
    }

    pub fn register_cluster_policy(&mut self, policy: &ClusterPolicyDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        batch.node(ObjectKind::ClusterPolicy, policy.policy_id.as_str(), policy.name.as_deref())?;
        debug!(policy_id = %policy.policy_id, "Registering cluster policy");
        self.apply(batch)
    }

    /// Register a pipeline and the catalog or schema it will be cloned into.
    pub fn register_pipeline(&mut self, pipeline: &PipelineDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        let pipeline_key = batch.node(ObjectKind::Pipeline, pipeline.pipeline_id.as_str(), pipeline.name.as_deref())?;
        match (&pipeline.target_catalog, &pipeline.target_schema) {
            (Some(catalog), Some(schema)) => {
                let schema_key = describe_schema(&mut batch, catalog, schema)?;
                batch.reference(&pipeline_key, &schema_key);
            }
            (Some(catalog), None) => {
                let catalog_key = batch.node(ObjectKind::Catalog, catalog.as_str(), Some(catalog.as_str()))?;
                batch.reference(&pipeline_key, &catalog_key);
            }
            (None, Some(schema)) => {
                warn!(pipeline_id = %pipeline.pipeline_id, schema = %schema, "Ignoring pipeline target schema without a target catalog");
            }
            (None, None) => {}
        }
        if let Some(policy_id) = &pipeline.cluster_policy_id {
            let policy_key = batch.node(ObjectKind::ClusterPolicy, policy_id.as_str(), None)?;
            batch.reference(&pipeline_key, &policy_key);
        }
        debug!(pipeline_id = %pipeline.pipeline_id, "Registering pipeline");
        self.apply(batch)
    }

    /// Register a table along with the schema and catalog that own it.
    pub fn register_table(&mut self, table: &TableDescriptor) -> Result<(), SequencerError> {
        let mut batch = FactBatch::default();
        describe_table(&mut batch, table)?;
        debug!(table = %table.full_name(), "Registering table");
        self.apply(batch)
    }

    /// Register a grant. The grant references its securable first, then its principal.
    pub fn register_grant(&mut self, grant: &GrantDescriptor) -> Result<(), SequencerError> {
        validate_component(ObjectKind::Grant, "action type", &grant.action_type)?;
        let grant_id = grant.grant_id()?;
        let securable = grant.securable()?;
        let label = format!("{} on {}", grant.action_type, securable.node_key());
        let mut batch = FactBatch::default();
        let grant_key = batch.node(ObjectKind::Grant, grant_id, Some(label.as_str()))?;
        let securable_key = match securable {
            GrantSecurable::Catalog(catalog) => batch.node(ObjectKind::Catalog, catalog.as_str(), Some(catalog.as_str()))?,
            GrantSecurable::Schema { catalog, schema } => describe_schema(&mut batch, &catalog, &schema)?,
            GrantSecurable::Table(table) => describe_table(&mut batch, &table)?,
        };
        batch.reference(&grant_key, &securable_key);
        let principal_key = batch.node(ObjectKind::Principal, grant.principal.as_str(), Some(grant.principal.as_str()))?;
        batch.reference(&grant_key, &principal_key);
        debug!(grant = %grant_key.id, "Registering grant");
        self.apply(batch)
    }

    /// Register a reference discovered by code or dependency analysis.
    ///
    /// Neither end needs to be registered yet; unknown ends become placeholders.
    pub fn register_reference(&mut self, fact: &ReferenceFact) -> Result<(), SequencerError> {
        fact.from.validate()?;
        fact.to.validate()?;
        let mut batch = FactBatch::default();
        batch.reference(&fact.from, &fact.to);
        debug!(from = %fact.from, to = %fact.to, "Registering analyzed reference");
        self.apply(batch)
    }

    /// Dispatch a tagged registration to its registrar.
    pub fn register(&mut self, registration: &Registration) -> Result<(), SequencerError> {
        match registration {
            Registration::Job(job) => self.register_workflow_job(job),
            Registration::Task { job, task } => self.register_workflow_task(task, job),
            Registration::Cluster(cluster) => self.register_cluster(cluster),
            Registration::ClusterPolicy(policy) => self.register_cluster_policy(policy),
            Registration::Pipeline(pipeline) => self.register_pipeline(pipeline),
            Registration::Table(table) => self.register_table(table),
            Registration::Grant(grant) => self.register_grant(grant),
            Registration::Reference(fact) => self.register_reference(fact),
        }
    }

    /// Apply registrations in order, stopping at the first failure.
    ///
    /// Registrations before the failing one stay applied.
    pub fn register_all<'a>(&mut self, registrations: impl IntoIterator<Item = &'a Registration>) -> Result<(), SequencerError> {
        for (index, registration) in registrations.into_iter().enumerate() {
            self.register(registration)
                .map_err(|error| SequencerError::at_registration(index, registration.object_kind(), error))?;
        }
        Ok(())
    }
}

/// Task references, in order: owning job, pinned cluster, pipeline, libraries, upstream tasks.
fn describe_task(batch: &mut FactBatch, job_key: &NodeKey, job: &JobDescriptor, task: &TaskDescriptor) -> Result<(), IdentityError> {
    validate_component(ObjectKind::Task, "task key", &task.task_key)?;
    let task_key = batch.node(ObjectKind::Task, job.task_id(&task.task_key), Some(task.task_key.as_str()))?;
    batch.reference(job_key, &task_key);
    batch.reference(&task_key, job_key);

    if let Some(cluster_id) = &task.existing_cluster_id {
        let cluster_key = batch.node(ObjectKind::Cluster, cluster_id.as_str(), None)?;
        batch.reference(&task_key, &cluster_key);
    }
    if let Some(pipeline_id) = &task.pipeline_id {
        let pipeline_key = batch.node(ObjectKind::Pipeline, pipeline_id.as_str(), None)?;
        batch.reference(&task_key, &pipeline_key);
    }
    for library in &task.libraries {
        validate_component(ObjectKind::Library, "location", library.location())?;
        let library_key = batch.node(ObjectKind::Library, library.library_id(), Some(library.location()))?;
        batch.reference(&task_key, &library_key);
    }
    for upstream in &task.depends_on {
        validate_component(ObjectKind::Task, "upstream task key", upstream)?;
        let upstream_key = batch.node(ObjectKind::Task, job.task_id(upstream), None)?;
        batch.reference(&task_key, &upstream_key);
    }
    Ok(())
}

fn describe_schema(batch: &mut FactBatch, catalog: &str, schema: &str) -> Result<NodeKey, IdentityError> {
    validate_component(ObjectKind::Schema, "catalog", catalog)?;
    validate_component(ObjectKind::Schema, "schema", schema)?;
    let schema_key = batch.node(ObjectKind::Schema, schema_id(catalog, schema), Some(schema))?;
    let catalog_key = batch.node(ObjectKind::Catalog, catalog, Some(catalog))?;
    batch.reference(&schema_key, &catalog_key);
    Ok(schema_key)
}

fn describe_table(batch: &mut FactBatch, table: &TableDescriptor) -> Result<NodeKey, IdentityError> {
    validate_component(ObjectKind::Table, "catalog", &table.catalog)?;
    validate_component(ObjectKind::Table, "schema", &table.schema)?;
    validate_component(ObjectKind::Table, "table", &table.name)?;
    let table_key = batch.node(ObjectKind::Table, table.full_name(), Some(table.name.as_str()))?;
    let schema_key = describe_schema(batch, &table.catalog, &table.schema)?;
    batch.reference(&table_key, &schema_key);
    Ok(table_key)
}
