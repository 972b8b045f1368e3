//! [`LearningEngine`]: owns the session registry and runs learning passes.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use noema_concept::{ConceptGrowth, GraphHistory, GraphSnapshot};
use noema_core::config::{ConcurrencyMode, NoemaConfig};
use noema_core::constants::{KIND_CONCEPT_GRAPH, KIND_POLICY};
use noema_core::errors::{NoemaResult, VersionError};
use noema_core::models::{segment_windows, PolicyVersion, TraceEntry, VersionDocument, WeightTable};
use noema_core::traits::{IVersionRecorder, NoOpRecorder};
use noema_core::versioning::VersionId;
use noema_policy::{PolicyLedger, PolicyUpdater};

use crate::emitter::{self, LatestSummary, PassDocuments};
use crate::session::{Session, SessionRegistry, SessionState};

/// One batch of traces for one session.
///
/// Declared parents must match the session's current versions; `None` skips
/// the check for that lineage.
#[derive(Debug, Clone, Default)]
pub struct PassRequest {
    pub session_id: String,
    pub parent_policy_version: Option<VersionId>,
    pub parent_graph_version: Option<VersionId>,
    pub entries: Vec<TraceEntry>,
    /// Window dedup key: replaying a pass under the same key adds no tf/df.
    /// Without one, every pass counts as new windows.
    pub batch_key: Option<String>,
}

impl PassRequest {
    pub fn new(session_id: impl Into<String>, entries: Vec<TraceEntry>) -> Self {
        Self {
            session_id: session_id.into(),
            entries,
            ..Default::default()
        }
    }

    pub fn with_parents(mut self, policy: VersionId, graph: VersionId) -> Self {
        self.parent_policy_version = Some(policy);
        self.parent_graph_version = Some(graph);
        self
    }

    pub fn with_batch_key(mut self, key: impl Into<String>) -> Self {
        self.batch_key = Some(key.into());
        self
    }
}

/// What a committed pass produced.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub session_id: String,
    /// Current policy after the pass. The parent itself on a policy no-op.
    pub policy: Arc<PolicyVersion>,
    pub graph: Arc<GraphSnapshot>,
    pub documents: PassDocuments,
}

/// Current version ids of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeads {
    pub policy_version_id: VersionId,
    pub graph_version_id: VersionId,
}

/// Runs passes per session. Sessions are independent and may run in
/// parallel; within a session passes are serialized per [`ConcurrencyMode`].
pub struct LearningEngine {
    config: NoemaConfig,
    updater: PolicyUpdater,
    growth: ConceptGrowth,
    sessions: SessionRegistry,
    recorder: Arc<dyn IVersionRecorder>,
}

impl LearningEngine {
    pub fn new(config: NoemaConfig, recorder: Arc<dyn IVersionRecorder>) -> Self {
        Self {
            updater: PolicyUpdater::new(config.policy.clone()),
            growth: ConceptGrowth::from_config(&config),
            sessions: SessionRegistry::new(),
            recorder,
            config,
        }
    }

    pub fn config(&self) -> &NoemaConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Open `session_id` rooted at `initial_weights` and an empty graph.
    /// An existing session is returned unchanged.
    pub fn open_session(
        &self,
        session_id: &str,
        initial_weights: &WeightTable,
    ) -> NoemaResult<SessionHeads> {
        let session = self.sessions.get_or_create(session_id, || -> NoemaResult<SessionState> {
            Ok(SessionState {
                policy: PolicyLedger::genesis(initial_weights, &self.config.policy)?,
                graph: GraphHistory::new(
                    GraphSnapshot::genesis()?,
                    self.config.graph.max_retained_versions,
                ),
            })
        })?;
        let state = session.lock(ConcurrencyMode::Block)?;
        heads(&state)
    }

    pub fn remove_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Current version ids. Waits for an in-flight pass.
    pub fn heads(&self, session_id: &str) -> NoemaResult<SessionHeads> {
        let session = self.sessions.get(session_id)?;
        let state = session.lock(ConcurrencyMode::Block)?;
        heads(&state)
    }

    /// Run one pass: policy update, then graph growth fed with the policy's
    /// per-label rewards, then commit both.
    ///
    /// Lineage is checked for both parents before anything is computed. The
    /// new versions are built on copies and swapped in together, so a failed
    /// pass leaves the session untouched.
    pub fn run_pass(&self, request: PassRequest) -> NoemaResult<PassOutcome> {
        let _pass = crate::pass_span!(request.session_id, request.entries.len()).entered();
        let session = self.sessions.get(&request.session_id)?;
        let mut state = session.lock(self.config.session.concurrency)?;
        check_lineage(&state, &request)?;

        let policy_parent = state.policy.current()?;
        let graph_parent = state.graph.current()?;

        let policy = {
            let _span = crate::policy_span!(policy_parent.version_id).entered();
            self.updater.update(&policy_parent, &request.entries)?
        };
        let batch_key = request
            .batch_key
            .clone()
            .unwrap_or_else(|| pass_window_key(graph_parent.version_id()));
        let windows = segment_windows(
            &request.entries,
            &batch_key,
            self.config.miner.window_entries,
        );
        let graph = {
            let _span = crate::graph_span!(graph_parent.version_id(), windows.len()).entered();
            self.growth
                .grow(&graph_parent, &windows, &policy.label_rewards)?
        };
        let documents = PassDocuments::build(&policy, &graph);

        let policy_version = if policy.created {
            state.policy.commit(Arc::clone(&policy.version))?
        } else {
            policy.version
        };
        let graph_version = state.graph.commit(graph.snapshot)?;
        session.store_summary(LatestSummary::from(&documents))?;
        drop(state);

        info!(
            session = %request.session_id,
            policy = %policy_version.version_id,
            policy_created = documents.policy.created,
            graph = %graph_version.version_id(),
            updates = documents.policy.summary.updates,
            nodes = documents.graph_version.node_count,
            edges = documents.graph_version.edge_count,
            rules = documents.graph_version.rule_count,
            "learning pass committed"
        );
        self.record(documents.version_documents());

        Ok(PassOutcome {
            session_id: request.session_id,
            policy: policy_version,
            graph: graph_version,
            documents,
        })
    }

    /// Run independent passes in parallel. Results keep request order.
    /// Requests for the same session contend per [`ConcurrencyMode`].
    pub fn run_passes_parallel(&self, requests: Vec<PassRequest>) -> Vec<NoemaResult<PassOutcome>> {
        requests
            .into_par_iter()
            .map(|request| self.run_pass(request))
            .collect()
    }

    /// Summary stored by the last committed pass, read without recomputation.
    pub fn latest_summary(&self, session_id: &str) -> NoemaResult<Option<LatestSummary>> {
        Ok(self.sessions.get(session_id)?.latest_summary()?)
    }

    /// Move the policy pointer back to `version_id`. No new id is created.
    pub fn rollback_policy(
        &self,
        session_id: &str,
        version_id: &VersionId,
    ) -> NoemaResult<Arc<PolicyVersion>> {
        let _span = crate::rollback_span!(session_id, KIND_POLICY, version_id).entered();
        let session = self.sessions.get(session_id)?;
        let mut state = session.lock(self.config.session.concurrency)?;
        let version = state.policy.rollback_to(version_id)?;
        refresh_summary(&session, |summary| {
            summary.policy_version_id = version.version_id.clone();
            summary.avg_reward = version.summary.avg_reward;
            summary.updates = version.summary.updates;
            summary.confidence = version.summary.confidence;
            summary.delta_norm = version.summary.delta_norm;
        })?;
        Ok(version)
    }

    /// Move the graph pointer back to a retained snapshot.
    pub fn rollback_graph(
        &self,
        session_id: &str,
        version_id: &VersionId,
    ) -> NoemaResult<Arc<GraphSnapshot>> {
        let _span = crate::rollback_span!(session_id, KIND_CONCEPT_GRAPH, version_id).entered();
        let session = self.sessions.get(session_id)?;
        let mut state = session.lock(self.config.session.concurrency)?;
        let snapshot = state.graph.rollback_to(version_id)?;
        refresh_summary(&session, |summary| copy_graph_counts(summary, &snapshot))?;
        Ok(snapshot)
    }

    /// Merge concept node `absorbed` into `into` as a new graph version.
    pub fn merge_concepts(
        &self,
        session_id: &str,
        parent_graph_version: Option<&VersionId>,
        absorbed: &str,
        into: &str,
    ) -> NoemaResult<Arc<GraphSnapshot>> {
        let session = self.sessions.get(session_id)?;
        let mut state = session.lock(self.config.session.concurrency)?;
        if let Some(declared) = parent_graph_version {
            state.graph.check_parent(Some(declared))?;
        }
        let parent = state.graph.current()?;
        let merged = self.growth.merge(&parent, absorbed, into)?;
        let version_doc = emitter::graph_version(&merged.snapshot);
        let snapshot = state.graph.commit(merged.snapshot)?;
        refresh_summary(&session, |summary| copy_graph_counts(summary, &snapshot))?;
        drop(state);

        info!(
            session = %session_id,
            absorbed = %absorbed,
            into = %into,
            graph = %snapshot.version_id(),
            "concept nodes merged"
        );
        self.record(vec![VersionDocument::ConceptGraph {
            version: version_doc,
            updates: merged.updates,
        }]);
        Ok(snapshot)
    }

    fn record(&self, documents: Vec<VersionDocument>) {
        for doc in &documents {
            self.recorder.record_version(doc.kind(), doc);
        }
    }
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new(NoemaConfig::default(), Arc::new(NoOpRecorder))
    }
}

fn heads(state: &SessionState) -> NoemaResult<SessionHeads> {
    Ok(SessionHeads {
        policy_version_id: state.policy.current()?.version_id.clone(),
        graph_version_id: state.graph.current()?.version_id().clone(),
    })
}

/// Window key for a pass without a caller key. Unique per parent graph
/// version, and a committed pass always moves the graph off its parent.
fn pass_window_key(parent: &VersionId) -> String {
    format!("pass@{parent}")
}

fn check_lineage(state: &SessionState, request: &PassRequest) -> Result<(), VersionError> {
    let checks = [
        request
            .parent_policy_version
            .as_ref()
            .map(|declared| state.policy.check_parent(Some(declared))),
        request
            .parent_graph_version
            .as_ref()
            .map(|declared| state.graph.check_parent(Some(declared))),
    ];
    for result in checks.into_iter().flatten() {
        if let Err(err) = result {
            warn!(session = %request.session_id, error = %err, "pass rejected");
            return Err(err);
        }
    }
    Ok(())
}

fn refresh_summary(session: &Session, apply: impl FnOnce(&mut LatestSummary)) -> NoemaResult<()> {
    if let Some(mut summary) = session.latest_summary()? {
        apply(&mut summary);
        session.store_summary(summary)?;
    }
    Ok(())
}

fn copy_graph_counts(summary: &mut LatestSummary, snapshot: &GraphSnapshot) {
    summary.graph_version_id = snapshot.version_id().clone();
    summary.node_count = snapshot.version.node_count;
    summary.edge_count = snapshot.version.edge_count;
    summary.rule_count = snapshot.version.rule_count;
}
