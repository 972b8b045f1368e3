//! GraphHistory: retained graph snapshots with a current pointer.

use std::sync::Arc;

use tracing::info;

use noema_core::constants::KIND_CONCEPT_GRAPH;
use noema_core::errors::{NoemaResult, VersionError};
use noema_core::versioning::{VersionId, VersionStore};

use crate::graph::GraphSnapshot;

#[derive(Debug)]
pub struct GraphHistory {
    store: VersionStore<GraphSnapshot>,
}

impl GraphHistory {
    pub fn new(root: GraphSnapshot, capacity: usize) -> Self {
        Self {
            store: VersionStore::with_root(KIND_CONCEPT_GRAPH, capacity, root),
        }
    }

    pub fn current(&self) -> NoemaResult<Arc<GraphSnapshot>> {
        self.store.current().ok_or_else(|| {
            VersionError::UnknownVersion {
                kind: KIND_CONCEPT_GRAPH.to_string(),
                version_id: "<current>".to_string(),
            }
            .into()
        })
    }

    pub fn current_id(&self) -> Option<&VersionId> {
        self.store.current_id()
    }

    pub fn get(&self, id: &VersionId) -> Option<Arc<GraphSnapshot>> {
        self.store.get(id)
    }

    pub fn retained(&self) -> usize {
        self.store.len()
    }

    pub fn check_parent(&self, declared: Option<&VersionId>) -> Result<(), VersionError> {
        self.store.check_parent(declared)
    }

    pub fn commit(&mut self, snapshot: GraphSnapshot) -> NoemaResult<Arc<GraphSnapshot>> {
        Ok(self.store.commit(snapshot)?)
    }

    /// Point back at a retained snapshot. Graph bodies are not rebuilt once
    /// evicted, so an evicted id is unrecoverable.
    pub fn rollback_to(&mut self, id: &VersionId) -> NoemaResult<Arc<GraphSnapshot>> {
        if self.store.get(id).is_none() && self.store.is_known(id) {
            return Err(VersionError::Unrecoverable {
                kind: KIND_CONCEPT_GRAPH.to_string(),
                version_id: id.to_string(),
                reason: "snapshot was evicted from history".to_string(),
            }
            .into());
        }
        let snapshot = self.store.promote(id)?;
        info!(version = %id, "concept graph rolled back");
        Ok(snapshot)
    }
}
