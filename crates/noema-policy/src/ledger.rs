//! PolicyLedger: bounded policy history with a current pointer and rollback.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use noema_core::config::PolicyConfig;
use noema_core::constants::KIND_POLICY;
use noema_core::errors::{NoemaResult, VersionError};
use noema_core::models::{PolicySummary, PolicyVersion, WeightTable};
use noema_core::versioning::{VersionId, VersionStore};

#[derive(Debug)]
pub struct PolicyLedger {
    store: VersionStore<PolicyVersion>,
}

impl PolicyLedger {
    /// A ledger rooted at a genesis version built from `weights`.
    pub fn genesis(weights: &WeightTable, config: &PolicyConfig) -> NoemaResult<Self> {
        let root = PolicyVersion::genesis(weights, config.precision)?;
        Ok(Self::with_root(root, config.max_retained_versions))
    }

    pub fn with_root(root: PolicyVersion, capacity: usize) -> Self {
        Self {
            store: VersionStore::with_root(KIND_POLICY, capacity, root),
        }
    }

    /// The version the next update must build on.
    pub fn current(&self) -> NoemaResult<Arc<PolicyVersion>> {
        self.store.current().ok_or_else(|| {
            VersionError::UnknownVersion {
                kind: KIND_POLICY.to_string(),
                version_id: "<current>".to_string(),
            }
            .into()
        })
    }

    pub fn current_id(&self) -> Option<&VersionId> {
        self.store.current_id()
    }

    pub fn get(&self, id: &VersionId) -> Option<Arc<PolicyVersion>> {
        self.store.get(id)
    }

    pub fn is_known(&self, id: &VersionId) -> bool {
        self.store.is_known(id)
    }

    pub fn retained(&self) -> usize {
        self.store.len()
    }

    pub fn check_parent(&self, declared: Option<&VersionId>) -> Result<(), VersionError> {
        self.store.check_parent(declared)
    }

    /// Append a freshly created version. Its parent must be the current pointer.
    pub fn commit(&mut self, version: Arc<PolicyVersion>) -> NoemaResult<Arc<PolicyVersion>> {
        Ok(self.store.commit(version)?)
    }

    /// Move the current pointer back to `id`.
    ///
    /// Retained versions are promoted directly. An evicted version is rebuilt
    /// from the rollback payload of a retained child and must hash back to `id`.
    /// No new version id is created either way.
    pub fn rollback_to(&mut self, id: &VersionId) -> NoemaResult<Arc<PolicyVersion>> {
        if self.store.get(id).is_some() {
            let version = self.store.promote(id)?;
            info!(version = %id, "policy rolled back");
            return Ok(version);
        }
        if !self.store.is_known(id) {
            return Err(VersionError::UnknownVersion {
                kind: KIND_POLICY.to_string(),
                version_id: id.to_string(),
            }
            .into());
        }

        let rebuilt = self.reconstruct(id)?;
        self.store.restore(rebuilt)?;
        let version = self.store.promote(id)?;
        info!(version = %id, "policy rolled back from reconstructed snapshot");
        Ok(version)
    }

    fn reconstruct(&self, id: &VersionId) -> NoemaResult<PolicyVersion> {
        let parent = self.store.parent_of(id).flatten().cloned();
        let unrecoverable = |reason: &str| VersionError::Unrecoverable {
            kind: KIND_POLICY.to_string(),
            version_id: id.to_string(),
            reason: reason.to_string(),
        };

        let weights = self
            .store
            .retained_children(id)
            .into_iter()
            .find_map(|child| child.rollback.clone())
            .ok_or_else(|| unrecoverable("no retained child carries a rollback payload"))?;

        if PolicyVersion::derive_id(&weights, parent.as_ref())? != *id {
            return Err(unrecoverable("rollback payload does not hash to the requested id").into());
        }

        // The summary of an evicted version is not recoverable from its child.
        Ok(PolicyVersion {
            version_id: id.clone(),
            parent_version_id: parent,
            weights,
            rollback: None,
            summary: PolicySummary::default(),
            created_at: Utc::now(),
        })
    }
}
