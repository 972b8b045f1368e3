use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::errors::VersionError;

use super::VersionId;

/// Anything with a content-addressed id and a parent pointer.
pub trait Versioned {
    fn version_id(&self) -> &VersionId;
    fn parent_version_id(&self) -> Option<&VersionId>;
}

/// Arena of immutable versions for one lineage plus an explicit current pointer.
///
/// Retains about `capacity` version bodies; older ones are evicted but their
/// parent links stay in the lineage index so they can be reconstructed.
#[derive(Debug)]
pub struct VersionStore<V> {
    kind: &'static str,
    capacity: usize,
    versions: HashMap<VersionId, Arc<V>>,
    retained: VecDeque<VersionId>,
    lineage: HashMap<VersionId, Option<VersionId>>,
    current: Option<VersionId>,
}

impl<V: Versioned> VersionStore<V> {
    /// An empty store. `kind` labels errors ("policy", "concept_graph").
    pub fn new(kind: &'static str, capacity: usize) -> Self {
        Self {
            kind,
            capacity: capacity.max(1),
            versions: HashMap::new(),
            retained: VecDeque::new(),
            lineage: HashMap::new(),
            current: None,
        }
    }

    /// A store whose current pointer starts at `root`.
    pub fn with_root(kind: &'static str, capacity: usize, root: V) -> Self {
        let mut store = Self::new(kind, capacity);
        store.current = Some(root.version_id().clone());
        store.insert(Arc::new(root));
        store
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn current(&self) -> Option<Arc<V>> {
        self.current.as_ref().and_then(|id| self.versions.get(id).cloned())
    }

    pub fn current_id(&self) -> Option<&VersionId> {
        self.current.as_ref()
    }

    /// A retained version body.
    pub fn get(&self, id: &VersionId) -> Option<Arc<V>> {
        self.versions.get(id).cloned()
    }

    /// Whether `id` was ever committed to this lineage, retained or not.
    pub fn is_known(&self, id: &VersionId) -> bool {
        self.lineage.contains_key(id)
    }

    /// Parent link from the lineage index.
    pub fn parent_of(&self, id: &VersionId) -> Option<Option<&VersionId>> {
        self.lineage.get(id).map(Option::as_ref)
    }

    /// Retained versions whose parent is `id`.
    pub fn retained_children(&self, id: &VersionId) -> Vec<Arc<V>> {
        self.retained
            .iter()
            .filter_map(|vid| self.versions.get(vid))
            .filter(|v| v.parent_version_id() == Some(id))
            .cloned()
            .collect()
    }

    /// Number of retained version bodies.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Reject a pass whose declared parent is not the current pointer.
    pub fn check_parent(&self, declared: Option<&VersionId>) -> Result<(), VersionError> {
        if declared == self.current.as_ref() {
            return Ok(());
        }
        Err(VersionError::LineageConflict {
            kind: self.kind.to_string(),
            declared: display_id(declared),
            current: display_id(self.current.as_ref()),
        })
    }

    /// Append `version` as the child of the current pointer and move the pointer to it.
    pub fn commit(&mut self, version: impl Into<Arc<V>>) -> Result<Arc<V>, VersionError> {
        let version = version.into();
        self.check_parent(version.parent_version_id())?;
        self.current = Some(version.version_id().clone());
        self.insert(Arc::clone(&version));
        Ok(version)
    }

    /// Move the current pointer to a retained version. Creates no new id.
    pub fn promote(&mut self, id: &VersionId) -> Result<Arc<V>, VersionError> {
        let version = self.get(id).ok_or_else(|| VersionError::UnknownVersion {
            kind: self.kind.to_string(),
            version_id: id.to_string(),
        })?;
        self.current = Some(id.clone());
        self.touch(id);
        Ok(version)
    }

    /// Re-insert a reconstructed body for an id this lineage already knows.
    pub fn restore(&mut self, version: V) -> Result<Arc<V>, VersionError> {
        let id = version.version_id().clone();
        match self.lineage.get(&id) {
            Some(parent) if parent.as_ref() == version.parent_version_id() => {}
            Some(_) => {
                return Err(VersionError::Unrecoverable {
                    kind: self.kind.to_string(),
                    version_id: id.to_string(),
                    reason: "reconstructed parent does not match lineage".to_string(),
                })
            }
            None => {
                return Err(VersionError::UnknownVersion {
                    kind: self.kind.to_string(),
                    version_id: id.to_string(),
                })
            }
        }
        let version = Arc::new(version);
        self.insert(Arc::clone(&version));
        Ok(version)
    }

    fn insert(&mut self, version: Arc<V>) {
        let id = version.version_id().clone();
        self.lineage
            .insert(id.clone(), version.parent_version_id().cloned());
        self.versions.insert(id.clone(), version);
        self.touch(&id);
        self.evict();
    }

    fn touch(&mut self, id: &VersionId) {
        self.retained.retain(|v| v != id);
        self.retained.push_back(id.clone());
    }

    // The current body and the most recently touched body are never evicted.
    fn evict(&mut self) {
        while self.versions.len() > self.capacity {
            let newest = self.retained.len().saturating_sub(1);
            let Some(pos) = self
                .retained
                .iter()
                .enumerate()
                .position(|(i, id)| i != newest && Some(id) != self.current.as_ref())
            else {
                break;
            };
            if let Some(id) = self.retained.remove(pos) {
                self.versions.remove(&id);
            }
        }
    }
}

fn display_id(id: Option<&VersionId>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "<none>".to_string())
}
