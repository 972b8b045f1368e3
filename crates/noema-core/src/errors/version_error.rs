/// Version lineage and lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("lineage conflict on {kind}: pass declared parent {declared}, current is {current}")]
    LineageConflict {
        kind: String,
        declared: String,
        current: String,
    },

    #[error("unknown {kind} version: {version_id}")]
    UnknownVersion { kind: String, version_id: String },

    #[error("{kind} version {version_id} cannot be reconstructed: {reason}")]
    Unrecoverable {
        kind: String,
        version_id: String,
        reason: String,
    },
}
