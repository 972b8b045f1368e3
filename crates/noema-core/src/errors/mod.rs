//! Error handling for Noema.
//! One error enum per concern, `thiserror` only, aggregated by [`NoemaError`].

pub mod config_error;
pub mod graph_error;
pub mod session_error;
pub mod version_error;

pub use config_error::ConfigError;
pub use graph_error::GraphError;
pub use session_error::SessionError;
pub use version_error::VersionError;

/// Top-level error for every fallible Noema operation.
#[derive(Debug, thiserror::Error)]
pub enum NoemaError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience alias used throughout the workspace.
pub type NoemaResult<T> = Result<T, NoemaError>;
