/// Concept graph mutation errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown concept node: {node_id}")]
    UnknownNode { node_id: String },

    #[error("concept node {node_id} is superseded by {superseded_by}")]
    Superseded {
        node_id: String,
        superseded_by: String,
    },

    #[error("cannot merge concept node {node_id} into itself")]
    SelfMerge { node_id: String },
}
