use super::host::HostError;
use crate::core::tree::ids::NodeId;
use crate::core::tree::validation::ValidationIssue;
use crate::core::utils::geometry::TransformError;
use thiserror::Error;

/// A malformed value found while building a node's scene content.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("`{param}` must have 3 values, found {actual}")]
    VectorLength { param: &'static str, actual: usize },

    #[error("`radius` must be a finite non-negative number, found {0}")]
    InvalidRadius(f64),

    #[error("`ijk_min` exceeds `ijk_max` on at least one axis")]
    EmptyCellRange,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid parameter on '{kind}' node {node:?}: {source}")]
    InvalidParameter {
        node: NodeId,
        kind: &'static str,
        #[source]
        source: ParameterError,
    },

    #[error("Node {node:?} of kind '{kind}' cannot contribute a color theme")]
    UnsupportedColorNode { node: NodeId, kind: String },

    #[error("Tree failed strict validation with {} issue(s)", .issues.len())]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Failed to canonicalize annotation spec: {0}")]
    Canonicalization(#[from] serde_json::Error),

    #[error("Scene host rejected the batch: {0}")]
    Host(#[from] HostError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
