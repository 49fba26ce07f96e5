//! Solver error type.

use thiserror::Error;

use cm_core::NodeId;

/// Errors produced by `cm-solve`.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("intersection {0} not found in map")]
    UnknownIntersection(NodeId),

    #[error("search has not reached a terminal state")]
    NotFinished,

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("path record chain broken at {0}")]
    MissingPredecessor(NodeId),
}

pub type SolveResult<T> = Result<T, SolveError>;
