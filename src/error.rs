//! Error taxonomy shared by both engines.
//!
//! Only malformed input and programming errors are reported through
//! [`TspError`]. An instance without a Hamiltonian cycle, or a search that
//! stops on a time limit, still produces a report: see
//! [`crate::report::SolveStatus`] and the `feasible` flags.

use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TspError {
    /// Node/edge counts, indices or costs are malformed.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// A cost was requested for an edge that is not part of the instance.
    #[error("edge ({u}, {v}) is not part of the instance")]
    InvalidEdge { u: usize, v: usize },

    /// A solver configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The instance is too large for the solver's arithmetic or memory.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// A report was requested for a solve that never ran.
    #[error("no solve has been run")]
    NotRun,
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub fn invalid_instance(message: impl Into<String>) -> Self {
        Self::InvalidInstance(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn resource_exhaustion(message: impl Into<String>) -> Self {
        Self::ResourceExhaustion(message.into())
    }
}
