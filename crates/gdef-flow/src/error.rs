//! Analysis errors.

use gdef_ir::CfgError;
use thiserror::Error;

/// Errors raised by the flow engine and the analyses built on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The control flow graph is not well formed.
    #[error("malformed graph: {0}")]
    MalformedGraph(#[from] CfgError),
    /// The worklist did not settle within the configured number of steps.
    #[error("analysis did not converge after {steps} steps (limit {limit})")]
    Divergence { steps: usize, limit: usize },
    /// A precomputed input (seed result, dominator set) does not cover the
    /// graph being solved.
    #[error("{what} covers {found} nodes but the graph has {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}
