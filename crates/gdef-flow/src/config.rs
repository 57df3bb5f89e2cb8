//! Analysis configuration.

use core::{fmt, str::FromStr};

use alloc::string::String;

/// How results are reported for nodes the entry cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnreachablePolicy {
    /// Unreachable nodes have no result.
    #[default]
    Exclude,
    /// Unreachable nodes report the lattice top (every variable).
    Top,
}

/// Which algorithm computes dominator sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DominatorAlgorithm {
    /// Set-based iteration on the flow engine.
    #[default]
    Iterative,
    /// Cooper, Harvey and Kennedy's immediate-dominator iteration.
    Cooper,
}

/// Settings shared by every analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Worklist steps allowed before a run fails with a divergence error.
    pub max_iterations: usize,
    pub unreachable: UnreachablePolicy,
    pub dominators: DominatorAlgorithm,
}

impl AnalysisConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            unreachable: UnreachablePolicy::default(),
            dominators: DominatorAlgorithm::default(),
        }
    }
}

/// Error returned when a policy or algorithm name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownOption {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for UnreachablePolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exclude" => Ok(Self::Exclude),
            "top" => Ok(Self::Top),
            _ => Err(UnknownOption {
                kind: "unreachable policy",
                value: s.into(),
                expected: "exclude, top",
            }),
        }
    }
}

impl fmt::Display for UnreachablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exclude => "exclude",
            Self::Top => "top",
        })
    }
}

impl FromStr for DominatorAlgorithm {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iterative" => Ok(Self::Iterative),
            "cooper" => Ok(Self::Cooper),
            _ => Err(UnknownOption {
                kind: "dominator algorithm",
                value: s.into(),
                expected: "iterative, cooper",
            }),
        }
    }
}

impl fmt::Display for DominatorAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Iterative => "iterative",
            Self::Cooper => "cooper",
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_iterations, 1_000_000);
        assert_eq!(config.unreachable, UnreachablePolicy::Exclude);
        assert_eq!(config.dominators, DominatorAlgorithm::Iterative);
    }

    #[test]
    fn test_policy_names_round_trip() {
        for policy in [UnreachablePolicy::Exclude, UnreachablePolicy::Top] {
            assert_eq!(policy.to_string().parse::<UnreachablePolicy>(), Ok(policy));
        }
        for algo in [DominatorAlgorithm::Iterative, DominatorAlgorithm::Cooper] {
            assert_eq!(algo.to_string().parse::<DominatorAlgorithm>(), Ok(algo));
        }
    }

    #[test]
    fn test_unknown_option_message() {
        let err = "lengauer".parse::<DominatorAlgorithm>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown dominator algorithm `lengauer` (expected one of: iterative, cooper)"
        );
    }
}
