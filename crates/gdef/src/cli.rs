//! Command-line options.

use std::path::PathBuf;

use argh::FromArgs;
use gdef_flow::{AnalysisConfig, DominatorAlgorithm, ReportStyle, UnreachablePolicy};

/// Print the variables guaranteed to be defined before every instruction.
#[derive(FromArgs, Debug)]
pub struct Args {
    /// input .gdef file (a module or a single function)
    #[argh(positional)]
    pub file: PathBuf,

    /// function to analyse (default: the module entry, else every function)
    #[argh(option, short = 'f')]
    pub function: Option<String>,

    /// dominator algorithm: iterative or cooper
    #[argh(option, default = "DominatorAlgorithm::Iterative")]
    pub dominators: DominatorAlgorithm,

    /// how to report unreachable instructions: exclude or top
    #[argh(option, default = "UnreachablePolicy::Exclude")]
    pub unreachable: UnreachablePolicy,

    /// worklist steps allowed before giving up
    #[argh(option, default = "AnalysisConfig::DEFAULT_MAX_ITERATIONS")]
    pub max_iterations: usize,

    /// one line per instruction instead of the full report
    #[argh(switch)]
    pub compact: bool,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, default = "log::LevelFilter::Warn")]
    pub log_level: log::LevelFilter,
}

impl Args {
    pub fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_iterations: self.max_iterations,
            unreachable: self.unreachable,
            dominators: self.dominators,
        }
    }

    pub fn style(&self) -> ReportStyle {
        if self.compact {
            ReportStyle::Compact
        } else {
            ReportStyle::Units
        }
    }
}
