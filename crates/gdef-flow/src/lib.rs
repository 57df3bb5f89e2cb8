//! Flow analyses over the instruction control flow graph.
//!
//! This crate provides:
//! - A generic forward data-flow engine (worklist, reverse post-order seeding)
//! - Dominator sets, computed iteratively or with Cooper's algorithm
//! - The guaranteed-definitions analysis and its text report

#![no_std]

extern crate alloc;

mod bitset;
mod config;
mod dominance;
mod engine;
mod error;
mod guaranteed;
mod report;

pub use bitset::BitSet;
pub use config::{AnalysisConfig, DominatorAlgorithm, UnknownOption, UnreachablePolicy};
pub use dominance::{DominatorSet, DominatorTree};
pub use engine::{FlowEngine, FlowEvent, FlowResults, ForwardAnalysis};
pub use error::AnalysisError;
pub use guaranteed::GuaranteedDefinitions;
pub use report::{Report, ReportStyle};
