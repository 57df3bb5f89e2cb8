//! Generic forward data-flow solver.
//!
//! Solves `in(n) = merge(out(p) for p in preds(n))`, `out(n) = transfer(n, in(n))`
//! with a worklist seeded in reverse post-order. Only forward problems are
//! supported.

use alloc::{collections::VecDeque, vec, vec::Vec};
use core::fmt;

use gdef_ir::{CfgError, ControlFlowGraph};
use log::{debug, trace, warn};

use crate::{config::AnalysisConfig, error::AnalysisError};

/// A forward data-flow problem over a control flow graph.
///
/// `merge` and `transfer` must be monotone and must return fresh values.
/// `merge` must also be associative and commutative.
pub trait ForwardAnalysis {
    type Fact: Clone + PartialEq + fmt::Debug;

    /// Value merged into the entry node's input.
    fn entry_fact(&self) -> Self::Fact;

    /// Starting value for every other node (the lattice top for a must-analysis).
    fn initial_fact(&self) -> Self::Fact;

    fn merge(&self, a: &Self::Fact, b: &Self::Fact) -> Self::Fact;

    fn transfer(&self, node: usize, input: &Self::Fact) -> Self::Fact;
}

/// One node evaluation, as reported to an observer.
#[derive(Debug)]
pub struct FlowEvent<'a, F> {
    pub node: usize,
    pub input: &'a F,
    pub output: &'a F,
    /// Whether `output` differs from the node's previous output.
    pub changed: bool,
}

/// Converged per-node facts.
///
/// Nodes the entry cannot reach were never evaluated and hold the
/// analysis' initial fact on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowResults<F> {
    before: Vec<F>,
    after: Vec<F>,
    steps: usize,
}

impl<F> FlowResults<F> {
    /// Fact flowing into `node`, or `None` when out of range.
    pub fn before(&self, node: usize) -> Option<&F> {
        self.before.get(node)
    }

    /// Fact flowing out of `node`, or `None` when out of range.
    pub fn after(&self, node: usize) -> Option<&F> {
        self.after.get(node)
    }

    /// Number of node evaluations the solve took.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.before.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
    }
}

/// Worklist fixed-point solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEngine {
    max_iterations: usize,
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl FlowEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
        }
    }

    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Solve `analysis` over `cfg` from the analysis' initial facts.
    pub fn solve<A: ForwardAnalysis>(
        &self,
        cfg: &ControlFlowGraph,
        analysis: &A,
    ) -> Result<FlowResults<A::Fact>, AnalysisError> {
        self.solve_observed(cfg, analysis, |_| {})
    }

    /// Solve starting from the facts of an earlier run instead of the initial
    /// facts. Starting from a fixed point returns that fixed point.
    pub fn solve_from<A: ForwardAnalysis>(
        &self,
        cfg: &ControlFlowGraph,
        analysis: &A,
        seed: &FlowResults<A::Fact>,
    ) -> Result<FlowResults<A::Fact>, AnalysisError> {
        if seed.len() != cfg.num_nodes() {
            return Err(AnalysisError::SizeMismatch {
                what: "seed result",
                expected: cfg.num_nodes(),
                found: seed.len(),
            });
        }
        self.run(
            cfg,
            analysis,
            seed.before.clone(),
            seed.after.clone(),
            |_| {},
        )
    }

    /// Solve from the initial facts, reporting every node evaluation to
    /// `observer`.
    pub fn solve_observed<A, O>(
        &self,
        cfg: &ControlFlowGraph,
        analysis: &A,
        observer: O,
    ) -> Result<FlowResults<A::Fact>, AnalysisError>
    where
        A: ForwardAnalysis,
        O: FnMut(&FlowEvent<'_, A::Fact>),
    {
        let initial = analysis.initial_fact();
        let n = cfg.num_nodes();
        self.run(
            cfg,
            analysis,
            vec![initial.clone(); n],
            vec![initial; n],
            observer,
        )
    }

    fn run<A, O>(
        &self,
        cfg: &ControlFlowGraph,
        analysis: &A,
        mut before: Vec<A::Fact>,
        mut after: Vec<A::Fact>,
        mut observer: O,
    ) -> Result<FlowResults<A::Fact>, AnalysisError>
    where
        A: ForwardAnalysis,
        O: FnMut(&FlowEvent<'_, A::Fact>),
    {
        if cfg.is_empty() {
            return Ok(FlowResults {
                before,
                after,
                steps: 0,
            });
        }
        let entry = cfg.entry().ok_or(CfgError::NoEntry)?;

        let rpo = cfg.reverse_post_order();
        let mut in_queue = vec![false; cfg.num_nodes()];
        let mut worklist: VecDeque<usize> = VecDeque::with_capacity(rpo.len());
        for &node in &rpo {
            in_queue[node] = true;
            worklist.push_back(node);
        }

        let mut steps = 0;
        while let Some(node) = worklist.pop_front() {
            in_queue[node] = false;
            steps += 1;
            if steps > self.max_iterations {
                warn!(
                    "flow analysis exceeded {} steps on a graph of {} nodes",
                    self.max_iterations,
                    cfg.num_nodes()
                );
                return Err(AnalysisError::Divergence {
                    steps: steps - 1,
                    limit: self.max_iterations,
                });
            }

            let mut input = (node == entry).then(|| analysis.entry_fact());
            for &pred in cfg.predecessors(node) {
                if !cfg.is_reachable(pred) {
                    continue;
                }
                input = Some(match input {
                    Some(acc) => analysis.merge(&acc, &after[pred]),
                    None => after[pred].clone(),
                });
            }
            // A reachable non-entry node always has a reachable predecessor
            let input = input.unwrap_or_else(|| analysis.initial_fact());
            let output = analysis.transfer(node, &input);
            let changed = output != after[node];

            trace!("node {}: in {:?} out {:?} changed {}", node, input, output, changed);
            observer(&FlowEvent {
                node,
                input: &input,
                output: &output,
                changed,
            });

            before[node] = input;
            if changed {
                after[node] = output;
                for &succ in cfg.successors(node) {
                    if !in_queue[succ] {
                        in_queue[succ] = true;
                        worklist.push_back(succ);
                    }
                }
            }
        }

        debug!(
            "flow analysis converged: {} nodes ({} reachable) in {} steps",
            cfg.num_nodes(),
            rpo.len(),
            steps
        );
        Ok(FlowResults {
            before,
            after,
            steps,
        })
    }
}
