//! Guaranteed definitions.
//!
//! A variable is guaranteed defined at a node if every path from the entry to
//! that node assigns it. This is a forward must-problem: facts are variable
//! sets ordered by superset, merged by intersection, starting from the empty
//! set at the entry and from the set of all variables elsewhere.
//!
//! The generate set of a node is every local defined by one of its dominators,
//! so `out(n) = in(n) ∪ gen(n)`. Globals never enter the lattice.

use alloc::{collections::BTreeMap, vec::Vec};

use gdef_ir::{ControlFlowGraph, Variable};
use log::debug;

use crate::{
    bitset::BitSet,
    config::{AnalysisConfig, UnreachablePolicy},
    dominance::DominatorSet,
    engine::{FlowEngine, ForwardAnalysis},
    error::AnalysisError,
};

/// The flow problem over variable indices.
struct GuaranteedAnalysis<'a> {
    num_variables: usize,
    generate: &'a [BitSet],
}

impl ForwardAnalysis for GuaranteedAnalysis<'_> {
    type Fact = BitSet;

    fn entry_fact(&self) -> BitSet {
        BitSet::new_empty(self.num_variables)
    }

    fn initial_fact(&self) -> BitSet {
        BitSet::new_full(self.num_variables)
    }

    fn merge(&self, a: &BitSet, b: &BitSet) -> BitSet {
        a.intersection(b)
    }

    fn transfer(&self, node: usize, input: &BitSet) -> BitSet {
        input.union(&self.generate[node])
    }
}

/// Converged guaranteed-definition sets for every node of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuaranteedDefinitions {
    /// Every local mentioned in the graph, sorted
    variables: Vec<Variable>,
    generate: Vec<Vec<Variable>>,
    /// `None` for nodes excluded by the unreachable policy
    results: Vec<Option<Vec<Variable>>>,
    steps: usize,
}

impl GuaranteedDefinitions {
    /// Run the analysis, computing dominators with the configured algorithm.
    pub fn compute(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let doms = DominatorSet::compute(cfg, config)?;
        Self::with_dominators(cfg, &doms, config)
    }

    /// Run the analysis with precomputed dominators.
    pub fn with_dominators(
        cfg: &ControlFlowGraph,
        doms: &DominatorSet,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        let num_nodes = cfg.num_nodes();
        if doms.num_nodes() != num_nodes {
            return Err(AnalysisError::SizeMismatch {
                what: "dominator set",
                expected: num_nodes,
                found: doms.num_nodes(),
            });
        }

        let variables: Vec<Variable> = cfg.local_variables().into_iter().collect();
        let index: BTreeMap<&Variable, usize> =
            variables.iter().enumerate().map(|(i, v)| (v, i)).collect();
        let num_variables = variables.len();

        let local_defs: Vec<BitSet> = cfg
            .nodes()
            .iter()
            .map(|node| {
                let mut defs = BitSet::new_empty(num_variables);
                for var in node.local_defs() {
                    if let Some(&i) = index.get(var) {
                        defs.insert(i);
                    }
                }
                defs
            })
            .collect();

        let generate: Vec<BitSet> = (0..num_nodes)
            .map(|node| {
                doms.dominators(node)
                    .into_iter()
                    .fold(BitSet::new_empty(num_variables), |acc, d| {
                        acc.union(&local_defs[d])
                    })
            })
            .collect();

        let analysis = GuaranteedAnalysis {
            num_variables,
            generate: &generate,
        };
        let flow = FlowEngine::new(config).solve(cfg, &analysis)?;

        let names = |set: &BitSet| -> Vec<Variable> {
            set.iter().map(|i| variables[i].clone()).collect()
        };
        let results = (0..num_nodes)
            .map(|node| {
                if cfg.is_reachable(node) {
                    flow.before(node).map(names)
                } else {
                    match config.unreachable {
                        UnreachablePolicy::Exclude => None,
                        UnreachablePolicy::Top => Some(variables.clone()),
                    }
                }
            })
            .collect();
        let generate = generate.iter().map(names).collect();

        debug!(
            "guaranteed definitions: {} nodes, {} variables, {} steps",
            num_nodes,
            num_variables,
            flow.steps()
        );
        Ok(Self {
            variables,
            generate,
            results,
            steps: flow.steps(),
        })
    }

    /// Variables certain to be assigned on every path reaching `node`, sorted
    /// by name.
    ///
    /// `None` for an out-of-range node or one excluded by the unreachable
    /// policy.
    pub fn guaranteed_definitions_at(&self, node: usize) -> Option<&[Variable]> {
        self.results.get(node)?.as_deref()
    }

    /// Locals defined by the dominators of `node`.
    pub fn generate_set(&self, node: usize) -> Option<&[Variable]> {
        self.generate.get(node).map(Vec::as_slice)
    }

    /// All locals mentioned in the graph (the lattice top).
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_nodes(&self) -> usize {
        self.results.len()
    }

    /// Worklist steps taken by the guaranteed-definitions solve.
    pub fn steps(&self) -> usize {
        self.steps
    }
}
