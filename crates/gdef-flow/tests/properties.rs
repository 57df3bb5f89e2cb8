//! Engine and dominator properties checked over fixed graph shapes and
//! randomly generated graphs.

use std::collections::{BTreeMap, BTreeSet};

use gdef_flow::{
    AnalysisConfig, AnalysisError, BitSet, DominatorAlgorithm, DominatorSet, DominatorTree,
    FlowEngine, ForwardAnalysis, GuaranteedDefinitions,
};
use gdef_ir::{CfgBuilder, ControlFlowGraph, InstNode, Place, Variable};
use proptest::prelude::*;

/// Node `i` defines variable `v{i % 3}`.
fn graph(num_nodes: usize, edges: &[(usize, usize)]) -> ControlFlowGraph {
    let mut builder = CfgBuilder::new();
    for i in 0..num_nodes {
        let var = Variable::new(format!("v{}", i % 3));
        builder.add_node(InstNode::new(
            format!("n{}", i),
            vec![Place::Local(var)],
            Vec::new(),
        ));
    }
    for &(from, to) in edges {
        builder.add_edge(from, to);
    }
    builder.set_entry(0);
    builder.build().unwrap()
}

fn shapes() -> Vec<(&'static str, ControlFlowGraph)> {
    vec![
        ("single", graph(1, &[])),
        ("chain", graph(4, &[(0, 1), (1, 2), (2, 3)])),
        ("diamond", graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)])),
        ("loop", graph(5, &[(0, 1), (1, 2), (2, 3), (3, 1), (1, 4)])),
        (
            "nested loops",
            graph(
                7,
                &[(0, 1), (1, 2), (2, 3), (3, 2), (3, 4), (4, 1), (4, 5), (1, 6)],
            ),
        ),
        (
            "irreducible",
            graph(5, &[(0, 1), (0, 2), (1, 2), (2, 1), (1, 3), (2, 3), (3, 4)]),
        ),
        (
            "unreachable",
            graph(5, &[(0, 1), (1, 2), (3, 2), (3, 4), (4, 3)]),
        ),
        ("entry back edge", graph(3, &[(0, 1), (1, 0), (1, 2)])),
    ]
}

/// Guaranteed definitions restated against the public API.
struct MustDefs {
    universe: usize,
    generate: Vec<BitSet>,
}

impl MustDefs {
    fn new(cfg: &ControlFlowGraph, doms: &DominatorSet) -> Self {
        let vars: Vec<Variable> = cfg.local_variables().into_iter().collect();
        let index: BTreeMap<&Variable, usize> =
            vars.iter().enumerate().map(|(i, v)| (v, i)).collect();
        let generate = (0..cfg.num_nodes())
            .map(|n| {
                let mut set = BitSet::new_empty(vars.len());
                let dominators = doms.dominator_bits(n).into_iter().flat_map(|set| set.iter());
                for d in dominators {
                    for var in cfg.node(d).local_defs() {
                        set.insert(index[var]);
                    }
                }
                set
            })
            .collect();
        Self {
            universe: vars.len(),
            generate,
        }
    }
}

impl ForwardAnalysis for MustDefs {
    type Fact = BitSet;

    fn entry_fact(&self) -> BitSet {
        BitSet::new_empty(self.universe)
    }

    fn initial_fact(&self) -> BitSet {
        BitSet::new_full(self.universe)
    }

    fn merge(&self, a: &BitSet, b: &BitSet) -> BitSet {
        a.intersection(b)
    }

    fn transfer(&self, node: usize, input: &BitSet) -> BitSet {
        input.union(&self.generate[node])
    }
}

/// All simple paths from the entry to `target` (graphs here are tiny).
fn paths_to(cfg: &ControlFlowGraph, target: usize) -> Vec<Vec<usize>> {
    fn walk(
        cfg: &ControlFlowGraph,
        node: usize,
        target: usize,
        path: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        path.push(node);
        if node == target {
            out.push(path.clone());
        } else {
            for &succ in cfg.successors(node) {
                if !path.contains(&succ) {
                    walk(cfg, succ, target, path, out);
                }
            }
        }
        path.pop();
    }
    let mut out = Vec::new();
    if let Some(entry) = cfg.entry() {
        walk(cfg, entry, target, &mut Vec::new(), &mut out);
    }
    out
}

#[test]
fn test_must_analysis_inputs_only_shrink() {
    for (name, cfg) in shapes() {
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        let analysis = MustDefs::new(&cfg, &doms);
        let mut last_input: BTreeMap<usize, BitSet> = BTreeMap::new();
        FlowEngine::default()
            .solve_observed(&cfg, &analysis, |event| {
                if let Some(previous) = last_input.get(&event.node) {
                    assert!(
                        event.input.is_subset(previous),
                        "{}: in({}) grew from {:?} to {:?}",
                        name,
                        event.node,
                        previous,
                        event.input
                    );
                }
                last_input.insert(event.node, event.input.clone());
            })
            .unwrap();
    }
}

#[test]
fn test_fixed_point_is_idempotent() {
    for (name, cfg) in shapes() {
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        let analysis = MustDefs::new(&cfg, &doms);
        let engine = FlowEngine::default();
        let first = engine.solve(&cfg, &analysis).unwrap();
        let again = engine.solve_from(&cfg, &analysis, &first).unwrap();
        for node in 0..cfg.num_nodes() {
            assert_eq!(first.before(node), again.before(node), "{}: in({})", name, node);
            assert_eq!(first.after(node), again.after(node), "{}: out({})", name, node);
        }
        assert_eq!(again.steps(), cfg.reverse_post_order().len(), "{}", name);
    }
}

#[test]
fn test_restated_analysis_matches_library() {
    for (name, cfg) in shapes() {
        let config = AnalysisConfig::default();
        let doms = DominatorSet::compute(&cfg, &config).unwrap();
        let analysis = MustDefs::new(&cfg, &doms);
        let flow = FlowEngine::default().solve(&cfg, &analysis).unwrap();
        let defs = GuaranteedDefinitions::with_dominators(&cfg, &doms, &config).unwrap();
        let vars: Vec<Variable> = cfg.local_variables().into_iter().collect();
        for node in 0..cfg.num_nodes() {
            let expected: Option<Vec<Variable>> = flow
                .before(node)
                .filter(|_| cfg.is_reachable(node))
                .map(|set| set.iter().map(|i| vars[i].clone()).collect());
            assert_eq!(
                defs.guaranteed_definitions_at(node).map(<[Variable]>::to_vec),
                expected,
                "{}: node {}",
                name,
                node
            );
        }
    }
}

#[test]
fn test_dominators_are_correct() {
    for (name, cfg) in shapes() {
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        for n in 0..cfg.num_nodes() {
            assert!(doms.dominates(n, n), "{}: {} dominates itself", name, n);
            let paths = paths_to(&cfg, n);
            for m in doms.dominators(n) {
                if m == n {
                    continue;
                }
                assert!(
                    paths.iter().all(|path| path.contains(&m)),
                    "{}: {} dominates {} but some path avoids it",
                    name,
                    m,
                    n
                );
            }
            // Nothing outside Dom(n) lies on every path
            if cfg.is_reachable(n) {
                for m in 0..cfg.num_nodes() {
                    if !doms.dominates(m, n) {
                        assert!(
                            paths.iter().any(|path| !path.contains(&m)),
                            "{}: {} is on every path to {} but not a dominator",
                            name,
                            m,
                            n
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_dominator_algorithms_agree() {
    for (name, cfg) in shapes() {
        let iterative = DominatorSet::iterative(&cfg, &FlowEngine::default()).unwrap();
        let tree = DominatorTree::from_cfg(&cfg, 100).unwrap();
        assert_eq!(iterative, tree.to_dominator_set(), "{}", name);
        for n in 0..cfg.num_nodes() {
            assert_eq!(
                iterative.immediate_dominator(n),
                tree.immediate_dominator(n),
                "{}: idom({})",
                name,
                n
            );
        }
    }
}

/// Negates its input. With `&&` as merge a self loop keeps toggling.
struct Flip;

impl ForwardAnalysis for Flip {
    type Fact = bool;

    fn entry_fact(&self) -> bool {
        false
    }

    fn initial_fact(&self) -> bool {
        false
    }

    fn merge(&self, a: &bool, b: &bool) -> bool {
        *a && *b
    }

    fn transfer(&self, _node: usize, input: &bool) -> bool {
        !*input
    }
}

#[test]
fn test_non_monotone_analysis_diverges() {
    let cfg = graph(2, &[(0, 1), (1, 1)]);
    let err = FlowEngine::with_max_iterations(50)
        .solve(&cfg, &Flip)
        .unwrap_err();
    assert_eq!(err, AnalysisError::Divergence { steps: 50, limit: 50 });

    let config = AnalysisConfig {
        max_iterations: 50,
        ..AnalysisConfig::default()
    };
    assert!(FlowEngine::new(&config).solve(&graph(2, &[(0, 1)]), &Flip).is_ok());
}

/// Random graphs of up to nine nodes rooted at node 0. Some nodes end up
/// unreachable, some edges are self loops or duplicates.
fn arb_graph() -> impl Strategy<Value = ControlFlowGraph> {
    (1..10usize)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..=2 * n)))
        .prop_map(|(n, edges)| graph(n, &edges))
}

/// Intersection, over every simple entry-to-`node` path, of the variables
/// defined strictly before `node` on that path.
fn defs_on_every_path(cfg: &ControlFlowGraph, node: usize) -> Option<BTreeSet<Variable>> {
    paths_to(cfg, node)
        .into_iter()
        .map(|path| {
            path[..path.len() - 1]
                .iter()
                .flat_map(|&n| cfg.node(n).local_defs().cloned())
                .collect::<BTreeSet<Variable>>()
        })
        .reduce(|acc, defs| acc.intersection(&defs).cloned().collect())
}

proptest! {
    #[test]
    fn test_random_graph_dominator_algorithms_agree(cfg in arb_graph()) {
        let iterative = DominatorSet::iterative(&cfg, &FlowEngine::default()).unwrap();
        let tree = DominatorTree::from_cfg(&cfg, 100).unwrap();
        prop_assert_eq!(&iterative, &tree.to_dominator_set());
        for n in 0..cfg.num_nodes() {
            prop_assert_eq!(iterative.immediate_dominator(n), tree.immediate_dominator(n));
        }
    }

    #[test]
    fn test_random_graph_dominators_lie_on_every_path(cfg in arb_graph()) {
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        for n in 0..cfg.num_nodes() {
            let paths = paths_to(&cfg, n);
            for m in 0..cfg.num_nodes() {
                let on_every_path = paths.iter().all(|path| path.contains(&m));
                if cfg.is_reachable(n) {
                    prop_assert_eq!(doms.dominates(m, n), on_every_path, "{} dom {}", m, n);
                } else {
                    prop_assert_eq!(doms.dominates(m, n), m == n);
                }
            }
        }
    }

    #[test]
    fn test_random_graph_matches_path_intersection(cfg in arb_graph()) {
        for algorithm in [DominatorAlgorithm::Iterative, DominatorAlgorithm::Cooper] {
            let config = AnalysisConfig {
                dominators: algorithm,
                ..AnalysisConfig::default()
            };
            let defs = GuaranteedDefinitions::compute(&cfg, &config).unwrap();
            for n in 0..cfg.num_nodes() {
                let found: Option<BTreeSet<Variable>> = defs
                    .guaranteed_definitions_at(n)
                    .map(|vars| vars.iter().cloned().collect());
                prop_assert_eq!(found, defs_on_every_path(&cfg, n), "{}: node {}", algorithm, n);
            }
        }
    }

    #[test]
    fn test_random_graph_fixed_point_is_idempotent(cfg in arb_graph()) {
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        let analysis = MustDefs::new(&cfg, &doms);
        let engine = FlowEngine::default();
        let first = engine.solve(&cfg, &analysis).unwrap();
        let again = engine.solve_from(&cfg, &analysis, &first).unwrap();
        for n in 0..cfg.num_nodes() {
            prop_assert_eq!(first.before(n), again.before(n));
            prop_assert_eq!(first.after(n), again.after(n));
        }
        prop_assert_eq!(again.steps(), cfg.reverse_post_order().len());
    }
}
