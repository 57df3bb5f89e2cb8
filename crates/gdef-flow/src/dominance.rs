//! Dominator computation.
//!
//! Two algorithms produce the same [`DominatorSet`]:
//! - set iteration on the flow engine (`Dom(n) = {n} ∪ ⋂ Dom(p)`)
//! - Keith D. Cooper's "Simple, Fast Dominance Algorithm" via [`DominatorTree`]

use alloc::{vec, vec::Vec};

use gdef_ir::ControlFlowGraph;
use log::debug;

use crate::{
    bitset::BitSet,
    config::{AnalysisConfig, DominatorAlgorithm},
    engine::{FlowEngine, ForwardAnalysis},
    error::AnalysisError,
};

/// Dominators as a forward must-problem over node sets.
struct DominatorAnalysis {
    num_nodes: usize,
}

impl ForwardAnalysis for DominatorAnalysis {
    type Fact = BitSet;

    fn entry_fact(&self) -> BitSet {
        BitSet::new_empty(self.num_nodes)
    }

    fn initial_fact(&self) -> BitSet {
        BitSet::new_full(self.num_nodes)
    }

    fn merge(&self, a: &BitSet, b: &BitSet) -> BitSet {
        a.intersection(b)
    }

    fn transfer(&self, node: usize, input: &BitSet) -> BitSet {
        input.with(node)
    }
}

/// For every node, the set of nodes that dominate it (itself included).
///
/// Nodes the entry cannot reach are dominated only by themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorSet {
    sets: Vec<BitSet>,
}

impl DominatorSet {
    /// Compute dominators with the algorithm selected in `config`.
    pub fn compute(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let doms = match config.dominators {
            DominatorAlgorithm::Iterative => Self::iterative(cfg, &FlowEngine::new(config))?,
            DominatorAlgorithm::Cooper => {
                DominatorTree::from_cfg(cfg, config.max_iterations)?.to_dominator_set()
            }
        };
        debug!(
            "computed dominators for {} nodes using {}",
            cfg.num_nodes(),
            config.dominators
        );
        Ok(doms)
    }

    /// Compute dominators by running the set-based problem on `engine`.
    pub fn iterative(cfg: &ControlFlowGraph, engine: &FlowEngine) -> Result<Self, AnalysisError> {
        let num_nodes = cfg.num_nodes();
        let results = engine.solve(cfg, &DominatorAnalysis { num_nodes })?;
        let sets = (0..num_nodes)
            .map(|node| match results.after(node) {
                Some(set) if cfg.is_reachable(node) => set.clone(),
                _ => BitSet::new_empty(num_nodes).with(node),
            })
            .collect();
        Ok(Self { sets })
    }

    pub fn num_nodes(&self) -> usize {
        self.sets.len()
    }

    /// Dominators of `node` in ascending order. Empty when out of range.
    pub fn dominators(&self, node: usize) -> Vec<usize> {
        self.sets
            .get(node)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    /// The dominator set of `node` as a bitset over node indices.
    pub fn dominator_bits(&self, node: usize) -> Option<&BitSet> {
        self.sets.get(node)
    }

    /// Check if `a` dominates `b`. Every node dominates itself.
    pub fn dominates(&self, a: usize, b: usize) -> bool {
        self.sets.get(b).is_some_and(|set| set.contains(a))
    }

    /// The closest strict dominator of `node`.
    ///
    /// Dominators of a node form a chain, so the immediate dominator is the
    /// strict dominator with the largest dominator set.
    pub fn immediate_dominator(&self, node: usize) -> Option<usize> {
        let set = self.sets.get(node)?;
        set.iter()
            .filter(|&d| d != node)
            .find(|&d| self.sets[d].len() + 1 == set.len())
    }
}

/// Dominator tree for a control flow graph.
///
/// Stores the immediate dominator of every node, computed over reverse
/// post-order.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// Immediate dominator for each node (None = unreachable or entry)
    idom: Vec<Option<usize>>,
    /// Reverse post-order numbers for dominance queries (1-based, 0 = unreachable)
    rpo_numbers: Vec<u32>,
    /// Reachable nodes in reverse post-order
    rpo: Vec<usize>,
}

impl DominatorTree {
    /// Compute the dominator tree from a CFG.
    ///
    /// Fails with a divergence error if the idom assignment has not settled
    /// after `max_iterations` passes over the graph.
    pub fn from_cfg(cfg: &ControlFlowGraph, max_iterations: usize) -> Result<Self, AnalysisError> {
        let num_nodes = cfg.num_nodes();
        let rpo = cfg.reverse_post_order();

        // Build RPO number map: node -> RPO number
        let mut rpo_numbers = vec![0; num_nodes];
        for (rpo_idx, &node) in rpo.iter().enumerate() {
            // Use 1-based indexing, leaving 0 for unreachable
            rpo_numbers[node] = (rpo_idx + 1) as u32;
        }

        // During the iteration the entry is its own idom, so every processed
        // node has a chain ending at the entry.
        let mut idom: Vec<Option<usize>> = vec![None; num_nodes];
        let Some(&entry) = rpo.first() else {
            return Ok(Self {
                idom,
                rpo_numbers,
                rpo,
            });
        };
        idom[entry] = Some(entry);

        let mut passes = 0;
        let mut changed = true;
        while changed {
            passes += 1;
            if passes > max_iterations {
                return Err(AnalysisError::Divergence {
                    steps: passes - 1,
                    limit: max_iterations,
                });
            }
            changed = false;
            for &node in rpo.iter().skip(1) {
                // Intersect the predecessors that already have an idom
                let mut new_idom = None;
                for &pred in cfg.predecessors(node) {
                    if idom[pred].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => pred,
                        Some(current) => Self::common_dominator(current, pred, &idom, &rpo_numbers),
                    });
                }

                if new_idom.is_some() && idom[node] != new_idom {
                    idom[node] = new_idom;
                    changed = true;
                }
            }
        }
        idom[entry] = None;
        debug!("cooper dominators settled after {} passes", passes);

        Ok(Self {
            idom,
            rpo_numbers,
            rpo,
        })
    }

    /// Walk both fingers up the tree until they meet.
    fn common_dominator(a: usize, b: usize, idom: &[Option<usize>], rpo_numbers: &[u32]) -> usize {
        let mut finger1 = a;
        let mut finger2 = b;
        while finger1 != finger2 {
            while rpo_numbers[finger1] > rpo_numbers[finger2] {
                finger1 = idom[finger1].unwrap_or(finger2);
            }
            while rpo_numbers[finger2] > rpo_numbers[finger1] {
                finger2 = idom[finger2].unwrap_or(finger1);
            }
        }
        finger1
    }

    /// Check if `a` dominates `b`.
    ///
    /// A node dominates itself. Unreachable nodes dominate nothing else and
    /// are dominated by nothing else.
    pub fn dominates(&self, a: usize, b: usize) -> bool {
        if a >= self.idom.len() || b >= self.idom.len() {
            return false;
        }
        if a == b {
            return true;
        }
        if self.rpo_numbers[a] == 0 || self.rpo_numbers[b] == 0 {
            return false;
        }

        // Walk up from b while it is deeper in RPO than a
        let rpo_a = self.rpo_numbers[a];
        let mut current = b;
        while self.rpo_numbers[current] > rpo_a {
            match self.idom[current] {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        current == a
    }

    /// Get immediate dominator of a node.
    pub fn immediate_dominator(&self, node: usize) -> Option<usize> {
        self.idom.get(node).copied().flatten()
    }

    /// Children of `node` in the dominator tree, ascending.
    pub fn children(&self, node: usize) -> Vec<usize> {
        (0..self.idom.len())
            .filter(|&other| self.idom[other] == Some(node))
            .collect()
    }

    /// Expand immediate dominators into full dominator sets.
    pub fn to_dominator_set(&self) -> DominatorSet {
        let num_nodes = self.idom.len();
        let mut sets = vec![BitSet::new_empty(num_nodes); num_nodes];
        for node in 0..num_nodes {
            sets[node].insert(node);
        }
        // RPO visits a node's idom before the node itself
        for &node in &self.rpo {
            if let Some(parent) = self.idom[node] {
                sets[node] = sets[parent].with(node);
            }
        }
        DominatorSet { sets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdef_ir::{CfgBuilder, InstNode};

    fn graph(num_nodes: usize, edges: &[(usize, usize)]) -> ControlFlowGraph {
        let mut builder = CfgBuilder::new();
        for i in 0..num_nodes {
            builder.add_node(InstNode::new(alloc::format!("n{}", i), Vec::new(), Vec::new()));
        }
        for &(from, to) in edges {
            builder.add_edge(from, to);
        }
        builder.set_entry(0);
        builder.build().unwrap()
    }

    fn both(cfg: &ControlFlowGraph) -> (DominatorSet, DominatorSet) {
        let iterative = DominatorSet::iterative(cfg, &FlowEngine::default()).unwrap();
        let cooper = DominatorTree::from_cfg(cfg, 100).unwrap().to_dominator_set();
        (iterative, cooper)
    }

    #[test]
    fn test_dominance_diamond() {
        let cfg = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let (doms, cooper) = both(&cfg);
        assert_eq!(doms, cooper);
        assert_eq!(doms.dominators(3), vec![0, 3]);
        assert_eq!(doms.dominators(1), vec![0, 1]);
        assert_eq!(doms.immediate_dominator(3), Some(0));
        assert_eq!(doms.immediate_dominator(0), None);
        assert!(!doms.dominates(1, 3));
        assert!(doms.dominates(0, 3));
    }

    #[test]
    fn test_dominance_loop() {
        // 0 -> 1 -> 2 -> 1, 1 -> 3
        let cfg = graph(4, &[(0, 1), (1, 2), (2, 1), (1, 3)]);
        let (doms, cooper) = both(&cfg);
        assert_eq!(doms, cooper);
        assert_eq!(doms.dominators(2), vec![0, 1, 2]);
        assert_eq!(doms.dominators(3), vec![0, 1, 3]);
        assert_eq!(doms.immediate_dominator(3), Some(1));
    }

    #[test]
    fn test_dominance_irreducible() {
        // Two entries into the 1 <-> 2 cycle
        let cfg = graph(4, &[(0, 1), (0, 2), (1, 2), (2, 1), (2, 3)]);
        let (doms, cooper) = both(&cfg);
        assert_eq!(doms, cooper);
        assert_eq!(doms.dominators(1), vec![0, 1]);
        assert_eq!(doms.dominators(2), vec![0, 2]);
        assert_eq!(doms.dominators(3), vec![0, 2, 3]);
    }

    #[test]
    fn test_dominance_unreachable() {
        let cfg = graph(3, &[(0, 1), (2, 1)]);
        let (doms, cooper) = both(&cfg);
        assert_eq!(doms, cooper);
        assert_eq!(doms.dominators(2), vec![2]);
        assert_eq!(doms.dominators(1), vec![0, 1]);
        assert!(!doms.dominates(2, 1));
        assert_eq!(doms.immediate_dominator(2), None);
    }

    #[test]
    fn test_dominance_entry_with_back_edge() {
        let cfg = graph(2, &[(0, 1), (1, 0)]);
        let (doms, cooper) = both(&cfg);
        assert_eq!(doms, cooper);
        assert_eq!(doms.dominators(0), vec![0]);
        assert_eq!(doms.dominators(1), vec![0, 1]);
    }

    #[test]
    fn test_dominator_tree_queries() {
        let cfg = graph(5, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]);
        let tree = DominatorTree::from_cfg(&cfg, 100).unwrap();
        assert_eq!(tree.immediate_dominator(4), Some(3));
        assert_eq!(tree.children(0), vec![1, 2, 3]);
        assert!(tree.dominates(0, 4));
        assert!(tree.dominates(3, 4));
        assert!(!tree.dominates(1, 4));
        assert!(!tree.dominates(4, 9));
    }

    #[test]
    fn test_dominance_out_of_range() {
        let cfg = graph(1, &[]);
        let (doms, _) = both(&cfg);
        assert!(doms.dominators(5).is_empty());
        assert_eq!(doms.dominator_bits(5), None);
        assert_eq!(
            doms.dominator_bits(0).map(|set| set.iter().collect::<Vec<_>>()),
            Some(vec![0])
        );
        assert!(!doms.dominates(0, 5));
        assert_eq!(doms.immediate_dominator(5), None);
    }

    #[test]
    fn test_dominance_empty_graph() {
        let cfg = ControlFlowGraph::empty();
        let doms = DominatorSet::compute(&cfg, &AnalysisConfig::default()).unwrap();
        assert_eq!(doms.num_nodes(), 0);
        let tree = DominatorTree::from_cfg(&cfg, 1).unwrap();
        assert_eq!(tree.to_dominator_set().num_nodes(), 0);
    }
}
