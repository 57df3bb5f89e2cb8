//! Control Flow Graph construction and analysis.
//!
//! The graph is built over individual instructions: every instruction is a
//! node with a stable index, and its definition and use sets are computed once
//! here so analyses never need to look at instruction kinds.

use alloc::{
    collections::BTreeSet,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use thiserror::Error;

use crate::{
    function::Function,
    inst::Inst,
    place::{Place, Variable},
};

/// Errors raised while building a control flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    /// An edge references a node index that does not exist.
    #[error("edge {from} -> {to} references a node outside the graph ({num_nodes} nodes)")]
    UnknownNode {
        from: usize,
        to: usize,
        num_nodes: usize,
    },
    /// A branch names a block that does not exist.
    #[error("block{block} branches to block{target}, which does not exist")]
    UnknownBlock { block: usize, target: u32 },
    /// A block has no instructions, so there is no node to branch to.
    #[error("block{0} has no instructions")]
    EmptyBlock(usize),
    /// A non-empty graph has no designated entry node.
    #[error("no entry node designated")]
    NoEntry,
}

/// A node of the control flow graph: one instruction with its precomputed
/// definition targets and use operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstNode {
    text: String,
    block: Option<usize>,
    defs: Vec<Place>,
    uses: Vec<Place>,
}

impl InstNode {
    /// Create a node from display text and explicit def/use lists.
    pub fn new(text: impl Into<String>, defs: Vec<Place>, uses: Vec<Place>) -> Self {
        Self {
            text: text.into(),
            block: None,
            defs,
            uses,
        }
    }

    /// Create a node for an IR instruction.
    pub fn from_inst(inst: &Inst) -> Self {
        Self::new(inst.to_string(), inst.defs(), inst.uses())
    }

    /// Record the block this node was taken from.
    pub fn in_block(mut self, block: usize) -> Self {
        self.block = Some(block);
        self
    }

    /// Printable form of the instruction.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Index of the source block, when built from a function.
    pub fn block(&self) -> Option<usize> {
        self.block
    }

    /// Places this node writes.
    pub fn defs(&self) -> &[Place] {
        &self.defs
    }

    /// Places this node reads.
    pub fn uses(&self) -> &[Place] {
        &self.uses
    }

    /// Local variables this node writes.
    pub fn local_defs(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.defs.iter().filter_map(Place::as_local)
    }

    /// Local variables this node reads.
    pub fn local_uses(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.uses.iter().filter_map(Place::as_local)
    }
}

/// Control Flow Graph over instructions.
///
/// Immutable once built. Reachability from the entry node is computed at
/// construction time.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    nodes: Vec<InstNode>,
    /// Map from node index to set of predecessor node indices
    predecessors: Vec<BTreeSet<usize>>,
    /// Map from node index to set of successor node indices
    successors: Vec<BTreeSet<usize>>,
    /// Entry node (None only for the empty graph)
    entry: Option<usize>,
    reachable: Vec<bool>,
}

/// Incremental construction of a [`ControlFlowGraph`] from explicit edges.
#[derive(Debug, Clone, Default)]
pub struct CfgBuilder {
    nodes: Vec<InstNode>,
    edges: Vec<(usize, usize)>,
    entry: Option<usize>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its index.
    pub fn add_node(&mut self, node: InstNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add an edge. Indices are checked by [`CfgBuilder::build`].
    pub fn add_edge(&mut self, from: usize, to: usize) -> &mut Self {
        self.edges.push((from, to));
        self
    }

    /// Designate the entry node.
    pub fn set_entry(&mut self, entry: usize) -> &mut Self {
        self.entry = Some(entry);
        self
    }

    /// Validate edges and entry and build the graph.
    pub fn build(self) -> Result<ControlFlowGraph, CfgError> {
        let num_nodes = self.nodes.len();
        if num_nodes == 0 {
            return Ok(ControlFlowGraph::empty());
        }

        let entry = self.entry.ok_or(CfgError::NoEntry)?;
        if entry >= num_nodes {
            return Err(CfgError::UnknownNode {
                from: entry,
                to: entry,
                num_nodes,
            });
        }

        let mut predecessors = vec![BTreeSet::new(); num_nodes];
        let mut successors = vec![BTreeSet::new(); num_nodes];
        for (from, to) in self.edges {
            if from >= num_nodes || to >= num_nodes {
                return Err(CfgError::UnknownNode {
                    from,
                    to,
                    num_nodes,
                });
            }
            successors[from].insert(to);
            predecessors[to].insert(from);
        }

        let reachable = compute_reachable(entry, &successors);
        Ok(ControlFlowGraph {
            nodes: self.nodes,
            predecessors,
            successors,
            entry: Some(entry),
            reachable,
        })
    }
}

fn compute_reachable(entry: usize, successors: &[BTreeSet<usize>]) -> Vec<bool> {
    let mut reachable = vec![false; successors.len()];
    let mut worklist = vec![entry];
    reachable[entry] = true;
    while let Some(current) = worklist.pop() {
        for &succ in &successors[current] {
            if !reachable[succ] {
                reachable[succ] = true;
                worklist.push(succ);
            }
        }
    }
    reachable
}

impl ControlFlowGraph {
    /// The graph with no nodes.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            entry: None,
            reachable: Vec::new(),
        }
    }

    /// Build CFG from function.
    ///
    /// Nodes are numbered block by block in instruction order. The first
    /// instruction of block0 is the entry.
    pub fn from_function(func: &Function) -> Result<Self, CfgError> {
        if func.blocks.is_empty() {
            return Err(CfgError::NoEntry);
        }

        // First node index of every block
        let mut block_starts = Vec::with_capacity(func.blocks.len());
        let mut next = 0;
        for (block_idx, block) in func.blocks.iter().enumerate() {
            if block.insts.is_empty() {
                return Err(CfgError::EmptyBlock(block_idx));
            }
            block_starts.push(next);
            next += block.insts.len();
        }

        let mut builder = CfgBuilder::new();
        for (block_idx, block) in func.blocks.iter().enumerate() {
            let last = block.insts.len() - 1;
            for (offset, inst) in block.insts.iter().enumerate() {
                let node = builder.add_node(InstNode::from_inst(inst).in_block(block_idx));

                for target in inst.branch_targets() {
                    let start = block_starts.get(target as usize).copied().ok_or(
                        CfgError::UnknownBlock {
                            block: block_idx,
                            target,
                        },
                    )?;
                    builder.add_edge(node, start);
                }

                if inst.is_terminator() {
                    continue;
                }
                // Fall through within the block, then into the next block
                if offset < last || block_idx + 1 < func.blocks.len() {
                    builder.add_edge(node, node + 1);
                }
            }
        }
        builder.set_entry(0);
        builder.build()
    }

    /// Get a node by index.
    pub fn node(&self, node: usize) -> &InstNode {
        &self.nodes[node]
    }

    /// All nodes, indexed by node number.
    pub fn nodes(&self) -> &[InstNode] {
        &self.nodes
    }

    /// Get predecessors of a node.
    pub fn predecessors(&self, node: usize) -> &BTreeSet<usize> {
        &self.predecessors[node]
    }

    /// Get successors of a node.
    pub fn successors(&self, node: usize) -> &BTreeSet<usize> {
        &self.successors[node]
    }

    /// Get the entry node index. `None` only for the empty graph.
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Nodes without successors, in index order.
    pub fn exits(&self) -> Vec<usize> {
        (0..self.num_nodes())
            .filter(|&node| self.successors[node].is_empty())
            .collect()
    }

    /// Get the number of nodes in the CFG.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if node is reachable from entry.
    pub fn is_reachable(&self, node: usize) -> bool {
        self.reachable.get(node).copied().unwrap_or(false)
    }

    /// Get all reachable nodes in reverse post-order.
    ///
    /// Successors are visited in ascending index order, so the result is
    /// deterministic. Unreachable nodes are not included.
    pub fn reverse_post_order(&self) -> Vec<usize> {
        let Some(entry) = self.entry else {
            return Vec::new();
        };

        let mut visited = vec![false; self.num_nodes()];
        let mut post_order = Vec::with_capacity(self.num_nodes());

        // Iterative DFS: (node, successors still to visit)
        let mut stack: Vec<(usize, Vec<usize>)> = Vec::new();
        visited[entry] = true;
        stack.push((entry, self.successors[entry].iter().rev().copied().collect()));

        while let Some(top) = stack.len().checked_sub(1) {
            match stack[top].1.pop() {
                Some(succ) => {
                    if !visited[succ] {
                        visited[succ] = true;
                        let succs = self.successors[succ].iter().rev().copied().collect();
                        stack.push((succ, succs));
                    }
                }
                None => {
                    post_order.push(stack[top].0);
                    stack.pop();
                }
            }
        }

        post_order.reverse();
        post_order
    }

    /// Every local variable defined or used anywhere in the graph, sorted.
    pub fn local_variables(&self) -> BTreeSet<Variable> {
        self.nodes
            .iter()
            .flat_map(|node| node.local_defs().chain(node.local_uses()))
            .cloned()
            .collect()
    }
}
