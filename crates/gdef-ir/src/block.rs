//! Basic blocks.

use alloc::vec::Vec;

use crate::inst::Inst;

/// A labelled sequence of instructions.
///
/// Blocks are a convenience of the text format: the control flow graph is
/// built over individual instructions, and a block whose last instruction is
/// not a terminator falls through to the next block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Instructions in this block.
    pub insts: Vec<Inst>,
}

impl Block {
    /// Create a new empty block.
    pub fn new() -> Self {
        Self { insts: Vec::new() }
    }

    /// Create a block from a list of instructions.
    pub fn with_insts(insts: Vec<Inst>) -> Self {
        Self { insts }
    }

    /// Add an instruction to this block.
    pub fn push_inst(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    /// Get the number of instructions in this block.
    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    /// The last instruction, if any.
    pub fn last_inst(&self) -> Option<&Inst> {
        self.insts.last()
    }
}
