//! Functions.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::block::Block;

/// A function in the IR.
///
/// A function consists of a name and a list of blocks. The first block is
/// the entry block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name (without the `%` sigil).
    pub name: String,
    /// Blocks in this function.
    pub blocks: Vec<Block>,
}

impl Function {
    /// Create a new function with no blocks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    /// Get the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a block to this function, returning its index.
    pub fn add_block(&mut self, block: Block) -> usize {
        let index = self.blocks.len();
        self.blocks.push(block);
        index
    }

    /// Get the number of blocks in this function.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Get the total number of instructions across all blocks.
    pub fn inst_count(&self) -> usize {
        self.blocks.iter().map(Block::inst_count).sum()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function %{} {{", self.name)?;
        for (idx, block) in self.blocks.iter().enumerate() {
            writeln!(f, "block{}:", idx)?;
            for inst in &block.insts {
                writeln!(f, "    {}", inst)?;
            }
        }
        write!(f, "}}")
    }
}
