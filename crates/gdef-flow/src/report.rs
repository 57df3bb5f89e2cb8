//! Text rendering of guaranteed-definition results.

use alloc::collections::BTreeSet;
use core::fmt;

use gdef_ir::{ControlFlowGraph, Variable};

use crate::guaranteed::GuaranteedDefinitions;

/// Layout of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// One line per node: `inst3: [a, b]`.
    Compact,
    /// Instruction text, its uses and its guaranteed set per node.
    #[default]
    Units,
}

/// Per-node report of a guaranteed-definitions run, printed with `Display`.
pub struct Report<'a> {
    cfg: &'a ControlFlowGraph,
    defs: &'a GuaranteedDefinitions,
    style: ReportStyle,
}

impl<'a> Report<'a> {
    pub fn new(cfg: &'a ControlFlowGraph, defs: &'a GuaranteedDefinitions, style: ReportStyle) -> Self {
        Self { cfg, defs, style }
    }
}

/// `[a, b, c]`
struct VarList<I>(I);

impl<I> fmt::Display for VarList<I>
where
    I: Clone + Iterator,
    I::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, var) in self.0.clone().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", var)?;
        }
        f.write_str("]")
    }
}

fn write_guaranteed(f: &mut fmt::Formatter<'_>, vars: Option<&[Variable]>) -> fmt::Result {
    match vars {
        Some(vars) => write!(f, "{}", VarList(vars.iter())),
        None => f.write_str("unreachable"),
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.cfg.nodes().iter().enumerate() {
            let guaranteed = self.defs.guaranteed_definitions_at(idx);
            match self.style {
                ReportStyle::Compact => {
                    write!(f, "inst{}: ", idx)?;
                    write_guaranteed(f, guaranteed)?;
                    writeln!(f)?;
                }
                ReportStyle::Units => {
                    match node.block() {
                        Some(block) => writeln!(f, "inst{} (block{}): {}", idx, block, node.text())?,
                        None => writeln!(f, "inst{}: {}", idx, node.text())?,
                    }
                    let uses: BTreeSet<&Variable> = node.local_uses().collect();
                    writeln!(f, "    uses: {}", VarList(uses.iter()))?;
                    f.write_str("    guaranteed: ")?;
                    write_guaranteed(f, guaranteed)?;
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}
