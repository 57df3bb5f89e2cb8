//! IR instructions.

use alloc::{string::String, vec, vec::Vec};
use core::fmt;

use crate::place::{Global, Operand, Place, Variable};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Look up an operator by its mnemonic.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        let op = match name {
            "add" => BinOp::Add,
            "sub" => BinOp::Sub,
            "mul" => BinOp::Mul,
            "div" => BinOp::Div,
            "rem" => BinOp::Rem,
            "and" => BinOp::And,
            "or" => BinOp::Or,
            "xor" => BinOp::Xor,
            "eq" => BinOp::Eq,
            "ne" => BinOp::Ne,
            "lt" => BinOp::Lt,
            "le" => BinOp::Le,
            "gt" => BinOp::Gt,
            "ge" => BinOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    /// The mnemonic used in the text format.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Rem => "rem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Eq => "eq",
            BinOp::Ne => "ne",
            BinOp::Lt => "lt",
            BinOp::Le => "le",
            BinOp::Gt => "gt",
            BinOp::Ge => "ge",
        }
    }
}

/// An IR instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Integer constant: dest = value
    Const { dest: Variable, value: i64 },
    /// Copy: dest = src
    Copy { dest: Variable, src: Operand },
    /// Incoming function parameter: dest = param[index]
    Param { dest: Variable, index: u32 },
    /// Binary operation: dest = lhs op rhs
    Binary {
        op: BinOp,
        dest: Variable,
        lhs: Operand,
        rhs: Operand,
    },
    /// Read a global: dest = @global
    Load { dest: Variable, global: Global },
    /// Write a global: @global = value
    Store { global: Global, value: Operand },
    /// Call, optionally binding the result
    Call {
        dest: Option<Variable>,
        callee: String,
        args: Vec<Operand>,
    },
    /// Does nothing
    Nop,

    // Control flow
    /// Jump to block
    Jump { target: u32 },
    /// Conditional branch: if condition != 0, jump to target_true, else target_false
    Brif {
        condition: Operand,
        target_true: u32,
        target_false: u32,
    },
    /// Return, optionally with a value
    Return { value: Option<Operand> },
}

impl Inst {
    /// Places written by this instruction, in operand order.
    pub fn defs(&self) -> Vec<Place> {
        match self {
            Inst::Const { dest, .. }
            | Inst::Copy { dest, .. }
            | Inst::Param { dest, .. }
            | Inst::Binary { dest, .. }
            | Inst::Load { dest, .. } => vec![Place::Local(dest.clone())],
            Inst::Call { dest, .. } => dest.iter().cloned().map(Place::Local).collect(),
            Inst::Store { global, .. } => vec![Place::Global(global.clone())],
            Inst::Nop | Inst::Jump { .. } | Inst::Brif { .. } | Inst::Return { .. } => {
                Vec::new()
            }
        }
    }

    /// Places read by this instruction, in operand order.
    pub fn uses(&self) -> Vec<Place> {
        let operands: Vec<&Operand> = match self {
            Inst::Copy { src, .. } => vec![src],
            Inst::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Inst::Store { value, .. } => vec![value],
            Inst::Call { args, .. } => args.iter().collect(),
            Inst::Brif { condition, .. } => vec![condition],
            Inst::Return { value } => value.iter().collect(),
            Inst::Load { global, .. } => return vec![Place::Global(global.clone())],
            Inst::Const { .. } | Inst::Param { .. } | Inst::Nop | Inst::Jump { .. } => {
                Vec::new()
            }
        };
        operands
            .into_iter()
            .filter_map(Operand::variable)
            .cloned()
            .map(Place::Local)
            .collect()
    }

    /// Blocks this instruction may transfer control to.
    pub fn branch_targets(&self) -> Vec<u32> {
        match self {
            Inst::Jump { target } => vec![*target],
            Inst::Brif {
                target_true,
                target_false,
                ..
            } => vec![*target_true, *target_false],
            _ => Vec::new(),
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Inst::Jump { .. } | Inst::Brif { .. } | Inst::Return { .. }
        )
    }
}

fn write_operands(f: &mut fmt::Formatter<'_>, operands: &[Operand]) -> fmt::Result {
    for (i, op) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", op)?;
    }
    Ok(())
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Const { dest, value } => write!(f, "{} = const {}", dest, value),
            Inst::Copy { dest, src } => write!(f, "{} = copy {}", dest, src),
            Inst::Param { dest, index } => write!(f, "{} = param {}", dest, index),
            Inst::Binary { op, dest, lhs, rhs } => {
                write!(f, "{} = {} {}, {}", dest, op.mnemonic(), lhs, rhs)
            }
            Inst::Load { dest, global } => write!(f, "{} = load {}", dest, global),
            Inst::Store { global, value } => write!(f, "store {}, {}", global, value),
            Inst::Call { dest, callee, args } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", dest)?;
                }
                write!(f, "call %{}(", callee)?;
                write_operands(f, args)?;
                f.write_str(")")
            }
            Inst::Nop => f.write_str("nop"),
            Inst::Jump { target } => write!(f, "jump block{}", target),
            Inst::Brif {
                condition,
                target_true,
                target_false,
            } => write!(
                f,
                "brif {}, block{}, block{}",
                condition, target_true, target_false
            ),
            Inst::Return { value: Some(value) } => write!(f, "return {}", value),
            Inst::Return { value: None } => f.write_str("return"),
        }
    }
}
