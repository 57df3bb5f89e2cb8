//! Variables, globals and instruction operands.

use alloc::string::String;
use core::fmt;

/// A function-local variable.
///
/// Variables are identified by name. Ordering is by name, so sets of
/// variables iterate in a stable, reproducible order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(String);

impl Variable {
    /// Create a variable with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the variable name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A module-level storage slot (`@name`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Global(String);

impl Global {
    /// Create a global with the given name (without the `@` sigil).
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the global name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Something an instruction can define or read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Place {
    /// A local variable. Only locals take part in definition analyses.
    Local(Variable),
    /// A global slot.
    Global(Global),
}

impl Place {
    /// The local variable, if this place is one.
    pub fn as_local(&self) -> Option<&Variable> {
        match self {
            Place::Local(var) => Some(var),
            Place::Global(_) => None,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Local(var) => var.fmt(f),
            Place::Global(global) => global.fmt(f),
        }
    }
}

/// An instruction operand: a local or an integer immediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Var(Variable),
    Imm(i64),
}

impl Operand {
    /// The variable read by this operand, if any.
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Operand::Var(var) => Some(var),
            Operand::Imm(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(var) => var.fmt(f),
            Operand::Imm(value) => write!(f, "{}", value),
        }
    }
}
