//! Guaranteed-definitions Intermediate Representation (IR).
//!
//! This crate defines the program representation consumed by the analyses:
//! - Places (local variables and module-level globals)
//! - Instructions (const, copy, add, call, store, jump, brif, return, etc.)
//! - Blocks (labelled instruction sequences)
//! - Functions and modules
//! - A text parser for all of the above
//! - The instruction-level control flow graph

#![no_std]

extern crate alloc;

mod block;
mod cfg;
mod function;
mod inst;
mod module;
mod parser;
mod place;

pub use block::Block;
pub use cfg::{CfgBuilder, CfgError, ControlFlowGraph, InstNode};
pub use function::Function;
pub use inst::{BinOp, Inst};
pub use module::Module;
pub use parser::{parse_function, parse_module, ParseError};
pub use place::{Global, Operand, Place, Variable};
