//! Parser for the text format.
//!
//! Parses text into IR functions and modules using nom.

mod block;
mod error;
mod function;
mod instructions;
mod module;
mod primitives;
mod whitespace;

use alloc::format;

pub use error::ParseError;
use error::parse_error;
use function::parse_function_internal;
use module::parse_module_internal;
use whitespace::blank;

use crate::{function::Function, module::Module};

/// Parse a function from text.
pub fn parse_function(input: &str) -> Result<Function, ParseError> {
    let (remaining, _) =
        blank(input).map_err(|_| parse_error(input, input, "Failed to skip whitespace"))?;
    match parse_function_internal(remaining) {
        Ok((remaining, (func, labels))) => {
            if !remaining.is_empty() {
                return Err(parse_error(input, remaining, "Unexpected trailing input"));
            }
            check_block_labels(&func, &labels)?;
            Ok(func)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(parse_error(input, e.input, "Failed to parse function"))
        }
        Err(nom::Err::Incomplete(_)) => Err(parse_error(input, "", "Incomplete input")),
    }
}

/// Parse a module from text.
pub fn parse_module(input: &str) -> Result<Module, ParseError> {
    let (remaining, _) =
        blank(input).map_err(|_| parse_error(input, input, "Failed to skip whitespace"))?;
    let raw = match parse_module_internal(remaining) {
        Ok((remaining, raw)) => {
            if !remaining.is_empty() {
                return Err(parse_error(input, remaining, "Unexpected trailing input"));
            }
            raw
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(parse_error(input, e.input, "Failed to parse module"));
        }
        Err(nom::Err::Incomplete(_)) => return Err(parse_error(input, "", "Incomplete input")),
    };

    let mut module = Module::new();
    for (func, labels) in raw.functions {
        check_block_labels(&func, &labels)?;
        let name = func.name.clone();
        if module.add_function(func).is_some() {
            return Err(ParseError::validation(format!(
                "Duplicate function name: %{}",
                name
            )));
        }
    }

    if let Some(entry) = raw.entry {
        if !module.set_entry_function(entry.clone()) {
            return Err(ParseError::validation(format!(
                "Entry function %{} is not defined in the module",
                entry
            )));
        }
    }

    Ok(module)
}

/// Block labels must count up from block0 in the order they are written.
fn check_block_labels(func: &Function, labels: &[u32]) -> Result<(), ParseError> {
    for (expected, &label) in labels.iter().enumerate() {
        if label as usize != expected {
            return Err(ParseError::validation(format!(
                "Function %{}: expected block{}, found block{}",
                func.name, expected, label
            )));
        }
    }
    Ok(())
}
