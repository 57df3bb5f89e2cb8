//! Module parser.

use alloc::{string::String, vec::Vec};

use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::opt,
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};

use super::{
    function::parse_function_internal, primitives::parse_function_name, whitespace::blank,
};
use crate::function::Function;

/// A module as written, before duplicate and entry checks.
pub(crate) struct RawModule {
    pub(crate) entry: Option<String>,
    pub(crate) functions: Vec<(Function, Vec<u32>)>,
}

/// Parse an entry declaration: entry: %name
fn parse_entry(input: &str) -> IResult<&str, String> {
    let (input, _) = terminated(tag("entry"), blank)(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;
    let (input, name) = terminated(parse_function_name, blank)(input)?;
    Ok((input, name))
}

/// Parse a module (internal)
pub(crate) fn parse_module_internal(input: &str) -> IResult<&str, RawModule> {
    let (input, _) = terminated(tag("module"), blank)(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let (input, entry) = opt(parse_entry)(input)?;

    // Consume whitespace before each function (many0 doesn't do this automatically)
    let (input, functions) = many0(preceded(blank, parse_function_internal))(input)?;

    let (input, _) = terminated(char('}'), blank)(input)?;

    Ok((input, RawModule { entry, functions }))
}
