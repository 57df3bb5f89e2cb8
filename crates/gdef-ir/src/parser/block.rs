//! Block parser.

use alloc::vec::Vec;

use nom::{
    character::complete::char,
    multi::many0,
    sequence::terminated,
    IResult,
};

use super::{
    instructions::parse_instruction,
    primitives::parse_block_index,
    whitespace::{blank, inline},
};
use crate::inst::Inst;

/// Parse a block
/// Returns (label index, instructions) tuple
pub(crate) fn parse_block(input: &str) -> IResult<&str, (u32, Vec<Inst>)> {
    let (input, _) = blank(input)?;
    let (input, index) = terminated(parse_block_index, inline)(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;

    // Parse instructions - many0 will stop when it can't parse more,
    // which happens at the next block label or the closing brace
    let (input, insts) = many0(terminated(parse_instruction, blank))(input)?;

    Ok((input, (index, insts)))
}
