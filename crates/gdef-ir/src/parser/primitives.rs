//! Primitive parsers for names, places, operands and literals.

use alloc::string::{String, ToString};

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{map, map_res, not, opt, peek, recognize},
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::place::{Global, Operand, Variable};

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Parse an identifier: a letter or `_` followed by letters, digits, `_` or `$`
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

/// Parse a keyword that is not the prefix of a longer identifier
pub(crate) fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_ident_char))))
}

/// Parse an integer literal
pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    map_res(
        recognize(pair(
            opt(char('-')),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
        |s: &str| s.parse::<i64>(),
    )(input)
}

/// Parse an unsigned index literal
pub(crate) fn index(input: &str) -> IResult<&str, u32> {
    map_res(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<u32>()
    })(input)
}

/// Parse a local variable (x, tmp_1, ...)
pub(crate) fn parse_variable(input: &str) -> IResult<&str, Variable> {
    map(identifier, Variable::new)(input)
}

/// Parse a global (@name)
pub(crate) fn parse_global(input: &str) -> IResult<&str, Global> {
    map(preceded(char('@'), identifier), Global::new)(input)
}

/// Parse an operand: an integer literal or a local variable
pub(crate) fn parse_operand(input: &str) -> IResult<&str, Operand> {
    if let Ok((rest, value)) = integer(input) {
        return Ok((rest, Operand::Imm(value)));
    }
    map(parse_variable, Operand::Var)(input)
}

/// Parse a function name (%name)
pub(crate) fn parse_function_name(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            char('%'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        ),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a block index (block0, block1, etc.)
pub(crate) fn parse_block_index(input: &str) -> IResult<&str, u32> {
    preceded(tag("block"), index)(input)
}
