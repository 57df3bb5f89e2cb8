//! Whitespace and comment parsing utilities.

use nom::{
    branch::alt,
    character::complete::{char, multispace1, not_line_ending, space0, space1},
    combinator::{map, recognize},
    multi::many0,
    sequence::pair,
    IResult,
};

/// Parse a `;` comment up to (not including) the end of the line
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), not_line_ending))(input)
}

/// Parse whitespace and comments (spaces, tabs, newlines) - returns the matched string
pub(crate) fn blank_space(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, comment))))(input)
}

/// Parse whitespace and comments and discard result - returns ()
/// This is the main whitespace parser to use between lines
pub(crate) fn blank(input: &str) -> IResult<&str, ()> {
    map(blank_space, |_| ())(input)
}

/// Parse optional spaces and tabs on the current line
pub(crate) fn inline(input: &str) -> IResult<&str, ()> {
    map(space0, |_| ())(input)
}

/// Parse at least one space or tab on the current line
pub(crate) fn inline1(input: &str) -> IResult<&str, ()> {
    map(space1, |_| ())(input)
}
