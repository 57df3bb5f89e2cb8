//! Instruction parsers.

use alloc::vec::Vec;

use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, map_opt, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::{
    primitives::{
        identifier, index, integer, keyword, parse_block_index, parse_function_name,
        parse_global, parse_operand, parse_variable,
    },
    whitespace::{inline, inline1},
};
use crate::{
    inst::{BinOp, Inst},
    place::{Operand, Variable},
};

/// Parse a comma with optional surrounding spaces
fn comma(input: &str) -> IResult<&str, char> {
    delimited(inline, char(','), inline)(input)
}

/// Parse call arguments: (a, 1, b)
fn parse_call_args(input: &str) -> IResult<&str, Vec<Operand>> {
    delimited(
        terminated(char('('), inline),
        separated_list0(comma, parse_operand),
        preceded(inline, char(')')),
    )(input)
}

/// Parse a call: call %name(args)
fn parse_call(input: &str) -> IResult<&str, (alloc::string::String, Vec<Operand>)> {
    let (input, _) = terminated(keyword("call"), inline1)(input)?;
    let (input, callee) = terminated(parse_function_name, inline)(input)?;
    let (input, args) = parse_call_args(input)?;
    Ok((input, (callee, args)))
}

/// Parse the right-hand side of an assignment to `dest`
fn parse_rhs(dest: Variable) -> impl FnMut(&str) -> IResult<&str, Inst> {
    move |input: &str| {
        if let Ok((input, value)) = preceded(terminated(keyword("const"), inline1), integer)(input)
        {
            return Ok((
                input,
                Inst::Const {
                    dest: dest.clone(),
                    value,
                },
            ));
        }
        if let Ok((input, src)) = preceded(terminated(keyword("copy"), inline1), parse_operand)(input)
        {
            return Ok((
                input,
                Inst::Copy {
                    dest: dest.clone(),
                    src,
                },
            ));
        }
        if let Ok((input, index)) = preceded(terminated(keyword("param"), inline1), index)(input) {
            return Ok((
                input,
                Inst::Param {
                    dest: dest.clone(),
                    index,
                },
            ));
        }
        if let Ok((input, global)) = preceded(terminated(keyword("load"), inline1), parse_global)(input)
        {
            return Ok((
                input,
                Inst::Load {
                    dest: dest.clone(),
                    global,
                },
            ));
        }
        if let Ok((input, (callee, args))) = parse_call(input) {
            return Ok((
                input,
                Inst::Call {
                    dest: Some(dest.clone()),
                    callee,
                    args,
                },
            ));
        }

        // Binary operation: op lhs, rhs
        let (input, op) = terminated(map_opt(identifier, BinOp::from_mnemonic), inline1)(input)?;
        let (input, lhs) = parse_operand(input)?;
        let (input, _) = comma(input)?;
        let (input, rhs) = parse_operand(input)?;
        Ok((
            input,
            Inst::Binary {
                op,
                dest: dest.clone(),
                lhs,
                rhs,
            },
        ))
    }
}

/// Parse an assignment: x = <rhs>
fn parse_assignment(input: &str) -> IResult<&str, Inst> {
    let (input, dest) = terminated(parse_variable, inline)(input)?;
    let (input, _) = terminated(char('='), inline)(input)?;
    parse_rhs(dest)(input)
}

/// Parse a call whose result is discarded
fn parse_call_stmt(input: &str) -> IResult<&str, Inst> {
    map(parse_call, |(callee, args)| Inst::Call {
        dest: None,
        callee,
        args,
    })(input)
}

/// Parse: store @g, value
fn parse_store(input: &str) -> IResult<&str, Inst> {
    map(
        tuple((
            terminated(keyword("store"), inline1),
            parse_global,
            comma,
            parse_operand,
        )),
        |(_, global, _, value)| Inst::Store { global, value },
    )(input)
}

/// Parse: jump blockN
fn parse_jump(input: &str) -> IResult<&str, Inst> {
    map(
        preceded(terminated(keyword("jump"), inline1), parse_block_index),
        |target| Inst::Jump { target },
    )(input)
}

/// Parse: brif cond, blockN, blockM
fn parse_brif(input: &str) -> IResult<&str, Inst> {
    map(
        tuple((
            terminated(keyword("brif"), inline1),
            parse_operand,
            comma,
            parse_block_index,
            comma,
            parse_block_index,
        )),
        |(_, condition, _, target_true, _, target_false)| Inst::Brif {
            condition,
            target_true,
            target_false,
        },
    )(input)
}

/// Parse: return [value]
///
/// The value must be on the same line, so a bare `return` followed by the
/// next block label is not mistaken for `return block1`.
fn parse_return(input: &str) -> IResult<&str, Inst> {
    map(
        preceded(keyword("return"), opt(preceded(inline1, parse_operand))),
        |value| Inst::Return { value },
    )(input)
}

fn parse_nop(input: &str) -> IResult<&str, Inst> {
    map(keyword("nop"), |_| Inst::Nop)(input)
}

/// Parse a single instruction (without surrounding whitespace)
pub(crate) fn parse_instruction(input: &str) -> IResult<&str, Inst> {
    alt((
        parse_assignment,
        parse_jump,
        parse_brif,
        parse_return,
        parse_store,
        parse_call_stmt,
        parse_nop,
    ))(input)
}
