//! Function parser.

use nom::{
    bytes::complete::tag,
    character::complete::char,
    multi::many1,
    sequence::terminated,
    IResult,
};

use super::{block::parse_block, primitives::parse_function_name, whitespace::blank};
use crate::{block::Block, function::Function};

/// Parse a function (internal, used by module parser)
///
/// Block labels are returned alongside the function so the caller can check
/// that they are numbered in order.
pub(crate) fn parse_function_internal(input: &str) -> IResult<&str, (Function, alloc::vec::Vec<u32>)> {
    let (input, _) = terminated(tag("function"), blank)(input)?;
    let (input, name) = terminated(parse_function_name, blank)(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let (input, blocks) = many1(parse_block)(input)?;

    // Allow whitespace before closing brace
    let (input, _) = terminated(char('}'), blank)(input)?;

    let mut func = Function::new(name);
    let mut labels = alloc::vec::Vec::with_capacity(blocks.len());
    for (label, insts) in blocks {
        labels.push(label);
        func.add_block(Block::with_insts(insts));
    }
    Ok((input, (func, labels)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_internal_minimal() {
        let input = "function %test {\nblock0:\n    x = const 42\n    return x\n}";
        let (remaining, (func, labels)) = parse_function_internal(input).unwrap();
        assert_eq!(remaining, "", "Should consume all input");
        assert_eq!(func.name(), "test");
        assert_eq!(func.blocks.len(), 1);
        assert_eq!(func.blocks[0].insts.len(), 2);
        assert_eq!(labels, [0]);
    }

    #[test]
    fn test_parse_function_internal_multiple_blocks() {
        let input = r#"function %f {
block0:
    brif c, block1, block2
block1:
    return
block2:
    return
}"#;
        let (_, (func, labels)) = parse_function_internal(input).unwrap();
        assert_eq!(func.block_count(), 3);
        assert_eq!(labels, [0, 1, 2]);
    }

    #[test]
    fn test_parse_function_requires_a_block() {
        assert!(parse_function_internal("function %f {\n}").is_err());
    }
}
