//! Matching analysis output against `check:`/`nextln:` directives with the
//! filecheck crate.

use filecheck::{Checker, CheckerBuilder, NO_VARIABLES};

/// Build a filechecker from expected text containing directives.
///
/// Lines that are not directives are ignored by the builder, so free-form
/// notes can sit between them.
pub fn build_filechecker(expected_text: &str) -> Result<Checker, String> {
    let mut builder = CheckerBuilder::new();
    for line in expected_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        builder
            .directive(trimmed)
            .map_err(|e| format!("Failed to parse filecheck directive '{}': {}", trimmed, e))?;
    }
    Ok(builder.finish())
}

/// Match actual output against filecheck directives.
pub fn match_filecheck(actual: &str, expected_text: &str) -> Result<(), String> {
    let checker = build_filechecker(expected_text)?;

    if checker
        .check(actual, NO_VARIABLES)
        .map_err(|e| format!("Filecheck error: {}", e))?
    {
        Ok(())
    } else {
        let (_, explain) = checker
            .explain(actual, NO_VARIABLES)
            .map_err(|e| format!("Failed to get filecheck explanation: {}", e))?;
        Err(format!("Filecheck failed:\n{}", explain))
    }
}

/// Whether the expected text carries any directive at all.
pub fn has_directives(expected_text: &str) -> bool {
    expected_text.lines().any(|line| {
        let trimmed = line.trim_start();
        ["check:", "nextln:", "sameln:", "not:", "unordered:", "regex:"]
            .iter()
            .any(|d| trimmed.starts_with(d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filecheck_matches_in_order() {
        let expected = "check: inst0: []\nnextln: inst1: [a]";
        assert!(match_filecheck("inst0: []\ninst1: [a]\n", expected).is_ok());
        assert!(match_filecheck("inst1: [a]\ninst0: []\n", expected).is_err());
    }

    #[test]
    fn test_has_directives() {
        assert!(has_directives("check: x"));
        assert!(has_directives("note\n  nextln: y"));
        assert!(!has_directives("just a comment"));
    }
}
