//! The `guaranteed-defs` subtest - guaranteed-definitions reports
//!
//! Options on the command line: `unreachable=exclude|top`,
//! `dominators=iterative|cooper`, and the bare flag `units` to check the
//! per-instruction report instead of the compact one.

use gdef_flow::{AnalysisConfig, GuaranteedDefinitions, Report, ReportStyle};
use gdef_ir::{parse_function, ControlFlowGraph};

use crate::filecheck::{has_directives, match_filecheck};
use crate::parser::TestCase;

fn config_for(case: &TestCase) -> Result<AnalysisConfig, String> {
    let mut config = AnalysisConfig::default();
    for (key, value) in case.options() {
        match key {
            "unreachable" => config.unreachable = value.parse().map_err(|e| format!("{}", e))?,
            "dominators" => config.dominators = value.parse().map_err(|e| format!("{}", e))?,
            _ => return Err(format!("Unknown option '{}' in '{}'", key, case.command)),
        }
    }
    Ok(config)
}

/// Run a single guaranteed-defs test
pub(crate) fn run_guaranteed_test(case: &TestCase) -> Result<(), String> {
    if !has_directives(&case.expected_text) {
        return Err(format!(
            "Guaranteed-defs test has no check directives\n\nFunction:\n{}",
            case.function_text
        ));
    }
    let config = config_for(case)?;
    let style = if case.has_flag("units") {
        ReportStyle::Units
    } else {
        ReportStyle::Compact
    };

    let func = parse_function(case.function_text.trim())
        .map_err(|e| format!("Failed to parse function: {}\n\n{}", e, case.function_text))?;
    let cfg = ControlFlowGraph::from_function(&func)
        .map_err(|e| format!("Failed to build CFG: {}\n\n{}", e, case.function_text))?;
    let defs = GuaranteedDefinitions::compute(&cfg, &config)
        .map_err(|e| format!("Analysis failed: {}\n\n{}", e, case.function_text))?;

    let actual = Report::new(&cfg, &defs, style).to_string();
    match_filecheck(&actual, &case.expected_text).map_err(|e| {
        format!(
            "Guaranteed-defs test failed (filecheck): {}\n\nExpected:\n{}\n\nActual:\n{}\n\nFunction:\n{}",
            e, case.expected_text, actual, case.function_text
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_test_file, run_tests_from_file};

    #[test]
    fn test_guaranteed_branches() {
        run_tests_from_file(include_str!("../filetests/guaranteed/branches.gdef"));
    }

    #[test]
    fn test_guaranteed_loops() {
        run_tests_from_file(include_str!("../filetests/guaranteed/loops.gdef"));
    }

    #[test]
    fn test_guaranteed_unreachable_top() {
        run_tests_from_file(include_str!("../filetests/guaranteed/unreachable-top.gdef"));
    }

    #[test]
    fn test_guaranteed_units() {
        run_tests_from_file(include_str!("../filetests/guaranteed/units.gdef"));
    }

    #[test]
    fn test_guaranteed_unknown_option() {
        let cases = parse_test_file(
            "test guaranteed-defs speed=fast\nfunction %f {\nblock0:\n    return\n}\n; check: inst0",
        );
        let err = run_guaranteed_test(&cases[0]).unwrap_err();
        assert!(err.contains("Unknown option 'speed'"), "{}", err);
    }

    #[test]
    fn test_guaranteed_failing_check_is_reported() {
        let cases = parse_test_file(
            "test guaranteed-defs\nfunction %f {\nblock0:\n    x = const 1\n    return x\n}\n; check: inst1: []",
        );
        assert!(run_guaranteed_test(&cases[0]).is_err());
    }
}
