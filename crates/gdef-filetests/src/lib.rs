//! File-based tests for the gdef IR and analyses.
//!
//! Similar to Cranelift's filetests, these tests read `.gdef` files that contain:
//! - A test command (`test print-cfg`, `test domtree`, `test guaranteed-defs`)
//! - Functions to test
//! - Expected output as `; check:` / `; nextln:` comments after each function

pub mod filecheck;
pub mod parser;

mod test_cfg;
mod test_domtree;
mod test_guaranteed;

pub use filecheck::match_filecheck;
pub use parser::{parse_test_file, TestCase};

/// Run one test case, dispatching on its command.
pub fn run_test_case(case: &TestCase) -> Result<(), String> {
    match case.command_name() {
        "print-cfg" => test_cfg::run_print_cfg_test(case),
        "domtree" => test_domtree::run_domtree_test(case),
        "guaranteed-defs" => test_guaranteed::run_guaranteed_test(case),
        other => Err(format!("Unknown test command '{}'", other)),
    }
}

/// Run every case in a test file, returning how many ran.
pub fn run_test_file(content: &str) -> Result<usize, String> {
    let cases = parse_test_file(content);
    if cases.is_empty() {
        return Err(String::from("No test cases found in test file"));
    }
    for case in &cases {
        run_test_case(case)?;
    }
    Ok(cases.len())
}

/// Run a test file, panicking with the failure message.
pub fn run_tests_from_file(content: &str) {
    if let Err(e) = run_test_file(content) {
        panic!("{}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command() {
        let err = run_test_file("test frobnicate\nfunction %f {\nblock0:\n    return\n}\n")
            .unwrap_err();
        assert_eq!(err, "Unknown test command 'frobnicate'");
    }

    #[test]
    fn test_empty_file() {
        assert!(run_test_file("test domtree\n").is_err());
    }
}
