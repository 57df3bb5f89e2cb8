//! Test file parsing.
//!
//! A test file starts with a `test <command> [options]` line, followed by
//! functions. The `;` comment lines directly after a function hold its
//! expected output.

/// A test case extracted from a test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// The function text
    pub function_text: String,
    /// The expected output text, with the leading `;` stripped
    pub expected_text: String,
    /// The full test command line (e.g. `test guaranteed-defs unreachable=top`)
    pub command: String,
}

impl TestCase {
    /// The command name without options (`guaranteed-defs`).
    pub fn command_name(&self) -> &str {
        self.command
            .strip_prefix("test ")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("")
    }

    /// The `key=value` options after the command name.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.command
            .split_whitespace()
            .skip(2)
            .filter_map(|opt| opt.split_once('='))
    }

    /// Whether a bare flag (no `=`) follows the command name.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.command.split_whitespace().skip(2).any(|opt| opt == flag)
    }
}

/// Strip the comment marker from an expectation line.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("; ")
        .or_else(|| trimmed.strip_prefix(';'))
        .unwrap_or(trimmed)
}

/// Index of the line holding the brace that closes the function starting at
/// `start`, or the last line if the braces never balance.
fn function_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0usize;
    for (j, line) in lines.iter().enumerate().skip(start) {
        // Braces inside comments do not count
        let code = line.split(';').next().unwrap_or("");
        for ch in code.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return j;
                    }
                }
                _ => {}
            }
        }
    }
    lines.len().saturating_sub(1)
}

/// Parse a test file and extract functions with their expected outputs
pub fn parse_test_file(content: &str) -> Vec<TestCase> {
    let lines: Vec<&str> = content.lines().collect();
    let mut test_cases = Vec::new();
    let mut i = 0;

    // Parse test command from header
    let mut command = String::new();
    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;
        if line.starts_with("test ") {
            command = String::from(line);
            break;
        }
    }

    while i < lines.len() {
        if !lines[i].trim().starts_with("function ") {
            i += 1;
            continue;
        }

        let end = function_end(&lines, i);
        let function_text = lines[i..=end].join("\n");

        // Expected output: the run of comment lines after the function,
        // allowing blank lines before it
        let mut expected_start = end + 1;
        while expected_start < lines.len() && lines[expected_start].trim().is_empty() {
            expected_start += 1;
        }
        let mut expected_end = expected_start;
        while expected_end < lines.len() && lines[expected_end].trim().starts_with(';') {
            expected_end += 1;
        }

        let expected_text = lines[expected_start..expected_end]
            .iter()
            .map(|l| strip_comment(l))
            .collect::<Vec<_>>()
            .join("\n");

        test_cases.push(TestCase {
            function_text,
            expected_text,
            command: command.clone(),
        });
        i = expected_end.max(end + 1);
    }

    test_cases
}

/// Normalize output text for comparison
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| String::from(l.trim()))
        .filter(|l| !l.is_empty())
        .collect()
}
