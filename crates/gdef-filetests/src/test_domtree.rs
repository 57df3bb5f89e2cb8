//! The `domtree` subtest - dominator tree tests
//!
//! Every function is checked with both dominator algorithms; they must print
//! the same tree.

use std::collections::BTreeMap;

use gdef_flow::{AnalysisConfig, DominatorAlgorithm, DominatorSet};
use gdef_ir::{parse_function, ControlFlowGraph};

use crate::filecheck::{has_directives, match_filecheck};
use crate::parser::TestCase;

/// Format the dominator tree in preorder: `inst0: inst1 inst4`, one line per
/// reachable node, children ascending.
fn format_domtree_preorder(cfg: &ControlFlowGraph, doms: &DominatorSet) -> Vec<String> {
    let mut children: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for node in 0..cfg.num_nodes() {
        if let Some(idom) = doms.immediate_dominator(node) {
            children.entry(idom).or_default().push(node);
        }
    }

    fn preorder(node: usize, children: &BTreeMap<usize, Vec<usize>>, output: &mut Vec<String>) {
        let kids = children.get(&node).map(Vec::as_slice).unwrap_or_default();
        if kids.is_empty() {
            output.push(format!("inst{}:", node));
        } else {
            let names: Vec<String> = kids.iter().map(|k| format!("inst{}", k)).collect();
            output.push(format!("inst{}: {}", node, names.join(" ")));
        }
        for &kid in kids {
            preorder(kid, children, output);
        }
    }

    let mut output = Vec::new();
    if let Some(entry) = cfg.entry() {
        preorder(entry, &children, &mut output);
    }
    output
}

/// `dominators:` section: the full set for every node.
fn format_dominators(cfg: &ControlFlowGraph, doms: &DominatorSet) -> Vec<String> {
    (0..cfg.num_nodes())
        .map(|node| {
            let names: Vec<String> = doms
                .dominators(node)
                .into_iter()
                .map(|d| format!("inst{}", d))
                .collect();
            format!("inst{}: [{}]", node, names.join(", "))
        })
        .collect()
}

fn render(cfg: &ControlFlowGraph, doms: &DominatorSet) -> String {
    let mut output = vec![String::from("domtree_preorder {")];
    output.extend(format_domtree_preorder(cfg, doms));
    output.push(String::from("}"));
    output.push(String::from("dominators:"));
    output.extend(format_dominators(cfg, doms));
    output.join("\n")
}

/// Run a single domtree test
pub(crate) fn run_domtree_test(case: &TestCase) -> Result<(), String> {
    if !has_directives(&case.expected_text) {
        return Err(format!(
            "Domtree test has no check directives\n\nFunction:\n{}",
            case.function_text
        ));
    }
    let func = parse_function(case.function_text.trim())
        .map_err(|e| format!("Failed to parse function: {}\n\n{}", e, case.function_text))?;
    let cfg = ControlFlowGraph::from_function(&func)
        .map_err(|e| format!("Failed to build CFG: {}\n\n{}", e, case.function_text))?;

    let mut rendered = Vec::new();
    for algorithm in [DominatorAlgorithm::Iterative, DominatorAlgorithm::Cooper] {
        let config = AnalysisConfig {
            dominators: algorithm,
            ..AnalysisConfig::default()
        };
        let doms = DominatorSet::compute(&cfg, &config)
            .map_err(|e| format!("Dominators ({}) failed: {}", algorithm, e))?;
        rendered.push((algorithm, render(&cfg, &doms)));
    }

    let (_, actual) = &rendered[0];
    for (algorithm, other) in &rendered[1..] {
        if other != actual {
            return Err(format!(
                "Dominator algorithms disagree\n\niterative:\n{}\n\n{}:\n{}\n\nFunction:\n{}",
                actual, algorithm, other, case.function_text
            ));
        }
    }

    match_filecheck(actual, &case.expected_text).map_err(|e| {
        format!(
            "Domtree test failed (filecheck): {}\n\nExpected:\n{}\n\nActual:\n{}\n\nFunction:\n{}",
            e, case.expected_text, actual, case.function_text
        )
    })
}
