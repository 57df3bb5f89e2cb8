//! Loading a text module and running the analysis over selected functions.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context};
use gdef_flow::{AnalysisConfig, GuaranteedDefinitions, Report, ReportStyle};
use gdef_ir::{parse_function, parse_module, ControlFlowGraph, Function, Module};

/// Whether the first non-blank, non-comment line opens a module.
fn is_module_text(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with(';'))
        .is_some_and(|line| line.starts_with("module"))
}

/// Parse either a `module { ... }` or a single `function %f { ... }`.
///
/// A lone function becomes a module whose entry is that function.
pub fn load_module(text: &str) -> anyhow::Result<Module> {
    if is_module_text(text) {
        return Ok(parse_module(text)?);
    }
    let func = parse_function(text)?;
    let name = func.name.clone();
    let mut module = Module::new();
    module.add_function(func);
    module.set_entry_function(name);
    Ok(module)
}

/// The named function, else the module entry, else every function by name.
pub fn select_functions<'m>(module: &'m Module, name: Option<&str>) -> anyhow::Result<Vec<&'m Function>> {
    if let Some(name) = name {
        let func = module.get_function(name).ok_or_else(|| {
            anyhow!(
                "no function %{} in module (available: {})",
                name,
                module.function_names().join(", ")
            )
        })?;
        return Ok(vec![func]);
    }
    if let Some(entry) = module.entry_function() {
        return Ok(vec![entry]);
    }
    if module.function_count() == 0 {
        bail!("module has no functions");
    }
    Ok(module.functions.values().collect())
}

/// Analyse one function and render its report.
pub fn analyse_function(
    func: &Function,
    config: &AnalysisConfig,
    style: ReportStyle,
) -> anyhow::Result<String> {
    let cfg = ControlFlowGraph::from_function(func)
        .with_context(|| format!("building control flow graph for %{}", func.name()))?;
    let defs = GuaranteedDefinitions::compute(&cfg, config)
        .with_context(|| format!("analysing %{}", func.name()))?;
    log::info!(
        "%{}: {} instructions, {} variables, {} steps",
        func.name(),
        cfg.num_nodes(),
        defs.variables().len(),
        defs.steps()
    );

    let mut out = String::new();
    writeln!(out, "function %{}:", func.name())?;
    write!(out, "{}", Report::new(&cfg, &defs, style))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = r#"
; two functions, helper first by name
module {
    entry: %main
    function %main {
    block0:
        x = param 0
        r = call %helper(x)
        return r
    }
    function %helper {
    block0:
        a = param 0
        return a
    }
}
"#;

    #[test]
    fn test_load_module_or_function() {
        let module = load_module(MODULE).unwrap();
        assert_eq!(module.function_count(), 2);

        let single = load_module("function %f {\nblock0:\n    return\n}").unwrap();
        assert_eq!(single.entry_function().map(Function::name), Some("f"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let err = load_module("module {\nentry: %nope\n}").unwrap_err();
        assert!(err.to_string().contains("%nope"), "{}", err);
    }

    #[test]
    fn test_select_functions() {
        let mut module = load_module(MODULE).unwrap();
        let named = select_functions(&module, Some("helper")).unwrap();
        assert_eq!(named[0].name(), "helper");

        let entry = select_functions(&module, None).unwrap();
        assert_eq!(entry[0].name(), "main");

        module.entry_function = None;
        let all: Vec<&str> = select_functions(&module, None)
            .unwrap()
            .into_iter()
            .map(Function::name)
            .collect();
        assert_eq!(all, vec!["helper", "main"]);

        let err = select_functions(&module, Some("missing")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no function %missing in module (available: helper, main)"
        );
    }

    #[test]
    fn test_analyse_function() {
        let module = load_module(MODULE).unwrap();
        let main = module.get_function("main").unwrap();
        let out = analyse_function(main, &AnalysisConfig::default(), ReportStyle::Compact).unwrap();
        assert_eq!(out, "function %main:\ninst0: []\ninst1: [x]\ninst2: [r, x]\n");
    }

    #[test]
    fn test_analyse_reports_bad_branch() {
        let module = load_module("function %f {\nblock0:\n    jump block4\n}").unwrap();
        let func = module.get_function("f").unwrap();
        let err = analyse_function(func, &AnalysisConfig::default(), ReportStyle::Units).unwrap_err();
        assert_eq!(err.to_string(), "building control flow graph for %f");
        assert!(format!("{:#}", err).contains("block4"));
    }
}
