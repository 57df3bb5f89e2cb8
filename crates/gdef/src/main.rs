//! `gdef`: guaranteed-definitions report for a text module.

mod cli;
mod driver;

use std::io::Write;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let args: cli::Args = argh::from_env();

    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(args.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let module = driver::load_module(&text)
        .with_context(|| format!("parsing {}", args.file.display()))?;
    let functions = driver::select_functions(&module, args.function.as_deref())?;
    log::debug!(
        "analysing {} function(s) from {}",
        functions.len(),
        args.file.display()
    );

    let config = args.config();
    let style = args.style();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (i, func) in functions.into_iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let report = driver::analyse_function(func, &config, style)?;
        out.write_all(report.as_bytes())?;
    }
    Ok(())
}
