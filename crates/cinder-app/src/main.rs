//! Cinder command-line host.
//!
//! Usage: `cinder <script> [config]`. The config path may also come from
//! `CINDER_CONFIG`; otherwise `cinder.toml` in the working directory is used
//! when present. The script runs as a single batch.

mod config;
mod host_commands;

use std::path::Path;

use anyhow::{Context, Result, bail};

use cinder_terminal::{Interpreter, register_builtins};
use cinder_types::ErrorCode;
use config::AppConfig;
use host_commands::register_host_commands;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let script_path = args.next().context("usage: cinder <script> [config]")?;

    // Resolve config from CLI arg, CINDER_CONFIG env var, or ./cinder.toml.
    let config_path = args.next().or_else(|| std::env::var("CINDER_CONFIG").ok());
    let config = AppConfig::load(config_path.as_deref().map(Path::new))
        .context("loading configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();

    let source = std::fs::read_to_string(&script_path)
        .with_context(|| format!("reading script {script_path}"))?;
    let lines: Vec<&str> = source.lines().collect();
    log::info!("Running {script_path} ({} lines)", lines.len());

    let interp = Interpreter::with_config(config.interpreter.clone());
    if config.interpreter.builtins {
        register_builtins(&interp)?;
    }
    register_host_commands(&interp)?;
    interp.set_completion_hook(|code| log::info!("Script finished: {code}"));

    let code = interp.run_batch(&lines).await?;

    for line in interp.take_output() {
        println!("{line}");
    }
    if config.dump_variables {
        for (name, value) in interp.variables() {
            println!("${name} = {value} ({})", value.type_name());
        }
    }

    if !code.is_success() {
        bail!(failure_report(&script_path, &interp, code));
    }
    Ok(())
}

/// `<script>:<line>: <description>`, with a 1-based line number.
fn failure_report(script_path: &str, interp: &Interpreter, code: ErrorCode) -> String {
    format!("{script_path}:{}: {code}", interp.current_line() + 1)
}
