use anyhow::Result;

use inkdash_core::config::{AppConfig, ENV_BIND, ENV_CHAIN_NAME, ENV_CHAIN_SLUG, ENV_UPSTREAM_URL};
use inkdash_core::output::{render, OutputFormat};
use inkdash_core::workspace::config_path;

/// `inkdash config show`: effective config, env overrides applied.
pub fn show(config: &AppConfig, fmt: OutputFormat) -> Result<()> {
    render(fmt, config)?;

    if fmt == OutputFormat::Table {
        println!();
        println!("Edit {} or override with {ENV_UPSTREAM_URL}, {ENV_CHAIN_NAME}, {ENV_CHAIN_SLUG}, {ENV_BIND}.",
            config_path()?.display());
    }
    Ok(())
}

/// `inkdash config path`
pub fn path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}
