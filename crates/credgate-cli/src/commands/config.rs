use anyhow::{Context, Result};

use crate::config::AppConfig;

pub fn render(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to encode configuration")
}

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}
