use miette::{IntoDiagnostic, Result};
use neurofocus_core::config::{self, AdvisorConfig};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::output::Output;

/// Show current configuration
pub async fn show(config: &AdvisorConfig) -> Result<()> {
    let output = Output::new();

    output.section("Current Configuration");
    output.kv("Model", config.model.model_id());
    println!();

    let toml_str = toml::to_string_pretty(config).into_diagnostic()?;
    println!("{}", toml_str);

    Ok(())
}

/// Save current configuration to file
pub async fn save(config: &AdvisorConfig, path: &Path) -> Result<()> {
    let output = Output::new();

    output.info(
        "💾",
        &format!("Saving configuration to: {}", path.display()),
    );

    config::save_config(config, path).await?;

    output.success("Configuration saved successfully!");
    println!();
    println!("To use this configuration, run:");
    println!(
        "  {} --config {} advise request.json",
        "neurofocus-cli".bright_green(),
        path.display()
    );

    Ok(())
}
