use crate::cli::{Cli, ConfigCommands};
use crate::config::McpConfig;
use anyhow::Result;

pub fn run(cmd: ConfigCommands, cli: &Cli) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(cli),
        ConfigCommands::Show => show(cli),
    }
}

fn validate(cli: &Cli) -> Result<()> {
    let path = &cli.config;
    let file_config = if path.exists() {
        match McpConfig::load(path) {
            Ok(config) => config,
            Err(e) => anyhow::bail!("❌ Failed to parse {}: {}", path.display(), e),
        }
    } else {
        println!("No config file at {}, checking defaults and overrides.", path.display());
        McpConfig::default()
    };

    let errors = cli.apply_overrides(file_config).validate();
    if errors.is_empty() {
        println!("✅ {} is valid.", path.display());
        return Ok(());
    }

    println!("❌ Validation errors in {}:", path.display());
    for e in &errors {
        println!("  - {}", e);
    }
    anyhow::bail!("{} validation error(s)", errors.len())
}

fn show(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config();
    match toml::to_string_pretty(&config) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}
