//! Command-line interface definitions using clap

use std::path::Path;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::{DEFAULT_CONFIG_PATH, StaticConfig};

/// portalkit - portal builder backend
#[derive(Parser)]
#[command(name = "portalkit")]
#[command(version)]
#[command(about = "Backend for a multi-tenant portal builder", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Write a sample configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Generate example configuration file
pub fn generate_config(output_path: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        anyhow::bail!("{} already exists; pass --force to overwrite", path);
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default().save_to_file(&path)?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Environment variables (PORTAL__SECTION__KEY) override file values".dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["portalkit"]);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parses_generate_config() {
        let cli = Cli::parse_from(["portalkit", "-c", "alt.toml", "generate-config", "out.toml"]);
        assert_eq!(cli.config, "alt.toml");
        assert_eq!(
            cli.command,
            Some(Commands::GenerateConfig {
                output_path: Some("out.toml".to_string()),
                force: false
            })
        );
    }

    #[test]
    fn test_generate_config_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        generate_config(Some(path_str.clone()), false).unwrap();
        assert!(generate_config(Some(path_str.clone()), false).is_err());
        generate_config(Some(path_str), true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));
    }
}
