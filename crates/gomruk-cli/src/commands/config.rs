//! Config command - inspect and edit the configuration file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use gomruk_core::GomrukConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key
    Get {
        /// Dotted key, e.g. "pdf.max_pages"
        key: String,
    },

    /// Change one value by dotted key
    Set {
        /// Dotted key, e.g. "ocr.enabled"
        key: String,
        /// JSON value; anything else is stored as a string
        value: String,
    },

    /// Show where the configuration file lives
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = read_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            write(&path, &GomrukConfig::default())?;
            println!(
                "{} Created configuration file at {}",
                style("✓").green(),
                path.display()
            );
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let mut json = serde_json::to_value(read_or_default(&path)?)?;
            assign(&mut json, &key, value.clone())?;

            let config: GomrukConfig = serde_json::from_value(json)
                .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
            write(&path, &config)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'gomruk config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

fn read_or_default(path: &PathBuf) -> anyhow::Result<GomrukConfig> {
    if path.exists() {
        Ok(GomrukConfig::from_file(path)?)
    } else {
        Ok(GomrukConfig::default())
    }
}

fn write(path: &PathBuf, config: &GomrukConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |node, part| {
        node.get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace an existing value. Unknown keys are rejected.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key.split('.').try_fold(json, |node, part| {
        node.get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })?;
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_and_assign() {
        let mut config = serde_json::to_value(GomrukConfig::default()).unwrap();

        assert_eq!(lookup(&config, "pdf.max_pages").unwrap(), &json!(10));
        assert!(lookup(&config, "pdf.nope").is_err());

        assign(&mut config, "ocr.enabled", json!(false)).unwrap();
        let parsed: GomrukConfig = serde_json::from_value(config.clone()).unwrap();
        assert!(!parsed.ocr.enabled);

        assert!(assign(&mut config, "ocr.language", json!("eng")).is_err());
    }
}
