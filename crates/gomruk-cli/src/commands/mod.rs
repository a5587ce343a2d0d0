//! Subcommands and the helpers they share.

pub mod config;
pub mod extract;
pub mod fill;
pub mod models;
pub mod parse;

use std::path::{Path, PathBuf};

use gomruk_core::fields::RuleHit;
use gomruk_core::{FieldKind, FieldRecord, GomrukConfig};

/// Output format for extracted fields.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gomruk")
        .join("config.json")
}

/// Load the configuration from `path`, the default location, or defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<GomrukConfig> {
    if let Some(path) = path {
        return Ok(GomrukConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(GomrukConfig::from_file(&default_path)?)
    } else {
        Ok(GomrukConfig::default())
    }
}

/// Directory models are read from and downloaded to.
///
/// Relative `models.model_dir` values live under the user data directory.
pub fn model_dir(config: &GomrukConfig) -> PathBuf {
    let dir = &config.models.model_dir;
    if dir.is_absolute() {
        dir.clone()
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gomruk")
            .join(dir)
    }
}

/// Render a field record.
pub fn format_record(record: &FieldRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &FieldRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(FieldKind::ALL.iter().map(|k| k.as_str()))?;
    wtr.write_record(FieldKind::ALL.iter().map(|k| record.get(*k).unwrap_or_default()))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &FieldRecord) -> String {
    if record.is_empty() {
        return "No fields found\n".to_string();
    }

    let mut output = String::new();
    for (kind, value) in record.iter() {
        output.push_str(&format!("{:<16} {}\n", format!("{}:", kind), value));
    }
    output
}

/// Render the rule audit of a parse.
pub fn format_hits(hits: &[RuleHit]) -> String {
    let mut output = String::new();
    for hit in hits {
        output.push_str(&format!(
            "  {:<16} {:<22} {:.2}  {}\n",
            hit.field.as_str(),
            hit.rule,
            hit.confidence,
            hit.source.replace('\n', " ")
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldRecord {
        let mut record = FieldRecord::default();
        record.set(FieldKind::CompanyName, "GLB LOGISTICS, CORP");
        record.set(FieldKind::Voen, "99-0667903");
        record
    }

    #[test]
    fn test_csv_has_every_column() {
        let csv = format_csv(&sample()).unwrap();
        let mut lines = csv.lines();

        assert!(lines.next().unwrap().starts_with("companyName,companyAddress,voen"));
        assert!(lines.next().unwrap().starts_with("\"GLB LOGISTICS, CORP\",,99-0667903"));
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(&sample());
        assert!(text.contains("companyName:"));
        assert!(text.contains("99-0667903"));
        assert_eq!(format_text(&FieldRecord::default()), "No fields found\n");
    }
}
