//! Parse command - extract fields from text that is already available.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use gomruk_core::{RuleBasedFieldParser, TextNormalizer};

use super::{OutputFormat, format_hits, format_record};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse (`-` reads stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Correct OCR misreads before parsing
    #[arg(long)]
    normalize: bool,

    /// Show which rule produced each field
    #[arg(long)]
    explain: bool,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    let text = if args.normalize {
        TextNormalizer::new().normalize(&text)
    } else {
        text
    };

    let report = RuleBasedFieldParser::new().parse_detailed(&text);

    if args.explain {
        eprintln!("{}", style("Rule hits:").bold());
        eprint!("{}", format_hits(&report.hits));
        if !report.missing.is_empty() {
            let missing: Vec<&str> = report.missing.iter().map(|k| k.as_str()).collect();
            eprintln!("{} Not found: {}", style("ℹ").blue(), missing.join(", "));
        }
    }

    println!("{}", format_record(&report.record, args.format)?);

    Ok(())
}

/// Read a text input, `-` meaning stdin.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}
