//! Extract command - pull text and fields out of a PDF.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use gomruk_core::fields::RuleHit;
use gomruk_core::{
    AssetLocation, ExtractionOrchestrator, ExtractionReport, FieldRecord, GomrukConfig,
    GomrukError, PdfDocument, PureOcrFactory, RuleBasedFieldParser,
};

use super::{OutputFormat, format_hits, format_record, load_config, model_dir};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF's own text
    #[arg(long)]
    text_only: bool,

    /// Maximum number of pages to process
    #[arg(long)]
    max_pages: Option<u32>,

    /// Include the merged document text in the output
    #[arg(long)]
    show_text: bool,

    /// Show which rule produced each field
    #[arg(long)]
    explain: bool,
}

/// Everything an extraction run produced, as written for `--format json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOutput {
    pub file: String,
    pub pages: usize,
    pub recognized_pages: Vec<u32>,
    pub failed_pages: Vec<u32>,
    pub skipped_pages: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub fields: FieldRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<Vec<RuleHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {} (expected a PDF)", extension);
    }

    if args.text_only {
        config.ocr.enabled = false;
    }
    if let Some(max_pages) = args.max_pages {
        config.pdf.max_pages = max_pages;
    }
    let models = args.model_dir.clone().unwrap_or_else(|| model_dir(&config));

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Reading PDF...");

    let data = fs::read(&args.input)?;
    let report = {
        let pb = pb.clone();
        tokio::task::spawn_blocking(move || extract_pdf(&data, &config, models, &pb)).await?
    };

    let report = match report {
        Ok(report) => report,
        Err(GomrukError::Extraction(e)) => {
            pb.finish_and_clear();
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("ℹ").blue(), hint);
            }
            anyhow::bail!("{}", e);
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.set_message("Extracting fields...");
    let parsed = RuleBasedFieldParser::new().parse_detailed(report.text.as_str());
    pb.finish_and_clear();

    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
    if args.explain {
        eprintln!("{}", style("Rule hits:").bold());
        eprint!("{}", format_hits(&parsed.hits));
    }

    let output = match args.format {
        OutputFormat::Json => {
            let output = ExtractOutput {
                file: args.input.display().to_string(),
                pages: report.pages.len(),
                recognized_pages: report.recognized_pages.clone(),
                failed_pages: report.failed_pages.clone(),
                skipped_pages: report.skipped_pages.clone(),
                warnings: report.warnings.clone(),
                fields: parsed.record,
                hits: args.explain.then_some(parsed.hits),
                text: args.show_text.then(|| report.text.as_str().to_string()),
            };
            serde_json::to_string_pretty(&output)?
        }
        format => {
            let mut output = format_record(&parsed.record, format)?;
            if args.show_text && matches!(format, OutputFormat::Text) {
                output.push_str("\n--- Document text ---\n");
                output.push_str(report.text.as_str());
                output.push('\n');
            }
            output
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub(super) fn extract_pdf(
    data: &[u8],
    config: &GomrukConfig,
    models: PathBuf,
    pb: &ProgressBar,
) -> gomruk_core::Result<ExtractionReport> {
    let document = PdfDocument::load(data)?;

    let orchestrator = ExtractionOrchestrator::new(PureOcrFactory::new(config), config)
        .with_assets(AssetLocation::Local(models));

    pb.set_message("Extracting text...");
    orchestrator.extract_with_progress(&document, &mut |progress| {
        pb.set_message(format!(
            "OCR page {}: {}%",
            progress.page, progress.percent
        ));
    })
}
