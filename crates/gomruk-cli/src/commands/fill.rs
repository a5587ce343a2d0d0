//! Fill command - write extracted fields into saved form pages.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use indicatif::ProgressBar;
use tracing::{debug, info};

use gomruk_core::fill::fill_target;
use gomruk_core::{
    Dom, FieldParser, FieldRecord, FillReport, FillStatus, FrameSummary, GomrukConfig,
    RuleBasedFieldParser, TextNormalizer,
};

use super::extract::extract_pdf;
use super::parse::read_input;
use super::{load_config, model_dir};

/// Arguments for the fill command.
#[derive(Args)]
pub struct FillArgs {
    /// Target page URL or origin, used to pick the site profile
    #[arg(short, long)]
    url: String,

    /// Saved HTML of the target page; pass once per frame
    #[arg(long = "html", required = true, num_args = 1..)]
    frames: Vec<PathBuf>,

    /// Field source: a PDF, a JSON field record, or text (`-` reads stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the filled pages are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR when the input is a PDF
    #[arg(long)]
    text_only: bool,

    /// Print the fill summary as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: FillArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.text_only {
        config.ocr.enabled = false;
    }

    let record = load_record(&args, &config).await?;
    if record.is_empty() {
        eprintln!("{} No fields were found in {}", style("⚠").yellow(), args.input.display());
    }

    let mut reports = Vec::with_capacity(args.frames.len());
    for frame in &args.frames {
        let html = fs::read_to_string(frame)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", frame.display(), e))?;
        let mut dom = Dom::parse(&html);

        let report = fill_target(&record, &args.url, &mut dom, &config.fill);
        debug!("{}: {:?}", frame.display(), report.status);

        if let Some(dir) = &args.output {
            if report.outcome.filled_count > 0 {
                let path = write_frame(dir, frame, &dom)?;
                info!("Wrote {}", path.display());
            }
        }
        reports.push(report);
    }

    let summary = FrameSummary::aggregate(reports);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for (frame, report) in args.frames.iter().zip(&summary.frames) {
        print_frame(frame, report);
    }
    println!();
    match summary.status {
        FillStatus::Filled => println!(
            "{} Filled {} field(s)",
            style("✓").green().bold(),
            summary.filled_count
        ),
        FillStatus::NothingFilled => println!(
            "{} No fields were filled",
            style("⚠").yellow().bold()
        ),
        FillStatus::UnsupportedTarget => println!(
            "{} Unsupported target: {}",
            style("ℹ").blue().bold(),
            args.url
        ),
    }

    Ok(())
}

async fn load_record(args: &FillArgs, config: &GomrukConfig) -> anyhow::Result<FieldRecord> {
    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(&args.input)?;
            let config = config.clone();
            let models = args.model_dir.clone().unwrap_or_else(|| model_dir(&config));
            let pb = ProgressBar::hidden();

            let report =
                tokio::task::spawn_blocking(move || extract_pdf(&data, &config, models, &pb))
                    .await??;
            Ok(RuleBasedFieldParser::new().parse(report.text.as_str()))
        }
        "json" => {
            let json = read_input(&args.input)?;
            Ok(serde_json::from_str(&json)?)
        }
        _ => {
            let text = read_input(&args.input)?;
            let text = TextNormalizer::new().normalize(&text);
            Ok(RuleBasedFieldParser::new().parse(&text))
        }
    }
}

fn write_frame(dir: &Path, frame: &Path, dom: &Dom) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = frame
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid frame path: {}", frame.display()))?;
    let path = dir.join(name);
    fs::write(&path, dom.to_html())?;
    Ok(path)
}

fn print_frame(frame: &Path, report: &FillReport) {
    let marker = match report.status {
        FillStatus::Filled => style("✓").green(),
        FillStatus::NothingFilled => style("⚠").yellow(),
        FillStatus::UnsupportedTarget => style("ℹ").blue(),
    };
    println!(
        "{} {} [{}] {} filled",
        marker,
        frame.display(),
        report.profile,
        report.outcome.filled_count
    );
    for detail in &report.outcome.details {
        println!(
            "    {:<16} {:<20} {}",
            detail.field,
            style(&detail.label).dim(),
            detail.value
        );
    }
}
