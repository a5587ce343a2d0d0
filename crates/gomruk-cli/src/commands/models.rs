//! Models command - download and manage OCR models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use gomruk_core::GomrukConfig;

use super::{load_config, model_dir};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Download models
    Download(DownloadArgs),

    /// Check model status
    Status(TargetArgs),

    /// Remove downloaded models
    Clean(TargetArgs),
}

#[derive(Args)]
struct DownloadArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct TargetArgs {
    /// Recognition alphabet (default: from config)
    #[arg(short, long)]
    alphabet: Option<String>,

    /// Model directory (default: from config)
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

/// One model file of the recognition bundle.
struct ModelFile {
    filename: String,
    description: &'static str,
}

/// Files the recognizer needs for an alphabet.
fn bundle(config: &GomrukConfig, alphabet: &str) -> Vec<ModelFile> {
    vec![
        ModelFile {
            filename: config.models.detection_model.clone(),
            description: "text detection",
        },
        ModelFile {
            filename: config.models.recognition_model(alphabet),
            description: "text recognition",
        },
        ModelFile {
            filename: config.models.dictionary(alphabet),
            description: "character dictionary",
        },
    ]
}

fn resolve_target(args: &TargetArgs, config: &GomrukConfig) -> (String, PathBuf) {
    let alphabet = args
        .alphabet
        .clone()
        .unwrap_or_else(|| config.ocr.alphabet.clone());
    let dir = args.dir.clone().unwrap_or_else(|| model_dir(config));
    (alphabet, dir)
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::Download(download_args) => download_models(download_args, &config).await,
        ModelsCommand::Status(target) => check_status(&target, &config),
        ModelsCommand::Clean(target) => clean_models(&target, &config),
    }
}

async fn download_models(args: DownloadArgs, config: &GomrukConfig) -> anyhow::Result<()> {
    let (alphabet, output_dir) = resolve_target(&args.target, config);
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading {} models to {}",
        style("ℹ").blue(),
        style(&alphabet).cyan().bold(),
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("gomruk-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for model in bundle(config, &alphabet) {
        let path = output_dir.join(&model.filename);

        if path.exists() && !args.force && fs::metadata(&path)?.len() > 0 {
            println!(
                "  {} {} (already exists)",
                style("✓").green(),
                model.filename
            );
            skip_count += 1;
            continue;
        }

        let url = format!(
            "{}/{}",
            config.models.base_url.trim_end_matches('/'),
            model.filename
        );

        let pb = multi_progress.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.clone());

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!(
            "{} {} models ready",
            style("✓").green().bold(),
            alphabet
        );
        if skip_count > 0 {
            println!(
                "   {} downloaded, {} already present",
                success_count, skip_count
            );
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: gomruk models download -a {} --force", alphabet);
    }

    println!();
    check_status(&args.target, config)?;

    if error_count > 0 {
        anyhow::bail!("{} model file(s) failed to download", error_count);
    }

    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn check_status(args: &TargetArgs, config: &GomrukConfig) -> anyhow::Result<()> {
    let (alphabet, model_dir) = resolve_target(args, config);

    println!("{}", style("Model Status").bold());
    println!(
        "{} {} ({})",
        style("▸").bold(),
        model_dir.display(),
        style(&alphabet).cyan()
    );

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in bundle(config, &alphabet) {
        let path = model_dir.join(&model.filename);
        let (status, size_str) = match fs::metadata(&path) {
            Ok(metadata) if metadata.len() > 0 => {
                total_size += metadata.len();
                (style("✓").green(), format_size(metadata.len()))
            }
            Ok(_) => {
                all_present = false;
                (style("⚠").yellow(), "empty".to_string())
            }
            Err(_) => {
                all_present = false;
                (style("✗").red(), "missing".to_string())
            }
        };

        println!(
            "    {} {:<25} {:>10}  {}",
            status, model.filename, size_str, model.description
        );
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'gomruk models download -a {}' to download",
            style("⚠").yellow(),
            alphabet
        );
    }

    Ok(())
}

fn clean_models(args: &TargetArgs, config: &GomrukConfig) -> anyhow::Result<()> {
    let (alphabet, model_dir) = resolve_target(args, config);

    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    if model_dir.exists() {
        for model in bundle(config, &alphabet) {
            let path = model_dir.join(&model.filename);
            if path.exists() {
                let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                fs::remove_file(&path)?;
                total_removed += 1;
                total_freed += size;
                println!("  {} Removed {}", style("✓").green(), model.filename);
            }
        }

        if let Ok(entries) = fs::read_dir(&model_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "tmp") {
                    let _ = fs::remove_file(&path);
                }
            }
        }
    }

    if total_removed > 0 {
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_follows_alphabet() {
        let config = GomrukConfig::default();
        let names: Vec<String> = bundle(&config, "latin").into_iter().map(|m| m.filename).collect();
        assert_eq!(names, vec!["det.onnx", "latin_rec.onnx", "latin_dict.txt"]);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(7_500_000), "7.5MB");
    }
}
