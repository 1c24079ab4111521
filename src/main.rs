use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use deskchaos::config::{OutputFormat, Settings};
use deskchaos::core::{analyze_with_filter, Metrics, ResampleFilter};
use deskchaos::intake::{self, IntakeError};
use deskchaos::presentation::{ChaosLevel, Report, CHAOS_LEVELS};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "deskchaos", version, about = "Rate how chaotic a desk photo looks")]
struct Cli {
    /// Settings file (default: `<config dir>/deskchaos/config.json`)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single image
    Analyze {
        /// Image to analyze
        #[arg(short, long, value_name = "FILE")]
        path: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Seed for the comment and detail rolls
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score every image under a directory
    Scan {
        /// Directory to scan
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Print one JSON record per line
        #[arg(long)]
        json: bool,
    },

    /// List the chaos levels
    Levels,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ScanRecord {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chaos_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Analyze { path, json, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let report = analyze_file(&path, &settings, &mut rng)?;

            if json || settings.output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("▶ {}", path.display());
                println!("{}", report);
            }
        }

        Commands::Scan { path, json } => {
            println!("▶ Scanning for images in: {}", path.display());
            let images = scan_directory(&path)?;
            if images.is_empty() {
                println!("No images found.");
                return Ok(());
            }

            let records = benchmark(&format!("analyzing {} images", images.len()), || {
                score_all(&images, settings.max_upload_bytes, settings.resize_filter)
            });

            let as_json = json || settings.output == OutputFormat::Json;
            for record in &records {
                if as_json {
                    println!("{}", serde_json::to_string(record)?);
                } else {
                    print_record(record);
                }
            }

            let failed = records.iter().filter(|r| r.error.is_some()).count();
            if failed > 0 && !as_json {
                println!("\n⚠️  {} of {} file(s) could not be analyzed", failed, records.len());
            }
        }

        Commands::Levels => {
            for level in &CHAOS_LEVELS {
                println!("{}", level);
            }
        }
    }

    Ok(())
}

/// Load, score and dress up one file. Invalid uploads are errors; an image
/// that passes validation but cannot be decoded gets a fallback report.
fn analyze_file<R: Rng>(path: &Path, settings: &Settings, rng: &mut R) -> Result<Report> {
    let analysis_date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let image = match intake::load(path, settings.max_upload_bytes) {
        Ok(image) => image,
        Err(err) if err.is_decode_failure() => {
            log::warn!("{}; reporting a placeholder result", err);
            return Ok(Report::fallback(rng, analysis_date));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Cannot analyze {}", path.display()));
        }
    };

    let result = analyze_with_filter(&image, settings.resize_filter);
    log::info!(
        "{}: level {} ({:?})",
        path.display(),
        result.chaos_level,
        result.metrics
    );
    Ok(Report::new(&result, rng, analysis_date))
}

/// Score each image independently on the rayon pool, keeping input order.
fn score_all(images: &[PathBuf], max_bytes: u64, filter: ResampleFilter) -> Vec<ScanRecord> {
    images
        .par_iter()
        .map(|path| {
            let display = path.display().to_string();
            match intake::load(path, max_bytes) {
                Ok(image) => {
                    let result = analyze_with_filter(&image, filter);
                    ScanRecord {
                        path: display,
                        chaos_level: Some(result.chaos_level),
                        metrics: Some(result.metrics),
                        error: None,
                    }
                }
                Err(err) => {
                    log::warn!("Skipping {}: {}", display, err);
                    ScanRecord {
                        path: display,
                        chaos_level: None,
                        metrics: None,
                        error: Some(describe(&err)),
                    }
                }
            }
        })
        .collect()
}

fn describe(err: &IntakeError) -> String {
    match err {
        IntakeError::Decode { .. } => "unreadable image".to_string(),
        other => other.to_string(),
    }
}

fn print_record(record: &ScanRecord) {
    match (record.chaos_level, &record.metrics) {
        (Some(level), Some(m)) => {
            let entry = ChaosLevel::for_level(level);
            println!(
                "{} {:>2}/10 {:<24} colors {:>3}  variance {:>5}  edges {:>5}  {}",
                entry.emoji, level, entry.title, m.color_count, m.variance, m.edge_count, record.path
            );
        }
        _ => println!(
            "⚠️  --/10 {:<24} {}",
            record.error.as_deref().unwrap_or("unknown error"),
            record.path
        ),
    }
}

/// Recursively walk `dir`, returning image file paths in a stable order.
fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning for images…");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        if path.is_file() && intake::has_image_extension(path) {
            images.push(path.to_path_buf());
        }
        spinner.tick();
    }
    spinner.finish_with_message(format!("Found {} image(s)", images.len()));
    Ok(images)
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    log::info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_image(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x * 3 + y) % 256) as u8;
            Rgb([intensity, intensity, 255 - intensity])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_scan_directory_finds_images_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("drawer");
        fs::create_dir_all(&nested).unwrap();
        create_test_image(&temp_dir.path().join("b.png"), 20, 20);
        create_test_image(&nested.join("a.png"), 20, 20);
        fs::write(temp_dir.path().join("notes.txt"), b"pens, paper").unwrap();

        let images = scan_directory(temp_dir.path()).unwrap();
        assert_eq!(images, vec![temp_dir.path().join("b.png"), nested.join("a.png")]);
    }

    #[test]
    fn test_scan_directory_rejects_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("desk.png");
        create_test_image(&file, 4, 4);
        assert!(scan_directory(&file).is_err());
    }

    #[test]
    fn test_score_all_keeps_going_past_bad_files() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.png");
        let bad = temp_dir.path().join("bad.png");
        create_test_image(&good, 640, 480);
        fs::write(&bad, b"\x89PNG\r\n\x1a\n garbage").unwrap();

        let records = score_all(
            &[good.clone(), bad.clone()],
            intake::DEFAULT_MAX_UPLOAD_BYTES,
            ResampleFilter::default(),
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, good.display().to_string());
        assert!(records[0].chaos_level.is_some());
        assert!(records[0].error.is_none());
        assert_eq!(records[1].path, bad.display().to_string());
        assert_eq!(records[1].error.as_deref(), Some("unreadable image"));
    }

    #[test]
    fn test_analyze_file_falls_back_on_decode_failure() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad.png");
        fs::write(&bad, b"\x89PNG\r\n\x1a\n garbage").unwrap();

        let report = analyze_file(&bad, &Settings::default(), &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(report.degraded);
        assert!(report.metrics.is_none());
    }

    #[test]
    fn test_analyze_file_rejects_oversized_upload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("desk.png");
        create_test_image(&path, 64, 64);

        let settings = Settings {
            max_upload_bytes: 16,
            ..Settings::default()
        };
        assert!(analyze_file(&path, &settings, &mut StdRng::seed_from_u64(5)).is_err());
    }

    #[test]
    fn test_analyze_file_reports_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("desk.png");
        create_test_image(&path, 800, 600);

        let report = analyze_file(&path, &Settings::default(), &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(!report.degraded);
        assert!(report.metrics.is_some());
        assert!((1..=10).contains(&report.level.level));
    }
}
