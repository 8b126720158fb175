use dirt_detector::batch::{analyze_files, BatchOptions};
use dirt_detector::config::Settings;
use dirt_detector::image::io::UploadLimits;
use dirt_detector::DirtDetector;
use log::{info, warn};
use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

struct Args {
    settings: Option<PathBuf>,
    jobs: usize,
    inputs: Vec<PathBuf>,
}

fn usage() -> String {
    "Usage: batch_detect [--settings settings.json] [--jobs N] <image|dir>...".to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut settings = None;
    let mut jobs = 0usize;
    let mut inputs = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                settings = Some(PathBuf::from(
                    args.next()
                        .ok_or_else(|| format!("--settings expects a path\n{}", usage()))?,
                ))
            }
            "--jobs" => {
                let raw = args
                    .next()
                    .ok_or_else(|| format!("--jobs expects a number\n{}", usage()))?;
                jobs = raw
                    .parse()
                    .map_err(|e| format!("Invalid --jobs value {raw}: {e}"))?;
            }
            "-h" | "--help" => return Err(usage()),
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option {flag}\n{}", usage()))
            }
            _ => inputs.push(PathBuf::from(&arg)),
        }
    }
    if inputs.is_empty() {
        return Err(usage());
    }
    Ok(Args {
        settings,
        jobs,
        inputs,
    })
}

/// Expand directories to their regular files with an allowed extension,
/// sorted by name. Explicit file arguments are kept as given.
fn collect_paths(inputs: &[PathBuf], limits: &UploadLimits) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let entries = fs::read_dir(input)
            .map_err(|e| format!("Failed to read directory {}: {e}", input.display()))?;
        let mut found: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| format!("Failed to read directory {}: {e}", input.display()))?
                .path();
            if !path.is_file() {
                continue;
            }
            if limits.allows_extension(&path) {
                found.push(path);
            } else {
                warn!("Skipping {}: extension not allowed", path.display());
            }
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    let settings = Settings::load(args.settings.as_deref())?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.service.log_level.as_str()),
    )
    .init();

    let limits = settings.service.upload_limits();
    let paths = collect_paths(&args.inputs, &limits)?;
    let detector = DirtDetector::new(settings.detection)?;
    let options = BatchOptions {
        max_concurrency: args.jobs,
    };
    let report = analyze_files(&detector, &paths, &limits, &options)?;
    info!(
        "Analysed {} images: {} clean, {} failed",
        report.total_images,
        report.clean_images,
        report.failures.len()
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
