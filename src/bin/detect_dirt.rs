use dirt_detector::config::Settings;
use dirt_detector::image::io::{load_rgb_image, save_mask_png, write_json_file};
use dirt_detector::DirtDetector;
use log::info;
use std::env;
use std::error::Error;
use std::path::PathBuf;

struct Args {
    image: PathBuf,
    settings: Option<PathBuf>,
    report: Option<PathBuf>,
    mask: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: detect_dirt <image> [--settings settings.json] [--report report.json] [--mask mask.png]"
        .to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut image = None;
    let mut settings = None;
    let mut report = None;
    let mut mask = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("{flag} expects a path\n{}", usage()))
        };
        match arg.as_str() {
            "--settings" => settings = Some(value("--settings")?),
            "--report" => report = Some(value("--report")?),
            "--mask" => mask = Some(value("--mask")?),
            "-h" | "--help" => return Err(usage()),
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option {flag}\n{}", usage()))
            }
            _ if image.is_none() => image = Some(PathBuf::from(&arg)),
            _ => return Err(format!("Unexpected argument {arg}\n{}", usage())),
        }
    }
    Ok(Args {
        image: image.ok_or_else(usage)?,
        settings,
        report,
        mask,
    })
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

    let rgb = load_rgb_image(&args.image, &settings.service.upload_limits())?;
    let detector = DirtDetector::new(settings.detection)?;
    let report = detector.analyze_with_diagnostics(&rgb.as_view())?;
    info!(
        "{}: clean={} dirt={:.2}% confidence={:.3}",
        args.image.display(),
        report.result.is_clean,
        report.result.dirt_percentage,
        report.result.confidence
    );

    if let Some(path) = &args.report {
        write_json_file(path, &report)?;
        info!("Saved report to {}", path.display());
    }
    if let Some(path) = &args.mask {
        save_mask_png(&report.mask, path)?;
        info!("Saved mask to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&report.result)?);
    Ok(())
}
