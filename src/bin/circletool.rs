use circle_detector::config::{DetectionParameters, ServiceConfig};
use circle_detector::detector::hough::hough_circles;
use circle_detector::diagnostics::{DiagnosticPolicy, FileSink};
use circle_detector::preprocess::preprocess;
use circle_detector::tools::{load_rgb, parse_crop, search_report};
use circle_detector::{DetectionRequest, detect_with_request};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "circletool", version, about = "Circle detector CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run circle detection on a single image
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// JSON config with detection parameters (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Crop region as x,y,width,height
        #[arg(long)]
        crop: Option<String>,
        #[arg(long)]
        skip_blur: bool,
        /// Report centers relative to the crop instead of the full image
        #[arg(long)]
        no_offset: bool,
        /// Write the annotated crop here
        #[arg(long, default_value = "")]
        output: String,
        /// Also write the blurred buffer next to the output
        #[arg(long)]
        output_blur: bool,
        /// Fail when a diagnostic artifact cannot be written
        #[arg(long)]
        strict: bool,
    },
    /// Print preprocessing stats and raw Hough candidates for an image
    Stats {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Detect {
            image,
            config,
            crop,
            skip_blur,
            no_offset,
            output,
            output_blur,
            strict,
        } => load_params(config.as_deref(), crop.as_deref(), skip_blur).and_then(|params| {
            detect_cmd(
                &image,
                &params,
                !no_offset,
                &output,
                output_blur,
                strict,
            )
        }),
        Command::Stats { image, config } => {
            load_params(config.as_deref(), None, false).and_then(|params| stats_cmd(&image, &params))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_params(
    config: Option<&Path>,
    crop: Option<&str>,
    skip_blur: bool,
) -> circle_detector::Result<DetectionParameters> {
    let mut params = match config {
        Some(path) => ServiceConfig::from_json_file(path)?.params,
        None => DetectionParameters::default(),
    };
    if let Some(text) = crop {
        params.crop = Some(parse_crop(text)?);
    }
    if skip_blur {
        params.skip_blur = true;
    }
    params.validate()?;
    Ok(params)
}

fn detect_cmd(
    image: &Path,
    params: &DetectionParameters,
    apply_offset: bool,
    output: &str,
    output_blur: bool,
    strict: bool,
) -> circle_detector::Result<()> {
    let rgb = load_rgb(image)?;
    println!("Image: {} ({}x{})", image.display(), rgb.width(), rgb.height());

    let mut sink = FileSink::from_output(output, output_blur);
    let policy = if strict {
        DiagnosticPolicy::Strict
    } else {
        DiagnosticPolicy::Lenient
    };

    let start = Instant::now();
    let request = DetectionRequest::new(apply_offset)
        .with_sink(&mut sink)
        .with_policy(policy);
    let detections = detect_with_request(&rgb, params, request)?;
    let elapsed = start.elapsed();

    println!("Found {} circles in {:.1?}", detections.len(), elapsed);
    for d in &detections {
        let b = d.bounding_box;
        println!(
            "  {}: min=({}, {}) max=({}, {}) radius={} confidence={:.2}",
            d.label,
            b.min.x,
            b.min.y,
            b.max.x,
            b.max.y,
            b.width() / 2,
            d.confidence
        );
    }
    Ok(())
}

fn stats_cmd(image: &Path, params: &DetectionParameters) -> circle_detector::Result<()> {
    let rgb = load_rgb(image)?;
    println!("Image: {} ({}x{})", image.display(), rgb.width(), rgb.height());

    let report = search_report(&rgb, params)?;
    println!(
        "Search buffer: {}x{} at ({}, {}) blurred={}",
        report.dimensions.0, report.dimensions.1, report.origin.0, report.origin.1, report.blurred
    );
    println!(
        "Intensity range {}-{}, mean {:.1}",
        report.min, report.max, report.mean
    );
    println!(
        "Edge pixels: {} ({:.2}% of the buffer)",
        report.edge_pixels,
        report.edge_density() * 100.0
    );

    let pre = preprocess(&rgb, params)?;
    let candidates = hough_circles(&pre.gray, params)?;
    println!("Raw candidates: {}", candidates.len());
    for (i, c) in candidates.iter().take(20).enumerate() {
        println!(
            "  Candidate {}: center=({:.1}, {:.1}) radius={:.1} votes={}",
            i, c.center.x, c.center.y, c.radius, c.votes
        );
    }
    Ok(())
}
