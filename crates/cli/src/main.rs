use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facemosaic_core::detection::domain::face_detector::FaceDetector;
use facemosaic_core::detection::infrastructure::sidecar_detector::SidecarDetector;
use facemosaic_core::interaction::click_event::ClickEvent;
use facemosaic_core::interaction::view_transform::ViewTransform;
use facemosaic_core::mosaic::domain::frame_mosaic::FrameMosaic;
use facemosaic_core::mosaic::infrastructure::mosaic_factory::{
    create_mosaic, MosaicShape, PixelationStyle,
};
use facemosaic_core::pipeline::infrastructure::sequential_pipeline_executor::SequentialPipelineExecutor;
use facemosaic_core::pipeline::mosaic_image_use_case::MosaicImageUseCase;
use facemosaic_core::pipeline::mosaic_video_use_case::MosaicVideoUseCase;
use facemosaic_core::pipeline::pipeline_executor::DetectionFailurePolicy;
use facemosaic_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facemosaic_core::shared::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_SHRINK_FACTOR, IMAGE_EXTENSIONS,
};
use facemosaic_core::video::domain::image_writer::ImageWriter;
use facemosaic_core::video::domain::video_reader::VideoReader;
use facemosaic_core::video::domain::video_writer::VideoWriter;
use facemosaic_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use facemosaic_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use facemosaic_core::video::infrastructure::image_file_reader::ImageFileReader;
use facemosaic_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Pixelate faces in videos and images, with per-face toggles.
#[derive(Parser)]
#[command(name = "facemosaic")]
struct Cli {
    /// Input video or image file.
    input: PathBuf,

    /// Output file.
    output: PathBuf,

    /// Detection sidecar JSON produced by the external face detector.
    #[arg(long)]
    detections: PathBuf,

    /// Pixelation style: shrink or block (default: shrink for video, block for image).
    #[arg(long)]
    style: Option<String>,

    /// Mosaic mask shape: ellipse or rect (default: ellipse for video, rect for image).
    #[arg(long)]
    shape: Option<String>,

    /// Cell size for block pixelation.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Downscale factor for shrink pixelation (0 < factor <= 1).
    #[arg(long, default_value_t = DEFAULT_SHRINK_FACTOR)]
    shrink_factor: f64,

    /// Scripted toggle click "FRAME:X,Y" (or "X,Y" for frame 0); repeatable.
    #[arg(long = "click")]
    clicks: Vec<String>,

    /// Display size "WxH" the click coordinates are given in
    /// (default: the buffer size, i.e. unscaled).
    #[arg(long)]
    display_size: Option<String>,

    /// Per-frame detection failure policy: skip or abort.
    #[arg(long, default_value = "skip")]
    on_detect_error: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let clicks = parse_clicks(&cli.clicks)?;
    let display = cli
        .display_size
        .as_deref()
        .map(parse_display_size)
        .transpose()?;

    log::info!("Loading detections from {}", cli.detections.display());
    let detector: Box<dyn FaceDetector> = Box::new(SidecarDetector::from_path(&cli.detections)?);

    if is_image(&cli.input) {
        run_image(&cli, detector, clicks, display)
    } else {
        run_video(&cli, detector, clicks, display)
    }
}

fn run_image(
    cli: &Cli,
    detector: Box<dyn FaceDetector>,
    clicks: Vec<ClickEvent>,
    display: Option<(u32, u32)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader: Box<dyn VideoReader> = Box::new(ImageFileReader::new());
    let metadata = reader.open(&cli.input)?;
    let view = view_transform(display, (metadata.width, metadata.height));

    let mosaic = create_mosaic(
        parse_shape(cli.shape.as_deref(), MosaicShape::Rectangular)?,
        parse_style(cli.style.as_deref(), PixelationStyle::BlockAverage)?,
        cli.block_size,
        cli.shrink_factor,
    );
    let image_writer: Box<dyn ImageWriter> = Box::new(ImageFileWriter::new());

    let mut use_case =
        MosaicImageUseCase::new(reader, image_writer, detector, mosaic, view, clicks);
    let faces = use_case.execute(&cli.input, &cli.output)?;

    for face in &faces {
        log::info!(
            "Face {}: {}x{} at ({}, {}), mosaic {}",
            face.id,
            face.face_box.width,
            face.face_box.height,
            face.face_box.x,
            face.face_box.y,
            if face.mosaic_enabled { "on" } else { "off" }
        );
    }
    log::info!("Output written to {}", cli.output.display());
    Ok(())
}

fn run_video(
    cli: &Cli,
    detector: Box<dyn FaceDetector>,
    clicks: Vec<ClickEvent>,
    display: Option<(u32, u32)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader: Box<dyn VideoReader> = Box::new(FfmpegReader::new());
    let metadata = reader.open(&cli.input)?;
    let view = view_transform(display, (metadata.width, metadata.height));

    let mosaic: Box<dyn FrameMosaic> = create_mosaic(
        parse_shape(cli.shape.as_deref(), MosaicShape::Elliptical)?,
        parse_style(cli.style.as_deref(), PixelationStyle::ShrinkExpand)?,
        cli.block_size,
        cli.shrink_factor,
    );
    let writer: Box<dyn VideoWriter> = Box::new(FfmpegWriter::new());

    // Scripted clicks feed the same channel a live frontend would.
    let click_rx = if clicks.is_empty() {
        None
    } else {
        let (tx, rx) = crossbeam_channel::unbounded();
        for click in clicks {
            tx.send(click)?;
        }
        Some(rx)
    };

    let total = metadata.total_frames;
    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(move |current, _| {
        eprint!("\rProcessing frame {current}/{total}");
        true
    });

    let executor =
        SequentialPipelineExecutor::with_logger(Box::new(StdoutPipelineLogger::default()));

    let mut use_case = MosaicVideoUseCase::new(
        reader,
        writer,
        detector,
        mosaic,
        Box::new(executor),
        view,
        click_rx,
        parse_failure_policy(&cli.on_detect_error)?,
        Some(progress),
        None,
    );
    use_case.execute(&metadata, &cli.output)?;
    eprintln!();
    log::info!("Output written to {}", cli.output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.detections.exists() {
        return Err(format!("Detection sidecar not found: {}", cli.detections.display()).into());
    }
    if cli.block_size == 0 {
        return Err("Block size must be a positive integer".into());
    }
    if !(cli.shrink_factor > 0.0 && cli.shrink_factor <= 1.0) {
        return Err(format!(
            "Shrink factor must be in (0, 1], got {}",
            cli.shrink_factor
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn view_transform(display: Option<(u32, u32)>, buffer: (u32, u32)) -> ViewTransform {
    match display {
        Some(d) => ViewTransform::new(d, buffer),
        None => ViewTransform::identity(),
    }
}

fn parse_shape(arg: Option<&str>, default: MosaicShape) -> Result<MosaicShape, String> {
    match arg {
        None => Ok(default),
        Some("ellipse") => Ok(MosaicShape::Elliptical),
        Some("rect") => Ok(MosaicShape::Rectangular),
        Some(other) => Err(format!("Shape must be 'ellipse' or 'rect', got '{other}'")),
    }
}

fn parse_style(arg: Option<&str>, default: PixelationStyle) -> Result<PixelationStyle, String> {
    match arg {
        None => Ok(default),
        Some("shrink") => Ok(PixelationStyle::ShrinkExpand),
        Some("block") => Ok(PixelationStyle::BlockAverage),
        Some(other) => Err(format!("Style must be 'shrink' or 'block', got '{other}'")),
    }
}

fn parse_failure_policy(arg: &str) -> Result<DetectionFailurePolicy, String> {
    match arg {
        "skip" => Ok(DetectionFailurePolicy::SkipFrame),
        "abort" => Ok(DetectionFailurePolicy::Abort),
        other => Err(format!(
            "Detection error policy must be 'skip' or 'abort', got '{other}'"
        )),
    }
}

fn parse_clicks(args: &[String]) -> Result<Vec<ClickEvent>, String> {
    args.iter().map(|s| parse_click(s)).collect()
}

/// "FRAME:X,Y" or "X,Y" (frame 0).
fn parse_click(arg: &str) -> Result<ClickEvent, String> {
    let invalid = || format!("Invalid click '{arg}', expected FRAME:X,Y or X,Y");

    let (frame, coords) = match arg.split_once(':') {
        Some((frame, coords)) => (frame.parse::<usize>().map_err(|_| invalid())?, coords),
        None => (0, arg),
    };

    let (x, y) = coords.split_once(',').ok_or_else(invalid)?;
    Ok(ClickEvent::new(
        frame,
        x.trim().parse::<f64>().map_err(|_| invalid())?,
        y.trim().parse::<f64>().map_err(|_| invalid())?,
    ))
}

/// "WxH", e.g. "640x480".
fn parse_display_size(arg: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("Invalid display size '{arg}', expected WxH");
    let (w, h) = arg.split_once('x').ok_or_else(invalid)?;
    let w = w.trim().parse::<u32>().map_err(|_| invalid())?;
    let h = h.trim().parse::<u32>().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}
