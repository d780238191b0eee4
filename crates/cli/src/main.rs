use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use litter_core::detection::domain::detection_filter::{CLASS_MIN_RANGE, MIN_AREA_PCT_RANGE};
use litter_core::detection::domain::inference_settings::{Preset, CONF_RANGE, IOU_RANGE};
use litter_core::detection::domain::litter_detector::LitterDetector;
use litter_core::detection::infrastructure::model_cache::{ModelCache, Shared};
use litter_core::detection::infrastructure::model_resolver::{self, ModelSource};
use litter_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use litter_core::guidance::city::City;
use litter_core::imaging::image_file_reader::ImageFileReader;
use litter_core::imaging::image_file_writer::ImageFileWriter;
use litter_core::pipeline::classify_image_use_case::{
    ClassifyImageUseCase, ClassifyOutcome, OutputPaths,
};
use litter_core::render::box_drawer::BoxDrawer;
use litter_core::render::html_report::{ALL_FILTERED, NO_DETECTIONS, NO_GUIDANCE};
use litter_core::render::text_card::render_text_card;
use litter_core::settings::Settings;
use litter_core::shared::constants::{LOCAL_MODEL, MODEL_URL};
use litter_core::shared::frame::Frame;

const DEFAULT_LOGO: &str = "logo.png";

/// Detect bottles, cans and caps in a photo and show how to put them out.
#[derive(Parser)]
#[command(name = "litter-scan", version)]
struct Cli {
    /// Model URL; anything not starting with http means "use --local-model".
    #[arg(long, env = "MODEL_URL", default_value = MODEL_URL, global = true)]
    model_url: String,

    /// Model file used when no URL is configured.
    #[arg(long, env = "LOCAL_MODEL", default_value = LOCAL_MODEL, global = true)]
    local_model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run detection on an image (`-` reads the image from stdin).
    Detect(DetectArgs),
    /// Resolve and load the model, then print its class names.
    LoadModel,
    /// Print the disposal guidance for a class name.
    Guide {
        label: String,
        #[arg(long)]
        city: Option<String>,
    },
    /// List cities with guidance.
    Cities,
}

#[derive(Args)]
struct DetectArgs {
    /// Input JPG/PNG, or `-` for stdin.
    input: String,

    /// City whose guidance is shown.
    #[arg(long)]
    city: Option<String>,

    /// Threshold preset: minimum, recommended or strict.
    #[arg(long)]
    preset: Option<Preset>,

    /// Base confidence (0.05-0.95).
    #[arg(long)]
    conf: Option<f64>,

    /// NMS IoU (0.10-0.90).
    #[arg(long)]
    iou: Option<f64>,

    /// Inference size; snapped to 320, 416, 512, 640, 800, 960 or 1280.
    #[arg(long, env = "IMGSZ")]
    imgsz: Option<u32>,

    /// Minimum score for PET bottles (0.0-1.0).
    #[arg(long)]
    bottle_min: Option<f64>,

    /// Minimum score for cans (0.0-1.0).
    #[arg(long)]
    can_min: Option<f64>,

    /// Minimum score for bottle caps (0.0-1.0).
    #[arg(long)]
    cap_min: Option<f64>,

    /// Minimum box area as a percentage of the image (0.0-5.0).
    #[arg(long)]
    min_area_pct: Option<f64>,

    /// Test-time augmentation (mirrored second pass). `--tta=false` turns
    /// off a saved `true`.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    tta: Option<bool>,

    /// Annotated image output.
    #[arg(long)]
    output: Option<PathBuf>,

    /// HTML report output.
    #[arg(long)]
    report: Option<PathBuf>,

    /// JSON dump of kept detections.
    #[arg(long)]
    json: Option<PathBuf>,

    /// TTF/OTF font for box labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Header image for the report [default: ./logo.png when present].
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Open the report (or annotated image) when done.
    #[arg(long)]
    open: bool,

    /// Remember these thresholds for next time.
    #[arg(long)]
    save_settings: bool,
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
    let source = ModelSource::from_config(&cli.model_url, &cli.local_model);
    let cache = ModelCache::new();

    match cli.command {
        Command::Detect(args) => {
            let settings = merge_settings(Settings::load(), &args);
            validate(&args, &settings)?;
            run_detect(&args, &settings, &source, &cache)
        }
        Command::LoadModel => run_load_model(&source, &cache),
        Command::Guide { label, city } => run_guide(&label, city.as_deref()),
        Command::Cities => {
            for city in City::all() {
                println!("{}\t{}", city.id, city.label);
            }
            println!("More cities coming soon");
            Ok(())
        }
    }
}

/// Saved settings, replaced by a preset when one is given, then by explicit flags.
fn merge_settings(saved: Settings, args: &DetectArgs) -> Settings {
    let mut settings = match args.preset {
        Some(preset) => Settings {
            city: saved.city.clone(),
            ..Settings::from_preset(preset)
        },
        None => saved,
    };
    if let Some(city) = &args.city {
        settings.city = city.clone();
    }

    let inference = &mut settings.inference;
    inference.conf = args.conf.unwrap_or(inference.conf);
    inference.iou = args.iou.unwrap_or(inference.iou);
    inference.imgsz = args.imgsz.unwrap_or(inference.imgsz);
    inference.tta = args.tta.unwrap_or(inference.tta);

    let filter = &mut settings.filter;
    filter.bottle_min = args.bottle_min.unwrap_or(filter.bottle_min);
    filter.can_min = args.can_min.unwrap_or(filter.can_min);
    filter.cap_min = args.cap_min.unwrap_or(filter.cap_min);
    filter.min_area_pct = args.min_area_pct.unwrap_or(filter.min_area_pct);
    settings
}

fn run_detect(
    args: &DetectArgs,
    settings: &Settings,
    source: &ModelSource,
    cache: &ModelCache<OnnxYoloDetector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let city = City::lookup(&settings.city)?;
    let frame = read_input(&args.input)?;
    log::info!(
        "Input {}x{}, conf {:.2}, iou {:.2}, imgsz {}",
        frame.width(),
        frame.height(),
        settings.inference.conf,
        settings.inference.iou,
        settings.inference.imgsz
    );

    let detector = load_detector(source, cache)?;
    let drawer = match &args.font {
        Some(path) => BoxDrawer::with_font_file(path)?,
        None => BoxDrawer::new(),
    };
    if !drawer.has_font() {
        log::info!("No --font given; labels are drawn without text");
    }
    let mut use_case =
        ClassifyImageUseCase::new(Box::new(detector), drawer, Box::new(ImageFileWriter::new()));
    let result = use_case.execute(&frame, &settings.inference, &settings.filter)?;

    let outputs = OutputPaths {
        annotated: args.output.clone(),
        report: args.report.clone(),
        json: args.json.clone(),
        input: (args.input != "-").then(|| PathBuf::from(&args.input)),
        logo: logo_path(args.logo.as_deref()),
    };
    use_case.write_outputs(&result, &city, &settings.inference, &settings.filter, &outputs)?;
    print_summary(&result, &city);

    if args.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }
    if args.open {
        match open_target(&outputs) {
            Some(path) => open::that(path)?,
            None => log::warn!("Nothing to open: no report or annotated image was written"),
        }
    }
    Ok(())
}

fn run_load_model(
    source: &ModelSource,
    cache: &ModelCache<OnnxYoloDetector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let detector = load_detector(source, cache)?;
    let labels = detector.labels();
    if labels.is_from_checkpoint() {
        println!("Checkpoint labels: {:?}", labels.names());
    } else {
        println!("Using fallback CLASS_NAMES: {:?}", labels.names());
    }
    println!("Model ready.");
    Ok(())
}

fn run_guide(label: &str, city: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let city = match city {
        Some(query) => City::lookup(query)?,
        None => City::default_city(),
    };
    let entry = city.entry(label).ok_or_else(|| {
        format!(
            "No guidance for '{label}' in {}. Known labels: {}",
            city.label,
            city.covered_labels().join(", ")
        )
    })?;
    print!("{}", render_text_card(entry, None));
    Ok(())
}

/// The explicit `--logo`, else `logo.png` in the working directory if present.
fn logo_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_LOGO);
            default.exists().then(|| default.to_path_buf())
        }
    }
}

/// The report, else the annotated image; only files that were actually written.
fn open_target(outputs: &OutputPaths) -> Option<&Path> {
    [outputs.report.as_deref(), outputs.annotated.as_deref()]
        .into_iter()
        .flatten()
        .find(|path| path.exists())
}

fn load_detector(
    source: &ModelSource,
    cache: &ModelCache<OnnxYoloDetector>,
) -> Result<Shared<OnnxYoloDetector>, Box<dyn std::error::Error>> {
    if let ModelSource::Url(url) = source {
        log::info!("Resolving model: {url}");
    }
    let model_path = model_resolver::resolve(source, Some(Box::new(download_progress)))?;
    eprintln!();
    log::info!("Loading model: {}", model_path.display());
    Ok(cache.get_or_load(&model_path, OnnxYoloDetector::new)?)
}

fn read_input(input: &str) -> Result<Frame, Box<dyn std::error::Error>> {
    if input == "-" {
        Ok(ImageFileReader::read_stream(std::io::stdin().lock())?)
    } else {
        Ok(ImageFileReader::read_path(Path::new(input))?)
    }
}

fn print_summary(result: &ClassifyOutcome, city: &City) {
    let outcome = match result {
        ClassifyOutcome::NoDetections => {
            println!("{NO_DETECTIONS}");
            return;
        }
        ClassifyOutcome::AllFiltered { .. } => {
            println!("{ALL_FILTERED}");
            return;
        }
        ClassifyOutcome::Detected { outcome, .. } => outcome,
    };

    for det in &outcome.kept {
        let [x1, y1, x2, y2] = det.xyxy;
        println!("{:<12} {:.2}  [{x1:.0}, {y1:.0}, {x2:.0}, {y2:.0}]", det.class_name, det.score);
    }
    println!();

    let labels = city.guide_labels(&outcome.labels());
    if labels.is_empty() {
        println!("{NO_GUIDANCE}");
        return;
    }
    for label in labels {
        if let Some(entry) = city.entry(&label) {
            println!("{}", render_text_card(entry, Some(outcome.count(&label))));
        }
    }
}

fn validate(args: &DetectArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if args.input != "-" && !Path::new(&args.input).exists() {
        return Err(format!("Input file not found: {}", args.input).into());
    }
    let inference = &settings.inference;
    if !CONF_RANGE.contains(&inference.conf) {
        return Err(format!(
            "Confidence must be between 0.05 and 0.95, got {}",
            inference.conf
        )
        .into());
    }
    if !IOU_RANGE.contains(&inference.iou) {
        return Err(format!("IoU must be between 0.10 and 0.90, got {}", inference.iou).into());
    }
    if inference.imgsz == 0 {
        return Err("Image size must be positive".into());
    }
    let filter = &settings.filter;
    for (name, value) in [
        ("Bottle min", filter.bottle_min),
        ("Can min", filter.can_min),
        ("Cap min", filter.cap_min),
    ] {
        if !CLASS_MIN_RANGE.contains(&value) {
            return Err(format!("{name} must be between 0.0 and 1.0, got {value}").into());
        }
    }
    if !MIN_AREA_PCT_RANGE.contains(&filter.min_area_pct) {
        return Err(format!(
            "Min box area must be between 0.0 and 5.0 percent, got {}",
            filter.min_area_pct
        )
        .into());
    }
    if let Some(font) = &args.font {
        if !font.exists() {
            return Err(format!("Font file not found: {}", font.display()).into());
        }
    }
    if let Some(logo) = &args.logo {
        if !logo.exists() {
            return Err(format!("Logo file not found: {}", logo.display()).into());
        }
    }
    if args.open && args.output.is_none() && args.report.is_none() {
        return Err("--open needs --report or --output".into());
    }
    City::lookup(&settings.city)?;
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
