//! yoloprep: turn a corner-box detection dataset into a split YOLO dataset.
//!
//! The pipeline reads a source manifest (`images` / `annotations` /
//! `categories`), converts every box to normalized center/size form with a
//! zero-based class index, partitions images into train/validation/test with
//! a seeded shuffle, and writes `images/`, `labels/` and `data.yaml`.
//!
//! # Modules
//!
//! - [`ir`]: source records, typed ids, manifest reader and YOLO writer
//! - [`convert`]: schema conversion and the category → class map
//! - [`split`]: seeded train/validation/test partitioning
//! - [`manifest`]: `data.yaml` assembly
//! - [`images`]: image file lookup and JPEG output
//! - [`error`]: error types

pub mod convert;
pub mod error;
pub mod images;
pub mod ir;
pub mod manifest;
pub mod split;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

pub use error::PrepError;

use convert::ConversionReport;
use ir::io_coco_json::BBoxFormat;
use split::SplitRatios;

/// The yoloprep CLI application.
#[derive(Parser)]
#[command(name = "yoloprep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert annotations to YOLO, split the dataset and write it out.
    Prepare(PrepareArgs),
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// Source annotation manifest (JSON).
    #[arg(short = 'c', long, env = "YOLOPREP_COCO_FILE", default_value = "data/coco.json")]
    coco_file: PathBuf,

    /// Directory containing the source images.
    #[arg(short = 'i', long, env = "YOLOPREP_IMAGES_PATH", default_value = "data/images")]
    images_path: PathBuf,

    /// Output dataset root.
    #[arg(short = 'o', long, env = "YOLOPREP_OUTPUT_PATH", default_value = "output")]
    output_path: PathBuf,

    /// Fraction of images for the validation partition.
    #[arg(long, env = "YOLOPREP_VAL_SIZE", default_value_t = 0.1, value_parser = parse_fraction)]
    val_size: f64,

    /// Fraction of images for the test partition.
    #[arg(long, env = "YOLOPREP_TEST_SIZE", default_value_t = 0.2, value_parser = parse_fraction)]
    test_size: f64,

    /// Seed for the split shuffle.
    #[arg(long, env = "YOLOPREP_SEED", default_value_t = split::DEFAULT_SEED)]
    seed: u64,

    /// Layout of the four bbox numbers in the source manifest.
    #[arg(long, env = "YOLOPREP_BBOX_FORMAT", value_enum, default_value = "xyxy")]
    bbox_format: BBoxFormatArg,

    /// Scale written images down so the longest side is at most this many pixels.
    #[arg(long, env = "YOLOPREP_IMGSZ")]
    imgsz: Option<u32>,

    /// Convert and split, print the report, write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Report format on stdout.
    #[arg(long, env = "YOLOPREP_REPORT", value_enum, default_value = "text")]
    report: ReportFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum BBoxFormatArg {
    /// [x_min, y_min, x_max, y_max]
    Xyxy,
    /// [x, y, width, height] (standard COCO)
    Xywh,
}

impl From<BBoxFormatArg> for BBoxFormat {
    fn from(arg: BBoxFormatArg) -> Self {
        match arg {
            BBoxFormatArg::Xyxy => BBoxFormat::Xyxy,
            BBoxFormatArg::Xywh => BBoxFormat::Xywh,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ReportFormat {
    Text,
    Json,
}

// Each fraction on its own must be in [0.0, 1.0); the sum is checked later.
fn parse_fraction(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..1.0).contains(&val) => Ok(val),
        _ => Err("fraction must be a number in [0.0, 1.0)".to_string()),
    }
}

/// Options for a full prepare run, decoupled from clap.
#[derive(Clone, Debug)]
pub struct PrepareOptions {
    pub coco_file: PathBuf,
    pub images_path: PathBuf,
    pub output_path: PathBuf,
    pub val_size: f64,
    pub test_size: f64,
    pub seed: u64,
    pub bbox_format: BBoxFormat,
    pub max_side: Option<u32>,
    pub dry_run: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            coco_file: PathBuf::from("data/coco.json"),
            images_path: PathBuf::from("data/images"),
            output_path: PathBuf::from("output"),
            val_size: 0.1,
            test_size: 0.2,
            seed: split::DEFAULT_SEED,
            bbox_format: BBoxFormat::Xyxy,
            max_side: None,
            dry_run: false,
        }
    }
}

/// Validates options before any input is read.
pub fn validate_prepare_options(opts: &PrepareOptions) -> Result<SplitRatios, PrepError> {
    if opts.max_side == Some(0) {
        return Err(PrepError::InvalidOption {
            message: "--imgsz must be greater than 0".to_string(),
        });
    }
    SplitRatios::new(opts.val_size, opts.test_size)
}

/// What a prepare run produced.
#[derive(Clone, Debug)]
pub struct PrepareOutcome {
    pub report: ConversionReport,
    /// `None` for a dry run.
    pub manifest_path: Option<PathBuf>,
}

/// Runs the whole pipeline: read, convert, resolve images, split, write.
pub fn prepare_dataset(opts: &PrepareOptions) -> Result<PrepareOutcome, PrepError> {
    let ratios = validate_prepare_options(opts)?;

    info!("reading source annotations from {}", opts.coco_file.display());
    let dataset = ir::io_coco_json::read_coco_json(&opts.coco_file, opts.bbox_format)?;

    let conversion = convert::convert_dataset(&dataset)?;
    let mut report = conversion.report;

    let image_files =
        images::resolve_image_files(&dataset.images, &opts.images_path, opts.max_side)?;

    let dataset_split = split::split(image_files, conversion.labels, ratios, opts.seed)?;
    report.split = Some(dataset_split.counts());

    if opts.dry_run {
        info!("dry run: nothing written");
        return Ok(PrepareOutcome {
            report,
            manifest_path: None,
        });
    }

    let manifest_path =
        ir::io_yolo::write_split_dir(&opts.output_path, &dataset_split, &conversion.class_map)?;

    Ok(PrepareOutcome {
        report,
        manifest_path: Some(manifest_path),
    })
}

/// Run the yoloprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Prepare(args)) => run_prepare(args),
        None => {
            println!("yoloprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert detection datasets to YOLO and split them.");
            println!();
            println!("Run 'yoloprep --help' for usage information.");
            Ok(())
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<(), PrepError> {
    let opts = PrepareOptions {
        coco_file: args.coco_file,
        images_path: args.images_path,
        output_path: args.output_path,
        val_size: args.val_size,
        test_size: args.test_size,
        seed: args.seed,
        bbox_format: args.bbox_format.into(),
        max_side: args.imgsz,
        dry_run: args.dry_run,
    };

    let outcome = prepare_dataset(&opts)?;

    match args.report {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&outcome.report).map_err(PrepError::ReportRender)?;
            println!("{json}");
        }
        ReportFormat::Text => {
            match &outcome.manifest_path {
                Some(path) => println!("Prepared dataset (manifest: {}):", path.display()),
                None => println!("Dry run, nothing written:"),
            }
            print!("{}", outcome.report);
        }
    }

    Ok(())
}
