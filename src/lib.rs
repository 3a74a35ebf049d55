//! Labelstage: dataset staging for human-in-the-loop object detection.
//!
//! Raw captures flow through automatic detection, human verification, and
//! back into a growing training corpus. This crate owns the annotation
//! format conversion and the dataset staging around that loop: it maps
//! class names to stable indices, converts boxes between the human-editable
//! XML form and the detector's normalized text form, and materializes
//! train/valid/test splits with their manifests.
//!
//! # Modules
//!
//! - [`annot`]: annotation model, the two on-disk formats, class catalog
//! - [`pairing`]: image/annotation pair discovery by basename
//! - [`layout`]: staged dataset directory tree and manifests
//! - [`transfer`]: moving capture pairs between workflow stages
//! - [`pipeline`]: the three named workflows sequencing the above
//! - [`config`]: typed, validated configuration
//! - [`error`]: error types for labelstage operations

pub mod annot;
pub mod config;
pub mod error;
pub mod layout;
pub mod pairing;
pub mod pipeline;
pub mod transfer;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::LabelstageError;

use config::Config;
use layout::manifest;

/// The labelstage CLI application.
#[derive(Parser)]
#[command(name = "labelstage")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build the training corpus from verified captures.
    PrepareTrain(PrepareTrainArgs),
    /// Stage the test split against an existing training manifest.
    PrepareTest(PrepareTestArgs),
    /// Convert detector predictions to annotations and advance captures.
    Finalize(FinalizeArgs),
    /// Move human-verified capture pairs to the training-source directory.
    MoveVerified(MoveVerifiedArgs),
    /// Move capture pairs with a present declared image to detected-captures.
    MoveDetected(MoveDetectedArgs),
}

/// Output format for workflow reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportOutput {
    Text,
    Json,
}

#[derive(clap::Args)]
struct PrepareTrainArgs {
    /// Training-source directory holding verified image/annotation pairs.
    #[arg(long)]
    source: PathBuf,

    /// Dataset root to (re)create the staged layout under.
    #[arg(long)]
    root: PathBuf,

    /// Optional configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model configuration file whose class count should track the catalog.
    #[arg(long)]
    model_config: Option<PathBuf>,

    /// Seed the train/valid split for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the validation fraction from the configuration.
    #[arg(long)]
    val_fraction: Option<f64>,

    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

#[derive(clap::Args)]
struct PrepareTestArgs {
    /// Test-source directory holding image/annotation pairs.
    #[arg(long)]
    source: PathBuf,

    /// Dataset root (test split is added non-destructively).
    #[arg(long)]
    root: PathBuf,

    /// Training manifest whose class catalog must be reused.
    #[arg(long)]
    manifest: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

#[derive(clap::Args)]
struct FinalizeArgs {
    /// Raw-captures directory holding the images the detector consumed.
    #[arg(long)]
    raw: PathBuf,

    /// Directory of per-image prediction files produced by the detector.
    #[arg(long)]
    predictions: PathBuf,

    /// Detected-captures directory complete pairs move into.
    #[arg(long)]
    detected: PathBuf,

    /// Manifest providing the class catalog the detector was trained on.
    #[arg(long)]
    manifest: PathBuf,

    /// Optional configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

#[derive(clap::Args)]
struct MoveVerifiedArgs {
    /// Directory the human verifier worked in.
    #[arg(long)]
    source: PathBuf,

    /// Training-source directory verified pairs move into.
    #[arg(long)]
    dest: PathBuf,

    /// Optional directory to additionally copy each moved pair into.
    #[arg(long)]
    copy_to: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

#[derive(clap::Args)]
struct MoveDetectedArgs {
    /// Raw-captures directory.
    #[arg(long)]
    raw: PathBuf,

    /// Detected-captures directory.
    #[arg(long)]
    detected: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportOutput::Text)]
    output: ReportOutput,
}

/// Run the labelstage CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelstageError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::PrepareTrain(args)) => run_prepare_train(args),
        Some(Commands::PrepareTest(args)) => run_prepare_test(args),
        Some(Commands::Finalize(args)) => run_finalize(args),
        Some(Commands::MoveVerified(args)) => run_move_verified(args),
        Some(Commands::MoveDetected(args)) => run_move_detected(args),
        None => {
            println!("labelstage {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset staging for human-in-the-loop object detection.");
            println!();
            println!("Run 'labelstage --help' for usage information.");
            Ok(())
        }
    }
}

fn run_prepare_train(args: PrepareTrainArgs) -> Result<(), LabelstageError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(val_fraction) = args.val_fraction {
        config.pipeline.val_fraction = val_fraction;
    }

    let (_catalog, report) = pipeline::prepare_training_set(
        &args.source,
        &args.root,
        &config,
        args.model_config.as_deref(),
        args.seed,
    )?;

    emit(&report, args.output)
}

fn run_prepare_test(args: PrepareTestArgs) -> Result<(), LabelstageError> {
    let (_manifest_path, report) =
        pipeline::prepare_test_set(&args.source, &args.root, &args.manifest)?;
    emit(&report, args.output)
}

fn run_finalize(args: FinalizeArgs) -> Result<(), LabelstageError> {
    let config = load_config(args.config.as_deref())?;
    let catalog = manifest::load_manifest(&args.manifest)?.catalog();

    let report = pipeline::finalize_detections(
        &args.raw,
        &args.predictions,
        &args.detected,
        &catalog,
        &config,
    )?;

    emit(&report, args.output)
}

fn run_move_verified(args: MoveVerifiedArgs) -> Result<(), LabelstageError> {
    let report = transfer::move_verified(&args.source, &args.dest, args.copy_to.as_deref())?;
    emit(&report, args.output)
}

fn run_move_detected(args: MoveDetectedArgs) -> Result<(), LabelstageError> {
    let report = transfer::move_detected(&args.raw, &args.detected)?;
    emit(&report, args.output)
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, LabelstageError> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn emit<R: Serialize + std::fmt::Display>(
    report: &R,
    output: ReportOutput,
) -> Result<(), LabelstageError> {
    match output {
        ReportOutput::Text => println!("{report}"),
        ReportOutput::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{json}");
        }
    }
    Ok(())
}
