//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use certforge_core::{
    check, BatchDriver, BatchReport, CheckReport, LibreOfficeConverter, MissPolicy, RecordStage,
    RunConfig,
};
use certforge_data::load_roster_file;
use certforge_pptx::{ColorInput, Swatch};

/// What to do when a generated document has no placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissPolicyArg {
    /// Keep the unfilled document and warn
    Warn,
    /// Leave the record out of the archive
    SkipRecord,
    /// Stop the whole run
    Abort,
}

impl From<MissPolicyArg> for MissPolicy {
    fn from(arg: MissPolicyArg) -> Self {
        match arg {
            MissPolicyArg::Warn => MissPolicy::Warn,
            MissPolicyArg::SkipRecord => MissPolicy::SkipRecord,
            MissPolicyArg::Abort => MissPolicy::Abort,
        }
    }
}

#[derive(Parser)]
#[command(name = "certforge")]
#[command(author, version, about = "Attendance certificates from a slide template", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one PDF certificate per roster record and zip them
    Generate(GenerateArgs),

    /// Validate configuration, roster and template without converting
    Check(CheckArgs),
}

/// Arguments of `certforge generate`
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Certificate template (PPTX)
    #[arg(short, long)]
    pub template: PathBuf,

    /// Roster file (XLSX, XLS, ODS or CSV)
    #[arg(short, long)]
    pub roster: PathBuf,

    /// Output ZIP archive (defaults to [output] archive_name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Font for the name
    #[arg(long)]
    pub font: Option<String>,

    /// Font size for the name, in points
    #[arg(long)]
    pub size: Option<u32>,

    /// Named color for the name (black, blue, red, green, gray)
    #[arg(long, conflicts_with_all = ["rgb", "hex"])]
    pub color: Option<Swatch>,

    /// Name color as "r,g,b"
    #[arg(long, conflicts_with = "hex")]
    pub rgb: Option<String>,

    /// Name color as "#RRGGBB"
    #[arg(long)]
    pub hex: Option<String>,

    /// Also fill the identifier placeholder from the Dni column
    #[arg(long)]
    pub with_identifier: bool,

    /// Converter program
    #[arg(long)]
    pub converter: Option<String>,

    /// Behavior when a document has no placeholder
    #[arg(long, value_enum)]
    pub on_missing_sentinel: Option<MissPolicyArg>,
}

/// Arguments of `certforge check`
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Certificate template (PPTX)
    #[arg(short, long)]
    pub template: PathBuf,

    /// Roster file (XLSX, XLS, ODS or CSV)
    #[arg(short, long)]
    pub roster: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Require the identifier column and placeholder
    #[arg(long)]
    pub with_identifier: bool,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    dispatch(Cli::parse())
}

/// Run with explicit arguments, the first being the program name
pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    dispatch(Cli::try_parse_from(args)?)
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => {
            generate_command(&args)?;
        }
        Commands::Check(args) => {
            check_command(&args)?;
        }
    }

    Ok(())
}

/// Build the run configuration: file, then command-line overrides
pub fn resolve_config(args: &GenerateArgs) -> Result<RunConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(font) = &args.font {
        config.name.font = font.clone();
    }
    if let Some(size) = args.size {
        config.name.size = size;
    }
    if let Some(swatch) = args.color {
        config.name.color = ColorInput::Named(swatch);
    }
    if let Some(rgb) = &args.rgb {
        config.name.color = ColorInput::RgbText(rgb.clone());
    }
    if let Some(hex) = &args.hex {
        config.name.color = ColorInput::HexText(hex.clone());
    }
    if args.with_identifier {
        config.identifier.enabled = true;
    }
    if let Some(program) = &args.converter {
        config.converter.program = program.clone();
    }
    if let Some(policy) = args.on_missing_sentinel {
        config.on_missing_sentinel = policy.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(Some(path))
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => RunConfig::load(None).context("Failed to load configuration"),
    }
}

fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} not found: {}", what, path.display());
    }
    Ok(())
}

/// Execute the generate command
pub fn generate_command(args: &GenerateArgs) -> Result<BatchReport> {
    println!("certforge v{}", env!("CARGO_PKG_VERSION"));

    ensure_exists(&args.template, "Template")?;
    ensure_exists(&args.roster, "Roster")?;

    let config = resolve_config(args)?;

    let roster = load_roster_file(&args.roster, &config.roster_options())
        .with_context(|| format!("Failed to load roster: {}", args.roster.display()))?;
    let summary = &roster.summary;
    println!(
        "Roster: {} records ({} rows, {} absent, {} duplicates)",
        roster.len(),
        summary.total_rows,
        summary.absent_rows,
        summary.duplicate_names
    );

    let template = fs::read(&args.template)
        .with_context(|| format!("Failed to read template: {}", args.template.display()))?;

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.archive_name));

    let converter = LibreOfficeConverter::new(&config.converter.program);
    let report = BatchDriver::new(&config, &converter)
        .run(&template, &roster.records, &destination, |progress| {
            println!(
                "  [{}/{}] {} ... {}",
                progress.index,
                progress.total,
                progress.name,
                stage_label(progress.stage)
            );
        })
        .with_context(|| format!("Failed to generate certificates from {}", args.template.display()))?;

    println!();
    println!("Generated {} certificates", report.pdf_count());
    if report.sentinel_misses() > 0 {
        println!(
            "  {} documents had no placeholder and were left unfilled",
            report.sentinel_misses()
        );
    }
    for failure in report.failures() {
        if let RecordStage::Failed(reason) = &failure.stage {
            println!("  FAILED {}: {}", failure.full_name, reason);
        }
    }
    println!("  Archive: {}", report.archive.display());

    Ok(report)
}

/// Execute the check command
pub fn check_command(args: &CheckArgs) -> Result<CheckReport> {
    println!("certforge v{}", env!("CARGO_PKG_VERSION"));

    ensure_exists(&args.template, "Template")?;
    ensure_exists(&args.roster, "Roster")?;

    let mut config = load_config(args.config.as_deref())?;
    if args.with_identifier {
        config.identifier.enabled = true;
    }

    let template = fs::read(&args.template)
        .with_context(|| format!("Failed to read template: {}", args.template.display()))?;
    let roster = fs::read(&args.roster)
        .with_context(|| format!("Failed to read roster: {}", args.roster.display()))?;

    let report = check(&config, &template, &roster).context("Check failed")?;

    println!("Records: {}", report.records);
    println!(
        "  {} rows, {} absent, {} blank names, {} duplicates",
        report.roster.total_rows,
        report.roster.absent_rows,
        report.roster.blank_names,
        report.roster.duplicate_names
    );
    println!("Template: {} slides", report.slides);
    for hit in &report.sentinels.hits {
        println!("  '{}': {} runs", hit.sentinel, hit.runs);
    }
    for warning in &report.color_warnings {
        println!("  warning: {}", warning);
    }

    let missing = report.missing_sentinels();
    if !missing.is_empty() {
        println!("  placeholder not found: {}", missing.join(", "));
    }

    Ok(report)
}

fn stage_label(stage: &RecordStage) -> &str {
    match stage {
        RecordStage::Loaded => "loaded",
        RecordStage::Substituted => "filled",
        RecordStage::Saved => "saved",
        RecordStage::Converted => "ok",
        RecordStage::Packaged => "packaged",
        RecordStage::Failed(reason) => reason,
    }
}
