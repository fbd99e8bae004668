use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use gram_core::prelude::*;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "gram",
    about = "Generate and process raster data through task files",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar while running tasks (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a task file (JSON or YAML)
    Run(RunArgs),
    /// Repeat a tile over a larger image
    Tile(TileArgs),
    /// Paste patches onto a background
    Synth(SynthArgs),
    /// Print the automatic row layout for patches on a background (JSON)
    Layout(LayoutArgs),
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// Task file (.json, .yaml or .yml)
    tasks: PathBuf,
    /// Print the parsed task list and exit
    #[arg(long, default_value_t = false)]
    print_tasks: bool,
    /// Output format for --print-tasks: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"])]
    print_format: String,
    /// Check task names and input wiring without running anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct TileArgs {
    /// Tile image
    input: PathBuf,
    /// Output image
    output: PathBuf,
    /// Output width in pixels
    #[arg(long)]
    width: u32,
    /// Output height in pixels
    #[arg(long)]
    height: u32,
}

#[derive(Parser, Debug, Clone)]
struct SynthArgs {
    /// Background image
    background: PathBuf,
    /// Patch images, painted in order (later on top)
    #[arg(required = true)]
    patches: Vec<PathBuf>,
    /// Output image
    #[arg(short, long)]
    out: PathBuf,
    /// Top-left position `x,y` of each patch, in patch order. Omit for an automatic row layout
    #[arg(long = "position", value_parser = parse_position)]
    positions: Vec<Position>,
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    /// Background image
    background: PathBuf,
    /// Patch images
    #[arg(required = true)]
    patches: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Run(args) => run_tasks(args, cli.progress && !cli.quiet),
        Commands::Tile(args) => run_tile(args),
        Commands::Synth(args) => run_synth(args),
        Commands::Layout(args) => run_layout(args),
    }
}

fn run_tasks(args: &RunArgs, show_progress: bool) -> anyhow::Result<()> {
    let file = read_task_file(&args.tasks)?;

    if args.print_tasks {
        let text = match args.print_format.as_str() {
            "yaml" => serde_yaml::to_string(&file)?,
            _ => serde_json::to_string_pretty(&file)?,
        };
        println!("{text}");
        return Ok(());
    }

    check_tasks(&file)?;
    if args.dry_run {
        info!(tasks = file.tasks.len(), "task file is valid");
        return Ok(());
    }

    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if show_progress {
        let b = ProgressBar::new(file.tasks.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} task {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .context("progress template")?,
        );
        Some(b)
    } else {
        None
    };

    let start = Instant::now();
    let mut pipeline = Pipeline::new();
    for (i, task) in file.tasks.iter().enumerate() {
        if let Some(b) = &bar {
            b.set_message(task.task.clone());
        }
        pipeline
            .run_task(task)
            .with_context(|| format!("task {i} ({})", task.task))?;
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(
        tasks = file.tasks.len(),
        ms = start.elapsed().as_millis() as u64,
        "all tasks done"
    );
    Ok(())
}

fn read_task_file(path: &Path) -> anyhow::Result<TaskFile> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read task file {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let file: TaskFile = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("parse YAML task file {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("parse JSON task file {}", path.display()))?,
        _ => bail!(
            "task file {} must end in .json, .yaml or .yml",
            path.display()
        ),
    };
    Ok(file)
}

/// Resolve every task name and make sure each `input_index` refers to an
/// earlier task.
fn check_tasks(file: &TaskFile) -> anyhow::Result<()> {
    for (i, task) in file.tasks.iter().enumerate() {
        task.task
            .parse::<TaskKind>()
            .with_context(|| format!("task {i}"))?;
        if let Some(indices) = task.parameters.get("input_index") {
            let indices: Vec<usize> = serde_json::from_value(indices.clone())
                .with_context(|| format!("task {i} ({}): input_index", task.task))?;
            if let Some(bad) = indices.iter().find(|&&j| j >= i) {
                bail!(
                    "task {i} ({}): input_index {bad} does not refer to an earlier task",
                    task.task
                );
            }
        }
    }
    Ok(())
}

fn run_tile(args: &TileArgs) -> anyhow::Result<()> {
    let source = load_image(&args.input).with_context(|| format!("load {}", args.input.display()))?;
    let out = tile(&source, Extent::new(args.width, args.height))?;
    save_image(&out, &args.output).with_context(|| format!("save {}", args.output.display()))?;
    info!(out = %args.output.display(), w = args.width, h = args.height, "tiled");
    Ok(())
}

fn run_synth(args: &SynthArgs) -> anyhow::Result<()> {
    let background = load_image(&args.background)
        .with_context(|| format!("load background {}", args.background.display()))?;
    let patches = load_all(&args.patches)?;
    let placement = if args.positions.is_empty() {
        Placement::Auto
    } else {
        Placement::Explicit(args.positions.clone())
    };
    let synth = composite(&background, &patches, &placement)?;
    save_image(&Canvas::ImageRgba8(synth), &args.out)
        .with_context(|| format!("save {}", args.out.display()))?;
    info!(out = %args.out.display(), patches = patches.len(), "synthetic image written");
    Ok(())
}

fn run_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let background = load_image(&args.background)
        .with_context(|| format!("load background {}", args.background.display()))?;
    let extents: Vec<Extent> = load_all(&args.patches)?.iter().map(Extent::of).collect();
    let layout = plan_layout(Extent::of(&background), &extents)?;
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn load_all(paths: &[PathBuf]) -> anyhow::Result<Vec<Canvas>> {
    paths
        .iter()
        .map(|p| load_image(p).with_context(|| format!("load {}", p.display())))
        .collect()
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse::<i64>().map_err(|e| format!("x in {s:?}: {e}"))?;
    let y = y.trim().parse::<i64>().map_err(|e| format!("y in {s:?}: {e}"))?;
    Ok(Position::new(x, y))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
