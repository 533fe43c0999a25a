use crate::{
    classify::classify,
    config::Config,
    data::FilterData,
    decode::frame_count,
    image_id::ImageId,
    layout::{PageLayout, SplitLine},
    locator::ProjectionLocator,
    pipeline::Pipeline,
    report::ItemStatus,
    rotation::OrthogonalRotation,
    rule::Rule,
    settings::{ParamsStore, RuleRepository, Settings},
    status::{CancellationToken, NeverCancel},
    ui::HeadlessUi,
    util::{collect_images, ensure_dir},
};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "page-split")]
#[command(about = "Find where scanned images split into logical pages")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./page-split.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the rule and single/two page classification for an image.
    Classify {
        #[arg(long)]
        input: PathBuf,
        /// Frame index inside a multi-page file.
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,
    },
    /// Run page splitting over images and directories.
    Run {
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Store a layout rule for one image, or the default for all.
    SetRule {
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        input: Option<PathBuf>,
        #[arg(long)]
        all: bool,
        /// auto, single or two
        #[arg(long)]
        layout: Rule,
    },
    /// Fix the split line of an image by hand.
    SetLayout {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        split_x: f64,
        #[arg(long, value_enum, default_value_t = ManualKind::Two)]
        kind: ManualKind,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,
    },
    /// Print the stored rule and layout for an image.
    Show {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ManualKind {
    /// Two pages cut at the line.
    Two,
    /// Keep the left part, discard the right.
    Left,
    /// Keep the right part, discard the left.
    Right,
}

impl ManualKind {
    fn layout(self, line: SplitLine) -> PageLayout {
        match self {
            ManualKind::Two => PageLayout::two_pages(line),
            ManualKind::Left => PageLayout::left_page_plus_offcut(line),
            ManualKind::Right => PageLayout::right_page_plus_offcut(line),
        }
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = Config::load_or_default(cfg_path.as_deref())?;
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Classify {
            input,
            page,
            rotation,
        } => classify_image(&cfg, &ImageId::new(input, *page), *rotation),
        Command::Run {
            input,
            rotation,
            out_dir,
        } => run(&cfg, input, *rotation, out_dir.as_deref()),
        Command::SetRule { input, all, layout } => set_rule(&cfg, input.as_deref(), *all, *layout),
        Command::SetLayout {
            input,
            page,
            split_x,
            kind,
            rotation,
        } => set_layout(&cfg, &ImageId::new(input, *page), *split_x, *kind, *rotation),
        Command::Show { input, page } => show(&cfg, &ImageId::new(input, *page)),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("page-split.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.out_dir).join("page-split.log"))
}

fn load_settings(cfg: &Config) -> Result<Arc<Settings>> {
    Ok(Arc::new(Settings::load(Path::new(&cfg.paths.settings_file))?))
}

fn save_settings(cfg: &Config, settings: &Settings) -> Result<()> {
    settings.save(Path::new(&cfg.paths.settings_file))
}

fn classify_image(cfg: &Config, id: &ImageId, rotation: i32) -> Result<()> {
    let rotation = OrthogonalRotation::from_degrees(rotation)?;
    let settings = load_settings(cfg)?;
    let data = FilterData::load(cfg, id, rotation)?;
    let rule = settings.rule_for(id);
    let metadata = data.metadata();
    let classification = classify(rule, &metadata, rotation);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "image": id,
            "rule": rule,
            "width": metadata.width,
            "height": metadata.height,
            "dpi": metadata.dpi,
            "rotation": rotation.degrees(),
            "classification": classification,
        }))?
    );
    Ok(())
}

fn run(cfg: &Config, inputs: &[PathBuf], rotation: i32, out_override: Option<&Path>) -> Result<()> {
    let rotation = OrthogonalRotation::from_degrees(rotation)?;
    let images = expand_frames(&collect_images(inputs)?);
    if images.is_empty() {
        return Err(anyhow!("no images found in inputs"));
    }

    let out_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    ensure_dir(&out_dir)?;

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string_pretty(cfg).context("serializing effective config")?;
        std::fs::write(out_dir.join("effective-config.toml"), raw)?;
    }

    let settings = load_settings(cfg)?;
    let locator = Arc::new(ProjectionLocator::new(&cfg.split));
    let pipeline = Pipeline::new(cfg, Arc::clone(&settings), locator);
    let token = CancellationToken::with_timeout(Duration::from_secs(cfg.limits.job_timeout_seconds));

    let mut ui = HeadlessUi::new();
    if cfg.debug.enabled {
        ui = ui.with_debug_dir(&cfg.paths.debug_dir);
    }

    let mut report = pipeline.run_job(&images, rotation, &out_dir, &token, &mut ui)?;
    report.attach_outputs(ui.outputs());

    // Params computed before a failure or cancellation are kept too.
    save_settings(cfg, &settings)?;

    if cfg.output.write_report_json {
        let path = out_dir.join(&cfg.output.report_filename);
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_name": report.job_name,
                "images": report.total_images,
                "logical_pages": report.total_logical_pages,
                "ok": report.count(ItemStatus::Ok),
                "cancelled": report.count(ItemStatus::Cancelled),
                "failed": report.count(ItemStatus::Failed),
                "out_dir": out_dir,
            }))?
        );
    }
    Ok(())
}

/// One id per frame; a file whose frames cannot be counted is kept as a
/// single id so the run reports its failure.
fn expand_frames(paths: &[PathBuf]) -> Vec<ImageId> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let frames = frame_count(path).unwrap_or_else(|err| {
            warn!("counting frames of {}: {err:#}", path.display());
            1
        });
        out.extend((0..frames).map(|page| ImageId::new(path, page)));
    }
    out
}

fn set_rule(cfg: &Config, input: Option<&Path>, all: bool, rule: Rule) -> Result<()> {
    let settings = load_settings(cfg)?;
    if all {
        settings.set_rule_for_all(rule);
        info!(?rule, "default rule set for all images");
    } else {
        let input = input.ok_or_else(|| anyhow!("--input or --all is required"))?;
        settings.set_rule(&ImageId::from_path(input), rule);
        info!(?rule, "rule set for {}", input.display());
    }
    save_settings(cfg, &settings)
}

fn set_layout(cfg: &Config, id: &ImageId, split_x: f64, kind: ManualKind, rotation: i32) -> Result<()> {
    let rotation = OrthogonalRotation::from_degrees(rotation)?;

    // The edit goes through the UI path, so the stage must end here
    // rather than chain to the writer.
    let mut local = cfg.clone();
    local.output.write_sub_pages = false;
    local.debug.enabled = false;

    let settings = load_settings(cfg)?;
    let pipeline = Pipeline::new(&local, Arc::clone(&settings), Arc::new(ProjectionLocator::new(&cfg.split)));
    let result = pipeline.run_image(&NeverCancel, id, rotation, Path::new(&cfg.paths.out_dir))?;

    let mut ui = HeadlessUi::new();
    result.materialize(&mut ui);
    let view = ui
        .image_view_mut()
        .ok_or_else(|| anyhow!("no image view after materializing {id}"))?;

    let (width, height) = rotation.rotate_size((view.image().width(), view.image().height()));
    let layout = kind.layout(SplitLine::vertical(split_x, f64::from(height)));
    if !layout.fits_width(width) {
        bail!("split_x {split_x} must lie inside the image (width {width})");
    }
    view.set_manual_layout(layout);

    save_settings(cfg, &settings)?;
    let stored = settings.page_params(id);
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}

fn show(cfg: &Config, id: &ImageId) -> Result<()> {
    let settings = load_settings(cfg)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "image": id,
            "rule": settings.rule_for(id),
            "params": settings.page_params(id),
        }))?
    );
    Ok(())
}
