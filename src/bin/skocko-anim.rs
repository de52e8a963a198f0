use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use skocko_anim::{
    assets::PreparedAssetStore,
    encode_ffmpeg::OutputFormat,
    render::{create_backend, BackendKind, RenderSettings},
    scenes::{self, theme::Theme},
    Composition, FrameIndex, Quality, RenderToFileOptions,
};

#[derive(Parser, Debug)]
#[command(name = "skocko-anim", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available scenes.
    List,
    /// Render a single frame of a scene as a PNG.
    Frame(FrameArgs),
    /// Render one scene (or all of them) as GIF or MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Low,
    Medium,
    High,
}

impl QualityChoice {
    fn quality(self) -> Quality {
        match self {
            Self::Low => Quality::Low,
            Self::Medium => Quality::Medium,
            Self::High => Quality::High,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Gif,
    Mp4,
}

impl FormatChoice {
    fn format(self) -> OutputFormat {
        match self {
            Self::Gif => OutputFormat::Gif,
            Self::Mp4 => OutputFormat::Mp4,
        }
    }
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Output quality preset.
    #[arg(long, value_enum, default_value_t = QualityChoice::Medium)]
    quality: QualityChoice,

    /// JSON file overriding the scene's default configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that font paths are resolved against.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Body font, relative to the assets root.
    #[arg(long, default_value = "fonts/DejaVuSans.ttf")]
    font: String,

    /// Monospace font for code and register readouts, relative to the assets root.
    #[arg(long, default_value = "fonts/DejaVuSansMono.ttf")]
    mono_font: String,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene name (see `list`).
    scene: String,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene name (see `list`); omit with --all.
    scene: Option<String>,

    /// Render every scene in the catalog.
    #[arg(long, conflicts_with = "scene")]
    all: bool,

    /// Output directory; files are named <scene>-<quality>.<ext>.
    #[arg(long, default_value = "media")]
    out_dir: PathBuf,

    /// Output container.
    #[arg(long, value_enum, default_value_t = FormatChoice::Gif)]
    format: FormatChoice,

    /// Overwrite outputs that already exist.
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List => {
            for (name, summary) in scenes::SCENES {
                println!("{name:<26} {summary}");
            }
            Ok(())
        }
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_scene(name: &str, common: &CommonArgs) -> anyhow::Result<(Composition, Theme)> {
    let theme = Theme::new(
        common.quality.quality(),
        common.font.clone(),
        common.mono_font.clone(),
    )?;

    let config = match &common.config {
        None => None,
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            Some(
                serde_json::from_str::<serde_json::Value>(&raw)
                    .with_context(|| format!("parse config '{}'", path.display()))?,
            )
        }
    };

    let comp = scenes::build(name, config.as_ref(), &theme)?;
    Ok((comp, theme))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (comp, theme) = load_scene(&args.scene, &args.common)?;
    let assets = PreparedAssetStore::prepare(&comp, &args.common.assets_root)?;

    let settings = RenderSettings {
        clear_rgba: Some(theme.background),
    };
    let mut backend = create_backend(BackendKind::Cpu, &settings)?;
    let frame = skocko_anim::render_frame(
        &comp,
        FrameIndex(args.frame),
        backend.as_mut(),
        &assets,
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let format = args.format.format();

    let names: Vec<&str> = if args.all {
        scenes::scene_names().collect()
    } else {
        match &args.scene {
            Some(name) => vec![name.as_str()],
            None => anyhow::bail!("pass a scene name or --all (see `list`)"),
        }
    };

    for name in names {
        render_one(name, &args, format)?;
    }
    Ok(())
}

fn render_one(name: &str, args: &RenderArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (comp, theme) = load_scene(name, &args.common)?;
    let assets = PreparedAssetStore::prepare(&comp, &args.common.assets_root)?;

    let settings = RenderSettings {
        clear_rgba: Some(theme.background),
    };
    let mut backend = create_backend(BackendKind::Cpu, &settings)?;

    let out_path = output_path(&args.out_dir, name, args.common.quality.name(), format);
    tracing::info!(scene = name, out = %out_path.display(), "rendering");

    skocko_anim::render_to_file(
        &comp,
        backend.as_mut(),
        &assets,
        &out_path,
        &RenderToFileOptions {
            format,
            overwrite: args.overwrite,
            bg_rgba: theme.background,
        },
    )?;

    eprintln!("wrote {}", out_path.display());
    Ok(())
}

fn output_path(out_dir: &Path, scene: &str, quality: &str, format: OutputFormat) -> PathBuf {
    out_dir.join(format!("{scene}-{quality}.{}", format.extension()))
}
