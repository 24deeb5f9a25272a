use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use timemask::FrameSource as _;

#[derive(Parser, Debug)]
#[command(name = "timemask", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the effect over a directory of frames and write one PNG per tick.
    Render(RenderArgs),
    /// Write a settings file with default values.
    InitSettings(InitSettingsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory of input frames (png/jpg/bmp), played in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// Output directory for `frame_NNNNN.png`.
    #[arg(long)]
    out: PathBuf,

    /// Mask image; repeat to build a playlist. Overrides masks from the settings file.
    #[arg(long)]
    mask: Vec<PathBuf>,

    /// Generated mask, used when no mask image is given.
    #[arg(long, value_enum)]
    pattern: Option<PatternChoice>,

    /// Settings JSON (see `init-settings`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frames of history to keep.
    #[arg(long)]
    capacity: Option<usize>,

    /// Compositing algorithm.
    #[arg(long, value_enum)]
    compositor: Option<CompositorChoice>,

    /// Playback rate used to time mask auto-advance.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Mirror input frames horizontally before buffering.
    #[arg(long)]
    mirror: bool,
}

#[derive(Parser, Debug)]
struct InitSettingsArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompositorChoice {
    Interpolated,
    Banded,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PatternChoice {
    Horizontal,
    Vertical,
    Radial,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::InitSettings(args) => cmd_init_settings(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        anyhow::bail!("--fps must be > 0");
    }

    let mut source = timemask::ImageSequence::open_dir(&args.frames, args.mirror)?;
    let dims = source.dims();

    let mut settings = match &args.settings {
        Some(path) => timemask::Settings::load(path)?,
        None => timemask::Settings::default(),
    };
    if let Some(capacity) = args.capacity {
        settings.capacity = capacity;
    }
    if let Some(choice) = args.compositor {
        settings.compositor = match choice {
            CompositorChoice::Interpolated => timemask::CompositorKind::Interpolated,
            CompositorChoice::Banded => timemask::CompositorKind::Banded,
        };
    }
    if !args.mask.is_empty() {
        settings.masks = args.mask.clone();
    }

    let masks: Box<dyn timemask::MaskSource> = match (settings.masks.is_empty(), args.pattern) {
        (false, _) => Box::new(timemask::FileMasks::new(settings.masks.clone())),
        (true, pattern) => {
            let pattern = match pattern.unwrap_or(PatternChoice::Horizontal) {
                PatternChoice::Horizontal => timemask::MaskPattern::Horizontal,
                PatternChoice::Vertical => timemask::MaskPattern::Vertical,
                PatternChoice::Radial => timemask::MaskPattern::Radial,
            };
            let mask = timemask::TemporalMask::from_pattern(pattern, dims.width, dims.height);
            Box::new(timemask::StaticMasks::new().with(format!("{pattern:?}"), mask))
        }
    };

    let playlist = timemask::MaskPlaylist::new(masks)?;
    let mut session = timemask::TemporalSession::new(dims, settings, playlist)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let mut written = 0u64;
    while let Some(frame) = source.next_frame()? {
        let now = Duration::from_secs_f64(written as f64 / args.fps);
        session.tick(&frame, now)?;

        let view = session.view()?;
        let out_path = args.out.join(format!("frame_{written:05}.png"));
        view.main
            .to_rgb_image()?
            .save(&out_path)
            .with_context(|| format!("write png '{}'", out_path.display()))?;
        written += 1;

        if written % 100 == 0 {
            tracing::info!(frames = written, "rendered");
        }
    }

    eprintln!("wrote {written} frames to {}", args.out.display());
    Ok(())
}

fn cmd_init_settings(args: InitSettingsArgs) -> anyhow::Result<()> {
    timemask::Settings::default().save(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
