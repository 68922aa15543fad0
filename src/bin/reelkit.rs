use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use reelkit::{
    AudioStep, Compositor, CreationMode, EditorState, FfmpegCodec, FfmpegVideoSource, FsResolver,
    MediaSource, OutputFile, RenderConfig,
};

#[derive(Parser, Debug)]
#[command(name = "reelkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a video or photo with an editor state (requires `ffmpeg` on PATH for video).
    Render(RenderArgs),
    /// Render a text card to PNG.
    TextCard(TextCardArgs),
    /// Print the 0.1 s volume envelope of an audio file as JSON.
    Analyze(AnalyzeArgs),
    /// Print auto-cut segments for a source duration as JSON.
    Autocut(AutocutArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Video,
    Photo,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source video or picture.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Editor state JSON. Defaults to no edits.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Render config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Video)]
    mode: Mode,

    /// Directory asset URLs are resolved against. Defaults to the state file's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Partner video shown beside the source when the state has a duet layout.
    #[arg(long)]
    duet_partner: Option<PathBuf>,

    /// Seed for the glitch effect.
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory; the file is named after the mode and the current time.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct TextCardArgs {
    #[arg(long)]
    text: String,

    /// Editor state JSON (filters, effects, captions and stickers apply to the card).
    #[arg(long)]
    state: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    assets_root: Option<PathBuf>,

    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Decode timeout in seconds.
    #[arg(long, default_value_t = 120.0)]
    timeout_secs: f64,
}

#[derive(Parser, Debug)]
struct AutocutArgs {
    /// Source duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Sensitivity in [0, 1]; higher keeps fewer segments.
    #[arg(long, default_value_t = reelkit::AUTO_CUT_THRESHOLD)]
    threshold: f64,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::TextCard(args) => cmd_text_card(args),
        Command::Analyze(args) => cmd_analyze(args),
        Command::Autocut(args) => cmd_autocut(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RenderConfig> {
    let config = match path {
        Some(p) => RenderConfig::from_json_file(p)?,
        None => RenderConfig::default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn load_state(path: Option<&Path>) -> anyhow::Result<EditorState> {
    let Some(path) = path else {
        return Ok(EditorState::new());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read editor state '{}'", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parse editor state '{}'", path.display()))
}

fn assets_root(explicit: Option<PathBuf>, state: Option<&Path>) -> PathBuf {
    explicit
        .or_else(|| state.and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_compositor(
    config: RenderConfig,
    root: PathBuf,
    seed: Option<u64>,
) -> anyhow::Result<Compositor> {
    let codec = Arc::new(FfmpegCodec::new(config.decode_timeout()));
    let compositor = Compositor::new(config, Arc::new(FsResolver::new(root)), codec)?;
    Ok(match seed {
        Some(seed) => compositor.with_seed(seed),
        None => compositor,
    })
}

fn write_output(out_dir: &Path, file: &OutputFile) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let path = out_dir.join(&file.name);
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("write output '{}'", path.display()))?;
    Ok(path)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let timeout = config.decode_timeout();
    let mut state = load_state(args.state.as_deref())?;
    let mode = match args.mode {
        Mode::Video => CreationMode::Video,
        Mode::Photo => CreationMode::Photo,
    };
    if mode == CreationMode::Video && state.trim.end <= state.trim.start {
        let info = reelkit::probe_video(&args.in_path, timeout)?;
        state = state.with_source_duration(info.duration_sec);
    }

    let root = assets_root(args.assets_root, args.state.as_deref());
    let mut compositor = build_compositor(config, root, args.seed)?;
    if let Some(partner) = &args.duet_partner {
        let partner = FfmpegVideoSource::open(partner, timeout)?;
        compositor = compositor.with_duet_partner(Box::new(partner));
    }

    let output = compositor.compose(&MediaSource::from_path(&args.in_path), &state, mode)?;
    if let AudioStep::Degraded(reason) = &output.audio {
        eprintln!("audio mix skipped: {reason}");
    }
    let path = write_output(&args.out_dir, &output.file)?;
    eprintln!("wrote {} ({} frames)", path.display(), output.frames);
    Ok(())
}

fn cmd_text_card(args: TextCardArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let state = load_state(args.state.as_deref())?;
    let root = assets_root(args.assets_root, args.state.as_deref());
    let mut compositor = build_compositor(config, root, None)?;

    let mut card = compositor.text_card_source(&args.text)?;
    let output = compositor.compose_still(&mut card, &state, CreationMode::Text)?;
    let path = write_output(&args.out_dir, &output.file)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.timeout_secs.is_finite() && args.timeout_secs > 0.0,
        "timeout must be > 0"
    );
    let codec = FfmpegCodec::new(std::time::Duration::from_secs_f64(args.timeout_secs));
    let path = std::path::absolute(&args.in_path)
        .with_context(|| format!("resolve '{}'", args.in_path.display()))?;
    let resolver = FsResolver::new(".");
    let url = format!("file://{}", path.display());
    let envelope = reelkit::analyze_audio(&resolver, &codec, &url)?;
    println!("{}", serde_json::to_string(&envelope)?);
    Ok(())
}

fn cmd_autocut(args: AutocutArgs) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let segments = reelkit::auto_cut_segments(args.duration, args.threshold, &mut rng)?;
    println!("{}", serde_json::to_string(&segments)?);
    Ok(())
}
