use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use motion_mirror::{
    AppEvent, DeviceClass, EncoderHost, FfmpegEncoderHost, FileDownloads, FrameSource, Hosts,
    ImageSequenceSource, InMemoryEncoderHost, JsonFlagStore, LogUi, ManualClock,
    MemoryBlobStore, MirrorConfig, MotionMirror, RecorderState, SessionPhase, Size,
    SyntheticSource,
};

const ENCODER_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "motion-mirror", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render ticks from a source, optionally recording a tick window to a video.
    Run(RunArgs),
    /// Render ticks and save a still image of the composited output.
    Snapshot(SnapshotArgs),
    /// Print which recording formats the system ffmpeg can produce.
    Formats,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Directory of PNG/JPEG frames to use as the camera.
    #[arg(long, conflicts_with = "synthetic")]
    frames: Option<PathBuf>,

    /// Synthetic camera size (WIDTHxHEIGHT) when no frame directory is given.
    #[arg(long, value_parser = parse_size, default_value = "160x120")]
    synthetic: Size,

    /// Output viewport (WIDTHxHEIGHT).
    #[arg(long, value_parser = parse_size, default_value = "640x480")]
    viewport: Size,

    /// Device class driving buffer scaling and sampling stride.
    #[arg(long, value_enum, default_value_t = DeviceArg::Desktop)]
    device: DeviceArg,

    /// JSON config overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of render ticks.
    #[arg(long, default_value_t = 90)]
    ticks: u64,

    /// Host tick rate in Hz.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Directory saved artifacts are written to.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Tick at which recording starts.
    #[arg(long, requires = "record_to")]
    record_from: Option<u64>,

    /// Tick at which recording stops (exclusive).
    #[arg(long, requires = "record_from")]
    record_to: Option<u64>,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeviceArg {
    Mobile,
    Desktop,
}

impl From<DeviceArg> for DeviceClass {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Mobile => DeviceClass::Mobile,
            DeviceArg::Desktop => DeviceClass::Desktop,
        }
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    Size::parse(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Formats => cmd_formats(),
    }
}

fn load_config(args: &SessionArgs) -> anyhow::Result<MirrorConfig> {
    Ok(match args.config.as_ref() {
        Some(path) => MirrorConfig::from_path(path)?,
        None => MirrorConfig::default(),
    })
}

fn build_source(args: &SessionArgs) -> Box<dyn FrameSource> {
    match args.frames.as_ref() {
        Some(dir) => Box::new(ImageSequenceSource::new(dir).looping(true)),
        None => Box::new(SyntheticSource::new(args.synthetic)),
    }
}

struct Session {
    app: MotionMirror,
    clock: ManualClock,
    tick_period: Duration,
}

fn open_session(
    args: &SessionArgs,
    cfg: MirrorConfig,
    encoder: Box<dyn EncoderHost>,
) -> anyhow::Result<Session> {
    anyhow::ensure!(args.tick_rate > 0, "--tick-rate must be > 0");
    let clock = ManualClock::new();
    let hosts = Hosts {
        source: build_source(args),
        encoder,
        blobs: Box::new(MemoryBlobStore::new()),
        ui: Box::new(LogUi),
        flags: Box::new(JsonFlagStore::new(args.out_dir.join("flags.json"))),
        downloads: Box::new(FileDownloads::new(&args.out_dir)),
        clock: Box::new(clock.clone()),
    };
    let mut app = MotionMirror::new(cfg, args.device.into(), args.viewport, hosts)?;
    app.start().context("start camera source")?;
    anyhow::ensure!(
        app.phase() == SessionPhase::Live,
        "camera source did not become ready"
    );
    Ok(Session {
        app,
        clock,
        tick_period: Duration::from_secs_f64(1.0 / f64::from(args.tick_rate)),
    })
}

impl Session {
    fn tick(&mut self) -> anyhow::Result<()> {
        self.app.tick()?;
        self.clock.advance(self.tick_period);
        Ok(())
    }

    fn send(&mut self, event: AppEvent) -> anyhow::Result<()> {
        self.app.dispatch(event);
        self.app.pump()?;
        Ok(())
    }

    /// Pump until a stopped encoder has flushed.
    fn wait_for_encoder(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + ENCODER_FLUSH_TIMEOUT;
        while self.app.awaiting_encoder() {
            anyhow::ensure!(
                Instant::now() < deadline,
                "encoder did not finish within {ENCODER_FLUSH_TIMEOUT:?}"
            );
            std::thread::sleep(Duration::from_millis(5));
            self.app.pump()?;
        }
        Ok(())
    }

    fn save(&mut self) -> anyhow::Result<String> {
        let filename = self
            .app
            .playback()
            .artifact()
            .map(|a| a.filename.clone())
            .context("no artifact to save")?;
        self.send(AppEvent::Save)?;
        Ok(filename)
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    let window = match (args.record_from, args.record_to) {
        (Some(a), Some(b)) => {
            anyhow::ensure!(b > a, "--record-to must be greater than --record-from");
            anyhow::ensure!(
                b <= args.session.ticks,
                "--record-to must not exceed --ticks"
            );
            let span = Duration::from_secs_f64((b - a) as f64 / f64::from(args.session.tick_rate));
            anyhow::ensure!(
                span >= cfg.debounce(),
                "record window of {span:?} is shorter than the {:?} toggle cool-down",
                cfg.debounce()
            );
            Some((a, b))
        }
        _ => None,
    };

    let mut s = open_session(&args.session, cfg, Box::new(FfmpegEncoderHost::probe()))?;
    for t in 0..args.session.ticks {
        if let Some((a, b)) = window
            && (t == a || t == b)
        {
            s.send(AppEvent::ToggleRecording)?;
        }
        s.tick()?;
    }
    if s.app.recorder().state() == RecorderState::Recording {
        s.send(AppEvent::ToggleRecording)?;
    }
    s.wait_for_encoder()?;

    if s.app.playback().has_artifact() {
        let filename = s.save()?;
        eprintln!("wrote {}", args.session.out_dir.join(filename).display());
    } else {
        eprintln!("rendered {} ticks", s.app.tick_index().0);
    }
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    let mut s = open_session(
        &args.session,
        cfg,
        Box::new(InMemoryEncoderHost::unsupported()),
    )?;
    for _ in 0..args.session.ticks {
        s.tick()?;
    }
    s.send(AppEvent::ToggleRecording)?;
    let filename = s.save()?;
    eprintln!("wrote {}", args.session.out_dir.join(filename).display());
    Ok(())
}

fn cmd_formats() -> anyhow::Result<()> {
    let cfg = MirrorConfig::default();
    let host = FfmpegEncoderHost::probe();
    if !host.is_available() {
        println!("ffmpeg: not found");
    }
    for id in &cfg.format_preferences {
        let mark = if host.is_format_supported(id) { "yes" } else { "no" };
        println!("{id}: {mark}");
    }
    match motion_mirror::negotiate(&host, cfg.format_preferences.as_slice()) {
        Some(fmt) => println!("negotiated: {fmt} (.{})", fmt.extension()),
        None => println!("negotiated: none (still capture)"),
    }
    Ok(())
}
