use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::encode::host::{EncoderConfig, EncoderEvent, EncoderHost, EncoderSession};
use crate::foundation::core::Fps;
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Encoder host backed by the system `ffmpeg` binary.
///
/// Raw RGBA frames stream into `ffmpeg` stdin and the container bytes come back on stdout as
/// [`EncoderEvent::Chunk`]s, so the recording is assembled the same way as with any other host.
#[derive(Clone, Debug)]
pub struct FfmpegEncoderHost {
    encoders: Option<String>,
    bg_rgba: [u8; 4],
}

impl FfmpegEncoderHost {
    /// Probe `ffmpeg -encoders` once. A missing binary yields a host that supports nothing.
    pub fn probe() -> Self {
        let encoders = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).into_owned());
        if encoders.is_none() {
            tracing::warn!("ffmpeg not found on PATH; video recording unavailable");
        }
        Self {
            encoders,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Host with a fixed encoder listing, in `ffmpeg -encoders` format.
    pub fn with_encoder_listing(listing: impl Into<String>) -> Self {
        Self {
            encoders: Some(listing.into()),
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub fn is_available(&self) -> bool {
        self.encoders.is_some()
    }

    fn has_encoder(&self, name: &str) -> bool {
        self.encoders.as_deref().is_some_and(|listing| {
            listing
                .lines()
                .filter_map(|line| line.split_whitespace().nth(1))
                .any(|enc| enc == name)
        })
    }
}

/// Codec and container `ffmpeg` uses for a recording format id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FfmpegTarget {
    pub codec: &'static str,
    pub muxer: &'static str,
}

pub fn target_for_format(id: &str) -> Option<FfmpegTarget> {
    let (mime, codecs) = match id.split_once(';') {
        Some((m, c)) => (m.trim(), Some(c.trim())),
        None => (id.trim(), None),
    };
    let codecs = codecs.and_then(|c| c.strip_prefix("codecs=")).map(|c| c.trim_matches('"'));
    match (mime, codecs) {
        ("video/webm", Some("vp9")) => Some(FfmpegTarget {
            codec: "libvpx-vp9",
            muxer: "webm",
        }),
        ("video/webm", Some("vp8") | None) => Some(FfmpegTarget {
            codec: "libvpx",
            muxer: "webm",
        }),
        ("video/mp4", None) => Some(FfmpegTarget {
            codec: "libx264",
            muxer: "mp4",
        }),
        _ => None,
    }
}

impl EncoderHost for FfmpegEncoderHost {
    fn is_format_supported(&self, format: &str) -> bool {
        target_for_format(format).is_some_and(|t| self.has_encoder(t.codec))
    }

    fn create_session(&mut self, cfg: EncoderConfig) -> MirrorResult<Box<dyn EncoderSession>> {
        if cfg.size.is_empty() {
            return Err(MirrorError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        let target = target_for_format(cfg.format.id())
            .filter(|t| self.has_encoder(t.codec))
            .ok_or_else(|| MirrorError::no_supported_format(cfg.format.id().to_owned()))?;
        Ok(Box::new(FfmpegSession {
            scratch: vec![0u8; cfg.size.rgba_len()],
            cfg,
            target,
            bg_rgba: self.bg_rgba,
            child: None,
            stdin: None,
            stdout_rx: None,
            stderr_drain: None,
            stopping: false,
            eof: false,
            finished: false,
        }))
    }
}

enum StdoutMsg {
    Data(Vec<u8>),
    Eof(std::io::Result<()>),
}

struct FfmpegSession {
    cfg: EncoderConfig,
    target: FfmpegTarget,
    bg_rgba: [u8; 4],
    scratch: Vec<u8>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_rx: Option<Receiver<StdoutMsg>>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    stopping: bool,
    eof: bool,
    finished: bool,
}

impl FfmpegSession {
    fn command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &self.cfg.size.to_string(),
        ]);
        push_input_fps(&mut cmd, self.cfg.fps);
        cmd.args(["-i", "pipe:0", "-an", "-c:v", self.target.codec]);
        cmd.args(["-b:v", &self.cfg.bitrate.to_string()]);
        // yuv420p needs even dimensions.
        cmd.args([
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-pix_fmt",
            "yuv420p",
        ]);
        if self.target.muxer == "mp4" {
            // A non-seekable pipe needs a fragmented mp4.
            cmd.args(["-movflags", "frag_keyframe+empty_moov"]);
        }
        cmd.args(["-f", self.target.muxer, "pipe:1"]);
        cmd
    }

    fn reap(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        let status = child.wait();
        let stderr_bytes = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .and_then(Result::ok)
            .unwrap_or_default();
        match status {
            Ok(s) if s.success() => tracing::debug!("ffmpeg exited cleanly"),
            Ok(s) => tracing::warn!(
                status = %s,
                stderr = %String::from_utf8_lossy(&stderr_bytes).trim(),
                "ffmpeg exited with failure"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to wait for ffmpeg"),
        }
    }
}

impl EncoderSession for FfmpegSession {
    #[tracing::instrument(skip(self), fields(format = %self.cfg.format, size = %self.cfg.size))]
    fn start(&mut self) -> MirrorResult<()> {
        if self.child.is_some() || self.finished {
            return Err(MirrorError::encode("ffmpeg session already started"));
        }
        let mut child = self.command().spawn().map_err(|e| {
            MirrorError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MirrorError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MirrorError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MirrorError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => {
                        let _ = tx.send(StdoutMsg::Eof(Ok(())));
                        return;
                    }
                    Ok(n) => {
                        if tx.send(StdoutMsg::Data(buf[..n].to_vec())).is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        let _ = tx.send(StdoutMsg::Eof(Err(e)));
                        return;
                    }
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_rx = Some(rx);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> MirrorResult<()> {
        if frame.size() != self.cfg.size {
            return Err(MirrorError::encode(format!(
                "frame size mismatch: got {}, expected {}",
                frame.size(),
                self.cfg.size
            )));
        }
        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MirrorError::encode("ffmpeg session is not accepting frames"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            MirrorError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn stop(&mut self) -> MirrorResult<()> {
        if self.child.is_none() || self.stopping {
            return Err(MirrorError::encode("ffmpeg session is not running"));
        }
        self.stopping = true;
        // Closing stdin lets ffmpeg flush and exit.
        drop(self.stdin.take());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<EncoderEvent> {
        if self.finished {
            return None;
        }
        if !self.eof
            && let Some(rx) = self.stdout_rx.as_ref()
        {
            match rx.try_recv() {
                Ok(StdoutMsg::Data(bytes)) => return Some(EncoderEvent::Chunk(bytes)),
                Ok(StdoutMsg::Eof(res)) => {
                    if let Err(e) = res {
                        tracing::warn!(error = %e, "ffmpeg stdout read failed");
                    }
                    self.eof = true;
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.eof = true,
            }
        }
        if self.eof && self.stopping {
            self.reap();
            self.finished = true;
            return Some(EncoderEvent::Stopped);
        }
        None
    }
}

impl Drop for FfmpegSession {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> MirrorResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(MirrorError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MirrorResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
