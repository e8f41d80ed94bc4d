use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::foundation::core::Size;
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::source::{Frame, FrameSource, SourceEvent, SourceFailure};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Replays a directory of still images as a camera feed, in file-name order.
///
/// Once the sequence is exhausted the last frame is held (or the sequence restarts when
/// `looping` is set).
pub struct ImageSequenceSource {
    dir: PathBuf,
    looping: bool,
    files: Vec<PathBuf>,
    cursor: usize,
    size: Size,
    frame: Option<Frame>,
    events: VecDeque<SourceEvent>,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            looping: false,
            files: Vec::new(),
            cursor: 0,
            size: Size::default(),
            frame: None,
            events: VecDeque::new(),
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Number of frame files discovered by `start`.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn advance(&mut self) -> MirrorResult<bool> {
        if self.cursor >= self.files.len() {
            if !self.looping || self.files.is_empty() {
                return Ok(false);
            }
            self.cursor = 0;
        }
        let path = &self.files[self.cursor];
        self.cursor += 1;
        self.frame = Some(decode_frame(path)?);
        Ok(true)
    }
}

impl FrameSource for ImageSequenceSource {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn start(&mut self) -> MirrorResult<()> {
        self.files = match list_frame_files(&self.dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "frame directory unavailable");
                self.events
                    .push_back(SourceEvent::Failed(SourceFailure::Unavailable(e.to_string())));
                return Ok(());
            }
        };
        if self.files.is_empty() {
            self.events
                .push_back(SourceEvent::Failed(SourceFailure::Unavailable(format!(
                    "no frames found in '{}'",
                    self.dir.display()
                ))));
            return Ok(());
        }

        self.cursor = 0;
        match decode_frame(&self.files[0]) {
            Ok(first) => {
                self.size = first.size();
                if self.size.is_empty() {
                    self.events.push_back(SourceEvent::Failed(SourceFailure::Unavailable(
                        "first frame has zero width or height".to_string(),
                    )));
                    return Ok(());
                }
                tracing::info!(frames = self.files.len(), size = %self.size, "frame sequence ready");
                self.events.push_back(SourceEvent::Ready(self.size));
            }
            Err(e) => {
                self.events
                    .push_back(SourceEvent::Failed(SourceFailure::Unavailable(e.to_string())));
            }
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<SourceEvent> {
        self.events.pop_front()
    }

    fn size(&self) -> Size {
        self.size
    }

    fn current_frame(&mut self) -> Option<&Frame> {
        if let Err(e) = self.advance() {
            tracing::warn!(error = %e, "failed to decode frame; holding previous frame");
        }
        self.frame.as_ref()
    }
}

fn list_frame_files(dir: &Path) -> MirrorResult<Vec<PathBuf>> {
    use anyhow::Context as _;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("read frame directory '{}'", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("read entry in '{}'", dir.display()))?
            .path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_frame && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn decode_frame(path: &Path) -> MirrorResult<Frame> {
    let img = image::open(path)
        .map_err(|e| MirrorError::validation(format!("decode '{}': {e}", path.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Frame::new(w, h, img.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/source/sequence.rs"]
mod tests;
