use std::collections::VecDeque;

use crate::foundation::core::Size;
use crate::foundation::error::MirrorResult;
use crate::source::{Frame, FrameSource, SourceEvent, SourceFailure};

const BACKDROP: [u8; 4] = [12, 12, 16, 255];
const BLOB: [u8; 4] = [230, 200, 180, 255];

/// Deterministic stand-in camera: a bright square sweeping across a dark backdrop.
///
/// Useful for demos and tests where no real device is present. `denied()` builds a source whose
/// start always ends in [`SourceFailure::PermissionDenied`].
pub struct SyntheticSource {
    size: Size,
    blob_size: u32,
    speed_px: u32,
    deny: bool,
    started: bool,
    tick: u64,
    frame: Frame,
    events: VecDeque<SourceEvent>,
}

impl SyntheticSource {
    pub fn new(size: Size) -> Self {
        let blob_size = (size.width.min(size.height) / 4).max(1);
        Self {
            size,
            blob_size,
            speed_px: (size.width / 32).max(1),
            deny: false,
            started: false,
            tick: 0,
            frame: Frame::blank(size),
            events: VecDeque::new(),
        }
    }

    pub fn denied(size: Size) -> Self {
        Self {
            deny: true,
            ..Self::new(size)
        }
    }

    pub fn with_speed(mut self, speed_px: u32) -> Self {
        self.speed_px = speed_px;
        self
    }

    fn paint(&mut self) {
        let w = self.size.width;
        let h = self.size.height;
        let travel = w.saturating_sub(self.blob_size).max(1) as u64;
        let x0 = ((self.tick * u64::from(self.speed_px)) % travel) as u32;
        let y0 = h.saturating_sub(self.blob_size) / 2;

        for px in self.frame.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&BACKDROP);
        }
        for y in y0..(y0 + self.blob_size).min(h) {
            for x in x0..(x0 + self.blob_size).min(w) {
                self.frame.set_pixel(x, y, BLOB);
            }
        }
    }
}

impl FrameSource for SyntheticSource {
    fn start(&mut self) -> MirrorResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        if self.deny {
            self.events
                .push_back(SourceEvent::Failed(SourceFailure::PermissionDenied));
        } else if self.size.is_empty() {
            self.events.push_back(SourceEvent::Failed(SourceFailure::Unavailable(
                "synthetic source has zero width or height".to_string(),
            )));
        } else {
            self.events.push_back(SourceEvent::Ready(self.size));
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<SourceEvent> {
        self.events.pop_front()
    }

    fn size(&self) -> Size {
        if self.started && !self.deny {
            self.size
        } else {
            Size::default()
        }
    }

    fn current_frame(&mut self) -> Option<&Frame> {
        if !self.started || self.deny || self.size.is_empty() {
            return None;
        }
        self.paint();
        self.tick += 1;
        Some(&self.frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/synthetic.rs"]
mod tests;
