use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::encode::host::{EncoderConfig, EncoderEvent, EncoderHost, EncoderSession};
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::render::surface::FrameRGBA;

#[derive(Debug, Default)]
struct MemoryEncoderState {
    supported: Vec<String>,
    script: Option<Vec<Vec<u8>>>,
    bytes_per_frame: usize,
    fail_create: bool,
    configs: Vec<EncoderConfig>,
    frames_pushed: u64,
    stops: u64,
}

/// In-memory encoder host for tests and dry runs.
///
/// By default every pushed frame yields one chunk of `bytes_per_frame` bytes. With a script set,
/// pushed frames yield nothing and the scripted chunks are delivered on stop, in order.
/// Clones share state, so a test can keep a handle after boxing the host into an app.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEncoderHost {
    state: Rc<RefCell<MemoryEncoderState>>,
}

impl InMemoryEncoderHost {
    pub fn new<S: Into<String>>(supported: impl IntoIterator<Item = S>) -> Self {
        let host = Self::default();
        {
            let mut st = host.state.borrow_mut();
            st.supported = supported.into_iter().map(Into::into).collect();
            st.bytes_per_frame = 64;
        }
        host
    }

    /// Host that supports nothing, forcing still capture.
    pub fn unsupported() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn with_script(self, chunks: Vec<Vec<u8>>) -> Self {
        self.state.borrow_mut().script = Some(chunks);
        self
    }

    pub fn with_bytes_per_frame(self, bytes: usize) -> Self {
        self.state.borrow_mut().bytes_per_frame = bytes;
        self
    }

    /// Make `create_session` fail, as a broken platform encoder would.
    pub fn failing(self) -> Self {
        self.state.borrow_mut().fail_create = true;
        self
    }

    pub fn sessions_created(&self) -> usize {
        self.state.borrow().configs.len()
    }

    pub fn last_config(&self) -> Option<EncoderConfig> {
        self.state.borrow().configs.last().cloned()
    }

    pub fn frames_pushed(&self) -> u64 {
        self.state.borrow().frames_pushed
    }

    pub fn stops(&self) -> u64 {
        self.state.borrow().stops
    }
}

impl EncoderHost for InMemoryEncoderHost {
    fn is_format_supported(&self, format: &str) -> bool {
        self.state.borrow().supported.iter().any(|s| s == format)
    }

    fn create_session(&mut self, cfg: EncoderConfig) -> MirrorResult<Box<dyn EncoderSession>> {
        let mut st = self.state.borrow_mut();
        if st.fail_create {
            return Err(MirrorError::encode("in-memory encoder configured to fail"));
        }
        st.configs.push(cfg);
        Ok(Box::new(InMemoryEncoderSession {
            state: self.state.clone(),
            events: VecDeque::new(),
            started: false,
            stopped: false,
        }))
    }
}

struct InMemoryEncoderSession {
    state: Rc<RefCell<MemoryEncoderState>>,
    events: VecDeque<EncoderEvent>,
    started: bool,
    stopped: bool,
}

impl EncoderSession for InMemoryEncoderSession {
    fn start(&mut self) -> MirrorResult<()> {
        if self.started {
            return Err(MirrorError::encode("encoder session already started"));
        }
        self.started = true;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> MirrorResult<()> {
        if !self.started || self.stopped {
            return Err(MirrorError::encode("encoder session is not running"));
        }
        let mut st = self.state.borrow_mut();
        if let Some(cfg) = st.configs.last()
            && cfg.size != frame.size()
        {
            return Err(MirrorError::encode(format!(
                "frame size mismatch: got {}, expected {}",
                frame.size(),
                cfg.size
            )));
        }
        st.frames_pushed += 1;
        if st.script.is_none() {
            self.events
                .push_back(EncoderEvent::Chunk(vec![0u8; st.bytes_per_frame]));
        }
        Ok(())
    }

    fn stop(&mut self) -> MirrorResult<()> {
        if !self.started || self.stopped {
            return Err(MirrorError::encode("encoder session is not running"));
        }
        self.stopped = true;
        let mut st = self.state.borrow_mut();
        st.stops += 1;
        if let Some(script) = st.script.as_ref() {
            self.events
                .extend(script.iter().cloned().map(EncoderEvent::Chunk));
        }
        self.events.push_back(EncoderEvent::Stopped);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<EncoderEvent> {
        self.events.pop_front()
    }
}
