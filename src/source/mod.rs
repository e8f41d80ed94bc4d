//! Camera-side inputs.
//!
//! A [`FrameSource`] is started once and then reports readiness or failure through
//! [`FrameSource::poll_event`]. The app drains those events between ticks; it never polls
//! dimensions to discover readiness.

pub mod frame;
pub mod sequence;
pub mod synthetic;

use crate::foundation::core::Size;
use crate::foundation::error::MirrorResult;

pub use frame::Frame;
pub use sequence::ImageSequenceSource;
pub use synthetic::SyntheticSource;

/// Why a source could not deliver frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceFailure {
    /// The user or platform refused camera access.
    PermissionDenied,
    /// The device or input could not be opened.
    Unavailable(String),
}

/// Asynchronous notifications from a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceEvent {
    /// Metadata loaded; frames of `size` are available from now on.
    Ready(Size),
    Failed(SourceFailure),
}

/// Live frame producer.
pub trait FrameSource {
    /// Begin acquiring the device. Completion is reported through [`Self::poll_event`].
    fn start(&mut self) -> MirrorResult<()>;

    /// Next pending readiness or failure notification, if any.
    fn poll_event(&mut self) -> Option<SourceEvent>;

    /// Capture dimensions; zero until ready.
    fn size(&self) -> Size;

    /// Refresh and borrow the current frame. Called at most once per tick.
    fn current_frame(&mut self) -> Option<&Frame>;
}
