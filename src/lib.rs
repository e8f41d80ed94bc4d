//! motion-mirror renders a live "motion trail" effect from a camera feed and records or
//! snapshots the result.
//!
//! Per tick a [`FrameSource`] frame is diffed against the previous one on a sampled grid
//! ([`MotionField`]); moving cells deposit short noise-steered strokes into a decaying
//! [`TrailBuffer`], which the [`Compositor`] fits, mirrors and draws to the output surface.
//! [`RecordingController`] taps that surface to produce a video or still [`Artifact`], and
//! [`PlaybackManager`] presents it and owns its blob reference until restart.
//!
//! [`MotionMirror`] wires it all into one single-threaded event queue.
#![forbid(unsafe_code)]

pub mod foundation;

pub mod app;
pub mod capture;
pub mod config;
pub mod encode;
pub mod host;
pub mod motion;
pub mod render;
pub mod source;

pub use crate::foundation::core::{Fps, Size, TickIndex};
pub use crate::foundation::error::{MirrorError, MirrorResult};

pub use crate::app::{AppEvent, Hosts, MotionMirror, SessionPhase};
pub use crate::capture::{
    Artifact, ArtifactKind, ArtifactPayload, BlobStore, Clock, ManualClock, MemoryBlobStore,
    PlaybackManager, RecorderState, RecordingController, SystemClock, ToggleOutcome,
};
pub use crate::config::MirrorConfig;
pub use crate::encode::{
    EncoderHost, FfmpegEncoderHost, InMemoryEncoderHost, VideoFormat, negotiate,
};
pub use crate::host::{
    Control, DownloadSink, FileDownloads, FlagStore, JsonFlagStore, LogUi, MemoryDownloads,
    MemoryFlagStore, RecordingUi, Ui, UiCall,
};
pub use crate::motion::{DeviceClass, MotionField, MotionSample, ScalingPolicy, TrailBuffer};
pub use crate::render::{Compositor, FitMode, FrameRGBA};
pub use crate::source::{Frame, FrameSource, ImageSequenceSource, SyntheticSource};
