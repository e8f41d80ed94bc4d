//! Collaborators outside the rendering core: presentation, persisted flags and downloads.

pub mod download;
pub mod flags;
pub mod ui;

pub use download::{DownloadSink, FileDownloads, MemoryDownloads};
pub use flags::{FlagStore, JsonFlagStore, MemoryFlagStore, ONBOARDING_FLAG};
pub use ui::{Control, LogUi, PlaybackView, RecordingUi, Ui, UiCall};
