//! Session capture: recording state machine, playback ownership and the blob lifecycle.

pub mod blob;
pub mod clock;
pub mod playback;
pub mod recording;
pub mod timer;

pub use blob::{Blob, BlobRef, BlobStats, BlobStore, MemoryBlobStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use playback::{Artifact, ArtifactKind, ArtifactPayload, PlaybackManager};
pub use recording::{CaptureMode, Debounce, RecorderState, RecordingController, ToggleOutcome};
pub use timer::{RecTimer, format_elapsed};
