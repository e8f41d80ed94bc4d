use crate::capture::blob::{BlobRef, BlobStore};
use crate::encode::host::VideoFormat;
use crate::encode::still::PNG_MIME;
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::host::download::DownloadSink;
use crate::host::ui::{
    ANNOUNCE_DOWNLOAD_STARTED, ANNOUNCE_IMAGE_CAPTURED, ANNOUNCE_RECORDING_READY, Control,
    LABEL_DOWNLOAD_IMAGE, LABEL_DOWNLOAD_RECORDING, PlaybackView, Ui,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Video,
    Image,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactPayload {
    /// Temporary reference owned by the blob store; must be released.
    Blob(BlobRef),
    /// Self-contained bytes with nothing to release.
    Inline(Vec<u8>),
}

/// The exported result of one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub mime: String,
    pub payload: ArtifactPayload,
    pub filename: String,
}

impl Artifact {
    pub fn video(format: &VideoFormat, blob: BlobRef) -> Self {
        Self {
            kind: ArtifactKind::Video,
            mime: format.id().to_owned(),
            payload: ArtifactPayload::Blob(blob),
            filename: format!("motion-recording.{}", format.extension()),
        }
    }

    pub fn image(png: Vec<u8>) -> Self {
        Self {
            kind: ArtifactKind::Image,
            mime: PNG_MIME.to_owned(),
            payload: ArtifactPayload::Inline(png),
            filename: "motion-image.png".to_owned(),
        }
    }
}

/// Shows the finished artifact in place of the live surface and owns its blob reference.
pub struct PlaybackManager {
    blobs: Box<dyn BlobStore>,
    current: Option<Artifact>,
}

impl PlaybackManager {
    pub fn new(blobs: Box<dyn BlobStore>) -> Self {
        Self {
            blobs,
            current: None,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.current.as_ref()
    }

    pub fn has_artifact(&self) -> bool {
        self.current.is_some()
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub fn blobs_mut(&mut self) -> &mut dyn BlobStore {
        self.blobs.as_mut()
    }

    /// Bytes behind the held artifact.
    pub fn artifact_bytes(&self) -> Option<&[u8]> {
        let artifact = self.current.as_ref()?;
        match &artifact.payload {
            ArtifactPayload::Inline(bytes) => Some(bytes),
            ArtifactPayload::Blob(r) => self.blobs.get(*r).map(|b| b.bytes.as_slice()),
        }
    }

    #[tracing::instrument(skip_all, fields(kind = ?artifact.kind, filename = %artifact.filename))]
    pub fn present(&mut self, artifact: Artifact, ui: &mut dyn Ui) -> MirrorResult<()> {
        if self.current.is_some() {
            return Err(MirrorError::playback(
                "an artifact is already presented; restart first",
            ));
        }
        let (label, announcement, looping) = match artifact.kind {
            ArtifactKind::Video => (LABEL_DOWNLOAD_RECORDING, ANNOUNCE_RECORDING_READY, true),
            ArtifactKind::Image => (LABEL_DOWNLOAD_IMAGE, ANNOUNCE_IMAGE_CAPTURED, false),
        };
        let kind = artifact.kind;
        let mime = artifact.mime.clone();
        self.current = Some(artifact);
        let byte_len = self.artifact_bytes().map_or(0, <[u8]>::len);

        ui.set_live_surface_visible(false);
        ui.show_playback(PlaybackView {
            kind,
            mime,
            byte_len,
            looping,
        });
        ui.set_control_visible(Control::Toggle, false);
        ui.set_control_label(Control::Save, label);
        ui.set_control_visible(Control::Save, true);
        ui.set_control_visible(Control::Restart, true);
        ui.announce(announcement);
        tracing::info!(bytes = byte_len, "artifact presented");
        Ok(())
    }

    /// Hand the artifact to `downloads`. The reference stays held until restart.
    pub fn save(&self, downloads: &mut dyn DownloadSink, ui: &mut dyn Ui) -> MirrorResult<bool> {
        let Some(artifact) = self.current.as_ref() else {
            return Ok(false);
        };
        let bytes = self.artifact_bytes().ok_or_else(|| {
            MirrorError::playback(format!("blob for '{}' is no longer live", artifact.filename))
        })?;
        downloads.download(&artifact.filename, &artifact.mime, bytes)?;
        ui.announce(ANNOUNCE_DOWNLOAD_STARTED);
        Ok(true)
    }

    /// Release any held blob, tear down playback and restore live-view affordances.
    ///
    /// Returns whether an artifact was held.
    pub fn restart(&mut self, ui: &mut dyn Ui) -> MirrorResult<bool> {
        let held = self.current.take();
        let had = held.is_some();
        if let Some(artifact) = held {
            if let ArtifactPayload::Blob(r) = artifact.payload {
                self.blobs.release(r)?;
            }
            ui.remove_playback();
        }
        ui.set_control_visible(Control::Save, false);
        ui.set_control_visible(Control::Restart, false);
        ui.set_control_visible(Control::Toggle, true);
        ui.set_live_surface_visible(true);
        Ok(had)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/playback.rs"]
mod tests;
