use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;

use crate::foundation::error::MirrorResult;

/// Receives artifacts the user chose to save.
pub trait DownloadSink {
    fn download(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> MirrorResult<()>;
}

/// Writes downloads into a directory, overwriting same-named files.
#[derive(Clone, Debug)]
pub struct FileDownloads {
    dir: PathBuf,
}

impl FileDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl DownloadSink for FileDownloads {
    fn download(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> MirrorResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create download directory '{}'", self.dir.display()))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), mime, bytes = bytes.len(), "artifact saved");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory. Clones share the list.
#[derive(Clone, Debug, Default)]
pub struct MemoryDownloads {
    saved: Rc<RefCell<Vec<SavedFile>>>,
}

impl MemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloads {
    fn download(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> MirrorResult<()> {
        self.saved.borrow_mut().push(SavedFile {
            filename: filename.to_owned(),
            mime: mime.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
