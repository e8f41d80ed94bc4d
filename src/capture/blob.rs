use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::error::{MirrorError, MirrorResult};

/// Opaque handle to a stored blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlobRef(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Temporary blob references, as handed to playback and download.
///
/// Every created reference must be released exactly once; releasing twice is an error.
pub trait BlobStore {
    fn create(&mut self, blob: Blob) -> BlobRef;

    fn get(&self, r: BlobRef) -> Option<&Blob>;

    fn release(&mut self, r: BlobRef) -> MirrorResult<()>;

    fn live_count(&self) -> usize;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlobStats {
    pub created: u64,
    pub released: u64,
}

/// In-memory blob store. Clones of [`MemoryBlobStore::stats_handle`] observe its counters.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<BlobRef, Blob>,
    next_id: u64,
    stats: Rc<RefCell<BlobStats>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats_handle(&self) -> Rc<RefCell<BlobStats>> {
        self.stats.clone()
    }
}

impl BlobStore for MemoryBlobStore {
    fn create(&mut self, blob: Blob) -> BlobRef {
        let r = BlobRef(self.next_id);
        self.next_id += 1;
        self.blobs.insert(r, blob);
        self.stats.borrow_mut().created += 1;
        r
    }

    fn get(&self, r: BlobRef) -> Option<&Blob> {
        self.blobs.get(&r)
    }

    fn release(&mut self, r: BlobRef) -> MirrorResult<()> {
        if self.blobs.remove(&r).is_none() {
            return Err(MirrorError::playback(format!(
                "blob {} released twice or never created",
                r.0
            )));
        }
        self.stats.borrow_mut().released += 1;
        Ok(())
    }

    fn live_count(&self) -> usize {
        self.blobs.len()
    }
}
