use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;

use crate::foundation::error::{MirrorError, MirrorResult};

/// Persisted key marking that the onboarding panel was dismissed once.
pub const ONBOARDING_FLAG: &str = "motionMirrorOnboarded";

/// Persisted boolean flags.
pub trait FlagStore {
    fn get(&self, key: &str) -> MirrorResult<bool>;

    fn set(&mut self, key: &str, value: bool) -> MirrorResult<()>;
}

/// Flags kept in memory. Clones share the map.
#[derive(Clone, Debug, Default)]
pub struct MemoryFlagStore {
    flags: Rc<RefCell<BTreeMap<String, bool>>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> MirrorResult<bool> {
        Ok(self.flags.borrow().get(key).copied().unwrap_or(false))
    }

    fn set(&mut self, key: &str, value: bool) -> MirrorResult<()> {
        self.flags.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }
}

/// Flags persisted as a JSON object in one file. A missing file reads as all-unset.
#[derive(Clone, Debug)]
pub struct JsonFlagStore {
    path: PathBuf,
}

impl JsonFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> MirrorResult<BTreeMap<String, bool>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read flag file '{}'", self.path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            MirrorError::serde(format!("flag file '{}': {e}", self.path.display()))
        })
    }
}

impl FlagStore for JsonFlagStore {
    fn get(&self, key: &str) -> MirrorResult<bool> {
        Ok(self.load()?.get(key).copied().unwrap_or(false))
    }

    fn set(&mut self, key: &str, value: bool) -> MirrorResult<()> {
        let mut flags = self.load()?;
        flags.insert(key.to_owned(), value);
        let text = serde_json::to_string_pretty(&flags)
            .map_err(|e| MirrorError::serde(e.to_string()))?;
        crate::encode::ffmpeg::ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("write flag file '{}'", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/flags.rs"]
mod tests;
