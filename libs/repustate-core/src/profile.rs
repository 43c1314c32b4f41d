//! The registered user id, kept as plain text in a dotfile.

use crate::{CoreError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file is missing or holds nothing but whitespace.
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let user = content.trim();
                Ok((!user.is_empty()).then(|| user.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    pub fn load_user(&self) -> Result<String> {
        self.load()?.ok_or(CoreError::NotRegistered)
    }

    pub fn store(&self, user: &str) -> Result<()> {
        std::fs::write(&self.path, user)?;
        info!("stored user profile at {:?}", self.path);
        Ok(())
    }
}
