//! JSON documents on disk

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::BotError;

/// A JSON file at a fixed path
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the file, `None` when it does not exist
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<Option<T>, BotError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Pretty-print `value` into the file
    ///
    /// The document is written next to the target and renamed over it, so a
    /// reader never observes a half-written report. Parent directories are
    /// created as needed.
    pub async fn write_json<T: Serialize>(&self, value: &T) -> Result<(), BotError> {
        let mut contents = serde_json::to_vec_pretty(value)?;
        contents.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let staging = self.path.with_extension("json.partial");
        let mut file = fs::File::create(&staging).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}
