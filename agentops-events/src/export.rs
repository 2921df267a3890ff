//! Exporters that write recorded events to external sinks.

use std::ffi::OsString;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::EventResult;
use crate::record::EventRecord;

/// Trait implemented by event sinks.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Writes the supplied events, in order, to the sink.
    async fn export(&self, events: &[EventRecord]) -> EventResult<()>;
}

/// Writes events as a single pretty-printed JSON array.
///
/// The array is written to a sibling temporary file that is renamed over the
/// target once fully flushed, so the target either keeps its previous content
/// or holds the complete new export.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    /// Creates an exporter targeting `path`. Existing files are overwritten.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> EventResult<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            IoError::new(ErrorKind::InvalidInput, "export path has no file name")
        })?;
        let mut temp_name = OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        Ok(self.path.with_file_name(temp_name))
    }
}

async fn write_synced(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(payload).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl Exporter for JsonFileExporter {
    async fn export(&self, events: &[EventRecord]) -> EventResult<()> {
        let payload = serde_json::to_vec_pretty(events)?;
        let temp = self.temp_path()?;

        let written = match write_synced(&temp, &payload).await {
            Ok(()) => fs::rename(&temp, &self.path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp.display(), ?cleanup, "failed to remove partial export");
                }
            }
            return Err(err.into());
        }

        info!(
            path = %self.path.display(),
            events = events.len(),
            "events exported"
        );
        Ok(())
    }
}
