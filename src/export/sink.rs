use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::info;

/// Destination for a finished export: a browser download, a directory, an
/// object store.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn save(&self, bytes: &[u8], filename: &str, mime_type: &str) -> io::Result<()>;
}

/// Writes exports as files under one directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `filename` would be written. Names that would escape the
    /// directory are rejected.
    pub fn path_for(&self, filename: &str) -> io::Result<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid export filename: {filename:?}"),
            ));
        }
        Ok(self.dir.join(filename))
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn save(&self, bytes: &[u8], filename: &str, mime_type: &str) -> io::Result<()> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        info!(path = %path.display(), mime_type, bytes = bytes.len(), "Export written");
        Ok(())
    }
}
