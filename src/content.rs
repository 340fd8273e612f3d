use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One uploaded file, fully buffered.
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub name: String,
}

/// Where pushed content ends up.
///
/// The service only moves bytes. What "receiving" a URL or a clipboard text
/// means is the embedder's business; the default sink stores files on disk
/// and records the rest in the log.
#[async_trait]
pub trait ContentSink: Send + Sync {
    /// Write uploaded files beneath the destination directory. Returns the
    /// number of files written.
    async fn deliver_files(
        &self,
        destination: &str,
        files: Vec<UploadedFile>,
    ) -> Result<usize, ContentError>;

    async fn deliver_url(&self, url: &str) -> Result<(), ContentError>;

    async fn deliver_text(&self, text: &str) -> Result<(), ContentError>;
}

/// Sink that keeps everything on the local machine.
pub struct LocalSink;

#[async_trait]
impl ContentSink for LocalSink {
    async fn deliver_files(
        &self,
        destination: &str,
        files: Vec<UploadedFile>,
    ) -> Result<usize, ContentError> {
        tokio::fs::create_dir_all(destination).await?;

        let count = files.len();
        for file in files {
            // Uploads must never land outside the destination directory:
            // client-supplied names are reduced to their base name.
            let name = Path::new(&file.name)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            tokio::fs::write(Path::new(destination).join(&name), &file.data).await?;
            info!(file = %name, "Stored uploaded file");
        }
        Ok(count)
    }

    async fn deliver_url(&self, url: &str) -> Result<(), ContentError> {
        info!(url = %url, "Received URL push");
        Ok(())
    }

    async fn deliver_text(&self, text: &str) -> Result<(), ContentError> {
        info!(chars = text.chars().count(), "Received clipboard text");
        Ok(())
    }
}
