//! Media attachment download

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::content::Attachment;
use crate::error::MediaError;

/// File name used for downloaded media
pub const DEFAULT_MEDIA_FILE_NAME: &str = "engage-image.png";

/// Downloads media for an attachment
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, MediaError>;
}

/// MediaFetcher over HTTP(S)
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, MediaError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MediaError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Request(e.to_string()))?;
        debug!(%url, len = bytes.len(), "Downloaded media");
        Ok(bytes.to_vec())
    }
}

/// Writes downloaded media to `<root>/<uuid>/<file name>`
#[derive(Debug, Clone)]
pub struct AttachmentWriter {
    root: PathBuf,
    file_name: String,
}

impl AttachmentWriter {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    /// Writer rooted at the system temp directory
    pub fn temp(file_name: impl Into<String>) -> Self {
        Self::new(std::env::temp_dir(), file_name)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` into a fresh directory and describe it as an attachment
    pub async fn write(&self, source: &Url, data: &[u8]) -> Result<Attachment, MediaError> {
        let dir = self.root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(MediaError::Write)?;

        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(MediaError::Write)?;

        Ok(Attachment {
            identifier: self.file_name.clone(),
            path,
            source: source.to_string(),
        })
    }
}

impl Default for AttachmentWriter {
    fn default() -> Self {
        Self::temp(DEFAULT_MEDIA_FILE_NAME)
    }
}
