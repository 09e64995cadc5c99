use async_trait::async_trait;
use serde::Serialize;

use super::OutboundError;

const UPLOADTHING_DELETE_URL: &str = "https://api.uploadthing.com/v6/deleteFiles";

/// The external host of uploaded images. Uploads go straight from the
/// browser to the host; the backend only ever deletes.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn delete_files(&self, keys: &[String]) -> Result<(), OutboundError>;
}

pub struct UploadThingStore {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesBody<'a> {
    file_keys: &'a [String],
}

impl UploadThingStore {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl FileStore for UploadThingStore {
    async fn delete_files(&self, keys: &[String]) -> Result<(), OutboundError> {
        if keys.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(UPLOADTHING_DELETE_URL)
            .header("x-uploadthing-api-key", &self.api_key)
            .json(&DeleteFilesBody { file_keys: keys })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutboundError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(count = keys.len(), "deleted files from UploadThing");
        Ok(())
    }
}

pub struct LogFileStore;

#[async_trait]
impl FileStore for LogFileStore {
    async fn delete_files(&self, keys: &[String]) -> Result<(), OutboundError> {
        if !keys.is_empty() {
            tracing::info!(?keys, "file deletion skipped (no file store configured)");
        }
        Ok(())
    }
}
