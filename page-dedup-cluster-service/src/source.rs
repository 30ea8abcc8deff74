//! Enumeration and retrieval of raw product pages.

use crate::error::{DocumentError, PipelineError};
use async_trait::async_trait;
use page_dedup_service::dto::DataSource;
use page_dedup_service::util::{download_object_from_s3, list_keys_in_s3};
use rusoto_s3::S3Client;
use std::path::PathBuf;

/// A storage location holding one raw page per entry.
///
/// Failing to enumerate is fatal for the run; failing to fetch a single page
/// only excludes that page.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, PipelineError>;

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, DocumentError>;
}

pub fn from_data_source(data: &DataSource, client: &S3Client) -> Box<dyn DocumentSource> {
    match data {
        DataSource::S3 { bucket, prefix } => Box::new(S3Source {
            client: client.clone(),
            bucket: bucket.clone(),
            prefix: prefix.clone(),
        }),
        DataSource::Directory { path } => Box::new(DirectorySource::new(path)),
    }
}

pub struct S3Source {
    client: S3Client,
    bucket: String,
    prefix: String,
}

#[async_trait]
impl DocumentSource for S3Source {
    async fn list(&self) -> Result<Vec<String>, PipelineError> {
        list_keys_in_s3(&self.client, self.bucket.clone(), self.prefix.clone())
            .await
            .map_err(|err| PipelineError::Io(err.msg))
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, DocumentError> {
        download_object_from_s3(&self.client, self.bucket.clone(), id.to_string())
            .await
            .map_err(|err| DocumentError::Extraction(err.msg))
    }
}

/// Regular files of a local directory, listed by file name in sorted order.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn list(&self) -> Result<Vec<String>, PipelineError> {
        let io = |err: std::io::Error| {
            PipelineError::Io(format!("{}: {err}", self.root.display()))
        };
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(io)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io)? {
            if entry.file_type().await.map_err(io)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, DocumentError> {
        tokio::fs::read(self.root.join(id))
            .await
            .map_err(|err| DocumentError::Extraction(format!("{id}: {err}")))
    }
}
