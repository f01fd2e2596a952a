//! Google Drive v3 REST client.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use super::{DriveService, ProgressFn, RemoteFile, percent_of};
use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};

const BASE_URL: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    name: String,
}

/// Authorized-user token file as written by Google's OAuth helpers.
#[derive(Debug, Deserialize)]
struct TokenFile {
    token: Option<String>,
    access_token: Option<String>,
}

/// Reads an access token from a Google authorized-user token JSON file.
///
/// Accepts either a `token` or an `access_token` field.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or has no token.
pub fn load_access_token(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: TokenFile = serde_json::from_str(&raw)?;
    parsed
        .token
        .or(parsed.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Config(format!("no access token in {}", path.display())))
}

/// Google Drive client authenticated with a bearer access token.
///
/// The client is created once per run and shared read-only between the
/// planner and the sequencer.
pub struct GoogleDrive<F: FileSystem = TokioFileSystem> {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    cleanup_on_error: bool,
    fs: F,
}

impl GoogleDrive<TokioFileSystem> {
    /// Creates a client writing through `tokio::fs`.
    #[must_use]
    pub fn new(client: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self::with_fs(client, access_token, TokioFileSystem)
    }
}

impl<F: FileSystem> GoogleDrive<F> {
    /// Creates a client with a custom file system implementation.
    #[must_use]
    pub fn with_fs(client: reqwest::Client, access_token: impl Into<String>, fs: F) -> Self {
        Self {
            client,
            access_token: access_token.into(),
            base_url: BASE_URL.to_string(),
            cleanup_on_error: true,
            fs,
        }
    }

    /// Points the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets whether a partially written file is removed when a fetch fails.
    #[must_use]
    pub const fn with_cleanup_on_error(mut self, cleanup: bool) -> Self {
        self.cleanup_on_error = cleanup;
        self
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::Drive {
            status: status.as_u16(),
            message,
        })
    }

    /// Streams the response body into `file`, reporting progress.
    async fn write_body(
        response: reqwest::Response,
        file: &mut tokio::fs::File,
        on_progress: ProgressFn<'_>,
    ) -> Result<u64> {
        let total = response.content_length();
        let mut written: u64 = 0;
        let mut reported: Option<u8> = None;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;

            if let Some(total) = total {
                let pct = percent_of(written, total);
                if reported.is_none_or(|last| pct > last) {
                    on_progress(pct);
                    reported = Some(pct);
                }
            }
        }
        file.flush().await?;

        if reported != Some(100) {
            on_progress(100);
        }
        Ok(written)
    }
}

#[async_trait]
impl<F: FileSystem> DriveService for GoogleDrive<F> {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        let url = format!("{}/files", self.base_url);
        let query = format!("'{folder_id}' in parents and trashed=false");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("q", query.as_str()),
                    ("spaces", "drive"),
                    ("fields", "nextPageToken, files(id, name)"),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = Self::check(request.send().await?).await?;
            let page: FileListPage = response.json().await?;
            files.extend(
                page.files
                    .into_iter()
                    .map(|entry| RemoteFile::new(entry.id, entry.name)),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!("Listed {} file(s) in folder {folder_id}", files.len());
        Ok(files)
    }

    async fn fetch_file(
        &self,
        file_id: &str,
        target_name: &str,
        target_dir: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<u64> {
        self.fs.create_dir_all(target_dir).await?;
        let path = target_dir.join(target_name);

        let url = format!("{}/files/{file_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut file = self.fs.create_file(&path).await?;
        match Self::write_body(response, &mut file, on_progress).await {
            Ok(written) => {
                log::debug!("Wrote {written} bytes to {}", path.display());
                Ok(written)
            }
            Err(e) => {
                let _ = file.flush().await;
                drop(file);
                if self.cleanup_on_error {
                    let _ = self.fs.remove_file(&path).await;
                }
                Err(e)
            }
        }
    }
}
