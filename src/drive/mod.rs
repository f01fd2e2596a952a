//! Remote storage access.
//!
//! The planner lists folders and the sequencer fetches files through the
//! [`DriveService`] trait. [`GoogleDrive`] implements it over the Drive v3
//! REST API; tests substitute in-memory implementations.

mod google;

pub use google::{GoogleDrive, load_access_token};

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// An entry inside a remote folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Storage-side file id.
    pub id: String,
    /// File name as shown in the folder.
    pub name: String,
}

impl RemoteFile {
    /// Creates a listing entry.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Per-chunk progress callback receiving a 0–100 percentage.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Listing and download operations against a remote store.
#[async_trait]
pub trait DriveService: Send + Sync {
    /// Lists the files directly inside a folder, in the order the service
    /// returns them.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>>;

    /// Downloads a file to `target_dir/target_name`, creating `target_dir`
    /// if needed.
    ///
    /// `on_progress` is called zero or more times with non-decreasing
    /// percentages. Returns the number of bytes written.
    async fn fetch_file(
        &self,
        file_id: &str,
        target_name: &str,
        target_dir: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<u64>;
}

/// Converts a byte count into a whole percentage of `total`, capped at 100.
#[must_use]
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = u128::from(done) * 100 / u128::from(total);
    u8::try_from(pct.min(100)).unwrap_or(100)
}
