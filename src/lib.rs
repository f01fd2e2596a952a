//! cartoonspoon - find anime and movies on Google Drive and download them
//! into a media-server friendly layout.
//!
//! The pipeline is split into small pieces that can be used on their own:
//! link discovery ([`discover_links`]), planning target paths ([`Planner`])
//! and sequential downloading with progress reporting ([`Sequencer`]).
//! Remote services sit behind the [`DriveService`], [`MetadataResolver`] and
//! [`LinkSearch`] traits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cartoonspoon::{
//!     DriveService, GoogleDrive, NoProgress, Planner, ProgressListener, Sequencer,
//!     TmdbResolver, url::DiscoveredLink,
//! };
//!
//! # async fn example() -> cartoonspoon::Result<()> {
//! let http = reqwest::Client::new();
//! let drive: Arc<dyn DriveService> = Arc::new(GoogleDrive::new(http.clone(), "access-token"));
//! let resolver = Arc::new(TmdbResolver::new(http, "tmdb-api-key"));
//!
//! let links = vec![DiscoveredLink::new(
//!     "Season 1",
//!     "https://drive.google.com/drive/folders/abc123",
//! )];
//! let plan = Planner::new(Arc::clone(&drive), resolver, "downloads")
//!     .plan(&links, "Frieren")
//!     .await?;
//!
//! let progress: Arc<dyn ProgressListener> = Arc::new(NoProgress);
//! let stats = Sequencer::new(drive).run(&plan.downloads, &progress).await?;
//! println!("Downloaded {} files", stats.files_downloaded);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod content;
pub mod download;
pub mod drive;
pub mod error;
pub mod fs;
pub mod metadata;
pub mod plan;
pub mod sanitize;
pub mod search;
pub mod stats;
pub mod url;

// Re-export main types for convenience
pub use config::AppConfig;
pub use content::{ContentKind, infer};
pub use download::{ChannelProgress, NoProgress, ProgressEvent, ProgressListener, Sequencer};
pub use drive::{DriveService, GoogleDrive, RemoteFile};
pub use error::{Error, Result};
pub use fs::{DryRunFileSystem, FileSystem, TokioFileSystem};
pub use metadata::{MetadataResolver, NoMetadata, ResolvedMetadata, TmdbResolver};
pub use plan::{Plan, PlannedDownload, Planner, SeasonContext};
pub use sanitize::sanitize_filename;
pub use search::{KayoSearch, LinkSearch, discover_links};
pub use stats::{FileStats, SessionStats};
pub use url::{DiscoveredLink, LinkReference, classify, parse_direct_input};
