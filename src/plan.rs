//! Target path and file name planning.
//!
//! Turns discovered links into an ordered list of [`PlannedDownload`]s:
//! movies land flat in `{title} ({year}) [tmdbid-{id}]`, series are split
//! into `Season NN` directories with `{title} SNNEEE{ext}` file names.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::content::{self, ContentKind};
use crate::drive::{DriveService, RemoteFile};
use crate::error::Result;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::metadata::MetadataResolver;
use crate::sanitize::sanitize_filename;
use crate::url::{DiscoveredLink, LinkReference, classify};

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Season\s*(\d+)").expect("valid regex"));

/// Extension used for single-file series links whose label has no extension.
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// One file to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDownload {
    /// Storage-side id of the file.
    pub source_file_id: String,
    /// Local file name.
    pub target_file_name: String,
    /// Directory the file is written into.
    pub target_directory: PathBuf,
}

impl PlannedDownload {
    /// Full local path of the downloaded file.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        self.target_directory.join(&self.target_file_name)
    }
}

/// Season number and running episode counter for one series link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonContext {
    /// Season number, at least 1.
    pub season_number: u32,
    /// Number the next episode will get, starting at 1.
    pub episode_counter: u32,
}

impl SeasonContext {
    /// Starts a season at episode 1.
    #[must_use]
    pub const fn new(season_number: u32) -> Self {
        Self {
            season_number,
            episode_counter: 1,
        }
    }

    /// Parses "Season N" (any case, optional whitespace) from a label.
    /// Falls back to season 1.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let season = SEASON_RE
            .captures(label)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1);
        Self::new(season)
    }

    /// Directory name for this season, e.g. `Season 01`.
    #[must_use]
    pub fn directory_name(&self) -> String {
        format!("Season {:02}", self.season_number)
    }

    /// Returns the next episode file name and advances the counter.
    pub fn next_file_name(&mut self, safe_title: &str, ext: &str) -> String {
        let name = format!(
            "{safe_title} S{:02}E{:02}{ext}",
            self.season_number, self.episode_counter
        );
        self.episode_counter += 1;
        name
    }
}

/// Extension of `name` including the leading dot, or an empty string.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Extension for a single-file series link, taken from its label.
fn label_extension(display_name: &str) -> String {
    if display_name.contains('.') {
        extension_of(display_name)
    } else {
        DEFAULT_EXTENSION.to_string()
    }
}

/// Returns true if a remote name would not stay inside its target directory.
fn leaves_directory(name: &str) -> bool {
    name.contains(['/', '\\']) || name == ".." || name == "."
}

/// Sorts listing entries by name so episode numbers follow name order.
fn sorted_by_name(mut files: Vec<RemoteFile>) -> Vec<RemoteFile> {
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// Outcome of planning a batch of links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Files to fetch, in download order.
    pub downloads: Vec<PlannedDownload>,
    /// Links that were not recognized as a Drive folder or file.
    pub skipped: Vec<DiscoveredLink>,
}

impl Plan {
    /// Returns true if there is nothing to download.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }
}

/// Computes target paths for discovered links and creates their directories.
pub struct Planner<F: FileSystem = TokioFileSystem> {
    drive: Arc<dyn DriveService>,
    resolver: Arc<dyn MetadataResolver>,
    download_root: PathBuf,
    fs: F,
}

impl Planner<TokioFileSystem> {
    /// Creates a planner writing directories through `tokio::fs`.
    #[must_use]
    pub fn new(
        drive: Arc<dyn DriveService>,
        resolver: Arc<dyn MetadataResolver>,
        download_root: impl Into<PathBuf>,
    ) -> Self {
        Self::with_fs(drive, resolver, download_root, TokioFileSystem)
    }
}

impl<F: FileSystem> Planner<F> {
    /// Creates a planner with a custom file system implementation.
    #[must_use]
    pub fn with_fs(
        drive: Arc<dyn DriveService>,
        resolver: Arc<dyn MetadataResolver>,
        download_root: impl Into<PathBuf>,
        fs: F,
    ) -> Self {
        Self {
            drive,
            resolver,
            download_root: download_root.into(),
            fs,
        }
    }

    /// Plans downloads for `links` in order.
    ///
    /// Metadata is resolved once per link using `user_query` when it is
    /// non-empty, otherwise the link's label. Unrecognized links are skipped
    /// and reported in [`Plan::skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error if a folder listing fails or a directory cannot be
    /// created.
    pub async fn plan(&self, links: &[DiscoveredLink], user_query: &str) -> Result<Plan> {
        let mut plan = Plan::default();

        for link in links {
            let reference = classify(&link.url);
            if reference == LinkReference::Unrecognized {
                log::warn!(
                    "Skipping unrecognized link '{}': {}",
                    link.display_name,
                    link.url
                );
                plan.skipped.push(link.clone());
                continue;
            }

            let query = content::effective_name(user_query, &link.display_name);
            let kind = content::infer(query);
            let meta = self.resolver.resolve(query, kind).await;
            if meta.is_unresolved() {
                log::warn!("No catalog match for '{query}'; using placeholder metadata");
            }
            let safe_title = sanitize_filename(&meta.title);
            let title_dir = self
                .download_root
                .join(meta.directory_name(&safe_title));

            let planned = match kind {
                ContentKind::Movie => self.plan_movie(link, &reference, title_dir).await?,
                ContentKind::Series => {
                    self.plan_series(link, &reference, &safe_title, &title_dir)
                        .await?
                }
            };
            log::info!(
                "Planned {} file(s) for '{}'",
                planned.len(),
                link.display_name
            );
            plan.downloads.extend(planned);
        }

        Ok(plan)
    }

    async fn plan_movie(
        &self,
        link: &DiscoveredLink,
        reference: &LinkReference,
        dir: PathBuf,
    ) -> Result<Vec<PlannedDownload>> {
        self.fs.create_dir_all(&dir).await?;

        let planned = match reference {
            LinkReference::Folder { id } => sorted_by_name(self.drive.list_folder(id).await?)
                .into_iter()
                .map(|file| {
                    if leaves_directory(&file.name) {
                        log::warn!(
                            "Remote name '{}' is not a plain file name; it may be written outside {}",
                            file.name,
                            dir.display()
                        );
                    }
                    PlannedDownload {
                        source_file_id: file.id,
                        target_file_name: file.name,
                        target_directory: dir.clone(),
                    }
                })
                .collect(),
            LinkReference::File { id } => vec![PlannedDownload {
                source_file_id: id.clone(),
                target_file_name: link.display_name.clone(),
                target_directory: dir,
            }],
            LinkReference::Unrecognized => Vec::new(),
        };
        Ok(planned)
    }

    async fn plan_series(
        &self,
        link: &DiscoveredLink,
        reference: &LinkReference,
        safe_title: &str,
        title_dir: &Path,
    ) -> Result<Vec<PlannedDownload>> {
        let mut season = SeasonContext::from_label(&link.display_name);
        let dir = title_dir.join(season.directory_name());
        self.fs.create_dir_all(&dir).await?;

        let planned = match reference {
            LinkReference::Folder { id } => sorted_by_name(self.drive.list_folder(id).await?)
                .into_iter()
                .map(|file| PlannedDownload {
                    target_file_name: season.next_file_name(safe_title, &extension_of(&file.name)),
                    source_file_id: file.id,
                    target_directory: dir.clone(),
                })
                .collect(),
            LinkReference::File { id } => vec![PlannedDownload {
                source_file_id: id.clone(),
                target_file_name: season
                    .next_file_name(safe_title, &label_extension(&link.display_name)),
                target_directory: dir,
            }],
            LinkReference::Unrecognized => Vec::new(),
        };
        Ok(planned)
    }
}
