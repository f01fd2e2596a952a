//! Sequential download of a planned batch with progress reporting.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::drive::{DriveService, percent_of};
use crate::error::{Error, Result};
use crate::plan::PlannedDownload;
use crate::stats::{FileStats, SessionStats, SessionStatsBuilder};

/// Text emitted when there is nothing to download.
pub const NO_FILES_MESSAGE: &str = "No files to download.";

/// Trait for receiving download progress updates.
///
/// Implement this trait to receive callbacks during a run. All methods have
/// default no-op implementations for convenience.
pub trait ProgressListener: Send + Sync {
    /// A line for the user-facing log.
    fn on_message(&self, _text: &str) {}

    /// Called before a file download starts.
    fn on_file_start(&self, _name: &str) {}

    /// Progress of the current file, 0–100, non-decreasing within a file.
    fn on_file_progress(&self, _percent: u8) {}

    /// Called when a file download completes successfully.
    fn on_file_complete(&self, _name: &str, _stats: &FileStats) {}

    /// Share of the batch completed so far, 0–100.
    fn on_overall_progress(&self, _percent: u8) {}

    /// Called when a file download fails. The run stops afterwards.
    fn on_error(&self, _name: &str, _error: &str) {}

    /// Called once after the whole batch has been processed.
    fn on_finished(&self) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {}

/// Progress callbacks as plain values, for consumers on another task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// See [`ProgressListener::on_message`].
    Message(String),
    /// See [`ProgressListener::on_file_start`].
    FileStarted(String),
    /// See [`ProgressListener::on_file_progress`].
    FileProgress(u8),
    /// See [`ProgressListener::on_file_complete`]; carries bytes written.
    FileCompleted {
        /// Target file name.
        name: String,
        /// Bytes written.
        bytes: u64,
    },
    /// See [`ProgressListener::on_overall_progress`].
    OverallProgress(u8),
    /// See [`ProgressListener::on_error`].
    Failed {
        /// Target file name.
        name: String,
        /// Error description.
        error: String,
    },
    /// See [`ProgressListener::on_finished`].
    Finished,
}

/// Forwards every callback as a [`ProgressEvent`] over a channel.
///
/// Send errors are ignored: a dropped receiver just stops observing.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

impl ProgressListener for ChannelProgress {
    fn on_message(&self, text: &str) {
        self.send(ProgressEvent::Message(text.to_string()));
    }

    fn on_file_start(&self, name: &str) {
        self.send(ProgressEvent::FileStarted(name.to_string()));
    }

    fn on_file_progress(&self, percent: u8) {
        self.send(ProgressEvent::FileProgress(percent));
    }

    fn on_file_complete(&self, name: &str, stats: &FileStats) {
        self.send(ProgressEvent::FileCompleted {
            name: name.to_string(),
            bytes: stats.bytes,
        });
    }

    fn on_overall_progress(&self, percent: u8) {
        self.send(ProgressEvent::OverallProgress(percent));
    }

    fn on_error(&self, name: &str, error: &str) {
        self.send(ProgressEvent::Failed {
            name: name.to_string(),
            error: error.to_string(),
        });
    }

    fn on_finished(&self) {
        self.send(ProgressEvent::Finished);
    }
}

/// Downloads planned files one at a time, in plan order.
pub struct Sequencer {
    drive: Arc<dyn DriveService>,
    cancellation_token: Option<CancellationToken>,
}

impl Sequencer {
    /// Creates a sequencer fetching through `drive`.
    #[must_use]
    pub const fn new(drive: Arc<dyn DriveService>) -> Self {
        Self {
            drive,
            cancellation_token: None,
        }
    }

    /// Allows the run to be cancelled between files.
    ///
    /// The token is only checked before a file starts, never mid-file.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Downloads a single planned file, forwarding chunk progress.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub async fn download_file(
        &self,
        item: &PlannedDownload,
        progress: &Arc<dyn ProgressListener>,
    ) -> Result<FileStats> {
        let started = Instant::now();
        let on_chunk = |percent: u8| progress.on_file_progress(percent);
        let bytes = self
            .drive
            .fetch_file(
                &item.source_file_id,
                &item.target_file_name,
                &item.target_directory,
                &on_chunk,
            )
            .await?;
        Ok(FileStats {
            bytes,
            elapsed: started.elapsed(),
        })
    }

    /// Downloads every item in order and reports progress.
    ///
    /// An empty batch emits [`NO_FILES_MESSAGE`] and the terminal signal
    /// without any overall progress.
    ///
    /// # Errors
    ///
    /// Stops at the first failed file and returns its error; the remaining
    /// items are not attempted and `on_finished` is not called. Returns
    /// [`Error::Cancelled`] if the token fires between files.
    pub async fn run(
        &self,
        items: &[PlannedDownload],
        progress: &Arc<dyn ProgressListener>,
    ) -> Result<SessionStats> {
        let mut builder = SessionStatsBuilder::new();

        if items.is_empty() {
            progress.on_message(NO_FILES_MESSAGE);
            progress.on_finished();
            return Ok(builder.build());
        }

        let total = items.len() as u64;
        for (done, item) in (1..).zip(items) {
            if self.is_cancelled() {
                log::info!("Run cancelled before {}", item.target_file_name);
                progress.on_message("Download cancelled.");
                return Err(Error::Cancelled);
            }

            let name = item.target_file_name.as_str();
            progress.on_message(&format!("Starting download: {name}"));
            progress.on_file_start(name);

            match self.download_file(item, progress).await {
                Ok(file_stats) => {
                    log::info!("Downloaded {}", item.target_path().display());
                    progress.on_file_complete(name, &file_stats);
                    progress.on_message(&format!("Downloaded {name}"));
                    builder.add_download(&file_stats);
                    progress.on_overall_progress(percent_of(done, total));
                }
                Err(e) => {
                    log::error!("Download failed for {name}: {e}");
                    progress.on_error(name, &e.to_string());
                    return Err(e);
                }
            }
        }

        progress.on_finished();
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::drive::{ProgressFn, RemoteFile};

    #[test]
    fn no_progress_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoProgress>();
        assert_send_sync::<ChannelProgress>();
    }

    /// Drive that "downloads" by reporting fixed progress steps.
    #[derive(Default)]
    struct MockDrive {
        fail_on: Option<String>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DriveService for MockDrive {
        async fn list_folder(&self, _folder_id: &str) -> Result<Vec<RemoteFile>> {
            Ok(Vec::new())
        }

        async fn fetch_file(
            &self,
            file_id: &str,
            _target_name: &str,
            _target_dir: &Path,
            on_progress: ProgressFn<'_>,
        ) -> Result<u64> {
            self.fetched.lock().unwrap().push(file_id.to_string());
            if self.fail_on.as_deref() == Some(file_id) {
                return Err(Error::Drive {
                    status: 403,
                    message: "quota exceeded".to_string(),
                });
            }
            for pct in [0, 50, 100] {
                on_progress(pct);
            }
            Ok(10)
        }
    }

    /// Listener that records every event in order.
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl Recorder {
        fn push(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<ProgressEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressListener for Recorder {
        fn on_message(&self, text: &str) {
            self.push(ProgressEvent::Message(text.to_string()));
        }

        fn on_file_progress(&self, percent: u8) {
            self.push(ProgressEvent::FileProgress(percent));
        }

        fn on_overall_progress(&self, percent: u8) {
            self.push(ProgressEvent::OverallProgress(percent));
        }

        fn on_error(&self, name: &str, error: &str) {
            self.push(ProgressEvent::Failed {
                name: name.to_string(),
                error: error.to_string(),
            });
        }

        fn on_finished(&self) {
            self.push(ProgressEvent::Finished);
        }
    }

    fn item(id: &str, name: &str) -> PlannedDownload {
        PlannedDownload {
            source_file_id: id.to_string(),
            target_file_name: name.to_string(),
            target_directory: PathBuf::from("downloads/Show (2020) [tmdbid-1]/Season 01"),
        }
    }

    fn setup(drive: MockDrive) -> (Arc<MockDrive>, Sequencer, Arc<Recorder>, Arc<dyn ProgressListener>) {
        let drive = Arc::new(drive);
        let shared: Arc<dyn DriveService> = drive.clone();
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn ProgressListener> = recorder.clone();
        (drive, Sequencer::new(shared), recorder, listener)
    }

    fn overall(events: &[ProgressEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::OverallProgress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_batch_reports_no_files_and_finishes() {
        let (drive, sequencer, recorder, listener) = setup(MockDrive::default());

        let stats = sequencer.run(&[], &listener).await.unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                ProgressEvent::Message(NO_FILES_MESSAGE.to_string()),
                ProgressEvent::Finished
            ]
        );
        assert_eq!(stats.files_downloaded, 0);
        assert!(drive.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn downloads_in_order_with_progress() {
        let (drive, sequencer, recorder, listener) = setup(MockDrive::default());
        let items = [item("a", "Show S01E01.mkv"), item("b", "Show S01E02.mkv")];

        let stats = sequencer.run(&items, &listener).await.unwrap();

        assert_eq!(drive.fetched.lock().unwrap().as_slice(), ["a", "b"]);
        assert_eq!(
            recorder.events(),
            vec![
                ProgressEvent::Message("Starting download: Show S01E01.mkv".to_string()),
                ProgressEvent::FileProgress(0),
                ProgressEvent::FileProgress(50),
                ProgressEvent::FileProgress(100),
                ProgressEvent::Message("Downloaded Show S01E01.mkv".to_string()),
                ProgressEvent::OverallProgress(50),
                ProgressEvent::Message("Starting download: Show S01E02.mkv".to_string()),
                ProgressEvent::FileProgress(0),
                ProgressEvent::FileProgress(50),
                ProgressEvent::FileProgress(100),
                ProgressEvent::Message("Downloaded Show S01E02.mkv".to_string()),
                ProgressEvent::OverallProgress(100),
                ProgressEvent::Finished,
            ]
        );
        assert_eq!(stats.files_downloaded, 2);
        assert_eq!(stats.total_bytes, 20);
    }

    #[tokio::test]
    async fn overall_progress_floors() {
        let (_drive, sequencer, recorder, listener) = setup(MockDrive::default());
        let items = [item("a", "1"), item("b", "2"), item("c", "3")];

        sequencer.run(&items, &listener).await.unwrap();

        assert_eq!(overall(&recorder.events()), vec![33, 66, 100]);
    }

    #[tokio::test]
    async fn failure_stops_the_batch() {
        let drive = MockDrive {
            fail_on: Some("b".to_string()),
            ..MockDrive::default()
        };
        let (drive, sequencer, recorder, listener) = setup(drive);
        let items = [item("a", "1.mkv"), item("b", "2.mkv"), item("c", "3.mkv")];

        let result = sequencer.run(&items, &listener).await;

        assert!(matches!(result, Err(Error::Drive { status: 403, .. })));
        assert_eq!(drive.fetched.lock().unwrap().as_slice(), ["a", "b"]);
        let events = recorder.events();
        assert!(events.contains(&ProgressEvent::Failed {
            name: "2.mkv".to_string(),
            error: "Drive API error (403): quota exceeded".to_string(),
        }));
        assert!(!events.contains(&ProgressEvent::Finished));
        assert_eq!(overall(&events), vec![33]);
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_files() {
        let token = CancellationToken::new();
        token.cancel();
        let (drive, sequencer, recorder, listener) = setup(MockDrive::default());
        let sequencer = sequencer.with_cancellation(token);

        let result = sequencer.run(&[item("a", "1.mkv")], &listener).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(drive.fetched.lock().unwrap().is_empty());
        assert!(!recorder.events().contains(&ProgressEvent::Finished));
    }

    #[tokio::test]
    async fn channel_progress_forwards_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let (_drive, sequencer, _recorder, _listener) = setup(MockDrive::default());
        let listener: Arc<dyn ProgressListener> = Arc::new(ChannelProgress::new(tx));

        sequencer.run(&[item("a", "ep.mkv")], &listener).await.unwrap();
        drop(listener);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.first(), Some(&ProgressEvent::Message("Starting download: ep.mkv".to_string())));
        assert!(events.contains(&ProgressEvent::FileStarted("ep.mkv".to_string())));
        assert!(events.contains(&ProgressEvent::FileCompleted {
            name: "ep.mkv".to_string(),
            bytes: 10
        }));
        assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    }
}
