//! Download statistics types.

use std::time::{Duration, Instant};

/// Statistics for a single completed file.
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Bytes written to disk.
    pub bytes: u64,
    /// Time taken to download the file.
    pub elapsed: Duration,
}

impl FileStats {
    /// Average download speed in bytes per second.
    #[must_use]
    pub fn average_speed(&self) -> u64 {
        bytes_per_sec(self.bytes, self.elapsed)
    }
}

/// Statistics for an entire download run.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of files successfully downloaded.
    pub files_downloaded: usize,
    /// Total bytes downloaded.
    pub total_bytes: u64,
    /// Total elapsed time for the run.
    pub elapsed: Duration,
    /// Longest single-file download time.
    pub slowest_file: Duration,
}

impl SessionStats {
    /// Returns the average download speed in bytes per second.
    #[must_use]
    pub fn average_speed(&self) -> u64 {
        bytes_per_sec(self.total_bytes, self.elapsed)
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bytes_per_sec(bytes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 / secs) as u64
    } else {
        0
    }
}

/// Builder for accumulating session statistics during downloads.
pub struct SessionStatsBuilder {
    files_downloaded: usize,
    total_bytes: u64,
    slowest_file: Duration,
    start_time: Instant,
}

impl Default for SessionStatsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStatsBuilder {
    /// Creates a builder; the session clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files_downloaded: 0,
            total_bytes: 0,
            slowest_file: Duration::ZERO,
            start_time: Instant::now(),
        }
    }

    /// Records a completed file download.
    pub fn add_download(&mut self, file_stats: &FileStats) {
        self.files_downloaded += 1;
        self.total_bytes += file_stats.bytes;
        self.slowest_file = self.slowest_file.max(file_stats.elapsed);
    }

    /// Builds the final session statistics.
    #[must_use]
    pub fn build(self) -> SessionStats {
        SessionStats {
            files_downloaded: self.files_downloaded,
            total_bytes: self.total_bytes,
            elapsed: self.start_time.elapsed(),
            slowest_file: self.slowest_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_stats_default() {
        let stats = SessionStats::default();
        assert_eq!(stats.files_downloaded, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.average_speed(), 0);
    }

    #[test]
    fn session_stats_average_speed() {
        let stats = SessionStats {
            files_downloaded: 2,
            total_bytes: 1000,
            elapsed: Duration::from_secs(2),
            slowest_file: Duration::from_secs(1),
        };
        assert_eq!(stats.average_speed(), 500);
    }

    #[test]
    fn file_stats_average_speed() {
        let stats = FileStats {
            bytes: 3000,
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(stats.average_speed(), 1000);
    }

    #[test]
    fn session_stats_builder() {
        let mut builder = SessionStatsBuilder::new();
        builder.add_download(&FileStats {
            bytes: 500,
            elapsed: Duration::from_secs(1),
        });
        builder.add_download(&FileStats {
            bytes: 250,
            elapsed: Duration::from_secs(4),
        });

        let stats = builder.build();
        assert_eq!(stats.files_downloaded, 2);
        assert_eq!(stats.total_bytes, 750);
        assert_eq!(stats.slowest_file, Duration::from_secs(4));
    }
}
