//! Progress bars and summary reporting for CLI downloads.

use console::style;
use humansize::{DECIMAL, format_size};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::{DiscoveredLink, Plan, ProgressEvent, SessionStats};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates the bar tracking the file currently downloading.
pub fn make_file_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% - {msg}")
            .expect("progress template is valid")
            .progress_chars("━━╌"),
    );
    bar
}

/// Creates the bar tracking the whole batch.
pub fn make_total_bar(files: usize) -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("Total [{bar:40.green/white}] {pos:>3}% of {msg}")
            .expect("template valid")
            .progress_chars("━━╌"),
    );
    bar.set_message(format!("{files} file(s)"));
    bar
}

/// Renders progress events onto a file bar and a total bar.
pub struct ProgressDisplay {
    multi: MultiProgress,
    file_bar: ProgressBar,
    total_bar: ProgressBar,
}

impl ProgressDisplay {
    /// Creates the two bars for a batch of `files` downloads.
    pub fn new(files: usize) -> Self {
        let multi = MultiProgress::new();
        let file_bar = multi.add(make_file_bar());
        let total_bar = multi.add(make_total_bar(files));
        Self {
            multi,
            file_bar,
            total_bar,
        }
    }

    /// Applies one event. Returns `true` once the terminal event arrives.
    pub fn handle(&self, event: ProgressEvent) -> bool {
        match event {
            ProgressEvent::Message(text) => {
                let _ = self.multi.println(text);
            }
            ProgressEvent::FileStarted(name) => {
                self.file_bar.reset();
                self.file_bar.set_message(name);
            }
            ProgressEvent::FileProgress(pct) => self.file_bar.set_position(u64::from(pct)),
            ProgressEvent::FileCompleted { name, bytes } => {
                self.file_bar.set_position(100);
                log::debug!("{name}: {}", format_size(bytes, DECIMAL));
            }
            ProgressEvent::OverallProgress(pct) => self.total_bar.set_position(u64::from(pct)),
            ProgressEvent::Failed { name, error } => {
                self.file_bar.abandon();
                let _ = self
                    .multi
                    .println(format!("{} {name}: {error}", style("Download failed:").red()));
            }
            ProgressEvent::Finished => {
                self.file_bar.set_position(100);
                self.total_bar.set_position(100);
                return true;
            }
        }
        false
    }

    /// Removes the bars from the terminal.
    pub fn clear(&self) {
        self.file_bar.finish_and_clear();
        self.total_bar.finish_and_clear();
        self.multi.clear().ok();
    }
}

/// Prints the discovered links with their index.
pub fn print_links(links: &[DiscoveredLink]) {
    for (i, link) in links.iter().enumerate() {
        println!("{i}: {} -> {}", link.display_name, link.url);
    }
}

/// Prints the planned downloads and any skipped links.
pub fn print_plan(plan: &Plan) {
    for link in &plan.skipped {
        println!(
            "{} unrecognized link '{}': {}",
            style("Skipping").yellow(),
            link.display_name,
            link.url
        );
    }

    if plan.is_empty() {
        return;
    }

    println!("\n{SEPARATOR}");
    println!("Files to download:");
    println!("{SEPARATOR}");
    for item in &plan.downloads {
        println!("  {}", item.target_path().display());
    }
    println!("{SEPARATOR}");
    println!("  {} file(s)", plan.downloads.len());
    println!("{SEPARATOR}\n");
}

/// Prints a summary of download statistics.
pub fn print_summary(stats: &SessionStats) {
    if stats.files_downloaded == 0 {
        return;
    }

    println!("\n{SEPARATOR}");
    println!("Download Summary");
    println!("{SEPARATOR}");
    println!("  Files downloaded:  {}", stats.files_downloaded);
    println!("  Total size:        {}", format_size(stats.total_bytes, DECIMAL));
    println!("  Total time:        {:.1}s", stats.elapsed.as_secs_f64());
    println!(
        "  Average speed:     {}/s",
        format_size(stats.average_speed(), DECIMAL)
    );
    println!("  Slowest file:      {:.1}s", stats.slowest_file.as_secs_f64());
    println!("{SEPARATOR}");
}
