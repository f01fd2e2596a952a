//! Command-line front end: search, plan, then download with progress bars.

mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::{
    AppConfig, ChannelProgress, DriveService, DryRunFileSystem, GoogleDrive, KayoSearch,
    MetadataResolver, NoMetadata, Planner, ProgressListener, Sequencer, TmdbResolver,
    discover_links, parse_direct_input,
};

use progress::{ProgressDisplay, print_links, print_plan, print_summary};

/// Search for anime or movies, resolve their titles and download them from
/// Google Drive into a media-server friendly layout.
#[derive(Debug, Parser)]
#[command(name = "cartoonspoon", version, about)]
pub struct Args {
    /// Anime name, Google Drive link, or Drive folder id.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Title used for metadata lookup instead of the query.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Directory title folders are created in.
    #[arg(short, long)]
    pub download_dir: Option<PathBuf>,

    /// Config file to read instead of the default location.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the planned files without downloading or creating directories.
    #[arg(long)]
    pub dry_run: bool,
}

/// Builds the shared HTTP client.
fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("cartoonspoon/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(15))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// Picks the metadata resolver; without an API key titles stay unresolved.
fn build_resolver(config: &AppConfig, http: &reqwest::Client) -> Arc<dyn MetadataResolver> {
    match &config.tmdb.api_key {
        Some(key) => Arc::new(
            TmdbResolver::new(http.clone(), key.clone()).with_language(&config.tmdb.language),
        ),
        None => {
            log::warn!("No TMDB API key configured; titles will not be resolved");
            Arc::new(NoMetadata)
        }
    }
}

/// Cancels `token` on Ctrl-C. The current file still finishes.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the current file...");
            token.cancel();
        }
    });
}

/// Runs the CLI with parsed arguments.
///
/// # Errors
///
/// Returns an error if configuration, discovery, planning or a download
/// fails.
pub async fn run(args: Args) -> crate::Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.download_dir {
        config = config.with_download_dir(dir);
    }

    let query = args.query.join(" ");
    let query = query.trim();
    println!("Processing: {query}");

    let http = build_http_client()?;
    let search = KayoSearch::with_base_url(http.clone(), &config.search.base_url);
    let links = discover_links(query, &search).await?;
    if links.is_empty() {
        println!("No Google Drive links found.");
        return Ok(());
    }
    print_links(&links);

    let title = args.title.as_deref().unwrap_or(query);
    if args.title.is_none() && parse_direct_input(query).is_some() {
        log::warn!("Direct input without --title; metadata lookup will use the raw input");
    }

    let drive: Arc<dyn DriveService> = Arc::new(
        GoogleDrive::new(http.clone(), config.drive_access_token()?)
            .with_cleanup_on_error(config.drive.cleanup_on_error),
    );
    let resolver = build_resolver(&config, &http);
    if args.dry_run {
        let planner = Planner::with_fs(
            Arc::clone(&drive),
            resolver,
            &config.download_dir,
            DryRunFileSystem,
        );
        print_plan(&planner.plan(&links, title).await?);
        return Ok(());
    }

    let plan = Planner::new(Arc::clone(&drive), resolver, &config.download_dir)
        .plan(&links, title)
        .await?;
    print_plan(&plan);

    let token = CancellationToken::new();
    cancel_on_ctrl_c(token.clone());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let listener: Arc<dyn ProgressListener> = Arc::new(ChannelProgress::new(tx));
    let sequencer = Sequencer::new(drive).with_cancellation(token);
    let downloads = plan.downloads;
    let display = ProgressDisplay::new(downloads.len());

    let worker = tokio::spawn(async move { sequencer.run(&downloads, &listener).await });

    let mut finished = false;
    while let Some(event) = rx.recv().await {
        finished |= display.handle(event);
    }
    display.clear();

    let stats = worker
        .await
        .map_err(|e| crate::Error::Io(std::io::Error::other(e)))??;
    if finished {
        println!("All downloads finished!");
    }
    print_summary(&stats);
    Ok(())
}
