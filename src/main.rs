#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use clap::Parser;

use cartoonspoon::cli::{self, Args};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("cartoonspoon=info"))
        .init();

    let args = Args::parse();
    if let Err(e) = cli::run(args).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
