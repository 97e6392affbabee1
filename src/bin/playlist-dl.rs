//! Command line entry point: serves the playlist download API until a
//! termination signal arrives.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use playlist_dl::{Config, FetchPolicy, PlaylistDownloader, Quality, Result, run_with_shutdown};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "playlist-dl")]
#[command(author, version, about)]
struct Args {
    /// JSON configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address the HTTP API listens on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory finished MP3 files are written to
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Quality used when a request does not name one (low, medium, high)
    #[arg(long)]
    quality: Option<Quality>,

    /// Run fetches concurrently instead of one at a time
    #[arg(long)]
    parallel: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = &self.download_dir {
            config.download.download_dir = dir.clone();
        }
        if let Some(quality) = self.quality {
            config.download.default_quality = quality;
        }
        if self.parallel {
            config.download.fetch_policy = FetchPolicy::Parallel;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse before tracing so --help prints without log noise
    let args = Args::parse();

    // RUST_LOG wins over -q, which wins over -v
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = args.load_config()?;
    info!(
        bind = %config.server.api.bind_address,
        download_dir = %config.download.download_dir.display(),
        fetch_policy = ?config.download.fetch_policy,
        "playlist-dl starting"
    );

    let downloader = Arc::new(PlaylistDownloader::new(config).await?);
    let server = downloader.spawn_api_server();

    tokio::select! {
        result = server => {
            // The server only returns on bind or serve failure
            let outcome = result.map_err(|e| playlist_dl::Error::ApiServerError(e.to_string()))?;
            downloader.shutdown().await?;
            outcome
        }
        result = run_with_shutdown((*downloader).clone()) => {
            info!("playlist-dl stopped");
            result
        }
    }
}
