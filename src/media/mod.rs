//! Media extraction and fetching collaborators
//!
//! The task engine never talks to the network itself. It relies on two
//! collaborators defined here as traits:
//!
//! - [`MediaExtractor`]: turns one input URL into metadata (playlist entries or
//!   a single item)
//! - [`MediaFetcher`]: fetches and transcodes one source URL into the output
//!   directory, recording completions in the shared ledger
//!
//! [`YtDlp`] implements both by driving the external `yt-dlp` binary.
//! [`expand`] is the extraction adapter the ingestion path calls.
//!
//! ## Usage
//!
//! ```no_run
//! use playlist_dl::media::{YtDlp, expand};
//! use playlist_dl::ExtractMode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ytdlp = YtDlp::from_path().expect("yt-dlp not found in PATH");
//!
//!     let entries = expand(
//!         &ytdlp,
//!         "https://www.youtube.com/playlist?list=PL123",
//!         ExtractMode::Playlist,
//!     )
//!     .await?;
//!     for entry in entries {
//!         println!("{} -> {}", entry.title, entry.source_url);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod expand;
mod parser;
mod traits;
mod ytdlp;

pub use expand::expand;
pub use parser::parse_extractor_output;
pub use traits::{ExtractedInfo, FetchRequest, MediaExtractor, MediaFetcher, RawEntry};
pub use ytdlp::YtDlp;
