//! # pdfsplit
//!
//! Split multi-page PDF documents into per-page files, packed into a
//! single downloadable ZIP archive — entirely locally, with no server
//! round-trip, plus a durable operation queue so submissions made while
//! the host is unreachable survive a restart and can be replayed later.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files
//!  │
//!  ├─ 1. Validate  declared media type + size limit
//!  ├─ 2. Parse     lopdf object graph (CPU-bound, spawn_blocking)
//!  ├─ 3. Extract   one standalone single-page PDF per page
//!  ├─ 4. Name      sanitised {base}-{page}.pdf, zero-padded
//!  ├─ 5. Pack      deflate ZIP session, deterministic settings
//!  └─ 6. Output    archive bytes + per-file reports + stats
//! ```
//!
//! Failures isolate at the smallest useful granularity: a bad file skips
//! that file, a bad page skips that page, and the batch still returns an
//! archive with everything that worked. Only an empty result or a broken
//! archive is fatal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsplit::{split, SourceFile, SplitConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = SourceFile::from_path("report.pdf").await?;
//!     let config = SplitConfig::default();
//!     let output = split(&[file], &config).await?;
//!     std::fs::write("pdf-splitted.zip", &output.archive)?;
//!     eprintln!("{} pages packed", output.stats.pages_extracted);
//!     Ok(())
//! }
//! ```
//!
//! ## Offline queue
//!
//! The [`Uploader`] routes submissions by reachability: when the
//! [`ConnectivityMonitor`] reports unreachable, the batch is persisted
//! into an [`OfflineStore`] and queued instead of processed. After the
//! host reports reachability again, [`Uploader::drain_reconnected`] hands
//! the queued operations back for replay. Replay is the caller's policy;
//! nothing re-runs automatically.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsplit` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfsplit = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod connectivity;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod split;
pub mod store;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SplitConfig, SplitConfigBuilder, DEFAULT_ARCHIVE_NAME, DEFAULT_MAX_FILE_BYTES};
pub use connectivity::{ConnectivityMonitor, ConnectivityState, PendingOperation};
pub use error::{FileError, PageError, SplitError, StoreError};
pub use orchestrator::{ArchiveSaver, DirectorySaver, SubmitOutcome, Uploader};
pub use output::{DocumentInfo, ExtractedPage, FileReport, SourceFile, SplitOutput, SplitStats};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{inspect, split, split_sync, split_to_file};
pub use store::{CachedFile, OfflineStore, OperationKind, QueuedOperation};
pub use stream::{split_stream, PageStream};
