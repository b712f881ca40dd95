//! Error types for the pdfsplit library.
//!
//! Three distinct error types reflect three distinct failure granularities:
//!
//! * [`SplitError`] — **Fatal**: the batch produced nothing usable, or the
//!   archive/save step itself failed. Returned as `Err(SplitError)` from the
//!   top-level `split*` functions.
//!
//! * [`FileError`] — **Non-fatal**: one input file was rejected (wrong media
//!   type, unparseable, encrypted, empty) but the rest of the batch is fine.
//!   Stored inside [`crate::output::FileReport`].
//!
//! * [`PageError`] — **Non-fatal**: a single page of an otherwise healthy
//!   document could not be materialised. Finer-grained than [`FileError`];
//!   the remaining pages of the same file still land in the archive.
//!
//! [`StoreError`] stands apart: the persistent store is an optional,
//! best-effort facility, so its failures are surfaced to callers as a
//! degraded-feature warning and never abort the split path.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfsplit library.
///
/// File- and page-level failures use [`FileError`] and [`PageError`] and are
/// accumulated in [`crate::output::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Zero archive entries were ever added; there is nothing to download.
    #[error("No pages could be processed from {files} file(s).\nFirst error: {first_error}")]
    NoOutput { files: usize, first_error: String },

    /// Archive finalisation failed after entries were added.
    #[error("Failed to finalise archive: {detail}")]
    Pack { detail: String },

    /// The host save step rejected the finished archive.
    #[error("Failed to save '{filename}': {detail}")]
    Save { filename: String, detail: String },

    /// Some pages succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::SplitOutput::into_strict`] when the
    /// caller wants to treat any page or file failure as an error.
    #[error("{failed}/{total} pages failed during split")]
    PartialFailure {
        extracted: usize,
        failed: usize,
        total: usize,
    },

    /// Could not create or write the output archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error that rejects one input file.
///
/// Recorded in [`crate::output::FileReport::error`]; the batch continues
/// with the next file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The declared media type is not the expected document type.
    #[error("'{file}': declared media type '{declared}' is not '{expected}'")]
    InvalidMediaType {
        file: String,
        declared: String,
        expected: String,
    },

    /// The file exceeds the configured size limit.
    #[error("'{file}': {size} bytes exceeds the {max} byte limit")]
    TooLarge { file: String, size: u64, max: u64 },

    /// The bytes could not be interpreted as a PDF document.
    #[error("'{file}': not a valid PDF: {detail}")]
    Parse { file: String, detail: String },

    /// The document is encrypted; page extraction is not attempted.
    #[error("'{file}': document is encrypted")]
    Encrypted { file: String },

    /// The document parsed but holds zero pages.
    #[error("'{file}': no pages to extract")]
    Empty { file: String },
}

impl FileError {
    /// The name of the file this error rejects.
    pub fn file(&self) -> &str {
        match self {
            FileError::InvalidMediaType { file, .. }
            | FileError::TooLarge { file, .. }
            | FileError::Parse { file, .. }
            | FileError::Encrypted { file }
            | FileError::Empty { file } => file,
        }
    }
}

/// A non-fatal error for a single page.
///
/// The page is skipped; the remaining pages of the same file and all other
/// files continue to be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page could not be materialised as a standalone document.
    #[error("'{file}' page {page}: extraction failed: {detail}")]
    Extract {
        file: String,
        /// 1-based page number.
        page: usize,
        detail: String,
    },
}

/// Persistent-store failures.
///
/// Always non-fatal to the split path: callers log these and carry on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The host has no persistence capability (store never initialised).
    #[error("persistent store unavailable")]
    Unavailable,

    /// The host denied a read or write (missing directory, quota, permissions).
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("store record serialisation failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_output_display() {
        let e = SplitError::NoOutput {
            files: 3,
            first_error: "'a.pdf': no pages to extract".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3 file(s)"), "got: {msg}");
        assert!(msg.contains("a.pdf"));
    }

    #[test]
    fn partial_failure_display() {
        let e = SplitError::PartialFailure {
            extracted: 9,
            failed: 1,
            total: 10,
        };
        assert!(e.to_string().contains("1/10"));
    }

    #[test]
    fn file_error_carries_file_name() {
        let e = FileError::InvalidMediaType {
            file: "notes.txt".into(),
            declared: "text/plain".into(),
            expected: "application/pdf".into(),
        };
        assert_eq!(e.file(), "notes.txt");
        assert!(e.to_string().contains("text/plain"));
    }

    #[test]
    fn page_error_display_is_one_based() {
        let e = PageError::Extract {
            file: "report.pdf".into(),
            page: 7,
            detail: "missing content stream".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 7"));
        assert!(msg.contains("report.pdf"));
    }

    #[test]
    fn store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = StoreError::from(io);
        assert!(e.to_string().contains("denied"));
    }
}
