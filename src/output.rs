//! Input and output types for the split pipeline.
//!
//! [`SourceFile`] is the only input type: a named, typed, immutable byte
//! blob. Everything else here describes what came out of a batch —
//! per-page payloads ([`ExtractedPage`]), per-file accounting
//! ([`FileReport`]), and the batch-level [`SplitOutput`] with its
//! [`SplitStats`].

use crate::error::{FileError, PageError, SplitError};
use serde::Serialize;
use std::path::Path;

/// A named binary blob submitted by the user.
///
/// Immutable once accepted: the pipeline reads `bytes` but never mutates
/// them, so a caller can resubmit the same `SourceFile` after a failure.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original file name as supplied by the user (may contain path junk;
    /// the pipeline sanitises it before naming archive entries).
    pub name: String,
    /// Declared media type, e.g. `application/pdf`. Checked against the
    /// configured expectation before any parsing happens.
    pub media_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Build a source file from in-memory bytes.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the media type from its extension.
    ///
    /// Only `.pdf` maps to `application/pdf`; anything else is declared
    /// `application/octet-stream` and will be rejected by validation, which
    /// is the honest outcome for a file the pipeline cannot split.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let media_type = match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
            _ => "application/octet-stream",
        };
        Ok(Self::new(name, media_type, bytes))
    }

    /// Size of the payload in bytes.
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A single extracted page: a standalone one-page PDF plus the archive
/// entry name it will be (or was) stored under.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Name of the source file this page came from.
    pub source_name: String,
    /// 0-based page index within the source document.
    pub page_index: usize,
    /// Derived archive entry name, e.g. `report-03.pdf`.
    pub archive_name: String,
    /// Serialised single-page PDF.
    pub bytes: Vec<u8>,
}

/// Metadata for one document, without splitting it.
///
/// Produced by [`crate::split::inspect`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub byte_len: u64,
    pub page_count: usize,
}

/// Per-file accounting for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Original (unsanitised) file name.
    pub name: String,
    /// Pages the parsed document reported. Zero when the file never parsed.
    pub page_count: usize,
    /// Pages that made it into the archive.
    pub pages_extracted: usize,
    /// File-level rejection, if any. Set iff the file contributed nothing.
    pub error: Option<FileError>,
    /// Page-level failures for pages that were skipped.
    pub page_errors: Vec<PageError>,
}

impl FileReport {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            page_count: 0,
            pages_extracted: 0,
            error: None,
            page_errors: Vec::new(),
        }
    }

    /// True when every page of this file landed in the archive.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.page_errors.is_empty()
    }
}

/// Aggregate statistics for one `split` invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitStats {
    /// Files handed to the pipeline.
    pub files_submitted: usize,
    /// Files rejected at file granularity.
    pub files_failed: usize,
    /// Sum of page counts across all files that parsed.
    pub pages_total: usize,
    /// Pages that became archive entries.
    pub pages_extracted: usize,
    /// Pages skipped by page-level extraction failures.
    pub pages_failed: usize,
    /// Size of the finalised archive.
    pub archive_bytes: u64,
    /// Wall-clock duration of the whole invocation.
    pub total_duration_ms: u64,
    /// Portion spent finalising the archive.
    pub pack_duration_ms: u64,
}

/// The terminal output of a successful `split` invocation.
///
/// "Successful" includes partial success: as long as at least one page was
/// packed, the archive is returned and the failures are readable from
/// `files`. Use [`SplitOutput::into_strict`] to reject partial results.
#[derive(Debug, Serialize)]
pub struct SplitOutput {
    /// The finalised ZIP archive.
    #[serde(skip_serializing)]
    pub archive: Vec<u8>,
    /// One report per submitted file, in submission order.
    pub files: Vec<FileReport>,
    pub stats: SplitStats,
}

impl SplitOutput {
    /// Treat any file- or page-level failure as a batch failure.
    pub fn into_strict(self) -> Result<Self, SplitError> {
        if self.stats.pages_failed > 0 || self.stats.files_failed > 0 {
            return Err(SplitError::PartialFailure {
                extracted: self.stats.pages_extracted,
                failed: self.stats.pages_failed + self.stats.files_failed,
                total: self.stats.pages_total,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_byte_len() {
        let f = SourceFile::new("a.pdf", "application/pdf", vec![1, 2, 3]);
        assert_eq!(f.byte_len(), 3);
    }

    #[tokio::test]
    async fn from_path_derives_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("Doc.PDF");
        let txt_path = dir.path().join("doc.txt");
        tokio::fs::write(&pdf_path, b"%PDF-1.5").await.unwrap();
        tokio::fs::write(&txt_path, b"hello").await.unwrap();

        let pdf = SourceFile::from_path(&pdf_path).await.unwrap();
        assert_eq!(pdf.media_type, "application/pdf");
        assert_eq!(pdf.name, "Doc.PDF");

        let txt = SourceFile::from_path(&txt_path).await.unwrap();
        assert_eq!(txt.media_type, "application/octet-stream");
    }

    #[test]
    fn strict_rejects_partial_results() {
        let out = SplitOutput {
            archive: vec![0],
            files: vec![],
            stats: SplitStats {
                files_submitted: 1,
                pages_total: 10,
                pages_extracted: 9,
                pages_failed: 1,
                ..SplitStats::default()
            },
        };
        match out.into_strict() {
            Err(SplitError::PartialFailure { failed, .. }) => assert_eq!(failed, 1),
            other => panic!("expected PartialFailure, got {other:?}"),
        }
    }

    #[test]
    fn strict_passes_clean_results() {
        let out = SplitOutput {
            archive: vec![0],
            files: vec![],
            stats: SplitStats {
                files_submitted: 1,
                pages_total: 2,
                pages_extracted: 2,
                ..SplitStats::default()
            },
        };
        assert!(out.into_strict().is_ok());
    }
}
