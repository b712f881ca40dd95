//! Eager (full-batch) split entry points.
//!
//! This module provides the simpler API: process every file, then return
//! the finished archive. Use [`crate::stream::split_stream`] instead when
//! you want extracted pages progressively or need to bound peak memory on
//! very large batches.
//!
//! ## Failure policy
//!
//! File- and page-level failures never unwind the batch; they accumulate
//! in the per-file [`FileReport`]s and the run still returns an archive
//! containing every page that succeeded. Only two situations are fatal:
//! nothing at all could be packed ([`SplitError::NoOutput`]) or the
//! archive itself failed ([`SplitError::Pack`]).

use crate::config::SplitConfig;
use crate::error::{FileError, PageError, SplitError};
use crate::output::{DocumentInfo, FileReport, SourceFile, SplitOutput, SplitStats};
use crate::pipeline::{archive::ArchiveSession, codec, naming, validate};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Split a batch of PDF files into one per-page ZIP archive.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `files`  — user-submitted files, processed in submission order
/// * `config` — batch configuration
///
/// # Returns
/// `Ok(SplitOutput)` whenever at least one page was packed, even if some
/// files or pages failed (check `output.files` / `output.stats`).
///
/// # Errors
/// Returns `Err(SplitError)` only for fatal conditions:
/// - no page from any file could be processed
/// - the archive could not be finalised
pub async fn split(files: &[SourceFile], config: &SplitConfig) -> Result<SplitOutput, SplitError> {
    let total_start = Instant::now();
    info!("Starting split of {} file(s)", files.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(files.len());
    }

    let mut session = ArchiveSession::new(config.compression_level);
    let mut names = naming::NameAllocator::new();
    let mut reports: Vec<FileReport> = Vec::with_capacity(files.len());

    for (file_index, file) in files.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(&file.name, file_index, files.len());
        }

        let mut report = FileReport::new(&file.name);

        // Stage one: declared type and size. Cheap, no parsing.
        if let Err(err) = validate::validate(file, config) {
            reject_file(config, &mut report, err);
            reports.push(report);
            continue;
        }

        // Stage two: structural. Magic bytes and a full parse.
        let doc = match codec::parse(&file.name, &file.bytes).await {
            Ok(doc) => doc,
            Err(err) => {
                reject_file(config, &mut report, err);
                reports.push(report);
                continue;
            }
        };

        let page_count = doc.page_count();
        if page_count == 0 {
            reject_file(
                config,
                &mut report,
                FileError::Empty {
                    file: file.name.clone(),
                },
            );
            reports.push(report);
            continue;
        }

        report.page_count = page_count;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_pages(&file.name, page_count);
        }

        let width = naming::page_number_width(page_count);
        let base = names.allocate(&file.name);
        debug!("'{}' -> base '{}', {} pages", file.name, base, page_count);

        for index in 0..page_count {
            let page_num = index + 1;
            match codec::extract_page(&doc, index).await {
                Ok(bytes) => {
                    let entry = naming::entry_name(&base, page_num, width);
                    session.add_entry(&entry, &bytes)?;
                    report.pages_extracted += 1;
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_complete(&file.name, page_num, page_count, bytes.len());
                    }
                }
                Err(detail) => {
                    let err = PageError::Extract {
                        file: file.name.clone(),
                        page: page_num,
                        detail,
                    };
                    warn!("{err}");
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_error(&file.name, page_num, page_count, &err.to_string());
                    }
                    report.page_errors.push(err);
                }
            }
        }

        reports.push(report);
    }

    if session.entry_count() == 0 {
        let first_error = reports
            .iter()
            .find_map(|r| {
                r.error
                    .as_ref()
                    .map(|e| e.to_string())
                    .or_else(|| r.page_errors.first().map(|e| e.to_string()))
            })
            .unwrap_or_else(|| "no files were submitted".to_string());
        return Err(SplitError::NoOutput {
            files: files.len(),
            first_error,
        });
    }

    let entries = session.entry_count();
    let pack_start = Instant::now();
    let archive = session.finalize()?;
    let pack_duration_ms = pack_start.elapsed().as_millis() as u64;

    let stats = SplitStats {
        files_submitted: files.len(),
        files_failed: reports.iter().filter(|r| r.error.is_some()).count(),
        pages_total: reports.iter().map(|r| r.page_count).sum(),
        pages_extracted: reports.iter().map(|r| r.pages_extracted).sum(),
        pages_failed: reports.iter().map(|r| r.page_errors.len()).sum(),
        archive_bytes: archive.len() as u64,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        pack_duration_ms,
    };

    info!(
        "Split complete: {} entries from {}/{} files, {} bytes, {}ms",
        entries,
        files.len() - stats.files_failed,
        files.len(),
        stats.archive_bytes,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(entries, stats.pages_failed);
    }

    Ok(SplitOutput {
        archive,
        files: reports,
        stats,
    })
}

/// Record a file-level rejection: log, notify, annotate the report.
fn reject_file(config: &SplitConfig, report: &mut FileReport, err: FileError) {
    warn!("{err}");
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_error(err.file(), &err.to_string());
    }
    report.error = Some(err);
}

/// Split a batch and write the archive directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial archives.
pub async fn split_to_file(
    files: &[SourceFile],
    output_path: impl AsRef<Path>,
    config: &SplitConfig,
) -> Result<SplitOutput, SplitError> {
    let output = split(files, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SplitError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("zip.tmp");
    tokio::fs::write(&tmp_path, &output.archive)
        .await
        .map_err(|e| SplitError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| SplitError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Synchronous wrapper around [`split`].
///
/// Creates a temporary tokio runtime internally.
pub fn split_sync(files: &[SourceFile], config: &SplitConfig) -> Result<SplitOutput, SplitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SplitError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(split(files, config))
}

/// Report a file's page count without splitting it.
///
/// Runs the same two-stage validation as the pipeline, so the result
/// reflects what `split` would do with the file.
pub async fn inspect(file: &SourceFile, config: &SplitConfig) -> Result<DocumentInfo, FileError> {
    validate::validate(file, config)?;
    let doc = codec::parse(&file.name, &file.bytes).await?;
    Ok(DocumentInfo {
        name: file.name.clone(),
        byte_len: file.byte_len(),
        page_count: doc.page_count(),
    })
}
