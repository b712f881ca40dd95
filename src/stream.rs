//! Streaming split API: emit extracted pages as they are produced.
//!
//! ## Why stream?
//!
//! The eager [`crate::split::split`] buffers every single-page document
//! plus the growing archive in memory before returning. A stream-based
//! API instead yields each [`ExtractedPage`] the moment it exists, letting
//! callers write pages to their own sink incrementally, drive progressive
//! UI, or stop early.
//!
//! Pages are emitted strictly in batch order (files in submission order,
//! pages ascending) because extraction itself is sequential. File-level
//! rejections cannot be represented in a page stream; they are logged via
//! `tracing` and the file is skipped, mirroring how the eager API treats
//! them as non-fatal.

use crate::config::SplitConfig;
use crate::error::{PageError, SplitError};
use crate::output::{ExtractedPage, SourceFile};
use crate::pipeline::{codec, naming, validate};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-page results.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<ExtractedPage, PageError>> + Send>>;

/// One page's worth of pending extraction work.
struct PageUnit {
    doc: codec::ParsedDocument,
    file_name: String,
    base: String,
    width: usize,
    index: usize,
}

/// Split a batch, yielding each extracted page as it is materialised.
///
/// All files are validated and parsed up front (so the fatal no-valid-input
/// case surfaces immediately); extraction is deferred into the stream.
///
/// # Returns
/// - `Ok(PageStream)` — a stream of `Result<ExtractedPage, PageError>`
/// - `Err(SplitError::NoOutput)` — no file survived validation and parsing
pub async fn split_stream(
    files: Vec<SourceFile>,
    config: &SplitConfig,
) -> Result<PageStream, SplitError> {
    info!("Starting streaming split of {} file(s)", files.len());

    let mut names = naming::NameAllocator::new();
    let mut units: Vec<PageUnit> = Vec::new();
    let mut first_error: Option<String> = None;

    for file in &files {
        if let Err(err) = validate::validate(file, config) {
            warn!("{err}");
            first_error.get_or_insert_with(|| err.to_string());
            continue;
        }
        let doc = match codec::parse(&file.name, &file.bytes).await {
            Ok(doc) => doc,
            Err(err) => {
                warn!("{err}");
                first_error.get_or_insert_with(|| err.to_string());
                continue;
            }
        };
        let page_count = doc.page_count();
        if page_count == 0 {
            warn!("'{}': no pages to extract", file.name);
            first_error.get_or_insert_with(|| format!("'{}': no pages to extract", file.name));
            continue;
        }

        let width = naming::page_number_width(page_count);
        let base = names.allocate(&file.name);
        for index in 0..page_count {
            units.push(PageUnit {
                doc: doc.clone(),
                file_name: file.name.clone(),
                base: base.clone(),
                width,
                index,
            });
        }
    }

    if units.is_empty() {
        return Err(SplitError::NoOutput {
            files: files.len(),
            first_error: first_error.unwrap_or_else(|| "no files were submitted".to_string()),
        });
    }

    // Sequential by construction: `then` polls one extraction at a time.
    let s = stream::iter(units).then(|unit| async move {
        let page_num = unit.index + 1;
        match codec::extract_page(&unit.doc, unit.index).await {
            Ok(bytes) => Ok(ExtractedPage {
                source_name: unit.file_name,
                page_index: unit.index,
                archive_name: naming::entry_name(&unit.base, page_num, unit.width),
                bytes,
            }),
            Err(detail) => Err(PageError::Extract {
                file: unit.file_name,
                page: page_num,
                detail,
            }),
        }
    });

    Ok(Box::pin(s))
}
