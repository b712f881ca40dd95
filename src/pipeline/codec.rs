//! Document codec adapter: lopdf-backed parse and single-page extraction.
//!
//! ## Why spawn_blocking?
//!
//! Parsing a PDF object graph and re-serialising a page are CPU-bound.
//! `tokio::task::spawn_blocking` moves that work onto the blocking thread
//! pool so the async worker threads never stall on a large document. The
//! pipeline still awaits each call before starting the next, so processing
//! order is unchanged.
//!
//! ## How a page becomes a document
//!
//! lopdf has no "copy one page" primitive, but deleting every *other* page
//! from a clone of the document gives the same result: the kept page and
//! exactly the objects it references survive `prune_objects`, everything
//! else is dropped, and the clone serialises as a complete standalone PDF.
//! Cloning per page costs memory proportional to the source document, which
//! is acceptable for user-sized batches.

use crate::error::FileError;
use std::sync::Arc;
use tracing::debug;

/// A parsed, in-memory PDF document.
///
/// Owned by the `split` invocation that created it and discarded when the
/// file's pages have all been attempted. Cheap to clone: the object graph
/// is behind an `Arc` and extraction clones it lazily, per page.
#[derive(Clone)]
pub struct ParsedDocument {
    inner: Arc<lopdf::Document>,
    /// Ordered page object ids, indexed by 0-based page number.
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl ParsedDocument {
    /// Number of pages. Zero is valid (an empty document parses fine but
    /// yields no extracted pages).
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }
}

/// Parse raw bytes into a [`ParsedDocument`].
///
/// This is the structural stage of the two-stage input check: the `%PDF`
/// magic is verified first (a mislabelled text file fails here with a
/// precise message instead of a parser backtrace), then the full object
/// graph is loaded. Encrypted documents are rejected; page extraction
/// would produce unreadable output.
pub async fn parse(file_name: &str, bytes: &[u8]) -> Result<ParsedDocument, FileError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(FileError::Parse {
            file: file_name.to_string(),
            detail: "missing %PDF header".to_string(),
        });
    }

    let name = file_name.to_string();
    let owned = bytes.to_vec();
    tokio::task::spawn_blocking(move || {
        let doc = lopdf::Document::load_mem(&owned).map_err(|e| FileError::Parse {
            file: name.clone(),
            detail: e.to_string(),
        })?;

        if doc.is_encrypted() {
            return Err(FileError::Encrypted { file: name });
        }

        // get_pages returns BTreeMap<u32, ObjectId> keyed 1-based, in order.
        let page_ids: Vec<lopdf::ObjectId> = doc.get_pages().values().copied().collect();
        debug!("parsed '{}': {} pages", name, page_ids.len());

        Ok(ParsedDocument {
            inner: Arc::new(doc),
            page_ids,
        })
    })
    .await
    .unwrap_or_else(|e| {
        Err(FileError::Parse {
            file: file_name.to_string(),
            detail: format!("parse task panicked: {e}"),
        })
    })
}

/// Materialise page `index` (0-based) as a standalone single-page PDF.
///
/// Failures return a detail string; the caller wraps it into a
/// [`crate::error::PageError`] with the file context. One corrupt page
/// must not take down its siblings, so nothing here is fatal.
pub async fn extract_page(doc: &ParsedDocument, index: usize) -> Result<Vec<u8>, String> {
    let total = doc.page_ids.len();
    if index >= total {
        return Err(format!("page index {index} out of range (0..{total})"));
    }

    let inner = Arc::clone(&doc.inner);
    tokio::task::spawn_blocking(move || {
        let mut single = (*inner).clone();

        let keep = index as u32 + 1;
        let drop_list: Vec<u32> = (1..=total as u32).filter(|&n| n != keep).collect();
        if !drop_list.is_empty() {
            single.delete_pages(&drop_list);
        }
        single.prune_objects();
        single.renumber_objects();

        let mut buf = Vec::new();
        single
            .save_to(&mut buf)
            .map_err(|e| format!("serialisation failed: {e}"))?;
        debug!("extracted page {} -> {} bytes", index + 1, buf.len());
        Ok(buf)
    })
    .await
    .unwrap_or_else(|e| Err(format!("extract task panicked: {e}")))
}
