//! Progress-callback trait for batch, file, and page events.
//!
//! Inject an `Arc<dyn SplitProgressCallback>` via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the batch.
//!
//! Callbacks are the least-invasive integration point: callers can forward
//! events to a progress bar, a channel, or a status line without the
//! library knowing how the host application communicates. All methods have
//! default no-op implementations so callers only override what they need.
//!
//! The pipeline processes one unit of work at a time, so events for a
//! single invocation arrive strictly in order: batch start, then per file
//! (start, page count, pages in ascending order), then batch complete.
//! The trait is still `Send + Sync` because callbacks may fire from the
//! blocking thread pool.

use std::sync::Arc;

/// Called by the split pipeline as it processes a batch.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once before any file is touched.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file is picked up, before validation.
    fn on_file_start(&self, file: &str, index: usize, total_files: usize) {
        let _ = (file, index, total_files);
    }

    /// Called after a file parses, once its page count is known.
    ///
    /// Progress bars use this to grow their length: the batch's total page
    /// count is not known up front.
    fn on_file_pages(&self, file: &str, page_count: usize) {
        let _ = (file, page_count);
    }

    /// Called when a page has been extracted and packed.
    ///
    /// `page_num` is 1-based; `entry_bytes` is the size of the single-page
    /// document that was added to the archive.
    fn on_page_complete(&self, file: &str, page_num: usize, page_count: usize, entry_bytes: usize) {
        let _ = (file, page_num, page_count, entry_bytes);
    }

    /// Called when a page failed extraction and was skipped.
    fn on_page_error(&self, file: &str, page_num: usize, page_count: usize, error: &str) {
        let _ = (file, page_num, page_count, error);
    }

    /// Called when a whole file was rejected (validation, parse, empty).
    fn on_file_error(&self, file: &str, error: &str) {
        let _ = (file, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, entries: usize, failed_pages: usize) {
        let _ = (entries, failed_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        files: AtomicUsize,
        pages: AtomicUsize,
        page_errors: AtomicUsize,
        file_errors: AtomicUsize,
        final_entries: AtomicUsize,
    }

    impl SplitProgressCallback for TrackingCallback {
        fn on_file_start(&self, _file: &str, _index: usize, _total: usize) {
            self.files.fetch_add(1, Ordering::SeqCst);
        }
        fn on_page_complete(&self, _file: &str, _num: usize, _count: usize, _bytes: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_page_error(&self, _file: &str, _num: usize, _count: usize, _error: &str) {
            self.page_errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_file_error(&self, _file: &str, _error: &str) {
            self.file_errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, entries: usize, _failed: usize) {
            self.final_entries.store(entries, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start("a.pdf", 0, 2);
        cb.on_file_pages("a.pdf", 3);
        cb.on_page_complete("a.pdf", 1, 3, 1024);
        cb.on_page_error("a.pdf", 2, 3, "boom");
        cb.on_file_error("b.pdf", "not a PDF");
        cb.on_batch_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback::default();
        cb.on_batch_start(2);
        cb.on_file_start("a.pdf", 0, 2);
        cb.on_file_pages("a.pdf", 2);
        cb.on_page_complete("a.pdf", 1, 2, 100);
        cb.on_page_error("a.pdf", 2, 2, "bad page");
        cb.on_file_start("b.pdf", 1, 2);
        cb.on_file_error("b.pdf", "wrong type");
        cb.on_batch_complete(1, 1);

        assert_eq!(cb.files.load(Ordering::SeqCst), 2);
        assert_eq!(cb.pages.load(Ordering::SeqCst), 1);
        assert_eq!(cb.page_errors.load(Ordering::SeqCst), 1);
        assert_eq!(cb.file_errors.load(Ordering::SeqCst), 1);
        assert_eq!(cb.final_entries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn SplitProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_page_complete("a.pdf", 1, 1, 10);
    }
}
