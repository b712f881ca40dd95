//! Uploader orchestrator: routes submissions to the pipeline or the queue.
//!
//! The orchestrator is the root of the component graph. On submit it
//! consults the [`ConnectivityMonitor`]: when reachable it runs the split
//! pipeline and hands the archive to the host's save step; when
//! unreachable it skips the pipeline entirely, persists the file set, and
//! reports a distinct queued status rather than an error.
//!
//! Files are passed by reference and never consumed, so after any failure
//! the caller's selected file set is intact for a retry.

use crate::config::SplitConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::SplitError;
use crate::output::{SourceFile, SplitOutput};
use crate::split;
use crate::store::{OfflineStore, OperationKind, QueuedOperation};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Host-provided "save as download" capability.
///
/// The orchestrator wraps any failure into [`SplitError::Save`], so
/// implementations just return the underlying I/O error.
pub trait ArchiveSaver: Send + Sync {
    fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<()>;
}

/// Saves archives into a fixed directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArchiveSaver for DirectorySaver {
    fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(filename), bytes)
    }
}

/// What happened to a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The pipeline ran and the archive was saved.
    Completed {
        output: SplitOutput,
        saved_as: String,
    },
    /// The host was unreachable; the work is queued for later.
    Queued {
        /// Durable queue id, when a store was attached and the write
        /// succeeded.
        operation_id: Option<u64>,
        files: usize,
    },
}

/// Wires user submissions to the split pipeline or the offline queue.
pub struct Uploader {
    config: SplitConfig,
    monitor: Arc<ConnectivityMonitor>,
    saver: Arc<dyn ArchiveSaver>,
    store: Option<Arc<OfflineStore>>,
}

impl Uploader {
    pub fn new(
        config: SplitConfig,
        monitor: Arc<ConnectivityMonitor>,
        saver: Arc<dyn ArchiveSaver>,
    ) -> Self {
        Self {
            config,
            monitor,
            saver,
            store: None,
        }
    }

    /// Attach a persistent store for file caching and the offline queue.
    pub fn with_store(mut self, store: Arc<OfflineStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Submit a batch of files.
    ///
    /// Reachable: cache the files (best-effort), split, save, report
    /// [`SubmitOutcome::Completed`]. Unreachable: queue the operation and
    /// report [`SubmitOutcome::Queued`].
    ///
    /// Store failures are logged and swallowed: they degrade offline
    /// resilience but never block a split that can run right now.
    pub async fn submit(&self, files: &[SourceFile]) -> Result<SubmitOutcome, SplitError> {
        if files.is_empty() {
            return Err(SplitError::NoOutput {
                files: 0,
                first_error: "no files were submitted".to_string(),
            });
        }

        // Cache submitted bytes so the batch survives a restart. This is
        // best-effort on both paths: quota or permission failures must not
        // stop a split that is otherwise able to run.
        if let Some(ref store) = self.store {
            for file in files {
                if let Err(e) = store.store_file(file).await {
                    warn!("file cache degraded for '{}': {e}", file.name);
                }
            }
        }

        if !self.monitor.is_reachable() {
            let kind = OperationKind::Split {
                file_names: files.iter().map(|f| f.name.clone()).collect(),
            };

            let operation_id = match self.store {
                Some(ref store) => match store.enqueue_operation(kind.clone()).await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!("offline queue degraded: {e}");
                        None
                    }
                },
                None => None,
            };
            self.monitor.add_pending_operation(kind);

            info!("unreachable: queued {} file(s) for later", files.len());
            return Ok(SubmitOutcome::Queued {
                operation_id,
                files: files.len(),
            });
        }

        let output = split::split(files, &self.config).await?;

        let filename = self.config.archive_name.clone();
        self.saver
            .save(&output.archive, &filename)
            .map_err(|e| SplitError::Save {
                filename: filename.clone(),
                detail: e.to_string(),
            })?;

        info!("archive saved as '{filename}'");
        Ok(SubmitOutcome::Completed {
            output,
            saved_as: filename,
        })
    }

    /// Rebuild `SourceFile`s from the persistent cache.
    ///
    /// Call after a restart to recover a batch that was selected while
    /// unreachable. Records whose payload is missing are skipped; an
    /// absent or unavailable store yields an empty list.
    pub async fn restore_cached(&self) -> Vec<SourceFile> {
        let Some(ref store) = self.store else {
            return Vec::new();
        };
        let mut files = Vec::new();
        for meta in store.cached_files().await {
            match store.load_file_bytes(meta.id).await {
                Some(bytes) => files.push(SourceFile::new(meta.name, meta.media_type, bytes)),
                None => warn!("cached file {} has no payload, skipping", meta.id),
            }
        }
        files
    }

    /// Inspect and drain the offline queue after reachability returns.
    ///
    /// Returns the queued operations and clears them from both the durable
    /// store and the monitor's in-memory list. Replaying them through the
    /// pipeline is left to the caller; this method only hands them over.
    /// Returns an empty list while still unreachable.
    pub async fn drain_reconnected(&self) -> Vec<QueuedOperation> {
        if !self.monitor.is_reachable() {
            return Vec::new();
        }

        let mut drained = Vec::new();
        if let Some(ref store) = self.store {
            drained = store.queued_operations().await;
            for op in &drained {
                store.clear_operation(op.id).await;
            }
        }
        self.monitor.clear_pending_operations();

        if !drained.is_empty() {
            info!("drained {} queued operation(s)", drained.len());
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every save call; optionally refuses them.
    #[derive(Default)]
    struct RecordingSaver {
        saved: Mutex<Vec<(String, usize)>>,
        fail: bool,
    }

    impl ArchiveSaver for RecordingSaver {
        fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<()> {
            if self.fail {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                ));
            }
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), bytes.len()));
            Ok(())
        }
    }

    fn one_page_pdf(name: &str) -> SourceFile {
        use lopdf::{dictionary, Object, Stream};
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        SourceFile::new(name, "application/pdf", buf)
    }

    fn uploader(reachable: bool, saver: Arc<RecordingSaver>) -> (Uploader, Arc<ConnectivityMonitor>) {
        let monitor = Arc::new(ConnectivityMonitor::new(reachable));
        let uploader = Uploader::new(SplitConfig::default(), Arc::clone(&monitor), saver);
        (uploader, monitor)
    }

    #[tokio::test]
    async fn reachable_submit_splits_and_saves() {
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = uploader(true, Arc::clone(&saver));

        let outcome = uploader.submit(&[one_page_pdf("a.pdf")]).await.unwrap();
        match outcome {
            SubmitOutcome::Completed { output, saved_as } => {
                assert_eq!(saved_as, "pdf-splitted.zip");
                assert_eq!(output.stats.pages_extracted, 1);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(saver.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_submit_queues_without_running_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = uploader(false, Arc::clone(&saver));
        let store = Arc::new(OfflineStore::new(dir.path()));
        let uploader = uploader.with_store(Arc::clone(&store));

        let files = [one_page_pdf("a.pdf")];
        let outcome = uploader.submit(&files).await.unwrap();

        match outcome {
            SubmitOutcome::Queued {
                operation_id,
                files,
            } => {
                assert!(operation_id.is_some());
                assert_eq!(files, 1);
            }
            other => panic!("expected Queued, got {other:?}"),
        }

        // Pipeline and save step were never touched.
        assert!(saver.saved.lock().unwrap().is_empty());
        // The operation and the file copy are durable.
        assert_eq!(store.queued_operations().await.len(), 1);
        assert_eq!(store.cached_files().await.len(), 1);
        // The caller's file set is intact for retry.
        assert_eq!(files[0].name, "a.pdf");
    }

    #[tokio::test]
    async fn store_failure_does_not_block_a_reachable_split() {
        let dir = tempfile::tempdir().unwrap();
        // Root under a regular file: every store write fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let store = Arc::new(OfflineStore::new(blocker.join("sub")));

        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = uploader(true, Arc::clone(&saver));
        let uploader = uploader.with_store(store);

        let outcome = uploader.submit(&[one_page_pdf("a.pdf")]).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert_eq!(saver.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_failure_surfaces_as_save_error() {
        let saver = Arc::new(RecordingSaver {
            fail: true,
            ..RecordingSaver::default()
        });
        let (uploader, _) = uploader(true, saver);

        let err = uploader.submit(&[one_page_pdf("a.pdf")]).await.unwrap_err();
        match err {
            SplitError::Save { filename, detail } => {
                assert_eq!(filename, "pdf-splitted.zip");
                assert!(detail.contains("disk full"));
            }
            other => panic!("expected Save, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn drain_after_reconnect_clears_store_and_monitor() {
        let dir = tempfile::tempdir().unwrap();
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, monitor) = uploader(false, saver);
        let store = Arc::new(OfflineStore::new(dir.path()));
        let uploader = uploader.with_store(Arc::clone(&store));

        uploader.submit(&[one_page_pdf("a.pdf")]).await.unwrap();
        uploader.submit(&[one_page_pdf("b.pdf")]).await.unwrap();

        // Still unreachable: nothing drains.
        assert!(uploader.drain_reconnected().await.is_empty());
        assert_eq!(store.queued_operations().await.len(), 2);

        monitor.set_reachable(true);
        let drained = uploader.drain_reconnected().await;
        assert_eq!(drained.len(), 2);
        assert!(store.queued_operations().await.is_empty());
        assert!(monitor.pending_operations().is_empty());

        // Draining again is a no-op.
        assert!(uploader.drain_reconnected().await.is_empty());
    }

    #[tokio::test]
    async fn cached_batch_is_restorable_after_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = uploader(false, saver);
        let original = one_page_pdf("a.pdf");
        {
            let store = Arc::new(OfflineStore::new(dir.path()));
            let uploader = uploader.with_store(store);
            uploader.submit(std::slice::from_ref(&original)).await.unwrap();
        }

        // A fresh store over the same root stands in for a restart.
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = self::uploader(false, saver);
        let uploader = uploader.with_store(Arc::new(OfflineStore::new(dir.path())));

        let restored = uploader.restore_cached().await;
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].name, "a.pdf");
        assert_eq!(restored[0].bytes, original.bytes);
        assert_eq!(restored[0].media_type, "application/pdf");
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let saver = Arc::new(RecordingSaver::default());
        let (uploader, _) = uploader(true, saver);
        let err = uploader.submit(&[]).await.unwrap_err();
        assert!(matches!(err, SplitError::NoOutput { files: 0, .. }));
    }

    #[tokio::test]
    async fn directory_saver_writes_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path().join("downloads"));
        saver.save(b"zipbytes", "pdf-splitted.zip").unwrap();
        let written = std::fs::read(dir.path().join("downloads/pdf-splitted.zip")).unwrap();
        assert_eq!(written, b"zipbytes");
    }
}
