//! Archive packer: a per-invocation ZIP session.
//!
//! Entries are written into an in-memory buffer as they arrive and the
//! central directory is emitted on [`ArchiveSession::finalize`]. The
//! session is per-invocation state with no external resource handles, so
//! abandoning it (dropping without finalising) needs no cleanup.
//!
//! ## Why fixed compression settings?
//!
//! Deflate at a fixed level with a fixed entry timestamp makes the output
//! a pure function of the input bytes and entry order: splitting the same
//! files twice produces byte-identical archives, which keeps downloads
//! cacheable and tests exact.

use crate::error::SplitError;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An open archive session. One per `split` invocation.
pub struct ArchiveSession {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    entries: usize,
}

impl ArchiveSession {
    /// Start an empty session. `compression_level` is a Deflate level 0-9.
    pub fn new(compression_level: i32) -> Self {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level))
            .last_modified_time(zip::DateTime::default());
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            entries: 0,
        }
    }

    /// Add one named entry. Ownership of the bytes conceptually transfers
    /// to the archive; the caller does not reuse them.
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), SplitError> {
        self.writer
            .start_file(name, self.options)
            .map_err(|e| SplitError::Pack {
                detail: format!("failed to start entry '{name}': {e}"),
            })?;
        self.writer.write_all(bytes).map_err(|e| SplitError::Pack {
            detail: format!("failed to write entry '{name}': {e}"),
        })?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries added so far.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Emit the central directory and return the finished archive bytes.
    pub fn finalize(mut self) -> Result<Vec<u8>, SplitError> {
        let cursor = self.writer.finish().map_err(|e| SplitError::Pack {
            detail: e.to_string(),
        })?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_entry(archive: &[u8], name: &str) -> Vec<u8> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut file = zip.by_name(name).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn entries_round_trip() {
        let mut session = ArchiveSession::new(6);
        session.add_entry("a-1.pdf", b"first").unwrap();
        session.add_entry("a-2.pdf", b"second").unwrap();
        assert_eq!(session.entry_count(), 2);

        let bytes = session.finalize().unwrap();
        assert_eq!(read_entry(&bytes, "a-1.pdf"), b"first");
        assert_eq!(read_entry(&bytes, "a-2.pdf"), b"second");
    }

    #[test]
    fn entry_order_is_preserved() {
        let mut session = ArchiveSession::new(6);
        for name in ["b-1.pdf", "a-1.pdf", "c-1.pdf"] {
            session.add_entry(name, b"x").unwrap();
        }
        let bytes = session.finalize().unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["b-1.pdf", "a-1.pdf", "c-1.pdf"]);
    }

    #[test]
    fn identical_inputs_produce_identical_archives() {
        let build = || {
            let mut s = ArchiveSession::new(6);
            s.add_entry("a-1.pdf", &[7u8; 2048]).unwrap();
            s.add_entry("a-2.pdf", &[9u8; 512]).unwrap();
            s.finalize().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_session_finalises_to_a_valid_empty_archive() {
        let session = ArchiveSession::new(6);
        let bytes = session.finalize().unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
