//! Configuration for a split batch.
//!
//! All behaviour is controlled through [`SplitConfig`], built via its
//! [`SplitConfigBuilder`]. Keeping every knob in one struct makes it easy
//! to share a config between the pipeline, the orchestrator, and the CLI,
//! and to log one value that fully describes a run.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults
//! for the rest; new fields never break existing call sites.

use crate::error::SplitError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default cap on a single input file, matching common upload limits.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Default name the finished archive is saved under.
pub const DEFAULT_ARCHIVE_NAME: &str = "pdf-splitted.zip";

/// Configuration for a split batch.
///
/// Built via [`SplitConfig::builder()`] or [`SplitConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfsplit::SplitConfig;
///
/// let config = SplitConfig::builder()
///     .max_file_bytes(10 * 1024 * 1024)
///     .compression_level(9)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SplitConfig {
    /// Media type a file must declare to enter the pipeline. Default:
    /// `application/pdf`.
    ///
    /// This is only the first, cheap stage of validation; the codec
    /// verifies the `%PDF` magic and document structure during parse, so a
    /// lying declaration still fails at the parse step.
    pub expected_media_type: String,

    /// Upper bound on a single file's size in bytes. Default: 100 MiB.
    ///
    /// Oversized files are rejected at file granularity before any parsing
    /// work is spent on them.
    pub max_file_bytes: u64,

    /// Deflate level for archive entries, 0-9. Default: 6.
    ///
    /// The level is fixed per invocation (never "fastest available") so
    /// the same inputs always produce the same archive bytes.
    pub compression_level: i32,

    /// File name the orchestrator saves the archive under.
    /// Default: `pdf-splitted.zip`.
    pub archive_name: String,

    /// Progress event receiver. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            expected_media_type: "application/pdf".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            compression_level: 6,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("expected_media_type", &self.expected_media_type)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("compression_level", &self.compression_level)
            .field("archive_name", &self.archive_name)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SplitConfig`].
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    pub fn expected_media_type(mut self, mime: impl Into<String>) -> Self {
        self.config.expected_media_type = mime.into();
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n.max(1);
        self
    }

    pub fn compression_level(mut self, level: i32) -> Self {
        self.config.compression_level = level.clamp(0, 9);
        self
    }

    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.archive_name = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, SplitError> {
        let c = &self.config;
        if c.expected_media_type.trim().is_empty() {
            return Err(SplitError::InvalidConfig(
                "expected_media_type must not be empty".into(),
            ));
        }
        if !(0..=9).contains(&c.compression_level) {
            return Err(SplitError::InvalidConfig(format!(
                "compression level must be 0-9, got {}",
                c.compression_level
            )));
        }
        if c.archive_name.trim().is_empty() {
            return Err(SplitError::InvalidConfig(
                "archive_name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = SplitConfig::default();
        assert_eq!(c.expected_media_type, "application/pdf");
        assert_eq!(c.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(c.compression_level, 6);
        assert_eq!(c.archive_name, "pdf-splitted.zip");
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_clamps_compression_level() {
        let c = SplitConfig::builder().compression_level(42).build().unwrap();
        assert_eq!(c.compression_level, 9);
        let c = SplitConfig::builder().compression_level(-3).build().unwrap();
        assert_eq!(c.compression_level, 0);
    }

    #[test]
    fn builder_rejects_empty_media_type() {
        let err = SplitConfig::builder()
            .expected_media_type("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_archive_name() {
        let err = SplitConfig::builder().archive_name("").build().unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfig(_)));
    }
}
