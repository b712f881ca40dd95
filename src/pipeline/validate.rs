//! Input validation: declared media type and size limit.
//!
//! This is deliberately only the first stage of a two-stage check. A
//! declared media type is caller-supplied and cannot be trusted on its
//! own; the structural stage (magic bytes plus a real parse) lives in
//! [`crate::pipeline::codec`]. Splitting the stages keeps the cheap
//! rejection cheap: an obviously mislabelled or oversized file never
//! reaches the parser.

use crate::config::SplitConfig;
use crate::error::FileError;
use crate::output::SourceFile;

/// Check a file's declared media type and size against the config.
///
/// Rejections are file-level: the caller records the error and continues
/// with the next file in the batch.
pub fn validate(file: &SourceFile, config: &SplitConfig) -> Result<(), FileError> {
    let declared = file.media_type.trim();
    if !declared.eq_ignore_ascii_case(config.expected_media_type.trim()) {
        return Err(FileError::InvalidMediaType {
            file: file.name.clone(),
            declared: file.media_type.clone(),
            expected: config.expected_media_type.clone(),
        });
    }

    if file.byte_len() > config.max_file_bytes {
        return Err(FileError::TooLarge {
            file: file.name.clone(),
            size: file.byte_len(),
            max: config.max_file_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_file(media_type: &str, len: usize) -> SourceFile {
        SourceFile::new("a.pdf", media_type, vec![0u8; len])
    }

    #[test]
    fn accepts_expected_type() {
        let config = SplitConfig::default();
        assert!(validate(&pdf_file("application/pdf", 4), &config).is_ok());
    }

    #[test]
    fn media_type_comparison_is_case_insensitive() {
        let config = SplitConfig::default();
        assert!(validate(&pdf_file("Application/PDF", 4), &config).is_ok());
    }

    #[test]
    fn rejects_wrong_type() {
        let config = SplitConfig::default();
        let err = validate(&pdf_file("text/plain", 4), &config).unwrap_err();
        assert!(matches!(err, FileError::InvalidMediaType { .. }));
    }

    #[test]
    fn rejects_oversized_file() {
        let config = SplitConfig::builder().max_file_bytes(8).build().unwrap();
        let err = validate(&pdf_file("application/pdf", 9), &config).unwrap_err();
        match err {
            FileError::TooLarge { size, max, .. } => {
                assert_eq!(size, 9);
                assert_eq!(max, 8);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        let config = SplitConfig::builder().max_file_bytes(8).build().unwrap();
        assert!(validate(&pdf_file("application/pdf", 8), &config).is_ok());
    }
}
