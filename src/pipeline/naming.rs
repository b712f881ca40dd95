//! Archive entry naming: sanitisation, page-number padding, collision
//! handling.
//!
//! File names arrive from the user's machine and can carry anything: path
//! prefixes, control characters, NUL bytes. [`sanitize`] reduces a name to
//! the character set `[A-Za-z0-9.-]` (everything else becomes `_`) so the
//! derived archive entry names can never smuggle directory traversal or
//! terminal escapes into whatever later unpacks the archive.
//!
//! Entry names follow the fixed scheme `{base}-{page}.pdf`, with the page
//! number zero-padded to the decimal width of the document's page count so
//! lexical and numeric ordering of entries agree.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Maximum length of a sanitised name, in characters.
const MAX_NAME_LEN: usize = 255;

/// C0 and C1 control characters, plus DEL.
static RE_CONTROL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x00-\x1F\x7F-\x{9F}]").unwrap());

/// Anything outside the allowed archive-name alphabet.
static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9.-]").unwrap());

/// Sanitise a user-supplied file name for use inside an archive.
///
/// Transformations, in order (each operates on the previous step's
/// output):
///
/// 1. keep only the final path segment (split on both `/` and `\`)
/// 2. drop NUL bytes
/// 3. drop C0/C1 control characters
/// 4. replace every remaining character outside `[A-Za-z0-9.-]` with `_`
/// 5. truncate to 255 characters
///
/// Pure and idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(name: &str) -> String {
    let segment = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let without_nul = segment.replace('\0', "");
    let without_control = RE_CONTROL.replace_all(&without_nul, "");
    let safe = RE_UNSAFE.replace_all(&without_control, "_");
    // Everything left is ASCII, so char count == byte count.
    safe.chars().take(MAX_NAME_LEN).collect()
}

/// Sanitise a file name and strip a trailing `.pdf` (case-insensitive).
///
/// A name that sanitises to nothing (all control characters, or a bare
/// path separator) falls back to `document` so the entry scheme still
/// produces a usable name.
pub fn base_name(file_name: &str) -> String {
    let sanitized = sanitize(file_name);
    let stripped = match sanitized.len().checked_sub(4) {
        Some(cut) if sanitized[cut..].eq_ignore_ascii_case(".pdf") => &sanitized[..cut],
        _ => sanitized.as_str(),
    };
    if stripped.is_empty() {
        "document".to_string()
    } else {
        stripped.to_string()
    }
}

/// Zero-pad width for page numbers: the decimal digit count of the page
/// count (1 for <10, 2 for <100, 3 for <1000, and so on).
pub fn page_number_width(page_count: usize) -> usize {
    let mut width = 1;
    let mut n = page_count;
    while n >= 10 {
        width += 1;
        n /= 10;
    }
    width
}

/// Archive entry name for one page. `page_num` is 1-based.
pub fn entry_name(base: &str, page_num: usize, width: usize) -> String {
    format!("{base}-{page_num:0width$}.pdf")
}

/// Allocates unique base names within one split invocation.
///
/// Two distinct source files can sanitise to the identical base name
/// (`A.pdf` and `a.pdf` both become `a` on a case-insensitive rendering,
/// or literally collide after `_` substitution). Silently reusing the
/// base would let later pages overwrite earlier ones inside the archive,
/// so the second and subsequent takers get an `-{ordinal}` discriminator,
/// retried until the result is itself unused.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique base name for `file_name`.
    pub fn allocate(&mut self, file_name: &str) -> String {
        let base = base_name(file_name);
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut ordinal = 2usize;
        loop {
            let candidate = format!("{base}-{ordinal}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            ordinal += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_prefixes() {
        assert_eq!(sanitize("/etc/passwd"), "passwd");
        assert_eq!(sanitize("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize("dir/sub/file.pdf"), "file.pdf");
    }

    #[test]
    fn removes_nul_and_control_characters() {
        assert_eq!(sanitize("a\0b.pdf"), "ab.pdf");
        assert_eq!(sanitize("a\x07b\x1b[31m.pdf"), "ab_31m.pdf");
        assert_eq!(sanitize("a\u{9c}b.pdf"), "ab.pdf");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize("my report (final).pdf"), "my_report__final_.pdf");
        assert_eq!(sanitize("café.pdf"), "caf_.pdf");
    }

    #[test]
    fn truncates_to_255() {
        let long = "x".repeat(400);
        assert_eq!(sanitize(&long).len(), 255);
    }

    #[test]
    fn sanitize_is_idempotent() {
        for name in [
            "/etc/passwd",
            "my report (final).pdf",
            "a\0b\x1b.pdf",
            "café.pdf",
            "",
            "plain.pdf",
        ] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn base_name_strips_pdf_suffix_case_insensitively() {
        assert_eq!(base_name("report.pdf"), "report");
        assert_eq!(base_name("REPORT.PDF"), "REPORT");
        assert_eq!(base_name("archive.tar"), "archive.tar");
        assert_eq!(base_name(".pdf"), "document");
        assert_eq!(base_name("\0\x01"), "document");
    }

    #[test]
    fn width_follows_digit_count() {
        assert_eq!(page_number_width(1), 1);
        assert_eq!(page_number_width(9), 1);
        assert_eq!(page_number_width(10), 2);
        assert_eq!(page_number_width(99), 2);
        assert_eq!(page_number_width(100), 3);
        assert_eq!(page_number_width(1000), 4);
    }

    #[test]
    fn entry_names_are_zero_padded() {
        assert_eq!(entry_name("a", 1, 1), "a-1.pdf");
        assert_eq!(entry_name("report", 3, 2), "report-03.pdf");
        assert_eq!(entry_name("book", 12, 3), "book-012.pdf");
    }

    #[test]
    fn allocator_disambiguates_collisions() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("a.pdf"), "a");
        assert_eq!(names.allocate("a.pdf"), "a-2");
        assert_eq!(names.allocate("a.pdf"), "a-3");
        // A file literally named a-2.pdf collides with the discriminated
        // name and gets pushed one further.
        assert_eq!(names.allocate("a-2.pdf"), "a-2-2");
        assert_eq!(names.allocate("b.pdf"), "b");
    }
}
