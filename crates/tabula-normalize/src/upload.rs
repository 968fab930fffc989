//! Checks for files attached to `pdf_upload` cells.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The only accepted MIME type.
pub const PDF_MIME: &str = "application/pdf";

/// Leading bytes of every PDF document.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Reason an upload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UploadIssue {
    /// File exceeds [`MAX_UPLOAD_BYTES`].
    #[error("file is too large ({size} bytes, at most {max} bytes allowed)")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed maximum in bytes.
        max: u64,
    },

    /// Declared MIME type is not [`PDF_MIME`].
    #[error("only PDF files are allowed, got '{mime}'")]
    WrongMime {
        /// Declared MIME type.
        mime: String,
    },

    /// File name does not end in `.pdf`.
    #[error("file name '{name}' must end with .pdf")]
    WrongExtension {
        /// Offending file name.
        name: String,
    },

    /// Content does not start with [`PDF_MAGIC`].
    #[error("file content is not a PDF document")]
    MissingMagic,
}

/// Outcome of [`validate_pdf_upload`]. Collects every problem, not just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadCheck {
    pub issues: Vec<UploadIssue>,
}

impl UploadCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate a candidate upload.
pub fn validate_pdf_upload(file_name: &str, mime: &str, bytes: &[u8]) -> UploadCheck {
    let mut issues = Vec::new();

    let size = bytes.len() as u64;
    if size > MAX_UPLOAD_BYTES {
        issues.push(UploadIssue::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    if !mime.trim().eq_ignore_ascii_case(PDF_MIME) {
        issues.push(UploadIssue::WrongMime {
            mime: mime.to_string(),
        });
    }
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        issues.push(UploadIssue::WrongExtension {
            name: file_name.to_string(),
        });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        issues.push(UploadIssue::MissingMagic);
    }

    if !issues.is_empty() {
        tracing::debug!(file_name, issues = issues.len(), "Rejected upload");
    }
    UploadCheck { issues }
}

/// Make a user-supplied file name safe to use as a storage path segment.
///
/// Strips path separators, `..` sequences and characters reserved on common
/// file systems, collapses whitespace runs to `_` and lowercases the result.
/// Names that end up empty (or as a bare `.pdf`) are replaced with
/// `file_<unix millis>.pdf`.
pub fn sanitize_file_name(name: &str, now: DateTime<Utc>) -> String {
    let without_separators: String = name.chars().filter(|&c| !matches!(c, '/' | '\\')).collect();
    let without_parents = without_separators.replace("..", "");

    let mut sanitized = String::with_capacity(without_parents.len());
    let mut in_whitespace = false;
    for c in without_parents.chars() {
        if matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        sanitized.extend(c.to_lowercase());
    }

    if sanitized.is_empty() || sanitized == ".pdf" {
        return format!("file_{}.pdf", now.timestamp_millis());
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.7\n...".to_vec()
    }

    #[test]
    fn test_valid_pdf() {
        let check = validate_pdf_upload("Report.PDF", "application/pdf", &pdf_bytes());
        assert!(check.is_valid(), "{:?}", check.issues);
    }

    #[test]
    fn test_collects_every_issue() {
        let check = validate_pdf_upload("notes.txt", "text/plain", b"hello");
        assert_eq!(
            check.issues,
            vec![
                UploadIssue::WrongMime {
                    mime: "text/plain".into()
                },
                UploadIssue::WrongExtension {
                    name: "notes.txt".into()
                },
                UploadIssue::MissingMagic,
            ]
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let mut bytes = pdf_bytes();
        bytes.resize(MAX_UPLOAD_BYTES as usize, 0);
        assert!(validate_pdf_upload("a.pdf", PDF_MIME, &bytes).is_valid());

        bytes.push(0);
        let check = validate_pdf_upload("a.pdf", PDF_MIME, &bytes);
        assert!(matches!(check.issues.as_slice(), [UploadIssue::TooLarge { .. }]));
    }

    #[test]
    fn test_sanitize_file_name() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            sanitize_file_name("../My  Report:v2?.pdf", now),
            "my_reportv2.pdf"
        );
        assert_eq!(sanitize_file_name("a\\b/c.PDF", now), "abc.pdf");
        assert_eq!(sanitize_file_name("..", now), "file_1700000000000.pdf");
        assert_eq!(sanitize_file_name("<>.pdf", now), "file_1700000000000.pdf");
    }
}
