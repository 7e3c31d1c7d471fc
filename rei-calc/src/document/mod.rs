//! Deal documents.
//!
//! Deals are saved as plain markdown so they can be edited by hand, and read
//! back with a tolerant parser. JSON is accepted wherever a path ends in
//! `.json`.

mod parser;
mod writer;

use std::path::{Path, PathBuf};

use crate::analysis::DealInputs;
use crate::sanitize::{sanitize_text, MAX_FIELD_LEN, MAX_NOTES_LEN};

pub use parser::from_markdown;
pub use writer::to_markdown;

/// Largest document accepted, in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 256 * 1024;

/// Document errors.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: '{value}' is not a valid number for '{label}'")]
    InvalidNumber {
        line: usize,
        label: String,
        value: String,
    },

    #[error("Line {line}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, value: String },

    #[error("Document is empty")]
    Empty,

    #[error("Document is {size} bytes; the limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Json,
}

impl DocumentFormat {
    /// `.json` is JSON; everything else is markdown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Markdown,
        }
    }
}

/// Render a deal in the given format.
pub fn render(deal: &DealInputs, format: DocumentFormat) -> Result<String, DocumentError> {
    match format {
        DocumentFormat::Markdown => Ok(to_markdown(deal)),
        DocumentFormat::Json => Ok(serde_json::to_string_pretty(deal)?),
    }
}

/// Parse a deal from text in the given format.
pub fn parse(text: &str, format: DocumentFormat) -> Result<DealInputs, DocumentError> {
    if text.len() > MAX_DOCUMENT_BYTES {
        return Err(DocumentError::TooLarge {
            size: text.len(),
            max: MAX_DOCUMENT_BYTES,
        });
    }
    match format {
        DocumentFormat::Markdown => from_markdown(text),
        DocumentFormat::Json => {
            if text.trim().is_empty() {
                return Err(DocumentError::Empty);
            }
            let mut deal: DealInputs = serde_json::from_str(text)?;
            sanitize_fields(&mut deal);
            Ok(deal)
        }
    }
}

/// Clean the free-text fields of a deal in place.
pub fn sanitize_fields(deal: &mut DealInputs) {
    deal.name = sanitize_text(&deal.name, MAX_FIELD_LEN);
    deal.address = sanitize_text(&deal.address, MAX_FIELD_LEN);
    deal.notes = sanitize_text(&deal.notes, MAX_NOTES_LEN);
}

/// Write a deal to `path`, creating parent directories.
pub fn save(path: &Path, deal: &DealInputs) -> Result<(), DocumentError> {
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = render(deal, DocumentFormat::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, text).map_err(io_err)?;

    tracing::info!(path = %path.display(), deal = %deal.name, "Deal saved");
    Ok(())
}

/// Read a deal from `path`.
pub fn load(path: &Path) -> Result<DealInputs, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let deal = parse(&text, DocumentFormat::from_path(path))?;

    tracing::debug!(path = %path.display(), deal = %deal.name, "Deal loaded");
    Ok(deal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/deal.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("deal.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("deal.md")), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::from_path(Path::new("deal")), DocumentFormat::Markdown);
    }

    #[test]
    fn test_parse_rejects_oversized() {
        let text = "x".repeat(MAX_DOCUMENT_BYTES + 1);
        let err = parse(&text, DocumentFormat::Markdown).unwrap_err();
        assert!(matches!(err, DocumentError::TooLarge { .. }));
    }

    #[test]
    fn test_parse_json() {
        let deal = parse(
            r#"{"name": "<b>Lot 4</b>", "property": {"purchase_price": 90000}}"#,
            DocumentFormat::Json,
        )
        .unwrap();
        assert_eq!(deal.name, "Lot 4");
        assert_eq!(deal.property.purchase_price, 90_000.0);

        assert!(matches!(
            parse("  ", DocumentFormat::Json),
            Err(DocumentError::Empty)
        ));
        assert!(matches!(
            parse("{", DocumentFormat::Json),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/deal.md")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/deal.md"));
    }
}
