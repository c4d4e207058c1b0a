//! Custom error types for scholarcv.
//!
//! All library functions return `Result<T, CvError>`. Field-level problems in
//! publication data never reach this type; they degrade to absent values.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scholarcv operations.
#[derive(Debug, Error)]
pub enum CvError {
    /// Neither a citations CSV nor a Scholar lookup is available
    #[error(
        "No publication source available: {} not found and Scholar lookup is disabled. \
         Export your Google Scholar citations to CSV and place it there, or pass --scholar-id.",
        csv_path.display()
    )]
    SourceUnavailable {
        /// CSV path that was checked
        csv_path: PathBuf,
    },

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by Google Scholar
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Remote returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message
        message: String,
    },

    /// CAPTCHA detected
    #[error("CAPTCHA detected, please import fresh cookies")]
    Captcha,

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Profile YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// DOCX package error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// DOCX markup error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Text rendering error
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `CvError`
pub type Result<T> = std::result::Result<T, CvError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| CvError::Parse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_names_path() {
        let err = CvError::SourceUnavailable {
            csv_path: PathBuf::from("data/citations.csv"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("No publication source available"));
        assert!(msg.contains("data/citations.csv"));
    }

    #[test]
    fn test_ok_or_parse() {
        let missing: Option<u8> = None;
        assert!(matches!(missing.ok_or_parse("gone"), Err(CvError::Parse(m)) if m == "gone"));
        assert_eq!(Some(3).ok_or_parse("unused").ok(), Some(3));
    }
}
