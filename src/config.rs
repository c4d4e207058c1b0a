//! Default locations and source configuration.

use std::path::PathBuf;

/// Google Scholar CSV export, preferred source when present
pub const CITATIONS_CSV: &str = "data/citations.csv";

/// Interchange file of canonical publications
pub const PUBLICATIONS_JSON: &str = "data/publications.json";

/// Hand-authored profile
pub const PROFILE_YAML: &str = "profile.yaml";

/// Rendered CVs
pub const OUTPUT_DIR: &str = "output";

/// Default output of `export-csv`
pub const EXPORT_CSV: &str = "citations.csv";

/// Where publications may come from. The Scholar lookup is enabled by
/// supplying an author id.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub csv_path: PathBuf,
    pub scholar_id: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(CITATIONS_CSV),
            scholar_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_fetched_data_shares_a_directory() {
        let csv_dir = Path::new(CITATIONS_CSV).parent();
        assert_eq!(csv_dir, Path::new(PUBLICATIONS_JSON).parent());
        assert_eq!(csv_dir, Some(Path::new("data")));
        assert_eq!(SourceConfig::default().csv_path, Path::new(CITATIONS_CSV));
        assert!(SourceConfig::default().scholar_id.is_none());
    }
}
