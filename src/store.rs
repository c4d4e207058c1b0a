//! Interchange file of canonical publications.
//!
//! The file is always fully overwritten. Readers re-rank on load because the
//! stored order is not authoritative.

use crate::error::Result;
use crate::publication::{ranked, Publication};
use std::path::Path;
use tracing::{info, warn};

/// Write publications as a pretty-printed JSON array
pub fn save_publications(path: &Path, publications: &[Publication]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(publications)?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), count = publications.len(), "Saved publications");
    Ok(())
}

/// Load and re-rank publications.
///
/// A missing file is not an error: it yields an empty list with a warning so
/// a CV can still be rendered before the first fetch.
pub fn load_publications(path: &Path) -> Result<Vec<Publication>> {
    if !path.exists() {
        warn!(path = %path.display(), "Publications file not found; run 'scholarcv fetch' first");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let publications: Vec<Publication> = serde_json::from_str(&content)?;
    info!(path = %path.display(), count = publications.len(), "Loaded publications");
    Ok(ranked(publications))
}
