//! Google Scholar CSV export: reading citation rows and writing them back.

use crate::error::Result;
use crate::publication::Publication;
use crate::scholar::BibEntry;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Column order of the Scholar-style CSV written by `export-csv`
pub const CITATION_COLUMNS: &[&str] = &[
    "Authors",
    "Title",
    "Publication",
    "Volume",
    "Number",
    "Pages",
    "Year",
    "Publisher",
];

/// The columns of a Scholar CSV export that feed a [`Publication`].
/// Any other column is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitationRow {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Authors", default)]
    pub authors: Option<String>,
    #[serde(rename = "Publication", default)]
    pub publication: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
}

impl CitationRow {
    /// Normalize into the canonical record
    pub fn to_publication(&self) -> Publication {
        Publication::from_raw(
            self.title.as_deref(),
            self.authors.as_deref(),
            self.publication.as_deref(),
            self.year.as_deref(),
        )
    }
}

/// Read every row of a citations CSV file
pub fn read_citations(path: &Path) -> Result<Vec<CitationRow>> {
    let file = std::fs::File::open(path)?;
    let rows = read_citations_from(file)?;
    info!(path = %path.display(), rows = rows.len(), "Read citations CSV");
    Ok(rows)
}

/// Read citation rows from any reader with a header line
pub fn read_citations_from<R: Read>(reader: R) -> Result<Vec<CitationRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    debug!(columns = ?headers, "CSV header");

    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// One row of the Scholar-style CSV written from lookup results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScholarCsvRow {
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication")]
    pub publication: String,
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Pages")]
    pub pages: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
}

impl From<&BibEntry> for ScholarCsvRow {
    fn from(bib: &BibEntry) -> Self {
        let text = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_string();
        Self {
            authors: text(&bib.author),
            title: text(&bib.title),
            publication: bib.venue().to_string(),
            volume: text(&bib.volume),
            number: text(&bib.number),
            pages: text(&bib.pages),
            year: text(&bib.year),
            publisher: text(&bib.publisher),
        }
    }
}

/// Write rows to a CSV file. The header is written even when there are no rows.
pub fn write_citations(path: &Path, rows: &[ScholarCsvRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(CITATION_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote citations CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = "\
Authors,Title,Publication,Volume,Number,Pages,Publisher,Year
\"Doe, J and Roe, R\", Deep Things ,Nature,1,2,3-4,NPG,2019
Solo,Missing Year,Workshop,,,,,
Solo,Float Year, ,,,,,2018.0
";

    #[test]
    fn test_read_export_columns() -> Result<()> {
        let rows = read_citations_from(EXPORT.as_bytes())?;
        assert_eq!(rows.len(), 3);

        let first = rows[0].to_publication();
        assert_eq!(first.title, "Deep Things");
        assert_eq!(first.authors, "Doe, J and Roe, R");
        assert_eq!(first.venue, "Nature");
        assert_eq!(first.year, Some(2019));

        assert_eq!(rows[1].to_publication().year, None);

        let third = rows[2].to_publication();
        assert_eq!(third.venue, "");
        assert_eq!(third.year, Some(2018));
        Ok(())
    }

    #[test]
    fn test_missing_columns_are_absent() -> Result<()> {
        let rows = read_citations_from("Title,Citations\nOnly Title,12\n".as_bytes())?;
        let p = rows[0].to_publication();
        assert_eq!(p.title, "Only Title");
        assert_eq!(p.authors, "");
        assert_eq!(p.venue, "");
        assert_eq!(p.year, None);
        Ok(())
    }

    #[test]
    fn test_write_header_without_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("citations.csv");
        write_citations(&path, &[])?;
        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.trim_end(), CITATION_COLUMNS.join(","));
        Ok(())
    }

    #[test]
    fn test_write_then_read_back() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("citations.csv");
        let bib = BibEntry {
            title: Some(" Graph Things ".into()),
            author: Some("A and B".into()),
            booktitle: Some("ICML".into()),
            year: Some("2020".into()),
            ..Default::default()
        };
        write_citations(&path, &[ScholarCsvRow::from(&bib)])?;

        let rows = read_citations(&path)?;
        let p = rows[0].to_publication();
        assert_eq!(p.title, "Graph Things");
        assert_eq!(p.venue, "ICML");
        assert_eq!(p.year, Some(2020));
        Ok(())
    }
}
