//! Publication retrieval: source selection, normalization and the
//! skip-and-continue lookup batch.

use crate::config::SourceConfig;
use crate::error::{CvError, Result};
use crate::publication::{ranked, Publication};
use crate::scholar::{AuthorHandle, AuthorSection, BibEntry, LookupSource};
use crate::store::save_publications;
use crate::tabular::{read_citations, write_citations, CitationRow, ScholarCsvRow};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where this run's publications come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationSource {
    Tabular(PathBuf),
    Lookup { scholar_id: String },
}

/// Pick the source: the CSV file if it exists, else the Scholar lookup if
/// enabled, else [`CvError::SourceUnavailable`].
pub fn resolve_source(config: &SourceConfig) -> Result<PublicationSource> {
    if config.csv_path.is_file() {
        return Ok(PublicationSource::Tabular(config.csv_path.clone()));
    }
    match config.scholar_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(PublicationSource::Lookup {
            scholar_id: id.to_string(),
        }),
        _ => Err(CvError::SourceUnavailable {
            csv_path: config.csv_path.clone(),
        }),
    }
}

/// Normalize CSV rows into a ranked sequence
pub fn normalize_rows(rows: &[CitationRow]) -> Vec<Publication> {
    ranked(rows.iter().map(CitationRow::to_publication).collect())
}

/// Normalize one lookup bibliography
pub fn normalize_bib(bib: &BibEntry) -> Publication {
    Publication::from_raw(
        bib.title.as_deref(),
        bib.author.as_deref(),
        Some(bib.venue()),
        bib.year.as_deref(),
    )
}

/// A record dropped from a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based position in the author's publication list
    pub index: usize,
    pub title: String,
    pub reason: String,
}

/// Result of processing one record inside a batch
pub type RecordOutcome<T> = std::result::Result<T, SkippedRecord>;

/// Successes and skips of a batch, in input order
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> BatchReport<U> {
        BatchReport {
            items: self.items.into_iter().map(f).collect(),
            skipped: self.skipped,
        }
    }
}

impl<T> FromIterator<RecordOutcome<T>> for BatchReport<T> {
    fn from_iter<I: IntoIterator<Item = RecordOutcome<T>>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BatchReport::default(), |mut report, outcome| {
                match outcome {
                    Ok(item) => report.items.push(item),
                    Err(skip) => report.skipped.push(skip),
                }
                report
            })
    }
}

/// Look up an author and fill every publication's bibliography.
///
/// Failing to find the author or list the publications aborts. A failure
/// filling one publication skips only that publication.
pub async fn fill_publications<S: LookupSource>(
    source: &S,
    scholar_id: &str,
) -> Result<(AuthorHandle, BatchReport<BibEntry>)> {
    let author = source.search_by_id(scholar_id).await?;
    let mut author = source
        .fill_author(author, &[AuthorSection::Publications])
        .await?;

    let stubs = std::mem::take(&mut author.publications);
    let total = stubs.len();
    info!(author = %author.name, total, "Filling publications");

    let mut outcomes = Vec::with_capacity(total);
    for (i, stub) in stubs.into_iter().enumerate() {
        let index = i + 1;
        let title = stub.bib.title.clone().unwrap_or_default();
        let outcome = match source.fill_publication(stub).await {
            Ok(filled) => {
                info!("  [{}/{}] {}", index, total, preview(&title, 60));
                Ok(filled.bib)
            }
            Err(e) => {
                warn!(index, title = %title, error = %e, "Error filling publication, skipping");
                Err(SkippedRecord {
                    index,
                    title,
                    reason: e.to_string(),
                })
            }
        };
        outcomes.push(outcome);
    }

    let report: BatchReport<BibEntry> = outcomes.into_iter().collect();
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), total, "Some publications were skipped");
    }
    Ok((author, report))
}

/// Fetch from the lookup source and normalize into a ranked sequence
pub async fn normalize_from_lookup<S: LookupSource>(
    source: &S,
    scholar_id: &str,
) -> Result<BatchReport<Publication>> {
    let (_, report) = fill_publications(source, scholar_id).await?;
    let mut report = report.map(|bib| normalize_bib(&bib));
    report.items = ranked(report.items);
    Ok(report)
}

/// Fetch from the lookup source and write a Scholar-style CSV
pub async fn export_citations<S: LookupSource>(
    source: &S,
    scholar_id: &str,
    output: &Path,
) -> Result<BatchReport<ScholarCsvRow>> {
    let (_, report) = fill_publications(source, scholar_id).await?;
    let report = report.map(|bib| ScholarCsvRow::from(&bib));
    write_citations(output, &report.items)?;
    Ok(report)
}

/// Outcome of a `fetch` run
#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub source: PublicationSource,
    pub written: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Resolve the source, normalize and overwrite the interchange file.
///
/// `connect` builds the lookup client and is only called when the lookup
/// source is selected. Nothing is written unless a source resolves.
pub async fn run_fetch<S, F>(config: &SourceConfig, output: &Path, connect: F) -> Result<FetchSummary>
where
    S: LookupSource,
    F: FnOnce() -> Result<S>,
{
    let source = resolve_source(config)?;

    let report = match &source {
        PublicationSource::Tabular(path) => {
            info!(path = %path.display(), "Using Google Scholar CSV");
            BatchReport {
                items: normalize_rows(&read_citations(path)?),
                skipped: Vec::new(),
            }
        }
        PublicationSource::Lookup { scholar_id } => {
            info!(scholar_id = %scholar_id, "Using Google Scholar lookup");
            let client = connect()?;
            normalize_from_lookup(&client, scholar_id).await?
        }
    };

    save_publications(output, &report.items)?;

    Ok(FetchSummary {
        source,
        written: report.items.len(),
        skipped: report.skipped,
    })
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
