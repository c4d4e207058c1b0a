//! Canonical publication record, year coercion, ranking and truncation.
//!
//! Every producer (CSV export, Scholar lookup, the interchange file) converges
//! on [`Publication`]. Ordering is always recomputed with [`rank_publications`];
//! stored order is never trusted.

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical publication record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Title, trimmed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Free-form author list, trimmed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: String,
    /// Journal or proceedings name, trimmed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub venue: String,
    /// Publication year; `None` when missing or malformed
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<u32>,
}

impl Publication {
    /// Build a record from loosely-typed fields. Missing text becomes empty,
    /// all text is trimmed and the year goes through [`coerce_year`].
    pub fn from_raw(
        title: Option<&str>,
        authors: Option<&str>,
        venue: Option<&str>,
        year: Option<&str>,
    ) -> Self {
        Self {
            title: clean_text(title),
            authors: clean_text(authors),
            venue: clean_text(venue),
            year: year.and_then(coerce_year),
        }
    }

    /// Ranking key: unset year counts as 0
    pub fn rank_key(&self) -> (u32, &str) {
        (self.year.unwrap_or(0), self.title.as_str())
    }

    /// Year for display, "n.d." when unset or 0
    pub fn year_label(&self) -> String {
        self.year
            .filter(|&y| y != 0)
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n.d.".to_string())
    }

    /// One-line citation: `Authors (Year). Title. Venue.`
    pub fn citation_line(&self) -> String {
        format!(
            "{} ({}). {}. {}.",
            self.authors,
            self.year_label(),
            self.title,
            self.venue
        )
    }
}

fn clean_text(raw: Option<&str>) -> String {
    raw.unwrap_or("").trim().to_string()
}

/// Parse a raw year value. Never fails: blank, non-numeric, negative or
/// fractional input yields `None`. Integral float text such as `2019.0`
/// (what spreadsheet exports write for numeric columns with gaps) is accepted.
pub fn coerce_year(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(year) = raw.parse::<u32>() {
        return Some(year);
    }
    raw.parse::<f64>().ok().and_then(year_from_f64)
}

fn year_from_f64(value: f64) -> Option<u32> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

/// Coerce a year from any JSON-like scalar
pub fn year_from_value(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().and_then(year_from_f64)),
        serde_json::Value::String(s) => coerce_year(s),
        _ => None,
    }
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(year_from_value))
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Sort in place: year descending, then title descending.
///
/// Stable, so records with identical keys keep their relative order and
/// ranking an already ranked slice changes nothing.
pub fn rank_publications(publications: &mut [Publication]) {
    publications.sort_by(|a, b| b.rank_key().cmp(&a.rank_key()));
}

/// Owned variant of [`rank_publications`]
pub fn ranked(mut publications: Vec<Publication>) -> Vec<Publication> {
    rank_publications(&mut publications);
    publications
}

/// Maximum number of publications a consumer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationLimit {
    /// Keep at most this many
    AtMost(usize),
    /// Keep everything
    Unlimited,
}

impl PublicationLimit {
    /// Take the prefix of a ranked sequence
    pub fn apply<'a>(&self, ranked: &'a [Publication]) -> &'a [Publication] {
        match *self {
            Self::AtMost(n) => &ranked[..n.min(ranked.len())],
            Self::Unlimited => ranked,
        }
    }
}

impl From<Option<usize>> for PublicationLimit {
    fn from(value: Option<usize>) -> Self {
        value.map(Self::AtMost).unwrap_or(Self::Unlimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(title: &str, year: Option<u32>) -> Publication {
        Publication {
            title: title.to_string(),
            year,
            ..Default::default()
        }
    }

    fn titles(pubs: &[Publication]) -> Vec<&str> {
        pubs.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_coerce_year() {
        assert_eq!(coerce_year("2019"), Some(2019));
        assert_eq!(coerce_year(" 2021 "), Some(2021));
        assert_eq!(coerce_year("2019.0"), Some(2019));
        assert_eq!(coerce_year("0"), Some(0));
        assert_eq!(coerce_year(""), None);
        assert_eq!(coerce_year("   "), None);
        assert_eq!(coerce_year("in press"), None);
        assert_eq!(coerce_year("2019.5"), None);
        assert_eq!(coerce_year("-3"), None);
        assert_eq!(coerce_year("NaN"), None);
    }

    #[test]
    fn test_from_raw_trims_and_defaults() {
        let p = Publication::from_raw(Some("  Deep Nets \n"), None, Some("\tNature "), Some("n/a"));
        assert_eq!(p.title, "Deep Nets");
        assert_eq!(p.authors, "");
        assert_eq!(p.venue, "Nature");
        assert_eq!(p.year, None);
    }

    #[test]
    fn test_tie_break_descending_title() {
        let pubs = ranked(vec![publication("Apple", Some(2020)), publication("Banana", Some(2020))]);
        assert_eq!(titles(&pubs), vec!["Banana", "Apple"]);
    }

    #[test]
    fn test_year_beats_title() {
        let pubs = ranked(vec![publication("Zeta", Some(2019)), publication("Alpha", Some(2020))]);
        assert_eq!(titles(&pubs), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_unset_year_ranks_last_but_stays_unset() {
        let pubs = ranked(vec![
            publication("Zzz", None),
            publication("Aaa", Some(1)),
            publication("Mmm", None),
        ]);
        assert_eq!(titles(&pubs), vec!["Aaa", "Zzz", "Mmm"]);
        assert_eq!(pubs[1].year, None);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let input = vec![
            publication("B", Some(2018)),
            publication("A", None),
            publication("C", Some(2018)),
            publication("D", Some(2022)),
        ];
        let once = ranked(input.clone());
        let twice = ranked(once.clone());
        assert_eq!(once, twice);
        assert_eq!(ranked(input), once);
    }

    #[test]
    fn test_limit_prefix() {
        let pubs = ranked(vec![
            publication("A", Some(2001)),
            publication("B", Some(2002)),
            publication("C", Some(2003)),
        ]);
        assert_eq!(titles(PublicationLimit::AtMost(2).apply(&pubs)), vec!["C", "B"]);
        assert_eq!(PublicationLimit::AtMost(10).apply(&pubs).len(), 3);
        assert_eq!(PublicationLimit::AtMost(0).apply(&pubs).len(), 0);
        assert_eq!(PublicationLimit::Unlimited.apply(&pubs), &pubs[..]);
        assert_eq!(PublicationLimit::from(None), PublicationLimit::Unlimited);
    }

    #[test]
    fn test_citation_line() {
        let p = Publication {
            title: "On Things".into(),
            authors: "A. Author".into(),
            venue: "J. Stuff".into(),
            year: None,
        };
        assert_eq!(p.citation_line(), "A. Author (n.d.). On Things. J. Stuff.");
    }

    #[test]
    fn test_year_zero_displays_as_undated() {
        let p = Publication {
            title: "Draft".into(),
            authors: "A".into(),
            year: Some(0),
            ..Default::default()
        };
        assert_eq!(p.year_label(), "n.d.");
        assert_eq!(p.citation_line(), "A (n.d.). Draft. .");
        assert_eq!(p.year, Some(0));
        assert_eq!(publication("X", Some(1999)).year_label(), "1999");
    }

    #[test]
    fn test_serialize_unset_year_as_null() -> serde_json::Result<()> {
        let json = serde_json::to_value(publication("T", None))?;
        assert_eq!(json["year"], serde_json::Value::Null);
        Ok(())
    }

    #[test]
    fn test_lenient_deserialize() -> serde_json::Result<()> {
        let pubs: Vec<Publication> = serde_json::from_str(
            r#"[{"title": null, "authors": " X ", "year": "2017"},
                {"title": "T", "venue": "V", "year": 2015.0},
                {"title": "U", "year": "soon"}]"#,
        )?;
        assert_eq!(pubs[0].title, "");
        assert_eq!(pubs[0].authors, "X");
        assert_eq!(pubs[0].year, Some(2017));
        assert_eq!(pubs[1].year, Some(2015));
        assert_eq!(pubs[2].year, None);
        assert_eq!(pubs[2].venue, "");
        Ok(())
    }
}
