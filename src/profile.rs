//! Hand-authored CV profile, loaded from YAML.
//!
//! Only `name` is required. Every list defaults to empty so a partial profile
//! still renders.

use crate::error::Result;
use crate::publication::PublicationLimit;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

/// Publications shown in the short CV when the profile does not say
pub const DEFAULT_SHORT_MAX_PUBLICATIONS: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub positions: Positions,
    #[serde(default)]
    pub research_interests: Vec<String>,
    #[serde(default)]
    pub teaching: Teaching,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub awards: Vec<Award>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub config: CvConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub title: String,
    pub department: String,
    pub institution: String,
    pub campus: String,
    pub city_country: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

impl Contact {
    /// Non-empty contact lines in display order
    pub fn lines(&self) -> Vec<String> {
        let joined = |a: &str, b: &str| {
            [a, b]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let labelled = |label: &str, value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                format!("{}: {}", label, value)
            }
        };

        [
            self.title.clone(),
            joined(&self.department, &self.institution),
            joined(&self.campus, &self.city_country),
            labelled("Phone", &self.phone),
            labelled("Email", &self.email),
            labelled("Website", &self.website),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub year: String,
}

impl Education {
    pub fn line(&self) -> String {
        let mut line = format!("{} — {}", self.degree, self.institution);
        if !self.location.is_empty() {
            line.push_str(&format!(", {}", self.location));
        }
        if !self.year.is_empty() {
            line.push_str(&format!(" ({})", self.year));
        }
        line
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    pub title: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub years: String,
}

impl Position {
    pub fn line(&self) -> String {
        with_parenthetical(&self.title, &self.years)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Positions {
    pub current: Vec<Position>,
    pub previous: Vec<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Teaching {
    pub undergraduate: Vec<String>,
    pub postgraduate: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub committees: Vec<String>,
    pub administration: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Award {
    pub name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub year: String,
}

impl Award {
    pub fn line(&self) -> String {
        with_parenthetical(&self.name, &self.year)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub technical: Vec<String>,
    pub languages: Vec<String>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.languages.is_empty()
    }
}

/// Which CV is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvVariant {
    Short,
    Long,
}

impl CvVariant {
    pub const ALL: [CvVariant; 2] = [CvVariant::Short, CvVariant::Long];

    /// Output file stem
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Short => "cv_short",
            Self::Long => "cv_long",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    pub max_publications: Option<usize>,
}

/// `config:` block of the profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    pub short_cv: VariantConfig,
    pub long_cv: VariantConfig,
}

impl CvConfig {
    /// Truncation for a variant. The short CV defaults to
    /// [`DEFAULT_SHORT_MAX_PUBLICATIONS`]; the long CV is unlimited unless set.
    pub fn limit(&self, variant: CvVariant) -> PublicationLimit {
        match variant {
            CvVariant::Short => PublicationLimit::AtMost(
                self.short_cv
                    .max_publications
                    .unwrap_or(DEFAULT_SHORT_MAX_PUBLICATIONS),
            ),
            CvVariant::Long => self.long_cv.max_publications.into(),
        }
    }
}

/// Load a profile from a YAML file
pub fn load_profile(path: &Path) -> Result<Profile> {
    let content = std::fs::read_to_string(path)?;
    let profile: Profile = serde_yaml::from_str(&content)?;
    info!(path = %path.display(), name = %profile.name, "Loaded profile");
    Ok(profile)
}

fn with_parenthetical(text: &str, extra: &str) -> String {
    if extra.is_empty() {
        text.to_string()
    } else {
        format!("{} ({})", text, extra)
    }
}

/// Accept a YAML string or number (`year: 2010` and `year: "2010-2014"`)
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => s.trim().to_string(),
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(serde_yaml::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROFILE: &str = r#"
name: Dr. Ada Lovelace
contact:
  title: Senior Lecturer
  department: Computing
  institution: University of London
  campus: Bloomsbury
  city_country: London, UK
  phone: "+44 20 0000"
  email: ada@example.org
  website: https://example.org
summary: Works on engines.
education:
  - degree: PhD Mathematics
    institution: Cambridge
    location: UK
    year: 1840
positions:
  current:
    - title: Senior Lecturer
      years: 2015-present
  previous:
    - title: Lecturer
      years: "2010-2015"
research_interests: [Engines, Poetry]
teaching:
  undergraduate: [Algorithms]
service:
  committees: [Ethics]
  administration: [Head of Year]
awards:
  - name: Medal
    year: 1850
skills:
  technical: [Rust]
config:
  short_cv:
    max_publications: 5
"#;

    #[test]
    fn test_parse_full_profile() -> Result<()> {
        let profile: Profile = serde_yaml::from_str(PROFILE)?;
        assert_eq!(profile.name, "Dr. Ada Lovelace");
        assert_eq!(profile.education[0].year, "1840");
        assert_eq!(profile.positions.previous[0].line(), "Lecturer (2010-2015)");
        assert_eq!(profile.awards[0].line(), "Medal (1850)");
        assert!(profile.teaching.postgraduate.is_empty());
        assert!(profile.skills.languages.is_empty());
        assert!(!profile.skills.is_empty());
        Ok(())
    }

    #[test]
    fn test_limits() -> Result<()> {
        let profile: Profile = serde_yaml::from_str(PROFILE)?;
        assert_eq!(profile.config.limit(CvVariant::Short), PublicationLimit::AtMost(5));
        assert_eq!(profile.config.limit(CvVariant::Long), PublicationLimit::Unlimited);

        let defaults = CvConfig::default();
        assert_eq!(
            defaults.limit(CvVariant::Short),
            PublicationLimit::AtMost(DEFAULT_SHORT_MAX_PUBLICATIONS)
        );
        Ok(())
    }

    #[test]
    fn test_minimal_profile() -> Result<()> {
        let profile: Profile = serde_yaml::from_str("name: Someone\n")?;
        assert!(profile.education.is_empty());
        assert!(profile.contact.lines().is_empty());
        Ok(())
    }

    #[test]
    fn test_contact_lines() -> Result<()> {
        let profile: Profile = serde_yaml::from_str(PROFILE)?;
        let lines = profile.contact.lines();
        assert_eq!(lines[0], "Senior Lecturer");
        assert_eq!(lines[1], "Computing, University of London");
        assert_eq!(lines[2], "Bloomsbury, London, UK");
        assert_eq!(lines[3], "Phone: +44 20 0000");
        Ok(())
    }

    #[test]
    fn test_education_line() {
        let edu = Education {
            degree: "BSc".into(),
            institution: "Somewhere".into(),
            location: String::new(),
            year: "2001".into(),
        };
        assert_eq!(edu.line(), "BSc — Somewhere (2001)");
    }

    #[test]
    fn test_load_profile_errors() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(matches!(
            load_profile(&dir.path().join("missing.yaml")),
            Err(crate::error::CvError::Io(_))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "contact: [unclosed")?;
        assert!(matches!(load_profile(&bad), Err(crate::error::CvError::Yaml(_))));
        Ok(())
    }
}
