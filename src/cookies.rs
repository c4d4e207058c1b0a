//! Cookie storage for Google Scholar requests.
//!
//! Scholar throttles cookie-less clients quickly, so cookies copied from a
//! browser session are kept in a JSON file and replayed on every request.

use crate::error::{CvError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const COOKIE_FILE_NAME: &str = ".scholarcv_cookies.json";

/// Default cookie file path: `~/.scholarcv_cookies.json`
fn default_cookie_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(COOKIE_FILE_NAME))
        .ok_or_else(|| CvError::Config("Cannot determine home directory".to_string()))
}

/// Cookie entry in the browser export format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub expires: Option<f64>,
}

/// JSON-file backed cookie store
pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    /// Jar at the default location in the home directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: default_cookie_path()?,
        })
    }

    /// Jar at a custom location
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cookies from file.
    ///
    /// A missing or unreadable file yields no cookies; requests still go out
    /// without them.
    pub fn load(&self) -> Vec<Cookie> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Cookie file not found");
            return Vec::new();
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(CvError::from)
            .and_then(|content| {
                serde_json::from_str::<Vec<Cookie>>(&content).map_err(CvError::from)
            });

        match parsed {
            Ok(cookies) => {
                info!(count = cookies.len(), path = %self.path.display(), "Loaded cookies");
                cookies
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unusable cookie file");
                Vec::new()
            }
        }
    }

    /// `Cookie` header value for cookies whose domain contains `domain_part`
    pub fn header_for(&self, domain_part: &str) -> String {
        cookie_header(&self.load(), domain_part)
    }

    pub fn save(&self, cookies: &[Cookie]) -> Result<()> {
        let content = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, content)?;
        info!(count = cookies.len(), path = %self.path.display(), "Saved cookies");
        Ok(())
    }

    /// Parse a JSON array of cookies and store it, replacing the old file
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        self.save(&cookies)?;
        Ok(cookies.len())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "Cleared cookies");
        }
        Ok(())
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            path: PathBuf::from(COOKIE_FILE_NAME),
        })
    }
}

fn cookie_header(cookies: &[Cookie], domain_part: &str) -> String {
    cookies
        .iter()
        .filter(|c| c.domain.contains(domain_part))
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn cookie(name: &str, domain: &str) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: "v".to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
            expires: None,
        }
    }

    #[test]
    fn test_load_missing_file() {
        let jar = CookieJar::with_path(PathBuf::from("/nonexistent/path"));
        assert!(jar.load().is_empty());
        assert_eq!(jar.header_for("google"), "");
    }

    #[test]
    fn test_import_and_header() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let jar = CookieJar::with_path(temp.path().to_path_buf());

        let count = jar.import_json(
            r#"[{"name":"NID","value":"abc","domain":".google.com"},
                {"name":"other","value":"x","domain":".example.com"}]"#,
        )?;
        assert_eq!(count, 2);
        assert_eq!(jar.header_for("google"), "NID=abc");
        Ok(())
    }

    #[test]
    fn test_header_joins_matching() {
        let cookies = vec![cookie("A", ".google.com"), cookie("B", "scholar.google.com")];
        assert_eq!(cookie_header(&cookies, "google"), "A=v; B=v");
    }

    #[test]
    fn test_import_rejects_garbage() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let jar = CookieJar::with_path(temp.path().to_path_buf());
        assert!(matches!(jar.import_json("not json"), Err(CvError::Json(_))));
        Ok(())
    }
}
