//! Google Scholar author profile lookup.
//!
//! [`LookupSource`] is the seam the normalizer depends on: find an author by
//! id, fill the author's publication list, then fill each publication's
//! bibliographic details. [`ScholarClient`] implements it by scraping the
//! public profile pages with cookies replayed from [`crate::cookies::CookieJar`].

use crate::cookies::CookieJar;
use crate::error::{CvError, OptionExt, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Rows per profile page (Scholar's maximum)
const PROFILE_PAGE_SIZE: usize = 100;

/// Upper bound on profile pages fetched for one author
const MAX_PROFILE_PAGES: usize = 20;

/// Nested bibliographic mapping of one publication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    pub title: Option<String>,
    /// Authors joined with " and "
    pub author: Option<String>,
    pub journal: Option<String>,
    /// Conference proceedings or book title
    pub booktitle: Option<String>,
    /// Raw year text
    pub year: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub publisher: Option<String>,
}

impl BibEntry {
    /// Journal if non-empty, else booktitle, else empty
    pub fn venue(&self) -> &str {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        non_empty(&self.journal)
            .or_else(|| non_empty(&self.booktitle))
            .unwrap_or("")
    }

    /// Fields from `self`, falling back to `stub` where `self` has nothing
    fn or_stub(self, stub: &BibEntry) -> BibEntry {
        let pick = |detail: Option<String>, fallback: &Option<String>| {
            detail
                .filter(|s| !s.trim().is_empty())
                .or_else(|| fallback.clone())
        };
        // The profile row's venue preview only stands in when the detail page has none
        let has_venue = !self.venue().is_empty();
        BibEntry {
            title: pick(self.title, &stub.title),
            author: pick(self.author, &stub.author),
            journal: if has_venue { self.journal } else { stub.journal.clone() },
            booktitle: if has_venue { self.booktitle } else { stub.booktitle.clone() },
            year: pick(self.year, &stub.year),
            volume: self.volume,
            number: self.number,
            pages: self.pages,
            publisher: self.publisher,
        }
    }
}

/// A publication as known to the lookup source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationHandle {
    /// `AUTHOR:PUB` id used by the detail page
    pub author_pub_id: String,
    pub bib: BibEntry,
    /// Whether the detail page has been merged in
    pub filled: bool,
}

/// Sections of an author record that can be filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorSection {
    Basics,
    Publications,
}

/// An author as known to the lookup source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorHandle {
    pub scholar_id: String,
    pub name: String,
    pub affiliation: String,
    /// Publication stubs. With only `Basics` filled this is the first
    /// profile page, read along with the author header.
    pub publications: Vec<PublicationHandle>,
    pub filled: Vec<AuthorSection>,
}

/// External author/publication index
#[allow(async_fn_in_trait)]
pub trait LookupSource {
    /// Find an author by opaque id (basics only)
    async fn search_by_id(&self, scholar_id: &str) -> Result<AuthorHandle>;

    /// Fill the requested sections of an author
    async fn fill_author(
        &self,
        author: AuthorHandle,
        sections: &[AuthorSection],
    ) -> Result<AuthorHandle>;

    /// Fill one publication's bibliographic details
    async fn fill_publication(&self, publication: PublicationHandle) -> Result<PublicationHandle>;
}

/// Connection options for [`ScholarClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// Custom base URL for mirror sites
    pub base_url: Option<String>,
    /// Sleep a random 0.5-2s before each request
    pub polite_delay: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            base_url: None,
            polite_delay: true,
        }
    }
}

/// Scraping client for Scholar author profiles
pub struct ScholarClient {
    client: reqwest::Client,
    base_url: String,
    cookie_header: String,
    polite_delay: bool,
}

impl ScholarClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let base_url = options
            .base_url
            .as_ref()
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SCHOLAR_URL.to_string());

        let cookie_header = CookieJar::default().header_for("google");
        if cookie_header.is_empty() {
            warn!("No cookies loaded. Run 'scholarcv cookies import' with cookies from a browser session.");
        }

        Ok(Self {
            client: build_http_client(options.proxy.as_deref())?,
            base_url,
            cookie_header,
            polite_delay: options.polite_delay,
        })
    }

    fn profile_url(&self, scholar_id: &str, cstart: usize) -> Result<Url> {
        build_profile_url(&self.base_url, scholar_id, cstart)
    }

    fn publication_url(&self, author_pub_id: &str) -> Result<Url> {
        let mut url = parse_base(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("view_op", "view_citation")
            .append_pair("hl", "en")
            .append_pair("citation_for_view", author_pub_id);
        Ok(url)
    }

    async fn profile_rows(&self, scholar_id: &str, cstart: usize) -> Result<Vec<PublicationHandle>> {
        let url = self.profile_url(scholar_id, cstart)?;
        Ok(parse_profile_page(&self.fetch(&url).await?)?.publications)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        if self.polite_delay {
            let delay = rand::random::<u64>() % 1500 + 500;
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        debug!(url = %url, "Fetching page");

        let mut request = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9");
        if !self.cookie_header.is_empty() {
            request = request.header("Cookie", self.cookie_header.as_str());
        }

        let response = request.send().await?;

        if response.url().path().starts_with("/sorry") {
            return Err(CvError::Captcha);
        }

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CvError::RateLimited(60));
        }
        if !status.is_success() {
            return Err(CvError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response.text().await?;
        if html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic") {
            warn!(url = %url, "CAPTCHA detected");
            return Err(CvError::Captcha);
        }
        Ok(html)
    }
}

impl LookupSource for ScholarClient {
    async fn search_by_id(&self, scholar_id: &str) -> Result<AuthorHandle> {
        let url = self.profile_url(scholar_id, 0)?;
        let page = parse_profile_page(&self.fetch(&url).await?)?;

        info!(scholar_id, name = %page.name, "Found author");
        Ok(AuthorHandle {
            scholar_id: scholar_id.to_string(),
            name: page.name,
            affiliation: page.affiliation,
            publications: page.publications,
            filled: vec![AuthorSection::Basics],
        })
    }

    async fn fill_author(
        &self,
        mut author: AuthorHandle,
        sections: &[AuthorSection],
    ) -> Result<AuthorHandle> {
        if !sections.contains(&AuthorSection::Publications)
            || author.filled.contains(&AuthorSection::Publications)
        {
            return Ok(author);
        }

        let first_page = if author.filled.contains(&AuthorSection::Basics) {
            std::mem::take(&mut author.publications)
        } else {
            self.profile_rows(&author.scholar_id, 0).await?
        };
        let owned_id = author.scholar_id.clone();
        let scholar_id = owned_id.as_str();
        let publications =
            collect_profile_pages(first_page, move |cstart| self.profile_rows(scholar_id, cstart))
                .await?;

        info!(scholar_id = %author.scholar_id, total = publications.len(), "Listed publications");
        author.publications = publications;
        author.filled.push(AuthorSection::Publications);
        Ok(author)
    }

    async fn fill_publication(&self, mut publication: PublicationHandle) -> Result<PublicationHandle> {
        if publication.filled {
            return Ok(publication);
        }
        if publication.author_pub_id.is_empty() {
            return Err(CvError::Parse("Publication has no citation id".to_string()));
        }

        let url = self.publication_url(&publication.author_pub_id)?;
        let detail = parse_publication_page(&self.fetch(&url).await?)?;
        publication.bib = detail.or_stub(&publication.bib);
        publication.filled = true;
        Ok(publication)
    }
}

/// Page through an author's publication list.
///
/// `first_page` holds the rows already read at `cstart=0`; `fetch_page` is
/// called with the `cstart` of each later page until a short page or
/// [`MAX_PROFILE_PAGES`].
async fn collect_profile_pages<F, Fut>(
    first_page: Vec<PublicationHandle>,
    mut fetch_page: F,
) -> Result<Vec<PublicationHandle>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<PublicationHandle>>>,
{
    let mut count = first_page.len();
    let mut publications = first_page;
    for page_idx in 1..MAX_PROFILE_PAGES {
        if count < PROFILE_PAGE_SIZE {
            return Ok(publications);
        }
        let page = fetch_page(page_idx * PROFILE_PAGE_SIZE).await?;
        count = page.len();
        debug!(page = page_idx + 1, count, "Parsed profile page");
        publications.extend(page);
    }
    if count >= PROFILE_PAGE_SIZE {
        warn!(max_pages = MAX_PROFILE_PAGES, "Stopped at profile page limit");
    }
    Ok(publications)
}

/// Build HTTP client with optional proxy
fn build_http_client(proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .cookie_store(true);

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            CvError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CvError::Config(format!("Failed to build HTTP client: {}", e)))
}

fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(&format!("{}/citations", base_url))
        .map_err(|e| CvError::Config(format!("Invalid base URL: {}", e)))
}

/// Profile page URL for one page of an author's publication list
fn build_profile_url(base_url: &str, scholar_id: &str, cstart: usize) -> Result<Url> {
    let mut url = parse_base(base_url)?;
    url.query_pairs_mut()
        .append_pair("user", scholar_id)
        .append_pair("hl", "en") // English labels keep field names stable
        .append_pair("cstart", &cstart.to_string())
        .append_pair("pagesize", &PROFILE_PAGE_SIZE.to_string());
    Ok(url)
}

/// One parsed author profile page
#[derive(Debug, Clone, Default)]
pub struct ProfilePage {
    pub name: String,
    pub affiliation: String,
    pub publications: Vec<PublicationHandle>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CvError::Parse(e.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse an author profile page into basics and publication stubs.
///
/// Fails when the page has no author header, which is what Scholar serves
/// for an unknown id.
pub fn parse_profile_page(html: &str) -> Result<ProfilePage> {
    let document = Html::parse_document(html);

    let name_selector = selector("#gsc_prf_in")?;
    let affiliation_selector = selector("div.gsc_prf_il")?;
    let row_selector = selector("tr.gsc_a_tr")?;
    let link_selector = selector("a.gsc_a_at")?;
    let gray_selector = selector("div.gs_gray")?;
    let year_selector = selector("td.gsc_a_y span")?;

    let name = document
        .select(&name_selector)
        .next()
        .map(element_text)
        .ok_or_parse("No author profile found in page")?;

    let affiliation = document
        .select(&affiliation_selector)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let mut publications = Vec::new();
    for row in document.select(&row_selector) {
        let Some(link) = row.select(&link_selector).next() else {
            continue; // "no articles" placeholder row
        };

        let href = link
            .value()
            .attr("href")
            .or_else(|| link.value().attr("data-href"))
            .unwrap_or("");

        let mut gray = row.select(&gray_selector).map(element_text);
        let authors = gray.next().and_then(non_empty);
        let venue = gray.next().and_then(non_empty);

        let year = row
            .select(&year_selector)
            .next()
            .map(element_text)
            .and_then(non_empty);

        publications.push(PublicationHandle {
            author_pub_id: citation_id_from_href(href).unwrap_or_default(),
            bib: BibEntry {
                title: non_empty(element_text(link)),
                author: authors,
                journal: venue,
                year,
                ..Default::default()
            },
            filled: false,
        });
    }

    Ok(ProfilePage {
        name,
        affiliation,
        publications,
    })
}

/// Extract `citation_for_view` from a (possibly relative) detail link
fn citation_id_from_href(href: &str) -> Option<String> {
    let base = Url::parse(DEFAULT_SCHOLAR_URL).ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "citation_for_view")
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

/// Parse a publication detail page into a [`BibEntry`]
pub fn parse_publication_page(html: &str) -> Result<BibEntry> {
    let document = Html::parse_document(html);

    let title_selector = selector("#gsc_oci_title")?;
    let row_selector = selector("#gsc_oci_table div.gs_scl")?;
    let field_selector = selector("div.gsc_oci_field")?;
    let value_selector = selector("div.gsc_oci_value")?;
    let year_regex = Regex::new(r"\b(\d{4})\b").map_err(|e| CvError::Parse(e.to_string()))?;

    let mut bib = BibEntry {
        title: document
            .select(&title_selector)
            .next()
            .map(element_text)
            .and_then(non_empty),
        ..Default::default()
    };

    for row in document.select(&row_selector) {
        let (Some(field), Some(value)) = (
            row.select(&field_selector).next().map(element_text),
            row.select(&value_selector).next().map(element_text),
        ) else {
            continue;
        };
        let value = match non_empty(value) {
            Some(v) => v,
            None => continue,
        };

        match field.to_lowercase().as_str() {
            "authors" | "inventors" => {
                let names: Vec<&str> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                bib.author = Some(names.join(" and "));
            }
            "journal" => bib.journal = Some(value),
            "conference" | "book" => bib.booktitle = Some(value),
            "publication date" => {
                bib.year = year_regex
                    .captures(&value)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());
            }
            "volume" => bib.volume = Some(value),
            "issue" => bib.number = Some(value),
            "pages" => bib.pages = Some(value),
            "publisher" => bib.publisher = Some(value),
            other => debug!(field = other, "Ignoring publication field"),
        }
    }

    Ok(bib)
}
