//! # scholarcv
//!
//! Google Scholar publication normalizer and CV generator.
//!
//! ## Modules
//!
//! - [`publication`] - Canonical record, year coercion, ranking and truncation
//! - [`tabular`] - Google Scholar CSV import and export
//! - [`scholar`] - Author-profile lookup client
//! - [`fetch`] - Source selection and the skip-and-continue lookup batch
//! - [`store`] - JSON interchange file
//! - [`profile`] - Hand-authored YAML profile
//! - [`render`] - DOCX and LaTeX CV renderers
//! - [`cookies`] - Cookie persistence
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarcv::{config::SourceConfig, fetch, scholar::{ClientOptions, ScholarClient}};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let summary = fetch::run_fetch(&SourceConfig::default(), Path::new("data/publications.json"), || {
//!         ScholarClient::new(&ClientOptions::default())
//!     })
//!     .await?;
//!     println!("Wrote {} publications", summary.written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod fetch;
pub mod profile;
pub mod publication;
pub mod render;
pub mod scholar;
pub mod store;
pub mod tabular;

pub use error::{CvError, Result};
