//! scholarcv - Google Scholar publication normalizer and CV generator
//!
//! ## Usage
//!
//! ```bash
//! scholarcv fetch --scholar-id AbCdEfGhIjK
//! scholarcv render --format all --variant both
//! scholarcv export-csv AbCdEfGhIjK citations.csv
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scholarcv::config::{self, SourceConfig};
use scholarcv::cookies::CookieJar;
use scholarcv::fetch::{self, PublicationSource};
use scholarcv::profile::{load_profile, CvVariant};
use scholarcv::render::{render_to_file, CvRenderer, DocxRenderer, LatexRenderer};
use scholarcv::scholar::{ClientOptions, ScholarClient};
use scholarcv::store::load_publications;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Google Scholar publication normalizer and CV generator
#[derive(Parser)]
#[command(name = "scholarcv")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize publications into the interchange JSON file
    Fetch {
        /// Google Scholar CSV export, used when present
        #[arg(long, default_value = config::CITATIONS_CSV)]
        csv: PathBuf,

        /// Interchange JSON file to overwrite
        #[arg(short, long, default_value = config::PUBLICATIONS_JSON)]
        output: PathBuf,

        /// Scholar author id; enables the lookup when the CSV is missing
        #[arg(long)]
        scholar_id: Option<String>,

        /// Proxy URL (e.g., http://127.0.0.1:7890)
        #[arg(long)]
        proxy: Option<String>,

        /// Mirror site URL
        #[arg(long)]
        mirror: Option<String>,
    },

    /// Export an author's publications as a Google Scholar-style CSV
    ExportCsv {
        /// Scholar author id
        author_id: String,

        /// Output CSV path
        #[arg(default_value = config::EXPORT_CSV)]
        output: PathBuf,

        /// Proxy URL (e.g., http://127.0.0.1:7890)
        #[arg(long)]
        proxy: Option<String>,

        /// Mirror site URL
        #[arg(long)]
        mirror: Option<String>,
    },

    /// Render CVs from the profile and the interchange file
    Render {
        /// Profile YAML
        #[arg(long, default_value = config::PROFILE_YAML)]
        profile: PathBuf,

        /// Interchange JSON file
        #[arg(long, default_value = config::PUBLICATIONS_JSON)]
        publications: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = config::OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::All)]
        format: OutputFormat,

        /// CV variant
        #[arg(long, value_enum, default_value_t = VariantArg::Both)]
        variant: VariantArg,
    },

    /// Manage cookies
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Docx,
    Tex,
    All,
}

const DOCX: &dyn CvRenderer = &DocxRenderer;
const TEX: &dyn CvRenderer = &LatexRenderer;

impl OutputFormat {
    fn renderers(self) -> &'static [&'static dyn CvRenderer] {
        match self {
            Self::Docx => &[DOCX],
            Self::Tex => &[TEX],
            Self::All => &[DOCX, TEX],
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Short,
    Long,
    Both,
}

impl VariantArg {
    fn variants(self) -> &'static [CvVariant] {
        match self {
            Self::Short => &[CvVariant::Short],
            Self::Long => &[CvVariant::Long],
            Self::Both => &CvVariant::ALL,
        }
    }
}

#[derive(Subcommand)]
enum CookieAction {
    /// Clear stored cookies
    Clear,
    /// Show cookie file path
    Path,
    /// Import cookies as a JSON array read from stdin
    Import,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Fetch {
            csv,
            output,
            scholar_id,
            proxy,
            mirror,
        } => {
            let source = SourceConfig {
                csv_path: csv,
                scholar_id,
            };
            run_fetch(source, output, client_options(proxy, mirror)).await
        }
        Commands::ExportCsv {
            author_id,
            output,
            proxy,
            mirror,
        } => run_export(author_id, output, client_options(proxy, mirror)).await,
        Commands::Render {
            profile,
            publications,
            output_dir,
            format,
            variant,
        } => run_render(profile, publications, output_dir, format, variant),
        Commands::Cookies { action } => handle_cookies(action),
    }
}

fn client_options(proxy: Option<String>, mirror: Option<String>) -> ClientOptions {
    ClientOptions {
        proxy,
        base_url: mirror,
        ..Default::default()
    }
}

async fn run_fetch(source: SourceConfig, output: PathBuf, options: ClientOptions) -> Result<()> {
    let summary = fetch::run_fetch(&source, &output, || ScholarClient::new(&options))
        .await
        .context("Failed to fetch publications")?;

    match &summary.source {
        PublicationSource::Tabular(path) => println!("Source: {}", path.display()),
        PublicationSource::Lookup { scholar_id } => println!("Source: Scholar profile {}", scholar_id),
    }
    for skipped in &summary.skipped {
        println!("  skipped [{}] {}: {}", skipped.index, skipped.title, skipped.reason);
    }
    println!("✓ Saved {} publications to {}", summary.written, output.display());
    Ok(())
}

async fn run_export(author_id: String, output: PathBuf, options: ClientOptions) -> Result<()> {
    let client = ScholarClient::new(&options)?;
    let report = fetch::export_citations(&client, &author_id, &output)
        .await
        .with_context(|| format!("Failed to export publications for {}", author_id))?;

    if !report.skipped.is_empty() {
        println!("Skipped {} publications that could not be fetched.", report.skipped.len());
    }
    println!("✓ Exported {} publications to {}", report.items.len(), output.display());
    Ok(())
}

fn run_render(
    profile_path: PathBuf,
    publications_path: PathBuf,
    output_dir: PathBuf,
    format: OutputFormat,
    variant: VariantArg,
) -> Result<()> {
    let profile = load_profile(&profile_path)
        .with_context(|| format!("Failed to load profile {}", profile_path.display()))?;
    let publications = load_publications(&publications_path)
        .with_context(|| format!("Failed to load {}", publications_path.display()))?;
    if publications.is_empty() {
        warn!("No publications loaded. Run 'scholarcv fetch' first.");
    }
    info!(count = publications.len(), "Rendering CVs");

    for &renderer in format.renderers() {
        for &cv_variant in variant.variants() {
            let path = render_to_file(renderer, &profile, &publications, cv_variant, &output_dir)
                .with_context(|| format!("Failed to render {} CV", renderer.name()))?;
            println!("Saved: {}", path.display());
        }
    }
    Ok(())
}

fn handle_cookies(action: CookieAction) -> Result<()> {
    let jar = CookieJar::new()?;

    match action {
        CookieAction::Clear => {
            jar.clear()?;
            println!("Cookies cleared.");
        }
        CookieAction::Path => {
            println!("Cookie file: {:?}", jar.path());
        }
        CookieAction::Import => {
            println!("Paste cookies in JSON format:");
            println!("Format: [{{\"name\":\"NID\",\"value\":\"xxx\",\"domain\":\".google.com\"}},...]");

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            let input = input.trim();
            if input.is_empty() {
                println!("No cookies provided.");
                return Ok(());
            }

            let count = jar.import_json(input).context("Failed to parse cookies")?;
            println!("Successfully saved {} cookies!", count);
        }
    }

    Ok(())
}
