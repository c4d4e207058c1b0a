//! CV rendering.
//!
//! A profile and a ranked publication list are first laid out as a flat
//! [`CvDocument`] of blocks; each [`CvRenderer`] only decides how those blocks
//! look in its output format.

pub mod docx;
pub mod latex;

use crate::error::Result;
use crate::profile::{CvVariant, Profile};
use crate::publication::Publication;
use std::path::{Path, PathBuf};
use tracing::info;

pub use docx::DocxRenderer;
pub use latex::LatexRenderer;

/// One layout element of a CV
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Name line followed by contact lines
    Header { name: String, contact: Vec<String> },
    /// Section heading
    Heading(String),
    /// Plain paragraph
    Paragraph(String),
    /// Bulleted item; level 1 nests under the preceding level 0 item
    Bullet { level: u8, text: String },
    /// Numbered item
    Numbered(String),
}

/// A CV laid out as blocks, ready for any renderer
#[derive(Debug, Clone)]
pub struct CvDocument {
    pub title: String,
    pub variant: CvVariant,
    pub blocks: Vec<Block>,
}

fn bullet(level: u8, text: impl Into<String>) -> Block {
    Block::Bullet {
        level,
        text: text.into(),
    }
}

fn labelled_group(blocks: &mut Vec<Block>, label: &str, items: &[String]) {
    blocks.push(bullet(0, label));
    blocks.extend(items.iter().map(|item| bullet(1, item.as_str())));
}

impl CvDocument {
    /// Lay out a CV. `ranked` must already be ranked; the variant's limit
    /// from the profile config is applied here.
    pub fn build(profile: &Profile, ranked: &[Publication], variant: CvVariant) -> Self {
        let mut blocks = vec![Block::Header {
            name: profile.name.clone(),
            contact: profile.contact.lines(),
        }];

        if !profile.summary.trim().is_empty() {
            blocks.push(Block::Heading("Profile".into()));
            blocks.push(Block::Paragraph(profile.summary.trim().to_string()));
        }

        blocks.push(Block::Heading("Education".into()));
        blocks.extend(profile.education.iter().map(|e| bullet(0, e.line())));

        blocks.push(Block::Heading("Academic Positions".into()));
        blocks.push(bullet(0, "Current:"));
        blocks.extend(profile.positions.current.iter().map(|p| bullet(1, p.line())));
        blocks.push(bullet(0, "Previous:"));
        blocks.extend(profile.positions.previous.iter().map(|p| bullet(1, p.line())));

        blocks.push(Block::Heading("Research Interests".into()));
        blocks.extend(profile.research_interests.iter().map(|r| bullet(0, r.as_str())));

        blocks.push(Block::Heading("Teaching".into()));
        labelled_group(&mut blocks, "Undergraduate:", &profile.teaching.undergraduate);
        if !profile.teaching.postgraduate.is_empty() {
            labelled_group(&mut blocks, "Postgraduate:", &profile.teaching.postgraduate);
        }

        blocks.push(Block::Heading("Service and Administration".into()));
        labelled_group(&mut blocks, "Committees and Service:", &profile.service.committees);
        labelled_group(&mut blocks, "Administrative Roles:", &profile.service.administration);

        if !profile.awards.is_empty() {
            blocks.push(Block::Heading("Awards and Honors".into()));
            blocks.extend(profile.awards.iter().map(|a| bullet(0, a.line())));
        }

        let heading = match variant {
            CvVariant::Short => "Selected Publications",
            CvVariant::Long => "Publications",
        };
        blocks.push(Block::Heading(heading.into()));
        let shown = profile.config.limit(variant).apply(ranked);
        if shown.is_empty() {
            blocks.push(Block::Paragraph("No publications available.".into()));
        } else {
            blocks.extend(shown.iter().map(|p| Block::Numbered(p.citation_line())));
        }

        if !profile.skills.is_empty() {
            blocks.push(Block::Heading("Skills".into()));
            if !profile.skills.technical.is_empty() {
                labelled_group(&mut blocks, "Technical:", &profile.skills.technical);
            }
            if !profile.skills.languages.is_empty() {
                labelled_group(&mut blocks, "Languages:", &profile.skills.languages);
            }
        }

        Self {
            title: profile.name.clone(),
            variant,
            blocks,
        }
    }

    /// Number of publications laid out
    pub fn publication_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Numbered(_)))
            .count()
    }
}

/// An output format for CVs
pub trait CvRenderer {
    /// Format name (e.g., "docx", "tex")
    fn name(&self) -> &str;

    /// File extension without the dot
    fn extension(&self) -> &str;

    /// Serialize a laid-out CV
    fn render(&self, cv: &CvDocument) -> Result<Vec<u8>>;
}

/// Lay out, render and write `<output_dir>/<variant stem>.<ext>`
pub fn render_to_file(
    renderer: &dyn CvRenderer,
    profile: &Profile,
    ranked: &[Publication],
    variant: CvVariant,
    output_dir: &Path,
) -> Result<PathBuf> {
    let cv = CvDocument::build(profile, ranked, variant);
    let bytes = renderer.render(&cv)?;

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.{}", variant.file_stem(), renderer.extension()));
    std::fs::write(&path, bytes)?;

    info!(
        format = renderer.name(),
        path = %path.display(),
        publications = cv.publication_count(),
        "Wrote CV"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Award, Education, Positions, Position, VariantConfig};
    use tempfile::TempDir;

    pub(crate) fn sample_profile() -> Profile {
        let mut profile = Profile {
            name: "Grace Hopper".into(),
            summary: "Compilers & languages.".into(),
            education: vec![Education {
                degree: "PhD".into(),
                institution: "Yale".into(),
                location: "USA".into(),
                year: "1934".into(),
            }],
            positions: Positions {
                current: vec![Position {
                    title: "Rear Admiral".into(),
                    years: "1983-1986".into(),
                }],
                previous: vec![],
            },
            research_interests: vec!["COBOL".into()],
            awards: vec![Award {
                name: "National Medal of Technology".into(),
                year: "1991".into(),
            }],
            ..Default::default()
        };
        profile.contact.email = "grace@example.org".into();
        profile.teaching.undergraduate = vec!["Programming 101".into()];
        profile.config.short_cv = VariantConfig {
            max_publications: Some(2),
        };
        profile
    }

    pub(crate) fn sample_publications() -> Vec<Publication> {
        crate::publication::ranked(vec![
            Publication {
                title: "A-0 System".into(),
                authors: "G Hopper".into(),
                venue: "ACM".into(),
                year: Some(1952),
            },
            Publication {
                title: "Compiling Routines".into(),
                authors: "G Hopper".into(),
                venue: "Computers and Automation".into(),
                year: Some(1953),
            },
            Publication {
                title: "Notes".into(),
                authors: "G Hopper".into(),
                venue: "".into(),
                year: None,
            },
        ])
    }

    #[test]
    fn test_build_truncates_per_variant() {
        let profile = sample_profile();
        let pubs = sample_publications();

        let short = CvDocument::build(&profile, &pubs, CvVariant::Short);
        assert_eq!(short.publication_count(), 2);
        assert!(short.blocks.contains(&Block::Heading("Selected Publications".into())));
        assert!(short.blocks.contains(&Block::Numbered(
            "G Hopper (1953). Compiling Routines. Computers and Automation.".into()
        )));

        let long = CvDocument::build(&profile, &pubs, CvVariant::Long);
        assert_eq!(long.publication_count(), 3);
        assert!(long.blocks.contains(&Block::Numbered("G Hopper (n.d.). Notes. .".into())));
    }

    #[test]
    fn test_build_section_rules() {
        let profile = sample_profile();
        let cv = CvDocument::build(&profile, &[], CvVariant::Short);

        assert!(matches!(&cv.blocks[0], Block::Header { name, contact }
            if name == "Grace Hopper" && contact == &vec!["Email: grace@example.org".to_string()]));
        assert!(cv.blocks.contains(&Block::Paragraph("No publications available.".into())));
        assert!(cv.blocks.contains(&Block::Heading("Awards and Honors".into())));
        assert!(!cv.blocks.contains(&Block::Heading("Skills".into())));
        assert!(!cv.blocks.contains(&bullet(0, "Postgraduate:")));
        assert!(cv.blocks.contains(&bullet(1, "Rear Admiral (1983-1986)")));
    }

    #[test]
    fn test_render_to_file_names() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("output");
        let path = render_to_file(
            &LatexRenderer,
            &sample_profile(),
            &sample_publications(),
            CvVariant::Long,
            &out,
        )?;
        assert_eq!(path, out.join("cv_long.tex"));
        assert!(path.exists());
        Ok(())
    }
}
