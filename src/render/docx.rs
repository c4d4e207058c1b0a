//! DOCX output: a minimal WordprocessingML package.
//!
//! Only the parts Word needs to open the file are written. List bullets and
//! numbers come from `numbering.xml` through the `ListBullet*` and
//! `ListNumber` paragraph styles.

use super::{Block, CvDocument, CvRenderer};
use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="60"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet2"><w:name w:val="List Bullet 2"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="1"/></w:numPr></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="2"/></w:numPr></w:pPr></w:style>
</w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="0">
<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="◦"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>
</w:abstractNum>
<w:abstractNum w:abstractNumId="1">
<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

/// Name line size in half-points (18pt)
const NAME_SIZE: &str = "36";

/// Renders `.docx` packages
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl CvRenderer for DocxRenderer {
    fn name(&self) -> &str {
        "docx"
    }

    fn extension(&self) -> &str {
        "docx"
    }

    fn render(&self, cv: &CvDocument) -> Result<Vec<u8>> {
        let document = document_xml(cv)?;
        let core = core_xml(&cv.title);

        let parts: [(&str, &[u8]); 7] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("docProps/core.xml", core.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
            ("word/document.xml", document.as_slice()),
            ("word/styles.xml", STYLES.as_bytes()),
            ("word/numbering.xml", NUMBERING.as_bytes()),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

/// A run of text with optional emphasis
struct Run<'a> {
    text: &'a str,
    bold: bool,
    size: Option<&'a str>,
}

impl<'a> Run<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            bold: false,
            size: None,
        }
    }
}

fn write_empty<W: Write>(writer: &mut Writer<W>, name: &str, val: Option<&str>) -> Result<()> {
    let mut element = BytesStart::new(name);
    if let Some(val) = val {
        element.push_attribute(("w:val", val));
    }
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_paragraph<W: Write>(writer: &mut Writer<W>, style: Option<&str>, run: &Run<'_>) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    if let Some(style) = style {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        write_empty(writer, "w:pStyle", Some(style))?;
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }

    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    if run.bold || run.size.is_some() {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if run.bold {
            write_empty(writer, "w:b", None)?;
        }
        if let Some(size) = run.size {
            write_empty(writer, "w:sz", Some(size))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }
    let mut text = BytesStart::new("w:t");
    text.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(text))?;
    writer.write_event(Event::Text(BytesText::new(run.text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// Build `word/document.xml`
fn document_xml(cv: &CvDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", W_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for block in &cv.blocks {
        match block {
            Block::Header { name, contact } => {
                let name_run = Run {
                    text: name,
                    bold: true,
                    size: Some(NAME_SIZE),
                };
                write_paragraph(&mut writer, None, &name_run)?;
                for line in contact {
                    write_paragraph(&mut writer, None, &Run::plain(line))?;
                }
            }
            Block::Heading(text) => write_paragraph(&mut writer, Some("Heading1"), &Run::plain(text))?,
            Block::Paragraph(text) => write_paragraph(&mut writer, None, &Run::plain(text))?,
            Block::Bullet { level, text } => {
                let style = if *level == 0 { "ListBullet" } else { "ListBullet2" };
                write_paragraph(&mut writer, Some(style), &Run::plain(text))?;
            }
            Block::Numbered(text) => write_paragraph(&mut writer, Some("ListNumber"), &Run::plain(text))?,
        }
    }

    // A4 with 2cm margins
    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
    let mut page = BytesStart::new("w:pgSz");
    page.push_attribute(("w:w", "11906"));
    page.push_attribute(("w:h", "16838"));
    writer.write_event(Event::Empty(page))?;
    let mut margins = BytesStart::new("w:pgMar");
    for side in ["w:top", "w:right", "w:bottom", "w:left"] {
        margins.push_attribute((side, "1134"));
    }
    writer.write_event(Event::Empty(margins))?;
    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}

/// Build `docProps/core.xml`
fn core_xml(title: &str) -> String {
    let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = quick_xml::escape::escape(title);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>Curriculum Vitae: {title}</dc:title>
<dc:creator>{title}</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>
</cp:coreProperties>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CvVariant;
    use crate::render::tests::{sample_profile, sample_publications};
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut part = archive.by_name(name)?;
        let mut content = String::new();
        part.read_to_string(&mut content)?;
        Ok(content)
    }

    #[test]
    fn test_package_parts() -> Result<()> {
        let cv = CvDocument::build(&sample_profile(), &sample_publications(), CvVariant::Short);
        let bytes = DocxRenderer.render(&cv)?;

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "docProps/core.xml",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let core = read_part(&bytes, "docProps/core.xml")?;
        assert!(core.contains("<dc:creator>Grace Hopper</dc:creator>"));
        Ok(())
    }

    #[test]
    fn test_document_content() -> Result<()> {
        let cv = CvDocument::build(&sample_profile(), &sample_publications(), CvVariant::Long);
        let bytes = DocxRenderer.render(&cv)?;
        let xml = read_part(&bytes, "word/document.xml")?;

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("Grace Hopper"));
        assert!(xml.contains("<w:b/><w:sz w:val=\"36\"/>"));
        assert!(xml.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(xml.contains("Compilers &amp; languages."));
        assert_eq!(xml.matches("<w:pStyle w:val=\"ListNumber\"/>").count(), 3);
        assert!(xml.contains("G Hopper (n.d.). Notes. ."));
        Ok(())
    }

    #[test]
    fn test_core_escapes_title() {
        let core = core_xml("A <B> & C");
        assert!(core.contains("Curriculum Vitae: A &lt;B&gt; &amp; C"));
    }
}
