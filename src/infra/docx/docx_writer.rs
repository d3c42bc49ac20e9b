// =============================================================================
// DOCX WRITER
// =============================================================================
//
// Serializes a `Document` into a minimal WordprocessingML package:
//
//   [Content_Types].xml
//   _rels/.rels
//   word/document.xml
//   word/styles.xml
//   word/numbering.xml
//   word/_rels/document.xml.rels
//
// XML is assembled as strings with every piece of user text passed through
// `quick_xml::escape::escape`. Tabs inside a run become `<w:tab/>` so the
// "Title<TAB>Duration" lines line up in Word.

use crate::core::resume::{Alignment, Document, Inline, Paragraph, ParagraphKind, Run};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Text contains a control character that XML cannot carry: {text:?}")]
    InvalidText { text: String },
}

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// `numId` of the single bullet list defined in numbering.xml.
const BULLET_NUM_ID: u32 = 1;

/// Relationship ids 1 and 2 are taken by styles and numbering.
const FIRST_HYPERLINK_REL: usize = 3;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="80" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="40"/></w:pPr><w:rPr><w:sz w:val="32"/><w:szCs w:val="32"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:pBdr><w:bottom w:val="single" w:sz="4" w:space="1" w:color="auto"/></w:pBdr><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:spacing w:after="40"/><w:contextualSpacing/></w:pPr></w:style>
<w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style>
</w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="0">
<w:multiLevelType w:val="singleLevel"/>
<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;

// Letter size, 0.75" margins, right-aligned tab stop at the text edge so
// durations and links sit flush right.
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1080" w:right="1080" w:bottom="1080" w:left="1080" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;
const RIGHT_TAB_POS: u32 = 10080;

// =============================================================================
// PACKAGE
// =============================================================================

/// Renders the whole package into memory.
pub fn render_package(document: &Document) -> Result<Vec<u8>, DocxError> {
    check_text(document)?;

    let mut hyperlinks = Vec::new();
    let body = render_document(document, &mut hyperlinks);
    let package_rels = package_relationships();
    let document_rels = document_relationships(&hyperlinks);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", package_rels.as_str()),
        ("word/document.xml", body.as_str()),
        ("word/styles.xml", STYLES),
        ("word/numbering.xml", NUMBERING),
        ("word/_rels/document.xml.rels", document_rels.as_str()),
    ];

    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// XML 1.0 allows only tab, line feed and carriage return below U+0020.
fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

fn check_text(document: &Document) -> Result<(), DocxError> {
    let texts = document
        .paragraphs
        .iter()
        .flat_map(|p| &p.inlines)
        .flat_map(|inline| match inline {
            Inline::Text(run) => [Some(&run.text), None],
            Inline::Hyperlink { url, run } => [Some(&run.text), Some(url)],
        });

    for text in texts.flatten() {
        if !text.chars().all(is_xml_char) {
            return Err(DocxError::InvalidText { text: text.clone() });
        }
    }
    Ok(())
}

/// Writes the package to `path`, replacing whatever was there.
pub async fn write_docx(document: &Document, path: &Path) -> Result<(), DocxError> {
    let bytes = render_package(document)?;
    tokio::fs::write(path, &bytes).await?;

    tracing::info!(
        "Wrote {} ({} paragraphs, {} bytes)",
        path.display(),
        document.paragraphs.len(),
        bytes.len()
    );
    Ok(())
}

fn package_relationships() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="word/document.xml"/></Relationships>"#,
        PACKAGE_REL_NS, REL_OFFICE_DOCUMENT
    )
}

fn document_relationships(hyperlinks: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="styles.xml"/><Relationship Id="rId2" Type="{}" Target="numbering.xml"/>"#,
        PACKAGE_REL_NS, REL_STYLES, REL_NUMBERING
    );

    for (offset, url) in hyperlinks.iter().enumerate() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="{}" TargetMode="External"/>"#,
            FIRST_HYPERLINK_REL + offset,
            REL_HYPERLINK,
            escape(url.as_str())
        ));
    }

    xml.push_str("</Relationships>");
    xml
}

// =============================================================================
// DOCUMENT BODY
// =============================================================================

/// Renders word/document.xml. Every hyperlink URL is appended to
/// `hyperlinks` in order of appearance; its relationship id follows from its
/// position.
fn render_document(document: &Document, hyperlinks: &mut Vec<String>) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#,
        WML_NS, REL_NS
    );

    for paragraph in &document.paragraphs {
        render_paragraph(&mut xml, paragraph, hyperlinks);
    }

    xml.push_str(SECTION_PROPERTIES);
    xml.push_str("</w:body></w:document>");
    xml
}

fn render_paragraph(xml: &mut String, paragraph: &Paragraph, hyperlinks: &mut Vec<String>) {
    xml.push_str("<w:p><w:pPr>");

    match paragraph.kind {
        ParagraphKind::Title => xml.push_str(r#"<w:pStyle w:val="Title"/>"#),
        ParagraphKind::Heading(level) => {
            xml.push_str(&format!(r#"<w:pStyle w:val="Heading{}"/>"#, level.max(1)))
        }
        ParagraphKind::Bullet => xml.push_str(&format!(
            r#"<w:pStyle w:val="ListBullet"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{}"/></w:numPr>"#,
            BULLET_NUM_ID
        )),
        ParagraphKind::Body => {}
    }

    if paragraph.kind == ParagraphKind::Body && has_tab(paragraph) {
        xml.push_str(&format!(
            r#"<w:tabs><w:tab w:val="right" w:pos="{}"/></w:tabs>"#,
            RIGHT_TAB_POS
        ));
    }

    if paragraph.alignment == Alignment::Center {
        xml.push_str(r#"<w:jc w:val="center"/>"#);
    }

    xml.push_str("</w:pPr>");

    for inline in &paragraph.inlines {
        match inline {
            Inline::Text(run) => render_run(xml, run, None),
            Inline::Hyperlink { url, run } => {
                hyperlinks.push(url.clone());
                let rel_id = FIRST_HYPERLINK_REL + hyperlinks.len() - 1;
                xml.push_str(&format!(
                    r#"<w:hyperlink r:id="rId{}" w:history="1">"#,
                    rel_id
                ));
                render_run(xml, run, Some("Hyperlink"));
                xml.push_str("</w:hyperlink>");
            }
        }
    }

    xml.push_str("</w:p>");
}

fn has_tab(paragraph: &Paragraph) -> bool {
    paragraph.inlines.iter().any(|inline| match inline {
        Inline::Text(run) | Inline::Hyperlink { run, .. } => run.text.contains('\t'),
    })
}

fn render_run(xml: &mut String, run: &Run, char_style: Option<&str>) {
    xml.push_str("<w:r>");

    if run.bold || run.size_pt.is_some() || char_style.is_some() {
        xml.push_str("<w:rPr>");
        if let Some(style) = char_style {
            xml.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, style));
        }
        if run.bold {
            xml.push_str("<w:b/><w:bCs/>");
        }
        if let Some(size) = run.size_pt {
            // WordprocessingML sizes are in half-points.
            xml.push_str(&format!(
                r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
                size * 2
            ));
        }
        xml.push_str("</w:rPr>");
    }

    for (i, segment) in run.text.split('\t').enumerate() {
        if i > 0 {
            xml.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            xml.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(segment)
            ));
        }
    }

    xml.push_str("</w:r>");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resume::{build, ContentModel, Entry, Header, Section};
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample_model() -> ContentModel {
        ContentModel {
            header: Some(Header {
                name: "Alex Example".to_string(),
                contact: Some("alex@example.com | +1 555 0100".to_string()),
            }),
            sections: vec![Section {
                title: "Projects".to_string(),
                entries: vec![Entry {
                    title: Some("Compiler & Tools".to_string()),
                    duration: Some("2021 - 2023".to_string()),
                    link: Some("https://example.com/?a=1&b=2".to_string()),
                    bullets: vec!["Lead: Built <fast> parsers".to_string()],
                }],
                paragraphs: vec!["B.Sc. Computer Science".to_string()],
            }],
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML: {}", e),
            }
        }
    }

    #[test]
    fn test_package_contains_all_parts() {
        let bytes = render_package(&build(&sample_model())).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/numbering.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn test_every_part_is_well_formed_xml() {
        let bytes = render_package(&build(&sample_model())).unwrap();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert_well_formed(&read_part(&bytes, part));
        }
    }

    #[test]
    fn test_text_is_escaped_and_tabs_become_tab_elements() {
        let bytes = render_package(&build(&sample_model())).unwrap();
        let document = read_part(&bytes, "word/document.xml");

        assert!(document.contains("Compiler &amp; Tools"));
        assert!(document.contains("Built &lt;fast&gt; parsers"));
        assert!(document.contains(r#"<w:tab/><w:t xml:space="preserve">2021 - 2023</w:t>"#));
        assert!(!document.contains('\t'));
    }

    #[test]
    fn test_hyperlink_gets_external_relationship() {
        let bytes = render_package(&build(&sample_model())).unwrap();
        let document = read_part(&bytes, "word/document.xml");
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");

        assert!(document.contains(r#"<w:hyperlink r:id="rId3""#));
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains(r#"Target="https://example.com/?a=1&amp;b=2""#));
        assert!(rels.contains(r#"TargetMode="External""#));
        assert_eq!(rels.matches("TargetMode=\"External\"").count(), 1);
    }

    #[test]
    fn test_styles_and_formatting_reach_the_xml() {
        let bytes = render_package(&build(&sample_model())).unwrap();
        let document = read_part(&bytes, "word/document.xml");

        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(document.contains(r#"<w:jc w:val="center"/>"#));
        // 16 pt name line.
        assert!(document.contains(r#"<w:sz w:val="32"/>"#));
        assert!(document.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(document.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
        assert!(document.contains(r#"<w:b/><w:bCs/></w:rPr><w:t xml:space="preserve">Lead:</w:t>"#));
    }

    #[test]
    fn test_empty_document_is_still_a_valid_package() {
        let bytes = render_package(&Document::default()).unwrap();
        let document = read_part(&bytes, "word/document.xml");

        assert_well_formed(&document);
        assert!(!document.contains("<w:p>"));
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let mut model = sample_model();
        model.sections[0].entries[0].bullets = vec!["bad\u{1}char".to_string()];

        match render_package(&build(&model)) {
            Err(DocxError::InvalidText { text }) => assert_eq!(text, "bad\u{1}char"),
            other => panic!("expected InvalidText, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_control_character_in_link_is_rejected() {
        let mut model = sample_model();
        model.sections[0].entries[0].link = Some("https://example.com/\u{7}".to_string());

        assert!(matches!(
            render_package(&build(&model)),
            Err(DocxError::InvalidText { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_docx_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.docx");
        tokio::fs::write(&path, vec![0u8; 200_000]).await.unwrap();

        write_docx(&build(&sample_model()), &path).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.len() < 200_000);
        assert!(read_part(&bytes, "word/document.xml").contains("Alex Example"));
    }
}
