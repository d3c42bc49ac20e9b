use super::document::{Document, Inline, Paragraph, ParagraphKind, Run};
use super::resume_models::{ContentModel, Entry, Header};

/// Size of the name line at the top of the page.
pub const NAME_SIZE_PT: u32 = 16;

/// Splits a bullet at its first colon so labels like "Trainee:" stand out.
const LABEL_DELIMITER: char = ':';

/// Maps a content model onto a document, one pass, same order as the input.
pub fn build(model: &ContentModel) -> Document {
    let mut document = Document::default();

    if let Some(header) = &model.header {
        push_header(&mut document, header);
    }

    for section in &model.sections {
        document.paragraphs.push(
            Paragraph::new(ParagraphKind::Heading(1)).with(Inline::Text(Run::plain(&section.title))),
        );

        for entry in &section.entries {
            push_entry(&mut document, entry);
        }

        for text in &section.paragraphs {
            document
                .paragraphs
                .push(Paragraph::new(ParagraphKind::Body).with(Inline::Text(Run::plain(text))));
        }
    }

    document
}

fn push_header(document: &mut Document, header: &Header) {
    document.paragraphs.push(
        Paragraph::new(ParagraphKind::Title)
            .centered()
            .with(Inline::Text(Run::bold(&header.name).sized(NAME_SIZE_PT))),
    );

    if let Some(contact) = &header.contact {
        document.paragraphs.push(
            Paragraph::new(ParagraphKind::Body)
                .centered()
                .with(Inline::Text(Run::plain(contact))),
        );
    }
}

fn push_entry(document: &mut Document, entry: &Entry) {
    if let Some(title) = &entry.title {
        let mut line = Paragraph::new(ParagraphKind::Body).with(Inline::Text(Run::bold(title)));

        if let Some(duration) = &entry.duration {
            line = line.with(Inline::Text(Run::plain(format!("\t{}", duration))));
        }

        if let Some(link) = &entry.link {
            line = line
                .with(Inline::Text(Run::plain("\t")))
                .with(Inline::Hyperlink {
                    url: link.clone(),
                    run: Run::plain(link),
                });
        }

        document.paragraphs.push(line);
    }

    for bullet in &entry.bullets {
        let mut paragraph = Paragraph::new(ParagraphKind::Bullet);
        for run in bullet_runs(bullet) {
            paragraph = paragraph.with(Inline::Text(run));
        }
        document.paragraphs.push(paragraph);
    }
}

/// `"Trainee: Did X"` becomes bold `"Trainee:"` + plain `" Did X"`; text
/// without a colon stays a single plain run.
pub fn bullet_runs(text: &str) -> Vec<Run> {
    match text.split_once(LABEL_DELIMITER) {
        Some((label, rest)) => vec![
            Run::bold(format!("{}{}", label, LABEL_DELIMITER)),
            Run::plain(rest),
        ],
        None => vec![Run::plain(text)],
    }
}
