// In-memory document structure produced by the builder and consumed by a
// file writer. Deliberately small: just what a resume needs.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    /// Large name line at the top.
    Title,
    Heading(u8),
    Bullet,
    Body,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub alignment: Alignment,
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn new(kind: ParagraphKind) -> Self {
        Self {
            kind,
            alignment: Alignment::Left,
            inlines: Vec::new(),
        }
    }

    pub fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    pub fn with(mut self, inline: Inline) -> Self {
        self.inlines.push(inline);
        self
    }

    /// Concatenated visible text.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text(run) => run.text.as_str(),
                Inline::Hyperlink { run, .. } => run.text.as_str(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(Run),
    Hyperlink { url: String, run: Run },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    /// Font size in points. `None` keeps the paragraph style's size.
    pub size_pt: Option<u32>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            size_pt: None,
        }
    }

    pub fn sized(mut self, size_pt: u32) -> Self {
        self.size_pt = Some(size_pt);
        self
    }
}
