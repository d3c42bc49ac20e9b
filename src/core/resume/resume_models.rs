use serde::Deserialize;

/// Everything that goes into a resume, in display order. Loaded once from a
/// data file and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentModel {
    #[serde(default)]
    pub header: Option<Header>,

    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Name line and contact line at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,

    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub title: String,

    #[serde(default)]
    pub entries: Vec<Entry>,

    /// Plain paragraphs shown after the entries (education lines, notes).
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

/// A job, membership, project or similar item.
///
/// An entry without a title is just a group of bullets, which is how
/// award/certification lists are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub bullets: Vec<String>,
}
