pub mod document;
pub mod document_builder;
pub mod resume_models;

pub use document::{Alignment, Document, Inline, Paragraph, ParagraphKind, Run};
pub use document_builder::build;
pub use resume_models::{ContentModel, Entry, Header, Section};
