pub mod document_publisher;

pub use document_publisher::{
    DocumentPublisher, DocumentService, PublishError, PublishStep, PublishedDocument,
    DOCUMENT_START_INDEX,
};
