// =============================================================================
// GOOGLE DOCS MODULE
// =============================================================================
//
// Publishing side of the curriculum pipeline. The core layer only knows about
// `DocumentService`; this module talks HTTP to the Docs and Drive APIs.

pub mod google_docs_client;

pub use google_docs_client::GoogleDocsClient;
