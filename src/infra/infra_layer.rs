// The infra module contains implementations of core traits and everything
// else that touches the outside world (files, HTTP, zip packages).
// Each concern goes in its own submodule.

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "google_docs/mod.rs"]
pub mod google_docs;

#[path = "docx/mod.rs"]
pub mod docx;

#[path = "resume/mod.rs"]
pub mod resume;
