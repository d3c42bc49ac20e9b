// Web layer - the curriculum form, its submission handler and the result page.

#[path = "handlers.rs"]
pub mod handlers;

#[path = "pages.rs"]
pub mod pages;

pub use handlers::{router, AppState, GeneratorFactory};
