pub mod content_file;

pub use content_file::load_content_model;
