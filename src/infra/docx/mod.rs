pub mod docx_writer;

pub use docx_writer::write_docx;
