pub mod curriculum_models;
pub mod curriculum_service;
pub mod prompt;
pub mod text_generator;

pub use curriculum_models::{FormParameters, PublishedCurriculum};
pub use curriculum_service::{CurriculumError, CurriculumService};
pub use text_generator::{GenerationError, TextGenerator};
