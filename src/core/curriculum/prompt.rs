use super::curriculum_models::FormParameters;

/// Title of the published document for a given subject.
pub fn document_title(subject: &str) -> String {
    format!("Curriculum: {}", subject.trim())
}

/// Builds the single generation prompt for a form submission.
pub fn build_prompt(params: &FormParameters) -> String {
    format!(
        "Generate a detailed curriculum outline based on the following information:\n\
         \n\
         Subject/Course Title: {subject}\n\
         Target Audience: {audience}\n\
         Course Duration: {duration}\n\
         Learning Objectives:\n\
         {objectives}\n\
         \n\
         Key Topics/Modules:\n\
         {topics}\n\
         \n\
         Additional Instructions: {instructions}\n\
         \n\
         Please structure the output clearly, week by week or module by module, \
         including the topics covered, activities, and potential assessments for each section.\n\
         Ensure the output is well-formatted plain text suitable for a document.\n",
        subject = params.subject.trim(),
        audience = params.audience.trim(),
        duration = params.duration.trim(),
        objectives = params.objectives.trim(),
        topics = params.topics.trim(),
        instructions = params.instructions.trim(),
    )
}
