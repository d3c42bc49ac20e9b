use serde::Deserialize;
use std::fmt;

/// One submission of the curriculum form. All fields are free text.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct FormParameters {
    pub subject: String,
    pub audience: String,
    pub duration: String,
    /// One objective per line.
    pub objectives: String,
    /// One topic or module per line.
    pub topics: String,
    pub instructions: String,
    pub api_key: String,
}

impl FormParameters {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Pre-filled example course shown on a fresh form.
impl Default for FormParameters {
    fn default() -> Self {
        Self {
            subject: "Introduction to Python Programming".to_string(),
            audience: "Beginners with no prior programming experience".to_string(),
            duration: "8 weeks".to_string(),
            objectives: [
                "Understand fundamental programming concepts (variables, data types, control flow)",
                "Write basic Python scripts",
                "Work with common data structures (lists, dictionaries)",
                "Read from and write to files",
                "Understand the basics of functions",
            ]
            .join("\n"),
            topics: [
                "Week 1: Introduction, Setup, Variables, Basic Data Types",
                "Week 2: Operators, Expressions, Input/Output",
                "Week 3: Control Flow (if/else, loops)",
                "Week 4: Lists and Tuples",
                "Week 5: Dictionaries and Sets",
                "Week 6: Functions",
                "Week 7: File Handling",
                "Week 8: Basic Error Handling, Course Wrap-up",
            ]
            .join("\n"),
            instructions: "Include suggestions for simple weekly exercises or mini-projects."
                .to_string(),
            api_key: String::new(),
        }
    }
}

impl fmt::Debug for FormParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormParameters")
            .field("subject", &self.subject)
            .field("audience", &self.audience)
            .field("duration", &self.duration)
            .field("objectives", &self.objectives)
            .field("topics", &self.topics)
            .field("instructions", &self.instructions)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// What a successful run hands back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCurriculum {
    pub title: String,
    pub document_id: String,
    pub view_link: String,
    /// The generated text exactly as inserted into the document.
    pub body: String,
}
