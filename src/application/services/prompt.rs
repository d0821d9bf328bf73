use crate::application::template::render;

/// Renders the retrieval-augmented prompt from a template with `{question}`
/// and `{context}` placeholders.
#[derive(Debug, Clone)]
pub struct RagPrompt {
    template: String,
}

impl RagPrompt {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn build(&self, question: &str, context: &str) -> String {
        render(
            &self.template,
            &[("question", question), ("context", context)],
        )
    }
}
