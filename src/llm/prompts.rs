//! Prompt templates for document question answering

use std::collections::HashMap;

/// Instruction every answer prompt starts with
pub const ANSWER_INSTRUCTION: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the template with variables.
    ///
    /// Substituted values are never rescanned, so document text containing
    /// `{{...}}` is inserted as-is. Unknown placeholders are left untouched.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find("{{") {
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                break;
            };
            let name = &after_open[..close];
            result.push_str(&rest[..open]);
            match values.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after_open[close + 2..];
        }

        result.push_str(rest);
        result
    }
}

/// Standard document QA prompt templates
pub struct DocumentPrompts;

impl DocumentPrompts {
    /// Answer from retrieved context only
    #[must_use]
    pub fn context_qa() -> PromptTemplate {
        PromptTemplate::new(format!(
            "{ANSWER_INSTRUCTION}

Context: {{{{context}}}}

Question: {{{{question}}}}

Answer:"
        ))
    }

    /// Answer from retrieved context, with the conversation so far
    #[must_use]
    pub fn conversational_qa() -> PromptTemplate {
        PromptTemplate::new(format!(
            "{ANSWER_INSTRUCTION}

Context: {{{{context}}}}

Chat history:
{{{{history}}}}

Question: {{{{question}}}}

Answer:"
        ))
    }

    /// Rewrite a follow-up into a question that stands on its own
    #[must_use]
    pub fn condense_question() -> PromptTemplate {
        PromptTemplate::new(
            "Given the following conversation and a follow up question, rephrase the follow up \
question to be a standalone question, in its original language. Return only the question.

Chat history:
{{history}}

Follow up question: {{question}}

Standalone question:",
        )
    }
}
