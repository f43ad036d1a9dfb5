//! Answer generation over retrieved passages

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::llm::prompts::DocumentPrompts;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::GenerationParams;
use crate::rag::ContextAssembler;
use crate::rag::SearchResult;
use crate::session::ConversationTurn;

/// How much of the conversation reaches the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    /// Current question and retrieved passages only
    #[default]
    Stateless,
    /// Recent turns are included in the prompt
    Memory,
    /// Follow-ups are rewritten into standalone questions before retrieval
    Condensing,
}

impl GeneratorMode {
    #[must_use]
    pub const fn supports_memory(self) -> bool {
        matches!(self, Self::Memory | Self::Condensing)
    }
}

/// Inputs for one answer
#[derive(Debug, Clone, Copy)]
pub struct AnswerRequest<'a> {
    pub question: &'a str,
    pub context: &'a [SearchResult],
    pub history: &'a [ConversationTurn],
}

/// Produces an answer from a question and its retrieved passages
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Whether prior turns influence answers
    fn supports_memory(&self) -> bool;

    /// Question used for retrieval; the question itself unless overridden
    async fn standalone_question(
        &self,
        question: &str,
        _history: &[ConversationTurn],
    ) -> Result<String> {
        Ok(question.to_string())
    }

    async fn answer(&self, request: AnswerRequest<'_>) -> Result<String>;
}

/// [`AnswerGenerator`] backed by a chat model
pub struct LlmAnswerGenerator {
    model: Arc<dyn ChatModel>,
    mode: GeneratorMode,
    params: GenerationParams,
    memory_turns: usize,
    assembler: ContextAssembler,
}

impl LlmAnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>, mode: GeneratorMode, params: GenerationParams) -> Self {
        Self {
            model,
            mode,
            params,
            memory_turns: 10,
            assembler: ContextAssembler::default(),
        }
    }

    /// Mode, sampling parameters and memory size from application config
    pub fn from_config(model: Arc<dyn ChatModel>, config: &AppConfig) -> Self {
        let params = GenerationParams {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        };
        Self::new(model, config.generator.mode, params)
            .with_memory_turns(config.generator.memory_turns)
    }

    #[must_use]
    pub const fn with_memory_turns(mut self, memory_turns: usize) -> Self {
        self.memory_turns = memory_turns;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> GeneratorMode {
        self.mode
    }

    /// Build the prompt sent for one answer
    #[must_use]
    pub fn build_prompt(&self, request: &AnswerRequest<'_>) -> String {
        let context = self.assembler.assemble(request.context);

        // Condensed questions already carry the conversation
        if self.mode == GeneratorMode::Memory && !request.history.is_empty() {
            let history = format_history(recent(request.history, self.memory_turns));
            DocumentPrompts::conversational_qa().render(&HashMap::from([
                ("context", context.as_str()),
                ("history", history.as_str()),
                ("question", request.question),
            ]))
        } else {
            DocumentPrompts::context_qa().render(&HashMap::from([
                ("context", context.as_str()),
                ("question", request.question),
            ]))
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    fn supports_memory(&self) -> bool {
        self.mode.supports_memory()
    }

    async fn standalone_question(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String> {
        if self.mode != GeneratorMode::Condensing || history.is_empty() {
            return Ok(question.to_string());
        }

        let history = format_history(recent(history, self.memory_turns));
        let prompt = DocumentPrompts::condense_question().render(&HashMap::from([
            ("history", history.as_str()),
            ("question", question),
        ]));

        let rewritten = self
            .model
            .complete(&[ChatMessage::user(prompt)], self.params)
            .await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            Ok(question.to_string())
        } else {
            debug!("Condensed follow-up into: {}", rewritten);
            Ok(rewritten.to_string())
        }
    }

    async fn answer(&self, request: AnswerRequest<'_>) -> Result<String> {
        let prompt = self.build_prompt(&request);
        debug!(
            "Generating answer from {} passages ({} prompt chars)",
            request.context.len(),
            prompt.len()
        );

        let answer = self
            .model
            .complete(&[ChatMessage::user(prompt)], self.params)
            .await?;
        Ok(answer.trim().to_string())
    }
}

fn recent(history: &[ConversationTurn], turns: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(turns)..]
}

fn format_history(turns: &[ConversationTurn]) -> String {
    let mut text = String::new();
    for turn in turns {
        if !text.is_empty() {
            text.push('\n');
        }
        let _ = write!(text, "{}: {}", turn.role, turn.content);
    }
    text
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::llm::prompts::ANSWER_INSTRUCTION;
    use crate::session::ChatHistory;
    use crate::tests::fakes::FailingChatModel;
    use crate::tests::fakes::RecordingChatModel;
    use crate::DocChatError;

    fn passage(text: &str) -> SearchResult {
        SearchResult {
            position: 0,
            text: text.to_string(),
            score: 1.0,
        }
    }

    fn history() -> ChatHistory {
        let mut history = ChatHistory::default();
        history.push_exchange(Utc::now(), "Who wrote the report?", "Ada Lovelace wrote it.");
        history
    }

    #[tokio::test]
    async fn test_stateless_prompt_carries_instruction_and_context() {
        let model = Arc::new(RecordingChatModel::replying("  I don't know.  "));
        let generator =
            LlmAnswerGenerator::new(model.clone(), GeneratorMode::Stateless, GenerationParams::default());
        let context = [passage("The sky is blue.")];
        let history = history();

        let answer = generator
            .answer(AnswerRequest {
                question: "What is the capital of France?",
                context: &context,
                history: history.turns(),
            })
            .await
            .unwrap();

        assert_eq!(answer, "I don't know.");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(ANSWER_INSTRUCTION));
        assert!(prompts[0].contains("Context: The sky is blue."));
        assert!(prompts[0].contains("Question: What is the capital of France?"));
        assert!(!prompts[0].contains("Ada Lovelace"));
        assert!(!generator.supports_memory());
    }

    #[tokio::test]
    async fn test_memory_mode_includes_recent_turns() {
        let model = Arc::new(RecordingChatModel::replying("She did."));
        let generator =
            LlmAnswerGenerator::new(model.clone(), GeneratorMode::Memory, GenerationParams::default());
        let context = [passage("Ada Lovelace wrote the report in 1843.")];
        let history = history();

        generator
            .answer(AnswerRequest {
                question: "When did she write it?",
                context: &context,
                history: history.turns(),
            })
            .await
            .unwrap();

        let prompt = &model.prompts()[0];
        assert!(generator.supports_memory());
        assert!(prompt.contains("Chat history:\nUser: Who wrote the report?\nAssistant: Ada Lovelace wrote it."));
    }

    #[tokio::test]
    async fn test_memory_window_keeps_latest_turns() {
        let model = Arc::new(RecordingChatModel::replying("ok"));
        let generator =
            LlmAnswerGenerator::new(model.clone(), GeneratorMode::Memory, GenerationParams::default())
                .with_memory_turns(2);
        let mut history = history();
        history.push_exchange(Utc::now(), "second question", "second answer");

        generator
            .answer(AnswerRequest {
                question: "third question",
                context: &[passage("text")],
                history: history.turns(),
            })
            .await
            .unwrap();

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("User: second question\nAssistant: second answer"));
        assert!(!prompt.contains("Who wrote the report?"));
    }

    #[tokio::test]
    async fn test_condensing_rewrites_follow_up() {
        let model = Arc::new(RecordingChatModel::replying("When did Ada Lovelace write the report?"));
        let generator =
            LlmAnswerGenerator::new(model.clone(), GeneratorMode::Condensing, GenerationParams::default());
        let history = history();

        let standalone = generator
            .standalone_question("When did she write it?", history.turns())
            .await
            .unwrap();

        assert_eq!(standalone, "When did Ada Lovelace write the report?");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Follow up question: When did she write it?"));
        assert!(prompts[0].contains("Ada Lovelace wrote it."));
    }

    #[tokio::test]
    async fn test_condensing_skipped_without_history() {
        let model = Arc::new(RecordingChatModel::replying("unused"));
        let generator =
            LlmAnswerGenerator::new(model.clone(), GeneratorMode::Condensing, GenerationParams::default());

        let standalone = generator.standalone_question("Who?", &[]).await.unwrap();
        assert_eq!(standalone, "Who?");
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_surfaces() {
        let generator = LlmAnswerGenerator::new(
            Arc::new(FailingChatModel),
            GeneratorMode::Stateless,
            GenerationParams::default(),
        );
        let result = generator
            .answer(AnswerRequest {
                question: "q",
                context: &[passage("text")],
                history: &[],
            })
            .await;
        assert!(matches!(result, Err(DocChatError::GenerationService(_))));
    }

    #[test]
    fn test_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: GeneratorMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"condensing\"").unwrap();
        assert_eq!(parsed.mode, GeneratorMode::Condensing);
        assert_eq!(GeneratorMode::default(), GeneratorMode::Stateless);
    }
}
