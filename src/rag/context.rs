//! Context assembly from retrieved passages

use crate::rag::SearchResult;

/// Separator placed between passages in the prompt context
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Assembler for creating context from search results
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Join passages in retrieval order.
    ///
    /// Passages that would push the context past the limit are dropped; the
    /// first passage is always kept.
    #[must_use]
    pub fn assemble(&self, results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (idx, result) in results.iter().enumerate() {
            let extra = if idx == 0 {
                result.text.len()
            } else {
                PASSAGE_SEPARATOR.len() + result.text.len()
            };

            if idx > 0 && context.len() + extra > self.max_context_length {
                break;
            }

            if idx > 0 {
                context.push_str(PASSAGE_SEPARATOR);
            }
            context.push_str(&result.text);
        }

        context
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(16_000) // Room for several default-sized passages
    }
}

/// Truncate to `max_chars` characters, appending an ellipsis when shortened
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: usize, text: &str) -> SearchResult {
        SearchResult {
            position,
            text: text.to_string(),
            score: 0.5,
        }
    }

    #[test]
    fn test_assemble_joins_in_order() {
        let context = ContextAssembler::default()
            .assemble(&[result(3, "Third passage."), result(0, "First passage.")]);
        assert_eq!(context, "Third passage.\n\nFirst passage.");
    }

    #[test]
    fn test_assemble_respects_limit_but_keeps_first() {
        let assembler = ContextAssembler::new(10);
        let context = assembler.assemble(&[result(0, "a long first passage"), result(1, "more")]);
        assert_eq!(context, "a long first passage");
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(ContextAssembler::default().assemble(&[]), "");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("héllo", 10), "héllo");
        assert_eq!(truncate_str("héllo world", 5), "héllo...");
    }
}
