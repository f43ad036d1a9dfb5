//! Text preprocessing utilities for embedding generation
//!
//! Passage text is stored verbatim in the index; only the copy sent to the
//! embedding endpoint is normalized.

use tracing::debug;

use crate::errors::DocChatError;

/// Preprocess text for embedding generation
///
/// This function handles:
/// - Normalizing whitespace and newlines
/// - Replacing control characters
pub fn preprocess_text_for_embedding(text: &str) -> Result<String, DocChatError> {
    if !has_embeddable_text(text) {
        return Err(DocChatError::EmbeddingService(
            "Text contains only whitespace after preprocessing".to_string(),
        ));
    }
    let sanitized = sanitize_text(text);

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Ok(sanitized)
}

/// Whether anything survives preprocessing, i.e. some char is neither
/// whitespace nor a control character
#[must_use]
pub fn has_embeddable_text(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace() && !c.is_control())
}

/// Replace control characters and collapse runs of whitespace into single spaces
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_and_tabs_collapse() {
        let processed = preprocess_text_for_embedding("line one\r\nline\ttwo\n\n  three").unwrap();
        assert_eq!(processed, "line one line two three");
    }

    #[test]
    fn test_control_characters_removed() {
        let processed = preprocess_text_for_embedding("bell\u{7}here\u{0}").unwrap();
        assert_eq!(processed, "bell here");
    }

    #[test]
    fn test_unicode_preserved() {
        let processed = preprocess_text_for_embedding("café — 日本語 🚀").unwrap();
        assert_eq!(processed, "café — 日本語 🚀");
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(preprocess_text_for_embedding("").is_err());
        assert!(preprocess_text_for_embedding(" \n\t ").is_err());
        assert!(preprocess_text_for_embedding("\u{0}\u{1}\n").is_err());
    }

    #[test]
    fn test_has_embeddable_text() {
        assert!(has_embeddable_text("a"));
        assert!(has_embeddable_text("\u{0}é\u{1}"));
        assert!(!has_embeddable_text(""));
        assert!(!has_embeddable_text(" \u{0}\u{1}\n\u{7f}"));
    }
}
