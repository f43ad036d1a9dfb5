//! Overlapping passage splitter
//!
//! Windows are measured in characters (Unicode scalar values). Each window is
//! cut at the best natural boundary near its end, and the next window starts
//! `chunk_overlap` characters before that cut.

use serde::Serialize;

use crate::config::ChunkingConfig;
use crate::errors::DocChatError;
use crate::errors::Result;

/// Break points, strongest first. A cut lands right after the separator.
const BOUNDARY_TIERS: &[&[&str]] = &[
    &["\n\n"],
    &[". ", "! ", "? ", ".\n", "!\n", "?\n"],
    &["\n"],
    &[" ", "\t"],
];

/// A slice of the document text, identified by its position in the sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    pub position: usize,
    pub text: String,
    /// Character offset of the first character in the document
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
}

impl Passage {
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocChatError::ConfigError(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocChatError::ConfigError(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into ordered, overlapping passages
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Passage> {
        // Byte offset of every char boundary, including the end of the string
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut passages = Vec::new();
        if total == 0 {
            return passages;
        }

        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                total
            } else {
                self.find_cut(text, &offsets, start, window_end)
            };

            passages.push(Passage {
                position: passages.len(),
                text: text[offsets[start]..offsets[end]].to_string(),
                start,
                end,
            });

            if end == total {
                break;
            }
            // find_cut never returns a cut at or before start + overlap
            start = end - self.chunk_overlap;
        }

        passages
    }

    /// Best cut in `(start + overlap, window_end]`, or a hard cut at `window_end`
    fn find_cut(&self, text: &str, offsets: &[usize], start: usize, window_end: usize) -> usize {
        let min_cut = start + self.chunk_overlap + 1;
        let window = &text[offsets[start]..offsets[window_end]];

        for tier in BOUNDARY_TIERS {
            let best = tier
                .iter()
                .filter_map(|sep| window.rfind(sep).map(|idx| idx + sep.len()))
                .max();

            if let Some(byte_cut) = best {
                let absolute = offsets[start] + byte_cut;
                let cut = offsets
                    .binary_search(&absolute)
                    .unwrap_or_else(|insert_at| insert_at);
                if cut >= min_cut {
                    return cut;
                }
            }
        }

        window_end
    }
}

/// Rebuild the original text from passages by joining each passage's novel span
#[must_use]
pub fn reassemble(passages: &[Passage]) -> String {
    let mut text = String::new();
    let mut covered: usize = 0;

    for passage in passages {
        let skip = covered.saturating_sub(passage.start);
        text.extend(passage.text.chars().skip(skip));
        covered = passage.end;
    }

    text
}
