//! Recursive character chunking strategy
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then single characters) until every piece fits the window, then
//! merges consecutive pieces into windows that carry a bounded tail of the
//! previous window forward as overlap. Windows are exact substrings of the
//! input, so overlapping windows can be stitched back into the original text.

use std::collections::VecDeque;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Span of characters `[start, end)` in the source text
type Span = (usize, usize);

/// Character-offset view over a string
struct CharIndex<'a> {
    text: &'a str,
    /// Byte offset of every char, plus the total byte length
    offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn slice(&self, (start, end): Span) -> &'a str {
        &self.text[self.offsets[start]..self.offsets[end]]
    }

    fn char_at_byte(&self, byte: usize) -> usize {
        self.offsets.partition_point(|&offset| offset < byte)
    }

    fn byte_at_char(&self, index: usize) -> usize {
        self.offsets[index]
    }
}

/// Chunker that splits text on a separator hierarchy with overlap
#[derive(Debug, Clone)]
pub struct RecursiveCharacterChunker {
    separators: Vec<String>,
}

impl Default for RecursiveCharacterChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveCharacterChunker {
    pub fn new() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Use a custom separator hierarchy. An empty separator is always appended
    /// as the last resort so that any text can be split.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        if self.separators.last().map(|s| !s.is_empty()).unwrap_or(true) {
            self.separators.push(String::new());
        }
        self
    }

    /// Break `span` into pieces of at most `size` chars, covering it exactly
    fn split_span(
        &self,
        index: &CharIndex<'_>,
        span: Span,
        level: usize,
        size: usize,
        out: &mut Vec<Span>,
    ) {
        let (start, end) = span;

        if end - start <= size {
            out.push(span);
            return;
        }

        for (offset, separator) in self.separators.iter().enumerate().skip(level) {
            if separator.is_empty() {
                let mut cursor = start;
                while cursor < end {
                    let next = (cursor + size).min(end);
                    out.push((cursor, next));
                    cursor = next;
                }
                return;
            }

            let slice = index.slice(span);
            if !slice.contains(separator.as_str()) {
                continue;
            }

            let base = index.byte_at_char(start);
            let mut piece_start = start;
            let mut pieces = Vec::new();

            for (byte, matched) in slice.match_indices(separator.as_str()) {
                let piece_end = index.char_at_byte(base + byte + matched.len());
                if piece_end > piece_start {
                    pieces.push((piece_start, piece_end));
                    piece_start = piece_end;
                }
            }
            if piece_start < end {
                pieces.push((piece_start, end));
            }

            for piece in pieces {
                self.split_span(index, piece, offset + 1, size, out);
            }
            return;
        }

        // Unreachable with a trailing empty separator, kept for custom hierarchies
        out.push(span);
    }

    /// Greedily merge consecutive pieces into overlapping windows
    fn merge(pieces: &[Span], config: &ChunkingConfig) -> Vec<Span> {
        let mut windows = Vec::new();
        let mut current: VecDeque<Span> = VecDeque::new();
        let mut current_len = 0;

        for &(start, end) in pieces {
            let len = end - start;

            if current_len + len > config.chunk_size {
                if let (Some(first), Some(last)) = (current.front(), current.back()) {
                    windows.push((first.0, last.1));
                }

                while current_len > config.chunk_overlap
                    || (current_len > 0 && current_len + len > config.chunk_size)
                {
                    match current.pop_front() {
                        Some((s, e)) => current_len -= e - s,
                        None => break,
                    }
                }
            }

            current.push_back((start, end));
            current_len += len;
        }

        if let (Some(first), Some(last)) = (current.front(), current.back()) {
            windows.push((first.0, last.1));
        }

        windows
    }
}

impl ChunkingStrategy for RecursiveCharacterChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        if content.is_empty() {
            return Ok(vec![]);
        }

        let index = CharIndex::new(content);
        let mut pieces = Vec::new();
        self.split_span(&index, (0, index.char_len()), 0, config.chunk_size, &mut pieces);

        let windows = Self::merge(&pieces, config);
        let total = windows.len();

        Ok(windows
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                Chunk::new(
                    index.slice(span),
                    ChunkMetadata::new(i, total, span.0, span.1),
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "recursive_character"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[Chunk]) -> String {
        let mut text = String::new();
        let mut covered = 0;

        for chunk in chunks {
            let skip = covered - chunk.metadata.char_start;
            text.extend(chunk.content.chars().skip(skip));
            covered = chunk.metadata.char_end;
        }

        text
    }

    fn assert_window_invariants(text: &str, chunks: &[Chunk], config: &ChunkingConfig) {
        let chars: Vec<char> = text.chars().collect();

        for chunk in chunks {
            assert!(chunk.char_len() <= config.chunk_size, "window too long");
            assert_eq!(chunk.content.chars().count(), chunk.char_len());
            let expected: String = chars[chunk.metadata.char_start..chunk.metadata.char_end]
                .iter()
                .collect();
            assert_eq!(chunk.content, expected, "window is not a substring");
        }

        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0].metadata, &pair[1].metadata);
            assert!(next.char_start > prev.char_start);
            assert!(next.char_start <= prev.char_end, "gap between windows");
            assert!(
                prev.char_end - next.char_start <= config.chunk_overlap,
                "overlap too large"
            );
            assert!(next.char_end > prev.char_end);
        }

        if let Some(first) = chunks.first() {
            assert_eq!(first.metadata.char_start, 0);
        }
        if let Some(last) = chunks.last() {
            assert_eq!(last.metadata.char_end, chars.len());
        }

        assert_eq!(reconstruct(chunks), text);
    }

    fn sample_page() -> String {
        let paragraph = "Lock your vehicle and keep valuables out of sight. \
            Park in well-lit areas close to building entrances.\n\
            Report suspicious activity to the non-emergency line at 416-808-2222.";
        (0..12)
            .map(|i| format!("## Section {}\n\n{} {}", i, paragraph, "Stay alert. ".repeat(i)))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_empty_content() {
        let chunker = RecursiveCharacterChunker::new();
        let chunks = chunker.chunk("", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_content_is_one_chunk() {
        let chunker = RecursiveCharacterChunker::new();
        let chunks = chunker
            .chunk("Call 911 in an emergency.", &ChunkingConfig::default())
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Call 911 in an emergency.");
        assert_eq!(chunks[0].metadata, ChunkMetadata::new(0, 1, 0, 25));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let chunker = RecursiveCharacterChunker::new();
        assert!(chunker.chunk("text", &ChunkingConfig::new(10, 10)).is_err());
    }

    #[test]
    fn test_default_window_invariants() {
        let chunker = RecursiveCharacterChunker::new();
        let config = ChunkingConfig::default();
        let text = sample_page();
        assert!(text.chars().count() > config.chunk_size);

        let chunks = chunker.chunk(&text, &config).unwrap();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.metadata.total_chunks == chunks.len()));
        assert_window_invariants(&text, &chunks, &config);
    }

    #[test]
    fn test_invariants_across_sizes() {
        let chunker = RecursiveCharacterChunker::new();
        let text = sample_page();

        for (size, overlap) in [(50, 10), (120, 40), (300, 0), (333, 100), (7, 3)] {
            let config = ChunkingConfig::new(size, overlap);
            let chunks = chunker.chunk(&text, &config).unwrap();
            assert_window_invariants(&text, &chunks, &config);
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = RecursiveCharacterChunker::new();
        let first = "a".repeat(60);
        let second = "b".repeat(60);
        let text = format!("{}\n\n{}", first, second);

        let chunks = chunker.chunk(&text, &ChunkingConfig::new(100, 20)).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, format!("{}\n\n", first));
        assert_eq!(chunks[1].content, second);
    }

    #[test]
    fn test_unbroken_text_is_hard_split() {
        let chunker = RecursiveCharacterChunker::new();
        let text = "x".repeat(250);
        let config = ChunkingConfig::new(100, 20);

        let chunks = chunker.chunk(&text, &config).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_window_invariants(&text, &chunks, &config);
    }

    #[test]
    fn test_overlap_carries_whole_words() {
        let chunker = RecursiveCharacterChunker::new();
        let text = (0..60).map(|i| format!("w{:02}", i)).collect::<Vec<_>>().join(" ");
        let config = ChunkingConfig::new(40, 12);

        let chunks = chunker.chunk(&text, &config).unwrap();

        assert_window_invariants(&text, &chunks, &config);
        for pair in chunks.windows(2) {
            assert!(pair[0].metadata.char_end > pair[1].metadata.char_start);
            assert!(pair[1].content.starts_with('w'));
        }
    }

    #[test]
    fn test_multibyte_text_uses_character_offsets() {
        let chunker = RecursiveCharacterChunker::new();
        let text = "Sécurité à Montréal: prévention du vol. ".repeat(20);
        let config = ChunkingConfig::new(64, 16);

        let chunks = chunker.chunk(&text, &config).unwrap();

        assert!(chunks.len() > 1);
        assert_window_invariants(&text, &chunks, &config);
    }

    #[test]
    fn test_custom_separators_get_fallback() {
        let chunker = RecursiveCharacterChunker::new().with_separators(vec!["|".to_string()]);
        let text = format!("{}|{}", "a".repeat(30), "b".repeat(30));
        let config = ChunkingConfig::new(20, 5);

        let chunks = chunker.chunk(&text, &config).unwrap();

        assert_window_invariants(&text, &chunks, &config);
        assert_eq!(chunker.name(), "recursive_character");
    }
}
