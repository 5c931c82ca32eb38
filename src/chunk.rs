//! Recursive character text splitter.
//!
//! Splits document body text into overlapping [`Chunk`]s of at most
//! `chunk_size` characters. Splitting tries separators from coarsest to
//! finest (`\n\n`, `\n`, space, then between characters) so chunks follow
//! paragraph and word boundaries where the text allows it. Consecutive
//! chunks share up to `chunk_overlap` characters so sentences cut at a
//! boundary stay searchable.
//!
//! Sizes are counted in characters, not bytes.

use std::collections::VecDeque;

use crate::models::{Chunk, Document};

/// Separators tried in order; the first one present in the text wins and
/// the rest are kept for recursing into oversize pieces.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split raw text into overlapping chunks. Whitespace-only input
    /// produces no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, SEPARATORS)
    }

    /// Split a fetched document, tagging each chunk with its source URL
    /// and position within the page.
    pub fn split_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split(&doc.body)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                source: doc.source.clone(),
                chunk_index,
                text,
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces: Vec<&str> = if separator.is_empty() {
            text.split_inclusive(|_: char| true).collect()
        } else {
            split_keep_separator(text, separator)
        };

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            // Oversize piece: flush what we have, then split it with the
            // finer separators (or emit as-is when none remain).
            if !good.is_empty() {
                chunks.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good));
        }
        chunks
    }

    /// Pack contiguous pieces into chunks. When a piece would push the
    /// running total past `chunk_size`, the current window is flushed and
    /// pieces are dropped from its front until at most `chunk_overlap`
    /// characters remain to seed the next chunk.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                if let Some(doc) = join_trimmed(&current) {
                    docs.push(doc);
                }
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }

        if let Some(doc) = join_trimmed(&current) {
            docs.push(doc);
        }
        docs
    }
}

/// Split at every occurrence of `separator`, keeping the separator
/// attached to the piece that follows it. Pieces are contiguous slices
/// of the input, so rejoining them reproduces the original text.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut boundaries = vec![0usize];
    let mut from = 0usize;
    while let Some(pos) = text[from..].find(separator) {
        let at = from + pos;
        boundaries.push(at);
        from = at + separator.len();
    }
    boundaries.push(text.len());
    boundaries
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| &text[w[0]..w[1]])
        .collect()
}

fn join_trimmed(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split("  hello world  ");
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let splitter = TextSplitter::new(1000, 200);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  \n ").is_empty());
    }

    #[test]
    fn test_splits_on_words_with_overlap() {
        let splitter = TextSplitter::new(10, 3);
        let chunks = splitter.split("one two three four five");
        assert_eq!(chunks, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn test_overlap_repeats_trailing_words() {
        // "ef" fits inside the 4-char overlap window, so it reappears at
        // the start of the second chunk.
        let splitter = TextSplitter::new(10, 4);
        let chunks = splitter.split("ab cd ef gh ij kl");
        assert_eq!(chunks, vec!["ab cd ef", "ef gh ij", "ij kl"]);
    }

    #[test]
    fn test_character_fallback_without_separators() {
        let splitter = TextSplitter::new(5, 2);
        let chunks = splitter.split("abcdefghij");
        assert_eq!(chunks, vec!["abcde", "defgh", "ghij"]);
    }

    #[test]
    fn test_paragraph_boundaries_preferred() {
        let splitter = TextSplitter::new(20, 0);
        let chunks = splitter.split("first paragraph\n\nsecond paragraph");
        assert_eq!(chunks, vec!["first paragraph", "second paragraph"]);
    }

    #[test]
    fn test_chunks_are_ordered_substrings() {
        let text = "Tags give structure to a page.\n\nHeadings run from h1 down to h6 \
                    and should nest in order.\n\nLists hold related items; tables hold \
                    rows of cells. Forms collect input from the reader and send it back \
                    to the server for processing.";
        let splitter = TextSplitter::new(60, 20);
        let chunks = splitter.split(text);
        assert!(chunks.len() > 1);

        let mut search_from = 0;
        for chunk in &chunks {
            assert!(char_len(chunk) <= 60, "chunk too long: {chunk:?}");
            let pos = text[search_from..]
                .find(chunk.as_str())
                .map(|p| search_from + p)
                .unwrap_or_else(|| panic!("chunk out of order: {chunk:?}"));
            search_from = pos;
        }
    }

    #[test]
    fn test_chunks_cover_all_content() {
        // Paragraphs split at blank lines; the separator-free run falls
        // through to character windows.
        let paragraphs: Vec<String> = (0..60)
            .map(|i| format!("paragraph {i:02} covers one topic"))
            .collect();
        let run = "x".repeat(2500);
        let text = format!("{}\n\n{}", paragraphs.join("\n\n"), run);

        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split(&text);

        for marker in &paragraphs {
            assert!(
                chunks.iter().any(|chunk| chunk.contains(marker.as_str())),
                "paragraph lost: {marker}"
            );
        }
        for chunk in &chunks {
            assert!(char_len(chunk) <= 1000);
        }
        // The run re-emits as full windows, so its characters are counted
        // once per window plus one overlap per seam.
        let run_chars: usize = chunks
            .iter()
            .map(|chunk| chunk.chars().filter(|&c| c == 'x').count())
            .sum();
        assert_eq!(run_chars, 2500 + 2 * 200);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let splitter = TextSplitter::new(5, 1);
        let chunks = splitter.split("héllo wörld çafé");
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(char_len(chunk) <= 5);
        }
    }

    #[test]
    fn test_split_document_tags_source_and_index() {
        let splitter = TextSplitter::new(10, 3);
        let doc = Document {
            source: "https://example.com/page/".to_string(),
            body: "one two three four five".to_string(),
        };
        let chunks = splitter.split_document(&doc);
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source, "https://example.com/page/");
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn test_keep_separator_attaches_to_following_piece() {
        let pieces = split_keep_separator("one two three", " ");
        assert_eq!(pieces, vec!["one", " two", " three"]);
    }

    #[test]
    fn test_keep_separator_with_leading_separator() {
        let pieces = split_keep_separator(" abc", " ");
        assert_eq!(pieces, vec![" abc"]);
    }
}
