//! Markdown-aware recursive character splitter.
//!
//! Text is split on the highest-priority separator present (headings first,
//! single characters last). Pieces that still exceed `chunk_size` are split
//! again with the remaining separators; small pieces are merged back into
//! chunks of at most `chunk_size` characters, with up to `chunk_overlap`
//! characters carried over between consecutive chunks.
//!
//! Separators stay attached to the start of the piece that follows them, so
//! a chunk that begins at a heading keeps its `#` marker. Lengths are counted
//! in chars.

use std::collections::VecDeque;

const MARKDOWN_SEPARATORS: [&str; 14] = [
    "\n# ",
    "\n## ",
    "\n### ",
    "\n#### ",
    "\n##### ",
    "\n###### ",
    "```\n",
    "\n***\n",
    "\n---\n",
    "\n___\n",
    "\n\n",
    "\n",
    " ",
    "",
];

#[derive(Debug, Clone)]
pub struct MarkdownSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl MarkdownSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &MARKDOWN_SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; "" always matches.
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Greedily packs pieces into chunks, keeping a tail of earlier pieces
    /// (at most `chunk_overlap` chars) at the head of the next chunk.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &window);

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        push_trimmed(&mut chunks, &window);
        chunks
    }
}

fn push_trimmed(chunks: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Splits `text` on `separator`, prefixing every piece after the first with
/// the separator itself. An empty separator splits into single chars.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut parts = text.split(separator);
    if let Some(first) = parts.next() {
        if !first.is_empty() {
            pieces.push(first.to_string());
        }
    }
    for part in parts {
        pieces.push(format!("{separator}{part}"));
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = MarkdownSplitter::new(500, 50);
        let chunks = splitter.split("  # Title\n\nShort body.  ");
        assert_eq!(chunks, vec!["# Title\n\nShort body.".to_string()]);
    }

    #[test]
    fn test_splits_on_headings_first() {
        let splitter = MarkdownSplitter::new(40, 0);
        let text = "# Symptoms\nLow mood and fatigue.\n# Treatment\nTherapy and medication.";
        let chunks = splitter.split(text);
        assert_eq!(
            chunks,
            vec![
                "# Symptoms\nLow mood and fatigue.".to_string(),
                "# Treatment\nTherapy and medication.".to_string(),
            ]
        );
    }

    #[test]
    fn test_chunks_respect_size() {
        let splitter = MarkdownSplitter::new(30, 5);
        let text = "word ".repeat(100);
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 30), "{chunks:?}");
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let splitter = MarkdownSplitter::new(20, 10);
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = splitter.split(text);
        assert!(chunks.len() >= 2);
        // the tail word of one chunk reappears at the head of the next
        let first_tail = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].starts_with(first_tail), "{chunks:?}");
    }

    #[test]
    fn test_unbroken_text_falls_back_to_chars() {
        let splitter = MarkdownSplitter::new(10, 0);
        let text = "x".repeat(25);
        let chunks = splitter.split(&text);
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![10, 10, 5]);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let splitter = MarkdownSplitter::new(5, 0);
        let chunks = splitter.split("우울증은치료가능한질환");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert_eq!(chunks.concat(), "우울증은치료가능한질환");
    }

    #[test]
    fn test_separator_kept_on_following_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }

    #[test]
    fn test_overlap_clamped_below_size() {
        let splitter = MarkdownSplitter::new(10, 50);
        assert_eq!(splitter.chunk_overlap, 9);
    }
}
