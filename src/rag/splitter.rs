//! Separator-based text splitter.
//!
//! Splits the source on a separator, then greedily packs the pieces back
//! together into chunks of at most `chunk_size` characters, carrying up to
//! `chunk_overlap` characters of trailing pieces into the next chunk.
//! Lengths are counted in `char`s so CJK text is measured per character.

/// Configuration for the splitter.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters of context shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Piece separator
    pub separator: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            separator: "\n".to_string(),
        }
    }
}

/// A text chunk with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Chunk index within the source
    pub chunk_index: usize,
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split text into overlapping chunks.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let separator = self.config.separator.as_str();
        let pieces: Vec<&str> = if separator.is_empty() {
            vec![text]
        } else {
            text.split(separator).collect()
        };
        let pieces: Vec<&str> = pieces.into_iter().filter(|p| !p.is_empty()).collect();

        self.merge_pieces(&pieces)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| TextChunk { text, chunk_index })
            .collect()
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let separator = self.config.separator.as_str();
        let separator_len = char_len(separator);
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let piece_len = char_len(piece);
            let joint = if window.is_empty() { 0 } else { separator_len };

            if total + piece_len + joint > chunk_size {
                if total > chunk_size {
                    tracing::warn!(
                        "Created a chunk of {} characters, longer than the configured {}",
                        total,
                        chunk_size
                    );
                }

                if !window.is_empty() {
                    if let Some(chunk) = join_pieces(&window, separator) {
                        chunks.push(chunk);
                    }

                    while total > overlap
                        || (total > 0
                            && total
                                + piece_len
                                + if window.is_empty() { 0 } else { separator_len }
                                > chunk_size)
                    {
                        let Some(first) = window.first() else {
                            break;
                        };
                        let removed_joint = if window.len() > 1 { separator_len } else { 0 };
                        total -= char_len(first) + removed_joint;
                        window.remove(0);
                    }
                }
            }

            window.push(piece);
            total += piece_len + if window.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join_pieces(&window, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_pieces(pieces: &[&str], separator: &str) -> Option<String> {
    let joined = pieces.join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        })
    }

    fn texts(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = splitter(500, 50).split("问卷一\n问题1【单选】\n");
        assert_eq!(texts(&chunks), vec!["问卷一\n问题1【单选】"]);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn lines_are_packed_with_overlap() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let chunks = splitter(9, 4).split(text);

        assert_eq!(texts(&chunks), vec!["aaaa\nbbbb", "bbbb\ncccc", "cccc\ndddd"]);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn zero_overlap_does_not_repeat_pieces() {
        let chunks = splitter(9, 0).split("aaaa\nbbbb\ncccc\ndddd");
        assert_eq!(texts(&chunks), vec!["aaaa\nbbbb", "cccc\ndddd"]);
    }

    #[test]
    fn oversize_piece_becomes_its_own_chunk() {
        let long_line = "x".repeat(20);
        let text = format!("ab\n{}\ncd", long_line);
        let chunks = splitter(10, 2).split(&text);

        assert_eq!(texts(&chunks), vec!["ab", long_line.as_str(), "cd"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Seven CJK characters per line: 21 bytes but 7 chars.
        let chunks = splitter(15, 0).split("满意度调研问卷\n推荐意愿调研卷");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn blank_lines_and_whitespace_only_text_are_dropped() {
        assert!(splitter(10, 0).split("").is_empty());
        assert!(splitter(10, 0).split("\n\n\n").is_empty());
        assert!(splitter(10, 0).split("   ").is_empty());

        let chunks = splitter(100, 0).split("a\n\n\nb");
        assert_eq!(texts(&chunks), vec!["a\nb"]);
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "问卷1. 信用卡满意度\n".repeat(80);
        let first = splitter(120, 20).split(&text);
        let second = splitter(120, 20).split(&text);
        assert_eq!(first, second);
        assert!(first.len() > 1);
        assert!(first.iter().all(|c| c.text.chars().count() <= 120));
    }
}
