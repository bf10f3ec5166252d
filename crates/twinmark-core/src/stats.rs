//! Word, character and line counts for the status bar.

use std::sync::LazyLock;

use regex::Regex;

static CJK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\u{4e00}-\u{9fff}]").unwrap());
static LATIN_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// CJK ideographs count one each; runs of ASCII letters count as one word.
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
}

impl DocumentStats {
    pub fn compute(text: &str) -> Self {
        Self {
            words: CJK.find_iter(text).count() + LATIN_WORD.find_iter(text).count(),
            chars: text.chars().count(),
            lines: text.matches('\n').count() + 1,
        }
    }
}

impl std::fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words, {} chars, {} lines",
            self.words, self.chars, self.lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_words_and_lines() {
        let stats = DocumentStats::compute("# Hello world\n\nit's 2024");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.chars, 24);
    }

    #[test]
    fn cjk_counts_per_character() {
        let stats = DocumentStats::compute("你好 world");
        assert_eq!(stats.words, 3);
        assert_eq!(stats.chars, 8);
    }

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(
            DocumentStats::compute(""),
            DocumentStats {
                words: 0,
                chars: 0,
                lines: 1
            }
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            DocumentStats::compute("a b").to_string(),
            "2 words, 3 chars, 1 lines"
        );
    }
}
