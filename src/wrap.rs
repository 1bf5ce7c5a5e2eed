//! Text wrapping for the layout engine's text nodes.
//!
//! Content is split into paragraphs by explicit newlines; each
//! paragraph wraps independently according to [`WrapMode`]. Display
//! width is measured per grapheme cluster (1 for narrow, 2 for wide),
//! not per `char`, so combining marks and multi-codepoint emoji don't
//! inflate a line's measured width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// How a text node wraps content that exceeds its content width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping: each paragraph is one line, truncated to the
    /// content width with a grapheme-aware, ellipsis-free cut.
    None,
    /// Wrap at word (whitespace) boundaries; words longer than the
    /// content width fall back to a grapheme-boundary break.
    #[default]
    Soft,
    /// Wrap at grapheme-cluster boundaries regardless of word shape.
    Hard,
}

/// A single display line produced by wrapping one paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapLine {
    /// The line's text content.
    pub text: String,
    /// Index of the source paragraph (0-based, by explicit newline).
    pub paragraph: usize,
}

/// Display width of a string, summed per grapheme cluster.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(|g| UnicodeWidthStr::width(g).max(if g.chars().all(|c| c.is_control()) { 0 } else { 1 })).sum()
}

/// Split `content` into paragraphs by explicit newline and wrap each
/// to `width` cells according to `mode`. `width` of 0 degrades to one
/// grapheme per line rather than looping forever.
pub fn wrap_text(content: &str, width: usize, mode: WrapMode) -> Vec<WrapLine> {
    let mut lines = Vec::new();
    for (paragraph, para_text) in content.split('\n').enumerate() {
        match mode {
            WrapMode::None => lines.push(WrapLine {
                text: truncate_to_width(para_text, width),
                paragraph,
            }),
            WrapMode::Soft => {
                for text in wrap_paragraph_soft(para_text, width) {
                    lines.push(WrapLine { text, paragraph });
                }
            }
            WrapMode::Hard => {
                for text in wrap_paragraph_hard(para_text, width) {
                    lines.push(WrapLine { text, paragraph });
                }
            }
        }
    }
    if lines.is_empty() {
        lines.push(WrapLine {
            text: String::new(),
            paragraph: 0,
        });
    }
    lines
}

/// Truncate `text` to at most `width` display cells at a grapheme
/// boundary, without appending an ellipsis.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let gw = UnicodeWidthStr::width(g);
        if used + gw > width {
            break;
        }
        out.push_str(g);
        used += gw;
    }
    out
}

/// Break `text` at grapheme-cluster boundaries into lines of at most
/// `width` display cells each.
pub fn wrap_paragraph_hard(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for g in text.graphemes(true) {
        let gw = UnicodeWidthStr::width(g);
        if current_width + gw > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push_str(g);
        current_width += gw;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Break `text` at word (whitespace) boundaries into lines of at most
/// `width` display cells, falling back to a grapheme break for words
/// that alone exceed `width`.
pub fn wrap_paragraph_soft(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_inclusive(' ') {
        let trimmed = word.trim_end_matches(' ');
        let trailing_spaces = word.len() - trimmed.len();
        let word_width = UnicodeWidthStr::width(trimmed);

        if word_width > width {
            // The word alone doesn't fit; flush what we have, then
            // hard-break the long word across as many lines as needed.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let mut broken = wrap_paragraph_hard(trimmed, width);
            if let Some(last) = broken.pop() {
                current = last;
                current_width = UnicodeWidthStr::width(current.as_str());
            }
            lines.extend(broken);
            for _ in 0..trailing_spaces {
                if current_width + 1 > width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                } else {
                    current.push(' ');
                    current_width += 1;
                }
            }
            continue;
        }

        if current_width + word_width > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            current.push_str(trimmed);
            current_width += word_width;
            for _ in 0..trailing_spaces {
                if current_width + 1 > width {
                    break;
                }
                current.push(' ');
                current_width += 1;
            }
        } else {
            current.push_str(word);
            current_width += word_width + trailing_spaces;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current.trim_end_matches(' ').to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_counts_wide_graphemes_as_two() {
        assert_eq!(display_width("日本語"), 6);
        assert_eq!(display_width("abc"), 3);
    }

    #[test]
    fn truncate_cuts_at_grapheme_boundary() {
        assert_eq!(truncate_to_width("hello world", 5), "hello");
        assert_eq!(truncate_to_width("hi", 10), "hi");
    }

    #[test]
    fn truncate_does_not_split_wide_grapheme() {
        // width 5 over "日本語" (2+2+2): only two chars (width 4) fit.
        assert_eq!(truncate_to_width("日本語", 5), "日本");
    }

    #[test]
    fn wrap_mode_none_truncates_each_paragraph() {
        let lines = wrap_text("hello world\nsecond line", 5, WrapMode::None);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "hello");
        assert_eq!(lines[1].text, "secon");
    }

    #[test]
    fn wrap_mode_soft_breaks_on_words() {
        let lines = wrap_text("hello world foo", 12, WrapMode::Soft);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "hello world");
        assert_eq!(lines[1].text, "foo");
    }

    #[test]
    fn wrap_mode_soft_long_word_hard_breaks() {
        let lines = wrap_text("abcdefghij", 5, WrapMode::Soft);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "abcde");
        assert_eq!(lines[1].text, "fghij");
    }

    #[test]
    fn wrap_mode_hard_ignores_word_boundaries() {
        let lines = wrap_text("hello world", 4, WrapMode::Hard);
        assert_eq!(lines[0].text, "hell");
        assert_eq!(lines[1].text, "o wo");
    }

    #[test]
    fn explicit_newlines_become_paragraphs() {
        let lines = wrap_text("a\nb\nc", 10, WrapMode::Soft);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().map(|l| l.paragraph).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn empty_content_yields_one_empty_line() {
        let lines = wrap_text("", 10, WrapMode::Soft);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "");
    }

    #[test]
    fn zero_width_does_not_loop_forever() {
        let lines = wrap_text("hello", 0, WrapMode::Hard);
        assert!(!lines.is_empty());
    }
}
