//! Text preprocessing — tab expansion and control character filtering.

/// Configuration for text preprocessing.
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Tab stop width (default: 8).
    pub tab_width: u8,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { tab_width: 8 }
    }
}

impl TextConfig {
    /// Create a text config with the given tab width.
    pub fn new(tab_width: u8) -> Self {
        Self { tab_width }
    }
}

/// Expand tabs to spaces according to tab stop positions.
///
/// Each tab character is replaced with enough spaces to reach the next
/// tab stop position. Tab stops are at every `tab_width` columns.
///
/// If `tab_width` is 0, tabs are simply removed.
pub fn expand_tabs(text: &str, tab_width: u8) -> String {
    if tab_width == 0 {
        return text.replace('\t', "");
    }

    let tw = tab_width as usize;
    let mut result = String::with_capacity(text.len());
    let mut column: usize = 0;

    for ch in text.chars() {
        if ch == '\t' {
            let spaces_needed = tw - (column % tw);
            for _ in 0..spaces_needed {
                result.push(' ');
            }
            column += spaces_needed;
        } else if ch == '\n' {
            result.push(ch);
            column = 0;
        } else {
            result.push(ch);
            column += 1;
        }
    }

    result
}

/// Remove or replace control characters.
///
/// Strips C0 control characters (except tab and newline) and C1 control characters.
/// Tab and newline are preserved since they have semantic meaning.
pub fn filter_control_chars(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        // Preserve tab (0x09) and newline (0x0A)
        if ch == '\t' || ch == '\n' {
            result.push(ch);
            continue;
        }

        // Filter C0 control characters (0x00-0x1F) and DEL (0x7F)
        if ch.is_ascii_control() {
            continue;
        }

        // Filter C1 control characters (0x80-0x9F)
        let code = ch as u32;
        if (0x80..=0x9F).contains(&code) {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Preprocess text: expand tabs then filter control characters.
///
/// This is a convenience function that first expands tabs to spaces
/// according to the given configuration, then strips control characters.
pub fn preprocess(text: &str, config: &TextConfig) -> String {
    let expanded = expand_tabs(text, config.tab_width);
    filter_control_chars(&expanded)
}
