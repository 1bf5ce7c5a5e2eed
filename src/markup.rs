//! The markup micro-language: `[style+ color* on color*]text[/]`,
//! nested, with `[[`/`]]` escaping literal brackets.
//!
//! Parsing never fails: a tag whose contents don't match the grammar
//! is kept as literal text (brackets and all), per spec's "invalid
//! tags degrade to literal text". Color resolution against a theme is
//! a separate step ([`resolve`]) so parsing stays independent of
//! whatever theme happens to be active.

use crate::color::Color;
use crate::style::Style;

/// A color reference inside a markup tag: either a literal value
/// (`#rrggbb`/`#rgb`) or a name to look up in the active theme
/// (`$ThemeName`).
#[derive(Clone, Debug, PartialEq)]
pub enum ColorRef {
    Literal(Color),
    Theme(String),
}

/// One contiguous run of text sharing the same resolved style, in
/// source order.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkupSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub fg: Option<ColorRef>,
    pub bg: Option<ColorRef>,
}

#[derive(Clone, Debug, Default)]
struct Frame {
    bold: bool,
    italic: bool,
    underline: bool,
    fg: Option<ColorRef>,
    bg: Option<ColorRef>,
}

/// Parse a markup string into styled spans. Always succeeds.
///
/// The unstyled root frame is kept outside `stack` (which holds only
/// frames pushed by an open tag), so the current frame is always
/// available without indexing into a stack that could be empty.
pub fn parse(input: &str) -> Vec<MarkupSpan> {
    let chars: Vec<char> = input.chars().collect();
    let root = Frame::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' if chars.get(i + 1) == Some(&'[') => {
                text.push('[');
                i += 2;
            }
            ']' if chars.get(i + 1) == Some(&']') => {
                text.push(']');
                i += 2;
            }
            '[' => {
                if let Some(end) = chars[i + 1..].iter().position(|c| *c == ']') {
                    let end = i + 1 + end;
                    let tag: String = chars[i + 1..end].iter().collect();
                    if tag == "/" {
                        flush(&mut spans, &mut text, &stack, &root);
                        stack.pop();
                        i = end + 1;
                    } else if let Some(frame) = parse_tag(&tag, stack.last().unwrap_or(&root)) {
                        flush(&mut spans, &mut text, &stack, &root);
                        stack.push(frame);
                        i = end + 1;
                    } else {
                        text.push('[');
                        i += 1;
                    }
                } else {
                    text.push('[');
                    i += 1;
                }
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    flush(&mut spans, &mut text, &stack, &root);
    spans
}

fn flush(spans: &mut Vec<MarkupSpan>, text: &mut String, stack: &[Frame], root: &Frame) {
    if text.is_empty() {
        return;
    }
    let frame = stack.last().unwrap_or(root);
    spans.push(MarkupSpan {
        text: std::mem::take(text),
        bold: frame.bold,
        italic: frame.italic,
        underline: frame.underline,
        fg: frame.fg.clone(),
        bg: frame.bg.clone(),
    });
}

/// Parse one tag's contents (without the surrounding brackets),
/// inheriting from `parent`. Returns `None` if the tag is malformed,
/// signaling the caller to treat the whole `[...]` as literal text.
fn parse_tag(tag: &str, parent: &Frame) -> Option<Frame> {
    let mut frame = parent.clone();
    let mut tokens = tag.split_whitespace();
    let mut saw_token = false;

    for token in tokens.by_ref() {
        saw_token = true;
        if token.eq_ignore_ascii_case("on") {
            break;
        }
        match token.to_ascii_lowercase().as_str() {
            "bold" | "b" => frame.bold = true,
            "italic" | "i" => frame.italic = true,
            "underline" | "u" => frame.underline = true,
            _ => {
                let color = parse_color(token)?;
                frame.fg = Some(color);
            }
        }
    }
    if !saw_token {
        return None;
    }

    // Whatever follows "on" must be exactly one color token.
    let rest: Vec<&str> = tokens.collect();
    match rest.len() {
        0 => {}
        1 => frame.bg = Some(parse_color(rest[0])?),
        _ => return None,
    }

    Some(frame)
}

fn parse_color(token: &str) -> Option<ColorRef> {
    if let Some(name) = token.strip_prefix('$') {
        if name.is_empty() {
            return None;
        }
        return Some(ColorRef::Theme(name.to_string()));
    }
    if token.starts_with('#') {
        return Color::from_hex(token).ok().map(ColorRef::Literal);
    }
    None
}

/// Resolve a parsed span list into plain text plus concrete `Style`s,
/// looking up `$ThemeName` references via `theme`. A missing theme
/// name degrades to "inherit" (no color set) and should be logged by
/// the caller.
pub fn resolve(spans: &[MarkupSpan], theme: &dyn Fn(&str) -> Option<Color>) -> Vec<(String, Style)> {
    spans
        .iter()
        .map(|span| {
            let fg = span.fg.as_ref().and_then(|c| resolve_color_ref(c, theme));
            let bg = span.bg.as_ref().and_then(|c| resolve_color_ref(c, theme));
            let style = Style {
                fg,
                bg,
                bold: span.bold,
                italic: span.italic,
                underline: span.underline,
                ..Style::default()
            };
            (span.text.clone(), style)
        })
        .collect()
}

fn resolve_color_ref(color: &ColorRef, theme: &dyn Fn(&str) -> Option<Color>) -> Option<Color> {
    match color {
        ColorRef::Literal(c) => Some(c.clone()),
        ColorRef::Theme(name) => {
            let resolved = theme(name);
            if resolved.is_none() {
                tracing::warn!(theme_name = %name, "markup: unknown theme color, falling back to inherit");
            }
            resolved
        }
    }
}

/// Strip all tags, returning the literal text a renderer would
/// display (used by the markup round-trip testable property, spec
/// §8). Equivalent to concatenating every parsed span's text.
pub fn strip_tags(input: &str) -> String {
    parse(input).into_iter().map(|s| s.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_span() {
        let spans = parse("hello");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello");
        assert!(!spans[0].bold);
    }

    #[test]
    fn bold_shortcut() {
        let spans = parse("[b]hi[/]");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hi");
        assert!(spans[0].bold);
    }

    #[test]
    fn style_and_color() {
        let spans = parse("[bold #ff0000]warn[/]");
        assert!(spans[0].bold);
        assert_eq!(
            spans[0].fg,
            Some(ColorRef::Literal(Color::Rgb { r: 0xff, g: 0, b: 0 }))
        );
    }

    #[test]
    fn fg_on_bg() {
        let spans = parse("[red on blue]x[/]");
        // "red"/"blue" are not valid color tokens (only #hex/$Theme
        // are); the whole tag is malformed and degrades to literal text.
        assert_eq!(spans[0].text, "[red on blue]x[/]");
    }

    #[test]
    fn hex_fg_on_hex_bg() {
        let spans = parse("[#fff on #000]x[/]");
        assert_eq!(
            spans[0].fg,
            Some(ColorRef::Literal(Color::Rgb {
                r: 0xff,
                g: 0xff,
                b: 0xff
            }))
        );
        assert_eq!(
            spans[0].bg,
            Some(ColorRef::Literal(Color::Rgb { r: 0, g: 0, b: 0 }))
        );
    }

    #[test]
    fn theme_color_reference() {
        let spans = parse("[$Primary]x[/]");
        assert_eq!(spans[0].fg, Some(ColorRef::Theme("Primary".to_string())));
    }

    #[test]
    fn nested_tags_inherit_and_override() {
        let spans = parse("[bold]outer [italic]inner[/] back[/]");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "outer ");
        assert!(spans[0].bold && !spans[0].italic);
        assert_eq!(spans[1].text, "inner");
        assert!(spans[1].bold && spans[1].italic);
        assert_eq!(spans[2].text, " back");
        assert!(spans[2].bold && !spans[2].italic);
    }

    #[test]
    fn escaped_brackets_are_literal() {
        let spans = parse("[[not a tag]]");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "[not a tag]");
    }

    #[test]
    fn invalid_tag_degrades_to_literal() {
        let spans = parse("[nonsense here]text");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "[nonsense here]text");
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let spans = parse("a [b");
        assert_eq!(spans[0].text, "a [b");
    }

    #[test]
    fn resolve_theme_color_found() {
        let spans = parse("[$Primary]x[/]");
        let resolved = resolve(&spans, &|name| {
            (name == "Primary").then_some(Color::Rgb { r: 1, g: 2, b: 3 })
        });
        assert_eq!(resolved[0].1.fg, Some(Color::Rgb { r: 1, g: 2, b: 3 }));
    }

    #[test]
    fn resolve_theme_color_missing_falls_back_to_inherit() {
        let spans = parse("[$Missing]x[/]");
        let resolved = resolve(&spans, &|_| None);
        assert_eq!(resolved[0].1.fg, None);
    }

    #[test]
    fn strip_tags_round_trip() {
        let input = "[bold red]loud[/] and [[escaped]]";
        let stripped = strip_tags(input);
        // "red" alone is not a valid color token, so "[bold red]" is
        // malformed and kept literal; only the escape collapses.
        assert_eq!(stripped, "[bold red]loud[/] and [escaped]");
    }

    #[test]
    fn strip_tags_with_valid_tag() {
        let input = "[bold]loud[/] and quiet";
        assert_eq!(strip_tags(input), "loud and quiet");
    }
}
