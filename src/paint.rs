//! Paints a built-and-solved render tree into a [`ScreenBuffer`]:
//! background, border, decorations, then content, walking
//! [`LayoutNode`] and its matching [`Solved`] tree together (index-
//! paired recursion — every `LayoutNode` variant's solved children
//! appear in the same order its own children were allocated in, see
//! `layout::allocate`).
//!
//! Known gap: only background and text stamping are clipped to an
//! ancestor `Scrollable`'s content rect; border and decoration cells
//! are not, so a border that scrolls half out of view will currently
//! bleed past the scrollable's edge rather than being cut off.

use unicode_segmentation::UnicodeSegmentation;

use crate::build::{LayoutNode, StackChild, TextAlign};
use crate::buffer::ScreenBuffer;
use crate::cell::Cell;
use crate::color::{Color, Fill};
use crate::dimension::{BorderStyle, BoxModel};
use crate::geometry::{Rect, Size};
use crate::layout::Solved;
use crate::markup;
use crate::style::{Decoration, DecorationAlign, DecorationEdge, Style};
use crate::text;
use crate::wrap::{self, WrapMode};

/// A theme lookup for markup color references (`$Name`). `|_| None`
/// is a reasonable default when no theme is wired up.
pub type Theme<'a> = &'a dyn Fn(&str) -> Option<Color>;

/// Paint `node`'s solved tree into `buf`, clipped to `screen`.
pub fn paint_tree(node: &LayoutNode, solved: &Solved, screen: Size, buf: &mut ScreenBuffer, theme: Theme) {
    let clip = Rect::new(0, 0, screen.width, screen.height);
    paint_node(node, solved, clip, buf, theme);
}

fn paint_node(node: &LayoutNode, solved: &Solved, clip: Rect, buf: &mut ScreenBuffer, theme: Theme) {
    match node {
        LayoutNode::Box { style, box_model, child, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            if let (Some(child_node), Some(child_solved)) = (child.as_deref(), solved.children.first()) {
                paint_node(child_node, child_solved, clip, buf, theme);
            }
        }
        LayoutNode::Text { style, box_model, content, wrap_mode, align, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            paint_text(solved.content_rect.to_screen_rect(), clip, style, content, *wrap_mode, *align, buf);
        }
        LayoutNode::Column { style, box_model, children, .. } | LayoutNode::Row { style, box_model, children, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            for (child_node, child_solved) in children.iter().zip(solved.children.iter()) {
                paint_node(child_node, child_solved, clip, buf, theme);
            }
        }
        LayoutNode::Dock { style, box_model, edges, body, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            let n = edges.len();
            for (i, (_, edge_node)) in edges.iter().enumerate() {
                if let Some(edge_solved) = solved.children.get(i) {
                    paint_node(edge_node, edge_solved, clip, buf, theme);
                }
            }
            if let Some(body_solved) = solved.children.get(n) {
                paint_node(body, body_solved, clip, buf, theme);
            }
        }
        LayoutNode::Stack { style, box_model, children, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            for (child, child_solved) in children.iter().zip(solved.children.iter()) {
                let inner = match child {
                    StackChild::Aligned(_, node) => node,
                    StackChild::Positioned { node, .. } => node,
                };
                paint_node(inner, child_solved, clip, buf, theme);
            }
        }
        LayoutNode::Scrollable { style, box_model, child, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            if let Some(child_solved) = solved.children.first() {
                let inner_clip = clip.intersection(&solved.content_rect.to_screen_rect());
                paint_node(child, child_solved, inner_clip, buf, theme);
            }
        }
        LayoutNode::Split { style, box_model, first, second, .. } => {
            paint_frame(solved.rect.to_screen_rect(), clip, style, box_model, theme, buf);
            if let Some(first_solved) = solved.children.first() {
                paint_node(first, first_solved, clip, buf, theme);
            }
            if let Some(second_solved) = solved.children.get(1) {
                paint_node(second, second_solved, clip, buf, theme);
            }
        }
        LayoutNode::Switcher { active, .. } => {
            if let (Some(active_node), Some(active_solved)) = (active.as_deref(), solved.children.first()) {
                paint_node(active_node, active_solved, clip, buf, theme);
            }
        }
        LayoutNode::Conditional { visible, child, .. } => {
            if *visible {
                if let (Some(child_node), Some(child_solved)) = (child.as_deref(), solved.children.first()) {
                    paint_node(child_node, child_solved, clip, buf, theme);
                }
            }
        }
        LayoutNode::Empty { .. } => {}
    }
}

/// Paint one node's background, border, and decorations.
fn paint_frame(rect: Rect, clip: Rect, style: &Style, box_model: &BoxModel, theme: Theme, buf: &mut ScreenBuffer) {
    paint_box_frame(rect, clip, style, box_model, buf);
    paint_decorations(rect, clip, style, box_model, theme, buf);
}

fn paint_box_frame(rect: Rect, clip: Rect, style: &Style, box_model: &BoxModel, buf: &mut ScreenBuffer) {
    let area = rect.intersection(&clip);
    if area.is_empty() {
        return;
    }
    let w = rect.size.width;
    let h = rect.size.height;
    let border_chars = box_model.border.chars();
    let x1 = rect.left();
    let y1 = rect.top();
    let x2 = rect.right().saturating_sub(1);
    let y2 = rect.bottom().saturating_sub(1);

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let bg = box_model
                .background
                .as_ref()
                .map(|f| f.resolve_at(w, h, x - x1, y - y1))
                .or_else(|| style.bg.clone());

            let on_border = border_chars.is_some() && (x == x1 || x == x2 || y == y1 || y == y2);
            if on_border {
                let Some((tl, tr, bl, br, hc, vc)) = border_chars else {
                    unreachable!()
                };
                let glyph = if x == x1 && y == y1 {
                    tl
                } else if x == x2 && y == y1 {
                    tr
                } else if x == x1 && y == y2 {
                    bl
                } else if x == x2 && y == y2 {
                    br
                } else if y == y1 || y == y2 {
                    hc
                } else {
                    vc
                };
                let fg = box_model
                    .border_color
                    .as_ref()
                    .map(|f| f.resolve_at(w, h, x - x1, y - y1))
                    .or_else(|| style.fg.clone());
                let cell_style = Style { fg, bg, ..Style::default() };
                buf.set(x, y, Cell::new(glyph, cell_style));
            } else if let Some(bg) = bg {
                let cell_style = Style { bg: Some(bg), ..Style::default() };
                buf.set(x, y, Cell::new(" ", cell_style));
            }
        }
    }
}

fn paint_decorations(rect: Rect, clip: Rect, style: &Style, box_model: &BoxModel, theme: Theme, buf: &mut ScreenBuffer) {
    if box_model.border == BorderStyle::None || box_model.decorations.is_empty() {
        return;
    }
    let inner_width = rect.size.width.saturating_sub(2);
    if inner_width == 0 {
        return;
    }
    for deco in &box_model.decorations {
        paint_one_decoration(rect, clip, style, box_model, deco, inner_width, theme, buf);
    }
}

fn paint_one_decoration(
    rect: Rect,
    clip: Rect,
    style: &Style,
    box_model: &BoxModel,
    deco: &Decoration,
    inner_width: u16,
    theme: Theme,
    buf: &mut ScreenBuffer,
) {
    let y = match deco.edge {
        DecorationEdge::Top => rect.top(),
        DecorationEdge::Bottom => rect.bottom().saturating_sub(1),
    };
    if y < clip.top() || y >= clip.bottom() {
        return;
    }

    let spans = markup::parse(&deco.text);
    let resolved = markup::resolve(&spans, theme);
    let full_text: String = resolved.iter().map(|(t, _)| t.as_str()).collect();
    let total_width = wrap::display_width(&full_text) as u16;

    let start_x = match deco.align {
        DecorationAlign::Start => rect.left() + 1,
        DecorationAlign::Center => rect.left() + 1 + inner_width.saturating_sub(total_width) / 2,
        DecorationAlign::End => rect.right().saturating_sub(1).saturating_sub(total_width),
    };
    let max_x = rect.right().saturating_sub(1);
    let w = rect.size.width;
    let h = rect.size.height;

    let mut x = start_x;
    'segments: for (text, seg_style) in &resolved {
        for g in text.graphemes(true) {
            let gw = wrap::display_width(g).max(1) as u16;
            if x + gw > max_x {
                break 'segments;
            }
            if x >= clip.left() && x < clip.right() {
                let fg = seg_style.fg.clone().or_else(|| {
                    box_model
                        .border_color
                        .as_ref()
                        .map(|f| f.resolve_at(w, h, x - rect.left(), y - rect.top()))
                        .or_else(|| style.fg.clone())
                });
                let cell_style = Style {
                    fg,
                    bg: seg_style.bg.clone(),
                    bold: seg_style.bold,
                    italic: seg_style.italic,
                    underline: seg_style.underline,
                    ..Style::default()
                };
                buf.set(x, y, Cell::new(g, cell_style));
            }
            x += gw;
        }
    }
}

fn paint_text(content_rect: Rect, clip: Rect, style: &Style, content: &str, wrap_mode: WrapMode, align: TextAlign, buf: &mut ScreenBuffer) {
    if content_rect.size.width == 0 {
        return;
    }
    let processed = text::preprocess(content, &text::TextConfig::default());
    let lines = wrap::wrap_text(&processed, content_rect.size.width as usize, wrap_mode);

    for (i, line) in lines.iter().enumerate() {
        let y = content_rect.top().saturating_add(i as u16);
        if y >= content_rect.bottom() || y < clip.top() || y >= clip.bottom() {
            continue;
        }
        let line_width = wrap::display_width(&line.text) as u16;
        let start_x = match align {
            TextAlign::Start => content_rect.left(),
            TextAlign::Center => content_rect.left() + content_rect.size.width.saturating_sub(line_width) / 2,
            TextAlign::End => content_rect.right().saturating_sub(line_width),
        };
        let mut x = start_x;
        for g in line.text.graphemes(true) {
            let gw = wrap::display_width(g).max(1) as u16;
            if x >= content_rect.right() {
                break;
            }
            if x >= clip.left() && x < clip.right() {
                buf.set(x, y, Cell::new(g, style.clone()));
            }
            x += gw;
        }
    }
}
