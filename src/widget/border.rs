//! Border rendering utilities for widgets.
//!
//! Provides shared implementations for border rendering, inner area calculation,
//! and border character selection.

use crate::buffer::ScreenBuffer;
use crate::cell::Cell;
use crate::color::Fill;
use crate::dimension::BorderStyle;
use crate::geometry::Rect;
use crate::style::Style;

/// Render a border into the screen buffer.
///
/// If `border_style` is `BorderStyle::None`, this function does nothing.
pub fn render_border(
    area: Rect,
    border_style: BorderStyle,
    cell_style: Style,
    buf: &mut ScreenBuffer,
) {
    let Some((tl, tr, bl, br, h, v)) = border_style.chars() else {
        return;
    };

    let x1 = area.position.x;
    let y1 = area.position.y;
    let w = area.size.width;
    let h_val = area.size.height;

    if w == 0 || h_val == 0 {
        return;
    }

    let x2 = x1.saturating_add(w.saturating_sub(1));
    let y2 = y1.saturating_add(h_val.saturating_sub(1));

    // Corners
    buf.set(x1, y1, Cell::new(tl, cell_style.clone()));
    buf.set(x2, y1, Cell::new(tr, cell_style.clone()));
    buf.set(x1, y2, Cell::new(bl, cell_style.clone()));
    buf.set(x2, y2, Cell::new(br, cell_style.clone()));

    // Top and bottom edges
    for x in (x1 + 1)..x2 {
        buf.set(x, y1, Cell::new(h, cell_style.clone()));
        buf.set(x, y2, Cell::new(h, cell_style.clone()));
    }

    // Left and right edges
    for y in (y1 + 1)..y2 {
        buf.set(x1, y, Cell::new(v, cell_style.clone()));
        buf.set(x2, y, Cell::new(v, cell_style.clone()));
    }
}

/// Render a border into the screen buffer, sampling `fill` (if given)
/// per cell position to resolve a gradient-aware fg color, falling
/// back to `cell_style`'s own fg where `fill` is `None`.
///
/// If `border_style` is `BorderStyle::None`, this function does nothing.
pub fn render_border_filled(
    area: Rect,
    border_style: BorderStyle,
    cell_style: Style,
    fill: Option<&Fill>,
    buf: &mut ScreenBuffer,
) {
    let Some(fill) = fill else {
        render_border(area, border_style, cell_style, buf);
        return;
    };
    let Some((tl, tr, bl, br, h, v)) = border_style.chars() else {
        return;
    };

    let x1 = area.position.x;
    let y1 = area.position.y;
    let w = area.size.width;
    let h_val = area.size.height;

    if w == 0 || h_val == 0 {
        return;
    }

    let x2 = x1.saturating_add(w.saturating_sub(1));
    let y2 = y1.saturating_add(h_val.saturating_sub(1));

    let mut style_at = |x: u16, y: u16| {
        let mut style = cell_style.clone();
        style.fg = Some(fill.resolve_at(w, h_val, x - x1, y - y1));
        style
    };

    buf.set(x1, y1, Cell::new(tl, style_at(x1, y1)));
    buf.set(x2, y1, Cell::new(tr, style_at(x2, y1)));
    buf.set(x1, y2, Cell::new(bl, style_at(x1, y2)));
    buf.set(x2, y2, Cell::new(br, style_at(x2, y2)));

    for x in (x1 + 1)..x2 {
        buf.set(x, y1, Cell::new(h, style_at(x, y1)));
        buf.set(x, y2, Cell::new(h, style_at(x, y2)));
    }

    for y in (y1 + 1)..y2 {
        buf.set(x1, y, Cell::new(v, style_at(x1, y)));
        buf.set(x2, y, Cell::new(v, style_at(x2, y)));
    }
}

/// Calculate the inner area after accounting for a border.
///
/// If `border_style` is `BorderStyle::None`, returns the original area.
/// Otherwise, shrinks the area by 1 cell on each side.
///
/// Returns a zero-sized rectangle if the area is too small for a border.
pub fn inner_area(area: Rect, border_style: BorderStyle) -> Rect {
    match border_style {
        BorderStyle::None => area,
        _ => {
            if area.size.width < 2 || area.size.height < 2 {
                return Rect::new(area.position.x, area.position.y, 0, 0);
            }
            Rect::new(
                area.position.x + 1,
                area.position.y + 1,
                area.size.width.saturating_sub(2),
                area.size.height.saturating_sub(2),
            )
        }
    }
}
