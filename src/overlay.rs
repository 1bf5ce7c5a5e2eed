//! Floating overlays: positioning a float's subtree against an anchor
//! (or the screen) after the main tree has been laid out, plus the
//! dismissal configuration a float registers during build (see
//! [`crate::widget::AnyWidget::float_config`] and [`crate::build::FloatEntry`]).
//!
//! A float's own content is built and laid out like any other
//! subtree — what this module adds is a second positioning pass: solve
//! the float's content at the origin to learn its natural size, then
//! translate that solved tree to its resolved screen position, flipping
//! to the opposite side of its anchor before resorting to clipping.

use std::rc::Rc;

use crate::geometry::{Position, Rect, Size};
use crate::layout::Solved;
use crate::style::Style;
use crate::widget::WidgetId;

/// Which side of an anchor widget a float is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
    Left,
    Right,
}

/// A corner or center of the whole screen, for floats with no anchor
/// widget (e.g. a centered dialog).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAnchor {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// What a float is positioned relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatAnchor {
    /// Relative to the whole terminal.
    Screen(ScreenAnchor),
    /// Relative to another widget's solved rect, by id. Falls back to
    /// `Screen(ScreenAnchor::Center)` (logged) if the anchor id is not
    /// found in the solved tree — e.g. the anchor widget was itself
    /// conditionally hidden this frame.
    Widget { id: WidgetId, placement: Placement },
}

/// A dismissal callback, invoked when a float is dismissed via click-
/// outside or Escape.
pub type DismissCallback = Rc<dyn Fn()>;

/// Positioning and dismissal configuration for a float, returned by
/// [`crate::widget::AnyWidget::float_config`]. Collected during build
/// into [`crate::build::FloatEntry`]; resolved against the main tree's
/// solved layout by [`place_float`] after the main layout pass.
pub struct FloatConfig {
    pub anchor: FloatAnchor,
    /// Cell offset applied after anchor resolution, before clamping.
    pub offset_x: i32,
    pub offset_y: i32,
    /// Modal floats get a dimming scrim behind them and constrain
    /// focus-cycling to their own subtree (see `focus`).
    pub modal: bool,
    /// Dismiss when a click lands outside the float's rect.
    pub dismiss_on_click_outside: bool,
    /// Dismiss when Escape is pressed while this float (or a
    /// descendant) holds focus.
    pub dismiss_on_esc: bool,
    /// Called once when the float is dismissed by either mechanism
    /// above. `None` means dismissal is the caller's responsibility
    /// (e.g. driven by a signal elsewhere).
    pub on_dismiss: Option<DismissCallback>,
}

impl FloatConfig {
    /// A float anchored to another widget's solved rect.
    pub fn anchored(id: impl Into<WidgetId>, placement: Placement) -> Self {
        Self {
            anchor: FloatAnchor::Widget { id: id.into(), placement },
            offset_x: 0,
            offset_y: 0,
            modal: false,
            dismiss_on_click_outside: false,
            dismiss_on_esc: false,
            on_dismiss: None,
        }
    }

    /// A float anchored to a corner or the center of the screen.
    pub fn screen(anchor: ScreenAnchor) -> Self {
        Self {
            anchor: FloatAnchor::Screen(anchor),
            offset_x: 0,
            offset_y: 0,
            modal: false,
            dismiss_on_click_outside: false,
            dismiss_on_esc: false,
            on_dismiss: None,
        }
    }

    #[must_use]
    pub fn offset(mut self, x: i32, y: i32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    #[must_use]
    pub fn modal(mut self, value: bool) -> Self {
        self.modal = value;
        self
    }

    #[must_use]
    pub fn dismiss_on_click_outside(mut self, value: bool) -> Self {
        self.dismiss_on_click_outside = value;
        self
    }

    #[must_use]
    pub fn dismiss_on_esc(mut self, value: bool) -> Self {
        self.dismiss_on_esc = value;
        self
    }

    #[must_use]
    pub fn on_dismiss(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_dismiss = Some(Rc::new(callback));
        self
    }
}

/// The `Style` a modal's dimming scrim paints behind it: every cell
/// outside the float, dimmed.
pub fn scrim_style() -> Style {
    Style::new().dim(true)
}

/// Find a node's screen-space rect within a solved tree by id, or
/// `None` if no node carries that id (e.g. it was conditionally
/// absent this frame).
fn find_rect(solved: &Solved, id: &str) -> Option<Rect> {
    if solved.id == id {
        return Some(solved.rect.to_screen_rect());
    }
    solved.children.iter().find_map(|c| find_rect(c, id))
}

fn screen_anchor_position(anchor: ScreenAnchor, size: Size, screen: Size) -> (i32, i32) {
    let sw = i32::from(screen.width);
    let sh = i32::from(screen.height);
    let w = i32::from(size.width);
    let h = i32::from(size.height);
    match anchor {
        ScreenAnchor::Center => ((sw - w) / 2, (sh - h) / 2),
        ScreenAnchor::TopLeft => (0, 0),
        ScreenAnchor::TopRight => (sw - w, 0),
        ScreenAnchor::BottomLeft => (0, sh - h),
        ScreenAnchor::BottomRight => (sw - w, sh - h),
    }
}

/// Resolve a `Widget` anchor's raw position, flipping to the opposite
/// side first when the preferred side would overflow the screen and
/// the opposite side fits.
fn placement_position(anchor: Rect, size: Size, screen: Size, placement: Placement) -> (i32, i32) {
    let sw = i32::from(screen.width);
    let sh = i32::from(screen.height);
    let w = i32::from(size.width);
    let h = i32::from(size.height);
    let (ax0, ay0, ax1, ay1) = (
        i32::from(anchor.left()),
        i32::from(anchor.top()),
        i32::from(anchor.right()),
        i32::from(anchor.bottom()),
    );
    let center_x = ax0 + (ax1 - ax0) / 2 - w / 2;
    let center_y = ay0 + (ay1 - ay0) / 2 - h / 2;

    match placement {
        Placement::Below => {
            if ay1 + h > sh && ay0 - h >= 0 {
                (center_x, ay0 - h)
            } else {
                (center_x, ay1)
            }
        }
        Placement::Above => {
            if ay0 - h < 0 && ay1 + h <= sh {
                (center_x, ay1)
            } else {
                (center_x, ay0 - h)
            }
        }
        Placement::Right => {
            if ax1 + w > sw && ax0 - w >= 0 {
                (ax0 - w, center_y)
            } else {
                (ax1, center_y)
            }
        }
        Placement::Left => {
            if ax0 - w < 0 && ax1 + w <= sw {
                (ax1, center_y)
            } else {
                (ax0 - w, center_y)
            }
        }
    }
}

fn finalize(x: i32, y: i32, config: &FloatConfig, size: Size, screen: Size) -> Position {
    let x = x + config.offset_x;
    let y = y + config.offset_y;
    let max_x = i32::from(screen.width).saturating_sub(i32::from(size.width)).max(0);
    let max_y = i32::from(screen.height).saturating_sub(i32::from(size.height)).max(0);
    Position::new(x.clamp(0, max_x) as u16, y.clamp(0, max_y) as u16)
}

/// Resolve a float's position against the main tree's solved layout.
/// `main_solved` is consulted for `Widget` anchors; unused for `Screen`
/// anchors.
pub fn resolve_position(config: &FloatConfig, size: Size, screen: Size, main_solved: &Solved) -> Position {
    let (x, y) = match &config.anchor {
        FloatAnchor::Screen(anchor) => screen_anchor_position(*anchor, size, screen),
        FloatAnchor::Widget { id, placement } => match find_rect(main_solved, id) {
            Some(anchor_rect) => placement_position(anchor_rect, size, screen, *placement),
            None => {
                tracing::warn!(
                    anchor_id = %id,
                    "overlay: float anchor not found in solved tree, falling back to screen center"
                );
                screen_anchor_position(ScreenAnchor::Center, size, screen)
            }
        },
    };
    finalize(x, y, config, size, screen)
}

/// Translate every rect in a solved subtree by `(dx, dy)`.
fn translate(solved: &mut Solved, dx: i32, dy: i32) {
    solved.rect.x += dx;
    solved.rect.y += dy;
    solved.content_rect.x += dx;
    solved.content_rect.y += dy;
    for child in &mut solved.children {
        translate(child, dx, dy);
    }
}

/// Position an already-solved float subtree (solved at the origin
/// against an unbounded-ish viewport, to learn its natural size) at
/// its final screen position, per `config` and the main tree's solved
/// layout.
pub fn place_float(config: &FloatConfig, mut solved: Solved, screen: Size, main_solved: &Solved) -> Solved {
    let size = solved.rect.to_screen_rect().size;
    let pos = resolve_position(config, size, screen, main_solved);
    let dx = i32::from(pos.x) - solved.rect.x;
    let dy = i32::from(pos.y) - solved.rect.y;
    translate(&mut solved, dx, dy);
    solved
}
