//! Terminal color model, including gradient sampling for decorative fills.

use crate::error::{Result, WeftError};

/// A terminal color.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Color {
    /// True color RGB.
    Rgb {
        /// Red component.
        r: u8,
        /// Green component.
        g: u8,
        /// Blue component.
        b: u8,
    },
    /// 256-color palette index.
    Indexed(u8),
    /// Named ANSI color.
    Named(NamedColor),
    /// Reset to terminal default.
    Reset,
}

/// The 16 standard ANSI colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NamedColor {
    /// Black (0).
    Black,
    /// Red (1).
    Red,
    /// Green (2).
    Green,
    /// Yellow (3).
    Yellow,
    /// Blue (4).
    Blue,
    /// Magenta (5).
    Magenta,
    /// Cyan (6).
    Cyan,
    /// White (7).
    White,
    /// Bright black / dark gray (8).
    BrightBlack,
    /// Bright red (9).
    BrightRed,
    /// Bright green (10).
    BrightGreen,
    /// Bright yellow (11).
    BrightYellow,
    /// Bright blue (12).
    BrightBlue,
    /// Bright magenta (13).
    BrightMagenta,
    /// Bright cyan (14).
    BrightCyan,
    /// Bright white (15).
    BrightWhite,
}

impl Color {
    /// Parse a hex color string like `"#rrggbb"` or `"#rgb"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[2..4], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[4..6], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                Ok(Self::Rgb { r, g, b })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[1..2], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[2..3], 16)
                    .map_err(|e| WeftError::Style(format!("invalid hex color: {e}")))?;
                Ok(Self::Rgb {
                    r: r * 17,
                    g: g * 17,
                    b: b * 17,
                })
            }
            _ => Err(WeftError::Style(format!(
                "invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            ))),
        }
    }

    /// Look up a color by CSS-style name. Returns `None` for unknown names;
    /// callers at a markup or theme boundary should log and fall back rather
    /// than propagate an error.
    pub fn from_css_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Some(Self::Named(NamedColor::Black)),
            "red" => Some(Self::Named(NamedColor::Red)),
            "green" => Some(Self::Named(NamedColor::Green)),
            "yellow" => Some(Self::Named(NamedColor::Yellow)),
            "blue" => Some(Self::Named(NamedColor::Blue)),
            "magenta" => Some(Self::Named(NamedColor::Magenta)),
            "cyan" => Some(Self::Named(NamedColor::Cyan)),
            "white" => Some(Self::Named(NamedColor::White)),
            "gray" | "grey" => Some(Self::Named(NamedColor::BrightBlack)),
            "brightblack" => Some(Self::Named(NamedColor::BrightBlack)),
            "brightred" => Some(Self::Named(NamedColor::BrightRed)),
            "brightgreen" => Some(Self::Named(NamedColor::BrightGreen)),
            "brightyellow" => Some(Self::Named(NamedColor::BrightYellow)),
            "brightblue" => Some(Self::Named(NamedColor::BrightBlue)),
            "brightmagenta" => Some(Self::Named(NamedColor::BrightMagenta)),
            "brightcyan" => Some(Self::Named(NamedColor::BrightCyan)),
            "brightwhite" => Some(Self::Named(NamedColor::BrightWhite)),
            _ => None,
        }
    }

    /// Linearly interpolate between two RGB-resolved colors. Non-RGB colors
    /// (named, indexed, reset) are treated as opaque endpoints and are not
    /// blended — a gradient between a named color and an RGB color snaps to
    /// whichever endpoint `t` is closer to.
    #[must_use]
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        match (self.to_rgb(), other.to_rgb()) {
            (Some((r1, g1, b1)), Some((r2, g2, b2))) => Color::Rgb {
                r: lerp_u8(r1, r2, t),
                g: lerp_u8(g1, g2, t),
                b: lerp_u8(b1, b2, t),
            },
            _ => {
                if t < 0.5 {
                    self.clone()
                } else {
                    other.clone()
                }
            }
        }
    }

    fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Rgb { r, g, b } => Some((*r, *g, *b)),
            _ => None,
        }
    }
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Rgb { r, g, b } => crossterm::style::Color::Rgb { r, g, b },
            Color::Indexed(i) => crossterm::style::Color::AnsiValue(i),
            Color::Named(n) => match n {
                NamedColor::Black => crossterm::style::Color::Black,
                NamedColor::Red => crossterm::style::Color::DarkRed,
                NamedColor::Green => crossterm::style::Color::DarkGreen,
                NamedColor::Yellow => crossterm::style::Color::DarkYellow,
                NamedColor::Blue => crossterm::style::Color::DarkBlue,
                NamedColor::Magenta => crossterm::style::Color::DarkMagenta,
                NamedColor::Cyan => crossterm::style::Color::DarkCyan,
                NamedColor::White => crossterm::style::Color::Grey,
                NamedColor::BrightBlack => crossterm::style::Color::DarkGrey,
                NamedColor::BrightRed => crossterm::style::Color::Red,
                NamedColor::BrightGreen => crossterm::style::Color::Green,
                NamedColor::BrightYellow => crossterm::style::Color::Yellow,
                NamedColor::BrightBlue => crossterm::style::Color::Blue,
                NamedColor::BrightMagenta => crossterm::style::Color::Magenta,
                NamedColor::BrightCyan => crossterm::style::Color::Cyan,
                NamedColor::BrightWhite => crossterm::style::Color::White,
            },
            Color::Reset => crossterm::style::Color::Reset,
        }
    }
}

impl From<&Color> for crossterm::style::Color {
    fn from(color: &Color) -> Self {
        color.clone().into()
    }
}

/// A linear gradient sampled over a rectangular area.
///
/// `color_at` is the sole contract a renderer needs: it maps a cell
/// position within a `width`x`height` area to a color, without the
/// caller needing to know whether the gradient runs horizontally,
/// vertically, or diagonally.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    /// Color at `t = 0`.
    pub start: Color,
    /// Color at `t = 1`.
    pub end: Color,
    /// Direction the gradient travels across the sampled area.
    pub direction: GradientDirection,
}

/// The axis a [`Gradient`] interpolates along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
}

impl Gradient {
    /// Create a new gradient between two colors.
    #[must_use]
    pub fn new(start: Color, end: Color, direction: GradientDirection) -> Self {
        Self {
            start,
            end,
            direction,
        }
    }

    /// Sample the gradient at cell `(x, y)` within a `width`x`height` area.
    ///
    /// Areas of zero width or height sample at `t = 0`. Out-of-range
    /// coordinates are clamped rather than treated as an error — a
    /// renderer compositing past the edge of a resized area should not
    /// panic over it.
    #[must_use]
    pub fn color_at(&self, width: u16, height: u16, x: u16, y: u16) -> Color {
        let t = match self.direction {
            GradientDirection::Horizontal => axis_t(x, width),
            GradientDirection::Vertical => axis_t(y, height),
            GradientDirection::Diagonal => {
                let denom = f64::from(width.saturating_sub(1)) + f64::from(height.saturating_sub(1));
                if denom <= 0.0 {
                    0.0
                } else {
                    (f64::from(x) + f64::from(y)) / denom
                }
            }
        };
        self.start.lerp(&self.end, t)
    }
}

fn axis_t(pos: u16, extent: u16) -> f64 {
    let max = extent.saturating_sub(1);
    if max == 0 {
        0.0
    } else {
        f64::from(pos.min(max)) / f64::from(max)
    }
}

/// A color or gradient provider: the common type for anything a box
/// model's background or border can be filled with. Flat color is the
/// common case; a `Gradient` resolves to a concrete color per cell at
/// render time, given the fill's own area and the cell's position
/// within it.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    Solid(Color),
    Gradient(Gradient),
}

impl Fill {
    /// Resolve this fill to a concrete color at cell `(x, y)` within a
    /// `width`x`height` area.
    #[must_use]
    pub fn resolve_at(&self, width: u16, height: u16, x: u16, y: u16) -> Color {
        match self {
            Fill::Solid(c) => c.clone(),
            Fill::Gradient(g) => g.color_at(width, height, x, y),
        }
    }
}

impl From<Color> for Fill {
    fn from(c: Color) -> Self {
        Fill::Solid(c)
    }
}

impl From<Gradient> for Fill {
    fn from(g: Gradient) -> Self {
        Fill::Gradient(g)
    }
}
