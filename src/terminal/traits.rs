//! Terminal trait and capability types.

use crate::error::Result;
use crate::event::Event;
use crate::geometry::Size;

/// Level of color support available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColorSupport {
    /// No color.
    NoColor,
    /// 16 ANSI colors.
    Basic16,
    /// 256 color palette.
    Extended256,
    /// 24-bit true color.
    TrueColor,
}

/// Capabilities detected for the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Color support level.
    pub color: ColorSupport,
    /// Whether the terminal supports Unicode.
    pub unicode: bool,
    /// Whether CSI 2026 synchronized output is supported.
    pub synchronized_output: bool,
    /// Whether the Kitty keyboard protocol is supported.
    pub kitty_keyboard: bool,
    /// Whether mouse events are available.
    pub mouse: bool,
    /// Whether bracketed paste mode is supported.
    pub bracketed_paste: bool,
    /// Whether the terminal reports focus gain/loss events.
    pub focus_events: bool,
    /// Whether OSC 8 hyperlinks are supported.
    pub hyperlinks: bool,
    /// Whether sixel graphics are supported.
    pub sixel: bool,
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: false,
            focus_events: false,
            hyperlinks: false,
            sixel: false,
        }
    }
}

/// Abstraction over terminal backends.
pub trait Terminal: Send {
    /// Get the current terminal size.
    fn size(&self) -> Result<Size>;

    /// Get the terminal's capabilities.
    fn capabilities(&self) -> &TerminalCapabilities;

    /// Enter raw mode (disable line buffering, echo, etc.).
    fn enter_raw_mode(&mut self) -> Result<()>;

    /// Exit raw mode (restore normal terminal state).
    fn exit_raw_mode(&mut self) -> Result<()>;

    /// Write raw bytes to the terminal.
    fn write_raw(&mut self, data: &[u8]) -> Result<()>;

    /// Flush buffered output to the terminal.
    fn flush(&mut self) -> Result<()>;

    /// Enable mouse event capture.
    fn enable_mouse(&mut self) -> Result<()>;

    /// Disable mouse event capture.
    fn disable_mouse(&mut self) -> Result<()>;

    /// Poll for the next input event, waiting up to `timeout`.
    ///
    /// Returns `Ok(None)` if `timeout` elapses with no event available.
    /// A `Resize` event is synthesized by the backend when the terminal
    /// size changes between calls.
    fn poll_event(&mut self, timeout: std::time::Duration) -> Result<Option<Event>>;
}
