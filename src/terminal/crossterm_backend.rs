//! Crossterm-based terminal backend.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::error::Result;
use crate::event::{
    Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crate::geometry::Size;

use super::traits::{ColorSupport, Terminal, TerminalCapabilities};

/// Terminal backend using crossterm for real terminal I/O.
pub struct CrosstermBackend {
    capabilities: TerminalCapabilities,
    raw_mode: bool,
}

impl CrosstermBackend {
    /// Create a new crossterm backend, detecting capabilities.
    pub fn new() -> Self {
        let capabilities = detect_capabilities();
        Self {
            capabilities,
            raw_mode: false,
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermBackend {
    fn size(&self) -> Result<Size> {
        let (w, h) = terminal::size()?;
        Ok(Size::new(w, h))
    }

    fn capabilities(&self) -> &TerminalCapabilities {
        &self.capabilities
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        if !self.raw_mode {
            terminal::enable_raw_mode()?;
            execute!(io::stdout(), EnterAlternateScreen)?;
            self.raw_mode = true;
        }
        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        io::stdout().write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn enable_mouse(&mut self) -> Result<()> {
        execute!(io::stdout(), EnableMouseCapture)?;
        Ok(())
    }

    fn disable_mouse(&mut self) -> Result<()> {
        execute!(io::stdout(), DisableMouseCapture)?;
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(translate_event(event::read()?))
    }
}

/// Translate a crossterm event into our own event type, dropping event
/// kinds we have no use for (key release/repeat, raw cursor position
/// reports, and so on report as `None`).
fn translate_event(ev: event::Event) -> Option<Event> {
    match ev {
        event::Event::Key(key) => {
            if key.kind == event::KeyEventKind::Release {
                return None;
            }
            translate_key(key).map(Event::Key)
        }
        event::Event::Mouse(mouse) => translate_mouse(mouse).map(Event::Mouse),
        event::Event::Resize(w, h) => Some(Event::Resize(w, h)),
        event::Event::FocusGained => Some(Event::FocusGained),
        event::Event::FocusLost => Some(Event::FocusLost),
        event::Event::Paste(_) => None,
    }
}

fn translate_key(key: event::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Esc => KeyCode::Escape,
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::BackTab => KeyCode::BackTab,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::PageUp => KeyCode::PageUp,
        event::KeyCode::PageDown => KeyCode::PageDown,
        event::KeyCode::Insert => KeyCode::Insert,
        event::KeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(KeyEvent::new(code, translate_modifiers(key.modifiers)))
}

fn translate_mouse(mouse: event::MouseEvent) -> Option<MouseEvent> {
    let kind = match mouse.kind {
        event::MouseEventKind::Down(b) => MouseEventKind::Down(translate_button(b)),
        event::MouseEventKind::Up(b) => MouseEventKind::Up(translate_button(b)),
        event::MouseEventKind::Drag(b) => MouseEventKind::Drag(translate_button(b)),
        event::MouseEventKind::Moved => MouseEventKind::Move,
        event::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        event::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        event::MouseEventKind::ScrollLeft | event::MouseEventKind::ScrollRight => return None,
    };
    Some(MouseEvent {
        x: mouse.column,
        y: mouse.row,
        kind,
        modifiers: translate_modifiers(mouse.modifiers),
    })
}

fn translate_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

fn translate_modifiers(modifiers: event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    if modifiers.contains(event::KeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if modifiers.contains(event::KeyModifiers::CONTROL) {
        out |= Modifiers::CONTROL;
    }
    if modifiers.contains(event::KeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    if modifiers.contains(event::KeyModifiers::SUPER) {
        out |= Modifiers::SUPER;
    }
    out
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Detect terminal capabilities from the environment.
fn detect_capabilities() -> TerminalCapabilities {
    let color = detect_color_support();
    TerminalCapabilities {
        color,
        unicode: true,
        synchronized_output: false,
        kitty_keyboard: false,
        mouse: true,
        bracketed_paste: true,
        focus_events: true,
        hyperlinks: true,
        sixel: false,
    }
}

/// Detect color support from environment variables.
fn detect_color_support() -> ColorSupport {
    // Check COLORTERM for truecolor
    if let Ok(ct) = std::env::var("COLORTERM")
        && (ct == "truecolor" || ct == "24bit")
    {
        return ColorSupport::TrueColor;
    }
    // Check TERM for 256-color
    if let Ok(term) = std::env::var("TERM")
        && term.contains("256color")
    {
        return ColorSupport::Extended256;
    }
    // Check NO_COLOR
    if std::env::var("NO_COLOR").is_ok() {
        return ColorSupport::NoColor;
    }
    ColorSupport::Basic16
}
