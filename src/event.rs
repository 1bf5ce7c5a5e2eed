//! Input event types produced by the terminal driver collaborator.
//!
//! These are the wire types the core dispatches through the focus and
//! mouse pipelines (see `focus`). The terminal I/O driver that decodes
//! raw bytes into these values is an external collaborator; this module
//! only defines the contract.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0001;
        /// Control key.
        const CONTROL = 0b0010;
        /// Alt key.
        const ALT = 0b0100;
        /// Platform "super"/command/meta key.
        const SUPER = 0b1000;
    }
}

/// A logical key, independent of modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    /// A printable character, as typed (case carried in the char itself).
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    /// Function key `F(n)`, 1-indexed.
    F(u8),
}

/// A single key press, with the modifiers held at the time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The logical key.
    pub code: KeyCode,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Create a key event with the given modifiers.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a normalized match string (see [`KeyEvent::match_string`])
    /// back into a `KeyEvent`. Used where a keybind hint needs to be
    /// checked against a `KeyCapturer` without an actual event in hand.
    /// Returns `None` for a string with no recognized key symbol.
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = Modifiers::empty();
        let parts: Vec<&str> = s.split('+').collect();
        let (mods, key) = parts.split_at(parts.len().checked_sub(1)?);
        let key = key.first()?;
        for m in mods {
            match *m {
                "alt" => modifiers |= Modifiers::ALT,
                "control" => modifiers |= Modifiers::CONTROL,
                "shift" => modifiers |= Modifiers::SHIFT,
                "super" => modifiers |= Modifiers::SUPER,
                _ => return None,
            }
        }
        let code = match *key {
            "enter" => KeyCode::Enter,
            "escape" => KeyCode::Escape,
            "backspace" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "insert" => KeyCode::Insert,
            other => {
                if let Some(rest) = other.strip_prefix('f') {
                    KeyCode::F(rest.parse().ok()?)
                } else {
                    let mut chars = other.chars();
                    let c = chars.next()?;
                    if chars.next().is_some() {
                        return None;
                    }
                    KeyCode::Char(c)
                }
            }
        };
        Some(Self { code, modifiers })
    }

    /// Normalized keybind-match string: modifiers joined by `+`
    /// (alphabetical: alt, control, shift, super), then the key symbol,
    /// all lowercase. Used by the focus manager's keybind dispatch:
    /// `"a"` and `"A"` normalize to the same string, with Shift carried
    /// as an explicit modifier rather than folded into the character.
    pub fn match_string(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(Modifiers::ALT) {
            parts.push("alt");
        }
        if self.modifiers.contains(Modifiers::CONTROL) {
            parts.push("control");
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            parts.push("shift");
        }
        if self.modifiers.contains(Modifiers::SUPER) {
            parts.push("super");
        }
        let key = key_symbol(self.code);
        parts.push(key.as_str());
        parts.join("+")
    }
}

fn key_symbol(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
        KeyCode::Enter => "enter".into(),
        KeyCode::Escape => "escape".into(),
        KeyCode::Backspace => "backspace".into(),
        KeyCode::Delete => "delete".into(),
        KeyCode::Tab => "tab".into(),
        KeyCode::BackTab => "backtab".into(),
        KeyCode::Up => "up".into(),
        KeyCode::Down => "down".into(),
        KeyCode::Left => "left".into(),
        KeyCode::Right => "right".into(),
        KeyCode::Home => "home".into(),
        KeyCode::End => "end".into(),
        KeyCode::PageUp => "pageup".into(),
        KeyCode::PageDown => "pagedown".into(),
        KeyCode::Insert => "insert".into(),
        KeyCode::F(n) => format!("f{n}"),
    }
}

/// A mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A single mouse event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// Column, 0-indexed.
    pub x: u16,
    /// Row, 0-indexed.
    pub y: u16,
    /// The kind of mouse event.
    pub kind: MouseEventKind,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

/// The kind of mouse interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Move,
    /// Drag: move while a button is held; carries the button being held.
    Drag(MouseButton),
    /// Wheel scroll; `true` for up/away from the user, `false` for down.
    ScrollUp,
    ScrollDown,
}

/// A top-level input or system event reaching the event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// The terminal was resized to (width, height).
    Resize(u16, u16),
    /// A focus-gain notification from the terminal (if supported).
    FocusGained,
    /// A focus-loss notification from the terminal (if supported).
    FocusLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_key_has_no_modifiers() {
        let k = KeyEvent::plain(KeyCode::Enter);
        assert_eq!(k.modifiers, Modifiers::empty());
    }

    #[test]
    fn match_string_plain_char() {
        let k = KeyEvent::plain(KeyCode::Char('q'));
        assert_eq!(k.match_string(), "q");
    }

    #[test]
    fn match_string_with_modifiers() {
        let k = KeyEvent::new(KeyCode::Char('a'), Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(k.match_string(), "control+shift+a");
    }

    #[test]
    fn match_string_case_insensitive_on_char() {
        let lower = KeyEvent::plain(KeyCode::Char('a'));
        let upper = KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT);
        assert_eq!(lower.match_string(), "a");
        assert_eq!(upper.match_string(), "shift+a");
    }

    #[test]
    fn match_string_named_key() {
        let k = KeyEvent::plain(KeyCode::F(5));
        assert_eq!(k.match_string(), "f5");
    }

    #[test]
    fn parse_round_trips_through_match_string() {
        let k = KeyEvent::new(KeyCode::Char('s'), Modifiers::CONTROL);
        assert_eq!(KeyEvent::parse(&k.match_string()), Some(k));
        let f = KeyEvent::plain(KeyCode::F(12));
        assert_eq!(KeyEvent::parse(&f.match_string()), Some(f));
        let tab = KeyEvent::plain(KeyCode::BackTab);
        assert_eq!(KeyEvent::parse(&tab.match_string()), Some(tab));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(KeyEvent::parse("bogus+key"), None);
        assert_eq!(KeyEvent::parse("fbanana"), None);
        assert_eq!(KeyEvent::parse("ab"), None);
    }
}
