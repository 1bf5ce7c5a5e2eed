//! Terminal capability profiles for known terminal emulators.

use super::detect::{MultiplexerKind, TerminalKind};
use super::traits::{ColorSupport, TerminalCapabilities};

/// Returns the default capability profile for a known terminal emulator.
///
/// Each profile is based on documented capabilities and real-world testing.
/// Unknown terminals receive a conservative baseline profile.
pub fn profile_for(kind: TerminalKind) -> TerminalCapabilities {
    match kind {
        TerminalKind::ITerm2 => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: true,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: true,
            sixel: false,
        },
        TerminalKind::Kitty => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: true,
            kitty_keyboard: true,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: true,
            sixel: false,
        },
        TerminalKind::Alacritty => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: false,
            sixel: false,
        },
        TerminalKind::WezTerm => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: true,
            kitty_keyboard: true,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: true,
            sixel: true,
        },
        TerminalKind::TerminalApp => TerminalCapabilities {
            color: ColorSupport::Basic16,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: false,
            focus_events: false,
            hyperlinks: false,
            sixel: false,
        },
        TerminalKind::WindowsTerminal => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: true,
            focus_events: false,
            hyperlinks: true,
            sixel: false,
        },
        TerminalKind::Xterm => TerminalCapabilities {
            color: ColorSupport::Extended256,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: false,
            sixel: false,
        },
        TerminalKind::VTE => TerminalCapabilities {
            color: ColorSupport::TrueColor,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
            hyperlinks: true,
            sixel: false,
        },
        TerminalKind::Unknown => TerminalCapabilities {
            color: ColorSupport::Basic16,
            unicode: true,
            synchronized_output: false,
            kitty_keyboard: false,
            mouse: true,
            bracketed_paste: false,
            focus_events: false,
            hyperlinks: false,
            sixel: false,
        },
    }
}

/// Applies multiplexer-specific capability limits to a terminal profile.
///
/// Terminal multiplexers like tmux and screen may intercept or not support
/// certain terminal features. This function adjusts capabilities accordingly.
///
/// # Examples
///
/// ```
/// use weft::terminal::{TerminalKind, MultiplexerKind, profile_for, merge_multiplexer_limits};
///
/// let kitty = profile_for(TerminalKind::Kitty);
/// let tmux_kitty = merge_multiplexer_limits(kitty, MultiplexerKind::Tmux);
/// // tmux may limit synchronized output even if Kitty supports it
/// ```
pub fn merge_multiplexer_limits(
    mut caps: TerminalCapabilities,
    multiplexer: MultiplexerKind,
) -> TerminalCapabilities {
    match multiplexer {
        MultiplexerKind::None => {
            // No multiplexer, return capabilities unchanged
        }
        MultiplexerKind::Tmux => {
            // tmux may not forward synchronized output reliably
            caps.synchronized_output = false;
            // tmux generally passes through other features
        }
        MultiplexerKind::Screen => {
            // screen is quite limited
            if caps.color == ColorSupport::TrueColor {
                caps.color = ColorSupport::Extended256;
            }
            caps.synchronized_output = false;
            caps.kitty_keyboard = false;
            caps.hyperlinks = false;
            caps.sixel = false;
        }
        MultiplexerKind::Zellij => {
            // Zellij is modern and mostly transparent
            // No specific limitations known
        }
    }
    caps
}
