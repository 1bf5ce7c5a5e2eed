//! weft: a retained-reactive, build-then-layout-then-paint terminal UI
//! framework core.
//!
//! A frame runs three pure-ish passes: [`build`] expands a widget tree
//! into an ephemeral [`build::LayoutNode`] render tree (tracking
//! reactive reads along the way, see [`reactive`]); [`layout`] solves
//! that tree's rects against the terminal size; [`paint`] walks the
//! solved tree into a [`buffer::ScreenBuffer`], which [`render_context`]
//! diffs against the previous frame and [`renderer`] encodes as ANSI
//! escape sequences written to a [`terminal::Terminal`].

pub mod build;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod dimension;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod focus;
pub mod geometry;
pub mod layout;
pub mod markup;
pub mod overlay;
pub mod paint;
pub mod reactive;
pub mod render_context;
pub mod renderer;
pub mod segment;
pub mod style;
pub mod terminal;
pub mod text;
pub mod widget;
pub mod wrap;

pub use build::{BuildContext, BuildOutput, FloatEntry, FocusEntry, LayoutNode, ThemeProbe};
pub use buffer::{CellChange, ScreenBuffer};
pub use cell::Cell;
pub use color::{Color, Fill, Gradient, GradientDirection};
pub use dimension::{BorderStyle, BoxModel, Dimension, DimensionSet, EdgeInsets};
pub use error::{Result, WeftError};
pub use event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use event_loop::{EventLoop, Mailbox, MailboxReceiver, Tick, mailbox};
pub use focus::{DispatchOutcome, FocusManager, FocusState};
pub use geometry::{Position, Rect, Size};
pub use layout::{LayoutEngine, LayoutRect, Solved};
pub use markup::{MarkupSpan, parse as parse_markup, resolve as resolve_markup, strip_tags};
pub use overlay::{FloatAnchor, FloatConfig, Placement as FloatPlacement, ScreenAnchor};
pub use paint::paint_tree;
pub use reactive::{AnySignal, Computed, Effect, ReactiveScope, Signal, Subscriber, batch};
pub use render_context::RenderContext;
pub use renderer::{DeltaBatch, Renderer, batch_changes, build_sgr_sequence};
pub use segment::Segment;
pub use style::{Decoration, DecorationAlign, DecorationEdge, Style};
pub use terminal::{
    ColorSupport, CrosstermBackend, MultiplexerKind, Terminal, TerminalCapabilities, TerminalInfo,
    TerminalKind, TestBackend, detect, detect_multiplexer, detect_terminal, merge_multiplexer_limits,
    profile_for,
};
pub use text::{TextConfig, expand_tabs, filter_control_chars, preprocess};
pub use widget::{
    AnyWidget, Blurrable, Capabilities, Clickable, Composite, EventResult, Expansion, Focusable,
    FocusTrapper, Hoverable, Keybind, KeybindProvider, KeyCapturer, KeyHandler, Leaf,
    MouseDownHandler, MouseMoveHandler, MouseUpHandler, WidgetId,
};
pub use wrap::{WrapLine, WrapMode, display_width, wrap_text};
