//! Widget capability model and the build context widgets see.
//!
//! A widget is an immutable, ephemeral value describing desired UI for
//! one frame. Two base capabilities distinguish what a widget
//! contributes to the render tree:
//!
//!   - [`Composite`]: expands to another widget via `build`.
//!   - [`Leaf`]: contributes a layout node directly.
//!
//! Beyond that base split, a widget may implement any subset of the
//! capability traits below (`Focusable`, `KeybindProvider`, ...).
//! Rather than a class hierarchy, capability is queried per-trait —
//! the Rust analogue of the duck-typed capability model: a widget
//! collection holds `Box<dyn Leaf>` (or `Composite`) plus optional
//! `Box<dyn Focusable>` etc. registered alongside it during build.

pub mod border;

use std::cell::RefCell;
use std::rc::Rc;

use crate::dimension::{BorderStyle, BoxModel, DimensionSet};
use crate::event::{KeyEvent, MouseEvent};
use crate::style::Style;

/// Stable identity assigned to a widget: either an explicit
/// `widget_id` or a path-based id like `"0.2.1.3"` derived from tree
/// position during build. Explicit ids must be unique among siblings.
pub type WidgetId = String;

/// Result of handling a key or mouse event: whether it was consumed
/// or should continue bubbling to ancestors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResult {
    /// The event was consumed here; dispatch stops.
    Consumed,
    /// The event was not handled; propagate to the parent/ancestor.
    Ignored,
}

/// What a widget contributes when expanded during build: either
/// another widget to recurse into ([`Composite`]), or a layout node
/// that joins the render tree directly ([`Leaf`]).
pub enum Expansion {
    /// Recurse: expand this child widget next.
    Child(Box<dyn AnyWidget>),
    /// Terminal: this widget contributes a layout node.
    Node(crate::build::LayoutNode),
}

/// The object-safe core every widget implements. Most widgets should
/// implement [`Composite`] or [`Leaf`] instead and rely on the
/// blanket impl below; implement this directly only for node kinds
/// the build pipeline constructs itself (e.g. `Column`, `Row`), since
/// those need to thread `ancestor_chain`/`output` through each child
/// themselves via `build::build_into`.
pub trait AnyWidget {
    /// Expand this widget by one step (see [`Expansion`]). Container
    /// widgets that build more than one child must recurse into each
    /// via `build::build_into(child, ctx, ancestor_chain, output)`
    /// rather than returning `Expansion::Child`, which only the build
    /// pipeline's own single-child recursion handles.
    fn expand(
        &self,
        ctx: &crate::build::BuildContext,
        ancestor_chain: &mut Vec<WidgetId>,
        output: &mut crate::build::BuildOutput,
    ) -> Expansion;

    /// This widget's explicit id, if it supplies one. Widgets without
    /// one get a path-based id from their position in the tree.
    fn widget_id(&self) -> Option<&str> {
        None
    }

    /// The behavioral capabilities this widget's persistent state
    /// object exposes, if any, under the duck-typed capability model.
    /// A widget backed by state that persists across rebuilds (e.g. a
    /// `ListState`) overrides this to hand out `Rc` handles onto that
    /// state; a plain stateless widget leaves the default.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// If this widget registers a float (Floating/Dialog/Menu), its
    /// positioning and dismissal configuration. The build pipeline
    /// consults this before `expand`; a widget returning `Some` here
    /// contributes its subtree to the float collector instead of the
    /// normal flow.
    fn float_config(&self) -> Option<crate::overlay::FloatConfig> {
        None
    }
}

/// Optional behavioral handles a widget may register alongside its
/// layout contribution. Held as `Rc`/`Rc<RefCell<_>>` onto the
/// widget's persistent state object, not the ephemeral widget value
/// itself, so behavior survives the rebuild that recreates it.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub focusable: Option<Rc<dyn Focusable>>,
    pub keybind_provider: Option<Rc<dyn KeybindProvider>>,
    pub key_handler: Option<Rc<RefCell<dyn KeyHandler>>>,
    pub key_capturer: Option<Rc<dyn KeyCapturer>>,
    pub clickable: Option<Rc<RefCell<dyn Clickable>>>,
    pub mouse_down: Option<Rc<RefCell<dyn MouseDownHandler>>>,
    pub mouse_up: Option<Rc<RefCell<dyn MouseUpHandler>>>,
    pub mouse_move: Option<Rc<RefCell<dyn MouseMoveHandler>>>,
    pub hoverable: Option<Rc<RefCell<dyn Hoverable>>>,
    pub blurrable: Option<Rc<RefCell<dyn Blurrable>>>,
    pub focus_trapper: Option<Rc<dyn FocusTrapper>>,
}

impl Capabilities {
    /// Returns `true` if every capability slot is unset, i.e. this
    /// widget registered no behavior worth recording.
    pub fn is_empty(&self) -> bool {
        self.focusable.is_none()
            && self.keybind_provider.is_none()
            && self.key_handler.is_none()
            && self.key_capturer.is_none()
            && self.clickable.is_none()
            && self.mouse_down.is_none()
            && self.mouse_up.is_none()
            && self.mouse_move.is_none()
            && self.hoverable.is_none()
            && self.blurrable.is_none()
            && self.focus_trapper.is_none()
    }
}

/// A widget that expands into another widget during build. Expansion
/// recurses until a [`Leaf`] is reached.
///
/// Rust has no overlapping-impl support for "implements `Composite`
/// XOR `Leaf`", so concrete widgets implement [`AnyWidget`] directly,
/// typically as a one-line delegation: `fn expand(&self, ctx) ->
/// Expansion { Expansion::Child(Box::new(self.build(ctx))) }`.
pub trait Composite {
    /// Produce this widget's child widget. May read signals, which
    /// subscribes this widget to rebuild when they change.
    fn build(&self, ctx: &crate::build::BuildContext) -> Box<dyn AnyWidget>;
}

/// A widget that contributes a layout node directly to the render
/// tree, rather than expanding to another widget.
pub trait Leaf {
    /// This widget's sizing preferences.
    fn dimensions(&self) -> DimensionSet {
        DimensionSet::auto()
    }

    /// This widget's visual style (background, border, decorations).
    fn style(&self) -> Style {
        Style::default()
    }

    /// This widget's border style, if any. Most leaves only need this;
    /// override [`Leaf::box_model`] instead for padding/margin/title.
    fn border(&self) -> BorderStyle {
        BorderStyle::None
    }

    /// This widget's full box model (padding, margin, border,
    /// decorations). The default wraps `border()` with no padding,
    /// margin, or decorations.
    fn box_model(&self) -> BoxModel {
        BoxModel {
            border: self.border(),
            ..BoxModel::default()
        }
    }

    /// Build this leaf's contribution to the render tree. The default
    /// produces an empty `Box` node carrying this leaf's style/box
    /// model; container-like leaves (Column, Row, ...) override this.
    fn build_layout_node(&self, _ctx: &crate::build::BuildContext) -> crate::build::LayoutNode {
        crate::build::LayoutNode::new_box(self.dimensions(), self.style(), self.box_model())
    }
}

/// A widget capable of receiving keyboard focus.
pub trait Focusable {
    /// Whether this widget currently accepts focus (e.g. not disabled).
    fn is_focusable(&self) -> bool {
        true
    }
}

/// Declares a set of keybinds available while this widget (or a
/// descendant of it, via bubbling) holds focus.
pub trait KeybindProvider {
    /// The keybinds this widget declares, in priority order.
    fn keybinds(&self) -> Vec<Keybind>;
}

/// A single declared keybind: a normalized key-match string (see
/// `KeyEvent::match_string`), the action name, and whether it is
/// hidden from the rendered hint bar while still being active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keybind {
    /// Normalized match string, e.g. `"control+s"`.
    pub key: String,
    /// Human-readable action name, shown in hint bars.
    pub action: String,
    /// Hidden keybinds are active but excluded from the rendered hint
    /// set.
    pub hidden: bool,
}

impl Keybind {
    /// Create a visible keybind.
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
            hidden: false,
        }
    }

    /// Create a hidden keybind: active but not shown in hint bars.
    pub fn hidden(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
            hidden: true,
        }
    }
}

/// Imperative key handling, checked after declarative keybinds at each
/// step of the ancestor chain.
pub trait KeyHandler {
    /// Handle a key event. Returns whether it was consumed.
    fn on_key(&mut self, event: &KeyEvent) -> EventResult;
}

/// A widget that declares it consumes certain keys itself (e.g. a text
/// input capturing printable characters), suppressing ancestor
/// keybinds that would otherwise match.
pub trait KeyCapturer {
    /// Returns `true` if this widget wants to capture `event` itself,
    /// even if an ancestor has declared a matching keybind.
    fn captures(&self, event: &KeyEvent) -> bool;
}

/// A widget that responds to mouse clicks (down+up on the same
/// widget).
pub trait Clickable {
    /// Handle a completed click. `click_count` is 1 for a single
    /// click, 2 for a double click within the click-chain interval,
    /// and so on.
    fn on_click(&mut self, click_count: u8);
}

/// A widget that responds to a mouse-down event directly (used for
/// drag-capture sources like a split divider or scrollbar thumb).
pub trait MouseDownHandler {
    /// Handle a mouse-down event.
    fn on_mouse_down(&mut self, event: &MouseEvent) -> EventResult;
}

/// A widget that responds to a mouse-up event.
pub trait MouseUpHandler {
    /// Handle a mouse-up event.
    fn on_mouse_up(&mut self, event: &MouseEvent) -> EventResult;
}

/// A widget that responds to mouse-move events while it holds drag
/// capture (between its own mouse-down and the matching mouse-up).
pub trait MouseMoveHandler {
    /// Handle a mouse-move event during drag capture.
    fn on_mouse_move(&mut self, event: &MouseEvent) -> EventResult;
}

/// A widget that reacts to hover enter/leave.
pub trait Hoverable {
    /// Called when the cursor enters this widget's hit region.
    fn on_hover_enter(&mut self) {}
    /// Called when the cursor leaves this widget's hit region.
    fn on_hover_leave(&mut self) {}
}

/// A widget notified when it loses keyboard focus.
pub trait Blurrable {
    /// Called when focus moves away from this widget.
    fn on_blur(&mut self);
}

/// A widget that confines focus-cycling to its own subtree while
/// active (a trap scope).
pub trait FocusTrapper {
    /// Whether this widget is currently trapping focus within its
    /// subtree.
    fn traps_focus(&self) -> bool;
}
