//! The build pipeline: pure expansion of a widget tree into a render
//! tree of [`LayoutNode`]s, assigning stable ids and collecting
//! focusables, floats, and keybind ancestry along the way.

use std::collections::HashMap;
use std::rc::Rc;

use crate::color::Color;
use crate::dimension::{BoxModel, DimensionSet};
use crate::style::Style;
use crate::widget::{AnyWidget, Capabilities, Expansion, WidgetId};

/// A lookup from theme color name (e.g. `"Primary"`) to its resolved
/// `Color`, snapshotted for the whole build (spec §4.2's "theme
/// snapshot"). The default probe resolves nothing, matching markup's
/// "unknown theme name: log and fall back to inherit" rule (§7).
pub type ThemeProbe = Rc<dyn Fn(&str) -> Option<Color>>;

fn no_theme() -> ThemeProbe {
    Rc::new(|_: &str| None)
}

/// A node in the solved-shape-free render tree: the output of the
/// build pipeline and the input to the layout engine. Holds sizing
/// and style data plus, for container variants, its own children —
/// already built, never raw widgets.
pub enum LayoutNode {
    /// A plain box: background, border, optional decorations, one
    /// optional child.
    Box {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        child: Option<Box<LayoutNode>>,
    },
    /// A run of text, wrapped and aligned per its own config.
    Text {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        content: String,
        wrap_mode: crate::wrap::WrapMode,
        align: TextAlign,
    },
    /// Children stacked top-to-bottom.
    Column {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        spacing: i32,
        main_align: MainAlign,
        cross_align: Alignment,
        children: Vec<LayoutNode>,
    },
    /// Children stacked left-to-right.
    Row {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        spacing: i32,
        main_align: MainAlign,
        cross_align: Alignment,
        children: Vec<LayoutNode>,
    },
    /// Edge-docked children around a central body.
    Dock {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        edges: Vec<(DockEdge, LayoutNode)>,
        body: Box<LayoutNode>,
    },
    /// Freely-positioned overlapping children.
    Stack {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        children: Vec<StackChild>,
    },
    /// A single scrollable child with persistent offset state.
    Scrollable {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        axis: ScrollAxis,
        child: Box<LayoutNode>,
    },
    /// Two panes divided by a draggable divider.
    Split {
        id: WidgetId,
        dimensions: DimensionSet,
        style: Style,
        box_model: BoxModel,
        axis: SplitAxis,
        position: f64,
        min_pane: i32,
        divider_size: i32,
        first: Box<LayoutNode>,
        second: Box<LayoutNode>,
    },
    /// Exactly one of several keyed children, selected by `active`.
    Switcher {
        id: WidgetId,
        active: Option<Box<LayoutNode>>,
    },
    /// A child present only when `visible`; `reserve_space` controls
    /// whether an invisible child still occupies layout space
    /// (`VisibleWhen` semantics) or collapses entirely
    /// (`ShowWhen`/`HideWhen` semantics).
    Conditional {
        id: WidgetId,
        visible: bool,
        reserve_space: bool,
        child: Option<Box<LayoutNode>>,
    },
    /// An empty marker: zero size, nothing drawn. Produced when a
    /// `Conditional` is hidden and does not reserve space, or when a
    /// `Floating` widget's normal-flow position is a no-op placeholder.
    Empty { id: WidgetId },
}

impl LayoutNode {
    /// Construct a childless `Box` node.
    pub fn new_box(dimensions: DimensionSet, style: Style, box_model: BoxModel) -> Self {
        LayoutNode::Box {
            id: String::new(),
            dimensions,
            style,
            box_model,
            child: None,
        }
    }

    /// This node's stable id.
    pub fn id(&self) -> &str {
        match self {
            LayoutNode::Box { id, .. }
            | LayoutNode::Text { id, .. }
            | LayoutNode::Column { id, .. }
            | LayoutNode::Row { id, .. }
            | LayoutNode::Dock { id, .. }
            | LayoutNode::Stack { id, .. }
            | LayoutNode::Scrollable { id, .. }
            | LayoutNode::Split { id, .. }
            | LayoutNode::Switcher { id, .. }
            | LayoutNode::Conditional { id, .. }
            | LayoutNode::Empty { id } => id,
        }
    }
}

/// Main-axis alignment for `Column`/`Row` when the children's total
/// extent is less than the available content size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MainAlign {
    #[default]
    Start,
    Center,
    End,
}

/// Cross-axis alignment for `Column`/`Row`/`Stack` children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alignment {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

/// Horizontal alignment of wrapped lines within a `Text` node's block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

/// A `Dock` edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DockEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// A `Stack` child: either laid out within the content rect via
/// `Alignment`, or pinned to the border box via explicit edge offsets.
pub enum StackChild {
    /// Positioned using normal-flow alignment within the content rect.
    Aligned(Alignment, LayoutNode),
    /// Pinned to the border box. Any `None` edge leaves that axis at
    /// the child's natural size; if both opposing edges are set, the
    /// child is stretched between them.
    Positioned {
        top: Option<i32>,
        right: Option<i32>,
        bottom: Option<i32>,
        left: Option<i32>,
        node: LayoutNode,
    },
}

/// The axis a `Scrollable` scrolls along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
    Both,
}

/// The axis a `Split` divides along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitAxis {
    Vertical,
    Horizontal,
}

/// Per-descent, immutable context passed to a widget's `build`/
/// `build_layout_node`. Children get their own context via
/// [`BuildContext::push_child`], which extends the path.
#[derive(Clone)]
pub struct BuildContext {
    path: Vec<usize>,
    disabled: bool,
    trap_scope: Option<WidgetId>,
    modal_scope: Option<WidgetId>,
    focused_id: Option<WidgetId>,
    hovered_id: Option<WidgetId>,
    theme: ThemeProbe,
}

impl BuildContext {
    /// A fresh context for the root of the tree, with no widget
    /// focused or hovered and no theme wired up.
    pub fn root() -> Self {
        Self {
            path: vec![0],
            disabled: false,
            trap_scope: None,
            modal_scope: None,
            focused_id: None,
            hovered_id: None,
            theme: no_theme(),
        }
    }

    /// A fresh root context carrying the focus manager's current
    /// focused/hovered ids and a theme snapshot, so widgets can query
    /// `is_focused`/`is_hovered`/`theme` while building this frame.
    pub fn root_with_probes(
        focused_id: Option<WidgetId>,
        hovered_id: Option<WidgetId>,
        theme: ThemeProbe,
    ) -> Self {
        Self {
            focused_id,
            hovered_id,
            theme,
            ..Self::root()
        }
    }

    /// Whether `id` is the currently focused widget (spec §4.2's
    /// "focus probe").
    pub fn is_focused(&self, id: &str) -> bool {
        self.focused_id.as_deref() == Some(id)
    }

    /// Whether `id` is the currently hovered widget (spec §4.2's
    /// "hover probe").
    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered_id.as_deref() == Some(id)
    }

    /// Resolve a `$ThemeName` reference against this build's theme
    /// snapshot.
    pub fn theme(&self, name: &str) -> Option<Color> {
        (self.theme)(name)
    }

    /// This widget's path-based id, e.g. `"0.2.1.3"`.
    pub fn path_id(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether an ancestor has set the disabled flag; disabled
    /// propagates to all descendants.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// The trap scope id active at this point in the tree, if any.
    pub fn trap_scope(&self) -> Option<&str> {
        self.trap_scope.as_deref()
    }

    /// The modal scope id active at this point in the tree, if any.
    pub fn modal_scope(&self) -> Option<&str> {
        self.modal_scope.as_deref()
    }

    /// Derive the context for the `index`-th child.
    pub fn push_child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            path,
            ..self.clone()
        }
    }

    /// A context identical to this one but with the disabled flag set.
    pub fn with_disabled(&self, disabled: bool) -> Self {
        Self {
            disabled: self.disabled || disabled,
            ..self.clone()
        }
    }

    /// A context with a trap scope pushed, for descending into a
    /// `FocusTrapper`'s subtree.
    pub fn with_trap_scope(&self, id: WidgetId) -> Self {
        Self {
            trap_scope: Some(id),
            ..self.clone()
        }
    }

    /// A context with a modal scope pushed, for descending into a
    /// modal float's subtree.
    pub fn with_modal_scope(&self, id: WidgetId) -> Self {
        Self {
            modal_scope: Some(id),
            ..self.clone()
        }
    }
}

/// A collected focusable widget: its id, ancestor chain (root to
/// parent), and the trap/modal scope active at the point it was
/// collected.
#[derive(Clone, Debug)]
pub struct FocusEntry {
    pub id: WidgetId,
    pub ancestor_chain: Vec<WidgetId>,
    pub trap_scope_id: Option<WidgetId>,
    pub modal_scope_id: Option<WidgetId>,
}

/// A collected floating subtree: unresolved until layout positions it
/// against its anchor (see `overlay`).
pub struct FloatEntry {
    pub id: WidgetId,
    pub config: crate::overlay::FloatConfig,
    pub node: LayoutNode,
}

/// Everything the build pass collects alongside the render tree:
/// focusables in document order, registered floats, and every
/// widget's behavioral capabilities by id (consumed by the focus
/// manager's dispatch pipeline, see `focus`).
#[derive(Default)]
pub struct BuildOutput {
    pub focusables: Vec<FocusEntry>,
    pub floats: Vec<FloatEntry>,
    pub capabilities: HashMap<WidgetId, Capabilities>,
}

/// Expand `root` into a solved-shape-free render tree, collecting
/// focusables and floats. This is a pure function of the widget tree
/// and the context: it performs no layout and no rendering.
pub fn build_tree(root: &dyn AnyWidget, ctx: &BuildContext) -> (LayoutNode, BuildOutput) {
    let mut output = BuildOutput::default();
    let mut ancestor_chain = Vec::new();
    let node = build_into(root, ctx, &mut ancestor_chain, &mut output);
    (node, output)
}

/// Expand one widget by one step, recursing through `Expansion::Child`
/// until a layout node is produced. Container widgets that build more
/// than one child (`Column`, `Row`, ...) call this directly for each
/// child from within their own `AnyWidget::expand`, so that a single
/// entry point owns id assignment, trap-scope propagation, and
/// focusable collection no matter how deep the tree recurses.
pub fn build_into(
    widget: &dyn AnyWidget,
    ctx: &BuildContext,
    ancestor_chain: &mut Vec<WidgetId>,
    output: &mut BuildOutput,
) -> LayoutNode {
    let id = widget
        .widget_id()
        .map(ToString::to_string)
        .unwrap_or_else(|| ctx.path_id());

    let caps = widget.capabilities();

    if !caps.is_empty() {
        output.capabilities.insert(id.clone(), caps.clone());
    }

    let effective_ctx = if caps
        .focus_trapper
        .as_ref()
        .is_some_and(|t| t.traps_focus())
    {
        ctx.with_trap_scope(id.clone())
    } else {
        ctx.clone()
    };

    if !ctx.is_disabled() {
        if let Some(focusable) = &caps.focusable {
            if focusable.is_focusable() {
                collect_focusable(output, &effective_ctx, id.clone(), ancestor_chain);
            }
        }
    }

    if let Some(config) = widget.float_config() {
        let float_ctx = if config.modal {
            effective_ctx.with_modal_scope(id.clone())
        } else {
            effective_ctx.clone()
        };

        ancestor_chain.push(id.clone());
        let node = match widget.expand(&float_ctx, ancestor_chain, output) {
            Expansion::Child(child) => {
                let child_ctx = float_ctx.push_child(0);
                build_into(child.as_ref(), &child_ctx, ancestor_chain, output)
            }
            Expansion::Node(mut node) => {
                set_id(&mut node, id.clone());
                node
            }
        };
        ancestor_chain.pop();

        output.floats.push(FloatEntry { id: id.clone(), config, node });
        return LayoutNode::Empty { id };
    }

    ancestor_chain.push(id.clone());

    let node = match widget.expand(&effective_ctx, ancestor_chain, output) {
        Expansion::Child(child) => {
            let child_ctx = effective_ctx.push_child(0);
            build_into(child.as_ref(), &child_ctx, ancestor_chain, output)
        }
        Expansion::Node(mut node) => {
            set_id(&mut node, id.clone());
            node
        }
    };

    ancestor_chain.pop();
    node
}

fn set_id(node: &mut LayoutNode, id: WidgetId) {
    match node {
        LayoutNode::Box { id: slot, .. }
        | LayoutNode::Text { id: slot, .. }
        | LayoutNode::Column { id: slot, .. }
        | LayoutNode::Row { id: slot, .. }
        | LayoutNode::Dock { id: slot, .. }
        | LayoutNode::Stack { id: slot, .. }
        | LayoutNode::Scrollable { id: slot, .. }
        | LayoutNode::Split { id: slot, .. }
        | LayoutNode::Switcher { id: slot, .. }
        | LayoutNode::Conditional { id: slot, .. }
        | LayoutNode::Empty { id: slot } => {
            if slot.is_empty() {
                *slot = id;
            }
        }
    }
}

/// Record a focusable widget into the output, using the ancestor
/// chain and scope ids active at the point of collection. Skipped
/// automatically by callers when `ctx.is_disabled()`.
pub fn collect_focusable(output: &mut BuildOutput, ctx: &BuildContext, id: WidgetId, ancestor_chain: &[WidgetId]) {
    output.focusables.push(FocusEntry {
        id,
        ancestor_chain: ancestor_chain.to_vec(),
        trap_scope_id: ctx.trap_scope().map(ToString::to_string),
        modal_scope_id: ctx.modal_scope().map(ToString::to_string),
    });
}
