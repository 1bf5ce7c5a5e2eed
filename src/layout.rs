//! Two-pass constraint layout engine: Measure then Allocate over a
//! [`crate::build::LayoutNode`] tree, producing a [`Solved`] tree of
//! i32-based rectangles.
//!
//! Sizing convention: a node's [`crate::dimension::Dimension`]
//! describes its *content*-box size (inside border+padding); a box
//! model's overhead (`2*border + padding + margin` per axis, see
//! [`crate::dimension::BoxModel`]) is added on top to get the total
//! extent a parent reserves for that child, margin included. This
//! mirrors CSS `box-sizing: content-box`, the simpler of the two
//! conventions and the one that keeps a bare `Dimension::Cells(n)`
//! meaning "n cells of content" regardless of how much border/padding
//! surrounds it.

pub mod scroll;

use crate::build::{
    Alignment, DockEdge, LayoutNode, MainAlign, ScrollAxis, SplitAxis, StackChild, TextAlign,
};
use crate::dimension::{BoxModel, Dimension, DimensionSet};
use crate::widget::WidgetId;
use crate::wrap::{self, WrapMode};
use scroll::ScrollManager;

/// An axis-aligned rectangle in layout space. Unlike `geometry::Rect`
/// (always non-negative, screen/cell-buffer space), a `LayoutRect` may
/// have a negative origin or extend past its parent: `Stack`'s
/// `Positioned` children can be placed partially outside their
/// parent's bounds before clipping at render time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl LayoutRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Shrink by an inset on each side; clamps width/height to 0 rather
    /// than going negative.
    pub fn shrink(&self, top: i32, right: i32, bottom: i32, left: i32) -> LayoutRect {
        LayoutRect {
            x: self.x + left,
            y: self.y + top,
            w: (self.w - left - right).max(0),
            h: (self.h - top - bottom).max(0),
        }
    }

    /// Best-effort conversion to cell-buffer space: negative origin
    /// clips to 0, and size shrinks to match so the clipped rect never
    /// extends past where the negative portion would have reached.
    pub fn to_screen_rect(&self) -> crate::geometry::Rect {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().max(x0);
        let y1 = self.bottom().max(y0);
        crate::geometry::Rect::new(
            x0 as u16,
            y0 as u16,
            (x1 - x0).max(0) as u16,
            (y1 - y0).max(0) as u16,
        )
    }
}

/// A bound on one axis during measurement: `min ≤ size ≤ max`, where
/// `max` of `None` means unbounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisConstraint {
    pub min: i32,
    pub max: Option<i32>,
}

impl AxisConstraint {
    pub fn tight(n: i32) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub fn bounded(max: i32) -> Self {
        Self { min: 0, max: Some(max) }
    }

    pub fn unbounded() -> Self {
        Self { min: 0, max: None }
    }

    pub fn clamp(&self, v: i32) -> i32 {
        let v = v.max(self.min);
        match self.max {
            Some(m) => v.min(m),
            None => v,
        }
    }

    /// Shrink `max` (and `min`, floored at 0) by `amount`, for
    /// deriving a content constraint from an outer one.
    fn shrink(&self, amount: i32) -> Self {
        Self {
            min: (self.min - amount).max(0),
            max: self.max.map(|m| (m - amount).max(0)),
        }
    }
}

/// A constraint box for both axes, passed down through measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConstraint {
    pub width: AxisConstraint,
    pub height: AxisConstraint,
}

impl BoxConstraint {
    pub fn tight(w: i32, h: i32) -> Self {
        Self {
            width: AxisConstraint::tight(w),
            height: AxisConstraint::tight(h),
        }
    }
}

/// The result of solving one node: its border box (background/border
/// drawn here), its content rect (where children are placed), and its
/// solved children.
#[derive(Clone, Debug)]
pub struct Solved {
    pub id: WidgetId,
    pub rect: LayoutRect,
    pub content_rect: LayoutRect,
    pub children: Vec<Solved>,
}

impl Solved {
    fn leaf(id: impl Into<WidgetId>, rect: LayoutRect, content_rect: LayoutRect) -> Self {
        Self {
            id: id.into(),
            rect,
            content_rect,
            children: Vec::new(),
        }
    }
}

/// An intrinsic size in cells, as reported by the measure pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Extent {
    w: i32,
    h: i32,
}

/// Drives the two-pass solver across frames, owning persistent scroll
/// state keyed by `Scrollable` widget id.
#[derive(Default)]
pub struct LayoutEngine {
    scroll: ScrollManager,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_manager(&self) -> &ScrollManager {
        &self.scroll
    }

    pub fn scroll_manager_mut(&mut self) -> &mut ScrollManager {
        &mut self.scroll
    }

    /// Solve `root` against `viewport`, the top-level available area.
    /// The allocate pass re-measures each subtree as it descends (the
    /// standard two-pass shape: what a node reports in Measure is what
    /// its parent uses to size it in Allocate), so there is no
    /// separate up-front Measure call on the root here.
    pub fn solve(&mut self, root: &LayoutNode, viewport: LayoutRect) -> Solved {
        allocate(root, viewport, &mut self.scroll)
    }
}

/// Resolve a `Dimension` to a content-axis size under `constraint`,
/// given the node's own natural/auto size (from children, or 0 for a
/// childless leaf).
fn resolve_dimension(dim: Dimension, constraint: &AxisConstraint, natural: i32) -> i32 {
    match dim {
        Dimension::Unset | Dimension::Auto => natural,
        Dimension::Cells(n) => n,
        Dimension::Flex(_) => 0,
        Dimension::Percent(p) => match constraint.max {
            Some(m) => ((p / 100.0) * f64::from(m)).floor() as i32,
            None => 0,
        },
    }
}

/// Derive the content-axis constraint available to a node's children
/// given the outer constraint and this node's box-model overhead.
fn inner_constraint(c: &BoxConstraint, box_model: &BoxModel) -> BoxConstraint {
    BoxConstraint {
        width: c.width.shrink(box_model.horizontal_overhead()),
        height: c.height.shrink(box_model.vertical_overhead()),
    }
}

/// Measure pass: compute each node's total reserved extent (content
/// size plus box-model overhead) under `constraint`. Returns the
/// total extent; does not mutate the tree (there is nowhere on
/// `LayoutNode` to cache it — the allocate pass re-measures children
/// as needed, which is cheap for terminal-sized trees).
fn measure(node: &LayoutNode, constraint: BoxConstraint) -> Extent {
    match node {
        LayoutNode::Box { dimensions, box_model, child, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let natural = child
                .as_ref()
                .map(|c| measure(c, inner))
                .unwrap_or_default();
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Text { dimensions, box_model, content, wrap_mode, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let natural = measure_text(content, *wrap_mode, inner);
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Column { dimensions, box_model, spacing, children, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let natural = measure_linear(children, inner, Axis::Vertical, *spacing);
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Row { dimensions, box_model, spacing, children, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let natural = measure_linear(children, inner, Axis::Horizontal, *spacing);
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Dock { dimensions, box_model, edges, body, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let mut remaining = inner;
            for (edge, node) in edges {
                let perp = match edge {
                    DockEdge::Top | DockEdge::Bottom => {
                        BoxConstraint { width: remaining.width, height: AxisConstraint::unbounded() }
                    }
                    DockEdge::Left | DockEdge::Right => {
                        BoxConstraint { width: AxisConstraint::unbounded(), height: remaining.height }
                    }
                };
                let extent = measure(node, perp);
                match edge {
                    DockEdge::Top | DockEdge::Bottom => {
                        remaining.height = remaining.height.shrink(extent.h);
                    }
                    DockEdge::Left | DockEdge::Right => {
                        remaining.width = remaining.width.shrink(extent.w);
                    }
                }
            }
            let body_extent = measure(body, remaining);
            total_extent(dimensions, box_model, &constraint, body_extent)
        }
        LayoutNode::Stack { dimensions, box_model, children, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let mut w = 0;
            let mut h = 0;
            for child in children {
                if let StackChild::Aligned(_, node) = child {
                    let e = measure(node, inner);
                    w = w.max(e.w);
                    h = h.max(e.h);
                }
            }
            total_extent(dimensions, box_model, &constraint, Extent { w, h })
        }
        LayoutNode::Scrollable { id, dimensions, box_model, axis, child, .. } => {
            assert_no_flex_in_unbounded(id, child, *axis);
            let inner = inner_constraint(&constraint, box_model);
            let child_constraint = BoxConstraint {
                width: if matches!(axis, ScrollAxis::Horizontal | ScrollAxis::Both) {
                    AxisConstraint::unbounded()
                } else {
                    inner.width
                },
                height: if matches!(axis, ScrollAxis::Vertical | ScrollAxis::Both) {
                    AxisConstraint::unbounded()
                } else {
                    inner.height
                },
            };
            let natural = measure(child, child_constraint);
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Split { dimensions, box_model, axis, position, min_pane, divider_size, first, second, .. } => {
            let inner = inner_constraint(&constraint, box_model);
            let (first_c, second_c) = split_constraints(inner, *axis, *position, *min_pane, *divider_size);
            let e1 = measure(first, first_c);
            let e2 = measure(second, second_c);
            let natural = match axis {
                SplitAxis::Horizontal => Extent {
                    w: e1.w + e2.w + divider_size,
                    h: e1.h.max(e2.h),
                },
                SplitAxis::Vertical => Extent {
                    w: e1.w.max(e2.w),
                    h: e1.h + e2.h + divider_size,
                },
            };
            total_extent(dimensions, box_model, &constraint, natural)
        }
        LayoutNode::Switcher { active, .. } => match active {
            Some(node) => measure(node, constraint),
            None => Extent::default(),
        },
        LayoutNode::Conditional { visible, reserve_space, child, .. } => {
            if *visible {
                child.as_ref().map(|c| measure(c, constraint)).unwrap_or_default()
            } else if *reserve_space {
                child.as_ref().map(|c| measure(c, constraint)).unwrap_or_default()
            } else {
                Extent::default()
            }
        }
        LayoutNode::Empty { .. } => Extent::default(),
    }
}

fn total_extent(
    dimensions: &DimensionSet,
    box_model: &BoxModel,
    constraint: &BoxConstraint,
    natural: Extent,
) -> Extent {
    let content_w = dimensions.clamp_width(resolve_dimension(dimensions.width, &constraint.width, natural.w));
    let content_h = dimensions.clamp_height(resolve_dimension(dimensions.height, &constraint.height, natural.h));
    let total_w = constraint.width.clamp(content_w + box_model.horizontal_overhead());
    let total_h = constraint.height.clamp(content_h + box_model.vertical_overhead());
    Extent { w: total_w, h: total_h }
}

fn measure_text(content: &str, wrap_mode: WrapMode, constraint: BoxConstraint) -> Extent {
    let width = constraint.width.max.unwrap_or(i32::MAX);
    if width <= 0 {
        return Extent::default();
    }
    let lines = wrap::wrap_text(content, width as usize, wrap_mode);
    let w = lines.iter().map(|l| wrap::display_width(&l.text) as i32).max().unwrap_or(0);
    let h = lines.len() as i32;
    Extent { w, h }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Measure a `Column`/`Row`'s natural size: sum of non-Flex children
/// along the main axis (Flex contributes 0), max of children along the
/// cross axis.
fn measure_linear(children: &[LayoutNode], constraint: BoxConstraint, axis: Axis, spacing: i32) -> Extent {
    let mut main_sum = 0;
    let mut cross_max = 0;
    let child_count = children.len() as i32;
    for child in children {
        let child_constraint = match axis {
            Axis::Horizontal => BoxConstraint {
                width: AxisConstraint::unbounded(),
                height: constraint.height,
            },
            Axis::Vertical => BoxConstraint {
                width: constraint.width,
                height: AxisConstraint::unbounded(),
            },
        };
        let e = measure(child, child_constraint);
        let (main, cross) = match axis {
            Axis::Horizontal => (e.w, e.h),
            Axis::Vertical => (e.h, e.w),
        };
        main_sum += main;
        cross_max = cross_max.max(cross);
    }
    if child_count > 1 {
        main_sum += spacing * (child_count - 1);
    }
    match axis {
        Axis::Horizontal => Extent { w: main_sum, h: cross_max },
        Axis::Vertical => Extent { w: cross_max, h: main_sum },
    }
}

fn split_constraints(
    inner: BoxConstraint,
    axis: SplitAxis,
    position: f64,
    min_pane: i32,
    divider_size: i32,
) -> (BoxConstraint, BoxConstraint) {
    match axis {
        SplitAxis::Horizontal => {
            let total = inner.width.max.unwrap_or(0);
            let available = (total - divider_size).max(0);
            let first_w = divider_position(available, position, min_pane);
            let second_w = (available - first_w).max(0);
            (
                BoxConstraint { width: AxisConstraint::bounded(first_w), height: inner.height },
                BoxConstraint { width: AxisConstraint::bounded(second_w), height: inner.height },
            )
        }
        SplitAxis::Vertical => {
            let total = inner.height.max.unwrap_or(0);
            let available = (total - divider_size).max(0);
            let first_h = divider_position(available, position, min_pane);
            let second_h = (available - first_h).max(0);
            (
                BoxConstraint { width: inner.width, height: AxisConstraint::bounded(first_h) },
                BoxConstraint { width: inner.width, height: AxisConstraint::bounded(second_h) },
            )
        }
    }
}

fn divider_position(available: i32, position: f64, min_pane: i32) -> i32 {
    let raw = (position * f64::from(available)).floor() as i32;
    let max_first = (available - min_pane).max(0);
    raw.clamp(min_pane.min(max_first), max_first)
}

/// Allocate pass: assign a final `LayoutRect` to `node` and its
/// subtree, given the rect its parent reserved for it (already
/// excluding this node's own margin — see `reserve_rect`).
fn allocate(node: &LayoutNode, outer: LayoutRect, scroll: &mut ScrollManager) -> Solved {
    match node {
        LayoutNode::Box { id, box_model, child, .. } => {
            let content = content_rect(outer, box_model);
            let children = child
                .as_ref()
                .map(|c| vec![allocate(c, content, scroll)])
                .unwrap_or_default();
            Solved { id: id.clone(), rect: outer, content_rect: content, children }
        }
        LayoutNode::Text { id, box_model, .. } => {
            let content = content_rect(outer, box_model);
            Solved::leaf(id.clone(), outer, content)
        }
        LayoutNode::Column { id, box_model, spacing, main_align, cross_align, children, .. } => {
            let content = content_rect(outer, box_model);
            let solved =
                allocate_linear(children, content, Axis::Vertical, *spacing, *main_align, *cross_align, scroll);
            Solved { id: id.clone(), rect: outer, content_rect: content, children: solved }
        }
        LayoutNode::Row { id, box_model, spacing, main_align, cross_align, children, .. } => {
            let content = content_rect(outer, box_model);
            let solved =
                allocate_linear(children, content, Axis::Horizontal, *spacing, *main_align, *cross_align, scroll);
            Solved { id: id.clone(), rect: outer, content_rect: content, children: solved }
        }
        LayoutNode::Dock { id, box_model, edges, body, .. } => {
            let content = content_rect(outer, box_model);
            let mut remaining = content;
            let mut children = Vec::with_capacity(edges.len() + 1);
            for (edge, edge_node) in edges {
                let extent = measure(
                    edge_node,
                    BoxConstraint::tight(remaining.w, remaining.h),
                );
                let (edge_rect, rest) = split_dock_edge(remaining, *edge, extent);
                children.push(allocate(edge_node, edge_rect, scroll));
                remaining = rest;
            }
            children.push(allocate(body, remaining, scroll));
            Solved { id: id.clone(), rect: outer, content_rect: content, children }
        }
        LayoutNode::Stack { id, box_model, children, .. } => {
            let content = content_rect(outer, box_model);
            let mut solved = Vec::with_capacity(children.len());
            for child in children {
                match child {
                    StackChild::Aligned(alignment, node) => {
                        let extent = measure(node, BoxConstraint::tight(content.w, content.h));
                        let rect = align_within(content, extent, *alignment);
                        solved.push(allocate(node, rect, scroll));
                    }
                    StackChild::Positioned { top, right, bottom, left, node } => {
                        let rect = positioned_rect(outer, *top, *right, *bottom, *left, node);
                        solved.push(allocate(node, rect, scroll));
                    }
                }
            }
            Solved { id: id.clone(), rect: outer, content_rect: content, children: solved }
        }
        LayoutNode::Scrollable { id, box_model, axis, child, .. } => {
            assert_no_flex_in_unbounded(id, child, *axis);
            let content = content_rect(outer, box_model);
            let scrollable_constraint = BoxConstraint {
                width: if matches!(axis, ScrollAxis::Horizontal | ScrollAxis::Both) {
                    AxisConstraint::unbounded()
                } else {
                    AxisConstraint::tight(content.w)
                },
                height: if matches!(axis, ScrollAxis::Vertical | ScrollAxis::Both) {
                    AxisConstraint::unbounded()
                } else {
                    AxisConstraint::tight(content.h)
                },
            };
            let extent = measure(child, scrollable_constraint);
            let state = scroll.remeasure(id, extent.w, extent.h, content.w, content.h);
            let child_rect = LayoutRect::new(
                content.x - state.offset_x,
                content.y - state.offset_y,
                extent.w.max(content.w),
                extent.h.max(content.h),
            );
            let child_solved = allocate(child, child_rect, scroll);
            Solved { id: id.clone(), rect: outer, content_rect: content, children: vec![child_solved] }
        }
        LayoutNode::Split { id, box_model, axis, position, min_pane, divider_size, first, second, .. } => {
            let content = content_rect(outer, box_model);
            let (first_rect, divider_rect, second_rect) =
                split_rects(content, *axis, *position, *min_pane, *divider_size);
            let _ = divider_rect; // divider hit-testing is wired in by the focus/input layer
            let children = vec![allocate(first, first_rect, scroll), allocate(second, second_rect, scroll)];
            Solved { id: id.clone(), rect: outer, content_rect: content, children }
        }
        LayoutNode::Switcher { id, active } => match active {
            Some(node) => {
                let child = allocate(node, outer, scroll);
                Solved { id: id.clone(), rect: outer, content_rect: outer, children: vec![child] }
            }
            None => Solved::leaf(id.clone(), outer, outer),
        },
        LayoutNode::Conditional { id, visible, reserve_space, child } => {
            if *visible {
                match child {
                    Some(node) => {
                        let child = allocate(node, outer, scroll);
                        Solved { id: id.clone(), rect: outer, content_rect: outer, children: vec![child] }
                    }
                    None => Solved::leaf(id.clone(), outer, outer),
                }
            } else if *reserve_space {
                // Hidden but still reserved: occupy the space a visible
                // child would, without allocating (and thus without
                // rendering) the child itself.
                Solved::leaf(id.clone(), outer, outer)
            } else {
                Solved::leaf(id.clone(), LayoutRect::new(outer.x, outer.y, 0, 0), outer)
            }
        }
        LayoutNode::Empty { id } => Solved::leaf(id.clone(), LayoutRect::new(outer.x, outer.y, 0, 0), outer),
    }
}

fn content_rect(outer: LayoutRect, box_model: &BoxModel) -> LayoutRect {
    let border = box_model.border.width();
    outer.shrink(
        border + box_model.padding.top,
        border + box_model.padding.right,
        border + box_model.padding.bottom,
        border + box_model.padding.left,
    )
}

/// Allocate `Column`/`Row` children along `axis` within `content`,
/// following the main-axis allocation rules: fixed/auto children first,
/// flex children share the remainder proportionally.
fn allocate_linear(
    children: &[LayoutNode],
    content: LayoutRect,
    axis: Axis,
    spacing: i32,
    main_align: MainAlign,
    cross_align: Alignment,
    scroll: &mut ScrollManager,
) -> Vec<Solved> {
    let main_extent = match axis {
        Axis::Horizontal => content.w,
        Axis::Vertical => content.h,
    };
    let cross_extent = match axis {
        Axis::Horizontal => content.h,
        Axis::Vertical => content.w,
    };
    let n = children.len() as i32;
    let gap_total = if n > 1 { spacing * (n - 1) } else { 0 };
    let mut leftover = (main_extent - gap_total).max(0);

    let mut main_sizes = vec![0_i32; children.len()];
    let mut flex_weights = vec![0.0_f64; children.len()];
    let mut is_flex = vec![false; children.len()];

    // 1. Reserve Cells children; 2. Resolve Percent; 3. Reserve Auto at
    // intrinsic size; Flex children are deferred to step 4.
    for (i, child) in children.iter().enumerate() {
        let dims = node_dimensions(child);
        let dim = match axis {
            Axis::Horizontal => dims.width,
            Axis::Vertical => dims.height,
        };
        match dim {
            Dimension::Flex(w) => {
                is_flex[i] = true;
                flex_weights[i] = w;
            }
            Dimension::Percent(p) => {
                let size = ((p / 100.0) * f64::from(main_extent)).floor() as i32;
                main_sizes[i] = size;
                leftover -= size;
            }
            Dimension::Cells(n) => {
                main_sizes[i] = n;
                leftover -= n;
            }
            Dimension::Auto | Dimension::Unset => {
                let child_constraint = match axis {
                    Axis::Horizontal => BoxConstraint {
                        width: AxisConstraint::unbounded(),
                        height: AxisConstraint::tight(cross_extent),
                    },
                    Axis::Vertical => BoxConstraint {
                        width: AxisConstraint::tight(cross_extent),
                        height: AxisConstraint::unbounded(),
                    },
                };
                let extent = measure(child, child_constraint);
                let size = match axis {
                    Axis::Horizontal => extent.w,
                    Axis::Vertical => extent.h,
                };
                main_sizes[i] = size;
                leftover -= size;
            }
        }
    }

    // 4. Distribute leftover among Flex children proportionally.
    let flex_total: f64 = flex_weights.iter().sum();
    let leftover_for_flex = leftover.max(0);
    if flex_total > 0.0 {
        let mut distributed = 0;
        let flex_indices: Vec<usize> = (0..children.len()).filter(|&i| is_flex[i]).collect();
        for &i in &flex_indices {
            let share = ((flex_weights[i] / flex_total) * f64::from(leftover_for_flex)).floor() as i32;
            main_sizes[i] = share;
            distributed += share;
        }
        if let Some(&last) = flex_indices.last() {
            main_sizes[last] += leftover_for_flex - distributed;
        }
    }

    // 6. Clamp per-child min/max, then position the block via
    // MainAlign if under-filled.
    let mut total_used = 0;
    for (i, child) in children.iter().enumerate() {
        let dims = node_dimensions(child);
        main_sizes[i] = match axis {
            Axis::Horizontal => dims.clamp_width(main_sizes[i]),
            Axis::Vertical => dims.clamp_height(main_sizes[i]),
        }
        .max(0);
        total_used += main_sizes[i];
    }
    total_used += gap_total;

    let block_offset = match main_align {
        MainAlign::Start => 0,
        MainAlign::Center => ((main_extent - total_used).max(0)) / 2,
        MainAlign::End => (main_extent - total_used).max(0),
    };

    let mut cursor = block_offset;
    let mut solved = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        let size = main_sizes[i];
        let (cross_size, cross_offset) = resolve_cross_size(child, size, cross_extent, axis, cross_align);
        let rect = match axis {
            Axis::Horizontal => {
                LayoutRect::new(content.x + cursor, content.y + cross_offset, size, cross_size)
            }
            Axis::Vertical => {
                LayoutRect::new(content.x + cross_offset, content.y + cursor, cross_size, size)
            }
        };
        solved.push(allocate(child, rect, scroll));
        cursor += size + spacing;
    }
    solved
}

/// Resolve a `Column`/`Row` child's cross-axis size and its offset
/// within `cross_extent`, per spec.md's allocation rule: a child
/// stretches to the full cross extent when its own cross dimension is
/// `Flex`/`Percent` or the parent's `cross_align` is `Stretch`;
/// otherwise it is measured at its intrinsic cross size (against the
/// already-resolved `main_size`) and positioned per `cross_align`.
fn resolve_cross_size(
    child: &LayoutNode,
    main_size: i32,
    cross_extent: i32,
    axis: Axis,
    cross_align: Alignment,
) -> (i32, i32) {
    let dims = node_dimensions(child);
    let cross_dim = match axis {
        Axis::Horizontal => dims.height,
        Axis::Vertical => dims.width,
    };
    let stretches = matches!(cross_align, Alignment::Stretch)
        || matches!(cross_dim, Dimension::Flex(_) | Dimension::Percent(_));
    if stretches {
        return (cross_extent, 0);
    }

    let measure_constraint = match axis {
        Axis::Horizontal => {
            BoxConstraint { width: AxisConstraint::tight(main_size), height: AxisConstraint::unbounded() }
        }
        Axis::Vertical => {
            BoxConstraint { width: AxisConstraint::unbounded(), height: AxisConstraint::tight(main_size) }
        }
    };
    let extent = measure(child, measure_constraint);
    let raw = match axis {
        Axis::Horizontal => extent.h,
        Axis::Vertical => extent.w,
    };
    let size = match axis {
        Axis::Horizontal => dims.clamp_height(raw),
        Axis::Vertical => dims.clamp_width(raw),
    }
    .max(0)
    .min(cross_extent);

    let offset = match cross_align {
        Alignment::Start => 0,
        Alignment::Center => (cross_extent - size).max(0) / 2,
        Alignment::End => (cross_extent - size).max(0),
        Alignment::Stretch => 0,
    };
    (size, offset)
}

/// Panics if `child`'s dimension along the scrollable axis is `Flex`.
///
/// Flex distributes leftover space along a bounded main axis; inside
/// a Scrollable's unbounded scroll axis there is no leftover to
/// distribute, so the proportion is meaningless: this is an invariant
/// violation, not a silent-degrade case like Percent.
fn assert_no_flex_in_unbounded(node_id: &str, child: &LayoutNode, axis: ScrollAxis) {
    let dims = node_dimensions(child);
    let offender = match axis {
        ScrollAxis::Horizontal => dims.width.is_flex().then_some("width"),
        ScrollAxis::Vertical => dims.height.is_flex().then_some("height"),
        ScrollAxis::Both => dims
            .width
            .is_flex()
            .then_some("width")
            .or_else(|| dims.height.is_flex().then_some("height")),
    };
    if let Some(axis_name) = offender {
        panic!(
            "layout: node {node_id:?}'s Scrollable child has Flex {axis_name}, but a Flex \
             dimension inside an unbounded scroll axis has no leftover space to distribute"
        );
    }
}

fn node_dimensions(node: &LayoutNode) -> DimensionSet {
    match node {
        LayoutNode::Box { dimensions, .. }
        | LayoutNode::Text { dimensions, .. }
        | LayoutNode::Column { dimensions, .. }
        | LayoutNode::Row { dimensions, .. }
        | LayoutNode::Dock { dimensions, .. }
        | LayoutNode::Stack { dimensions, .. }
        | LayoutNode::Scrollable { dimensions, .. }
        | LayoutNode::Split { dimensions, .. } => *dimensions,
        LayoutNode::Switcher { .. } | LayoutNode::Conditional { .. } | LayoutNode::Empty { .. } => {
            DimensionSet::auto()
        }
    }
}

fn split_dock_edge(remaining: LayoutRect, edge: DockEdge, extent: Extent) -> (LayoutRect, LayoutRect) {
    match edge {
        DockEdge::Top => {
            let h = extent.h.min(remaining.h);
            (
                LayoutRect::new(remaining.x, remaining.y, remaining.w, h),
                LayoutRect::new(remaining.x, remaining.y + h, remaining.w, remaining.h - h),
            )
        }
        DockEdge::Bottom => {
            let h = extent.h.min(remaining.h);
            (
                LayoutRect::new(remaining.x, remaining.bottom() - h, remaining.w, h),
                LayoutRect::new(remaining.x, remaining.y, remaining.w, remaining.h - h),
            )
        }
        DockEdge::Left => {
            let w = extent.w.min(remaining.w);
            (
                LayoutRect::new(remaining.x, remaining.y, w, remaining.h),
                LayoutRect::new(remaining.x + w, remaining.y, remaining.w - w, remaining.h),
            )
        }
        DockEdge::Right => {
            let w = extent.w.min(remaining.w);
            (
                LayoutRect::new(remaining.right() - w, remaining.y, w, remaining.h),
                LayoutRect::new(remaining.x, remaining.y, remaining.w - w, remaining.h),
            )
        }
    }
}

fn align_within(content: LayoutRect, extent: Extent, alignment: Alignment) -> LayoutRect {
    match alignment {
        Alignment::Stretch => content,
        Alignment::Start => LayoutRect::new(content.x, content.y, extent.w.min(content.w), extent.h.min(content.h)),
        Alignment::Center => {
            let w = extent.w.min(content.w);
            let h = extent.h.min(content.h);
            LayoutRect::new(
                content.x + (content.w - w) / 2,
                content.y + (content.h - h) / 2,
                w,
                h,
            )
        }
        Alignment::End => {
            let w = extent.w.min(content.w);
            let h = extent.h.min(content.h);
            LayoutRect::new(content.x + content.w - w, content.y + content.h - h, w, h)
        }
    }
}

/// Place a `Positioned` stack child against the border box (`outer`):
/// a set edge pins that side; an unset edge leaves that axis at the
/// child's natural size; opposing edges both set stretch the child
/// between them.
fn positioned_rect(
    outer: LayoutRect,
    top: Option<i32>,
    right: Option<i32>,
    bottom: Option<i32>,
    left: Option<i32>,
    node: &LayoutNode,
) -> LayoutRect {
    let natural = measure(node, BoxConstraint::tight(outer.w, outer.h));

    let (y, h) = match (top, bottom) {
        (Some(t), Some(b)) => (outer.y + t, (outer.h - t - b).max(0)),
        (Some(t), None) => (outer.y + t, natural.h),
        (None, Some(b)) => (outer.bottom() - b - natural.h, natural.h),
        (None, None) => (outer.y, natural.h),
    };
    let (x, w) = match (left, right) {
        (Some(l), Some(r)) => (outer.x + l, (outer.w - l - r).max(0)),
        (Some(l), None) => (outer.x + l, natural.w),
        (None, Some(r)) => (outer.right() - r - natural.w, natural.w),
        (None, None) => (outer.x, natural.w),
    };
    LayoutRect::new(x, y, w, h)
}

fn split_rects(
    content: LayoutRect,
    axis: SplitAxis,
    position: f64,
    min_pane: i32,
    divider_size: i32,
) -> (LayoutRect, LayoutRect, LayoutRect) {
    match axis {
        SplitAxis::Horizontal => {
            let available = (content.w - divider_size).max(0);
            let first_w = divider_position(available, position, min_pane);
            let second_w = (available - first_w).max(0);
            let first = LayoutRect::new(content.x, content.y, first_w, content.h);
            let divider = LayoutRect::new(content.x + first_w, content.y, divider_size, content.h);
            let second = LayoutRect::new(content.x + first_w + divider_size, content.y, second_w, content.h);
            (first, divider, second)
        }
        SplitAxis::Vertical => {
            let available = (content.h - divider_size).max(0);
            let first_h = divider_position(available, position, min_pane);
            let second_h = (available - first_h).max(0);
            let first = LayoutRect::new(content.x, content.y, content.w, first_h);
            let divider = LayoutRect::new(content.x, content.y + first_h, content.w, divider_size);
            let second = LayoutRect::new(content.x, content.y + first_h + divider_size, content.w, second_h);
            (first, divider, second)
        }
    }
}
