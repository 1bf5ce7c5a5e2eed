//! Benchmarks for the two-pass constraint layout engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weft::build::{Alignment, DockEdge, LayoutNode, MainAlign, ScrollAxis, StackChild};
use weft::dimension::{BoxModel, Dimension, DimensionSet};
use weft::layout::{LayoutEngine, LayoutRect};
use weft::style::Style;
use weft::wrap::WrapMode;

fn text_leaf(content: &str) -> LayoutNode {
    LayoutNode::Text {
        id: String::new(),
        dimensions: DimensionSet::auto(),
        style: Style::default(),
        box_model: BoxModel::default(),
        content: content.to_string(),
        wrap_mode: WrapMode::Soft,
        align: Default::default(),
    }
}

fn flex_box(weight: f64) -> LayoutNode {
    LayoutNode::Box {
        id: String::new(),
        dimensions: DimensionSet {
            height: Dimension::Flex(weight),
            ..DimensionSet::auto()
        },
        style: Style::default(),
        box_model: BoxModel::default(),
        child: Some(Box::new(text_leaf("row item"))),
    }
}

fn wide_column(n: usize) -> LayoutNode {
    LayoutNode::Column {
        id: String::new(),
        dimensions: DimensionSet::auto(),
        style: Style::default(),
        box_model: BoxModel::default(),
        spacing: 1,
        main_align: MainAlign::Start,
        cross_align: Alignment::default(),
        children: (0..n).map(|i| flex_box(1.0 + (i % 3) as f64)).collect(),
    }
}

fn dashboard_tree() -> LayoutNode {
    let sidebar = wide_column(20);
    let main = LayoutNode::Stack {
        id: String::new(),
        dimensions: DimensionSet::auto(),
        style: Style::default(),
        box_model: BoxModel::default(),
        children: vec![
            StackChild::Aligned(Alignment::Stretch, wide_column(15)),
            StackChild::Positioned {
                top: Some(0),
                right: Some(0),
                bottom: None,
                left: None,
                node: text_leaf("badge"),
            },
        ],
    };
    let scrollable_log = LayoutNode::Scrollable {
        id: "log".to_string(),
        dimensions: DimensionSet::auto(),
        style: Style::default(),
        box_model: BoxModel::default(),
        axis: ScrollAxis::Vertical,
        child: Box::new(wide_column(200)),
    };

    LayoutNode::Dock {
        id: String::new(),
        dimensions: DimensionSet::auto(),
        style: Style::default(),
        box_model: BoxModel::default(),
        edges: vec![
            (DockEdge::Left, sidebar),
            (DockEdge::Bottom, scrollable_log),
        ],
        body: Box::new(main),
    }
}

fn bench_layout(c: &mut Criterion) {
    let tree = dashboard_tree();
    let viewport = LayoutRect::new(0, 0, 120, 40);

    c.bench_function("solve_dashboard_tree", |b| {
        b.iter(|| {
            let mut engine = LayoutEngine::new();
            black_box(engine.solve(black_box(&tree), black_box(viewport)));
        });
    });

    c.bench_function("solve_dashboard_tree_warm_scroll_state", |b| {
        let mut engine = LayoutEngine::new();
        engine.solve(&tree, viewport);
        b.iter(|| {
            black_box(engine.solve(black_box(&tree), black_box(viewport)));
        });
    });
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
