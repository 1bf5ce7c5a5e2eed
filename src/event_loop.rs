//! The per-frame driver: drain input, apply queued mailbox messages,
//! rebuild the widget tree if a read signal changed, solve layout,
//! paint, diff, and flush — then wait for the next event.
//!
//! Rebuilds are coarse rather than fine-grained: the whole tree is one
//! reactive subscriber (see [`RebuildTrigger`]), so any signal read
//! anywhere during build marks the *entire* tree dirty rather than
//! just the widget that read it. A per-widget subscription graph
//! (rebuilding only the affected subtree) is the spec's stated ideal;
//! this full-root-rebuild approximation was chosen because it reuses
//! the existing `resubscribe_all` id-based rewiring exactly as
//! documented in `reactive::context`, and a terminal-sized tree is
//! cheap enough to rebuild wholesale every dirty frame.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::mpsc;
use std::time::Duration;

use crate::build::{self, BuildContext};
use crate::error::Result;
use crate::event::{Event, KeyCode};
use crate::focus::{self, FocusManager};
use crate::geometry::Size;
use crate::layout::{LayoutEngine, LayoutRect, Solved};
use crate::overlay;
use crate::paint;
use crate::reactive::context::{self, SubscriberId};
use crate::reactive::Subscriber;
use crate::render_context::RenderContext;
use crate::terminal::Terminal;
use crate::widget::{AnyWidget, Keybind};

/// The sending half of a mailbox: a background task's one-way channel
/// to the UI thread. Cloneable so multiple tasks can share one
/// receiver. `M` must be `Send`; it typically carries plain data (a
/// finished computation's result, a progress update) that the UI
/// thread's message handler turns into signal writes, since signals
/// themselves are `!Send`.
pub struct Mailbox<M> {
    sender: mpsc::Sender<M>,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<M: Send + 'static> Mailbox<M> {
    /// Send a message to the UI thread. Fails only if the event loop
    /// (and its receiver) has already been dropped.
    pub fn send(&self, message: M) -> std::result::Result<(), mpsc::SendError<M>> {
        self.sender.send(message)
    }
}

/// The receiving half of a mailbox, owned by the event loop.
pub struct MailboxReceiver<M> {
    receiver: mpsc::Receiver<M>,
}

/// Create a connected mailbox sender/receiver pair.
pub fn mailbox<M: Send + 'static>() -> (Mailbox<M>, MailboxReceiver<M>) {
    let (sender, receiver) = mpsc::channel();
    (Mailbox { sender }, MailboxReceiver { receiver })
}

impl<M> MailboxReceiver<M> {
    /// Drain every message currently queued, without blocking.
    fn drain(&self) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(m) = self.receiver.try_recv() {
            out.push(m);
        }
        out
    }
}

/// A `Subscriber` standing in for the whole widget tree: every build
/// tracks its signal reads under this subscriber's id and resubscribes
/// it to all of them, so any later write to any of them sets `dirty`.
struct RebuildTrigger {
    id: SubscriberId,
    dirty: Rc<Cell<bool>>,
}

impl Subscriber for RebuildTrigger {
    fn notify(&self) {
        self.dirty.set(true);
    }

    fn id(&self) -> SubscriberId {
        self.id
    }
}

/// What the event loop did this tick, for callers that want to log or
/// test loop behavior without running it forever.
#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    /// The loop rebuilt, laid out, and repainted this tick.
    Rendered,
    /// Nothing changed; no input, no dirty flag, no messages.
    Idle,
    /// The application requested exit.
    Exit,
}

/// Drives one application: owns the terminal, the double-buffered
/// render pipeline, the layout engine's persistent scroll state, and
/// the focus/input manager, across frames.
///
/// Generic over `M`, the mailbox message type a background task sends
/// to request a UI update (see [`mailbox`]).
pub struct EventLoop<M: Send + 'static> {
    terminal: Box<dyn Terminal>,
    render: RenderContext,
    layout: LayoutEngine,
    focus: FocusManager,
    trigger: Rc<RebuildTrigger>,
    mailbox: MailboxReceiver<M>,
    poll_timeout: Duration,
    should_exit: Rc<Cell<bool>>,
    active_modals: Vec<ActiveModal>,
    last_hits: Vec<focus::HitEntry>,
    theme: build::ThemeProbe,
}

/// The bits of a modal float's [`overlay::FloatConfig`] the event loop
/// needs between frames to dispatch Escape/click-outside dismissal,
/// plus its resolved screen rect from the frame that placed it.
#[derive(Clone)]
struct ActiveModal {
    dismiss_on_esc: bool,
    dismiss_on_click_outside: bool,
    on_dismiss: Option<overlay::DismissCallback>,
    rect: crate::geometry::Rect,
}

impl<M: Send + 'static> EventLoop<M> {
    /// Create an event loop against an already-initialized terminal
    /// (raw mode entered, mouse capture enabled as desired by the
    /// caller) and a mailbox receiver for background-task messages.
    pub fn new(terminal: Box<dyn Terminal>, mailbox: MailboxReceiver<M>) -> Result<Self> {
        let render = RenderContext::new(terminal.as_ref())?;
        Ok(Self {
            terminal,
            render,
            layout: LayoutEngine::new(),
            focus: FocusManager::new(),
            trigger: Rc::new(RebuildTrigger {
                id: context::next_subscriber_id(),
                dirty: Rc::new(Cell::new(true)),
            }),
            mailbox,
            poll_timeout: Duration::from_millis(50),
            should_exit: Rc::new(Cell::new(false)),
            active_modals: Vec::new(),
            last_hits: Vec::new(),
            theme: std::rc::Rc::new(|_: &str| None),
        })
    }

    /// Wire up the active theme's name→color lookup (spec §6's theme
    /// registry collaborator), exposed to every build via
    /// `BuildContext::theme` and to markup resolution at paint time.
    pub fn set_theme(&mut self, theme: build::ThemeProbe) {
        self.theme = theme;
    }

    /// Override how long `poll_event` waits for input before giving
    /// the loop a chance to check the dirty flag and mailbox (default
    /// 50ms).
    pub fn set_poll_timeout(&mut self, timeout: Duration) {
        self.poll_timeout = timeout;
    }

    /// A handle the application (or a widget's imperative handler) can
    /// use to request the loop exit after this tick finishes.
    pub fn exit_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.should_exit)
    }

    /// The focus/input manager, for widgets or the application to
    /// query focus/hover state between ticks.
    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    /// Run one tick: drain mailbox messages through `on_message`,
    /// drain and dispatch input events against `root_keybinds`, then
    /// rebuild/layout/paint if dirty. `build_root` constructs this
    /// frame's widget tree fresh from application state; it is only
    /// invoked when a rebuild is actually needed.
    pub fn tick(
        &mut self,
        build_root: &dyn Fn() -> Box<dyn AnyWidget>,
        root_keybinds: &[Keybind],
        mut on_message: impl FnMut(M),
    ) -> Result<Tick> {
        let mut did_work = false;

        for message in self.mailbox.drain() {
            on_message(message);
            did_work = true;
        }

        while let Some(event) = self.terminal.poll_event(Duration::from_millis(0))? {
            self.handle_event(event, root_keybinds);
            did_work = true;
            if self.should_exit.get() {
                return Ok(Tick::Exit);
            }
        }

        if !self.trigger.dirty.get() {
            if did_work {
                // A message or an input event landed but touched no
                // tracked signal (e.g. a keybind the app handles by
                // side effect alone); nothing new to paint.
                return Ok(Tick::Idle);
            }
            if let Some(event) = self.terminal.poll_event(self.poll_timeout)? {
                self.handle_event(event, root_keybinds);
                if self.should_exit.get() {
                    return Ok(Tick::Exit);
                }
            } else {
                return Ok(Tick::Idle);
            }
        }

        if !self.trigger.dirty.get() {
            return Ok(Tick::Idle);
        }

        self.render_frame(build_root)?;
        Ok(Tick::Rendered)
    }

    fn handle_event(&mut self, event: Event, root_keybinds: &[Keybind]) {
        match event {
            Event::Key(key) => {
                if key.code == KeyCode::Escape && self.dismiss_active_modal_on_esc() {
                    return;
                }
                let _ = self.focus.dispatch_key(&key, root_keybinds);
            }
            Event::Mouse(mouse) => {
                if matches!(mouse.kind, crate::event::MouseEventKind::Down(_))
                    && self.dismiss_modal_on_click_outside(mouse.x, mouse.y)
                {
                    return;
                }
                let hits = self.current_hit_list();
                let scroll = self.layout.scroll_manager_mut();
                let _ = self.focus.dispatch_mouse(mouse, &hits, scroll);
            }
            Event::Resize(w, h) => {
                self.render.handle_resize(Size::new(w, h));
                self.trigger.dirty.set(true);
            }
            Event::FocusGained | Event::FocusLost => {}
        }
    }

    fn current_hit_list(&self) -> Vec<focus::HitEntry> {
        // Populated by `render_frame`'s last solve; see `last_hits`.
        self.last_hits.clone()
    }

    fn dismiss_active_modal_on_esc(&mut self) -> bool {
        let Some(modal) = self.active_modals.last().cloned() else {
            return false;
        };
        if !modal.dismiss_on_esc {
            return false;
        }
        if let Some(cb) = &modal.on_dismiss {
            cb();
        }
        self.trigger.dirty.set(true);
        true
    }

    fn dismiss_modal_on_click_outside(&mut self, x: u16, y: u16) -> bool {
        let Some(modal) = self.active_modals.last().cloned() else {
            return false;
        };
        if !modal.dismiss_on_click_outside {
            return false;
        }
        let pos = crate::geometry::Position::new(x, y);
        if modal.rect.contains(pos) {
            return false;
        }
        if let Some(cb) = &modal.on_dismiss {
            cb();
        }
        self.trigger.dirty.set(true);
        true
    }

    fn render_frame(&mut self, build_root: &dyn Fn() -> Box<dyn AnyWidget>) -> Result<()> {
        context::start_tracking(self.trigger.id);
        let root = build_root();
        let ctx = BuildContext::root_with_probes(
            self.focus.focused().map(str::to_string),
            self.focus.hovered().map(str::to_string),
            self.theme.clone(),
        );
        let (node, output) = build::build_tree(root.as_ref(), &ctx);
        let deps = context::stop_tracking();
        let weak: Weak<dyn Subscriber> = Rc::downgrade(&self.trigger);
        context::resubscribe_all(&deps, &weak);
        self.trigger.dirty.set(false);

        let screen = self.render.size();
        let viewport = LayoutRect::new(0, 0, i32::from(screen.width), i32::from(screen.height));
        let main_solved = self.layout.solve(&node, viewport);

        let live_ids = collect_ids(&main_solved);
        self.layout.scroll_manager_mut().retain(&live_ids);

        self.focus.sync(output.focusables, output.capabilities);

        let mut hits = focus::hit_list(&main_solved);
        self.active_modals.clear();

        let mut placed_floats: Vec<PlacedFloat> = Vec::new();
        let mut modal_ids: Vec<String> = Vec::new();
        for float in output.floats {
            let natural = self.layout.solve(&float.node, viewport);
            let placed = overlay::place_float(&float.config, natural, screen, &main_solved);
            hits.extend(focus::hit_list(&placed));
            let modal = float.config.modal;
            if modal {
                modal_ids.push(float.id.clone());
                self.active_modals.push(ActiveModal {
                    dismiss_on_esc: float.config.dismiss_on_esc,
                    dismiss_on_click_outside: float.config.dismiss_on_click_outside,
                    on_dismiss: float.config.on_dismiss.clone(),
                    rect: placed.rect.to_screen_rect(),
                });
            }
            placed_floats.push(PlacedFloat { solved: placed, node: float.node, modal });
        }
        self.last_hits = hits;

        // The topmost modal float owns the focus scope (same float the
        // scrim targets below): entering it constrains Tab cycling to
        // its `modal_scope_id`-tagged focusables (spec §4.5) and saves
        // the previously focused id for restoration on close; leaving
        // it (dismissed, or no modal registered this frame) restores
        // that saved focus.
        let topmost_modal_id = modal_ids.last().cloned();
        if topmost_modal_id.as_deref() != self.focus.active_modal_id() {
            if self.focus.active_modal_id().is_some() {
                self.focus.close_modal();
            }
            if let Some(id) = topmost_modal_id {
                self.focus.open_modal(id);
            }
        }

        self.render.begin_frame();
        let theme: paint::Theme = &*self.theme;
        {
            let buf = self.render.buffer_mut();
            paint::paint_tree(&node, &main_solved, screen, buf, theme);
        }
        // A modal's scrim dims everything except the topmost modal
        // float; non-modal floats (tooltips, menus) draw straight over
        // it with no dimming.
        let scrim_rect = placed_floats
            .iter()
            .rev()
            .find(|f| f.modal)
            .map(|f| f.solved.rect.to_screen_rect());
        if let Some(float_rect) = scrim_rect {
            let buf = self.render.buffer_mut();
            paint_scrim(buf, screen, float_rect);
        }
        for float in &placed_floats {
            let buf = self.render.buffer_mut();
            paint::paint_tree(&float.node, &float.solved, screen, buf, theme);
        }

        self.render.end_frame(self.terminal.as_mut())?;
        Ok(())
    }
}

struct PlacedFloat {
    solved: Solved,
    node: crate::build::LayoutNode,
    modal: bool,
}

fn paint_scrim(buf: &mut crate::buffer::ScreenBuffer, screen: Size, exclude: crate::geometry::Rect) {
    let dim = overlay::scrim_style();
    for y in 0..screen.height {
        for x in 0..screen.width {
            if exclude.contains(crate::geometry::Position::new(x, y)) {
                continue;
            }
            if let Some(cell) = buf.get_mut(x, y) {
                cell.style = cell.style.merge(&dim);
            }
        }
    }
}

fn collect_ids(solved: &Solved) -> std::collections::HashSet<crate::widget::WidgetId> {
    let mut out = std::collections::HashSet::new();
    fn walk(node: &Solved, out: &mut std::collections::HashSet<crate::widget::WidgetId>) {
        out.insert(node.id.clone());
        for child in &node.children {
            walk(child, out);
        }
    }
    walk(solved, &mut out);
    out
}
