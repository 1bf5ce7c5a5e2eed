//! Focus & input manager: keyboard focus cycling with trap/modal scopes,
//! the keybind dispatch pipeline (declarative keybinds, then imperative
//! handlers, then ancestor bubbling, then root), and the mouse pipeline
//! (hit-testing, click-chain, drag capture, hover, wheel bubbling).
//!
//! Focus entries and capability handles come from each frame's
//! [`crate::build::BuildOutput`] via [`FocusManager::sync`] — the
//! manager itself never walks the widget tree; it only holds the
//! collected-by-build data plus the bits of state (focused id, modal
//! stack, drag/hover/click state) that must survive across frames.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::build::FocusEntry;
use crate::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use crate::geometry::{Position, Rect};
use crate::layout::{Solved, scroll::ScrollManager};
use crate::widget::{Capabilities, EventResult, Keybind, WidgetId};

/// Whether a widget currently has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
    Focused,
    Unfocused,
}

/// A flat, paint-order record of a node's screen-space hit rectangle,
/// built from a solved tree (see [`hit_list`]). Used for mouse
/// hit-testing; unrelated to the widget's focusability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitEntry {
    pub id: WidgetId,
    pub rect: Rect,
}

/// Walk a solved tree in document (paint) order, recording each node's
/// screen-space rect. Append the result of one call per registered
/// float, in z-order, to the main tree's list before hit-testing: the
/// combined list's *end* is topmost, matching the order things were
/// actually drawn in (see [`FocusManager::dispatch_mouse`]).
pub fn hit_list(solved: &Solved) -> Vec<HitEntry> {
    let mut out = Vec::new();
    fn walk(node: &Solved, out: &mut Vec<HitEntry>) {
        out.push(HitEntry {
            id: node.id.clone(),
            rect: node.rect.to_screen_rect(),
        });
        for child in &node.children {
            walk(child, out);
        }
    }
    walk(solved, &mut out);
    out
}

/// Outcome of a key dispatch, for callers that want to react to a
/// matched declarative keybind (e.g. an app-level action dispatcher)
/// or tell a keybind hint bar that focus moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing matched or handled the event.
    Unhandled,
    /// Tab/Shift-Tab moved focus.
    FocusChanged,
    /// A declarative keybind matched at `widget_id` (empty for a
    /// root-level keybind); `action` is the keybind's action name.
    Keybind { widget_id: WidgetId, action: String },
    /// An imperative `KeyHandler` (or capture-swallow) consumed the
    /// event with no declarative keybind involved.
    Handled,
}

struct DragCapture {
    id: WidgetId,
    button: MouseButton,
}

/// Focus order, trap/modal scope constraint, keybind dispatch, and the
/// mouse hit-test/click-chain/drag/hover pipeline.
pub struct FocusManager {
    entries: Vec<FocusEntry>,
    capabilities: HashMap<WidgetId, Capabilities>,
    focused_id: Option<WidgetId>,
    active_modal_id: Option<WidgetId>,
    modal_focus_stack: Vec<Option<WidgetId>>,
    hover_id: Option<WidgetId>,
    drag: Option<DragCapture>,
    last_click: Option<(WidgetId, Instant)>,
    click_count: u8,
    click_interval: Duration,
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusManager {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            capabilities: HashMap::new(),
            focused_id: None,
            active_modal_id: None,
            modal_focus_stack: Vec::new(),
            hover_id: None,
            drag: None,
            last_click: None,
            click_count: 0,
            click_interval: Duration::from_millis(500),
        }
    }

    /// Override the click-chain interval (default 500ms).
    pub fn set_click_interval(&mut self, interval: Duration) {
        self.click_interval = interval;
    }

    // ---- focus order -------------------------------------------------

    /// Adopt this frame's collected focusables and capabilities. If the
    /// currently focused id is no longer present, focus clears; if
    /// nothing is focused and the list is non-empty, the first
    /// focusable is focused.
    pub fn sync(&mut self, entries: Vec<FocusEntry>, capabilities: HashMap<WidgetId, Capabilities>) {
        self.capabilities = capabilities;
        let still_present = self
            .focused_id
            .as_ref()
            .is_some_and(|id| entries.iter().any(|e| &e.id == id));
        self.entries = entries;
        if !still_present {
            self.focused_id = None;
        }
        if self.focused_id.is_none() {
            self.focused_id = self.entries.first().map(|e| e.id.clone());
        }
    }

    /// The currently focused widget id, if any.
    pub fn focused(&self) -> Option<&str> {
        self.focused_id.as_deref()
    }

    /// Whether a specific widget id currently has focus.
    pub fn focus_state(&self, id: &str) -> FocusState {
        if self.focused_id.as_deref() == Some(id) {
            FocusState::Focused
        } else {
            FocusState::Unfocused
        }
    }

    /// The candidate set focus cycling is confined to: entries sharing
    /// the focused entry's trap scope, or (if no trap is active)
    /// entries whose modal scope matches `active_modal_id`.
    fn candidates(&self) -> Vec<WidgetId> {
        let focused_trap = self
            .focused_id
            .as_ref()
            .and_then(|id| self.entries.iter().find(|e| &e.id == id))
            .and_then(|e| e.trap_scope_id.clone());

        if let Some(trap) = focused_trap {
            self.entries
                .iter()
                .filter(|e| e.trap_scope_id.as_deref() == Some(trap.as_str()))
                .map(|e| e.id.clone())
                .collect()
        } else {
            self.entries
                .iter()
                .filter(|e| e.modal_scope_id == self.active_modal_id)
                .map(|e| e.id.clone())
                .collect()
        }
    }

    /// Move focus forward (Tab). Returns `false` if there were no
    /// candidates to cycle through.
    pub fn focus_next(&mut self) -> bool {
        self.cycle(1)
    }

    /// Move focus backward (Shift-Tab). Returns `false` if there were
    /// no candidates to cycle through.
    pub fn focus_previous(&mut self) -> bool {
        self.cycle(-1)
    }

    fn cycle(&mut self, dir: i32) -> bool {
        let ids = self.candidates();
        if ids.is_empty() {
            return false;
        }
        let len = ids.len() as i32;
        let current_idx = self.focused_id.as_ref().and_then(|id| ids.iter().position(|x| x == id));
        let next_idx = match current_idx {
            Some(i) => (((i as i32 + dir) % len + len) % len) as usize,
            None => 0,
        };
        self.set_focus(Some(ids[next_idx].clone()));
        true
    }

    /// Focus a widget by id directly. A silent no-op if `id` is not
    /// among this frame's focusables.
    pub fn focus_by_id(&mut self, id: &str) {
        if self.entries.iter().any(|e| e.id == id) {
            self.set_focus(Some(id.to_string()));
        }
    }

    /// Clear focus entirely.
    pub fn clear_focus(&mut self) {
        self.set_focus(None);
    }

    fn set_focus(&mut self, new_id: Option<WidgetId>) {
        if self.focused_id != new_id {
            if let Some(old) = &self.focused_id {
                if let Some(caps) = self.capabilities.get(old) {
                    if let Some(blurrable) = &caps.blurrable {
                        blurrable.borrow_mut().on_blur();
                    }
                }
            }
            self.focused_id = new_id;
        }
    }

    // ---- modal scopes --------------------------------------------------

    /// Open a modal: saves the currently focused id for restoration and
    /// constrains cycling to `modal_id` until [`FocusManager::close_modal`].
    pub fn open_modal(&mut self, modal_id: impl Into<WidgetId>) {
        self.modal_focus_stack.push(self.focused_id.clone());
        self.active_modal_id = Some(modal_id.into());
    }

    /// Close the active modal, restoring the focus id saved when it
    /// was opened.
    pub fn close_modal(&mut self) {
        self.active_modal_id = None;
        if let Some(prev) = self.modal_focus_stack.pop() {
            self.set_focus(prev);
        }
    }

    /// The id of the currently active modal scope, if any.
    pub fn active_modal_id(&self) -> Option<&str> {
        self.active_modal_id.as_deref()
    }

    // ---- keybind dispatch ----------------------------------------------

    /// Dispatch a key event: global Tab/Shift-Tab navigation, then the
    /// focused widget's declarative keybinds, then its imperative
    /// handler, then the same two checks ascending the ancestor chain,
    /// then root-level keybinds.
    ///
    /// If the focused widget is a `KeyCapturer` that captures this
    /// event, global navigation and ancestor bubbling are both
    /// suppressed: the event is resolved entirely at the focused
    /// widget (consumed whether or not it was actually handled), so a
    /// text input can own a key an ancestor also binds.
    pub fn dispatch_key(&mut self, event: &KeyEvent, root_keybinds: &[Keybind]) -> DispatchOutcome {
        let captured = self
            .focused_id
            .as_ref()
            .and_then(|id| self.capabilities.get(id))
            .and_then(|c| c.key_capturer.as_ref())
            .is_some_and(|kc| kc.captures(event));

        if !captured {
            use crate::event::KeyCode;
            use crate::event::Modifiers;
            let is_shift_tab = event.code == KeyCode::BackTab
                || (event.code == KeyCode::Tab && event.modifiers.contains(Modifiers::SHIFT));
            if is_shift_tab {
                if self.focus_previous() {
                    return DispatchOutcome::FocusChanged;
                }
            } else if event.code == KeyCode::Tab {
                if self.focus_next() {
                    return DispatchOutcome::FocusChanged;
                }
            }
        }

        if let Some(focused) = self.focused_id.clone() {
            if let Some(outcome) = self.try_widget(&focused, event) {
                return outcome;
            }
            if captured {
                // The focused widget declared ownership of this key even
                // though neither its keybinds nor its handler consumed it
                // (e.g. a printable character with no specific behavior).
                return DispatchOutcome::Handled;
            }
            let ancestors = self
                .entries
                .iter()
                .find(|e| e.id == focused)
                .map(|e| e.ancestor_chain.clone())
                .unwrap_or_default();
            for ancestor in ancestors.iter().rev() {
                if let Some(outcome) = self.try_widget(ancestor, event) {
                    return outcome;
                }
            }
        }

        if let Some(kb) = root_keybinds.iter().find(|k| k.key == event.match_string()) {
            return DispatchOutcome::Keybind {
                widget_id: String::new(),
                action: kb.action.clone(),
            };
        }

        DispatchOutcome::Unhandled
    }

    fn try_widget(&self, id: &str, event: &KeyEvent) -> Option<DispatchOutcome> {
        let caps = self.capabilities.get(id)?;
        if let Some(provider) = &caps.keybind_provider {
            if let Some(kb) = provider.keybinds().iter().find(|k| k.key == event.match_string()) {
                return Some(DispatchOutcome::Keybind {
                    widget_id: id.to_string(),
                    action: kb.action.clone(),
                });
            }
        }
        if let Some(handler) = &caps.key_handler {
            if handler.borrow_mut().on_key(event) == EventResult::Consumed {
                return Some(DispatchOutcome::Handled);
            }
        }
        None
    }

    /// Merge the focused widget's keybinds with its ancestors' and the
    /// root's, for rendering a keybind hint bar. Keys the focused
    /// widget captures (per `KeyCapturer`) are suppressed so the hint
    /// bar doesn't advertise a binding that can't actually fire.
    /// Hidden keybinds are excluded (they remain active for dispatch,
    /// just not listed here); when the same key is bound at more than
    /// one scope, the innermost (closest to focus) wins.
    pub fn active_keybinds(&self, root_keybinds: &[Keybind]) -> Vec<Keybind> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();

        if let Some(focused) = &self.focused_id {
            let capturer = self
                .capabilities
                .get(focused)
                .and_then(|c| c.key_capturer.clone());
            let is_captured = |key: &str| -> bool {
                capturer
                    .as_ref()
                    .is_some_and(|kc| KeyEvent::parse(key).is_some_and(|ev| kc.captures(&ev)))
            };

            let mut chain = vec![focused.clone()];
            if let Some(entry) = self.entries.iter().find(|e| &e.id == focused) {
                chain.extend(entry.ancestor_chain.iter().rev().cloned());
            }
            for id in &chain {
                if let Some(caps) = self.capabilities.get(id) {
                    if let Some(provider) = &caps.keybind_provider {
                        for kb in provider.keybinds() {
                            if seen.insert(kb.key.clone()) && !kb.hidden && !is_captured(&kb.key) {
                                out.push(kb);
                            }
                        }
                    }
                }
            }
        }

        for kb in root_keybinds {
            if seen.insert(kb.key.clone()) && !kb.hidden {
                out.push(kb.clone());
            }
        }
        out
    }

    // ---- mouse dispatch --------------------------------------------------

    fn topmost_at<'a>(hits: &'a [HitEntry], x: u16, y: u16) -> Option<&'a HitEntry> {
        let pos = Position::new(x, y);
        hits.iter().rev().find(|h| h.rect.contains(pos))
    }

    /// Dispatch a mouse event against `hits` (see [`hit_list`]; pass
    /// the main tree's list with each active float's list appended in
    /// z-order, so the combined list's tail is topmost). `scroll` is
    /// consulted for wheel-bubbling: an id in the cursor's ancestor
    /// chain that the scroll manager has state for is a candidate.
    pub fn dispatch_mouse(&mut self, event: MouseEvent, hits: &[HitEntry], scroll: &mut ScrollManager) -> EventResult {
        match event.kind {
            MouseEventKind::Down(button) => {
                if let Some(hit) = Self::topmost_at(hits, event.x, event.y) {
                    let id = hit.id.clone();
                    self.drag = Some(DragCapture { id: id.clone(), button });
                    if let Some(h) = self.capabilities.get(&id).and_then(|c| c.mouse_down.clone()) {
                        h.borrow_mut().on_mouse_down(&event);
                    }
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            MouseEventKind::Up(button) => {
                let Some(drag) = self.drag.take() else {
                    return EventResult::Ignored;
                };
                if drag.button != button {
                    self.drag = Some(drag);
                    return EventResult::Ignored;
                }
                if let Some(h) = self.capabilities.get(&drag.id).and_then(|c| c.mouse_up.clone()) {
                    h.borrow_mut().on_mouse_up(&event);
                }
                let topmost = Self::topmost_at(hits, event.x, event.y).map(|h| h.id.clone());
                if topmost.as_deref() == Some(drag.id.as_str()) {
                    let count = self.register_click(&drag.id);
                    if let Some(h) = self.capabilities.get(&drag.id).and_then(|c| c.clickable.clone()) {
                        h.borrow_mut().on_click(count);
                    }
                }
                EventResult::Consumed
            }
            MouseEventKind::Move => {
                self.update_hover(hits, event.x, event.y);
                EventResult::Ignored
            }
            MouseEventKind::Drag(button) => {
                if let Some(drag) = &self.drag {
                    if drag.button == button {
                        let id = drag.id.clone();
                        if let Some(h) = self.capabilities.get(&id).and_then(|c| c.mouse_move.clone()) {
                            h.borrow_mut().on_mouse_move(&event);
                        }
                        return EventResult::Consumed;
                    }
                }
                self.update_hover(hits, event.x, event.y);
                EventResult::Ignored
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                self.dispatch_wheel(&event, hits, scroll)
            }
        }
    }

    fn register_click(&mut self, id: &str) -> u8 {
        let now = Instant::now();
        let same_chain = matches!(&self.last_click, Some((last_id, t)) if last_id == id && now.duration_since(*t) <= self.click_interval);
        self.click_count = if same_chain { self.click_count.saturating_add(1) } else { 1 };
        self.last_click = Some((id.to_string(), now));
        self.click_count
    }

    fn update_hover(&mut self, hits: &[HitEntry], x: u16, y: u16) {
        let topmost = Self::topmost_at(hits, x, y).map(|h| h.id.clone());
        if topmost != self.hover_id {
            if let Some(old) = &self.hover_id {
                if let Some(h) = self.capabilities.get(old).and_then(|c| c.hoverable.clone()) {
                    h.borrow_mut().on_hover_leave();
                }
            }
            if let Some(new_id) = &topmost {
                if let Some(h) = self.capabilities.get(new_id).and_then(|c| c.hoverable.clone()) {
                    h.borrow_mut().on_hover_enter();
                }
            }
            self.hover_id = topmost;
        }
    }

    /// The widget id currently under the cursor, if any (updated by
    /// `Move`/`Drag` dispatch). Exposed for widgets wanting hover
    /// styling via a hover probe.
    pub fn hovered(&self) -> Option<&str> {
        self.hover_id.as_deref()
    }

    fn dispatch_wheel(&mut self, event: &MouseEvent, hits: &[HitEntry], scroll: &mut ScrollManager) -> EventResult {
        let up = matches!(event.kind, MouseEventKind::ScrollUp);
        let pos = Position::new(event.x, event.y);
        // `hits` is in document (outer-to-inner) order; reversing walks
        // from the innermost containing node outward, which is also
        // exactly "topmost drawn first" when floats were appended after
        // the main tree.
        for hit in hits.iter().rev().filter(|h| h.rect.contains(pos)) {
            if let Some(state) = scroll.get_mut(&hit.id) {
                let can_scroll = if up { state.offset_y > 0 } else { state.offset_y < state.max_offset_y() };
                if can_scroll {
                    state.scroll_by(0, if up { -3 } else { 3 });
                    return EventResult::Consumed;
                }
            }
        }
        EventResult::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::layout::LayoutRect;

    fn entry(id: &str, trap: Option<&str>, modal: Option<&str>) -> FocusEntry {
        FocusEntry {
            id: id.to_string(),
            ancestor_chain: Vec::new(),
            trap_scope_id: trap.map(str::to_string),
            modal_scope_id: modal.map(str::to_string),
        }
    }

    #[test]
    fn sync_focuses_first_when_none_focused() {
        let mut fm = FocusManager::new();
        fm.sync(vec![entry("a", None, None), entry("b", None, None)], HashMap::new());
        assert_eq!(fm.focused(), Some("a"));
    }

    #[test]
    fn sync_clears_focus_when_id_gone() {
        let mut fm = FocusManager::new();
        fm.sync(vec![entry("a", None, None)], HashMap::new());
        fm.focus_by_id("a");
        fm.sync(vec![entry("b", None, None)], HashMap::new());
        assert_eq!(fm.focused(), Some("b"));
    }

    #[test]
    fn focus_next_cycles_and_wraps() {
        let mut fm = FocusManager::new();
        fm.sync(
            vec![entry("a", None, None), entry("b", None, None), entry("c", None, None)],
            HashMap::new(),
        );
        assert_eq!(fm.focused(), Some("a"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("b"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("c"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("a"));
    }

    #[test]
    fn focus_previous_wraps_to_end() {
        let mut fm = FocusManager::new();
        fm.sync(vec![entry("a", None, None), entry("b", None, None)], HashMap::new());
        fm.focus_previous();
        assert_eq!(fm.focused(), Some("b"));
    }

    #[test]
    fn focus_next_n_times_returns_to_start() {
        let mut fm = FocusManager::new();
        let entries = vec![entry("a", None, None), entry("b", None, None), entry("c", None, None)];
        let n = entries.len();
        fm.sync(entries, HashMap::new());
        let start = fm.focused().map(str::to_string);
        for _ in 0..n {
            fm.focus_next();
        }
        assert_eq!(fm.focused().map(str::to_string), start);
    }

    #[test]
    fn trap_scope_confines_cycling() {
        // A, B, C where only B is inside a trap. Focus starts at A
        // (no trap active), Tab cycles among all three (trap is only
        // consulted relative to the *focused* entry). Focusing B then
        // Tab should stay at B: the candidate set becomes "entries in
        // B's trap", which is just B itself.
        let mut fm = FocusManager::new();
        fm.sync(
            vec![
                entry("a", None, None),
                entry("b", Some("trap1"), None),
                entry("c", None, None),
            ],
            HashMap::new(),
        );
        fm.focus_by_id("b");
        fm.focus_next();
        assert_eq!(fm.focused(), Some("b"));
    }

    #[test]
    fn modal_scope_confines_cycling_and_restores_on_close() {
        let mut fm = FocusManager::new();
        fm.sync(
            vec![
                entry("base", None, None),
                entry("modal-a", None, Some("m1")),
                entry("modal-b", None, Some("m1")),
            ],
            HashMap::new(),
        );
        fm.focus_by_id("base");
        fm.open_modal("m1");
        fm.focus_by_id("modal-a");
        fm.focus_next();
        assert_eq!(fm.focused(), Some("modal-b"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("modal-a"));
        fm.close_modal();
        assert_eq!(fm.focused(), Some("base"));
    }

    #[test]
    fn focus_by_id_missing_is_silent_noop() {
        let mut fm = FocusManager::new();
        fm.sync(vec![entry("a", None, None)], HashMap::new());
        fm.focus_by_id("nonexistent");
        assert_eq!(fm.focused(), Some("a"));
    }

    #[test]
    fn hit_list_is_document_order() {
        let solved = Solved {
            id: "root".to_string(),
            rect: LayoutRect::new(0, 0, 80, 24),
            content_rect: LayoutRect::new(0, 0, 80, 24),
            children: vec![Solved {
                id: "child".to_string(),
                rect: LayoutRect::new(2, 2, 10, 5),
                content_rect: LayoutRect::new(2, 2, 10, 5),
                children: Vec::new(),
            }],
        };
        let hits = hit_list(&solved);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "root");
        assert_eq!(hits[1].id, "child");
    }

    #[test]
    fn dispatch_mouse_click_requires_down_and_up_on_same_widget() {
        struct Counter(std::cell::Cell<u8>);
        impl crate::widget::Clickable for Counter {
            fn on_click(&mut self, click_count: u8) {
                self.0.set(click_count);
            }
        }
        let clicked = std::rc::Rc::new(std::cell::RefCell::new(Counter(std::cell::Cell::new(0))));
        let mut caps = HashMap::new();
        caps.insert(
            "button".to_string(),
            Capabilities {
                clickable: Some(clicked.clone()),
                ..Default::default()
            },
        );

        let mut fm = FocusManager::new();
        fm.sync(Vec::new(), caps);
        let hits = vec![HitEntry {
            id: "button".to_string(),
            rect: Rect::new(0, 0, 10, 3),
        }];
        let mut scroll = ScrollManager::new();

        fm.dispatch_mouse(
            MouseEvent { x: 1, y: 1, kind: MouseEventKind::Down(MouseButton::Left), modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        fm.dispatch_mouse(
            MouseEvent { x: 1, y: 1, kind: MouseEventKind::Up(MouseButton::Left), modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        assert_eq!(clicked.borrow().0.get(), 1);
    }

    #[test]
    fn dispatch_mouse_no_click_when_released_outside() {
        struct Counter(std::cell::Cell<u8>);
        impl crate::widget::Clickable for Counter {
            fn on_click(&mut self, click_count: u8) {
                self.0.set(click_count);
            }
        }
        let clicked = std::rc::Rc::new(std::cell::RefCell::new(Counter(std::cell::Cell::new(0))));
        let mut caps = HashMap::new();
        caps.insert(
            "button".to_string(),
            Capabilities {
                clickable: Some(clicked.clone()),
                ..Default::default()
            },
        );
        let mut fm = FocusManager::new();
        fm.sync(Vec::new(), caps);
        let hits = vec![HitEntry {
            id: "button".to_string(),
            rect: Rect::new(0, 0, 10, 3),
        }];
        let mut scroll = ScrollManager::new();
        fm.dispatch_mouse(
            MouseEvent { x: 1, y: 1, kind: MouseEventKind::Down(MouseButton::Left), modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        fm.dispatch_mouse(
            MouseEvent { x: 50, y: 20, kind: MouseEventKind::Up(MouseButton::Left), modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        assert_eq!(clicked.borrow().0.get(), 0);
    }

    #[test]
    fn wheel_bubbles_past_exhausted_scrollable() {
        let mut scroll = ScrollManager::new();
        scroll.remeasure("inner", 10, 10, 10, 10); // can't scroll, content == viewport
        scroll.remeasure("outer", 10, 100, 10, 10);
        let hits = vec![
            HitEntry { id: "outer".to_string(), rect: Rect::new(0, 0, 10, 10) },
            HitEntry { id: "inner".to_string(), rect: Rect::new(0, 0, 10, 10) },
        ];
        let mut fm = FocusManager::new();
        let result = fm.dispatch_mouse(
            MouseEvent { x: 1, y: 1, kind: MouseEventKind::ScrollDown, modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        assert_eq!(result, EventResult::Consumed);
        assert_eq!(scroll.get("outer").unwrap().offset_y, 3);
        assert_eq!(scroll.get("inner").unwrap().offset_y, 0);
    }

    #[test]
    fn key_capturer_swallows_key_before_ancestor_keybind() {
        use crate::build::BuildContext;
        use crate::event::KeyCode;
        use crate::widget::{KeyCapturer, KeybindProvider};

        struct CapturesChars;
        impl KeyCapturer for CapturesChars {
            fn captures(&self, event: &KeyEvent) -> bool {
                matches!(event.code, KeyCode::Char(_))
            }
        }
        struct QuitBinding;
        impl KeybindProvider for QuitBinding {
            fn keybinds(&self) -> Vec<Keybind> {
                vec![Keybind::new("q", "quit"), Keybind::new("escape", "close")]
            }
        }

        let mut caps = HashMap::new();
        caps.insert(
            "input".to_string(),
            Capabilities {
                key_capturer: Some(std::rc::Rc::new(CapturesChars)),
                ..Default::default()
            },
        );
        caps.insert(
            "ancestor".to_string(),
            Capabilities {
                keybind_provider: Some(std::rc::Rc::new(QuitBinding)),
                ..Default::default()
            },
        );

        let _ = BuildContext::root(); // documents that entries normally come from build()
        let mut fm = FocusManager::new();
        fm.sync(
            vec![FocusEntry {
                id: "input".to_string(),
                ancestor_chain: vec!["ancestor".to_string()],
                trap_scope_id: None,
                modal_scope_id: None,
            }],
            caps,
        );

        let outcome = fm.dispatch_key(&KeyEvent::plain(KeyCode::Char('q')), &[]);
        assert_eq!(outcome, DispatchOutcome::Handled);

        let outcome = fm.dispatch_key(&KeyEvent::plain(KeyCode::Escape), &[]);
        assert_eq!(
            outcome,
            DispatchOutcome::Keybind { widget_id: "ancestor".to_string(), action: "close".to_string() }
        );
    }

    #[test]
    fn active_keybinds_excludes_hidden_and_captured() {
        use crate::widget::{KeyCapturer, KeybindProvider};

        struct CapturesQ;
        impl KeyCapturer for CapturesQ {
            fn captures(&self, event: &KeyEvent) -> bool {
                event.match_string() == "q"
            }
        }
        struct Binds;
        impl KeybindProvider for Binds {
            fn keybinds(&self) -> Vec<Keybind> {
                vec![Keybind::new("q", "quit"), Keybind::hidden("control+s", "save")]
            }
        }

        let mut caps = HashMap::new();
        caps.insert(
            "w".to_string(),
            Capabilities {
                key_capturer: Some(std::rc::Rc::new(CapturesQ)),
                keybind_provider: Some(std::rc::Rc::new(Binds)),
                ..Default::default()
            },
        );
        let mut fm = FocusManager::new();
        fm.sync(vec![entry("w", None, None)], caps);
        fm.focus_by_id("w");
        let hints = fm.active_keybinds(&[]);
        assert!(hints.is_empty());
    }

    #[test]
    fn hover_enter_and_leave_fire_on_transition() {
        use crate::widget::Hoverable;
        struct Hover(std::cell::Cell<i32>);
        impl Hoverable for Hover {
            fn on_hover_enter(&mut self) {
                self.0.set(self.0.get() + 1);
            }
            fn on_hover_leave(&mut self) {
                self.0.set(self.0.get() - 1);
            }
        }
        let a = std::rc::Rc::new(std::cell::RefCell::new(Hover(std::cell::Cell::new(0))));
        let mut caps = HashMap::new();
        caps.insert(
            "a".to_string(),
            Capabilities { hoverable: Some(a.clone()), ..Default::default() },
        );
        let mut fm = FocusManager::new();
        fm.sync(Vec::new(), caps);
        let hits = vec![HitEntry { id: "a".to_string(), rect: Rect::new(0, 0, 5, 5) }];
        let mut scroll = ScrollManager::new();
        fm.dispatch_mouse(
            MouseEvent { x: 1, y: 1, kind: MouseEventKind::Move, modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        assert_eq!(a.borrow().0.get(), 1);
        fm.dispatch_mouse(
            MouseEvent { x: 50, y: 1, kind: MouseEventKind::Move, modifiers: Default::default() },
            &hits,
            &mut scroll,
        );
        assert_eq!(a.borrow().0.get(), 0);
    }

    #[test]
    fn double_click_increments_count() {
        use crate::widget::Clickable;
        struct Last(std::cell::Cell<u8>);
        impl Clickable for Last {
            fn on_click(&mut self, n: u8) {
                self.0.set(n);
            }
        }
        let w = std::rc::Rc::new(std::cell::RefCell::new(Last(std::cell::Cell::new(0))));
        let mut caps = HashMap::new();
        caps.insert("b".to_string(), Capabilities { clickable: Some(w.clone()), ..Default::default() });
        let mut fm = FocusManager::new();
        fm.sync(Vec::new(), caps);
        let hits = vec![HitEntry { id: "b".to_string(), rect: Rect::new(0, 0, 5, 5) }];
        let mut scroll = ScrollManager::new();
        let down = MouseEvent { x: 1, y: 1, kind: MouseEventKind::Down(MouseButton::Left), modifiers: Default::default() };
        let up = MouseEvent { x: 1, y: 1, kind: MouseEventKind::Up(MouseButton::Left), modifiers: Default::default() };
        fm.dispatch_mouse(down, &hits, &mut scroll);
        fm.dispatch_mouse(up, &hits, &mut scroll);
        fm.dispatch_mouse(down, &hits, &mut scroll);
        fm.dispatch_mouse(up, &hits, &mut scroll);
        assert_eq!(w.borrow().0.get(), 2);
    }

    #[test]
    fn unrelated_type_still_compiles_with_size_import() {
        let _ = Size::new(1, 1);
    }
}
