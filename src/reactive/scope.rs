//! Reactive scope for automatic cleanup of effects.
//!
//! A [`ReactiveScope`] owns effects and cleanup callbacks. When the
//! scope is dropped, all its effects are disposed and all cleanup
//! callbacks are run. This ties reactive lifetimes to widget lifetimes.

use super::computed::Computed;
use super::effect::Effect;
use super::signal::Signal;

/// A scope that owns reactive effects and cleanup callbacks.
///
/// When a scope is dropped, all effects it owns are disposed and
/// all cleanup callbacks are run in reverse registration order.
/// Child scopes are dropped before their parent's cleanups run.
///
/// # Examples
///
/// ```ignore
/// let mut scope = ReactiveScope::new();
/// let count = Signal::new(0);
///
/// scope.create_effect({
///     let count = count.clone();
///     move || println!("count = {}", count.get())
/// });
///
/// // Effect runs on creation and when count changes.
/// count.set(1);
///
/// drop(scope); // Effect is disposed, cleanup runs.
/// count.set(2); // Effect does NOT run.
/// ```
pub struct ReactiveScope {
    /// Owned effects that will be disposed on drop.
    effects: Vec<Effect>,
    /// Nested child scopes (dropped before parent cleanups).
    children: Vec<ReactiveScope>,
    /// Cleanup callbacks run on drop (in reverse order).
    cleanups: Vec<Box<dyn FnOnce()>>,
}

impl ReactiveScope {
    /// Create a new empty reactive scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            children: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    /// Create a signal. Convenience method — signals are not owned
    /// by the scope since they are shared handles.
    pub fn create_signal<T>(&self, value: T) -> Signal<T> {
        Signal::new(value)
    }

    /// Create a computed value. Convenience method — computed values
    /// are shared handles and not owned by the scope.
    pub fn create_computed<T: Clone + 'static>(&self, f: impl Fn() -> T + 'static) -> Computed<T> {
        Computed::new(f)
    }

    /// Create an effect owned by this scope.
    ///
    /// The effect will be automatically disposed when the scope is dropped.
    pub fn create_effect(&mut self, f: impl FnMut() + 'static) -> Effect {
        let effect = Effect::new(f);
        self.effects.push(effect.clone());
        effect
    }

    /// Register a cleanup callback to run when this scope is dropped.
    ///
    /// Callbacks are run in reverse registration order.
    pub fn on_cleanup(&mut self, f: impl FnOnce() + 'static) {
        self.cleanups.push(Box::new(f));
    }

    /// Create a nested child scope.
    ///
    /// The child scope will be dropped before the parent's cleanups run.
    pub fn child(&mut self) -> &mut ReactiveScope {
        self.children.push(ReactiveScope::new());
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Get the number of effects owned by this scope.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Get the number of child scopes.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for ReactiveScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReactiveScope {
    fn drop(&mut self) {
        // Drop children first (nested scopes).
        self.children.clear();

        // Dispose all effects.
        for effect in &self.effects {
            effect.dispose();
        }

        // Run cleanups in reverse order.
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
    }
}
