#![forbid(unsafe_code)]

//! Component-local storage for binding cells.
//!
//! The arena owns the cross-render storage the resolver needs. Each component
//! instance, identified by a [`SlotKey`], owns an ordered list of hook slots.
//! Every render allocates slots in call order, so the n-th `use_binding*` call
//! of a component always gets the same [`BindingCell`].
//!
//! # Usage
//!
//! ```
//! use bindery_runtime::{BindingArena, SlotKey};
//!
//! let mut arena = BindingArena::new();
//! let key = SlotKey::new("Counter", "main");
//!
//! // Render 1
//! let mut pass = arena.begin_pass();
//! let (count, set) = pass
//!     .scope(key.clone())
//!     .use_binding_with_fallback(None, None, None, 0)
//!     .unwrap();
//! assert_eq!(count, 0);
//! set.update(|x| x + 1);
//! pass.finish();
//!
//! // Render 2: same slot, same cell.
//! let mut pass = arena.begin_pass();
//! let (count, _) = pass
//!     .scope(key)
//!     .use_binding_with_fallback(None, None, None, 0)
//!     .unwrap();
//! assert_eq!(count, 1);
//! pass.finish();
//! ```
//!
//! # Invariants
//!
//! 1. A slot's cell is allocated on first use and reused on later passes.
//! 2. Components not rendered during a pass are unmounted by
//!    [`RenderPass::finish`]; their cells are dropped.
//! 3. A slot requested with a different value type than it holds is an
//!    [`ArenaError::TypeMismatch`], never a silent reset.
//! 4. Unmount releases cells in slot order; after unmount the component is
//!    seeded afresh on its next render.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use bindery_core::{
    BindingCell, BindingConfig, ChangeHandler, DiagnosticSink, FilledSetter, Setter, TracingSink,
    resolve_binding, resolve_controlled, resolve_with_default, resolve_with_fallback,
};

use crate::error::ArenaError;
use crate::slot_key::SlotKey;

#[derive(Default)]
struct ComponentSlots {
    cells: Vec<Box<dyn Any>>,
    last_pass: u64,
}

// ---------------------------------------------------------------------------
// BindingArena
// ---------------------------------------------------------------------------

/// Owner of every component instance's binding cells.
pub struct BindingArena {
    components: AHashMap<SlotKey, ComponentSlots>,
    passes: u64,
    config: BindingConfig,
    sink: Rc<dyn DiagnosticSink>,
}

impl BindingArena {
    /// Empty arena with default config and the tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: AHashMap::default(),
            passes: 0,
            config: BindingConfig::default(),
            sink: Rc::new(TracingSink),
        }
    }

    /// Config applied to newly allocated cells.
    ///
    /// Cells without a label get `"<slot key>#<slot>"`.
    #[must_use]
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Diagnostic sink shared by newly allocated cells.
    #[must_use]
    pub fn with_sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a render pass.
    pub fn begin_pass(&mut self) -> RenderPass<'_> {
        self.passes += 1;
        let pass = self.passes;
        let span = tracing::debug_span!(target: "bindery::arena", "binding_pass", pass).entered();
        RenderPass {
            arena: self,
            pass,
            _span: span,
        }
    }

    /// Number of passes started so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Number of mounted component instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether `key` currently owns slots.
    #[must_use]
    pub fn is_mounted(&self, key: &SlotKey) -> bool {
        self.components.contains_key(key)
    }

    /// Number of hook slots allocated for `key` (0 when unmounted).
    #[must_use]
    pub fn slot_count(&self, key: &SlotKey) -> usize {
        self.components.get(key).map_or(0, |c| c.cells.len())
    }

    /// Drop every slot owned by `key`. Returns whether it was mounted.
    pub fn unmount(&mut self, key: &SlotKey) -> bool {
        let removed = self.components.remove(key).is_some();
        if removed {
            tracing::debug!(target: "bindery::arena", key = %key, "component unmounted");
        }
        removed
    }

    /// Unmount everything.
    pub fn clear(&mut self) {
        self.components.clear();
    }
}

impl Default for BindingArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingArena")
            .field("mounted", &self.components.len())
            .field("passes", &self.passes)
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RenderPass
// ---------------------------------------------------------------------------

/// One render of the component tree.
#[must_use = "call finish() to unmount components that were not rendered"]
pub struct RenderPass<'a> {
    arena: &'a mut BindingArena,
    pass: u64,
    _span: tracing::span::EnteredSpan,
}

impl RenderPass<'_> {
    /// 1-based pass number.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Begin rendering the component identified by `key`.
    ///
    /// Hook slots restart at index 0 each time a scope is opened.
    pub fn scope(&mut self, key: SlotKey) -> ComponentScope<'_> {
        let arena = &mut *self.arena;
        let pass = self.pass;
        let slots = arena.components.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(target: "bindery::arena", key = %key, "component mounted");
            ComponentSlots::default()
        });
        slots.last_pass = pass;
        ComponentScope {
            key,
            slots,
            cursor: 0,
            config: &arena.config,
            sink: &arena.sink,
        }
    }

    /// End the pass, unmounting components that were not rendered in it.
    ///
    /// Returns the unmounted keys in sorted order.
    pub fn finish(self) -> Vec<SlotKey> {
        let pass = self.pass;
        let mut unmounted = Vec::new();
        self.arena.components.retain(|key, slots| {
            let keep = slots.last_pass == pass;
            if !keep {
                unmounted.push(key.clone());
            }
            keep
        });
        unmounted.sort();
        for key in &unmounted {
            tracing::debug!(target: "bindery::arena", key = %key, "component unmounted");
        }
        unmounted
    }
}

impl fmt::Debug for RenderPass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPass").field("pass", &self.pass).finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentScope
// ---------------------------------------------------------------------------

/// Hook context for one component during one pass.
pub struct ComponentScope<'a> {
    key: SlotKey,
    slots: &'a mut ComponentSlots,
    cursor: usize,
    config: &'a BindingConfig,
    sink: &'a Rc<dyn DiagnosticSink>,
}

impl ComponentScope<'_> {
    /// Key of the component being rendered.
    #[must_use]
    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    /// Number of hook slots used so far in this render.
    #[must_use]
    pub fn slots_used(&self) -> usize {
        self.cursor
    }

    /// The next positional cell, allocated with arena defaults on first use.
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] if the slot holds a cell of another type.
    pub fn cell<T: 'static>(&mut self) -> Result<BindingCell<T>, ArenaError> {
        self.cell_with(|cell| cell)
    }

    /// Like [`cell`](Self::cell), but `configure` customizes a newly
    /// allocated cell (e.g. its presence predicate). It is not called when the
    /// slot already exists.
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] if the slot holds a cell of another type.
    pub fn cell_with<T: 'static>(
        &mut self,
        configure: impl FnOnce(BindingCell<T>) -> BindingCell<T>,
    ) -> Result<BindingCell<T>, ArenaError> {
        let slot = self.cursor;
        self.cursor += 1;

        if let Some(existing) = self.slots.cells.get(slot) {
            return existing
                .downcast_ref::<BindingCell<T>>()
                .cloned()
                .ok_or_else(|| ArenaError::TypeMismatch {
                    key: self.key.canonical(),
                    slot,
                    expected: type_name::<T>(),
                });
        }

        let config = match self.config.label {
            Some(_) => self.config.clone(),
            None => self.config.clone().with_label(format!("{}#{slot}", self.key)),
        };
        let cell = configure(
            BindingCell::new()
                .with_config(config)
                .with_sink(Rc::clone(self.sink)),
        );
        self.slots.cells.push(Box::new(cell.clone()));
        Ok(cell)
    }

    /// Positional [`resolve_binding`].
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] on hook-order changes.
    pub fn use_binding<T: Clone + 'static>(
        &mut self,
        default_value: Option<T>,
        value: Option<T>,
        on_change: Option<ChangeHandler<T>>,
        fallback_value: Option<T>,
    ) -> Result<(Option<T>, Setter<T>), ArenaError> {
        let cell = self.cell::<T>()?;
        Ok(resolve_binding(
            &cell,
            default_value,
            value,
            on_change,
            fallback_value,
        ))
    }

    /// Positional [`resolve_with_fallback`].
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] on hook-order changes.
    pub fn use_binding_with_fallback<T: Clone + 'static>(
        &mut self,
        default_value: Option<T>,
        value: Option<T>,
        on_change: Option<ChangeHandler<T>>,
        fallback_value: T,
    ) -> Result<(T, FilledSetter<T>), ArenaError> {
        let cell = self.cell::<T>()?;
        Ok(resolve_with_fallback(
            &cell,
            default_value,
            value,
            on_change,
            fallback_value,
        ))
    }

    /// Positional [`resolve_with_default`].
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] on hook-order changes.
    pub fn use_binding_with_default<T: Clone + 'static>(
        &mut self,
        default_value: T,
        value: Option<T>,
        on_change: Option<ChangeHandler<T>>,
    ) -> Result<(T, FilledSetter<T>), ArenaError> {
        let cell = self.cell::<T>()?;
        Ok(resolve_with_default(&cell, default_value, value, on_change))
    }

    /// Positional [`resolve_controlled`].
    ///
    /// # Errors
    ///
    /// [`ArenaError::TypeMismatch`] on hook-order changes.
    pub fn use_controlled_binding<T: Clone + 'static>(
        &mut self,
        default_value: Option<T>,
        value: T,
        on_change: Option<ChangeHandler<T>>,
    ) -> Result<(T, FilledSetter<T>), ArenaError> {
        let cell = self.cell::<T>()?;
        Ok(resolve_controlled(&cell, default_value, value, on_change))
    }
}

impl Drop for ComponentScope<'_> {
    fn drop(&mut self) {
        if self.cursor < self.slots.cells.len() {
            tracing::warn!(
                target: "bindery::arena",
                key = %self.key,
                used = self.cursor,
                allocated = self.slots.cells.len(),
                "component used fewer hook slots than on a previous render"
            );
        }
    }
}

impl fmt::Debug for ComponentScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentScope")
            .field("key", &self.key)
            .field("cursor", &self.cursor)
            .field("allocated", &self.slots.cells.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{BindingMode, Presence, RecordingSink};

    fn key(id: &str) -> SlotKey {
        SlotKey::new("Test", id.to_string())
    }

    #[test]
    fn new_arena_is_empty() {
        let arena = BindingArena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.passes(), 0);
    }

    #[test]
    fn slots_persist_across_passes() {
        let mut arena = BindingArena::new();
        {
            let mut pass = arena.begin_pass();
            let mut scope = pass.scope(key("a"));
            let (v, set) = scope.use_binding(Some(1), None, None, None).unwrap();
            assert_eq!(v, Some(1));
            set.set(5);
            drop(scope);
            assert!(pass.finish().is_empty());
        }
        let mut pass = arena.begin_pass();
        let (v, _) = pass
            .scope(key("a"))
            .use_binding(Some(1), None, None, None)
            .unwrap();
        assert_eq!(v, Some(5));
        let _ = pass.finish();
        assert_eq!(arena.slot_count(&key("a")), 1);
    }

    #[test]
    fn slots_are_positional() {
        let mut arena = BindingArena::new();
        for _ in 0..2 {
            let mut pass = arena.begin_pass();
            let mut scope = pass.scope(key("a"));
            let first = scope.cell::<i32>().unwrap();
            let second = scope.cell::<i32>().unwrap();
            assert!(!first.ptr_eq(&second));
            assert_eq!(scope.slots_used(), 2);
            drop(scope);
            let _ = pass.finish();
        }
        assert_eq!(arena.slot_count(&key("a")), 2);
    }

    #[test]
    fn same_slot_returns_same_cell() {
        let mut arena = BindingArena::new();
        let first = {
            let mut pass = arena.begin_pass();
            let cell = pass.scope(key("a")).cell::<u8>().unwrap();
            let _ = pass.finish();
            cell
        };
        let mut pass = arena.begin_pass();
        let again = pass.scope(key("a")).cell::<u8>().unwrap();
        let _ = pass.finish();
        assert!(first.ptr_eq(&again));
    }

    #[test]
    fn unrendered_components_unmount() {
        let mut arena = BindingArena::new();
        let mut pass = arena.begin_pass();
        pass.scope(key("a")).cell::<u8>().unwrap();
        pass.scope(key("b")).cell::<u8>().unwrap();
        let _ = pass.finish();
        assert_eq!(arena.len(), 2);

        let mut pass = arena.begin_pass();
        pass.scope(key("b")).cell::<u8>().unwrap();
        let unmounted = pass.finish();
        assert_eq!(unmounted, vec![key("a")]);
        assert!(!arena.is_mounted(&key("a")));
        assert!(arena.is_mounted(&key("b")));
    }

    #[test]
    fn remount_seeds_afresh() {
        let mut arena = BindingArena::new();
        let mut pass = arena.begin_pass();
        let (_, set) = pass
            .scope(key("a"))
            .use_binding_with_default(1, None, None)
            .unwrap();
        set.set(9);
        let _ = pass.finish();

        assert!(arena.unmount(&key("a")));
        assert!(!arena.unmount(&key("a")));

        let mut pass = arena.begin_pass();
        let (v, _) = pass
            .scope(key("a"))
            .use_binding_with_default(1, None, None)
            .unwrap();
        assert_eq!(v, 1);
        let _ = pass.finish();
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let mut arena = BindingArena::new();
        let mut pass = arena.begin_pass();
        pass.scope(key("a")).cell::<u8>().unwrap();
        let err = pass.scope(key("a")).cell::<String>().unwrap_err();
        assert_eq!(
            err,
            ArenaError::TypeMismatch {
                key: "Test::a".into(),
                slot: 0,
                expected: type_name::<String>(),
            }
        );
        let _ = pass.finish();
    }

    #[test]
    fn cells_get_arena_sink_and_label() {
        let sink = RecordingSink::new();
        let mut arena = BindingArena::new().with_sink(Rc::new(sink.clone()));
        for controlled in [false, true] {
            let mut pass = arena.begin_pass();
            let value = controlled.then_some(3);
            pass.scope(key("a"))
                .use_binding(Some(1), value, None, None)
                .unwrap();
            let _ = pass.finish();
        }
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].to, BindingMode::Controlled);
        assert_eq!(events[0].label.as_deref(), Some("Test::a#0"));
    }

    #[test]
    fn explicit_label_is_kept() {
        let mut arena =
            BindingArena::new().with_config(BindingConfig::new().with_label("shared"));
        let mut pass = arena.begin_pass();
        let cell = pass.scope(key("a")).cell::<u8>().unwrap();
        assert_eq!(cell.config().label.as_deref(), Some("shared"));
        let _ = pass.finish();
    }

    #[test]
    fn cell_with_configures_only_on_allocation() {
        let mut arena = BindingArena::new();
        for _ in 0..2 {
            let mut pass = arena.begin_pass();
            let mut calls = 0;
            let cell = pass
                .scope(key("a"))
                .cell_with(|c: BindingCell<String>| {
                    calls += 1;
                    c.with_presence(Presence::non_empty())
                })
                .unwrap();
            assert_eq!(cell.presence().name(), "non-empty");
            assert!(calls <= 1);
            let _ = pass.finish();
        }
    }

    #[test]
    fn controlled_hook() {
        let mut arena = BindingArena::new();
        let mut pass = arena.begin_pass();
        let (v, set) = pass
            .scope(key("a"))
            .use_controlled_binding(None, 4, None)
            .unwrap();
        assert_eq!(v, 4);
        assert!(set.is_controlled());
        let _ = pass.finish();
    }

    #[test]
    fn debug_formats() {
        let mut arena = BindingArena::new();
        let mut pass = arena.begin_pass();
        assert_eq!(format!("{pass:?}"), "RenderPass { pass: 1 }");
        let scope = pass.scope(key("a"));
        assert!(format!("{scope:?}").contains("cursor: 0"));
        drop(scope);
        let _ = pass.finish();
        assert!(format!("{arena:?}").contains("mounted: 1"));
    }
}
