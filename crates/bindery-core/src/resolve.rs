#![forbid(unsafe_code)]

//! The binding resolver.
//!
//! [`resolve_binding`] turns one invocation's inputs into a
//! `(current value, setter)` pair:
//!
//! ```
//! use bindery_core::{BindingCell, resolve_binding};
//!
//! let cell = BindingCell::new();
//!
//! // Render 1: uncontrolled, seeded from the default.
//! let (value, set) = resolve_binding(&cell, Some("D"), None, None, Some("fb"));
//! assert_eq!(value, Some("D"));
//! set.set("E");
//!
//! // Render 2: same inputs, the internal cell wins over the default.
//! let (value, _) = resolve_binding(&cell, Some("D"), None, None, Some("fb"));
//! assert_eq!(value, Some("E"));
//! ```
//!
//! # Resolution
//!
//! 1. The binding is controlled iff `value` is present under the cell's
//!    [`Presence`](crate::Presence) predicate.
//! 2. On the first invocation only, the internal cell is seeded from the
//!    first present of `value`, `default_value` and `fallback_value`.
//! 3. The current value is the controlled value when controlled, otherwise
//!    the internal cell. It is also stored in the reference cell.
//! 4. A change of mode since the previous invocation is reported to the
//!    cell's sink and changes nothing else.
//!
//! # Invariants
//!
//! 1. A present controlled value always wins.
//! 2. Later invocations never re-seed the internal cell.
//! 3. Each setter call invokes `on_change` exactly once, with the evaluated
//!    value and never the updater itself.
//! 4. A setter obtained while controlled never writes the internal cell. It
//!    does write the reference cell, so updaters in the same pass chain.
//! 5. A setter obtained while uncontrolled writes both cells, so the next
//!    invocation sees the new value.
//!
//! # Typed overloads
//!
//! [`resolve_binding`] may return `None`. The wrappers
//! [`resolve_with_fallback`], [`resolve_with_default`] and
//! [`resolve_controlled`] take a guaranteed value and return a plain `T`
//! together with a [`FilledSetter`] whose updaters receive `&T`.

use std::fmt;
use std::rc::Rc;

use crate::action::SetAction;
use crate::cell::BindingCell;
use crate::diagnostics::{BindingMode, ModeSwitch};

/// Callback notified with every value passed through a setter.
pub type ChangeHandler<T> = Rc<dyn Fn(&T)>;

/// Wrap a closure as a [`ChangeHandler`].
pub fn change_handler<T>(f: impl Fn(&T) + 'static) -> ChangeHandler<T> {
    Rc::new(f)
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolve one invocation of a binding.
///
/// Call once per render with the same `cell`. The result may be `None` when
/// none of `value`, `default_value` and `fallback_value` was present on the
/// first invocation.
pub fn resolve_binding<T: Clone + 'static>(
    cell: &BindingCell<T>,
    default_value: Option<T>,
    value: Option<T>,
    on_change: Option<ChangeHandler<T>>,
    fallback_value: Option<T>,
) -> (Option<T>, Setter<T>) {
    let settings = Rc::clone(&cell.settings);
    let presence = &settings.presence;
    let config = &settings.config;

    let controlled_value = presence.filter(value);
    let controlled = controlled_value.is_some();

    // Presence predicates are user code and may read this cell, so seeding
    // candidates are filtered before the state is borrowed mutably.
    let seeding = if cell.is_seeded() {
        None
    } else {
        Some(
            controlled_value
                .clone()
                .or_else(|| presence.filter(default_value))
                .or_else(|| presence.filter(fallback_value)),
        )
    };

    let (current, switch) = {
        let mut state = cell.state.borrow_mut();
        state.invocations += 1;
        let invocation = state.invocations;

        if let Some(initial) = seeding {
            if config.trace_setter_calls {
                tracing::trace!(
                    target: "bindery::binding",
                    label = config.label.as_deref().unwrap_or("-"),
                    controlled,
                    seeded_present = initial.is_some(),
                    "binding seeded"
                );
            }
            state.internal = initial;
            state.seeded = true;
        }

        let current = if controlled {
            controlled_value
        } else {
            state.internal.clone()
        };
        state.current = current.clone();

        let switch = match state.controlled {
            Some(previous) if previous != controlled => Some(ModeSwitch {
                from: BindingMode::from_controlled(previous),
                to: BindingMode::from_controlled(controlled),
                invocation,
                label: config.label.clone(),
            }),
            _ => None,
        };
        state.controlled = Some(controlled);
        (current, switch)
    };

    // The state borrow is released before the sink runs, so a sink may
    // inspect the cell.
    if let Some(event) = switch {
        if config.reports_mode_switches() {
            settings.sink.mode_switched(&event);
        }
    }

    let setter = Setter {
        cell: cell.clone(),
        controlled,
        on_change,
    };
    (current, setter)
}

/// Resolve a binding that can never be absent thanks to `fallback_value`.
///
/// Absence is possible only through misuse, for example a presence predicate
/// that rejects the fallback itself. Debug builds assert on it. Release
/// builds substitute the fallback.
pub fn resolve_with_fallback<T: Clone + 'static>(
    cell: &BindingCell<T>,
    default_value: Option<T>,
    value: Option<T>,
    on_change: Option<ChangeHandler<T>>,
    fallback_value: T,
) -> (T, FilledSetter<T>) {
    let (current, setter) = resolve_binding(
        cell,
        default_value,
        value,
        on_change,
        Some(fallback_value.clone()),
    );
    fill(current, setter, fallback_value)
}

/// Resolve a binding whose default is statically known to be present.
pub fn resolve_with_default<T: Clone + 'static>(
    cell: &BindingCell<T>,
    default_value: T,
    value: Option<T>,
    on_change: Option<ChangeHandler<T>>,
) -> (T, FilledSetter<T>) {
    let (current, setter) =
        resolve_binding(cell, Some(default_value.clone()), value, on_change, None);
    fill(current, setter, default_value)
}

/// Resolve a binding whose controlled value is statically known to be present.
pub fn resolve_controlled<T: Clone + 'static>(
    cell: &BindingCell<T>,
    default_value: Option<T>,
    value: T,
    on_change: Option<ChangeHandler<T>>,
) -> (T, FilledSetter<T>) {
    let (current, setter) =
        resolve_binding(cell, default_value, Some(value.clone()), on_change, None);
    fill(current, setter, value)
}

fn fill<T: Clone>(current: Option<T>, setter: Setter<T>, guarantee: T) -> (T, FilledSetter<T>) {
    debug_assert!(
        current.is_some(),
        "non-absent binding resolved to an absent value; check the presence predicate"
    );
    let current = current.unwrap_or_else(|| guarantee.clone());
    (
        current,
        FilledSetter {
            inner: setter,
            guarantee,
        },
    )
}

// ---------------------------------------------------------------------------
// Setter
// ---------------------------------------------------------------------------

/// Setter returned by [`resolve_binding`].
///
/// It captures the mode of the invocation that produced it, the same way a
/// render callback closes over that render's props.
pub struct Setter<T> {
    cell: BindingCell<T>,
    controlled: bool,
    on_change: Option<ChangeHandler<T>>,
}

impl<T: Clone + 'static> Setter<T> {
    /// Replace the value.
    pub fn set(&self, value: T) {
        self.commit(value);
    }

    /// Compute the replacement from the latest known value.
    ///
    /// The previous value is read from the reference cell, so several
    /// updaters within one pass chain correctly.
    pub fn update(&self, f: impl FnOnce(Option<&T>) -> T) {
        let previous = self.cell.current_value();
        self.commit(f(previous.as_ref()));
    }

    /// Apply either form of [`SetAction`].
    pub fn apply(&self, action: SetAction<T>) {
        let previous = self.cell.current_value();
        self.commit(action.evaluate(previous.as_ref()));
    }

    /// Owned callback that forwards to [`Setter::set`], suitable as another
    /// binding's `on_change`.
    #[must_use]
    pub fn to_change_handler(&self) -> ChangeHandler<T> {
        let setter = self.clone();
        Rc::new(move |value: &T| setter.set(value.clone()))
    }

    fn commit(&self, value: T) {
        {
            let mut state = self.cell.state.borrow_mut();
            state.current = Some(value.clone());
            if !self.controlled {
                state.internal = Some(value.clone());
            }
        }
        let config = self.cell.config();
        if config.trace_setter_calls {
            tracing::trace!(
                target: "bindery::binding",
                label = config.label.as_deref().unwrap_or("-"),
                controlled = self.controlled,
                notified = self.on_change.is_some(),
                "binding set"
            );
        }
        if let Some(on_change) = &self.on_change {
            on_change(&value);
        }
    }
}

impl<T> Setter<T> {
    /// Whether this setter came from a controlled invocation.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// The cell this setter writes to.
    #[must_use]
    pub fn cell(&self) -> &BindingCell<T> {
        &self.cell
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            controlled: self.controlled,
            on_change: self.on_change.clone(),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("controlled", &self.controlled)
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

/// Setter for the non-absent overloads. Updaters receive `&T`.
pub struct FilledSetter<T> {
    inner: Setter<T>,
    guarantee: T,
}

impl<T: Clone + 'static> FilledSetter<T> {
    /// Replace the value.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }

    /// Compute the replacement from the latest known value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.inner.update(|previous| {
            debug_assert!(previous.is_some(), "non-absent binding lost its value");
            match previous {
                Some(previous) => f(previous),
                None => f(&self.guarantee),
            }
        });
    }

    /// Apply either form of [`SetAction`].
    pub fn apply(&self, action: SetAction<T>) {
        self.inner.apply(action);
    }

    /// See [`Setter::to_change_handler`].
    #[must_use]
    pub fn to_change_handler(&self) -> ChangeHandler<T> {
        self.inner.to_change_handler()
    }
}

impl<T> FilledSetter<T> {
    /// Whether this setter came from a controlled invocation.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.inner.controlled
    }

    /// The absent-allowing setter underneath.
    #[must_use]
    pub fn as_setter(&self) -> &Setter<T> {
        &self.inner
    }
}

impl<T: Clone> Clone for FilledSetter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            guarantee: self.guarantee.clone(),
        }
    }
}

impl<T> fmt::Debug for FilledSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilledSetter")
            .field("controlled", &self.inner.controlled)
            .field("has_on_change", &self.inner.on_change.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
