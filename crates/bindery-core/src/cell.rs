#![forbid(unsafe_code)]

//! Per-instance storage that outlives a single resolver invocation.
//!
//! A [`BindingCell`] belongs to exactly one binding call site. The
//! surrounding framework allocates it once (see `bindery-runtime`) and passes
//! it to the resolver on every render. The cell holds:
//!
//! - the **internal cell**: the uncontrolled value, seeded once;
//! - the **reference cell**: the latest known value, which updaters read;
//! - the controlled flag seen on the previous invocation;
//! - the settings: presence predicate, diagnostic sink and config.
//!
//! Clones share state. The cell is `!Send` and `!Sync` because of `Rc`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::BindingConfig;
use crate::diagnostics::{BindingMode, DiagnosticSink, TracingSink};
use crate::presence::Presence;

pub(crate) struct CellState<T> {
    pub(crate) internal: Option<T>,
    pub(crate) seeded: bool,
    pub(crate) current: Option<T>,
    pub(crate) controlled: Option<bool>,
    pub(crate) invocations: u64,
}

impl<T> Default for CellState<T> {
    fn default() -> Self {
        Self {
            internal: None,
            seeded: false,
            current: None,
            controlled: None,
            invocations: 0,
        }
    }
}

pub(crate) struct CellSettings<T> {
    pub(crate) presence: Presence<T>,
    pub(crate) sink: Rc<dyn DiagnosticSink>,
    pub(crate) config: BindingConfig,
}

impl<T> Clone for CellSettings<T> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            sink: Rc::clone(&self.sink),
            config: self.config.clone(),
        }
    }
}

/// Storage handle for one binding call site.
pub struct BindingCell<T> {
    pub(crate) state: Rc<RefCell<CellState<T>>>,
    pub(crate) settings: Rc<CellSettings<T>>,
}

impl<T> BindingCell<T> {
    /// Fresh, unseeded cell with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CellState::default())),
            settings: Rc::new(CellSettings {
                presence: Presence::Defined,
                sink: Rc::new(TracingSink),
                config: BindingConfig::default(),
            }),
        }
    }

    /// Replace the presence predicate.
    #[must_use]
    pub fn with_presence(mut self, presence: Presence<T>) -> Self {
        self.settings_mut().presence = presence;
        self
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.settings_mut().sink = sink;
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.settings_mut().config = config;
        self
    }

    // Settings are copied on write so clones taken before a builder call keep
    // their own settings; state is always shared.
    fn settings_mut(&mut self) -> &mut CellSettings<T> {
        Rc::make_mut(&mut self.settings)
    }

    /// The configured presence predicate.
    #[must_use]
    pub fn presence(&self) -> &Presence<T> {
        &self.settings.presence
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &BindingConfig {
        &self.settings.config
    }

    /// Whether the internal cell has been seeded by a first invocation.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.state.borrow().seeded
    }

    /// Number of resolver invocations so far.
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.state.borrow().invocations
    }

    /// Mode observed on the latest invocation, `None` before the first.
    #[must_use]
    pub fn mode(&self) -> Option<BindingMode> {
        self.state.borrow().controlled.map(BindingMode::from_controlled)
    }

    /// Inspect the internal (uncontrolled) value.
    pub fn with_internal<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.state.borrow().internal.as_ref())
    }

    /// Inspect the latest known value (what the next updater will see).
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.state.borrow().current.as_ref())
    }

    /// Whether two handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T: Clone> BindingCell<T> {
    /// Clone of the internal (uncontrolled) value.
    #[must_use]
    pub fn internal_value(&self) -> Option<T> {
        self.with_internal(|v| v.cloned())
    }

    /// Clone of the latest known value.
    #[must_use]
    pub fn current_value(&self) -> Option<T> {
        self.with_current(|v| v.cloned())
    }
}

impl<T> Default for BindingCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BindingCell<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            settings: Rc::clone(&self.settings),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BindingCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BindingCell")
            .field("internal", &state.internal)
            .field("current", &state.current)
            .field("mode", &state.controlled.map(BindingMode::from_controlled))
            .field("invocations", &state.invocations)
            .field("presence", &self.settings.presence)
            .finish()
    }
}
