#![forbid(unsafe_code)]

//! Mode-switch diagnostics.
//!
//! A binding that is controlled on one invocation and uncontrolled on a later
//! one (or the reverse) almost always means the caller mixed both patterns.
//! The resolver reports the change through a [`DiagnosticSink`] and resolves
//! as usual. Nothing is raised.
//!
//! Sinks are injected per cell:
//!
//! - [`TracingSink`] (default) emits a `tracing` warning.
//! - [`NullSink`] discards events.
//! - [`RecordingSink`] keeps events in memory for assertions.
//! - Any `Fn(&ModeSwitch)` closure is a sink.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Whether a binding mirrors an external value or owns its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingMode {
    /// The caller supplied a present value; the binding mirrors it.
    Controlled,
    /// The binding's internal cell is authoritative.
    Uncontrolled,
}

impl BindingMode {
    /// Mode for a given controlled flag.
    #[must_use]
    pub const fn from_controlled(controlled: bool) -> Self {
        if controlled {
            Self::Controlled
        } else {
            Self::Uncontrolled
        }
    }

    /// Whether this is [`BindingMode::Controlled`].
    #[must_use]
    pub const fn is_controlled(self) -> bool {
        matches!(self, Self::Controlled)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Controlled => "controlled",
            Self::Uncontrolled => "uncontrolled",
        }
    }
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binding changed mode between two invocations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeSwitch {
    /// Mode observed on the previous invocation.
    pub from: BindingMode,
    /// Mode observed on this invocation.
    pub to: BindingMode,
    /// 1-based invocation number at which the switch was seen.
    pub invocation: u64,
    /// Label from the cell's [`BindingConfig`](crate::BindingConfig), if any.
    pub label: Option<String>,
}

impl fmt::Display for ModeSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A component changed from {} to {}.", self.from, self.to)
    }
}

/// Receiver for advisory binding diagnostics.
pub trait DiagnosticSink {
    /// Called once per detected mode switch.
    fn mode_switched(&self, event: &ModeSwitch);
}

impl<F: Fn(&ModeSwitch)> DiagnosticSink for F {
    fn mode_switched(&self, event: &ModeSwitch) {
        self(event);
    }
}

/// Logs mode switches as `tracing` warnings on target `bindery::binding`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn mode_switched(&self, event: &ModeSwitch) {
        tracing::warn!(
            target: "bindery::binding",
            from = event.from.as_str(),
            to = event.to.as_str(),
            invocation = event.invocation,
            label = event.label.as_deref().unwrap_or("-"),
            "{event}"
        );
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn mode_switched(&self, _event: &ModeSwitch) {}
}

/// Collects events in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<ModeSwitch>>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<ModeSwitch> {
        self.events.borrow().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn mode_switched(&self, event: &ModeSwitch) {
        self.events.borrow_mut().push(event.clone());
    }
}
