#![forbid(unsafe_code)]

//! Controlled/uncontrolled value bindings for component frameworks.
//!
//! A component that exposes `default_value`, `value` and `on_change` props must
//! decide, on every render, which of them is authoritative. This crate makes
//! that decision:
//!
//! - [`resolve_binding`]: reconciles the props with a per-instance
//!   [`BindingCell`] and returns the current value plus a [`Setter`].
//! - [`resolve_with_fallback`], [`resolve_with_default`],
//!   [`resolve_controlled`]: typed overloads that never return an absent value.
//! - [`SetAction`]: literal or updater argument for a setter.
//! - [`Presence`]: which supplied values count as present.
//! - [`DiagnosticSink`]: where mode-switch warnings go.
//! - [`BindingConfig`]: diagnostic settings, loadable from TOML/JSON with the
//!   `policy-config` feature.
//!
//! # Example
//!
//! ```
//! use bindery_core::{BindingCell, resolve_with_fallback};
//!
//! let cell = BindingCell::new();
//! let (count, set) = resolve_with_fallback(&cell, None, None, None, 0);
//! assert_eq!(count, 0);
//!
//! for _ in 0..10 {
//!     set.update(|x| x + 1);
//! }
//!
//! let (count, _) = resolve_with_fallback(&cell, None, None, None, 0);
//! assert_eq!(count, 10);
//! ```
//!
//! # Threading
//!
//! Everything here is single-threaded (`Rc`-based). A cell belongs to one
//! component instance and is re-used across that instance's renders.

pub mod action;
pub mod cell;
pub mod config;
pub mod diagnostics;
pub mod presence;
pub mod resolve;

pub use action::SetAction;
pub use cell::BindingCell;
pub use config::{BindingConfig, ConfigError, MODE_SWITCH_ENV, ModeSwitchPolicy};
pub use diagnostics::{
    BindingMode, DiagnosticSink, ModeSwitch, NullSink, RecordingSink, TracingSink,
};
pub use presence::{IsEmpty, Presence};
pub use resolve::{
    ChangeHandler, FilledSetter, Setter, change_handler, resolve_binding, resolve_controlled,
    resolve_with_default, resolve_with_fallback,
};
