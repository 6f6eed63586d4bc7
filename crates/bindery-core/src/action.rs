#![forbid(unsafe_code)]

//! Setter arguments: a literal replacement or an updater over the previous value.

use std::fmt;

/// Argument accepted by [`Setter::apply`](crate::Setter::apply).
///
/// The two forms are distinct variants rather than something detected at run
/// time. An `Update` receives the most recently known value of the binding.
/// That value is `None` only for an absent-allowing binding that was never
/// given a value.
pub enum SetAction<T> {
    /// Replace the value outright.
    Value(T),
    /// Compute the replacement from the previous value.
    Update(Box<dyn FnOnce(Option<&T>) -> T>),
}

impl<T> SetAction<T> {
    /// Literal replacement.
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Whether this action is the updater form.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }

    /// Resolve the action against `previous`.
    pub fn evaluate(self, previous: Option<&T>) -> T {
        match self {
            Self::Value(value) => value,
            Self::Update(f) => f(previous),
        }
    }
}

impl<T: 'static> SetAction<T> {
    /// Updater replacement.
    pub fn update(f: impl FnOnce(Option<&T>) -> T + 'static) -> Self {
        Self::Update(Box::new(f))
    }
}

impl<T> From<T> for SetAction<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Update(_) => f.write_str("Update(..)"),
        }
    }
}
