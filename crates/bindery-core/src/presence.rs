#![forbid(unsafe_code)]

//! Presence predicates: deciding whether an optional binding input counts.
//!
//! Every binding input arrives as an `Option<T>`. `None` is always absent.
//! A [`Presence`] predicate decides whether a `Some` value is present too.
//! The default, [`Presence::Defined`], treats every `Some` as present.
//! [`Presence::non_empty`] also treats empty sentinels (empty strings, empty
//! vectors, inner `None`) as absent.

use std::fmt;
use std::rc::Rc;

/// Values that have a natural "empty" sentinel.
pub trait IsEmpty {
    /// Whether this value is the empty sentinel for its type.
    fn is_empty_value(&self) -> bool;
}

impl IsEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for &str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> IsEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

/// Predicate deciding whether a supplied value is present.
pub enum Presence<T> {
    /// Any `Some` is present.
    Defined,
    /// `Some(v)` is present only when `predicate(v)` holds.
    Custom {
        /// Short name used in `Debug` output and trace events.
        name: &'static str,
        /// Returns `true` when the value should be treated as present.
        predicate: Rc<dyn Fn(&T) -> bool>,
    },
}

impl<T> Presence<T> {
    /// The default predicate: every `Some` is present.
    #[must_use]
    pub fn defined() -> Self {
        Self::Defined
    }

    /// Whether `value` is present under this predicate.
    #[must_use]
    pub fn is_present(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (_, None) => false,
            (Self::Defined, Some(_)) => true,
            (Self::Custom { predicate, .. }, Some(v)) => predicate(v),
        }
    }

    /// Keep `value` only if it is present.
    #[must_use]
    pub fn filter(&self, value: Option<T>) -> Option<T> {
        value.filter(|v| self.is_present(Some(v)))
    }

    /// Name of the predicate (`"defined"` for the default).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Defined => "defined",
            Self::Custom { name, .. } => name,
        }
    }
}

impl<T: 'static> Presence<T> {
    /// Build a custom predicate from a closure.
    pub fn custom(name: &'static str, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self::Custom {
            name,
            predicate: Rc::new(predicate),
        }
    }
}

impl<T: IsEmpty + 'static> Presence<T> {
    /// Treat empty sentinels as absent.
    ///
    /// ```
    /// use bindery_core::Presence;
    ///
    /// let presence = Presence::<String>::non_empty();
    /// assert!(!presence.is_present(Some(&String::new())));
    /// assert!(presence.is_present(Some(&"x".to_string())));
    /// ```
    #[must_use]
    pub fn non_empty() -> Self {
        Self::custom("non-empty", |v: &T| !v.is_empty_value())
    }
}

impl<T> Default for Presence<T> {
    fn default() -> Self {
        Self::Defined
    }
}

impl<T> Clone for Presence<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Defined => Self::Defined,
            Self::Custom { name, predicate } => Self::Custom {
                name,
                predicate: Rc::clone(predicate),
            },
        }
    }
}

impl<T> fmt::Debug for Presence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Presence").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_never_present() {
        assert!(!Presence::<i32>::defined().is_present(None));
        assert!(!Presence::<String>::non_empty().is_present(None));
        assert!(!Presence::<i32>::custom("any", |_| true).is_present(None));
    }

    #[test]
    fn defined_accepts_every_some() {
        let p = Presence::<String>::defined();
        assert!(p.is_present(Some(&String::new())));
        assert_eq!(p.filter(Some(String::new())), Some(String::new()));
    }

    #[test]
    fn non_empty_rejects_sentinels() {
        assert_eq!(Presence::<String>::non_empty().filter(Some(String::new())), None);
        assert_eq!(Presence::<Vec<u8>>::non_empty().filter(Some(vec![])), None);
        assert_eq!(Presence::<Option<u8>>::non_empty().filter(Some(None)), None);
        assert_eq!(
            Presence::<Option<u8>>::non_empty().filter(Some(Some(0))),
            Some(Some(0))
        );
    }

    #[test]
    fn custom_predicate() {
        let positive = Presence::custom("positive", |v: &i32| *v > 0);
        assert!(positive.is_present(Some(&3)));
        assert!(!positive.is_present(Some(&-3)));
        assert_eq!(positive.name(), "positive");
    }

    #[test]
    fn clone_shares_predicate() {
        let p = Presence::<String>::non_empty();
        let q = p.clone();
        assert_eq!(q.name(), "non-empty");
        assert!(!q.is_present(Some(&String::new())));
    }

    #[test]
    fn debug_shows_name() {
        assert_eq!(format!("{:?}", Presence::<u8>::default()), "Presence(\"defined\")");
    }
}
