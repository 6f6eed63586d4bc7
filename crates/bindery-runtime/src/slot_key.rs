#![forbid(unsafe_code)]

//! Identity of a component instance in the binding arena.
//!
//! A [`SlotKey`] is the `(component, instance_id)` pair that maps a rendered
//! component to the binding cells it owns. Two distinct component instances
//! must produce distinct keys; rendering two instances under one key makes
//! them share cells.
//!
//! ```
//! # use bindery_runtime::SlotKey;
//! // Explicit
//! let key = SlotKey::new("TextInput", "search");
//!
//! // From a component-tree path
//! let key = SlotKey::from_path(&["app", "sidebar", "TextInput"]);
//! assert_eq!(key.instance_id, "app/sidebar/TextInput");
//! assert_eq!(key.component, "TextInput");
//! ```

use std::borrow::Cow;
use std::fmt;

/// Unique identifier for one component instance's hook slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// Component type name (e.g. `"TextInput"`, `"Counter"`).
    pub component: Cow<'static, str>,
    /// Instance-unique identifier within a component tree.
    pub instance_id: String,
}

impl SlotKey {
    /// Create a key from a component name and instance id.
    #[must_use]
    pub fn new(component: impl Into<Cow<'static, str>>, id: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            instance_id: id.into(),
        }
    }

    /// Build a key from a path of component-tree segments.
    ///
    /// Segments are joined with `/` to form the instance id; the component
    /// name is the last segment. An empty path yields the root key
    /// (`"root"`, `""`).
    #[must_use]
    pub fn from_path(path: &[&str]) -> Self {
        match path.last() {
            Some(last) => Self {
                component: Cow::Owned((*last).to_owned()),
                instance_id: path.join("/"),
            },
            None => Self::root(),
        }
    }

    /// Key for the root of a component tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new("root", "")
    }

    /// Key for a child of this instance: same tree path plus `segment`.
    #[must_use]
    pub fn child(&self, component: impl Into<Cow<'static, str>>, segment: &str) -> Self {
        let instance_id = if self.instance_id.is_empty() {
            segment.to_owned()
        } else {
            format!("{}/{segment}", self.instance_id)
        };
        Self {
            component: component.into(),
            instance_id,
        }
    }

    /// Canonical string representation: `"component::instance_id"`.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.component, self.instance_id)
    }
}
