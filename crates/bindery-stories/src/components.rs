#![forbid(unsafe_code)]

//! Headless components built on the binding hooks.
//!
//! Each component follows the same shape: a props struct carrying
//! `default_value` / `value` / `on_change`, a `render` that resolves the
//! binding through a [`ComponentScope`], and interaction methods that call
//! the setter the way an event handler would.

use bindery_core::{ChangeHandler, FilledSetter};
use bindery_runtime::{ArenaError, ComponentScope};
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// TextInput
// ---------------------------------------------------------------------------

/// Props for [`TextInput`].
#[derive(Clone, Default)]
pub struct TextInputProps {
    /// Initial value when uncontrolled.
    pub default_value: Option<String>,
    /// Controlled value.
    pub value: Option<String>,
    /// Receives every edit.
    pub on_change: Option<ChangeHandler<String>>,
}

/// Single-line text input. Falls back to `"fallback"` when given nothing.
pub struct TextInput {
    value: String,
    set_value: FilledSetter<String>,
}

impl TextInput {
    /// Value shown when neither `value` nor `default_value` is supplied.
    pub const FALLBACK: &'static str = "fallback";

    /// Render the input.
    ///
    /// # Errors
    ///
    /// Propagates hook-order errors from the arena.
    pub fn render(
        scope: &mut ComponentScope<'_>,
        props: TextInputProps,
    ) -> Result<Self, ArenaError> {
        let (value, set_value) = scope.use_binding_with_fallback(
            props.default_value,
            props.value,
            props.on_change,
            Self::FALLBACK.to_string(),
        )?;
        Ok(Self { value, set_value })
    }

    /// Value shown by this render.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rendered representation.
    #[must_use]
    pub fn frame(&self) -> String {
        format!("[{}]", self.value)
    }

    /// Replace the input's text, as a change event would.
    pub fn type_text(&self, text: &str) {
        self.set_value.set(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// Props for [`Counter`].
#[derive(Clone, Default)]
pub struct CounterProps {
    /// Initial count when uncontrolled.
    pub default_value: Option<i64>,
    /// Controlled count.
    pub value: Option<i64>,
    /// Receives every intermediate count.
    pub on_change: Option<ChangeHandler<i64>>,
}

/// Counter whose button adds ten through ten successive updaters.
pub struct Counter {
    count: i64,
    set_count: FilledSetter<i64>,
}

impl Counter {
    /// Render the counter.
    ///
    /// # Errors
    ///
    /// Propagates hook-order errors from the arena.
    pub fn render(
        scope: &mut ComponentScope<'_>,
        props: CounterProps,
    ) -> Result<Self, ArenaError> {
        let (count, set_count) =
            scope.use_binding_with_fallback(props.default_value, props.value, props.on_change, 0)?;
        Ok(Self { count, set_count })
    }

    /// Count shown by this render.
    #[must_use]
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Rendered representation.
    #[must_use]
    pub fn frame(&self) -> String {
        format!("{} [Increment by 10]", self.count)
    }

    /// Click handler: ten `x + 1` updaters in a row.
    pub fn increment_by_ten(&self) {
        for _ in 0..10 {
            self.set_count.update(|x| x + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// DatePicker
// ---------------------------------------------------------------------------

/// Props for [`DatePicker`].
#[derive(Clone, Default)]
pub struct DatePickerProps {
    /// Initial date when uncontrolled.
    pub default_value: Option<NaiveDate>,
    /// Controlled date.
    pub value: Option<NaiveDate>,
    /// Receives the newly selected date.
    pub on_change: Option<ChangeHandler<Option<NaiveDate>>>,
}

/// Date picker whose binding value is itself optional.
///
/// The binding's `T` is `Option<NaiveDate>` with a fallback of `None`, so the
/// binding always has a value while the selection may be empty.
pub struct DatePicker {
    selected: Option<NaiveDate>,
    set_selected: FilledSetter<Option<NaiveDate>>,
}

impl DatePicker {
    /// Render the picker.
    ///
    /// # Errors
    ///
    /// Propagates hook-order errors from the arena.
    pub fn render(
        scope: &mut ComponentScope<'_>,
        props: DatePickerProps,
    ) -> Result<Self, ArenaError> {
        let (selected, set_selected) = scope.use_binding_with_fallback(
            props.default_value.map(Some),
            props.value.map(Some),
            props.on_change,
            None,
        )?;
        Ok(Self {
            selected,
            set_selected,
        })
    }

    /// Date shown by this render.
    #[must_use]
    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Rendered representation.
    #[must_use]
    pub fn frame(&self) -> String {
        match self.selected {
            Some(date) => format!("Value: {}", date.format("%Y-%m-%d")),
            None => "Value: ".to_string(),
        }
    }

    /// "Change date" button: selects 2020-02-01.
    pub fn change_date(&self) {
        self.set_selected.set(NaiveDate::from_ymd_opt(2020, 2, 1));
    }
}
