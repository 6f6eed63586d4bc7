#![forbid(unsafe_code)]

//! Integration tests: scripted render sequences against a single cell.

use std::cell::RefCell;
use std::rc::Rc;

use bindery_core::{
    BindingCell, BindingMode, ChangeHandler, RecordingSink, change_handler, resolve_binding,
    resolve_with_fallback,
};

fn recorder<T: Clone + 'static>() -> (ChangeHandler<T>, Rc<RefCell<Vec<T>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    (change_handler(move |v: &T| s.borrow_mut().push(v.clone())), seen)
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn controlled_value_ignores_setter_writes() {
    let cell = BindingCell::new();
    let (cb, seen) = recorder();

    let (value, set) = resolve_binding(&cell, None, Some("X"), Some(Rc::clone(&cb)), Some("fb"));
    assert_eq!(value, Some("X"));

    set.set("Y");
    assert_eq!(*seen.borrow(), vec!["Y"]);

    let (value, _) = resolve_binding(&cell, None, Some("X"), Some(cb), Some("fb"));
    assert_eq!(value, Some("X"));
}

#[test]
fn uncontrolled_value_survives_rerender() {
    let cell = BindingCell::new();
    let (cb, seen) = recorder();

    let (value, set) = resolve_binding(&cell, Some("D"), None, Some(Rc::clone(&cb)), Some("fb"));
    assert_eq!(value, Some("D"));

    set.set("E");
    assert_eq!(*seen.borrow(), vec!["E"]);

    let (value, _) = resolve_binding(&cell, Some("D"), None, Some(cb), Some("fb"));
    assert_eq!(value, Some("E"));
}

#[test]
fn fallback_fills_missing_inputs() {
    let cell = BindingCell::new();
    let (cb, seen) = recorder::<&str>();
    let (value, _) = resolve_binding(&cell, None, None, Some(cb), Some("fb"));
    assert_eq!(value, Some("fb"));
    assert!(seen.borrow().is_empty());
}

#[test]
fn ten_updaters_in_one_pass_without_callback() {
    let cell = BindingCell::new();
    let (_, set) = resolve_binding(&cell, None, None, None, Some(0));
    for _ in 0..10 {
        set.update(|x| x.copied().unwrap_or_default() + 1);
    }
    assert_eq!(cell.internal_value(), Some(10));
    assert_eq!(resolve_binding(&cell, None, None, None, Some(0)).0, Some(10));
}

// ============================================================================
// Mode switching
// ============================================================================

#[test]
fn switching_to_uncontrolled_surfaces_internal_cell() {
    let sink = RecordingSink::new();
    let cell = BindingCell::new().with_sink(Rc::new(sink.clone()));

    // Uncontrolled first: the user edits the value.
    let (value, set) = resolve_with_fallback(&cell, Some("default value"), None, None, "fallback");
    assert_eq!(value, "default value");
    set.set("edited");

    // The parent takes control; edits are forwarded but not retained.
    let (value, set) = resolve_with_fallback(
        &cell,
        Some("default value"),
        Some("test controlled value"),
        None,
        "fallback",
    );
    assert_eq!(value, "test controlled value");
    set.set("ignored");
    assert_eq!(cell.internal_value(), Some("edited"));

    // Control released: the last uncontrolled value comes back.
    let (value, _) = resolve_with_fallback(&cell, Some("default value"), None, None, "fallback");
    assert_eq!(value, "edited");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        (events[0].from, events[0].to),
        (BindingMode::Uncontrolled, BindingMode::Controlled)
    );
    assert_eq!(
        (events[1].from, events[1].to),
        (BindingMode::Controlled, BindingMode::Uncontrolled)
    );
}

#[test]
fn controlled_first_invocation_seeds_internal_cell() {
    let cell = BindingCell::new();
    let _ = resolve_binding(&cell, Some("D"), Some("C"), None, Some("fb"));
    assert_eq!(cell.internal_value(), Some("C"));

    let (value, _) = resolve_binding(&cell, Some("D"), None, None, Some("fb"));
    assert_eq!(value, Some("C"));
}

#[test]
fn stale_setter_keeps_its_render_mode() {
    let cell = BindingCell::new();
    let (_, controlled_set) = resolve_binding(&cell, Some(0), Some(1), None, None);
    let (_, uncontrolled_set) = resolve_binding(&cell, Some(0), None, None, None);

    controlled_set.set(5);
    assert_eq!(cell.internal_value(), Some(1));

    uncontrolled_set.set(6);
    assert_eq!(cell.internal_value(), Some(6));
}

// ============================================================================
// Parent/child wiring
// ============================================================================

#[test]
fn controlled_child_of_stateful_parent() {
    // A parent owns the state; the child is controlled by it and reports
    // changes upward, the way a controlled text input is usually wired.
    let parent = BindingCell::new();
    let child = BindingCell::new();

    let render = |typed: Option<&str>| -> String {
        let (parent_value, parent_set) =
            resolve_with_fallback(&parent, None, None, None, String::new());
        let (child_value, child_set) = resolve_with_fallback(
            &child,
            None,
            Some(parent_value),
            Some(parent_set.to_change_handler()),
            "fallback".to_string(),
        );
        if let Some(text) = typed {
            child_set.set(text.to_string());
        }
        child_value
    };

    assert_eq!(render(None), "");
    assert_eq!(render(Some("h")), "");
    assert_eq!(render(None), "h");
    assert_eq!(render(Some("hi")), "h");
    assert_eq!(render(None), "hi");
    assert_eq!(child.internal_value().as_deref(), Some(""));
}
