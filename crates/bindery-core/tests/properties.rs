#![forbid(unsafe_code)]

//! Property tests for the resolver's precedence and cell-stability rules.

use std::cell::RefCell;
use std::rc::Rc;

use bindery_core::{BindingCell, NullSink, change_handler, resolve_binding};
use proptest::prelude::*;

/// One render: the props supplied, plus setter calls issued during it.
#[derive(Clone, Debug)]
struct Render {
    default_value: Option<i32>,
    value: Option<i32>,
    fallback_value: Option<i32>,
    sets: Vec<Op>,
}

#[derive(Clone, Debug)]
enum Op {
    Set(i32),
    Add(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1000i32..1000).prop_map(Op::Set),
        (-10i32..10).prop_map(Op::Add),
    ]
}

fn render() -> impl Strategy<Value = Render> {
    (
        proptest::option::of(-100i32..100),
        proptest::option::of(-100i32..100),
        proptest::option::of(-100i32..100),
        proptest::collection::vec(op(), 0..5),
    )
        .prop_map(|(default_value, value, fallback_value, sets)| Render {
            default_value,
            value,
            fallback_value,
            sets,
        })
}

fn quiet_cell() -> BindingCell<i32> {
    BindingCell::new().with_sink(Rc::new(NullSink))
}

proptest! {
    #[test]
    fn present_controlled_value_always_wins(renders in proptest::collection::vec(render(), 1..12)) {
        let cell = quiet_cell();
        for r in renders {
            let (current, set) =
                resolve_binding(&cell, r.default_value, r.value, None, r.fallback_value);
            if let Some(controlled) = r.value {
                prop_assert_eq!(current, Some(controlled));
            }
            for op in r.sets {
                match op {
                    Op::Set(v) => set.set(v),
                    Op::Add(d) => set.update(move |x| x.copied().unwrap_or(0) + d),
                }
            }
        }
    }

    #[test]
    fn first_render_seeds_by_priority(
        default_value in proptest::option::of(any::<i32>()),
        fallback_value in proptest::option::of(any::<i32>()),
    ) {
        let cell = quiet_cell();
        let (current, _) = resolve_binding(&cell, default_value, None, None, fallback_value);
        prop_assert_eq!(current, default_value.or(fallback_value));
    }

    #[test]
    fn uncontrolled_value_tracks_last_set(
        default_value in any::<i32>(),
        writes in proptest::collection::vec(any::<i32>(), 1..8),
    ) {
        let cell = quiet_cell();
        let mut expected = default_value;
        for w in writes {
            let (current, set) = resolve_binding(&cell, Some(default_value), None, None, None);
            prop_assert_eq!(current, Some(expected));
            set.set(w);
            expected = w;
        }
        let (current, _) = resolve_binding(&cell, Some(default_value), None, None, None);
        prop_assert_eq!(current, Some(expected));
    }

    #[test]
    fn one_notification_per_set_with_evaluated_value(
        start in -100i32..100,
        ops in proptest::collection::vec(op(), 0..20),
        controlled in any::<bool>(),
    ) {
        let cell = quiet_cell();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let cb = change_handler(move |v: &i32| s.borrow_mut().push(*v));
        let value = controlled.then_some(start);
        let (_, set) = resolve_binding(&cell, Some(start), value, Some(cb), None);

        let mut expected = Vec::new();
        let mut running = start;
        for op in &ops {
            running = match *op {
                Op::Set(v) => { set.set(v); v }
                Op::Add(d) => { set.update(move |x| x.copied().unwrap_or(0) + d); running + d }
            };
            expected.push(running);
        }
        prop_assert_eq!(&*seen.borrow(), &expected);
    }

    #[test]
    fn controlled_setter_never_writes_internal_cell(
        seed in any::<i32>(),
        controlled in any::<i32>(),
        writes in proptest::collection::vec(any::<i32>(), 0..8),
    ) {
        let cell = quiet_cell();
        // Seed uncontrolled, then take control.
        let _ = resolve_binding(&cell, Some(seed), None, None, None);
        let (_, set) = resolve_binding(&cell, Some(seed), Some(controlled), None, None);
        for w in writes {
            set.set(w);
        }
        prop_assert_eq!(cell.internal_value(), Some(seed));
        let (current, _) = resolve_binding(&cell, Some(seed), None, None, None);
        prop_assert_eq!(current, Some(seed));
    }
}
