#![forbid(unsafe_code)]

/// Errors raised by the binding arena.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// A hook slot was reused with a different value type, which means the
    /// component called its hooks in a different order than last render.
    #[error(
        "hook slot {slot} of `{key}` holds a different value type than `{expected}` \
         (hook order changed between renders)"
    )]
    TypeMismatch {
        /// Canonical key of the component instance.
        key: String,
        /// Positional slot index within the component.
        slot: usize,
        /// Type requested by the current render.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_slot_and_type() {
        let err = ArenaError::TypeMismatch {
            key: "Counter::main".into(),
            slot: 1,
            expected: "i64",
        };
        let msg = err.to_string();
        assert!(msg.contains("slot 1"));
        assert!(msg.contains("Counter::main"));
        assert!(msg.contains("`i64`"));
    }
}
