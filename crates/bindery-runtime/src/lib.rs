#![forbid(unsafe_code)]

//! Per-instance storage for `bindery-core` binding cells.
//!
//! A binding needs state that outlives one render but belongs to one call
//! site. This crate is the mechanism a framework would provide for that:
//!
//! - [`SlotKey`]: identity of a component instance.
//! - [`BindingArena`]: owns every instance's cells across passes.
//! - [`RenderPass`]: one render of the tree; unmounts what it did not visit.
//! - [`ComponentScope`]: positional hook slots with `use_binding*` helpers.

pub mod arena;
pub mod error;
pub mod slot_key;

pub use arena::{BindingArena, ComponentScope, RenderPass};
pub use error::ArenaError;
pub use slot_key::SlotKey;
