#![forbid(unsafe_code)]

//! Headless demo components and scripted stories for bindery.
//!
//! [`components`] holds a text input, a counter and a date picker written
//! against [`bindery_runtime::ComponentScope`]. [`stories`] drives them
//! through fixed interaction scripts and records what each render showed.

pub mod components;
pub mod stories;

pub use stories::{Story, StoryError, StoryEvent, StoryOptions, Transcript, run_story};
