#![forbid(unsafe_code)]

//! Scripted stories: sequences of renders and interactions over the
//! components in [`crate::components`], recorded as a [`Transcript`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use bindery_core::{
    BindingConfig, ChangeHandler, ConfigError, DiagnosticSink, ModeSwitch, TracingSink,
    change_handler,
};
use bindery_runtime::{ArenaError, BindingArena, SlotKey};
use clap::ValueEnum;

use crate::components::{
    Counter, CounterProps, DatePicker, DatePickerProps, TextInput, TextInputProps,
};

/// Errors from running a story.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// No story has the given name.
    #[error("unknown story `{0}` (try `bindery-stories list`)")]
    UnknownStory(String),
    /// A component changed its hook order.
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// The binding config could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Story catalog
// ---------------------------------------------------------------------------

/// Available stories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Story {
    /// Input controlled by a parent that stores every change.
    ControlledMutable,
    /// Input controlled by a constant; edits are reported but never shown.
    ControlledStatic,
    /// Input seeded from a default value, reporting changes.
    UncontrolledDefault,
    /// Input seeded from a default value with no change callback.
    #[value(name = "uncontrolled-no-onchange")]
    UncontrolledNoOnChange,
    /// Input toggled between controlled and uncontrolled.
    SwitchControlled,
    /// Input with no props at all.
    Fallback,
    /// Counter incremented by ten updaters per click.
    Mutator,
    /// Date picker over an optional value.
    Date,
}

impl Story {
    /// Every story, in catalog order.
    pub const ALL: [Story; 8] = [
        Story::ControlledMutable,
        Story::ControlledStatic,
        Story::UncontrolledDefault,
        Story::UncontrolledNoOnChange,
        Story::SwitchControlled,
        Story::Fallback,
        Story::Mutator,
        Story::Date,
    ];

    /// Command-line name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ControlledMutable => "controlled-mutable",
            Self::ControlledStatic => "controlled-static",
            Self::UncontrolledDefault => "uncontrolled-default",
            Self::UncontrolledNoOnChange => "uncontrolled-no-onchange",
            Self::SwitchControlled => "switch-controlled",
            Self::Fallback => "fallback",
            Self::Mutator => "mutator",
            Self::Date => "date",
        }
    }

    /// One-line summary.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::ControlledMutable => "parent state drives the input; edits round-trip",
            Self::ControlledStatic => "constant value; edits are reported but not shown",
            Self::UncontrolledDefault => "seeded from a default; edits are retained",
            Self::UncontrolledNoOnChange => "seeded from a default; no change callback",
            Self::SwitchControlled => "toggles control; warns on each switch",
            Self::Fallback => "no props; shows the fallback",
            Self::Mutator => "ten chained updaters per click (--controlled for parent state)",
            Self::Date => "optional date value with an absent fallback",
        }
    }
}

impl fmt::Display for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Story {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Story as ValueEnum>::from_str(s, true)
            .map_err(|_| StoryError::UnknownStory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Something observable that happened while a story ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoryEvent {
    /// A parent rendered with this state.
    Render(String),
    /// A component rendered this frame.
    Frame(String),
    /// A change callback fired with this value.
    Change(String),
    /// A mode-switch diagnostic was reported.
    Warning(String),
}

impl fmt::Display for StoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(s) => write!(f, "render   {s}"),
            Self::Frame(s) => write!(f, "frame    {s}"),
            Self::Change(s) => write!(f, "change   {s}"),
            Self::Warning(s) => write!(f, "warning  {s}"),
        }
    }
}

/// Ordered record of a story run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    events: Vec<StoryEvent>,
}

impl Transcript {
    /// All events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[StoryEvent] {
        &self.events
    }

    /// Rendered frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<&str> {
        self.collect(|e| match e {
            StoryEvent::Frame(s) => Some(s),
            _ => None,
        })
    }

    /// Values passed to change callbacks, oldest first.
    #[must_use]
    pub fn changes(&self) -> Vec<&str> {
        self.collect(|e| match e {
            StoryEvent::Change(s) => Some(s),
            _ => None,
        })
    }

    /// Parent render states, oldest first.
    #[must_use]
    pub fn renders(&self) -> Vec<&str> {
        self.collect(|e| match e {
            StoryEvent::Render(s) => Some(s),
            _ => None,
        })
    }

    /// Mode-switch warnings, oldest first.
    #[must_use]
    pub fn warnings(&self) -> Vec<&str> {
        self.collect(|e| match e {
            StoryEvent::Warning(s) => Some(s),
            _ => None,
        })
    }

    fn collect<'a>(
        &'a self,
        pick: impl Fn(&'a StoryEvent) -> Option<&'a String>,
    ) -> Vec<&'a str> {
        self.events.iter().filter_map(pick).map(String::as_str).collect()
    }

    fn push(&mut self, event: StoryEvent) {
        self.events.push(event);
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

/// Knobs shared by every story.
#[derive(Clone, Debug, Default)]
pub struct StoryOptions {
    /// For stories with a parent, whether the parent controls the child.
    pub controlled: bool,
    /// Config applied to every binding cell.
    pub config: BindingConfig,
}

#[derive(Clone, Default)]
struct Log(Rc<RefCell<Transcript>>);

impl Log {
    fn push(&self, event: StoryEvent) {
        self.0.borrow_mut().push(event);
    }

    fn frame(&self, frame: String) {
        self.push(StoryEvent::Frame(frame));
    }

    fn render(&self, state: impl fmt::Display) {
        self.push(StoryEvent::Render(state.to_string()));
    }

    /// Change handler that records its value.
    fn on_change<T: fmt::Debug + 'static>(&self, show: fn(&T) -> String) -> ChangeHandler<T> {
        let log = self.clone();
        change_handler(move |v: &T| {
            tracing::info!(target: "bindery::stories", value = ?v, "onChange");
            log.push(StoryEvent::Change(show(v)));
        })
    }

    fn snapshot(&self) -> Transcript {
        self.0.borrow().clone()
    }
}

/// Sink that records warnings in the transcript and also logs them.
struct StorySink {
    log: Log,
}

impl DiagnosticSink for StorySink {
    fn mode_switched(&self, event: &ModeSwitch) {
        TracingSink.mode_switched(event);
        self.log.push(StoryEvent::Warning(event.to_string()));
    }
}

/// Run `story` from scratch and return what it rendered.
///
/// # Errors
///
/// [`StoryError::Arena`] if a component's hook order changes mid-story.
pub fn run_story(story: Story, options: &StoryOptions) -> Result<Transcript, StoryError> {
    let log = Log::default();
    let mut arena = BindingArena::new()
        .with_config(options.config.clone())
        .with_sink(Rc::new(StorySink { log: log.clone() }));

    let _span =
        tracing::info_span!(target: "bindery::stories", "story", name = story.name()).entered();
    match story {
        Story::ControlledMutable => controlled_mutable(&mut arena, &log)?,
        Story::ControlledStatic => controlled_static(&mut arena, &log)?,
        Story::UncontrolledDefault => uncontrolled(&mut arena, &log, true)?,
        Story::UncontrolledNoOnChange => uncontrolled(&mut arena, &log, false)?,
        Story::SwitchControlled => switch_controlled(&mut arena, &log)?,
        Story::Fallback => fallback(&mut arena, &log)?,
        Story::Mutator => mutator(&mut arena, &log, options.controlled)?,
        Story::Date => date(&mut arena, &log)?,
    }
    Ok(log.snapshot())
}

fn input_key(story: &str) -> SlotKey {
    SlotKey::root().child("Story", story).child("TextInput", "input")
}

fn controlled_mutable(arena: &mut BindingArena, log: &Log) -> Result<(), ArenaError> {
    let parent = SlotKey::root().child("Story", "controlled-mutable");
    let input = parent.child("TextInput", "input");

    for typed in [Some("h"), Some("hi"), None] {
        let mut pass = arena.begin_pass();

        // The parent's own state is an uncontrolled binding seeded with "".
        let (value, set_value) = pass
            .scope(parent.clone())
            .use_binding_with_fallback(None, None, None, String::new())?;
        log.render(format!("{value:?}"));

        let record = log.on_change(String::clone);
        let store = set_value.to_change_handler();
        let on_change = change_handler(move |v: &String| {
            record(v);
            store(v);
        });
        let view = TextInput::render(
            &mut pass.scope(input.clone()),
            TextInputProps {
                value: Some(value),
                on_change: Some(on_change),
                ..TextInputProps::default()
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();

        if let Some(text) = typed {
            view.type_text(text);
        }
    }
    Ok(())
}

fn controlled_static(arena: &mut BindingArena, log: &Log) -> Result<(), ArenaError> {
    let key = input_key("controlled-static");
    for typed in [Some("typed"), None] {
        let mut pass = arena.begin_pass();
        let view = TextInput::render(
            &mut pass.scope(key.clone()),
            TextInputProps {
                value: Some("the value".to_string()),
                ..TextInputProps::default()
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();
        if let Some(text) = typed {
            view.type_text(text);
        }
    }
    Ok(())
}

fn uncontrolled(
    arena: &mut BindingArena,
    log: &Log,
    with_on_change: bool,
) -> Result<(), ArenaError> {
    let key = input_key(if with_on_change {
        "uncontrolled-default"
    } else {
        "uncontrolled-no-onchange"
    });
    for typed in [Some("typed"), None] {
        let mut pass = arena.begin_pass();
        let view = TextInput::render(
            &mut pass.scope(key.clone()),
            TextInputProps {
                default_value: Some("default value".to_string()),
                on_change: with_on_change.then(|| log.on_change(String::clone)),
                ..TextInputProps::default()
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();
        if let Some(text) = typed {
            view.type_text(text);
        }
    }
    Ok(())
}

fn switch_controlled(arena: &mut BindingArena, log: &Log) -> Result<(), ArenaError> {
    let key = input_key("switch-controlled");
    let script = [
        (false, Some("edited")),
        (false, None),
        (true, Some("ignored")),
        (true, None),
        (false, None),
    ];
    for (controlled, typed) in script {
        let mut pass = arena.begin_pass();
        log.render(if controlled { "controlled" } else { "uncontrolled" });
        let view = TextInput::render(
            &mut pass.scope(key.clone()),
            TextInputProps {
                default_value: Some("default value".to_string()),
                value: controlled.then(|| "test controlled value".to_string()),
                on_change: Some(log.on_change(String::clone)),
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();
        if let Some(text) = typed {
            view.type_text(text);
        }
    }
    Ok(())
}

fn fallback(arena: &mut BindingArena, log: &Log) -> Result<(), ArenaError> {
    let key = input_key("fallback");
    for typed in [Some("typed"), None] {
        let mut pass = arena.begin_pass();
        let view = TextInput::render(&mut pass.scope(key.clone()), TextInputProps::default())?;
        log.frame(view.frame());
        let _ = pass.finish();
        if let Some(text) = typed {
            view.type_text(text);
        }
    }
    Ok(())
}

fn mutator(arena: &mut BindingArena, log: &Log, controlled: bool) -> Result<(), ArenaError> {
    let parent = SlotKey::root().child("Story", "mutator");
    let counter_key = parent.child("Counter", "counter");

    for click in [true, true, false] {
        let mut pass = arena.begin_pass();
        let (count, set_count) = pass
            .scope(parent.clone())
            .use_binding_with_fallback(None, None, None, 0i64)?;
        log.render(count);

        let record = log.on_change(|v: &i64| v.to_string());
        let store = controlled.then(|| set_count.to_change_handler());
        let on_change = change_handler(move |v: &i64| {
            record(v);
            if let Some(store) = &store {
                store(v);
            }
        });
        let view = Counter::render(
            &mut pass.scope(counter_key.clone()),
            CounterProps {
                default_value: Some(0),
                value: controlled.then_some(count),
                on_change: Some(on_change),
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();

        if click {
            view.increment_by_ten();
        }
    }
    Ok(())
}

fn date(arena: &mut BindingArena, log: &Log) -> Result<(), ArenaError> {
    let key = SlotKey::root().child("Story", "date").child("DatePicker", "picker");
    for click in [true, false] {
        let mut pass = arena.begin_pass();
        let view = DatePicker::render(
            &mut pass.scope(key.clone()),
            DatePickerProps {
                on_change: Some(log.on_change(|v: &Option<chrono::NaiveDate>| match v {
                    Some(d) => d.to_string(),
                    None => "none".to_string(),
                })),
                ..DatePickerProps::default()
            },
        )?;
        log.frame(view.frame());
        let _ = pass.finish();
        if click {
            view.change_date();
        }
    }
    Ok(())
}
