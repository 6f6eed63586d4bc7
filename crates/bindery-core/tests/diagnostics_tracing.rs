#![forbid(unsafe_code)]

//! The default sink reports mode switches as `tracing` warnings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bindery_core::{BindingCell, BindingConfig, ModeSwitchPolicy, resolve_binding};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
struct WarnCounter {
    warnings: Arc<AtomicUsize>,
    traces: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target() != "bindery::binding" {
            return;
        }
        let level = *meta.level();
        if level == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        } else if level == Level::TRACE {
            self.traces.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn tracing_sink_warns_and_setter_traces() {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());

    tracing::subscriber::with_default(subscriber, || {
        let cell = BindingCell::new().with_config(BindingConfig::new().with_setter_tracing(true));
        let (_, set) = resolve_binding(&cell, Some(1), None, None, None);
        set.set(2);
        let _ = resolve_binding(&cell, Some(1), Some(3), None, None);
        let _ = resolve_binding(&cell, Some(1), None, None, None);

        let silent = BindingCell::new()
            .with_config(BindingConfig::new().with_mode_switch(ModeSwitchPolicy::Silent));
        let _ = resolve_binding(&silent, None, Some(1), None, None);
        let _ = resolve_binding(&silent, None, None, None, None);
    });

    assert_eq!(counter.warnings.load(Ordering::SeqCst), 2);
    // One seeding event plus one setter event.
    assert_eq!(counter.traces.load(Ordering::SeqCst), 2);
}
