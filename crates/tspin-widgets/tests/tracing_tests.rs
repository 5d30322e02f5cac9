#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! These tests verify the spans and events a spinner emits.
//!
//! With instrumentation:
//!   cargo test -p tspin-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p tspin-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
#[cfg(feature = "tracing")]
use std::time::Duration;

use tspin_core::event::{Event, KeyCode, KeyEvent};
#[cfg(feature = "tracing")]
use tspin_core::event::{PointerEvent, SpinButton};
use tspin_core::scheduler::VirtualScheduler;
use tspin_widgets::binding::MemoryBinding;
use tspin_widgets::config::SpinOptions;
use tspin_widgets::touchspin::TouchSpin;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span with its fields.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

/// A captured event with its fields and enclosing span.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
    span_name: Option<String>,
}

/// A tracing Layer that records spans and events.
struct LogCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

/// Handle to read what was captured.
struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    fn events_with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.message == message)
            .collect()
    }
}

/// Visitor that extracts fields; `message` is kept separately.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for LogCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.fields.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let span_name = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields.into_iter().collect(),
            span_name,
        });
    }
}

/// Set up a tracing subscriber with capture and run a closure.
fn with_captured_logs<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = LogCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn spin(value: f64) -> TouchSpin<VirtualScheduler<tspin_widgets::SpinTimer>, MemoryBinding> {
    TouchSpin::new(
        SpinOptions::standard(),
        SpinOptions::new().max(10.0),
        VirtualScheduler::new(),
        MemoryBinding::with_value(value),
    )
    .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn handle_event_opens_span() {
    let handle = with_captured_logs(|| {
        let mut spin = spin(5.0);
        spin.handle_event(&Event::Key(KeyEvent::new(KeyCode::Up)))
            .unwrap();
    });

    let spans = handle.spans();
    let event_span = spans
        .iter()
        .find(|span| span.name == "touchspin_event")
        .expect("touchspin_event span");
    assert_eq!(event_span.fields.get("focused").map(String::as_str), Some("false"));

    let changed = handle.events_with_message("value changed");
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].level, tracing::Level::TRACE);
    assert_eq!(changed[0].span_name.as_deref(), Some("touchspin_event"));
}

#[test]
#[cfg(feature = "tracing")]
fn spin_lifecycle_is_logged() {
    let handle = with_captured_logs(|| {
        let mut spin = spin(5.0);
        spin.handle_event(&Event::Pointer(PointerEvent::Down(SpinButton::Up)))
            .unwrap();
        spin.advance(Duration::from_millis(50)).unwrap();
        spin.handle_event(&Event::Pointer(PointerEvent::Up)).unwrap();
        spin.advance(Duration::from_millis(1000)).unwrap();
    });

    let started = handle.events_with_message("spin started");
    assert_eq!(started.len(), 1);
    assert_eq!(
        started[0].fields.get("direction").map(String::as_str),
        Some("increase")
    );

    let stopped = handle.events_with_message("spin stopped");
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].level, tracing::Level::DEBUG);
    assert_eq!(
        stopped[0].fields.get("policy").map(String::as_str),
        Some("grace")
    );
    assert_eq!(handle.events_with_message("grace cancel completed").len(), 1);
    assert!(handle.events_with_message("repeat tick").is_empty());
}

#[test]
#[cfg(feature = "tracing")]
fn malformed_blur_warns() {
    let handle = with_captured_logs(|| {
        let mut spin = spin(5.0);
        spin.handle_event(&Event::Input("abc".into())).unwrap();
        spin.handle_event(&Event::Focus(false)).unwrap();
    });

    let warnings: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|event| event.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].fields.get("text").map(String::as_str), Some("abc"));
    assert_eq!(warnings[0].fields.get("fallback").map(String::as_str), Some("5"));
}

/// Without `--features tracing` the logging macros expand to nothing.
#[test]
fn zero_overhead_when_disabled() {
    let handle = with_captured_logs(|| {
        let mut spin = spin(5.0);
        spin.handle_event(&Event::Key(KeyEvent::new(KeyCode::Up)))
            .unwrap();
    });

    #[cfg(feature = "tracing")]
    {
        assert!(!handle.spans().is_empty());
        assert!(!handle.events().is_empty());
    }

    #[cfg(not(feature = "tracing"))]
    {
        assert!(handle.spans().is_empty(), "no spans without the feature");
        assert!(handle.events().is_empty(), "no events without the feature");
    }
}
