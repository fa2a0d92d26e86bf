//! Structured logging emitted with the `tracing` feature enabled.

#![cfg(feature = "tracing")]

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::MemoryHost;
use gridsplit_layout::{
    Direction, LayoutGroup, LayoutLeaf, Placement, PointerPosition, ResizeDirection, Size,
    SplitterConfig, SplitterEngine,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct Captured {
    spans: Mutex<Vec<CapturedSpan>>,
    events: Mutex<Vec<CapturedEvent>>,
}

struct CaptureLayer(Arc<Captured>);

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        if let Ok(mut spans) = self.0.spans.lock() {
            spans.push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        if let Ok(mut events) = self.0.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                fields: visitor.0.into_iter().collect(),
            });
        }
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Arc<Captured> {
    let captured = Arc::new(Captured::default());
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(Arc::clone(&captured)));
    tracing::subscriber::with_default(subscriber, f);
    captured
}

fn spans_named(captured: &Captured, name: &str) -> Vec<CapturedSpan> {
    captured
        .spans
        .lock()
        .map(|spans| spans.iter().filter(|s| s.name == name).cloned().collect())
        .unwrap_or_default()
}

fn messages(captured: &Captured) -> Vec<(tracing::Level, String)> {
    captured
        .events
        .lock()
        .map(|events| {
            events
                .iter()
                .filter_map(|e| e.fields.get("message").map(|m| (e.level, m.clone())))
                .collect()
        })
        .unwrap_or_default()
}

fn model() -> LayoutGroup {
    LayoutGroup::new("root", Direction::Columns)
        .with_item(LayoutLeaf::new("a", Size::px(100.0)))
        .with_item(LayoutLeaf::new("b", Size::fr(1.0)))
}

fn engine() -> SplitterEngine<MemoryHost> {
    SplitterEngine::with_model(
        MemoryHost::with_sizes(&[("root", 800.0)]),
        SplitterConfig::default(),
        &model(),
    )
    .expect("valid model")
}

#[test]
fn set_model_emits_build_span() {
    let captured = with_captured_tracing(|| {
        let _ = engine();
    });
    let builds = spans_named(&captured, "layout_index.build");
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].fields.get("root").map(String::as_str), Some("root"));
    assert_eq!(spans_named(&captured, "splitter.set_model").len(), 1);
    assert!(
        messages(&captured)
            .iter()
            .any(|(level, msg)| *level == tracing::Level::DEBUG && msg == "layout index built")
    );
}

#[test]
fn keyboard_resize_emits_apply_span() {
    let captured = with_captured_tracing(|| {
        let mut engine = engine();
        let _ = engine.keyboard_resize("a", ResizeDirection::Increase, false);
    });
    let spans = spans_named(&captured, "layout.apply_resize");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields.get("start").map(String::as_str), Some("a"));
    assert_eq!(spans[0].fields.get("increment_px").map(String::as_str), Some("10"));
    assert!(messages(&captured).iter().any(|(_, msg)| msg == "resize applied"));
}

#[test]
fn ignored_resize_logs_reason_at_debug() {
    let captured = with_captured_tracing(|| {
        let mut engine = engine();
        let _ = engine.pointer_move(PointerPosition::new(1.0, 1.0));
    });
    let events = captured.events.lock().map(|e| e.clone()).unwrap_or_default();
    let ignored = events
        .iter()
        .find(|e| e.fields.get("message").is_some_and(|m| m == "resize ignored"))
        .expect("noop is logged");
    assert_eq!(ignored.level, tracing::Level::DEBUG);
    assert_eq!(
        ignored.fields.get("reason").map(String::as_str),
        Some("idle_without_active_drag")
    );
}

#[test]
fn rejected_mutation_logs_warning() {
    let captured = with_captured_tracing(|| {
        let mut engine = engine();
        let _ = engine.add_sibling_leaf(
            "root",
            "ghost",
            Placement::After,
            LayoutLeaf::new("c", Size::fr(1.0)),
            false,
        );
        let _ = engine.remove_item("root");
    });
    let warnings: Vec<String> = messages(&captured)
        .into_iter()
        .filter(|(level, _)| *level == tracing::Level::WARN)
        .map(|(_, msg)| msg)
        .collect();
    assert_eq!(
        warnings,
        ["layout mutation rejected", "layout mutation rejected"]
    );
    assert_eq!(spans_named(&captured, "layout.add_sibling_leaf").len(), 1);
}
