// ============================================================
// Layer 6 — Run Logger
// ============================================================
// One logger per process run, built once in main and passed
// to every stage.
//
// Output:
//   console                      ← fmt layer, RUST_LOG or info
//   logs/<run-timestamp>/
//     data_ingestion.log         ← every event inside the
//     data_preprocessing.log       stage's component span
//     ...
//
// A stage enters `logger.component("data_ingestion")` and logs
// with the ordinary tracing macros. ComponentFileLayer looks
// up the nearest enclosing span that carries a `component`
// field and appends the event to that component's file,
// opening it on first use.
//
// Logging never fails a stage. If the run directory or a log
// file cannot be created the run carries on console-only.
//
// File line format:
//   2026-01-31 14:02:11.532 - data_ingestion - INFO - message

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Span, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Span name used for every stage component
pub const COMPONENT_SPAN: &str = "stage";

const DEFAULT_CONSOLE_FILTER: &str = "sms_spam_pipeline=info";

pub struct RunLogger {
    run_dir: Option<PathBuf>,
}

impl RunLogger {
    /// Create `logs_root/<timestamp>/` and install the global subscriber.
    /// If a global subscriber already exists it is left in place.
    pub fn start(logs_root: &Path) -> Self {
        let stamp   = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let run_dir = logs_root.join(stamp);

        let run_dir = match fs::create_dir_all(&run_dir) {
            Ok(()) => Some(run_dir),
            Err(e) => {
                eprintln!("cannot create log directory '{}': {e}", run_dir.display());
                None
            }
        };

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
        let console = fmt::layer().with_target(false).with_filter(console_filter);
        let files = run_dir
            .clone()
            .map(|dir| ComponentFileLayer::new(dir).with_filter(LevelFilter::DEBUG));

        let _ = tracing_subscriber::registry().with(console).with(files).try_init();

        if let Some(dir) = &run_dir {
            tracing::debug!("Run logs in '{}'", dir.display());
        }
        Self { run_dir }
    }

    /// A logger that writes no files and installs nothing
    pub fn disabled() -> Self {
        Self { run_dir: None }
    }

    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    /// Span routing every event inside it to `<run-dir>/<name>.log`
    pub fn component(&self, name: &str) -> Span {
        tracing::info_span!(COMPONENT_SPAN, component = name)
    }
}

// ─── Component file layer ─────────────────────────────────────────────────────
/// Stored in a span's extensions when the span names a component
struct Component(String);

pub struct ComponentFileLayer {
    dir:   PathBuf,
    files: Mutex<HashMap<String, File>>,
}

impl ComponentFileLayer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), files: Mutex::new(HashMap::new()) }
    }

    fn append(&self, component: &str, line: &str) {
        let Ok(mut files) = self.files.lock() else {
            return;
        };
        if !files.contains_key(component) {
            let path = self.dir.join(format!("{component}.log"));
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => {
                    files.insert(component.to_string(), f);
                }
                Err(_) => return,
            }
        }
        if let Some(f) = files.get_mut(component) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl<S> Layer<S> for ComponentFileLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = ComponentVisitor(None);
        attrs.record(&mut visitor);
        if let (Some(name), Some(span)) = (visitor.0, ctx.span(id)) {
            span.extensions_mut().insert(Component(name));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(scope) = ctx.event_scope(event) else {
            return;
        };
        let component = scope
            .into_iter()
            .find_map(|span| span.extensions().get::<Component>().map(|c| c.0.clone()));
        let Some(component) = component else {
            return;
        };

        let mut message = MessageVisitor::default();
        event.record(&mut message);

        let line = format!(
            "{} - {} - {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            component,
            event.metadata().level(),
            message.finish()
        );
        self.append(&component, &line);
    }
}

struct ComponentVisitor(Option<String>);

impl Visit for ComponentVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "component" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "component" {
            self.0 = Some(format!("{value:?}").trim_matches('"').to_string());
        }
    }
}

/// Renders `message` followed by any structured fields as key=value
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields:  String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }

    #[test]
    fn test_events_land_in_component_files() {
        let dir = tempfile::tempdir().unwrap();
        let subscriber = tracing_subscriber::registry().with(ComponentFileLayer::new(dir.path()));
        let logger = RunLogger::disabled();

        tracing::subscriber::with_default(subscriber, || {
            let span = logger.component("data_ingestion");
            let _guard = span.enter();
            tracing::info!("loaded {} rows", 5);
            tracing::warn!(kind = "schema", "missing column");

            let inner = tracing::info_span!("split");
            let _inner = inner.enter();
            tracing::debug!("nested event");
        });

        let text = read(&dir.path().join("data_ingestion.log"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - data_ingestion - INFO - loaded 5 rows"));
        assert!(lines[1].ends_with("WARN - missing column kind=schema"));
        assert!(lines[2].ends_with("nested event"));
    }

    #[test]
    fn test_components_are_separate_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let subscriber = tracing_subscriber::registry().with(ComponentFileLayer::new(dir.path()));
        let logger = RunLogger::disabled();

        tracing::subscriber::with_default(subscriber, || {
            for name in ["model_training", "model_evaluation", "model_training"] {
                let span = logger.component(name);
                let _guard = span.enter();
                tracing::info!("hello from {}", name);
            }
            tracing::info!("outside any component");
        });

        assert_eq!(read(&dir.path().join("model_training.log")).lines().count(), 2);
        assert_eq!(read(&dir.path().join("model_evaluation.log")).lines().count(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_disabled_logger_has_no_run_dir() {
        assert!(RunLogger::disabled().run_dir().is_none());
    }
}
