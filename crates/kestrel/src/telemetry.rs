//! # Telemetry
//!
//! The runtime logs through `tracing`; this module decides where those
//! events end up.
//!
//! ```text
//! event ──> LevelFilter(LogLevel) ──┬─ no sink:  fmt  ─┬─ ERROR/WARN ──> stderr
//!                                   │                  └─ INFO/DEBUG/TRACE ──> stdout
//!                                   └─ sink:  Fn(LogLevel, &str)
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{fmt as tracing_fmt, Layer, Registry};

use crate::error::{AppError, AppResult};

/// How much gets logged. Each level includes the ones above it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Nothing.
    None,
    /// Errors only.
    #[default]
    Error,
    /// Warnings and errors.
    Warning,
    /// Informational messages and above.
    Info,
    /// Debug messages and above.
    Debug,
    /// Everything, including trace events.
    All,
}

impl LogLevel {
    /// The equivalent `tracing` filter.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::None => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warning => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::All => LevelFilter::TRACE,
        }
    }

    /// The level a `tracing` event is reported under.
    #[must_use]
    pub fn of(level: &Level) -> Self {
        if *level == Level::ERROR {
            Self::Error
        } else if *level == Level::WARN {
            Self::Warning
        } else if *level == Level::INFO {
            Self::Info
        } else if *level == Level::DEBUG {
            Self::Debug
        } else {
            Self::All
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::All => "all",
        })
    }
}

/// Replacement output: receives every event that passes the level gate.
pub type LogSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Wraps a closure as a [`LogSink`].
#[must_use]
pub fn sink<F>(write: F) -> LogSink
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    Arc::new(write)
}

/// Builds the subscriber for `level`, writing to `sink` if given and to
/// stderr/stdout otherwise.
///
/// Use with [`tracing::subscriber::with_default`] for scoped capture, or
/// [`init`] to install it process-wide.
#[must_use]
pub fn subscriber(level: LogLevel, sink: Option<LogSink>) -> impl Subscriber + Send + Sync {
    let output: Box<dyn Layer<Registry> + Send + Sync> = match sink {
        Some(sink) => SinkLayer { sink }.boxed(),
        None => tracing_fmt::layer()
            .with_writer(
                std::io::stderr
                    .with_max_level(Level::WARN)
                    .or_else(std::io::stdout),
            )
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(level.filter())
}

/// Installs [`subscriber`] as the global default.
///
/// # Errors
///
/// [`AppError::Telemetry`] if a global subscriber is already set.
pub fn init(level: LogLevel, sink: Option<LogSink>) -> AppResult<()> {
    tracing::subscriber::set_global_default(subscriber(level, sink))
        .map_err(|err| AppError::Telemetry(err.to_string()))
}

/// Forwards formatted events to a [`LogSink`].
struct SinkLayer {
    sink: LogSink,
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        (self.sink)(LogLevel::of(event.metadata().level()), &visitor.finish());
    }
}

/// Renders an event as `message key=value key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_owned()
        } else {
            self.message + &self.fields
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}
