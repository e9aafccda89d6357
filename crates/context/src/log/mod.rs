//! Context-routed logging.
//!
//! Code reports through the free functions ([`info`], [`warning`], [`error`],
//! ...), which resolve the innermost active [`LogContext`] and fall back to
//! the process default ([`LogContext::standard`] until replaced). One context
//! type covers every policy: a [`LogPolicy`] pairs the enabled severities with
//! a [`LogSink`].
//!
//! ```
//! use std::sync::Arc;
//! use ambit_context::log::{self, LogContext, LogLevels, LogPolicy, RecordingSink};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let quiet = LogContext::new(LogPolicy::new(LogLevels::WARNING | LogLevels::ERROR, sink.clone()));
//!
//! let scope = ambit_context::enter(Arc::new(quiet)).unwrap();
//! log::info("dropped");
//! log::warning("kept");
//! scope.exit();
//!
//! assert_eq!(sink.len(), 1);
//! ```

use std::error::Error;
use std::sync::{Arc, LazyLock};

use bitflags::bitflags;

use crate::context::{Context, DefaultContext, DefaultSlot};

mod config;
mod sink;

#[cfg(test)]
mod tests;

pub use config::{LogConfig, SinkKind};
pub use sink::{ConsoleSink, LogRecord, LogSink, NullSink, RecordedLog, RecordingSink, Severity, TracingSink};

bitflags! {
	/// Severities a log context passes to its sink.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct LogLevels: u8 {
		/// Info messages.
		const INFO = 1 << 0;
		/// Warnings.
		const WARNING = 1 << 1;
		/// Errors.
		const ERROR = 1 << 2;
	}
}

impl LogLevels {
	/// Flag gating `severity`.
	pub fn of(severity: Severity) -> Self {
		match severity {
			Severity::Info => Self::INFO,
			Severity::Warning => Self::WARNING,
			Severity::Error => Self::ERROR,
		}
	}
}

/// Enabled severities plus the sink receiving them.
#[derive(Debug, Clone)]
pub struct LogPolicy {
	/// Severities passed to the sink.
	pub levels: LogLevels,
	/// Destination of enabled records.
	pub sink: Arc<dyn LogSink>,
}

impl LogPolicy {
	/// Policy passing `levels` to `sink`.
	pub fn new(levels: LogLevels, sink: Arc<dyn LogSink>) -> Self {
		Self { levels, sink }
	}
}

/// A log context: routes records of enabled severities to one sink.
#[derive(Debug, Clone)]
pub struct LogContext {
	policy: LogPolicy,
	shared: bool,
}

static STANDARD: LazyLock<Arc<LogContext>> =
	LazyLock::new(|| Arc::new(LogContext::shared(LogLevels::all(), Arc::new(TracingSink))));
static NULL: LazyLock<Arc<LogContext>> = LazyLock::new(|| Arc::new(LogContext::shared(LogLevels::empty(), Arc::new(NullSink))));
static SYSTEM: LazyLock<Arc<LogContext>> =
	LazyLock::new(|| Arc::new(LogContext::shared(LogLevels::all(), Arc::new(ConsoleSink::new()))));
static SYSTEM_ERR: LazyLock<Arc<LogContext>> = LazyLock::new(|| {
	Arc::new(LogContext::shared(
		LogLevels::WARNING | LogLevels::ERROR,
		Arc::new(ConsoleSink::new()),
	))
});

static DEFAULT: DefaultSlot<LogContext> = DefaultSlot::new(LogContext::standard);

impl LogContext {
	/// Enterable context applying `policy`.
	pub fn new(policy: LogPolicy) -> Self {
		Self { policy, shared: false }
	}

	/// Enterable context described by `config`.
	pub fn from_config(config: &LogConfig) -> Self {
		Self::new(config.policy())
	}

	fn shared(levels: LogLevels, sink: Arc<dyn LogSink>) -> Self {
		Self {
			policy: LogPolicy::new(levels, sink),
			shared: true,
		}
	}

	/// Built-in forwarding every severity to `tracing`. The initial default.
	pub fn standard() -> Arc<Self> {
		Arc::clone(&STANDARD)
	}

	/// Built-in discarding everything.
	pub fn null() -> Arc<Self> {
		Arc::clone(&NULL)
	}

	/// Built-in writing info to stdout and warnings and errors to stderr.
	pub fn system() -> Arc<Self> {
		Arc::clone(&SYSTEM)
	}

	/// Built-in writing only warnings and errors, to stderr.
	pub fn system_err() -> Arc<Self> {
		Arc::clone(&SYSTEM_ERR)
	}

	/// An enterable copy of this context's policy.
	///
	/// Built-ins cannot be entered themselves; this is how a scope adopts
	/// one of their policies.
	pub fn scoped(&self) -> Self {
		Self::new(self.policy.clone())
	}

	/// Severities this context passes to its sink.
	pub fn levels(&self) -> LogLevels {
		self.policy.levels
	}

	/// Whether records of `severity` reach the sink.
	pub fn is_logged(&self, severity: Severity) -> bool {
		self.policy.levels.contains(LogLevels::of(severity))
	}

	/// Whether info messages reach the sink.
	pub fn is_info_logged(&self) -> bool {
		self.is_logged(Severity::Info)
	}

	/// Whether warnings reach the sink.
	pub fn is_warning_logged(&self) -> bool {
		self.is_logged(Severity::Warning)
	}

	/// Whether errors reach the sink.
	pub fn is_error_logged(&self) -> bool {
		self.is_logged(Severity::Error)
	}

	/// Passes `record` to the sink if its severity is enabled.
	pub fn log(&self, record: &LogRecord<'_>) {
		if self.is_logged(record.severity) {
			self.policy.sink.record(record);
		}
	}

	/// Logs an error record; either part may be absent.
	pub fn log_error(&self, error: Option<&(dyn Error + 'static)>, message: Option<&str>) {
		self.log(&LogRecord {
			severity: Severity::Error,
			message,
			error,
		});
	}
}

impl Context for LogContext {
	fn kind(&self) -> &'static str {
		"LogContext"
	}

	fn is_shared(&self) -> bool {
		self.shared
	}
}

impl DefaultContext for LogContext {
	fn defaults() -> &'static DefaultSlot<Self> {
		&DEFAULT
	}
}

/// The log context in effect on the calling thread.
pub fn current() -> Arc<LogContext> {
	crate::stack::current::<LogContext>()
}

/// Replaces the process-wide default log context, returning the previous one.
pub fn set_default(context: Arc<LogContext>) -> Arc<LogContext> {
	crate::stack::set_default(context)
}

/// Logs an info message through the current log context.
pub fn info(message: &str) {
	current().log(&LogRecord::message(Severity::Info, message));
}

/// Logs a warning through the current log context.
pub fn warning(message: &str) {
	current().log(&LogRecord::message(Severity::Warning, message));
}

/// Logs `error` through the current log context.
pub fn error(error: &(dyn Error + 'static)) {
	current().log_error(Some(error), None);
}

/// Logs an error message with no associated failure.
pub fn error_message(message: &str) {
	current().log_error(None, Some(message));
}

/// Logs `error` with an explanatory message.
pub fn error_with_message(error: &(dyn Error + 'static), message: &str) {
	current().log_error(Some(error), Some(message));
}
