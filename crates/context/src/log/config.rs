//! Declarative log policy, loadable from a host's settings file.

use std::sync::Arc;

use serde::Deserialize;

use super::sink::{ConsoleSink, LogSink, NullSink, TracingSink};
use super::{LogContext, LogLevels, LogPolicy};

/// Where records of an enabled severity go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkKind {
	/// Forward to `tracing`.
	#[default]
	Tracing,
	/// Info to stdout, warnings and errors to stderr.
	Console,
	/// Everything to stderr.
	ConsoleErr,
	/// Discard.
	Null,
}

impl SinkKind {
	/// Builds the sink this kind names.
	pub fn build(self) -> Arc<dyn LogSink> {
		match self {
			Self::Tracing => Arc::new(TracingSink),
			Self::Console => Arc::new(ConsoleSink::new()),
			Self::ConsoleErr => Arc::new(ConsoleSink::stderr()),
			Self::Null => Arc::new(NullSink),
		}
	}
}

/// A `[log]` settings section.
///
/// ```toml
/// info = false
/// sink = "console-err"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
	/// Log info messages.
	#[serde(default = "enabled")]
	pub info: bool,
	/// Log warnings.
	#[serde(default = "enabled")]
	pub warning: bool,
	/// Log errors.
	#[serde(default = "enabled")]
	pub error: bool,
	/// Destination of enabled records.
	#[serde(default)]
	pub sink: SinkKind,
}

fn enabled() -> bool {
	true
}

impl Default for LogConfig {
	fn default() -> Self {
		Self {
			info: enabled(),
			warning: enabled(),
			error: enabled(),
			sink: SinkKind::default(),
		}
	}
}

impl LogConfig {
	/// Severities this config enables.
	pub fn levels(&self) -> LogLevels {
		let mut levels = LogLevels::empty();
		levels.set(LogLevels::INFO, self.info);
		levels.set(LogLevels::WARNING, self.warning);
		levels.set(LogLevels::ERROR, self.error);
		levels
	}

	/// Policy this config describes.
	pub fn policy(&self) -> LogPolicy {
		LogPolicy::new(self.levels(), self.sink.build())
	}

	/// Makes a context built from this config the process-wide default log
	/// context, returning the previous default.
	pub fn install_default(&self) -> Arc<LogContext> {
		tracing::debug!(levels = ?self.levels(), sink = ?self.sink, "log.config.install_default");
		crate::stack::set_default(Arc::new(LogContext::from_config(self)))
	}
}
