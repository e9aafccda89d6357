//! Destinations for log records.

use std::error::Error;
use std::fmt;
use std::io::Write;

use parking_lot::Mutex;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
	/// Informative message.
	Info,
	/// Something unexpected but recoverable.
	Warning,
	/// A failure.
	Error,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Error => "error",
		})
	}
}

/// A single severity-tagged record handed to a sink.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
	/// Severity of the record.
	pub severity: Severity,
	/// Message text, if any.
	pub message: Option<&'a str>,
	/// Associated failure, if any. Only error records carry one.
	pub error: Option<&'a (dyn Error + 'static)>,
}

impl<'a> LogRecord<'a> {
	/// Plain message record.
	pub fn message(severity: Severity, message: &'a str) -> Self {
		Self {
			severity,
			message: Some(message),
			error: None,
		}
	}

	/// Message if present, otherwise the error's own description.
	pub fn description(&self) -> String {
		match (self.message, self.error) {
			(Some(message), _) => message.to_owned(),
			(None, Some(error)) => error.to_string(),
			(None, None) => String::new(),
		}
	}

	/// Descriptions of the error's source chain, outermost first, excluding
	/// the error itself.
	pub fn causes(&self) -> Vec<String> {
		let mut causes = Vec::new();
		let mut source = self.error.and_then(Error::source);
		while let Some(error) = source {
			causes.push(error.to_string());
			source = error.source();
		}
		causes
	}
}

/// Accepts severity-tagged records; the transport is up to the implementation.
pub trait LogSink: Send + Sync + fmt::Debug {
	/// Delivers one record. Gating by severity has already happened.
	fn record(&self, record: &LogRecord<'_>);
}

/// Forwards records to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
	fn record(&self, record: &LogRecord<'_>) {
		let message = record.description();
		match (record.severity, record.error) {
			(Severity::Info, _) => tracing::info!("{message}"),
			(Severity::Warning, _) => tracing::warn!("{message}"),
			(Severity::Error, Some(error)) => tracing::error!(error = %error, "{message}"),
			(Severity::Error, None) => tracing::error!("{message}"),
		}
	}
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
	fn record(&self, _record: &LogRecord<'_>) {}
}

/// Writes `[severity] message` lines to the process console.
///
/// Warnings and errors go to stderr. Info goes to stdout unless the sink was
/// built with [`ConsoleSink::stderr`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
	info_to_stderr: bool,
}

impl ConsoleSink {
	/// Info to stdout, warnings and errors to stderr.
	pub fn new() -> Self {
		Self::default()
	}

	/// Every severity to stderr.
	pub fn stderr() -> Self {
		Self { info_to_stderr: true }
	}

	fn write_to(&self, out: &mut dyn Write, record: &LogRecord<'_>) -> std::io::Result<()> {
		write!(out, "[{}] ", record.severity)?;
		if record.message.is_some()
			&& let Some(error) = record.error
		{
			write!(out, "{error}: ")?;
		}
		writeln!(out, "{}", record.description())?;
		for cause in record.causes() {
			writeln!(out, "  caused by: {cause}")?;
		}
		out.flush()
	}
}

impl LogSink for ConsoleSink {
	fn record(&self, record: &LogRecord<'_>) {
		let result = if record.severity == Severity::Info && !self.info_to_stderr {
			self.write_to(&mut std::io::stdout().lock(), record)
		} else {
			self.write_to(&mut std::io::stderr().lock(), record)
		};
		if let Err(error) = result {
			tracing::debug!(%error, "log.console.write_failed");
		}
	}
}

/// A record captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLog {
	/// Severity of the record.
	pub severity: Severity,
	/// Message text, if any.
	pub message: Option<String>,
	/// Display text of the associated error, if any.
	pub error: Option<String>,
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
	records: Mutex<Vec<RecordedLog>>,
}

impl RecordingSink {
	/// Empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies of everything recorded so far.
	pub fn records(&self) -> Vec<RecordedLog> {
		self.records.lock().clone()
	}

	/// Removes and returns everything recorded so far.
	pub fn take(&self) -> Vec<RecordedLog> {
		std::mem::take(&mut *self.records.lock())
	}

	/// Number of records held.
	pub fn len(&self) -> usize {
		self.records.lock().len()
	}

	/// Whether nothing has been recorded.
	pub fn is_empty(&self) -> bool {
		self.records.lock().is_empty()
	}
}

impl LogSink for RecordingSink {
	fn record(&self, record: &LogRecord<'_>) {
		let recorded = RecordedLog {
			severity: record.severity,
			message: record.message.map(str::to_owned),
			error: record.error.map(ToString::to_string),
		};
		self.records.lock().push(recorded);
	}
}
