use std::fmt;
use std::sync::Arc;

use serial_test::serial;

use super::*;
use crate::error::ContextError;
use crate::stack::{enter, within};

#[derive(Debug)]
struct DiskFull;

impl fmt::Display for DiskFull {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("disk full")
	}
}

impl Error for DiskFull {}

#[derive(Debug)]
struct SaveFailed(DiskFull);

impl fmt::Display for SaveFailed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("save failed")
	}
}

impl Error for SaveFailed {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		Some(&self.0)
	}
}

fn recording(levels: LogLevels) -> (Arc<RecordingSink>, Arc<LogContext>) {
	let sink = Arc::new(RecordingSink::new());
	let context = Arc::new(LogContext::new(LogPolicy::new(levels, sink.clone())));
	(sink, context)
}

#[test]
fn suppressing_context_logs_nothing() {
	let (sink, context) = recording(LogLevels::empty());
	assert!(!context.is_info_logged());
	assert!(!context.is_warning_logged());
	assert!(!context.is_error_logged());

	within(context, |_| {
		info("a");
		warning("b");
		error_message("c");
		error(&DiskFull);
	})
	.unwrap();

	assert!(sink.is_empty());
}

#[test]
fn info_gated_context_keeps_warnings_and_errors() {
	let (sink, context) = recording(LogLevels::WARNING | LogLevels::ERROR);
	assert!(!context.is_info_logged());
	assert!(context.is_warning_logged());
	assert!(context.is_error_logged());

	within(context, |_| {
		info("dropped");
		warning("kept");
		error_message("also kept");
	})
	.unwrap();

	let severities: Vec<_> = sink.records().into_iter().map(|record| record.severity).collect();
	assert_eq!(severities, [Severity::Warning, Severity::Error]);
}

#[test]
fn messages_reach_the_sink_as_plain_records() {
	let (sink, context) = recording(LogLevels::INFO | LogLevels::WARNING);
	assert_eq!(context.levels(), LogLevels::INFO | LogLevels::WARNING);
	assert!(context.is_logged(Severity::Info));
	assert!(!context.is_logged(Severity::Error));

	within(context, |_| {
		info("starting");
		warning("slow");
	})
	.unwrap();

	assert_eq!(
		sink.take(),
		[
			RecordedLog {
				severity: Severity::Info,
				message: Some("starting".to_owned()),
				error: None,
			},
			RecordedLog {
				severity: Severity::Warning,
				message: Some("slow".to_owned()),
				error: None,
			},
		]
	);
	assert_eq!(Severity::Warning.to_string(), "warning");
}

#[test]
fn error_records_carry_message_and_failure() {
	let (sink, context) = recording(LogLevels::all());
	let guard = enter(context).unwrap();
	error(&DiskFull);
	error_with_message(&DiskFull, "while saving");
	error_message("plain");
	guard.exit();

	let records = sink.take();
	assert_eq!(
		records,
		[
			RecordedLog {
				severity: Severity::Error,
				message: None,
				error: Some("disk full".into()),
			},
			RecordedLog {
				severity: Severity::Error,
				message: Some("while saving".into()),
				error: Some("disk full".into()),
			},
			RecordedLog {
				severity: Severity::Error,
				message: Some("plain".into()),
				error: None,
			},
		]
	);
	assert!(sink.is_empty());
}

#[test]
fn innermost_log_context_wins() {
	let (outer_sink, outer) = recording(LogLevels::all());
	let (inner_sink, inner) = recording(LogLevels::all());

	let outer_guard = enter(outer).unwrap();
	info("to outer");
	let inner_guard = enter(inner).unwrap();
	info("to inner");
	inner_guard.exit();
	info("to outer again");
	outer_guard.exit();

	assert_eq!(outer_sink.len(), 2);
	assert_eq!(inner_sink.records()[0].message.as_deref(), Some("to inner"));
}

#[test]
fn built_ins_cannot_be_entered() {
	for built_in in [LogContext::standard(), LogContext::null(), LogContext::system(), LogContext::system_err()] {
		assert!(matches!(enter(built_in), Err(ContextError::SharedInstance { .. })));
	}
}

#[test]
fn built_in_policies() {
	assert_eq!(LogContext::standard().levels(), LogLevels::all());
	assert_eq!(LogContext::null().levels(), LogLevels::empty());
	assert_eq!(LogContext::system().levels(), LogLevels::all());
	assert_eq!(LogContext::system_err().levels(), LogLevels::WARNING | LogLevels::ERROR);
	assert!(Arc::ptr_eq(&LogContext::null(), &LogContext::null()));
}

#[test]
fn scoped_copy_of_built_in_is_enterable() {
	let quiet = Arc::new(LogContext::null().scoped());
	let guard = enter(quiet).unwrap();
	assert!(!current().is_error_logged());
	guard.exit();
}

#[test]
#[serial]
fn default_applies_without_scope() {
	let (sink, context) = recording(LogLevels::INFO);
	let previous = set_default(context);

	info("through default");
	warning("gated");
	let other_thread = std::thread::spawn(|| current().levels()).join().unwrap();

	set_default(previous);
	assert_eq!(sink.len(), 1);
	assert_eq!(other_thread, LogLevels::INFO);
}

#[test]
#[serial]
fn standard_is_initial_default() {
	assert!(Arc::ptr_eq(&crate::stack::default_of::<LogContext>(), &LogContext::standard()));
}

#[test]
fn record_describes_source_chain() {
	let failure = SaveFailed(DiskFull);
	let record = LogRecord {
		severity: Severity::Error,
		message: None,
		error: Some(&failure),
	};
	assert_eq!(record.description(), "save failed");
	assert_eq!(record.causes(), ["disk full"]);
}

#[test]
fn config_defaults_enable_everything() {
	let config: LogConfig = toml::from_str("").unwrap();
	assert_eq!(config, LogConfig::default());
	assert_eq!(config.levels(), LogLevels::all());
	assert_eq!(config.sink, SinkKind::Tracing);
}

#[test]
fn config_parses_levels_and_sink() {
	let config: LogConfig = toml::from_str(
		r#"
		info = false
		sink = "console-err"
		"#,
	)
	.unwrap();
	assert_eq!(config.levels(), LogLevels::WARNING | LogLevels::ERROR);
	assert_eq!(config.sink, SinkKind::ConsoleErr);

	let context = LogContext::from_config(&config);
	assert!(!context.is_shared());
	assert!(!context.is_info_logged());
}

#[test]
fn config_rejects_unknown_keys() {
	assert!(toml::from_str::<LogConfig>("verbose = true").is_err());
	assert!(toml::from_str::<LogConfig>(r#"sink = "syslog""#).is_err());
}

#[test]
#[serial]
fn install_default_swaps_process_default() {
	let config = LogConfig {
		sink: SinkKind::Null,
		..LogConfig::default()
	};
	let previous = config.install_default();
	assert!(!current().is_shared());
	assert_eq!(current().levels(), LogLevels::all());
	set_default(previous);
}
