//! Error types for scope management.

use thiserror::Error;

/// Errors raised when entering, exiting or resolving scopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
	/// A process-wide shared context was entered directly.
	#[error("unsupported operation: shared context {kind} cannot be directly entered")]
	SharedInstance {
		/// Type name of the rejected context.
		kind: &'static str,
	},

	/// A scope was exited while it was not the innermost one.
	#[error("scope violation: exiting {exiting} while the innermost scope is {innermost}")]
	ScopeViolation {
		/// Type name of the context being exited.
		exiting: &'static str,
		/// Type name of the actual innermost context.
		innermost: &'static str,
	},

	/// An exit was attempted with no scope active on this thread.
	#[error("scope violation: no active scope to exit")]
	NoActiveScope,

	/// A guard was exited a second time.
	#[error("scope violation: {kind} scope was already exited")]
	AlreadyExited {
		/// Type name of the guard's context.
		kind: &'static str,
	},

	/// Scope storage for this thread has already been torn down.
	#[error("context storage unavailable: thread is shutting down")]
	Unavailable,
}

/// Result type for scope operations.
pub type Result<T> = std::result::Result<T, ContextError>;
