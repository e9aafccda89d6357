//! Nested, dynamically scoped contexts.
//!
//! Every thread keeps a stack of active contexts. [`enter`] pushes one and
//! returns a [`ScopeGuard`] that pops it; [`current`] resolves the innermost
//! context of a kind, falling back to the kind's process-wide default.
//!
//! ```
//! use std::sync::Arc;
//! use ambit_context::{Context, enter, find};
//!
//! #[derive(Debug)]
//! struct Tenant(&'static str);
//! impl Context for Tenant {}
//!
//! let scope = enter(Arc::new(Tenant("acme"))).unwrap();
//! assert_eq!(find::<Tenant>().unwrap().map(|tenant| tenant.0), Some("acme"));
//! scope.exit();
//! assert!(find::<Tenant>().unwrap().is_none());
//! ```
//!
//! Scopes are inherited by spawned work only through an explicit
//! [`ContextSnapshot`], taken by the `spawn*` helpers.

#![warn(missing_docs)]

/// Context trait and default handles.
pub mod context;
/// Explicit value copies across scopes.
pub mod copy;
/// Error types.
pub mod error;
/// Scoped references.
pub mod local;
/// Context-routed logging.
pub mod log;
/// Snapshots and scope-inheriting spawns.
pub mod spawn;
mod stack;

pub use context::{Context, DefaultContext, DefaultSlot};
pub use copy::Copyable;
pub use error::{ContextError, Result};
pub use local::{LocalContext, LocalReference, ReferenceId};
pub use log::LogContext;
pub use spawn::{ContextSnapshot, Scoped, spawn, spawn_blocking, spawn_named_thread, spawn_thread};
pub use stack::{ScopeGuard, current, default_of, depth, enter, enter_dyn, exit, find, set_default, try_current, within};
