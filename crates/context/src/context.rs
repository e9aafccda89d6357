//! The context trait and per-kind default handles.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

/// Type-erasure helpers for resolving contexts by kind.
#[doc(hidden)]
pub trait AsAny: Any + Send + Sync {
	fn as_any(&self) -> &(dyn Any + Send + Sync);
	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
	fn as_any(&self) -> &(dyn Any + Send + Sync) {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

/// A dynamically scoped configuration object.
///
/// Contexts are entered onto the calling thread's scope stack with
/// [`crate::enter`] and resolved by kind with [`crate::current`] or
/// [`crate::find`]. A context's outer context is whatever was innermost
/// when it was entered.
pub trait Context: AsAny {
	/// Name used in diagnostics and errors.
	fn kind(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Process-wide shared instances cannot be entered; only per-call-site
	/// instances can.
	fn is_shared(&self) -> bool {
		false
	}

	/// Instance placed in a spawned task's snapshot.
	///
	/// `None` shares this instance with the task. Contexts holding mutable
	/// scope state return an independent copy so that writes on either side
	/// of the spawn stay on that side.
	fn fork(&self) -> Option<Arc<dyn Context>> {
		None
	}
}

/// A context kind with a process-wide fallback instance.
///
/// The fallback is used by [`crate::current`] when no context of the kind is
/// active on the calling thread.
pub trait DefaultContext: Context + Sized {
	/// The kind's default handle.
	fn defaults() -> &'static DefaultSlot<Self>;
}

/// Atomically swappable default instance of one context kind.
///
/// Initialized once on first use from the kind's built-in constructor, then
/// replaceable at any time. Readers on other threads see either the old or
/// the new instance, never a partial update.
pub struct DefaultSlot<C> {
	slot: OnceLock<ArcSwap<C>>,
	init: fn() -> Arc<C>,
}

impl<C> DefaultSlot<C> {
	/// Creates a slot whose first value comes from `init`.
	pub const fn new(init: fn() -> Arc<C>) -> Self {
		Self { slot: OnceLock::new(), init }
	}

	fn handle(&self) -> &ArcSwap<C> {
		self.slot.get_or_init(|| ArcSwap::new((self.init)()))
	}

	/// Current default instance.
	pub fn get(&self) -> Arc<C> {
		self.handle().load_full()
	}

	/// Replaces the default, returning the previous instance.
	pub fn replace(&self, context: Arc<C>) -> Arc<C> {
		self.handle().swap(context)
	}
}

impl<C> std::fmt::Debug for DefaultSlot<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DefaultSlot").field("initialized", &self.slot.get().is_some()).finish()
	}
}
