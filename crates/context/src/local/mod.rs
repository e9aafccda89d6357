//! Scoped references and the contexts that hold their overrides.
//!
//! A [`LocalReference`] has a process-wide default value. Setting it while a
//! [`LocalContext`] is active stores an override in the innermost local
//! context only; reads walk outward through the active local contexts and
//! take the first override found. Leaving the scope drops the override along
//! with the context.
//!
//! ```
//! use ambit_context::local::{LocalContext, LocalReference};
//!
//! let limit = LocalReference::new(10);
//! let scope = LocalContext::enter().unwrap();
//! limit.set(3).unwrap();
//! assert_eq!(*limit.get(), 3);
//! scope.exit();
//! assert_eq!(*limit.get(), 10);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::context::{AsAny, Context};
use crate::error::Result;
use crate::stack::{ScopeGuard, Stack, enter, with_stack};

#[cfg(test)]
mod tests;

/// Identity of a [`LocalReference`], unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(u64);

static NEXT_REFERENCE_ID: AtomicU64 = AtomicU64::new(0);

impl ReferenceId {
	fn next() -> Self {
		Self(NEXT_REFERENCE_ID.fetch_add(1, Ordering::Relaxed))
	}
}

type Value = Arc<dyn Any + Send + Sync>;

/// Context owning the overrides of scoped references set while it is innermost.
#[derive(Default)]
pub struct LocalContext {
	overrides: RwLock<FxHashMap<ReferenceId, Value>>,
}

impl LocalContext {
	/// Context with no overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Enters a fresh local context on the calling thread.
	pub fn enter() -> Result<ScopeGuard> {
		enter(Arc::new(Self::new()))
	}

	/// Number of references overridden in this context.
	pub fn len(&self) -> usize {
		self.overrides.read().len()
	}

	/// Whether no reference is overridden here.
	pub fn is_empty(&self) -> bool {
		self.overrides.read().is_empty()
	}

	fn lookup(&self, id: ReferenceId) -> Option<Value> {
		self.overrides.read().get(&id).cloned()
	}

	fn store(&self, id: ReferenceId, value: Value) {
		self.overrides.write().insert(id, value);
	}

	fn remove(&self, id: ReferenceId) -> bool {
		self.overrides.write().remove(&id).is_some()
	}
}

impl Context for LocalContext {
	fn kind(&self) -> &'static str {
		"LocalContext"
	}

	fn fork(&self) -> Option<Arc<dyn Context>> {
		let overrides = self.overrides.read().clone();
		Some(Arc::new(Self {
			overrides: RwLock::new(overrides),
		}))
	}
}

impl fmt::Debug for LocalContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalContext").field("overrides", &self.len()).finish()
	}
}

/// Local contexts of `stack`, innermost first.
fn local_contexts(stack: &Stack) -> impl Iterator<Item = &LocalContext> {
	stack
		.outward()
		.filter_map(|frame| AsAny::as_any(&**frame).downcast_ref::<LocalContext>())
}

/// A value cell whose effective value depends on the active local contexts.
pub struct LocalReference<T> {
	id: ReferenceId,
	default: ArcSwap<T>,
	overridden: AtomicBool,
}

impl<T: Send + Sync + 'static> LocalReference<T> {
	/// Reference whose default value is `value`.
	pub fn new(value: T) -> Self {
		Self {
			id: ReferenceId::next(),
			default: ArcSwap::from_pointee(value),
			overridden: AtomicBool::new(false),
		}
	}

	/// Key of this reference's overrides.
	pub fn id(&self) -> ReferenceId {
		self.id
	}

	/// Whether an override was ever stored, in any context on any thread.
	pub fn has_been_overridden(&self) -> bool {
		self.overridden.load(Ordering::Acquire)
	}

	/// Effective value: the nearest override, or the default.
	///
	/// Behaves as if no scope were active once the thread's scope storage is
	/// torn down.
	pub fn get(&self) -> Arc<T> {
		self.try_get().unwrap_or_else(|_| self.get_default())
	}

	/// Effective value; fails with [`crate::ContextError::Unavailable`] once
	/// the thread's scope storage is torn down.
	pub fn try_get(&self) -> Result<Arc<T>> {
		if !self.has_been_overridden() {
			return Ok(self.get_default());
		}
		let found = with_stack(|stack| local_contexts(stack).find_map(|context| context.lookup(self.id)))?;
		Ok(found.and_then(downcast).unwrap_or_else(|| self.get_default()))
	}

	/// Override held by the innermost local context, without walking outward;
	/// the default when there is no local context or it holds no override.
	pub fn get_local(&self) -> Result<Arc<T>> {
		let found = with_stack(|stack| local_contexts(stack).next().and_then(|context| context.lookup(self.id)))?;
		Ok(found.and_then(downcast).unwrap_or_else(|| self.get_default()))
	}

	/// Overrides the value in the innermost local context, or replaces the
	/// default when no local context is active.
	pub fn set(&self, value: T) -> Result<()> {
		let value = Arc::new(value);
		let stored = with_stack(|stack| match local_contexts(stack).next() {
			Some(context) => {
				self.overridden.store(true, Ordering::Release);
				context.store(self.id, value.clone());
				true
			}
			None => false,
		})?;
		if stored {
			tracing::trace!(reference = self.id.0, "local.set_override");
		} else {
			self.default.store(value);
		}
		Ok(())
	}

	/// Drops the innermost local context's override, returning whether one
	/// was present. Outer overrides become visible again.
	pub fn clear_local(&self) -> Result<bool> {
		with_stack(|stack| {
			local_contexts(stack)
				.next()
				.is_some_and(|context| context.remove(self.id))
		})
	}

	/// Default value, ignoring active scopes.
	pub fn get_default(&self) -> Arc<T> {
		self.default.load_full()
	}

	/// Replaces the default value, ignoring active scopes.
	pub fn set_default(&self, value: T) {
		self.default.store(Arc::new(value));
	}
}

fn downcast<T: Send + Sync + 'static>(value: Value) -> Option<Arc<T>> {
	value.downcast::<T>().ok()
}

impl<T: Default + Send + Sync + 'static> Default for LocalReference<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug> fmt::Debug for LocalReference<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalReference")
			.field("id", &self.id)
			.field("default", &self.default.load_full())
			.field("overridden", &self.overridden.load(Ordering::Relaxed))
			.finish()
	}
}
