//! Per-logical-thread stack of active scopes.
//!
//! # Invariants
//!
//! - Scopes nest strictly LIFO: a scope is exited only while it is the
//!   innermost one. A violation is reported, never silently repaired.
//! - A scope is exited only through the guard its `enter` returned. Frames
//!   are matched by a per-push token, so re-entering the same instance never
//!   lets an older guard pop the newer scope.
//! - The stack is never borrowed across calls into user code.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::context::{AsAny, Context, DefaultContext};
use crate::copy::Copyable;
use crate::error::{ContextError, Result};


/// Identifies one push. Guards hold the token of the frame they pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token(u64);

impl Token {
	/// Carried by frames copied into a snapshot; no guard holds it.
	const INHERITED: Self = Self(0);

	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

#[derive(Clone)]
struct Frame {
	context: Arc<dyn Context>,
	token: Token,
}

/// Ordered active scopes, outermost first.
#[derive(Clone, Default)]
pub(crate) struct Stack {
	frames: SmallVec<[Frame; 4]>,
}

impl Stack {
	pub(crate) fn depth(&self) -> usize {
		self.frames.len()
	}

	/// Contexts from innermost to outermost.
	pub(crate) fn outward(&self) -> impl DoubleEndedIterator<Item = &Arc<dyn Context>> {
		self.frames.iter().rev().map(|frame| &frame.context)
	}

	/// Copy suitable for another logical thread.
	pub(crate) fn fork(&self) -> Self {
		Self {
			frames: self
				.frames
				.iter()
				.map(|frame| Frame {
					context: frame.context.fork().unwrap_or_else(|| Arc::clone(&frame.context)),
					token: Token::INHERITED,
				})
				.collect(),
		}
	}
}

impl std::fmt::Debug for Stack {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.outward().rev().map(|context| context.kind())).finish()
	}
}

thread_local! {
	static STACK: RefCell<Stack> = RefCell::new(Stack::default());
}

/// Runs `f` against the calling thread's stack.
pub(crate) fn with_stack<R>(f: impl FnOnce(&mut Stack) -> R) -> Result<R> {
	STACK.try_with(|stack| f(&mut stack.borrow_mut())).map_err(|_| ContextError::Unavailable)
}

/// Installs `stack` as the calling thread's stack, returning the previous one.
pub(crate) fn replace_stack(stack: Stack) -> Result<Stack> {
	with_stack(|current| std::mem::replace(current, stack))
}

/// Nearest active context of kind `C`, walking outward from the innermost scope.
pub fn find<C: Context>() -> Result<Option<Arc<C>>> {
	with_stack(|stack| {
		stack
			.outward()
			.find(|frame| AsAny::as_any(&***frame).is::<C>())
			.and_then(|frame| AsAny::into_any(Arc::clone(frame)).downcast::<C>().ok())
	})
}

/// Nearest active context of kind `C`, or the kind's default when none is active.
///
/// Fails only with [`ContextError::Unavailable`].
pub fn try_current<C: DefaultContext>() -> Result<Arc<C>> {
	Ok(find::<C>()?.unwrap_or_else(|| C::defaults().get()))
}

/// Nearest active context of kind `C`, or the kind's default.
///
/// After the thread's scope storage is torn down this resolves to the
/// default, as if no scope were active.
pub fn current<C: DefaultContext>() -> Arc<C> {
	try_current::<C>().unwrap_or_else(|_| C::defaults().get())
}

/// Default instance of kind `C`, ignoring active scopes.
pub fn default_of<C: DefaultContext>() -> Arc<C> {
	C::defaults().get()
}

/// Replaces the default instance of kind `C` for every thread, returning the
/// previous default.
pub fn set_default<C: DefaultContext>(context: Arc<C>) -> Arc<C> {
	tracing::debug!(kind = context.kind(), "context.set_default");
	C::defaults().replace(context)
}

/// Number of scopes active on the calling thread.
pub fn depth() -> Result<usize> {
	with_stack(|stack| stack.depth())
}

/// Pushes `context` as the innermost scope of the calling thread.
///
/// Shared instances are rejected with [`ContextError::SharedInstance`]. The
/// scope lasts until the returned guard is exited or dropped.
pub fn enter<C: Context>(context: Arc<C>) -> Result<ScopeGuard> {
	enter_dyn(context)
}

/// Type-erased form of [`enter`].
pub fn enter_dyn(context: Arc<dyn Context>) -> Result<ScopeGuard> {
	if context.is_shared() {
		tracing::warn!(kind = context.kind(), "context.enter.rejected_shared");
		return Err(ContextError::SharedInstance { kind: context.kind() });
	}
	let token = Token::next();
	let depth = with_stack(|stack| {
		stack.frames.push(Frame {
			context: Arc::clone(&context),
			token,
		});
		stack.depth()
	})?;
	tracing::trace!(kind = context.kind(), depth, "context.enter");
	Ok(ScopeGuard {
		context,
		token,
		exited: false,
		_not_send: PhantomData,
	})
}

/// Exits the scope `guard` entered, which must be the innermost active scope.
///
/// On mismatch the stack and the guard are left untouched and
/// [`ContextError::ScopeViolation`] (or [`ContextError::NoActiveScope`]) is
/// returned; see [`ScopeGuard::try_exit`].
pub fn exit(guard: &mut ScopeGuard) -> Result<()> {
	guard.try_exit()
}

fn pop(context: &dyn Context, token: Token) -> Result<()> {
	let (popped, depth) = with_stack(|stack| {
		let innermost = stack.frames.last().ok_or(ContextError::NoActiveScope)?;
		if innermost.token != token {
			return Err(ContextError::ScopeViolation {
				exiting: context.kind(),
				innermost: innermost.context.kind(),
			});
		}
		Ok((stack.frames.pop(), stack.depth()))
	})??;
	// Dropped outside the stack borrow.
	drop(popped);
	tracing::trace!(kind = context.kind(), depth, "context.exit");
	Ok(())
}

/// An entered scope; exits it when dropped.
///
/// Guards belong to the thread that created them. Exiting a guard whose scope
/// is not innermost panics: the LIFO discipline is a programmer contract.
#[must_use = "dropping the guard exits the scope immediately"]
pub struct ScopeGuard {
	context: Arc<dyn Context>,
	token: Token,
	exited: bool,
	_not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
	/// The context this guard keeps active.
	pub fn context(&self) -> &Arc<dyn Context> {
		&self.context
	}

	/// Exits the scope.
	///
	/// # Panics
	///
	/// Panics if this scope is not the innermost one on the calling thread.
	pub fn exit(self) {
		drop(self);
	}

	/// Exits the scope, reporting a violation instead of panicking.
	///
	/// On error the stack is left untouched and the guard stays armed, so it
	/// can be exited once the scopes nested inside it are gone. A guard that
	/// already exited fails with [`ContextError::AlreadyExited`].
	pub fn try_exit(&mut self) -> Result<()> {
		if self.exited {
			return Err(ContextError::AlreadyExited { kind: self.context.kind() });
		}
		pop(&*self.context, self.token)?;
		self.exited = true;
		Ok(())
	}

	/// Delivers `value` to the enclosing scope as an independent copy.
	pub fn export<T: Copyable>(&self, value: &T) -> T {
		tracing::trace!(kind = self.context.kind(), "context.export");
		value.copy()
	}
}

impl Drop for ScopeGuard {
	fn drop(&mut self) {
		if self.exited {
			return;
		}
		match pop(&*self.context, self.token) {
			Ok(()) | Err(ContextError::Unavailable) => {}
			Err(error) if std::thread::panicking() => {
				tracing::error!(%error, "context.exit.violation_during_unwind");
			}
			Err(error) => {
				tracing::error!(%error, "context.exit.violation");
				panic!("{error}");
			}
		}
	}
}

impl std::fmt::Debug for ScopeGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScopeGuard").field("kind", &self.context.kind()).finish()
	}
}

/// Runs `f` inside a fresh scope of `context`, exiting it afterwards.
pub fn within<C: Context, R>(context: Arc<C>, f: impl FnOnce(&ScopeGuard) -> R) -> Result<R> {
	let guard = enter(context)?;
	let result = f(&guard);
	guard.exit();
	Ok(result)
}
