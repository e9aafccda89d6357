//! Scope inheritance across thread and task spawns.
//!
//! A spawned thread or task starts from an explicit [`ContextSnapshot`] of
//! the spawning thread's scopes, taken inside the spawn call. The snapshot is
//! a copy: scopes entered or exited afterwards on either side are invisible
//! to the other, and contexts with mutable scope state are forked.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use pin_project_lite::pin_project;
use tokio::task::JoinHandle;

use crate::stack::{Stack, replace_stack, with_stack};


/// Independent copy of a logical thread's scope stack.
#[derive(Debug, Clone, Default)]
pub struct ContextSnapshot {
	stack: Stack,
}

impl ContextSnapshot {
	/// Copies the calling thread's active scopes.
	///
	/// Yields an empty snapshot once the thread's scope storage is torn down.
	pub fn capture() -> Self {
		let frames = with_stack(|stack| stack.clone()).unwrap_or_default();
		// Forking runs context code, so it happens outside the stack borrow.
		let stack = frames.fork();
		tracing::trace!(depth = stack.depth(), "context.snapshot.capture");
		Self { stack }
	}

	/// Snapshot with no active scope.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Number of scopes in the snapshot.
	pub fn depth(&self) -> usize {
		self.stack.depth()
	}

	/// Runs `f` with this snapshot as the calling thread's scope stack,
	/// restoring the previous stack afterwards (also on panic).
	pub fn run<R>(self, f: impl FnOnce() -> R) -> R {
		let depth = self.stack.depth();
		let Ok(previous) = replace_stack(self.stack) else {
			return f();
		};
		let _restore = Restore {
			previous: Some(previous),
			depth,
		};
		f()
	}

	/// Wraps `future` so every poll sees this snapshot as its scope stack.
	///
	/// Scopes entered and exited inside the future persist across its
	/// suspension points and never leak onto the polling thread.
	pub fn scope<F: Future>(self, future: F) -> Scoped<F> {
		Scoped {
			stack: Some(self.stack),
			future,
		}
	}
}

/// Puts a thread's own stack back when dropped.
struct Restore {
	previous: Option<Stack>,
	depth: usize,
}

impl Drop for Restore {
	fn drop(&mut self) {
		if let Some(previous) = self.previous.take() {
			let Ok(snapshot) = replace_stack(previous) else {
				return;
			};
			if snapshot.depth() != self.depth {
				tracing::warn!(
					expected = self.depth,
					found = snapshot.depth(),
					"context.snapshot.unbalanced_scopes"
				);
			}
		}
	}
}

pin_project! {
	/// Future running inside a scope snapshot; see [`ContextSnapshot::scope`].
	#[derive(Debug)]
	pub struct Scoped<F> {
		stack: Option<Stack>,
		#[pin]
		future: F,
	}
}

impl<F: Future> Future for Scoped<F> {
	type Output = F::Output;

	fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<F::Output> {
		let this = self.project();
		let task_stack = this.stack.take().unwrap_or_default();
		let Ok(thread_stack) = replace_stack(task_stack) else {
			return this.future.poll(cx);
		};
		let _swap = SwapBack {
			thread_stack: Some(thread_stack),
			task_stack: this.stack,
		};
		this.future.poll(cx)
	}
}

/// Returns the task's stack to its future and the thread's stack to the thread.
struct SwapBack<'a> {
	thread_stack: Option<Stack>,
	task_stack: &'a mut Option<Stack>,
}

impl Drop for SwapBack<'_> {
	fn drop(&mut self) {
		if let Some(thread_stack) = self.thread_stack.take() {
			*self.task_stack = replace_stack(thread_stack).ok();
		}
	}
}

/// Spawns a Tokio task that inherits a snapshot of the calling thread's scopes.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime, like [`tokio::spawn`].
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let snapshot = ContextSnapshot::capture();
	tracing::trace!(depth = snapshot.depth(), "context.spawn");
	tokio::spawn(snapshot.scope(future))
}

/// Spawns blocking work on Tokio's blocking pool with inherited scopes.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let snapshot = ContextSnapshot::capture();
	tracing::trace!(depth = snapshot.depth(), "context.spawn_blocking");
	tokio::task::spawn_blocking(move || snapshot.run(f))
}

/// Spawns an OS thread that inherits a snapshot of the calling thread's scopes.
pub fn spawn_thread<F, R>(f: F) -> std::thread::JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let snapshot = ContextSnapshot::capture();
	tracing::trace!(depth = snapshot.depth(), "context.spawn_thread");
	std::thread::spawn(move || snapshot.run(f))
}

/// Spawns a named OS thread that inherits a snapshot of the calling thread's scopes.
pub fn spawn_named_thread<F, R>(name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let snapshot = ContextSnapshot::capture();
	tracing::trace!(depth = snapshot.depth(), "context.spawn_named_thread");
	std::thread::Builder::new().name(name.into()).spawn(move || snapshot.run(f))
}
