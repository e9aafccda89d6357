//! Lock-guarded view allowing concurrent reads and serialized writes.
//!
//! # Consistency
//!
//! Locks are held for the duration of a single call, never across calls.
//! Mutations (`add`, `remove_if`, cursor removal) take the write lock;
//! traversal, comparator lookup and each cursor step take the read lock.
//! Every individual operation is therefore atomic with respect to writers,
//! but a multi-call sequence such as an iteration may observe writes that
//! land between its calls. There is no snapshot isolation; a caller needing
//! a stable view should copy the delegate inside one [`Shared::read`] call.
//!
//! # Splitting
//!
//! Pieces produced by [`Shared::try_split`] are re-wrapped with the parent's
//! lock pair, so writes to any piece serialize against writes to every other
//! piece from the same origin.
//!
//! While pieces are out, the origin is closed: its own operations block until
//! [`Shared::join`] has put the elements back, so a concurrent reader sees the
//! origin either before the split or after the join, never emptied. Calling
//! the origin from the thread that holds the pieces, before joining them,
//! deadlocks. Dropping the pieces without joining reopens the origin without
//! their elements.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::comparator::ComparatorRef;
use crate::error::{CollectionError, Result};
use crate::service::{CollectionService, TableService};

#[cfg(test)]
mod tests;

/// Read/write lock pair shared by a root shared view and all of its splits.
///
/// Reads are recursive so a traversal callback may read the same view again;
/// a callback that writes to the view it is traversing deadlocks.
#[derive(Debug, Clone, Default)]
struct LockPair(Arc<RwLock<()>>);

impl LockPair {
	fn read(&self) -> RwLockReadGuard<'_, ()> {
		self.0.read_recursive()
	}

	fn write(&self) -> RwLockWriteGuard<'_, ()> {
		self.0.write()
	}
}

/// Closed while a view's elements are out in split pieces.
///
/// Only closed under the write side of the lock pair, so a holder of either
/// side sees a stable state.
#[derive(Debug, Default)]
struct SplitGate {
	closed: Mutex<bool>,
	opened: Condvar,
}

impl SplitGate {
	fn is_closed(&self) -> bool {
		*self.closed.lock()
	}

	fn close(&self) {
		*self.closed.lock() = true;
	}

	fn open(&self) {
		*self.closed.lock() = false;
		self.opened.notify_all();
	}

	fn wait_open(&self) {
		let mut closed = self.closed.lock();
		while *closed {
			self.opened.wait(&mut closed);
		}
	}
}

/// Held by every piece of one split; reopens the origin once the last piece
/// is joined or dropped.
#[derive(Debug)]
struct SplitTicket(Arc<SplitGate>);

impl Drop for SplitTicket {
	fn drop(&mut self) {
		self.0.open();
	}
}

/// Concurrent view over one delegate collection.
///
/// The delegate also sits behind its own lock so the view is `Sync`; that
/// lock is only ever taken while the shared pair is held in the same mode.
#[derive(Debug)]
pub struct Shared<C> {
	locks: LockPair,
	gate: Arc<SplitGate>,
	ticket: Option<Arc<SplitTicket>>,
	delegate: RwLock<C>,
}

impl<C> Shared<C> {
	/// Wraps `delegate` with a fresh lock pair.
	pub fn new(delegate: C) -> Self {
		Self::piece(delegate, LockPair::default(), None)
	}

	fn piece(delegate: C, locks: LockPair, ticket: Option<Arc<SplitTicket>>) -> Self {
		Self {
			locks,
			gate: Arc::default(),
			ticket,
			delegate: RwLock::new(delegate),
		}
	}

	/// Returns `true` if both views serialize against the same lock pair.
	pub fn shares_locks_with(&self, other: &Shared<C>) -> bool {
		Arc::ptr_eq(&self.locks.0, &other.locks.0)
	}

	/// Runs `f` against the delegate under the read lock.
	///
	/// Blocks while this view's elements are out in split pieces.
	pub fn read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
		loop {
			let read = self.locks.read();
			if !self.gate.is_closed() {
				return f(&self.delegate.read_recursive());
			}
			drop(read);
			self.gate.wait_open();
		}
	}

	/// Runs `f` against the delegate under the write lock.
	///
	/// Blocks while this view's elements are out in split pieces.
	pub fn write<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
		loop {
			let write = self.locks.write();
			if !self.gate.is_closed() {
				return f(&mut self.delegate.write());
			}
			drop(write);
			self.gate.wait_open();
		}
	}

	/// Unwraps the view, returning the delegate.
	pub fn into_inner(self) -> C {
		self.delegate.into_inner()
	}

	/// Inserts under the write lock.
	pub fn add<E>(&self, element: E) -> bool
	where
		C: CollectionService<E>,
	{
		self.write(|delegate| delegate.add(element))
	}

	/// Traverses under the read lock, held for this call only.
	pub fn do_while<E>(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool
	where
		C: CollectionService<E>,
	{
		self.read(|delegate| delegate.do_while(predicate))
	}

	/// Removes matching elements under the write lock.
	pub fn remove_if<E>(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool
	where
		C: CollectionService<E>,
	{
		self.write(|delegate| delegate.remove_if(predicate))
	}

	/// Delegate's comparator, looked up under the read lock.
	pub fn comparator<E>(&self) -> ComparatorRef<E>
	where
		C: CollectionService<E>,
	{
		self.read(|delegate| delegate.comparator())
	}

	/// Splits the delegate; each piece keeps this view's lock pair.
	///
	/// This view stays closed until the pieces are joined back. A refusal
	/// from the delegate is propagated unchanged.
	pub fn try_split<E>(&self, n: usize) -> Option<Vec<Self>>
	where
		C: CollectionService<E>,
	{
		let pieces = self.write(|delegate| {
			let pieces = delegate.try_split(n)?;
			self.gate.close();
			Some(pieces)
		})?;
		tracing::trace!(pieces = pieces.len(), "collection.shared.split");
		let ticket = Arc::new(SplitTicket(Arc::clone(&self.gate)));
		Some(
			pieces
				.into_iter()
				.map(|piece| Self::piece(piece, self.locks.clone(), Some(Arc::clone(&ticket))))
				.collect(),
		)
	}

	/// Hands split pieces back to the delegate under the write lock, then
	/// reopens this view.
	pub fn join<E>(&self, pieces: Vec<Self>)
	where
		C: CollectionService<E>,
	{
		// Joining bypasses the gate it is about to reopen.
		let _write = self.locks.write();
		let mut tickets = Vec::with_capacity(pieces.len());
		let delegates = pieces
			.into_iter()
			.map(|piece| {
				tickets.push(piece.ticket);
				piece.delegate.into_inner()
			})
			.collect();
		self.delegate.write().join(delegates);
		// Waiters wake here but only get through once `_write` is released.
		drop(tickets);
	}

	/// Positional cursor locking per step.
	pub fn iter<E>(&self) -> SharedIter<'_, E, C>
	where
		C: TableService<E>,
		E: Clone,
	{
		SharedIter {
			shared: self,
			cursor: 0,
			last: None,
			_element: PhantomData,
		}
	}
}

impl<E, C> CollectionService<E> for Shared<C>
where
	C: CollectionService<E>,
{
	fn add(&mut self, element: E) -> bool {
		Shared::add::<E>(self, element)
	}

	fn do_while(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		Shared::do_while::<E>(self, predicate)
	}

	fn remove_if(&mut self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		Shared::remove_if::<E>(self, predicate)
	}

	fn comparator(&self) -> ComparatorRef<E> {
		Shared::comparator::<E>(self)
	}

	fn try_split(&mut self, n: usize) -> Option<Vec<Self>> {
		Shared::try_split::<E>(self, n)
	}

	fn join(&mut self, pieces: Vec<Self>) {
		Shared::join::<E>(self, pieces);
	}
}

/// Cursor over a shared table.
///
/// `has_next` and each `next` take the read lock for that step alone; `remove`
/// takes the write lock. Concurrent writers may shift elements between steps,
/// so a cursor can skip or revisit elements; it never observes a half-applied
/// mutation.
#[derive(Debug)]
pub struct SharedIter<'a, E, C> {
	shared: &'a Shared<C>,
	cursor: usize,
	last: Option<usize>,
	_element: PhantomData<fn() -> E>,
}

impl<E, C> SharedIter<'_, E, C>
where
	C: TableService<E>,
	E: Clone,
{
	/// Returns `true` if a further element is currently available.
	pub fn has_next(&self) -> bool {
		self.shared.read(|delegate| self.cursor < delegate.size())
	}

	/// Removes the element last returned by `next`.
	pub fn remove(&mut self) -> Result<E> {
		let index = self.last.take().ok_or(CollectionError::IllegalState("remove called without a preceding next"))?;
		let removed = self.shared.write(|delegate| delegate.remove_at(index))?;
		self.cursor = index;
		Ok(removed)
	}
}

impl<E, C> Iterator for SharedIter<'_, E, C>
where
	C: TableService<E>,
	E: Clone,
{
	type Item = E;

	fn next(&mut self) -> Option<E> {
		let element = self.shared.read(|delegate| delegate.get(self.cursor).ok().cloned())?;
		self.last = Some(self.cursor);
		self.cursor += 1;
		Some(element)
	}
}
