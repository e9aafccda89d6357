//! Index-reflecting view over a table.
//!
//! Logical index `i` maps to delegate index `size - 1 - i`. Front and back
//! operations are swapped and `index_of` and `last_index_of` trade roles.
//! Traversal, removal, splitting, the equality policy and `clear` are not
//! positional and forward unchanged, in delegate order; walk the logical order
//! with [`TableService::do_while_reversed`].

use crate::comparator::ComparatorRef;
use crate::error::{Result, check_index, check_position};
use crate::service::{CollectionService, TableService};


/// Reverse view over exactly one delegate table.
#[derive(Debug)]
pub struct Reverse<T> {
	inner: T,
}

impl<T> Reverse<T> {
	/// Wraps `inner`.
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Returns the delegate.
	pub fn get_ref(&self) -> &T {
		&self.inner
	}

	/// Unwraps the view, returning the delegate.
	pub fn into_inner(self) -> T {
		self.inner
	}
}

impl<E, T> CollectionService<E> for Reverse<T>
where
	T: TableService<E>,
{
	/// Forwards to the delegate; `add` does not presuppose a position.
	fn add(&mut self, element: E) -> bool {
		self.inner.add(element)
	}

	fn do_while(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		self.inner.do_while(predicate)
	}

	fn remove_if(&mut self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		self.inner.remove_if(predicate)
	}

	fn comparator(&self) -> ComparatorRef<E> {
		self.inner.comparator()
	}

	fn try_split(&mut self, n: usize) -> Option<Vec<Self>> {
		let pieces = self.inner.try_split(n)?;
		Some(pieces.into_iter().map(Reverse::new).collect())
	}

	fn join(&mut self, pieces: Vec<Self>) {
		self.inner.join(pieces.into_iter().map(Reverse::into_inner).collect());
	}
}

impl<E, T> TableService<E> for Reverse<T>
where
	T: TableService<E>,
{
	fn size(&self) -> usize {
		self.inner.size()
	}

	fn get(&self, index: usize) -> Result<&E> {
		let size = self.size();
		check_index(index, size)?;
		self.inner.get(size - 1 - index)
	}

	fn set(&mut self, index: usize, element: E) -> Result<E> {
		let size = self.size();
		check_index(index, size)?;
		self.inner.set(size - 1 - index, element)
	}

	/// Inserting at logical `size` places the element at the delegate's front.
	fn insert(&mut self, index: usize, element: E) -> Result<()> {
		let size = self.size();
		check_position(index, size)?;
		self.inner.insert(size - index, element)
	}

	fn remove_at(&mut self, index: usize) -> Result<E> {
		let size = self.size();
		check_index(index, size)?;
		self.inner.remove_at(size - 1 - index)
	}

	fn clear(&mut self) {
		self.inner.clear();
	}

	fn add_first(&mut self, element: E) {
		self.inner.add_last(element);
	}

	fn add_last(&mut self, element: E) {
		self.inner.add_first(element);
	}

	fn peek_first(&self) -> Option<&E> {
		self.inner.peek_last()
	}

	fn peek_last(&self) -> Option<&E> {
		self.inner.peek_first()
	}

	fn poll_first(&mut self) -> Option<E> {
		self.inner.poll_last()
	}

	fn poll_last(&mut self) -> Option<E> {
		self.inner.poll_first()
	}

	fn index_of(&self, element: &E) -> Option<usize> {
		let size = self.size();
		self.inner.last_index_of(element).map(|found| size - 1 - found)
	}

	fn last_index_of(&self, element: &E) -> Option<usize> {
		let size = self.size();
		self.inner.index_of(element).map(|found| size - 1 - found)
	}

	/// Logical order: from logical index 0 (the delegate's back) forward.
	fn do_while_reversed(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		self.inner.do_while_reversed(predicate)
	}

	fn copy(&self) -> Self
	where
		E: Clone,
	{
		Reverse::new(self.inner.copy())
	}
}
