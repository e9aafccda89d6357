//! The capability traits every backing sequence and view implements.

use crate::comparator::ComparatorRef;
use crate::error::{CollectionError, Result};

/// Minimal capability set a sequence exposes to the views wrapping it.
///
/// `do_while` is the single traversal primitive; `for_each`, `any_match`,
/// `all_match`, `contains` and `count` are all derived from it. Splitting is a
/// negotiation: `None` from [`Self::try_split`] means "process sequentially"
/// and is never a fault.
pub trait CollectionService<E> {
	/// Inserts an element, returning whether the collection changed.
	fn add(&mut self, element: E) -> bool;

	/// Applies `predicate` to each element in order, stopping at the first
	/// `false`. Returns `true` iff the traversal was not cut short.
	fn do_while(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool;

	/// Removes every element matching `predicate`; returns whether any was removed.
	fn remove_if(&mut self, predicate: &mut dyn FnMut(&E) -> bool) -> bool;

	/// Equality and ordering policy used for membership queries.
	fn comparator(&self) -> ComparatorRef<E>;

	/// Partitions the elements into at most `n` independent pieces.
	///
	/// On success the pieces own every element, in order, and `self` is left
	/// empty until [`Self::join`] hands them back. Returns `None` when the
	/// collection cannot currently be split.
	fn try_split(&mut self, n: usize) -> Option<Vec<Self>>
	where
		Self: Sized;

	/// Appends the elements of `pieces`, in order, after the current content.
	fn join(&mut self, pieces: Vec<Self>)
	where
		Self: Sized;

	/// Applies `action` to every element.
	fn for_each(&self, mut action: impl FnMut(&E))
	where
		Self: Sized,
	{
		self.do_while(&mut |element| {
			action(element);
			true
		});
	}

	/// Returns `true` if any element matches.
	fn any_match(&self, mut predicate: impl FnMut(&E) -> bool) -> bool
	where
		Self: Sized,
	{
		!self.do_while(&mut |element| !predicate(element))
	}

	/// Returns `true` if every element matches (vacuously true when empty).
	fn all_match(&self, mut predicate: impl FnMut(&E) -> bool) -> bool
	where
		Self: Sized,
	{
		self.do_while(&mut predicate)
	}

	/// Membership test through [`Self::comparator`].
	fn contains(&self, element: &E) -> bool {
		let comparator = self.comparator();
		!self.do_while(&mut |candidate| !comparator.are_equal(candidate, element))
	}

	/// Number of elements visited by a full traversal.
	fn count(&self) -> usize {
		let mut count = 0;
		self.do_while(&mut |_| {
			count += 1;
			true
		});
		count
	}
}

/// Ordered, index-addressable sequence with operations at both ends.
///
/// Indices are checked before any forwarding; out of range indices fail with
/// [`CollectionError::IndexOutOfBounds`].
pub trait TableService<E>: CollectionService<E> {
	/// Number of elements.
	fn size(&self) -> usize;

	/// Returns `true` if the table holds no element.
	fn is_empty(&self) -> bool {
		self.size() == 0
	}

	/// Element at `index`.
	fn get(&self, index: usize) -> Result<&E>;

	/// Replaces the element at `index`, returning the previous one.
	fn set(&mut self, index: usize, element: E) -> Result<E>;

	/// Inserts at `index`, shifting later elements; `index == size` appends.
	fn insert(&mut self, index: usize, element: E) -> Result<()>;

	/// Removes and returns the element at `index`.
	fn remove_at(&mut self, index: usize) -> Result<E>;

	/// Removes every element.
	fn clear(&mut self);

	/// Inserts at the front.
	fn add_first(&mut self, element: E);

	/// Inserts at the back.
	fn add_last(&mut self, element: E);

	/// First element, if any.
	fn peek_first(&self) -> Option<&E>;

	/// Last element, if any.
	fn peek_last(&self) -> Option<&E>;

	/// Removes the first element, if any.
	fn poll_first(&mut self) -> Option<E>;

	/// Removes the last element, if any.
	fn poll_last(&mut self) -> Option<E>;

	/// First element, failing with [`CollectionError::NoSuchElement`] when empty.
	fn first(&self) -> Result<&E> {
		self.peek_first().ok_or(CollectionError::NoSuchElement)
	}

	/// Last element, failing with [`CollectionError::NoSuchElement`] when empty.
	fn last(&self) -> Result<&E> {
		self.peek_last().ok_or(CollectionError::NoSuchElement)
	}

	/// Removes the first element, failing when empty.
	fn remove_first(&mut self) -> Result<E> {
		self.poll_first().ok_or(CollectionError::NoSuchElement)
	}

	/// Removes the last element, failing when empty.
	fn remove_last(&mut self) -> Result<E> {
		self.poll_last().ok_or(CollectionError::NoSuchElement)
	}

	/// Index of the first element equal to `element` under the comparator.
	fn index_of(&self, element: &E) -> Option<usize> {
		let comparator = self.comparator();
		(0..self.size()).find(|&i| self.get(i).is_ok_and(|candidate| comparator.are_equal(candidate, element)))
	}

	/// Index of the last element equal to `element` under the comparator.
	fn last_index_of(&self, element: &E) -> Option<usize> {
		let comparator = self.comparator();
		(0..self.size()).rev().find(|&i| self.get(i).is_ok_and(|candidate| comparator.are_equal(candidate, element)))
	}

	/// Like [`CollectionService::do_while`] but from last to first.
	fn do_while_reversed(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		for index in (0..self.size()).rev() {
			if let Ok(element) = self.get(index)
				&& !predicate(element)
			{
				return false;
			}
		}
		true
	}

	/// Independent deep copy; mutating the copy never affects `self`.
	fn copy(&self) -> Self
	where
		Self: Sized,
		E: Clone;
}
