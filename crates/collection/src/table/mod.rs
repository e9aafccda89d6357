//! Growable double-ended table, the concrete backing sequence for views.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use crate::comparator::{ComparatorRef, Natural};
use crate::error::{CollectionError, Result, check_index, check_position};
use crate::service::{CollectionService, TableService};


/// Ordered sequence backed by a ring buffer.
///
/// Duplicates are allowed. Equality for `contains`/`index_of` and the order
/// used by [`FastTable::sort`] come from the table's comparator.
pub struct FastTable<E> {
	elements: VecDeque<E>,
	comparator: ComparatorRef<E>,
}

impl<E: Ord + Hash> FastTable<E> {
	/// Creates an empty table using the elements' natural order.
	pub fn new() -> Self {
		Self::with_comparator(Natural::shared())
	}
}

impl<E: Ord + Hash> Default for FastTable<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> FastTable<E> {
	/// Creates an empty table with a custom comparator.
	pub fn with_comparator(comparator: ComparatorRef<E>) -> Self {
		Self {
			elements: VecDeque::new(),
			comparator,
		}
	}

	/// Iterates elements front to back.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &E> + ExactSizeIterator {
		self.elements.iter()
	}

	/// Sorts the table by its comparator (stable).
	pub fn sort(&mut self) {
		let comparator = self.comparator.clone();
		self.elements.make_contiguous().sort_by(|a, b| comparator.compare(a, b));
	}
}

impl<E: Ord + Hash> FromIterator<E> for FastTable<E> {
	fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
		let mut table = Self::new();
		table.elements.extend(iter);
		table
	}
}

impl<E> Extend<E> for FastTable<E> {
	fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
		self.elements.extend(iter);
	}
}

impl<E: fmt::Debug> fmt::Debug for FastTable<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.elements.iter()).finish()
	}
}

impl<E> CollectionService<E> for FastTable<E> {
	fn add(&mut self, element: E) -> bool {
		self.elements.push_back(element);
		true
	}

	fn do_while(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		self.elements.iter().all(predicate)
	}

	fn remove_if(&mut self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		let before = self.elements.len();
		self.elements.retain(|element| !predicate(element));
		self.elements.len() != before
	}

	fn comparator(&self) -> ComparatorRef<E> {
		self.comparator.clone()
	}

	fn try_split(&mut self, n: usize) -> Option<Vec<Self>> {
		let len = self.elements.len();
		if n < 2 || len < 2 {
			tracing::trace!(requested = n, len, "collection.split.refused");
			return None;
		}

		let count = n.min(len);
		let (base, extra) = (len / count, len % count);
		let mut rest = std::mem::take(&mut self.elements);
		let pieces = (0..count)
			.map(|i| {
				let take = base + usize::from(i < extra);
				Self {
					elements: rest.drain(..take).collect(),
					comparator: self.comparator.clone(),
				}
			})
			.collect();
		tracing::trace!(requested = n, pieces = count, len, "collection.split");
		Some(pieces)
	}

	fn join(&mut self, pieces: Vec<Self>) {
		for piece in pieces {
			self.elements.extend(piece.elements);
		}
	}
}

impl<E> TableService<E> for FastTable<E> {
	fn size(&self) -> usize {
		self.elements.len()
	}

	fn get(&self, index: usize) -> Result<&E> {
		check_index(index, self.elements.len())?;
		Ok(&self.elements[index])
	}

	fn set(&mut self, index: usize, element: E) -> Result<E> {
		check_index(index, self.elements.len())?;
		Ok(std::mem::replace(&mut self.elements[index], element))
	}

	fn insert(&mut self, index: usize, element: E) -> Result<()> {
		check_position(index, self.elements.len())?;
		self.elements.insert(index, element);
		Ok(())
	}

	fn remove_at(&mut self, index: usize) -> Result<E> {
		let size = self.elements.len();
		self.elements.remove(index).ok_or(CollectionError::IndexOutOfBounds { index, size })
	}

	fn clear(&mut self) {
		self.elements.clear();
	}

	fn add_first(&mut self, element: E) {
		self.elements.push_front(element);
	}

	fn add_last(&mut self, element: E) {
		self.elements.push_back(element);
	}

	fn peek_first(&self) -> Option<&E> {
		self.elements.front()
	}

	fn peek_last(&self) -> Option<&E> {
		self.elements.back()
	}

	fn poll_first(&mut self) -> Option<E> {
		self.elements.pop_front()
	}

	fn poll_last(&mut self) -> Option<E> {
		self.elements.pop_back()
	}

	fn index_of(&self, element: &E) -> Option<usize> {
		self.elements.iter().position(|candidate| self.comparator.are_equal(candidate, element))
	}

	fn last_index_of(&self, element: &E) -> Option<usize> {
		self.elements.iter().rposition(|candidate| self.comparator.are_equal(candidate, element))
	}

	fn do_while_reversed(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		self.elements.iter().rev().all(predicate)
	}

	fn copy(&self) -> Self
	where
		E: Clone,
	{
		Self {
			elements: self.elements.clone(),
			comparator: self.comparator.clone(),
		}
	}
}
