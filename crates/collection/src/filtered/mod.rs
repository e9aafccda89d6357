//! View restricted to the elements accepted by a filter.

use crate::comparator::ComparatorRef;
use crate::service::CollectionService;


/// Filtering view over one delegate collection.
///
/// Traversal and removal only see accepted elements; adding a rejected
/// element leaves the delegate untouched and returns `false`.
#[derive(Debug, Clone)]
pub struct Filtered<C, F> {
	inner: C,
	filter: F,
}

impl<C, F> Filtered<C, F> {
	/// Wraps `inner`, keeping only elements for which `filter` returns `true`.
	pub fn new(inner: C, filter: F) -> Self {
		Self { inner, filter }
	}

	/// Returns the delegate.
	pub fn get_ref(&self) -> &C {
		&self.inner
	}

	/// Unwraps the view, returning the delegate.
	pub fn into_inner(self) -> C {
		self.inner
	}
}

impl<E, C, F> CollectionService<E> for Filtered<C, F>
where
	C: CollectionService<E>,
	F: Fn(&E) -> bool + Clone,
{
	fn add(&mut self, element: E) -> bool {
		(self.filter)(&element) && self.inner.add(element)
	}

	fn do_while(&self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		let filter = &self.filter;
		self.inner.do_while(&mut |element| !filter(element) || predicate(element))
	}

	fn remove_if(&mut self, predicate: &mut dyn FnMut(&E) -> bool) -> bool {
		let filter = &self.filter;
		self.inner.remove_if(&mut |element| filter(element) && predicate(element))
	}

	fn comparator(&self) -> ComparatorRef<E> {
		self.inner.comparator()
	}

	fn try_split(&mut self, n: usize) -> Option<Vec<Self>> {
		let pieces = self.inner.try_split(n)?;
		Some(pieces.into_iter().map(|inner| Filtered::new(inner, self.filter.clone())).collect())
	}

	fn join(&mut self, pieces: Vec<Self>) {
		self.inner.join(pieces.into_iter().map(Filtered::into_inner).collect());
	}
}
