//! Equality and ordering policies used by collections for membership and sorting.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Equality, ordering and hashing policy for elements of type `E`.
///
/// Collections consult their comparator for `contains`, `index_of` and
/// `sort`. Views forward the delegate's comparator unchanged unless they
/// redefine equality themselves.
pub trait Comparator<E: ?Sized>: Send + Sync {
	/// Returns `true` if both elements are considered equal.
	fn are_equal(&self, left: &E, right: &E) -> bool {
		self.compare(left, right) == Ordering::Equal
	}

	/// Total ordering between two elements.
	fn compare(&self, left: &E, right: &E) -> Ordering;

	/// Hash code consistent with [`Self::are_equal`].
	fn hash_of(&self, element: &E) -> u64;
}

/// Shared handle to a comparator, as returned by [`crate::CollectionService::comparator`].
pub type ComparatorRef<E> = Arc<dyn Comparator<E>>;

/// The element type's own `Ord`/`Hash` implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl Natural {
	/// Returns the natural comparator as a shared handle.
	pub fn shared<E: Ord + Hash>() -> ComparatorRef<E> {
		Arc::new(Natural)
	}
}

impl<E: Ord + Hash + ?Sized> Comparator<E> for Natural {
	fn are_equal(&self, left: &E, right: &E) -> bool {
		left == right
	}

	fn compare(&self, left: &E, right: &E) -> Ordering {
		left.cmp(right)
	}

	fn hash_of(&self, element: &E) -> u64 {
		let mut hasher = DefaultHasher::new();
		element.hash(&mut hasher);
		hasher.finish()
	}
}

/// Comparator defined by an ordering closure.
///
/// Hashing is constant so that equal elements always hash alike; callers that
/// need hash-partitioned lookups should implement [`Comparator`] directly.
pub struct FnComparator<F> {
	order: F,
}

impl<F> FnComparator<F> {
	/// Wraps an ordering closure.
	pub fn new<E: ?Sized>(order: F) -> Self
	where
		F: Fn(&E, &E) -> Ordering + Send + Sync,
	{
		Self { order }
	}
}

impl<E: ?Sized, F> Comparator<E> for FnComparator<F>
where
	F: Fn(&E, &E) -> Ordering + Send + Sync,
{
	fn compare(&self, left: &E, right: &E) -> Ordering {
		(self.order)(left, right)
	}

	fn hash_of(&self, _element: &E) -> u64 {
		0
	}
}

impl<F> std::fmt::Debug for FnComparator<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnComparator").finish_non_exhaustive()
	}
}
