//! Error types for collection and view operations.

use thiserror::Error;

/// Errors raised by indexed and positional collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
	/// An index fell outside `[0, size)` (or `[0, size]` for insertion).
	#[error("index {index} out of bounds for size {size}")]
	IndexOutOfBounds {
		/// The rejected index.
		index: usize,
		/// Size of the collection at the time of the call.
		size: usize,
	},

	/// A front/back removal was attempted on an empty collection.
	#[error("no such element: collection is empty")]
	NoSuchElement,

	/// An operation was called in a state that does not permit it.
	#[error("illegal state: {0}")]
	IllegalState(&'static str),
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Fails with [`CollectionError::IndexOutOfBounds`] unless `index < size`.
pub(crate) fn check_index(index: usize, size: usize) -> Result<()> {
	if index < size { Ok(()) } else { Err(CollectionError::IndexOutOfBounds { index, size }) }
}

/// Fails unless `index <= size` (insertion positions include the end).
pub(crate) fn check_position(index: usize, size: usize) -> Result<()> {
	if index <= size { Ok(()) } else { Err(CollectionError::IndexOutOfBounds { index, size }) }
}
