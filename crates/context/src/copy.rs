//! Explicit copies for values leaving a scope.
//!
//! A value computed inside a transient scope reaches the enclosing scope
//! through [`Copyable::copy`] (usually via [`crate::ScopeGuard::export`]),
//! never through a handle that keeps pointing into the inner scope.

/// Produces an independent value equal to `self`.
///
/// Unlike `Clone`, implementations must not share mutable state with the
/// original: a copied `Arc<Mutex<_>>` style handle is not a copy.
pub trait Copyable: Sized {
	/// Independent copy of `self`.
	fn copy(&self) -> Self;
}

macro_rules! copyable_by_value {
	($($ty:ty),* $(,)?) => {
		$(impl Copyable for $ty {
			fn copy(&self) -> Self {
				*self
			}
		})*
	};
}

copyable_by_value!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl Copyable for String {
	fn copy(&self) -> Self {
		self.clone()
	}
}

impl<T: Copyable> Copyable for Option<T> {
	fn copy(&self) -> Self {
		self.as_ref().map(Copyable::copy)
	}
}

impl<T: Copyable> Copyable for Vec<T> {
	fn copy(&self) -> Self {
		self.iter().map(Copyable::copy).collect()
	}
}

impl<T: Copyable> Copyable for Box<T> {
	fn copy(&self) -> Self {
		Box::new((**self).copy())
	}
}
