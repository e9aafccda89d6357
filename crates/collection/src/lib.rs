//! Composable collection views.
//!
//! A backing sequence exposes the minimal [`CollectionService`] capability set
//! (add, short-circuiting traversal, conditional removal, comparator access,
//! split negotiation). Views implement the same traits over exactly one
//! delegate and stack by wrapping:
//!
//! ```
//! use ambit_collection::{CollectionService, FastTable, Reverse, Shared, TableService};
//!
//! let table: FastTable<i32> = (1..=4).collect();
//! let reversed = Reverse::new(table);
//! assert_eq!(reversed.get(0), Ok(&4));
//!
//! let shared = Shared::new(reversed);
//! shared.add(5);
//! assert!(shared.read(|view| view.contains(&5)));
//! ```

/// Equality and ordering policies.
pub mod comparator;
/// Error types for indexed and positional operations.
pub mod error;
/// Filtering view.
pub mod filtered;
/// Parallel traversal over split collections.
pub mod parallel;
/// Index-reflecting view.
pub mod reverse;
/// Capability traits.
pub mod service;
/// Lock-guarded concurrent view.
pub mod shared;
/// Ring-buffer backed table.
pub mod table;

pub use comparator::{Comparator, ComparatorRef, FnComparator, Natural};
pub use error::{CollectionError, Result};
pub use filtered::Filtered;
pub use reverse::Reverse;
pub use service::{CollectionService, TableService};
pub use shared::{Shared, SharedIter};
pub use table::FastTable;
