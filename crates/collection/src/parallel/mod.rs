//! Parallel traversal over split collections.
//!
//! Both helpers negotiate a split first. A refused split is not an error: the
//! traversal simply runs on the calling thread.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::service::CollectionService;

#[cfg(test)]
mod tests;

/// Parallel counterpart of [`CollectionService::do_while`].
///
/// Splits into at most `concurrency` pieces, traverses each on its own scoped
/// thread and joins the pieces back before returning. A `false` from
/// `predicate` in any piece stops the others at their next element. Element
/// order across pieces is unspecified.
pub fn do_while<E, C, P>(collection: &mut C, concurrency: usize, predicate: P) -> bool
where
	C: CollectionService<E> + Sync,
	P: Fn(&E) -> bool + Sync,
{
	let Some(pieces) = collection.try_split(concurrency) else {
		tracing::trace!(concurrency, "collection.parallel.sequential");
		return collection.do_while(&mut |element| predicate(element));
	};

	let stop = AtomicBool::new(false);
	let (stop, predicate) = (&stop, &predicate);
	let outcomes: Vec<std::thread::Result<bool>> = std::thread::scope(|scope| {
		let handles: Vec<_> = pieces
			.iter()
			.map(|piece| {
				scope.spawn(move || {
					piece.do_while(&mut |element| {
						if stop.load(Ordering::Relaxed) {
							return false;
						}
						let keep_going = predicate(element);
						if !keep_going {
							stop.store(true, Ordering::Relaxed);
						}
						keep_going
					})
				})
			})
			.collect();
		handles.into_iter().map(|handle| handle.join()).collect()
	});

	tracing::trace!(pieces = pieces.len(), "collection.parallel.joined");
	// Pieces go back before any worker panic is resumed.
	collection.join(pieces);
	let mut completed = true;
	for outcome in outcomes {
		match outcome {
			Ok(done) => completed &= done,
			Err(panic) => std::panic::resume_unwind(panic),
		}
	}
	completed
}

/// Applies `action` to every element, in parallel when the collection splits.
pub fn for_each<E, C, A>(collection: &mut C, concurrency: usize, action: A)
where
	C: CollectionService<E> + Sync,
	A: Fn(&E) + Sync,
{
	do_while(collection, concurrency, |element| {
		action(element);
		true
	});
}
