use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use crate::{FastTable, Reverse};

fn shared(values: &[i32]) -> Shared<FastTable<i32>> {
	Shared::new(values.iter().copied().collect())
}

fn snapshot(view: &Shared<FastTable<i32>>) -> Vec<i32> {
	view.read(|table| table.iter().copied().collect())
}

#[test]
fn forwards_capability_operations() {
	let view = shared(&[1, 2, 3]);
	assert!(view.add(4));
	assert!(view.remove_if(&mut |value: &i32| *value == 2));
	let mut seen = Vec::new();
	assert!(view.do_while(&mut |value: &i32| {
		seen.push(*value);
		true
	}));
	assert_eq!(seen, vec![1, 3, 4]);
	let comparator: ComparatorRef<i32> = view.comparator();
	assert!(comparator.are_equal(&3, &3));
}

#[test]
fn trait_methods_route_through_locks() {
	let mut view = Shared::new(Reverse::new((1..=3).collect::<FastTable<i32>>()));
	assert!(CollectionService::add(&mut view, 0));
	assert!(CollectionService::contains(&view, &0));
	assert_eq!(view.read(|reversed| reversed.get(0).copied()), Ok(0));
}

#[test]
fn writes_are_atomic_for_readers() {
	let view = Arc::new(shared(&[]));
	let done = Arc::new(AtomicBool::new(false));

	let writer = {
		let view = Arc::clone(&view);
		let done = Arc::clone(&done);
		std::thread::spawn(move || {
			for round in 0..200 {
				// Each round adds a pair then removes it; readers must never see half a pair.
				view.write(|table| {
					table.add(round);
					table.add(round);
				});
				view.remove_if(&mut |value: &i32| *value == round);
			}
			done.store(true, Ordering::SeqCst);
		})
	};

	while !done.load(Ordering::SeqCst) {
		let len = view.read(|table| table.size());
		assert!(len == 0 || len == 2, "observed partial mutation: {len}");
	}
	writer.join().unwrap();
	assert!(snapshot(&view).is_empty());
}

#[test]
fn split_pieces_share_the_parent_lock_pair() {
	let view = shared(&[1, 2, 3, 4, 5, 6]);
	let pieces = view.try_split(3).unwrap();
	assert_eq!(pieces.len(), 3);
	for piece in &pieces {
		assert!(piece.shares_locks_with(&view));
	}
	assert!(!shared(&[1]).shares_locks_with(&view));

	let sizes: usize = pieces.iter().map(|piece| piece.read(|table| table.size())).sum();
	assert_eq!(sizes, 6);
	let concatenated: Vec<i32> = pieces.iter().flat_map(snapshot).collect();
	assert_eq!(concatenated, vec![1, 2, 3, 4, 5, 6]);

	view.join(pieces);
	assert_eq!(snapshot(&view), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn writes_to_sibling_pieces_serialize() {
	let view = shared(&[1, 2, 3, 4]);
	let pieces = view.try_split(2).unwrap();
	let (left, right) = (&pieces[0], &pieces[1]);

	left.write(|_| {
		// The pair is held for writing; a sibling reader must not get through.
		assert!(right.locks.0.try_read().is_none());
		assert!(view.locks.0.try_write().is_none());
	});
	assert!(right.locks.0.try_read().is_some());
}

#[test]
fn split_refusal_is_propagated() {
	let view = shared(&[1]);
	assert!(view.try_split(4).is_none());
	assert_eq!(snapshot(&view), vec![1]);
}

#[test]
fn cursor_reads_and_removes_per_call() {
	let view = shared(&[1, 2, 3, 4]);
	let mut cursor = view.iter::<i32>();
	assert!(matches!(cursor.remove(), Err(CollectionError::IllegalState(_))));

	let mut kept = Vec::new();
	while cursor.has_next() {
		let Some(value) = cursor.next() else { break };
		if value % 2 == 0 {
			assert_eq!(cursor.remove(), Ok(value));
		} else {
			kept.push(value);
		}
	}
	assert_eq!(kept, vec![1, 3]);
	assert_eq!(snapshot(&view), vec![1, 3]);
}

#[test]
fn cursor_observes_writes_between_steps() {
	let view = shared(&[1, 2]);
	let mut cursor = view.iter::<i32>();
	assert_eq!(cursor.next(), Some(1));
	view.add(3);
	let rest: Vec<i32> = cursor.collect();
	assert_eq!(rest, vec![2, 3]);
}

#[test]
fn origin_blocks_readers_and_writers_until_join() {
	let view = shared(&[1, 2, 3, 4]);
	let pieces = view.try_split(2).unwrap();

	std::thread::scope(|scope| {
		let reader = scope.spawn(|| view.read(|table| (table.size(), table.contains(&3))));
		let writer = scope.spawn(|| view.add(99));
		std::thread::sleep(std::time::Duration::from_millis(50));
		assert!(!reader.is_finished());
		assert!(!writer.is_finished());

		view.join(pieces);
		let (_, found) = reader.join().unwrap();
		assert!(found);
		assert!(writer.join().unwrap());
	});

	assert_eq!(snapshot(&view), vec![1, 2, 3, 4, 99]);
}

#[test]
fn pieces_stay_usable_while_origin_is_closed() {
	let view = shared(&[1, 2, 3, 4]);
	let pieces = view.try_split(2).unwrap();
	assert!(pieces[0].add(10));
	assert_eq!(pieces[1].read(|table| table.size()), 2);
	view.join(pieces);
	assert_eq!(snapshot(&view), vec![1, 2, 10, 3, 4]);
}

#[test]
fn dropping_pieces_reopens_origin() {
	let view = shared(&[1, 2, 3, 4]);
	drop(view.try_split(2).unwrap());
	assert!(view.add(5));
	assert_eq!(snapshot(&view), vec![5]);
}
