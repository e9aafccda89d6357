use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{FastTable, Reverse, Shared};

#[test]
fn visits_every_element_once() {
	let mut table: FastTable<u64> = (1..=1000).collect();
	let sum = std::sync::atomic::AtomicU64::new(0);
	for_each(&mut table, 4, |value: &u64| {
		sum.fetch_add(*value, Ordering::Relaxed);
	});
	assert_eq!(sum.load(Ordering::Relaxed), 500_500);
	assert_eq!(table.count(), 1000);
}

#[test]
fn pieces_are_joined_back_in_order() {
	let mut view = Reverse::new((1..=10).collect::<FastTable<i32>>());
	for_each(&mut view, 3, |_: &i32| {});
	let mut order = Vec::new();
	view.for_each(|value| order.push(*value));
	assert_eq!(order, (1..=10).collect::<Vec<_>>());
}

#[test]
fn refusal_runs_sequentially_on_caller_thread() {
	let mut table: FastTable<i32> = std::iter::once(7).collect();
	let caller = std::thread::current().id();
	let threads = Mutex::new(Vec::new());
	let completed = do_while(&mut table, 8, |_: &i32| {
		threads.lock().unwrap().push(std::thread::current().id());
		true
	});
	assert!(completed);
	assert_eq!(threads.into_inner().unwrap(), vec![caller]);
}

#[test]
fn early_stop_reports_incomplete() {
	let mut table: FastTable<i32> = (0..10_000).collect();
	let visited = AtomicUsize::new(0);
	let completed = do_while(&mut table, 4, |value: &i32| {
		visited.fetch_add(1, Ordering::Relaxed);
		*value != 42
	});
	assert!(!completed);
	assert!(visited.load(Ordering::Relaxed) <= 10_000);
	assert_eq!(table.count(), 10_000);
}

#[test]
fn shared_view_splits_under_common_locks() {
	let mut view = Shared::new((0..100).collect::<FastTable<i32>>());
	let total = AtomicUsize::new(0);
	for_each(&mut view, 4, |value: &i32| {
		total.fetch_add(*value as usize, Ordering::Relaxed);
	});
	assert_eq!(total.load(Ordering::Relaxed), 4950);
	assert_eq!(view.read(|table| table.count()), 100);
}
