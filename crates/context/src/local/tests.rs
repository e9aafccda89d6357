use std::sync::Arc;

use super::*;
use crate::spawn::{ContextSnapshot, spawn_thread};
use crate::stack::depth;

#[test]
fn nested_overrides_follow_scope_lifetimes() {
	let reference = LocalReference::new(0);
	assert_eq!(*reference.get(), 0);

	let a = LocalContext::enter().unwrap();
	reference.set(5).unwrap();
	assert_eq!(*reference.get(), 5);

	let b = LocalContext::enter().unwrap();
	assert_eq!(*reference.get(), 5);
	reference.set(7).unwrap();
	assert_eq!(*reference.get(), 7);

	b.exit();
	assert_eq!(*reference.get(), 5);
	a.exit();
	assert_eq!(*reference.get(), 0);
}

#[test]
fn set_without_local_context_replaces_default() {
	let reference = LocalReference::new("initial");
	reference.set("replaced").unwrap();
	assert_eq!(*reference.get(), "replaced");
	assert_eq!(*reference.get_default(), "replaced");
	assert!(!reference.has_been_overridden());
}

#[test]
fn unoverridden_reference_ignores_scopes() {
	let reference = LocalReference::new(1);
	let scope = LocalContext::enter().unwrap();
	assert_eq!(*reference.get(), 1);
	assert!(!reference.has_been_overridden());
	scope.exit();
}

#[test]
fn get_local_does_not_walk_outward() {
	let reference = LocalReference::new(0);
	let outer = LocalContext::enter().unwrap();
	reference.set(5).unwrap();

	let inner = LocalContext::enter().unwrap();
	assert_eq!(*reference.get(), 5);
	assert_eq!(*reference.get_local().unwrap(), 0);

	reference.set(9).unwrap();
	assert_eq!(*reference.get_local().unwrap(), 9);
	inner.exit();
	outer.exit();

	assert_eq!(*reference.get_local().unwrap(), 0);
}

#[test]
fn clear_local_restores_inherited_value() {
	let reference = LocalReference::new(0);
	let outer = LocalContext::enter().unwrap();
	reference.set(5).unwrap();
	let inner = LocalContext::enter().unwrap();
	reference.set(7).unwrap();

	assert!(reference.clear_local().unwrap());
	assert_eq!(*reference.get(), 5);
	assert!(!reference.clear_local().unwrap());

	inner.exit();
	outer.exit();
}

#[test]
fn default_accessors_bypass_scopes() {
	let reference = LocalReference::new(0);
	let scope = LocalContext::enter().unwrap();
	reference.set(5).unwrap();
	reference.set_default(3);

	assert_eq!(*reference.get(), 5);
	assert_eq!(*reference.get_default(), 3);
	scope.exit();
	assert_eq!(*reference.get(), 3);
}

#[test]
fn sibling_scopes_do_not_share_overrides() {
	let reference = LocalReference::new(0);
	let first = LocalContext::enter().unwrap();
	reference.set(5).unwrap();
	first.exit();

	let second = LocalContext::enter().unwrap();
	assert_eq!(*reference.get(), 0);
	second.exit();
}

#[test]
fn references_are_independent() {
	let left = LocalReference::new(1);
	let right = LocalReference::new(2);
	assert_ne!(left.id(), right.id());

	let scope = LocalContext::enter().unwrap();
	left.set(10).unwrap();
	assert_eq!(*right.get(), 2);
	assert_eq!(*left.get(), 10);
	scope.exit();
}

#[test]
fn spawned_thread_sees_override_through_snapshot() {
	let reference = Arc::new(LocalReference::new(0));
	let scope = LocalContext::enter().unwrap();
	reference.set(5).unwrap();

	let seen = {
		let reference = Arc::clone(&reference);
		spawn_thread(move || *reference.get()).join().unwrap()
	};
	assert_eq!(seen, 5);
	scope.exit();
}

#[test]
fn snapshot_writes_stay_on_their_side() {
	let reference = Arc::new(LocalReference::new(0));
	let scope = LocalContext::enter().unwrap();
	reference.set(5).unwrap();

	let snapshot = ContextSnapshot::capture();
	reference.set(6).unwrap();

	let child = {
		let reference = Arc::clone(&reference);
		std::thread::spawn(move || {
			snapshot.run(|| {
				let before = *reference.get();
				reference.set(8).unwrap();
				(before, depth().unwrap())
			})
		})
		.join()
		.unwrap()
	};

	assert_eq!(child, (5, 1));
	assert_eq!(*reference.get(), 6);
	scope.exit();
}

#[test]
fn fork_copies_overrides() {
	let reference = LocalReference::new(0);
	let context = LocalContext::new();
	context.store(reference.id(), Arc::new(4));
	let forked = context.fork().unwrap();

	context.remove(reference.id());
	assert!(context.is_empty());
	let forked = AsAny::into_any(forked).downcast::<LocalContext>().unwrap();
	assert_eq!(forked.len(), 1);
}
