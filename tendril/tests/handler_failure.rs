use std::{
	error::Error as _,
	fmt::{self, Display, Formatter},
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
};

use tendril::{EventSource, Fold, Last, Trackable};
use _validator::Validator;

#[derive(Debug, PartialEq, Eq)]
struct Refused(&'static str);

impl Display for Refused {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "refused: {}", self.0)
	}
}

impl std::error::Error for Refused {}

#[test]
fn try_emit_aborts_at_first_error() {
	let v = Arc::new(Validator::new());
	let source = EventSource::<(), Result<u32, Refused>, Last>::new();

	source.connect({
		let v = Arc::clone(&v);
		move |()| {
			v.push(1);
			Ok(1)
		}
	});
	let failing = source.connect({
		let v = Arc::clone(&v);
		move |()| {
			v.push(2);
			Err(Refused("second"))
		}
	});
	source.connect({
		let v = Arc::clone(&v);
		move |()| {
			v.push(3);
			Ok(3)
		}
	});

	let error = source.try_emit(&()).unwrap_err();
	assert_eq!(error.subscription, failing);
	assert_eq!(error.source, Refused("second"));
	v.expect([1, 2]);

	assert!(source.disconnect(failing));
	assert_eq!(source.try_emit(&()).unwrap(), Some(3));
	v.expect([1, 3]);
}

#[test]
fn try_emit_folds_successes() {
	let source = EventSource::<u32, Result<u32, Refused>, _>::with_combiner(Fold::new(
		0,
		|sum: u32, x: u32| sum + x,
	));
	assert_eq!(source.try_emit(&1).unwrap(), 0);

	source.connect(|&x| Ok(x));
	source.connect(|&x| Ok(x * 2));
	assert_eq!(source.try_emit(&1).unwrap(), 3);
}

#[test]
fn try_emit_skips_dead_subscriptions() {
	let source = EventSource::<(), Result<(), Refused>, Last>::new();
	let entity = Trackable::new();
	source.connect_tracked(&entity, |()| Err(Refused("gone")));
	drop(entity);

	assert_eq!(source.try_emit(&()).unwrap(), None);
	assert!(source.is_empty());
}

#[test]
fn handler_error_reports_its_source() {
	let source = EventSource::<(), Result<(), Refused>, Last>::new();
	let id = source.connect(|()| Err(Refused("always")));

	let error = source.try_emit(&()).unwrap_err();
	assert_eq!(error.to_string(), format!("handler of subscription {id} failed"));
	assert_eq!(error.source().unwrap().to_string(), "refused: always");
	assert_eq!(error.into_source(), Refused("always"));
}

#[test]
fn panicking_handler_ends_the_round() {
	let v = Arc::new(Validator::new());
	let source = EventSource::<bool, ()>::new();

	source.connect({
		let v = Arc::clone(&v);
		move |_| v.push("before")
	});
	source.connect(|&panic| assert!(!panic, "handler panicked"));
	source.connect({
		let v = Arc::clone(&v);
		move |_| v.push("after")
	});

	assert!(catch_unwind(AssertUnwindSafe(|| source.emit(&true))).is_err());
	v.expect(["before"]);

	source.emit(&false);
	v.expect(["before", "after"]);
	assert_eq!(source.len(), 3);
}

#[test]
fn panicking_handler_still_prunes() {
	let source = EventSource::<(), ()>::new();
	let entity = Trackable::new();
	source.connect_tracked(&entity, |()| ());
	source.connect(|()| panic!("handler panicked"));
	drop(entity);

	assert!(catch_unwind(AssertUnwindSafe(|| source.emit(&()))).is_err());
	assert_eq!(source.prune(), 0);
	assert_eq!(source.len(), 1);
}
