use tendril::{Collect, Combiner, Discard, EventSource, Fold, Last, Trackable};

fn summing() -> EventSource<(), i32, Fold<i32, impl Fn(i32, i32) -> i32>> {
	EventSource::with_combiner(Fold::new(0, |sum: i32, x: i32| sum + x))
}

#[test]
fn sum_of_three() {
	let source = summing();
	source.connect(|()| 1);
	source.connect(|()| 2);
	source.connect(|()| 3);
	assert_eq!(source.emit(&()), 6);
}

#[test]
fn empty_round_yields_seed() {
	let source = summing();
	assert_eq!(source.emit(&()), 0);

	let entity = Trackable::new();
	source.connect_tracked(&entity, |()| 100);
	drop(entity);
	assert_eq!(source.emit(&()), 0);
}

#[test]
fn rounds_start_fresh() {
	let source = summing();
	source.connect(|()| 1);
	source.connect(|()| 2);
	source.connect(|()| 3);
	assert_eq!(source.emit(&()), 6);
	assert_eq!(source.emit(&()), 6);
}

#[test]
fn dead_results_are_not_combined() {
	let source = EventSource::<(), &'static str, Collect>::new();
	let entity = Trackable::new();
	source.connect(|()| "a");
	source.connect_tracked(&entity, |()| "b");
	source.connect(|()| "c");

	assert_eq!(source.emit(&()), ["a", "b", "c"]);
	drop(entity);
	assert_eq!(source.emit(&()), ["a", "c"]);
}

#[test]
fn policies_directly() {
	let round = Combiner::<u8>::begin(&Last);
	assert_eq!(Combiner::<u8>::finalize(&Last, round), None);
	let mut round = Combiner::<u8>::begin(&Last);
	Last.accumulate(&mut round, 1_u8);
	Last.accumulate(&mut round, 2_u8);
	assert_eq!(Combiner::<u8>::finalize(&Last, round), Some(2));

	let mut round = Combiner::<u8>::begin(&Collect);
	Collect.accumulate(&mut round, 1_u8);
	Collect.accumulate(&mut round, 2_u8);
	assert_eq!(Combiner::<u8>::finalize(&Collect, round), vec![1, 2]);

	let mut round = Combiner::<u8>::begin(&Discard);
	Discard.accumulate(&mut round, 1_u8);
	let () = Combiner::<u8>::finalize(&Discard, round);

	let product = Fold::new(1_u64, |product: u64, x: u64| product * x);
	assert_eq!(product.seed(), &1);
	let mut round = Combiner::<u64>::begin(&product);
	for x in 1..=5_u64 {
		product.accumulate(&mut round, x);
	}
	assert_eq!(Combiner::<u64>::finalize(&product, round), 120);
}
