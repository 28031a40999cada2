//! Policies that aggregate the handler results of one dispatch round.
//!
//! An [`EventSource`](`crate::EventSource`) calls [`Combiner::begin`] once per emission,
//! then [`Combiner::accumulate`] once per invoked handler in dispatch order, and finally
//! [`Combiner::finalize`]. State never carries over between emissions.

use std::fmt::{self, Debug, Formatter};

/// Aggregates handler results of type `R`.
pub trait Combiner<R> {
	/// Per-round accumulator state.
	type Round;

	/// The aggregate an emission returns.
	type Output;

	/// Creates the state for a new round.
	fn begin(&self) -> Self::Round;

	/// Folds one handler's `result` into `round`.
	fn accumulate(&self, round: &mut Self::Round, result: R);

	/// Produces the round's aggregate.
	///
	/// This **must** be well-defined for rounds in which no handler ran.
	fn finalize(&self, round: Self::Round) -> Self::Output;
}

/// Keeps the result of the last handler that ran, or [`None`] if none did.
///
/// This is the default policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Last;

impl<R> Combiner<R> for Last {
	type Round = Option<R>;
	type Output = Option<R>;

	fn begin(&self) -> Self::Round {
		None
	}

	fn accumulate(&self, round: &mut Self::Round, result: R) {
		*round = Some(result);
	}

	fn finalize(&self, round: Self::Round) -> Self::Output {
		round
	}
}

/// Drops all results. Emissions return `()`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discard;

impl<R> Combiner<R> for Discard {
	type Round = ();
	type Output = ();

	fn begin(&self) -> Self::Round {}

	fn accumulate(&self, (): &mut Self::Round, _: R) {}

	fn finalize(&self, (): Self::Round) -> Self::Output {}
}

/// Collects all results in dispatch order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Collect;

impl<R> Combiner<R> for Collect {
	type Round = Vec<R>;
	type Output = Vec<R>;

	fn begin(&self) -> Self::Round {
		Vec::new()
	}

	fn accumulate(&self, round: &mut Self::Round, result: R) {
		round.push(result);
	}

	fn finalize(&self, round: Self::Round) -> Self::Output {
		round
	}
}

/// Folds results into a running total, starting from `seed`.
///
/// An empty round yields a clone of `seed`.
///
/// ```
/// use tendril::{EventSource, Fold};
///
/// let sum = EventSource::<(), u32, _>::with_combiner(Fold::new(0, |total: u32, x: u32| total + x));
/// assert_eq!(sum.emit(&()), 0);
///
/// sum.connect(|()| 1);
/// sum.connect(|()| 2);
/// assert_eq!(sum.emit(&()), 3);
/// ```
#[derive(Clone)]
pub struct Fold<T, F> {
	seed: T,
	operation: F,
}

impl<T, F> Fold<T, F> {
	/// Creates a new [`Fold`] policy.
	///
	/// `operation` should be associative, and `seed` its identity value.
	pub fn new<R>(seed: T, operation: F) -> Self
	where
		T: Clone,
		F: Fn(T, R) -> T,
	{
		Self { seed, operation }
	}

	/// The value each round starts out with.
	pub fn seed(&self) -> &T {
		&self.seed
	}
}

impl<T: Clone, R, F: Fn(T, R) -> T> Combiner<R> for Fold<T, F> {
	type Round = Option<T>;
	type Output = T;

	fn begin(&self) -> Self::Round {
		Some(self.seed.clone())
	}

	fn accumulate(&self, round: &mut Self::Round, result: R) {
		*round = round.take().map(|total| (self.operation)(total, result));
	}

	fn finalize(&self, round: Self::Round) -> Self::Output {
		round.unwrap_or_else(|| self.seed.clone())
	}
}

impl<T: Debug, F> Debug for Fold<T, F> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Fold")
			.field("seed", &self.seed)
			.finish_non_exhaustive()
	}
}
