//! [`EventSource`] owns subscriptions and dispatches emissions to them.

use std::{
	borrow::Cow,
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	mem,
	sync::Arc,
};

use parking_lot::ReentrantMutex;
use scopeguard::guard;
use tracing::{debug, trace};
use xylem::{Track, Trackable};

use crate::{
	CallableHandle, Combiner, Discard, HandlerError, Last, Subscription, SubscriptionGuard,
	SubscriptionId,
};

/// An [`EventSource`] whose handlers return nothing.
pub type Notifier<A> = EventSource<A, (), Discard>;

type Entries<A, R> = Vec<Arc<Subscription<A, R>>>;

/// A publisher that handlers can subscribe to.
///
/// Handlers receive `&A` and return `R`. Per emission, their results are aggregated by `C`,
/// which defaults to keeping the [`Last`] one.
///
/// # Logic
///
/// Handlers are invoked in registration order. Dead subscriptions (disconnected, or
/// depending on a dropped [`Trackable`]) are skipped and removed lazily, either after
/// an emission that encountered them or when the next subscription is added.
///
/// # Re-entrancy
///
/// No lock is held while a handler runs, so handlers may freely connect, disconnect,
/// emit and drop tracked entities:
///
/// - Subscriptions added during an emission aren't invoked by that emission.
/// - Subscriptions that die during an emission are skipped once it reaches them.
///
/// # Panics
///
/// A panicking handler ends the emission and the panic propagates to the caller.
/// The subscription list stays consistent.
pub struct EventSource<A: ?Sized, R = (), C = Last> {
	name: Option<Cow<'static, str>>,
	combiner: C,
	subscriptions: ReentrantMutex<RefCell<Entries<A, R>>>,
}

impl<A: ?Sized, R, C: Default> EventSource<A, R, C> {
	/// Creates a new [`EventSource`] with the default combiner policy.
	#[must_use]
	pub fn new() -> Self {
		Self::with_combiner(C::default())
	}
}

impl<A: ?Sized, R, C: Default> Default for EventSource<A, R, C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A: ?Sized, R, C> EventSource<A, R, C> {
	/// Creates a new [`EventSource`] that aggregates results with `combiner`.
	#[must_use]
	pub fn with_combiner(combiner: C) -> Self {
		Self {
			name: None,
			combiner,
			subscriptions: ReentrantMutex::new(RefCell::new(Vec::new())),
		}
	}

	/// Sets a name that identifies this [`EventSource`] in log output.
	#[must_use]
	pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// The name set with [`.named(…)`](`EventSource::named`), if any.
	#[must_use]
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// The combiner policy.
	pub fn combiner(&self) -> &C {
		&self.combiner
	}

	fn label(&self) -> &str {
		self.name().unwrap_or("<unnamed>")
	}

	/// Adds `subscription` at the end of the dispatch order.
	///
	/// Dead subscriptions are pruned first.
	pub fn insert(&self, subscription: Subscription<A, R>) -> SubscriptionId {
		let id = subscription.id();
		let lock = self.subscriptions.lock();
		let mut borrow = (*lock).borrow_mut();
		let reaped = reap(&mut borrow);
		borrow.push(Arc::new(subscription));
		drop(borrow);
		drop(lock);

		debug!(event_source = self.label(), subscription = %id, "connected");
		if !reaped.is_empty() {
			debug!(event_source = self.label(), count = reaped.len(), "pruned dead subscriptions");
		}
		// Handler captures may re-enter `self` when dropped.
		drop(reaped);
		id
	}

	/// Subscribes `handler` without dependencies.
	///
	/// It stays subscribed until [disconnected](`EventSource::disconnect`).
	pub fn connect(&self, handler: impl 'static + Send + Sync + Fn(&A) -> R) -> SubscriptionId {
		self.connect_with(CallableHandle::new(handler), &[])
	}

	/// Subscribes `handler` until `tracked` is dropped (or it is disconnected).
	pub fn connect_tracked(
		&self,
		tracked: &(impl ?Sized + Track),
		handler: impl 'static + Send + Sync + Fn(&A) -> R,
	) -> SubscriptionId {
		self.connect_with(CallableHandle::new(handler), &[tracked.trackable()])
	}

	/// Subscribes `handle` until any of `tracked` is dropped (or it is disconnected).
	pub fn connect_with(&self, handle: CallableHandle<A, R>, tracked: &[&Trackable]) -> SubscriptionId {
		self.insert(Subscription::tracking(handle, tracked))
	}

	/// Subscribes `method` bound to `receiver`, until `receiver` is dropped.
	///
	/// The subscription doesn't keep `receiver` alive.
	pub fn connect_method<T>(
		&self,
		receiver: &Arc<T>,
		method: impl 'static + Send + Sync + Fn(&T, &A) -> R,
	) -> SubscriptionId
	where
		T: ?Sized + Track + Send + Sync + 'static,
	{
		self.connect_with(
			CallableHandle::method(receiver, method),
			&[receiver.trackable()],
		)
	}

	/// Subscribes `handler` until the returned guard is dropped.
	pub fn connect_scoped(
		&self,
		handler: impl 'static + Send + Sync + Fn(&A) -> R,
	) -> SubscriptionGuard {
		let subscription = Subscription::new(CallableHandle::new(handler), Vec::new());
		let guard = subscription.guard();
		self.insert(subscription);
		guard
	}

	/// Disconnects and removes the subscription identified by `id`.
	///
	/// **Idempotent** aside from the return value.  
	/// **Returns** whether a matching subscription was found.
	pub fn disconnect(&self, id: SubscriptionId) -> bool {
		let lock = self.subscriptions.lock();
		let mut borrow = (*lock).borrow_mut();
		let removed = borrow
			.iter()
			.position(|subscription| subscription.id() == id)
			.map(|index| borrow.remove(index));
		drop(borrow);
		drop(lock);

		match removed {
			Some(subscription) => {
				subscription.disconnect();
				debug!(event_source = self.label(), subscription = %id, "disconnected");
				drop(subscription);
				true
			}
			None => false,
		}
	}

	/// Disconnects and removes all subscriptions.
	pub fn disconnect_all(&self) {
		let lock = self.subscriptions.lock();
		let removed = mem::take(&mut *(*lock).borrow_mut());
		drop(lock);

		for subscription in &removed {
			subscription.disconnect();
		}
		if !removed.is_empty() {
			debug!(event_source = self.label(), count = removed.len(), "disconnected all");
		}
	}

	/// Removes dead subscriptions.
	///
	/// **Returns** how many were removed.
	pub fn prune(&self) -> usize {
		let lock = self.subscriptions.lock();
		let reaped = reap(&mut (*lock).borrow_mut());
		drop(lock);

		let count = reaped.len();
		if count > 0 {
			debug!(event_source = self.label(), count, "pruned dead subscriptions");
		}
		drop(reaped);
		count
	}

	/// The number of live subscriptions.
	#[must_use]
	pub fn len(&self) -> usize {
		let lock = self.subscriptions.lock();
		let count = (*lock)
			.borrow()
			.iter()
			.filter(|subscription| subscription.is_live())
			.count();
		count
	}

	/// Whether there are no live subscriptions.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn snapshot(&self) -> Entries<A, R> {
		let lock = self.subscriptions.lock();
		let snapshot = (*lock).borrow().clone();
		snapshot
	}

	/// Runs one dispatch round, calling `each` with every handler result.
	///
	/// Stops early if `each` returns [`Err`].
	fn dispatch<E>(
		&self,
		args: &A,
		mut each: impl FnMut(SubscriptionId, R) -> Result<(), E>,
	) -> Result<(), E> {
		let snapshot = self.snapshot();

		// Prunes even if a handler panics.
		let mut dead = guard(0_usize, |dead| {
			if dead > 0 {
				self.prune();
			}
		});
		let mut invoked = 0_usize;
		for subscription in &snapshot {
			if !subscription.is_live() {
				*dead += 1;
				continue;
			}
			match subscription.invoke(args) {
				Some(result) => {
					invoked += 1;
					each(subscription.id(), result)?;
				}
				None => *dead += 1,
			}
		}
		trace!(
			event_source = self.label(),
			invoked,
			skipped = *dead,
			"dispatch round complete"
		);
		Ok(())
	}

	/// Emits `args` to all live subscriptions and aggregates their results.
	pub fn emit(&self, args: &A) -> C::Output
	where
		C: Combiner<R>,
	{
		let mut round = self.combiner.begin();
		let dispatched: Result<(), core::convert::Infallible> =
			self.dispatch(args, |_, result| {
				self.combiner.accumulate(&mut round, result);
				Ok(())
			});
		match dispatched {
			Ok(()) => self.combiner.finalize(round),
			Err(never) => match never {},
		}
	}
}

impl<A: ?Sized, T, E, C> EventSource<A, Result<T, E>, C> {
	/// Emits `args` to all live subscriptions and aggregates their [`Ok`] results.
	///
	/// # Errors
	///
	/// Iff a handler returns [`Err`]. Handlers after it in the dispatch order aren't invoked.
	pub fn try_emit(&self, args: &A) -> Result<C::Output, HandlerError<E>>
	where
		C: Combiner<T>,
	{
		let mut round = self.combiner.begin();
		self.dispatch(args, |subscription, result| match result {
			Ok(value) => {
				self.combiner.accumulate(&mut round, value);
				Ok(())
			}
			Err(source) => {
				debug!(
					event_source = self.label(),
					subscription = %subscription,
					"handler failed, aborting dispatch round"
				);
				Err(HandlerError {
					subscription,
					source,
				})
			}
		})?;
		Ok(self.combiner.finalize(round))
	}
}

/// Moves dead entries out of `entries`, preserving the order of the rest.
///
/// The caller drops the result after releasing the lock.
fn reap<A: ?Sized, R>(entries: &mut Entries<A, R>) -> Entries<A, R> {
	let (live, dead) = mem::take(entries)
		.into_iter()
		.partition(|subscription| subscription.is_live());
	*entries = live;
	dead
}

impl<A: ?Sized, R, C> Drop for EventSource<A, R, C> {
	fn drop(&mut self) {
		for subscription in self.subscriptions.get_mut().get_mut().iter() {
			subscription.disconnect();
		}
	}
}

impl<A: ?Sized, R, C: Debug> Debug for EventSource<A, R, C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let lock = self.subscriptions.lock();
		let subscriptions = (*lock).try_borrow().map(|borrow| borrow.len()).ok();
		f.debug_struct("EventSource")
			.field("name", &self.name)
			.field("combiner", &self.combiner)
			.field("subscriptions", &subscriptions)
			.finish()
	}
}
