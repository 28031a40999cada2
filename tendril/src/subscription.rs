//! [`Subscription`]s bind a [`CallableHandle`] to the [`LivenessToken`]s it depends on.

use core::{
	num::NonZeroU64,
	sync::atomic::{AtomicU64, Ordering},
};
use std::{
	fmt::{self, Debug, Display, Formatter},
	sync::Arc,
};

use xylem::{LivenessToken, Trackable};

use crate::{CallableHandle, SubscriptionGuard};

/// Process-unique identity of a [`Subscription`].
///
/// Identities are never reused, so disconnecting a stale one is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(NonZeroU64);

impl SubscriptionId {
	fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(1);
		let id = COUNTER.fetch_add(1, Ordering::Relaxed);
		Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MAX))
	}

	/// The raw numeric identity.
	#[must_use]
	pub fn get(self) -> NonZeroU64 {
		self.0
	}
}

impl Display for SubscriptionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// One registered handler plus the liveness of everything it depends on.
///
/// A [`Subscription`] is live while it hasn't been disconnected and each of its dependency
/// tokens is still valid. Without dependencies, it stays live until disconnected.
///
/// Dependency tokens may be shared with other subscriptions. Disconnecting or dropping a
/// [`Subscription`] never invalidates them; tracked entities release shares nobody else
/// holds on their next maintenance pass.
pub struct Subscription<A: ?Sized, R> {
	id: SubscriptionId,
	handle: CallableHandle<A, R>,
	connected: Arc<LivenessToken>,
	dependencies: Vec<Arc<LivenessToken>>,
}

impl<A: ?Sized, R> Subscription<A, R> {
	/// Creates a [`Subscription`] depending on the given `dependencies`.
	#[must_use]
	pub fn new(handle: CallableHandle<A, R>, dependencies: Vec<Arc<LivenessToken>>) -> Self {
		Self {
			id: SubscriptionId::next(),
			handle,
			connected: Arc::new(LivenessToken::new()),
			dependencies,
		}
	}

	/// Creates a [`Subscription`] that expires once any of `tracked` is dropped.
	///
	/// One fresh token is shared with each of `tracked`.
	#[must_use]
	pub fn tracking(handle: CallableHandle<A, R>, tracked: &[&Trackable]) -> Self {
		Self::new(handle, tracked.iter().map(|trackable| trackable.track()).collect())
	}

	/// This subscription's identity.
	#[must_use]
	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	/// Whether this subscription may still be invoked.
	#[must_use]
	pub fn is_live(&self) -> bool {
		self.connected.is_valid() && self.dependencies.iter().all(|token| token.is_valid())
	}

	/// Calls the handler unconditionally.
	///
	/// Check [`.is_live()`](`Subscription::is_live`) first.
	/// [`EventSource`](`crate::EventSource`) does this for each entry it dispatches to.
	///
	/// **Returns** [`None`] iff the handler found its target gone.
	pub fn invoke(&self, args: &A) -> Option<R> {
		self.handle.call(args)
	}

	/// Disconnects this subscription.
	///
	/// **Idempotent** aside from the return value.  
	/// **Returns** whether this call disconnected it.
	pub fn disconnect(&self) -> bool {
		self.connected.invalidate()
	}

	/// Whether [`.disconnect()`](`Subscription::disconnect`) has been called.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.connected.is_valid()
	}

	/// Creates a guard that disconnects this subscription when dropped.
	pub fn guard(&self) -> SubscriptionGuard {
		SubscriptionGuard::new(self.id, Arc::clone(&self.connected))
	}

	/// The handler bound by this subscription.
	#[must_use]
	pub fn handle(&self) -> &CallableHandle<A, R> {
		&self.handle
	}
}

impl<A: ?Sized, R> Debug for Subscription<A, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("connected", &self.is_connected())
			.field("dependencies", &self.dependencies.len())
			.field("live", &self.is_live())
			.finish_non_exhaustive()
	}
}
