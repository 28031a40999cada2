//! Scoped connections.

use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use tracing::trace;
use xylem::LivenessToken;

use crate::SubscriptionId;

/// Disconnects a [`Subscription`](`crate::Subscription`) when dropped.
///
/// The disconnected entry is pruned from its [`EventSource`](`crate::EventSource`) lazily.
#[must_use = "Subscriptions are disconnected when their guard is dropped."]
pub struct SubscriptionGuard {
	id: SubscriptionId,
	/// [`None`] only after [`SubscriptionGuard::forget`].
	connected: Option<Arc<LivenessToken>>,
}

impl SubscriptionGuard {
	pub(crate) fn new(id: SubscriptionId, connected: Arc<LivenessToken>) -> Self {
		Self {
			id,
			connected: Some(connected),
		}
	}

	/// The guarded subscription's identity.
	#[must_use]
	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	/// Whether the guarded subscription is still connected.
	///
	/// This doesn't consider the subscription's dependencies.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.connected.as_ref().is_some_and(|token| token.is_valid())
	}

	/// Disconnects the subscription now.
	///
	/// The effect is the same as dropping `self`.
	pub fn disconnect(self) {
		drop(self);
	}

	/// Releases the guard while leaving the subscription connected.
	#[must_use = "The id is required to disconnect the subscription later."]
	pub fn forget(mut self) -> SubscriptionId {
		self.connected = None;
		self.id
	}
}

impl Drop for SubscriptionGuard {
	fn drop(&mut self) {
		if let Some(connected) = self.connected.take() {
			if connected.invalidate() {
				trace!(subscription = %self.id, "guard disconnected subscription");
			}
		}
	}
}

impl Debug for SubscriptionGuard {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionGuard")
			.field("id", &self.id)
			.field("connected", &self.is_connected())
			.finish()
	}
}
