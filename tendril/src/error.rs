use thiserror::Error;

use crate::SubscriptionId;

/// A handler failed during [`EventSource::try_emit`](`crate::EventSource::try_emit`).
///
/// The rest of that dispatch round was skipped.
#[derive(Debug, Error)]
#[error("handler of subscription {subscription} failed")]
pub struct HandlerError<E> {
	/// The subscription whose handler failed.
	pub subscription: SubscriptionId,
	/// The handler's error.
	#[source]
	pub source: E,
}

impl<E> HandlerError<E> {
	/// Discards the subscription identity.
	pub fn into_source(self) -> E {
		self.source
	}
}
