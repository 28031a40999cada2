#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! Emissions may run concurrently on multiple threads. Each one works on a snapshot of
//! the subscription list and checks liveness right before invoking each handler, so a
//! handler may still start on one thread while its tracked entity is being dropped on
//! another. Handlers bound with [`EventSource::connect_method`] upgrade their receiver
//! for the duration of the call and are skipped if that fails.

mod combiner;
mod error;
mod guard;
mod handle;
mod source;
mod subscription;

pub use combiner::{Collect, Combiner, Discard, Fold, Last};
pub use error::HandlerError;
pub use guard::SubscriptionGuard;
pub use handle::CallableHandle;
pub use source::{EventSource, Notifier};
pub use subscription::{Subscription, SubscriptionId};

pub use xylem::{LivenessToken, Track, Trackable};

#[doc = include_str!("../README.md")]
mod readme {}
