//! [`LivenessToken`] is a shared, one-way validity flag.

use core::sync::atomic::{AtomicBool, Ordering};

/// A shared flag that starts out valid and can only ever become invalid.
///
/// Tokens are handed around as `Arc<LivenessToken>`: one share is kept by the
/// [`Trackable`](`crate::Trackable`) that is being watched, the others by whoever
/// depends on that entity staying alive.
#[derive(Debug)]
pub struct LivenessToken {
	valid: AtomicBool,
}

impl LivenessToken {
	/// Creates a new valid token.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			valid: AtomicBool::new(true),
		}
	}

	/// Marks this token as invalid.
	///
	/// **Idempotent** aside from the return value.  
	/// **Returns** whether this call is the one that invalidated the token.
	pub fn invalidate(&self) -> bool {
		self.valid.swap(false, Ordering::AcqRel)
	}

	/// Whether the token has not been invalidated yet.
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.valid.load(Ordering::Acquire)
	}
}

impl Default for LivenessToken {
	fn default() -> Self {
		Self::new()
	}
}
