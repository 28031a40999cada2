//! [`Trackable`] invalidates the [`LivenessToken`]s it holds when it is dropped.

use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	mem,
	sync::Arc,
};

use parking_lot::ReentrantMutex;
use tracing::trace;

use crate::LivenessToken;

/// An entity that others can depend on.
///
/// Each dependency is represented by one [`LivenessToken`] shared between the
/// [`Trackable`] and the dependent. Dropping the [`Trackable`] invalidates every
/// token it still holds.
///
/// Embed one in your own types and implement [`Track`] to make them trackable.
///
/// # Cloning and moving
///
/// A clone is a *new* entity and starts out tracking nothing.
///
/// Plain Rust moves keep the entity's identity, since nothing is destroyed.
/// Use [`Trackable::transfer`] where a move should end the old identity.
pub struct Trackable {
	tokens: ReentrantMutex<RefCell<Vec<Arc<LivenessToken>>>>,
}

/// Implemented by types that own a [`Trackable`].
pub trait Track {
	/// The [`Trackable`] whose lifetime stands in for `self`'s.
	fn trackable(&self) -> &Trackable;
}

impl Track for Trackable {
	fn trackable(&self) -> &Trackable {
		self
	}
}

impl Trackable {
	/// Creates a new [`Trackable`] that doesn't track any tokens yet.
	#[must_use]
	pub fn new() -> Self {
		Self {
			tokens: ReentrantMutex::new(RefCell::new(Vec::new())),
		}
	}

	/// Creates a fresh [`LivenessToken`], starts tracking it and returns the dependent's share.
	#[must_use]
	pub fn track(&self) -> Arc<LivenessToken> {
		let token = Arc::new(LivenessToken::new());
		self.add_token(Arc::clone(&token));
		token
	}

	/// Starts tracking `token`.
	///
	/// Invalidated and orphaned tokens are removed first, so the list doesn't grow without
	/// bound while dependents come and go.
	pub fn add_token(&self, token: Arc<LivenessToken>) {
		let lock = self.tokens.lock();
		let mut borrow = (*lock).borrow_mut();
		borrow.retain(is_needed);
		borrow.push(token);
	}

	/// Stops tracking `token`, without invalidating it.
	///
	/// Tokens are compared by identity, not by state.  
	/// **Returns** whether `token` was found.
	pub fn remove_token(&self, token: &Arc<LivenessToken>) -> bool {
		let lock = self.tokens.lock();
		let mut borrow = (*lock).borrow_mut();
		if let Some(index) = borrow.iter().position(|held| Arc::ptr_eq(held, token)) {
			borrow.remove(index);
			true
		} else {
			false
		}
	}

	/// Drops all invalidated tokens from the list.
	///
	/// Tokens that no dependent holds a share of anymore are dropped as well,
	/// without being invalidated.
	///
	/// **Returns** how many were removed.
	pub fn remove_invalidated(&self) -> usize {
		let lock = self.tokens.lock();
		let mut borrow = (*lock).borrow_mut();
		let before = borrow.len();
		borrow.retain(is_needed);
		before - borrow.len()
	}

	/// The number of tokens currently held, including any that were invalidated elsewhere
	/// and haven't been removed yet.
	#[must_use]
	pub fn len(&self) -> usize {
		(*self.tokens.lock()).borrow().len()
	}

	/// Whether no tokens are held.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Ends the current identity as if `self` had been dropped, and returns a fresh one.
	///
	/// Every token held by `self` is invalidated and released. Both `self` and the
	/// returned [`Trackable`] are left empty.
	///
	/// Takes `&mut self` since this ends `self`'s identity: no other thread may start
	/// tracking through it while its tokens are being invalidated.
	#[must_use = "The returned `Trackable` is the moved-to entity."]
	pub fn transfer(&mut self) -> Self {
		self.invalidate_all();
		Self::new()
	}

	fn invalidate_all(&self) {
		let lock = self.tokens.lock();
		let mut borrow = (*lock).borrow_mut();
		borrow.retain(is_needed);
		let released = mem::take(&mut *borrow);
		drop(borrow);
		drop(lock);

		// Invalidation is a plain flag flip, so nothing here calls back into `self`.
		for token in &released {
			token.invalidate();
		}
		if !released.is_empty() {
			trace!(count = released.len(), "invalidated tracked tokens");
		}
	}
}

/// Whether `held` is still valid and shared with at least one dependent.
///
/// Only the list holding `held` could hand out new shares, so a count of one is final.
fn is_needed(held: &Arc<LivenessToken>) -> bool {
	held.is_valid() && Arc::strong_count(held) > 1
}

impl Default for Trackable {
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for Trackable {
	/// Creates a *new* [`Trackable`] that doesn't track any tokens.
	fn clone(&self) -> Self {
		Self::new()
	}
}

impl Drop for Trackable {
	fn drop(&mut self) {
		self.invalidate_all();
	}
}

impl Debug for Trackable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Trackable")
			.field("tokens", &self.len())
			.finish()
	}
}
