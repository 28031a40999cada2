//! [`CallableHandle`] erases closures, functions and receiver-bound methods into one callable type.

use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

/// A type-erased handler for events with argument type `A` and result type `R`.
///
/// Cloning a handle is cheap and shares the underlying callable.
///
/// Multiple arguments are passed as a tuple.
pub struct CallableHandle<A: ?Sized, R> {
	call: Arc<dyn Send + Sync + Fn(&A) -> Option<R>>,
}

impl<A: ?Sized, R> CallableHandle<A, R> {
	/// Wraps a closure or function.
	pub fn new(f: impl 'static + Send + Sync + Fn(&A) -> R) -> Self {
		Self {
			call: Arc::new(move |args: &A| Some(f(args))),
		}
	}

	/// Binds `method` to `receiver` without keeping `receiver` alive.
	///
	/// Once the last strong reference to `receiver` is gone, calls return [`None`].
	pub fn method<T>(receiver: &Arc<T>, method: impl 'static + Send + Sync + Fn(&T, &A) -> R) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let receiver = Arc::downgrade(receiver);
		Self::from_fallible(move |args| receiver.upgrade().map(|receiver| method(&receiver, args)))
	}

	/// Wraps a callable that may find its target gone.
	///
	/// A [`None`] result is treated like a dead subscription: it is skipped and not combined.
	pub fn from_fallible(f: impl 'static + Send + Sync + Fn(&A) -> Option<R>) -> Self {
		Self { call: Arc::new(f) }
	}

	/// Calls the handler.
	///
	/// **Returns** [`None`] iff the handler's target is gone.
	pub fn call(&self, args: &A) -> Option<R> {
		(self.call)(args)
	}
}

impl<A: ?Sized, R> Clone for CallableHandle<A, R> {
	fn clone(&self) -> Self {
		Self {
			call: Arc::clone(&self.call),
		}
	}
}

impl<A: ?Sized, R> Debug for CallableHandle<A, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallableHandle").finish_non_exhaustive()
	}
}
