#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! Token state is atomic. A [`Trackable`]'s token list sits behind a re-entrant lock
//! that is never held while foreign code runs.

pub mod token;
pub mod trackable;

pub use token::LivenessToken;
pub use trackable::{Track, Trackable};

#[doc = include_str!("../README.md")]
mod readme {}
