#![deny(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

//! Fixed-capacity hash map with separate chaining.
//!
//! # `bucket_map::BucketMap`
//! A hash map over a fixed array of buckets, each owning a singly-linked chain of entries. Bucket
//! `0` is reserved for the null key; ordinary keys are spread over the remaining buckets.
//!
//! # `bucket_map::Key`
//! A key as seen by iterators: either the reserved [`Key::Null`] or an ordinary [`Key::Real`].

pub mod bucket_map;
pub use bucket_map::{BucketMap, DEFAULT_CAPACITY, MIN_CAPACITY};

mod chain;

mod error;
pub use error::Error;

mod key;
pub use key::Key;

pub use equivalent::Equivalent;

#[cfg(feature = "serde")]
mod serde;
