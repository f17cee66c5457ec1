//! Errors reported by [`BucketMap`](crate::BucketMap) constructors.

/// [`BucketMap`](crate::BucketMap) error.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested bucket count cannot hold both the null slot and a real bucket.
    #[error("invalid capacity {0}: a bucket map needs at least 2 buckets")]
    InvalidCapacity(usize),
}
