//! [`Key`] tells the reserved null key apart from ordinary keys.

use std::fmt::{self, Debug, Display};

/// A key stored in a [`BucketMap`](crate::BucketMap).
///
/// [`Key::Null`] always lives in bucket `0`, and [`Key::Real`] keys are hashed into the remaining
/// buckets.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key<K> {
    /// The reserved null key.
    Null,

    /// An ordinary key.
    Real(K),
}

impl<K> Key<K> {
    /// Returns `true` if this is the null key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::Key;
    ///
    /// assert!(Key::<u64>::Null.is_null());
    /// assert!(!Key::Real(1).is_null());
    /// ```
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Key::Null)
    }

    /// Converts from `&Key<K>` to `Key<&K>`.
    #[inline]
    pub const fn as_ref(&self) -> Key<&K> {
        match self {
            Key::Null => Key::Null,
            Key::Real(key) => Key::Real(key),
        }
    }

    /// Returns the ordinary key, or `None` for the null key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::Key;
    ///
    /// assert_eq!(Key::Real("a").into_option(), Some("a"));
    /// assert_eq!(Key::<&str>::Null.into_option(), None);
    /// ```
    #[inline]
    pub fn into_option(self) -> Option<K> {
        match self {
            Key::Null => None,
            Key::Real(key) => Some(key),
        }
    }
}

impl<K> From<Option<K>> for Key<K> {
    #[inline]
    fn from(key: Option<K>) -> Self {
        key.map_or(Key::Null, Key::Real)
    }
}

impl<K: Debug> Debug for Key<K> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Real(key) => key.fmt(f),
        }
    }
}

impl<K: Display> Display for Key<K> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Real(key) => key.fmt(f),
        }
    }
}
