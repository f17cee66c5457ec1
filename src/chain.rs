//! [`Chain`] is the singly-linked list of entries owned by a single bucket.

use super::Key;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// A single entry in a [`Chain`].
pub(crate) struct Node<K, V> {
    /// Cached hash of the key; compared before the keys themselves.
    pub(crate) hash: u64,
    pub(crate) key: Key<K>,
    pub(crate) value: V,
    next: Link<K, V>,
}

/// [`Chain`] owns its head, and every [`Node`] owns its successor.
///
/// New nodes are appended at the tail, therefore the chain order is the insertion order.
pub(crate) struct Chain<K, V> {
    head: Link<K, V>,
}

impl<K, V> Node<K, V> {
    #[inline]
    pub(crate) fn new(hash: u64, key: Key<K>, value: V) -> Self {
        Self {
            hash,
            key,
            value,
            next: None,
        }
    }
}

impl<K, V> Chain<K, V> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self { head: None }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the first node satisfying `pred`.
    #[inline]
    pub(crate) fn find<P: FnMut(&Node<K, V>) -> bool>(&self, mut pred: P) -> Option<&Node<K, V>> {
        self.iter().find(|node| pred(node))
    }

    /// Returns the first node satisfying `pred`.
    #[inline]
    pub(crate) fn find_mut<P: FnMut(&Node<K, V>) -> bool>(
        &mut self,
        mut pred: P,
    ) -> Option<&mut Node<K, V>> {
        let mut link = self.head.as_deref_mut();
        while let Some(node) = link {
            if pred(node) {
                return Some(node);
            }
            link = node.next.as_deref_mut();
        }
        None
    }

    /// Appends `node` after the current tail.
    pub(crate) fn push_back(&mut self, node: Node<K, V>) {
        debug_assert!(node.next.is_none());
        let mut link = &mut self.head;
        while let Some(current) = link {
            link = &mut current.next;
        }
        *link = Some(Box::new(node));
    }

    /// Unlinks and returns the first node satisfying `pred`.
    ///
    /// The predecessor, or the chain head, is re-linked to the successor of the removed node.
    pub(crate) fn remove<P: FnMut(&Node<K, V>) -> bool>(
        &mut self,
        mut pred: P,
    ) -> Option<Box<Node<K, V>>> {
        let mut link = &mut self.head;
        while let Some(mut node) = link.take() {
            if pred(&node) {
                *link = node.next.take();
                return Some(node);
            }
            link = &mut link.insert(node).next;
        }
        None
    }

    /// Drops every node, one at a time.
    pub(crate) fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }

    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            next: self.head.as_deref_mut(),
        }
    }
}

impl<K, V> Default for Chain<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for Chain<K, V> {
    #[inline]
    fn drop(&mut self) {
        // The default recursive drop overflows the stack on long chains.
        self.clear();
    }
}

/// Borrowing iterator over the nodes of a [`Chain`].
pub(crate) struct Iter<'c, K, V> {
    next: Option<&'c Node<K, V>>,
}

impl<'c, K, V> Iterator for Iter<'c, K, V> {
    type Item = &'c Node<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            node
        })
    }
}

/// Mutably borrowing iterator over the keys and values of a [`Chain`].
pub(crate) struct IterMut<'c, K, V> {
    next: Option<&'c mut Node<K, V>>,
}

impl<'c, K, V> Iterator for IterMut<'c, K, V> {
    type Item = (&'c Key<K>, &'c mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            (&node.key, &mut node.value)
        })
    }
}
