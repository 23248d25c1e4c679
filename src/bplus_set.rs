use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::Violation;
use crate::raw::{Kind, LeafWalk, Node, RawTree, TreeView};

/// An ordered set based on a B+tree of order `N`.
///
/// Keys are stored in the leaves, which are linked into a doubly linked chain in ascending order.
/// Internal nodes hold routing copies: each separator equals the smallest key of the subtree to
/// its right. Every search descends all the way to a leaf, and iteration walks the leaf chain
/// without touching internal nodes.
///
/// `N` is the maximum number of children per node and must be at least 3; it defaults to 5.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the set. The behavior
/// resulting from such a logic error is not specified, but will not result in undefined
/// behavior. [`BPlusSet::validate`] reports the damage.
///
/// # Examples
///
/// ```
/// use mwtree::BPlusSet;
///
/// let mut readings: BPlusSet<u32, 4> = BPlusSet::new();
/// readings.extend([72, 68, 75, 68, 80]);
///
/// assert_eq!(readings.len(), 4);
/// assert!(readings.search(&75));
///
/// // Newest first, walking the leaf chain backwards.
/// let descending: Vec<u32> = readings.iter().rev().copied().collect();
/// assert_eq!(descending, [80, 75, 72, 68]);
/// ```
///
/// A `BPlusSet` with a known list of keys can be initialized from an array:
///
/// ```
/// use mwtree::BPlusSet;
///
/// let set: BPlusSet<i32> = BPlusSet::from([1, 2, 3]);
/// ```
pub struct BPlusSet<K, const N: usize = 5> {
    tree: RawTree<K, N>,
}

/// An iterator over the keys of a `BPlusSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] and [`traverse`] methods on [`BPlusSet`]. It follows
/// the leaf chain from both ends at once, keeping only a cursor per end.
///
/// # Examples
///
/// ```
/// use mwtree::BPlusSet;
///
/// let set: BPlusSet<i32> = BPlusSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BPlusSet::iter
/// [`traverse`]: BPlusSet::traverse
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, const N: usize = 5> {
    inner: LeafWalk<'a, K, N>,
}

impl<K, const N: usize> BPlusSet<K, N> {
    /// Maximum number of keys in a node.
    pub const MAX_KEY_COUNT: usize = Node::<K, N>::MAX_KEYS;

    /// Minimum number of keys in any node other than the root.
    pub const MIN_KEY_COUNT: usize = Node::<K, N>::MIN_KEYS;

    /// Makes a new, empty `BPlusSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32> = BPlusSet::new();
    /// set.insert(1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        BPlusSet {
            tree: RawTree::new(Kind::BPlusTree),
        }
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of levels in the tree, `0` when the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32, 3> = BPlusSet::new();
    /// assert_eq!(set.height(), 0);
    /// set.extend([1, 2]);
    /// assert_eq!(set.height(), 1);
    /// set.insert(3);
    /// assert_eq!(set.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns a reference to the smallest key in the set, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32> = BPlusSet::new();
    /// assert_eq!(set.first(), None);
    /// set.extend([2, 1]);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.tree.first()
    }

    /// Returns a reference to the largest key in the set, if any.
    ///
    /// Read from the last leaf of the chain without descending the tree.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.tree.last()
    }

    /// Removes every key, freeing all nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32> = (0..100).collect();
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// The walk starts at the first leaf and follows the leaf chain; iterating from the back
    /// follows it in reverse from the last leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let set: BPlusSet<usize> = BPlusSet::from([3, 1, 2]);
    /// let keys: Vec<_> = set.traverse().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn traverse(&self) -> Iter<'_, K, N> {
        Iter {
            inner: self.tree.leaf_walk(),
        }
    }

    /// Alias of [`traverse`](BPlusSet::traverse).
    pub fn iter(&self) -> Iter<'_, K, N> {
        self.traverse()
    }

    /// Returns a displayable rendering of the node structure, one node per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let set: BPlusSet<i32, 3> = BPlusSet::from([5, 15, 25]);
    /// assert_eq!(set.tree_view().to_string(), "[15] children=2\n  [5]\n  [15 25]\n");
    /// ```
    pub fn tree_view(&self) -> TreeView<'_, K, N> {
        self.tree.dump()
    }
}

impl<K: Ord, const N: usize> BPlusSet<K, N> {
    /// Checks every structural invariant of the underlying tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] found. A set that was only modified through its own
    /// methods, with keys whose ordering never changed, always validates.
    pub fn validate(&self) -> Result<(), Violation> {
        self.tree.validate()
    }
}

impl<K: Ord + Clone, const N: usize> BPlusSet<K, N> {
    /// Adds a key to the set.
    ///
    /// Returns whether the key was newly inserted. A key that is already present is left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32> = BPlusSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) node visits, each splitting at most once. A split leaf is threaded into the leaf
    /// chain right after its left half.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert(key)
    }

    /// Removes a key from the set. Returns whether it was present.
    ///
    /// If the key was also the routing copy in an internal node, that separator is replaced by
    /// the key's in-order successor.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let mut set: BPlusSet<i32> = BPlusSet::from([2]);
    ///
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove(key)
    }

    /// Returns `true` if the set contains `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BPlusSet;
    ///
    /// let set: BPlusSet<i32> = BPlusSet::from([1, 2, 3]);
    /// assert_eq!(set.search(&1), true);
    /// assert_eq!(set.search(&4), false);
    /// ```
    pub fn search<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.search(key)
    }

    /// Alias of [`search`](BPlusSet::search).
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key)
    }
}

impl<K: PartialEq, const N: usize> PartialEq for BPlusSet<K, N> {
    fn eq(&self, other: &BPlusSet<K, N>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, const N: usize> Eq for BPlusSet<K, N> {}

impl<K: Clone, const N: usize> Clone for BPlusSet<K, N> {
    fn clone(&self) -> Self {
        BPlusSet {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, const N: usize> fmt::Debug for BPlusSet<K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, const N: usize> Default for BPlusSet<K, N> {
    fn default() -> Self {
        BPlusSet::new()
    }
}

impl<K: Ord + Clone, const N: usize> FromIterator<K> for BPlusSet<K, N> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = BPlusSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord + Clone, const N: usize> Extend<K> for BPlusSet<K, N> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy, const N: usize> Extend<&'a K> for BPlusSet<K, N> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        for &key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + Clone, const N: usize, const M: usize> From<[K; M]> for BPlusSet<K, N> {
    fn from(arr: [K; M]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, const N: usize> IntoIterator for &'a BPlusSet<K, N> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, N>;

    fn into_iter(self) -> Iter<'a, K, N> {
        self.iter()
    }
}

impl<'a, K, const N: usize> Iterator for Iter<'a, K, N> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<'a, K, const N: usize> DoubleEndedIterator for Iter<'a, K, N> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back()
    }
}

impl<K, const N: usize> ExactSizeIterator for Iter<'_, K, N> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, const N: usize> FusedIterator for Iter<'_, K, N> {}

impl<K, const N: usize> Clone for Iter<'_, K, N> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, const N: usize> fmt::Debug for Iter<'_, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
