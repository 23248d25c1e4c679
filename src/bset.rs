use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::Violation;
use crate::raw::{InOrder, Kind, Node, RawTree, TreeView};

/// An ordered set based on a B-tree of order `N`.
///
/// Every key is stored exactly once, in a leaf or an internal node. Searches stop at the first
/// node holding the key, and removing a key from an internal node replaces it with its in-order
/// predecessor before repairing the leaf the predecessor came from.
///
/// `N` is the maximum number of children per node and must be at least 3; it defaults to 5.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the set. The behavior
/// resulting from such a logic error is not specified, but will not result in undefined
/// behavior. [`BSet::validate`] reports the damage.
///
/// # Examples
///
/// ```
/// use mwtree::BSet;
///
/// let mut books: BSet<&str> = BSet::new();
///
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `BSet` with a known list of keys can be initialized from an array:
///
/// ```
/// use mwtree::BSet;
///
/// let set: BSet<i32> = BSet::from([1, 2, 3]);
/// ```
pub struct BSet<K, const N: usize = 5> {
    tree: RawTree<K, N>,
}

/// An iterator over the keys of a `BSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] and [`traverse`] methods on [`BSet`]. It walks the
/// tree in order with an explicit stack holding one entry per level.
///
/// # Examples
///
/// ```
/// use mwtree::BSet;
///
/// let set: BSet<i32> = BSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.len(), 2);
/// ```
///
/// [`iter`]: BSet::iter
/// [`traverse`]: BSet::traverse
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, const N: usize = 5> {
    inner: InOrder<'a, K, N>,
}

impl<K, const N: usize> BSet<K, N> {
    /// Maximum number of keys in a node.
    pub const MAX_KEY_COUNT: usize = Node::<K, N>::MAX_KEYS;

    /// Minimum number of keys in any node other than the root.
    pub const MIN_KEY_COUNT: usize = Node::<K, N>::MIN_KEYS;

    /// Makes a new, empty `BSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32> = BSet::new();
    /// set.insert(1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        BSet {
            tree: RawTree::new(Kind::BTree),
        }
    }

    /// Returns the number of keys in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let mut v: BSet<i32> = BSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
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
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32, 3> = BSet::new();
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
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32> = BSet::new();
    /// assert_eq!(set.first(), None);
    /// set.extend([2, 1]);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.tree.first()
    }

    /// Returns a reference to the largest key in the set, if any.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.tree.last()
    }

    /// Removes every key, freeing all nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32> = (0..100).collect();
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// The walk is lazy and can be restarted by calling `traverse` again.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let set: BSet<usize> = BSet::from([3, 1, 2]);
    /// let keys: Vec<_> = set.traverse().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn traverse(&self) -> Iter<'_, K, N> {
        Iter {
            inner: self.tree.in_order(),
        }
    }

    /// Alias of [`traverse`](BSet::traverse).
    pub fn iter(&self) -> Iter<'_, K, N> {
        self.traverse()
    }

    /// Returns a displayable rendering of the node structure, one node per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let set: BSet<i32, 3> = BSet::from([5, 15, 25]);
    /// assert_eq!(set.tree_view().to_string(), "[15] children=2\n  [5]\n  [25]\n");
    /// ```
    pub fn tree_view(&self) -> TreeView<'_, K, N> {
        self.tree.dump()
    }
}

impl<K: Ord, const N: usize> BSet<K, N> {
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

impl<K: Ord + Clone, const N: usize> BSet<K, N> {
    /// Adds a key to the set.
    ///
    /// Returns whether the key was newly inserted. A key that is already present is left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32> = BSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) node visits, each splitting at most once.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert(key)
    }

    /// Removes a key from the set. Returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use mwtree::BSet;
    ///
    /// let mut set: BSet<i32> = BSet::from([2]);
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
    /// use mwtree::BSet;
    ///
    /// let set: BSet<i32> = BSet::from([1, 2, 3]);
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

    /// Alias of [`search`](BSet::search).
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key)
    }
}

impl<K: PartialEq, const N: usize> PartialEq for BSet<K, N> {
    fn eq(&self, other: &BSet<K, N>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, const N: usize> Eq for BSet<K, N> {}

impl<K: Clone, const N: usize> Clone for BSet<K, N> {
    fn clone(&self) -> Self {
        BSet {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, const N: usize> fmt::Debug for BSet<K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, const N: usize> Default for BSet<K, N> {
    fn default() -> Self {
        BSet::new()
    }
}

impl<K: Ord + Clone, const N: usize> FromIterator<K> for BSet<K, N> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = BSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord + Clone, const N: usize> Extend<K> for BSet<K, N> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy, const N: usize> Extend<&'a K> for BSet<K, N> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        for &key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + Clone, const N: usize, const M: usize> From<[K; M]> for BSet<K, N> {
    fn from(arr: [K; M]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, const N: usize> IntoIterator for &'a BSet<K, N> {
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
