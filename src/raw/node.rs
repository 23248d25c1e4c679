use core::borrow::Borrow;

use super::bounded::Bounded;
use super::handle::Handle;

/// Which multiway tree a node belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Kind {
    /// Keys live at every level; each key is stored exactly once.
    BTree,
    /// Keys are authoritative only in leaves; internal keys are routing copies and leaves form a
    /// doubly linked chain.
    BPlusTree,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

/// A tree node of order `N` (at most `N` children, `N - 1` keys).
///
/// Leaves and internal nodes share one layout: a node is a leaf exactly when it has no children.
#[derive(Clone)]
pub(crate) struct Node<K, const N: usize> {
    keys: Bounded<K, N, 1>,
    children: Bounded<Handle, N, 0>,
    parent: Option<Handle>,
    // Index of this node in `parent.children`; meaningless for the root.
    parent_position: usize,
    // Leaf chain, maintained for B+tree leaves only.
    prev_leaf: Option<Handle>,
    next_leaf: Option<Handle>,
}

impl<K, const N: usize> Node<K, N> {
    pub(crate) const MAX_KEYS: usize = N - 1;
    pub(crate) const MIN_KEYS: usize = N.div_ceil(2) - 1;

    const VALID_ORDER: () = assert!(N >= 3, "tree order must be at least 3");

    /// Creates a new empty leaf node.
    pub(crate) fn new() -> Self {
        let () = Self::VALID_ORDER;
        Self {
            keys: Bounded::new(),
            children: Bounded::new(),
            parent: None,
            parent_position: 0,
            prev_leaf: None,
            next_leaf: None,
        }
    }

    /// Creates a root holding a single separator between two subtrees.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut root = Self::new();
        root.keys.push(separator);
        root.children.push(left);
        root.children.push(right);
        root
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// True when a non-root node holds fewer than the minimum number of keys.
    pub(crate) fn is_underfull(&self) -> bool {
        self.keys.len() < Self::MIN_KEYS
    }

    /// True when this node can give a key to a sibling and stay at or above the minimum.
    pub(crate) fn can_lend(&self) -> bool {
        self.keys.len() > Self::MIN_KEYS
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn first_child(&self) -> Option<Handle> {
        self.children.first().copied()
    }

    pub(crate) fn last_child(&self) -> Option<Handle> {
        self.children.last().copied()
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn parent_position(&self) -> usize {
        self.parent_position
    }

    /// Records this node as child `position` of `parent`.
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>, position: usize) {
        self.parent = parent;
        self.parent_position = position;
    }

    pub(crate) fn prev_leaf(&self) -> Option<Handle> {
        self.prev_leaf
    }

    pub(crate) fn set_prev_leaf(&mut self, prev: Option<Handle>) {
        self.prev_leaf = prev;
    }

    pub(crate) fn next_leaf(&self) -> Option<Handle> {
        self.next_leaf
    }

    pub(crate) fn set_next_leaf(&mut self, next: Option<Handle>) {
        self.next_leaf = next;
    }

    /// Ordered search within this node's keys.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        matches!(self.search(key), SearchResult::Found(_))
    }

    /// Index of `key`, which must be present.
    pub(crate) fn position<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(idx) => idx,
            SearchResult::NotFound(_) => panic!("`Node::position()` - key is not in this node!"),
        }
    }

    /// Index of the child to follow for `key`: the first `i` with `key < keys[i]`, else `len`.
    ///
    /// A key equal to `keys[i]` routes right, to `children[i + 1]`.
    #[inline]
    pub(crate) fn descend_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() <= key)
    }

    /// Inserts `key` at `pos`, returning the overflow key if the node was already full.
    pub(crate) fn insert_key(&mut self, pos: usize, key: K) -> Option<K> {
        self.keys.insert(pos, key)
    }

    /// Inserts `child` at `pos`, returning the overflow child if the node was already full.
    pub(crate) fn insert_child(&mut self, pos: usize, child: Handle) -> Option<Handle> {
        self.children.insert(pos, child)
    }

    pub(crate) fn remove_key(&mut self, pos: usize) -> K {
        self.keys.remove(pos)
    }

    pub(crate) fn remove_child(&mut self, pos: usize) -> Handle {
        self.children.remove(pos)
    }

    pub(crate) fn push_key(&mut self, key: K) {
        self.keys.push(key);
    }

    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    pub(crate) fn pop_key(&mut self) -> Option<K> {
        self.keys.pop()
    }

    pub(crate) fn pop_child(&mut self) -> Option<Handle> {
        self.children.pop()
    }

    /// Overwrites the key at `index`, returning the previous value.
    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        self.keys.replace(index, key)
    }

    /// Splits a node whose keys plus `overflow_key` form `MAX_KEYS + 1` ascending keys (and whose
    /// children plus `overflow_child` form `N + 1` children, for internal nodes).
    ///
    /// The first `MIN_KEYS` keys stay here and the key at index `MIN_KEYS` is returned as the
    /// separator. The keys after it move into the returned right sibling, except for B+tree
    /// leaves, where the separator is copied and also becomes the right sibling's first key.
    ///
    /// The returned sibling has no parent and no leaf links; its children still name `self` as
    /// their parent until the caller re-homes them.
    pub(crate) fn split(&mut self, kind: Kind, overflow_key: K, overflow_child: Option<Handle>) -> (K, Self)
    where
        K: Clone,
    {
        assert!(self.keys.is_full(), "`Node::split()` - node is not full!");
        assert_eq!(
            overflow_child.is_some(),
            !self.is_leaf(),
            "`Node::split()` - overflow child must accompany internal nodes only!"
        );

        let mut right = Self::new();
        let mut upper = self.keys.split_off(Self::MIN_KEYS);
        upper.push(overflow_key);

        let separator = if kind == Kind::BPlusTree && self.is_leaf() {
            upper[0].clone()
        } else {
            upper.remove(0)
        };
        right.keys.extend(upper);

        if let Some(overflow_child) = overflow_child {
            let mut moved = self.children.split_off(Self::MIN_KEYS + 1);
            moved.push(overflow_child);
            right.children.extend(moved);
        }

        (separator, right)
    }

    /// Appends `separator` (when given) and every key and child of `right`.
    ///
    /// Leaf links are inherited from `right`'s successor side.
    pub(crate) fn absorb(&mut self, separator: Option<K>, right: Self) {
        if let Some(separator) = separator {
            self.keys.push(separator);
        }
        self.next_leaf = right.next_leaf;
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }
}
