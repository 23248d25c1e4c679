use alloc::collections::VecDeque;
use core::borrow::Borrow;

use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Kind, Node, SearchResult};
use super::rebalance::{self, Repair};

/// The core multiway tree backing both `BSet` and `BPlusSet`.
///
/// Nodes point down to their children and up to their parent by handle; every node records its own
/// index among its parent's children so rebalancing never has to scan for it.
#[derive(Clone)]
pub(crate) struct RawTree<K, const N: usize> {
    /// Arena owning all tree nodes.
    nodes: Arena<Node<K, N>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of keys in the tree.
    len: usize,
    kind: Kind,
    /// First and last leaf of the leaf chain (B+tree only).
    first_leaf: Option<Handle>,
    last_leaf: Option<Handle>,
}

impl<K, const N: usize> RawTree<K, N> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(kind: Kind) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            kind,
            first_leaf: None,
            last_leaf: None,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn first_leaf(&self) -> Option<Handle> {
        self.first_leaf
    }

    pub(crate) fn last_leaf(&self) -> Option<Handle> {
        self.last_leaf
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, N> {
        self.nodes.get(handle)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, N> {
        self.nodes.get_mut(handle)
    }

    /// Allocates a node that nothing in the tree points at.
    #[cfg(test)]
    pub(crate) fn alloc_detached(&mut self, node: Node<K, N>) -> Handle {
        self.nodes.alloc(node)
    }

    /// Number of nodes currently allocated.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = self.nodes.get(handle).first_child();
        }
        height
    }

    pub(crate) fn leftmost_leaf(&self, from: Handle) -> Handle {
        let mut current = from;
        while let Some(child) = self.nodes.get(current).first_child() {
            current = child;
        }
        current
    }

    pub(crate) fn rightmost_leaf(&self, from: Handle) -> Handle {
        let mut current = from;
        while let Some(child) = self.nodes.get(current).last_child() {
            current = child;
        }
        current
    }

    pub(crate) fn first(&self) -> Option<&K> {
        let leaf = match self.kind {
            Kind::BPlusTree => self.first_leaf?,
            Kind::BTree => self.leftmost_leaf(self.root?),
        };
        self.nodes.get(leaf).first_key()
    }

    pub(crate) fn last(&self) -> Option<&K> {
        let leaf = match self.kind {
            Kind::BPlusTree => self.last_leaf?,
            Kind::BTree => self.rightmost_leaf(self.root?),
        };
        self.nodes.get(leaf).last_key()
    }

    /// Frees every node breadth-first, without recursion.
    pub(crate) fn clear(&mut self) {
        let mut queue: VecDeque<Handle> = self.root.into_iter().collect();
        let mut freed = 0usize;

        while let Some(handle) = queue.pop_front() {
            let node = self.nodes.take(handle);
            queue.extend(node.children().iter().copied());
            freed += 1;
        }

        debug!(nodes = freed, "tree cleared");
        self.nodes.reset();
        self.root = None;
        self.len = 0;
        self.first_leaf = None;
        self.last_leaf = None;
    }

    /// Points children `from..` of `parent` back at it, with their positions.
    fn adopt_children(&mut self, parent: Handle, from: usize) {
        let count = self.nodes.get(parent).child_count();
        for position in from..count {
            let child = self.nodes.get(parent).child(position);
            self.nodes.get_mut(child).set_parent(Some(parent), position);
        }
    }

    /// Threads a freshly split-off leaf into the chain right after `left`.
    fn link_leaf_after(&mut self, left: Handle, right: Handle) {
        let old_next = self.nodes.get(left).next_leaf();

        let right_node = self.nodes.get_mut(right);
        right_node.set_prev_leaf(Some(left));
        right_node.set_next_leaf(old_next);
        self.nodes.get_mut(left).set_next_leaf(Some(right));

        match old_next {
            Some(next) => self.nodes.get_mut(next).set_prev_leaf(Some(right)),
            None => self.last_leaf = Some(right),
        }
    }
}

impl<K: Ord + Clone, const N: usize> RawTree<K, N> {
    /// Walks down to the node that decides membership of `key`.
    ///
    /// A B-tree stops at the first node holding `key`; a B+tree always reaches a leaf.
    fn descend<Q>(&self, key: &Q) -> Option<(Handle, SearchResult)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            let result = node.search(key);
            let found = matches!(result, SearchResult::Found(_));
            if node.is_leaf() || (found && self.kind == Kind::BTree) {
                return Some((current, result));
            }
            current = node.child(node.descend_index(key));
        }
    }

    /// Returns true if the tree contains `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        matches!(self.descend(key), Some((_, SearchResult::Found(_))))
    }

    /// Inserts `key`, returning false if it was already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        if self.root.is_none() {
            let mut leaf = Node::new();
            leaf.push_key(key);
            let handle = self.nodes.alloc(leaf);
            self.root = Some(handle);
            if self.kind == Kind::BPlusTree {
                self.first_leaf = Some(handle);
                self.last_leaf = Some(handle);
            }
            self.len = 1;
            return true;
        }

        let (mut current, mut pos) = match self.descend(&key) {
            Some((handle, SearchResult::NotFound(pos))) => (handle, pos),
            _ => return false,
        };
        self.len += 1;

        let mut pending_key = key;
        let mut pending_child: Option<Handle> = None;

        loop {
            let node = self.nodes.get_mut(current);
            let overflow_key = node.insert_key(pos, pending_key);
            let overflow_child = pending_child.and_then(|child| node.insert_child(pos + 1, child));

            let Some(overflow_key) = overflow_key else {
                if pending_child.is_some() {
                    self.adopt_children(current, pos + 1);
                }
                return true;
            };

            let (separator, right) = node.split(self.kind, overflow_key, overflow_child);
            let right_is_leaf = right.is_leaf();
            trace!(left_keys = node.key_count(), right_keys = right.key_count(), "split node");

            let right = self.nodes.alloc(right);
            self.adopt_children(current, 0);
            self.adopt_children(right, 0);
            if self.kind == Kind::BPlusTree && right_is_leaf {
                self.link_leaf_after(current, right);
            }

            let node = self.nodes.get(current);
            match node.parent() {
                Some(parent) => {
                    pos = node.parent_position();
                    current = parent;
                    pending_key = separator;
                    pending_child = Some(right);
                }
                None => {
                    let root = self.nodes.alloc(Node::new_root(current, separator, right));
                    self.adopt_children(root, 0);
                    self.root = Some(root);
                    debug!(height = self.height(), "root split");
                    return true;
                }
            }
        }
    }

    /// Removes `key`, returning false if it was not present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, pos) = match self.descend(key) {
            Some((handle, SearchResult::Found(pos))) => (handle, pos),
            _ => return false,
        };

        let target = if self.nodes.get(handle).is_leaf() {
            let _ = self.nodes.get_mut(handle).remove_key(pos);
            handle
        } else {
            // B-tree key in an internal node: overwrite it with its in-order predecessor, which
            // always sits at the end of a leaf, and delete from there instead.
            let leaf = self.rightmost_leaf(self.nodes.get(handle).child(pos));
            let predecessor = self.nodes.get_mut(leaf).pop_key().expect("`RawTree::remove()` - empty leaf!");
            let _ = self.nodes.get_mut(handle).replace_key(pos, predecessor);
            leaf
        };
        self.len -= 1;

        self.rebalance(target);
        self.collapse_root();
        if self.kind == Kind::BPlusTree {
            self.refresh_separator(key);
        }
        true
    }

    /// Repairs underflow from `handle` upward until a node absorbs the change or the root is hit.
    fn rebalance(&mut self, mut handle: Handle) {
        loop {
            let node = self.nodes.get(handle);
            let Some(parent) = node.parent() else {
                return;
            };
            if !node.is_underfull() {
                return;
            }

            let position = node.parent_position();
            let parent_node = self.nodes.get(parent);
            let sibling = |index: usize| {
                let sibling = parent_node.child(index);
                (sibling, self.nodes.get(sibling).can_lend())
            };
            let left = position.checked_sub(1).map(sibling);
            let right = (position + 1 < parent_node.child_count()).then(|| sibling(position + 1));

            match rebalance::choose(left, right) {
                Repair::RedistributeLeft(left) => {
                    self.redistribute_left(parent, position, left, handle);
                    return;
                }
                Repair::RedistributeRight(right) => {
                    self.redistribute_right(parent, position, handle, right);
                    return;
                }
                Repair::MergeLeft(left) => self.merge(parent, position - 1, left, handle),
                Repair::MergeRight(right) => self.merge(parent, position, handle, right),
            }
            handle = parent;
        }
    }

    fn redistribute_left(&mut self, parent: Handle, position: usize, left: Handle, node: Handle) {
        let separator = self.nodes.get(parent).key(position - 1).clone();
        let (left_node, node_node) = self.nodes.get2_mut(left, node);
        let separator = rebalance::redistribute_left(self.kind, left_node, separator, node_node);
        let _ = self.nodes.get_mut(parent).replace_key(position - 1, separator);
        self.adopt_children(node, 0);
        trace!(position, "borrowed from left sibling");
    }

    fn redistribute_right(&mut self, parent: Handle, position: usize, node: Handle, right: Handle) {
        let separator = self.nodes.get(parent).key(position).clone();
        let (node_node, right_node) = self.nodes.get2_mut(node, right);
        let separator = rebalance::redistribute_right(self.kind, node_node, separator, right_node);
        let _ = self.nodes.get_mut(parent).replace_key(position, separator);
        self.adopt_children(node, 0);
        self.adopt_children(right, 0);
        trace!(position, "borrowed from right sibling");
    }

    /// Folds `right` into `left`, dropping separator `separator_index` and `right` from `parent`.
    fn merge(&mut self, parent: Handle, separator_index: usize, left: Handle, right: Handle) {
        let parent_node = self.nodes.get_mut(parent);
        let separator = parent_node.remove_key(separator_index);
        let removed = parent_node.remove_child(separator_index + 1);
        debug_assert_eq!(removed, right, "`RawTree::merge()` - sibling is not the separator's right child!");

        let right_node = self.nodes.take(right);
        let merged_leaves = right_node.is_leaf();
        rebalance::merge(self.kind, self.nodes.get_mut(left), separator, right_node);
        self.adopt_children(left, 0);
        self.adopt_children(parent, separator_index + 1);

        if self.kind == Kind::BPlusTree && merged_leaves {
            match self.nodes.get(left).next_leaf() {
                Some(next) => self.nodes.get_mut(next).set_prev_leaf(Some(left)),
                None => self.last_leaf = Some(left),
            }
        }
        trace!(separator_index, keys = self.nodes.get(left).key_count(), "merged siblings");
    }

    /// Replaces an empty root by its only child, or empties the tree.
    fn collapse_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let node = self.nodes.get(root);
        if node.key_count() > 0 {
            return;
        }

        match node.first_child() {
            Some(child) => {
                self.nodes.free(root);
                self.nodes.get_mut(child).set_parent(None, 0);
                self.root = Some(child);
                debug!(height = self.height(), "root collapsed");
            }
            None => {
                self.nodes.free(root);
                self.nodes.reset();
                self.root = None;
                self.first_leaf = None;
                self.last_leaf = None;
            }
        }
    }

    /// Overwrites the separator copy of a removed B+tree key with its in-order successor.
    fn refresh_separator<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(mut current) = self.root else {
            return;
        };

        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return;
            }
            if node.contains(key) {
                let pos = node.position(key);
                let leaf = self.leftmost_leaf(node.child(pos + 1));
                let successor = self.nodes.get(leaf).first_key().cloned();
                let successor = successor.expect("`RawTree::refresh_separator()` - empty leaf!");
                let _ = self.nodes.get_mut(current).replace_key(pos, successor);
                return;
            }
            current = node.child(node.descend_index(key));
        }
    }
}
