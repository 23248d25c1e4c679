use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::handle::Handle;
use super::raw_tree::RawTree;

/// Lazy in-order walk of a B-tree using an explicit stack of `(node, next key index)`.
pub(crate) struct InOrder<'a, K, const N: usize> {
    tree: &'a RawTree<K, N>,
    stack: SmallVec<[(Handle, usize); 16]>,
    remaining: usize,
}

impl<'a, K, const N: usize> InOrder<'a, K, N> {
    fn descend_left(&mut self, from: Handle) {
        let mut current = Some(from);
        while let Some(handle) = current {
            self.stack.push((handle, 0));
            current = self.tree.node(handle).first_child();
        }
    }
}

impl<K, const N: usize> Clone for InOrder<'_, K, N> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Walk over the B+tree leaf chain, from both ends.
///
/// `front` is the next leaf position to yield; `back` is one past the last, so the two cursors meet
/// when `remaining` reaches zero. Needs no auxiliary space beyond the cursors.
pub(crate) struct LeafWalk<'a, K, const N: usize> {
    tree: &'a RawTree<K, N>,
    front: Option<(Handle, usize)>,
    back: Option<(Handle, usize)>,
    remaining: usize,
}

impl<K, const N: usize> Clone for LeafWalk<'_, K, N> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K, const N: usize> RawTree<K, N> {
    /// Ascending walk of a B-tree.
    pub(crate) fn in_order(&self) -> InOrder<'_, K, N> {
        let mut iter = InOrder {
            tree: self,
            stack: SmallVec::new(),
            remaining: self.len(),
        };
        if let Some(root) = self.root() {
            iter.descend_left(root);
        }
        iter
    }

    /// Ascending walk of a B+tree's leaf chain.
    pub(crate) fn leaf_walk(&self) -> LeafWalk<'_, K, N> {
        LeafWalk {
            tree: self,
            front: self.first_leaf().map(|first| (first, 0)),
            back: self.last_leaf().map(|last| (last, self.node(last).key_count())),
            remaining: self.len(),
        }
    }
}

impl<'a, K, const N: usize> Iterator for InOrder<'a, K, N> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let (handle, index) = self.stack.last_mut()?;
            let node = tree.node(*handle);
            if *index == node.key_count() {
                self.stack.pop();
                continue;
            }

            let key = node.key(*index);
            *index += 1;
            let next_index = *index;
            if !node.is_leaf() {
                self.descend_left(node.child(next_index));
            }
            self.remaining -= 1;
            return Some(key);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, const N: usize> ExactSizeIterator for InOrder<'_, K, N> {}

impl<K, const N: usize> FusedIterator for InOrder<'_, K, N> {}

impl<'a, K, const N: usize> Iterator for LeafWalk<'a, K, N> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        loop {
            let (handle, index) = self.front?;
            let node = tree.node(handle);
            if index < node.key_count() {
                self.front = Some((handle, index + 1));
                self.remaining -= 1;
                return Some(node.key(index));
            }
            self.front = node.next_leaf().map(|next| (next, 0));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, const N: usize> DoubleEndedIterator for LeafWalk<'a, K, N> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        loop {
            let (handle, end) = self.back?;
            let node = tree.node(handle);
            if end > 0 {
                self.back = Some((handle, end - 1));
                self.remaining -= 1;
                return Some(node.key(end - 1));
            }
            self.back = node.prev_leaf().map(|prev| (prev, tree.node(prev).key_count()));
        }
    }
}

impl<K, const N: usize> ExactSizeIterator for LeafWalk<'_, K, N> {}

impl<K, const N: usize> FusedIterator for LeafWalk<'_, K, N> {}
