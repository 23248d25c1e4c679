//! Underflow repair: choosing a strategy and applying it to a pair of sibling nodes.
//!
//! Each function here touches only the nodes handed to it. Re-homing moved children, relinking
//! the leaf chain and writing separators back into the parent are left to the tree.

use super::node::{Kind, Node};

/// How to repair an underfull node, carrying the sibling involved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Repair<S> {
    /// Rotate the left sibling's last entry through the parent.
    RedistributeLeft(S),
    /// Rotate the right sibling's first entry through the parent.
    RedistributeRight(S),
    /// Fold the underfull node into its left sibling.
    MergeLeft(S),
    /// Fold the right sibling into the underfull node.
    MergeRight(S),
}

/// Picks a repair given each existing sibling and whether it can lend a key.
///
/// Borrowing beats merging and the left side beats the right.
pub(crate) fn choose<S>(left: Option<(S, bool)>, right: Option<(S, bool)>) -> Repair<S> {
    match (left, right) {
        (Some((sibling, true)), _) => Repair::RedistributeLeft(sibling),
        (_, Some((sibling, true))) => Repair::RedistributeRight(sibling),
        (Some((sibling, _)), _) => Repair::MergeLeft(sibling),
        (None, Some((sibling, _))) => Repair::MergeRight(sibling),
        (None, None) => panic!("`rebalance::choose()` - underfull node has no siblings!"),
    }
}

/// Moves the last entry of `left` into the front of `node`.
///
/// `separator` is the parent key between the two; the returned key replaces it.
pub(crate) fn redistribute_left<K: Clone, const N: usize>(
    kind: Kind,
    left: &mut Node<K, N>,
    separator: K,
    node: &mut Node<K, N>,
) -> K {
    let borrowed = left.pop_key().expect("`rebalance::redistribute_left()` - left sibling is empty!");

    if kind == Kind::BPlusTree && node.is_leaf() {
        let separator = borrowed.clone();
        let _ = node.insert_key(0, borrowed);
        return separator;
    }

    let _ = node.insert_key(0, separator);
    if let Some(child) = left.pop_child() {
        let _ = node.insert_child(0, child);
    }
    borrowed
}

/// Moves the first entry of `right` onto the end of `node`.
///
/// `separator` is the parent key between the two; the returned key replaces it.
pub(crate) fn redistribute_right<K: Clone, const N: usize>(
    kind: Kind,
    node: &mut Node<K, N>,
    separator: K,
    right: &mut Node<K, N>,
) -> K {
    let borrowed = right.remove_key(0);

    if kind == Kind::BPlusTree && node.is_leaf() {
        node.push_key(borrowed);
        return right.first_key().cloned().expect("`rebalance::redistribute_right()` - right sibling emptied!");
    }

    node.push_key(separator);
    if !right.is_leaf() {
        node.push_child(right.remove_child(0));
    }
    borrowed
}

/// Concatenates `left`, the parent `separator` and `right` into `left`.
///
/// B+tree leaves drop the separator, which only copies `right`'s first key.
pub(crate) fn merge<K, const N: usize>(kind: Kind, left: &mut Node<K, N>, separator: K, right: Node<K, N>) {
    if kind == Kind::BPlusTree && left.is_leaf() {
        left.absorb(None, right);
    } else {
        left.absorb(Some(separator), right);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::handle::Handle;

    fn node<const N: usize>(keys: &[i32], children: &[usize]) -> Node<i32, N> {
        let mut node = Node::new();
        for &key in keys {
            node.push_key(key);
        }
        for &child in children {
            node.push_child(Handle::from_index(child));
        }
        node
    }

    fn children<const N: usize>(node: &Node<i32, N>) -> alloc::vec::Vec<usize> {
        node.children().iter().map(|h| h.to_index()).collect()
    }

    #[test]
    fn choose_prefers_redistribution_then_left() {
        assert_eq!(choose(Some(("l", true)), Some(("r", true))), Repair::RedistributeLeft("l"));
        assert_eq!(choose(Some(("l", false)), Some(("r", true))), Repair::RedistributeRight("r"));
        assert_eq!(choose(None, Some(("r", true))), Repair::RedistributeRight("r"));
        assert_eq!(choose(Some(("l", false)), Some(("r", false))), Repair::MergeLeft("l"));
        assert_eq!(choose(Some(("l", false)), None), Repair::MergeLeft("l"));
        assert_eq!(choose(None, Some(("r", false))), Repair::MergeRight("r"));
    }

    #[test]
    #[should_panic(expected = "`rebalance::choose()` - underfull node has no siblings!")]
    fn choose_without_siblings_panics() {
        let _ = choose::<()>(None, None);
    }

    #[test]
    fn btree_leaf_redistribute_rotates_through_parent() {
        let mut left = node::<5>(&[1, 2, 3], &[]);
        let mut under = node::<5>(&[9], &[]);
        let separator = redistribute_left(Kind::BTree, &mut left, 5, &mut under);
        assert_eq!(separator, 3);
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(under.keys(), &[5, 9]);

        let mut under = node::<5>(&[1], &[]);
        let mut right = node::<5>(&[7, 8, 9], &[]);
        let separator = redistribute_right(Kind::BTree, &mut under, 5, &mut right);
        assert_eq!(separator, 7);
        assert_eq!(under.keys(), &[1, 5]);
        assert_eq!(right.keys(), &[8, 9]);
    }

    #[test]
    fn bplus_leaf_redistribute_moves_keys_directly() {
        let mut left = node::<5>(&[1, 2, 3], &[]);
        let mut under = node::<5>(&[9], &[]);
        let separator = redistribute_left(Kind::BPlusTree, &mut left, 5, &mut under);
        assert_eq!(separator, 3);
        assert_eq!(under.keys(), &[3, 9]);

        let mut under = node::<5>(&[1], &[]);
        let mut right = node::<5>(&[5, 8, 9], &[]);
        let separator = redistribute_right(Kind::BPlusTree, &mut under, 5, &mut right);
        assert_eq!(separator, 8);
        assert_eq!(under.keys(), &[1, 5]);
        assert_eq!(right.keys(), &[8, 9]);
    }

    #[test]
    fn internal_redistribute_moves_edge_child() {
        for kind in [Kind::BTree, Kind::BPlusTree] {
            let mut left = node::<5>(&[10, 20, 30], &[0, 1, 2, 3]);
            let mut under = node::<5>(&[50], &[4, 5]);
            let separator = redistribute_left(kind, &mut left, 40, &mut under);
            assert_eq!(separator, 30);
            assert_eq!(under.keys(), &[40, 50]);
            assert_eq!(children(&under), [3, 4, 5]);
            assert_eq!(children(&left), [0, 1, 2]);

            let mut under = node::<5>(&[10], &[0, 1]);
            let mut right = node::<5>(&[30, 40, 50], &[2, 3, 4, 5]);
            let separator = redistribute_right(kind, &mut under, 20, &mut right);
            assert_eq!(separator, 30);
            assert_eq!(under.keys(), &[10, 20]);
            assert_eq!(children(&under), [0, 1, 2]);
            assert_eq!(children(&right), [3, 4, 5]);
        }
    }

    #[test]
    fn merge_pulls_separator_down_except_for_bplus_leaves() {
        let mut left = node::<5>(&[1, 2], &[]);
        merge(Kind::BTree, &mut left, 3, node::<5>(&[4], &[]));
        assert_eq!(left.keys(), &[1, 2, 3, 4]);

        let mut left = node::<5>(&[1, 2], &[]);
        merge(Kind::BPlusTree, &mut left, 4, node::<5>(&[4], &[]));
        assert_eq!(left.keys(), &[1, 2, 4]);

        let mut left = node::<5>(&[10], &[0, 1]);
        merge(Kind::BPlusTree, &mut left, 20, node::<5>(&[30], &[2, 3]));
        assert_eq!(left.keys(), &[10, 20, 30]);
        assert_eq!(children(&left), [0, 1, 2, 3]);
    }
}
