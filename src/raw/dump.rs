use core::fmt;

use smallvec::SmallVec;

use super::handle::Handle;
use super::raw_tree::RawTree;

/// Human-readable rendering of a tree's node structure, returned by `tree_view()`.
///
/// Nodes are printed pre-order, one per line, indented two spaces per level below the root.
/// Internal nodes also show their child count:
///
/// ```text
/// [15] children=2
///   [5]
///   [15 25]
/// ```
///
/// An empty tree renders as `(empty)`.
#[must_use = "a tree view does nothing unless displayed"]
pub struct TreeView<'a, K, const N: usize> {
    tree: &'a RawTree<K, N>,
}

impl<K, const N: usize> RawTree<K, N> {
    pub(crate) fn dump(&self) -> TreeView<'_, K, N> {
        TreeView { tree: self }
    }
}

impl<K: fmt::Debug, const N: usize> fmt::Display for TreeView<'_, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.tree.root() else {
            return writeln!(f, "(empty)");
        };

        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        stack.push((root, 0));

        while let Some((handle, depth)) = stack.pop() {
            let node = self.tree.node(handle);
            write!(f, "{:width$}[", "", width = depth * 2)?;
            for (index, key) in node.keys().iter().enumerate() {
                if index > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{key:?}")?;
            }
            f.write_str("]")?;
            if !node.is_leaf() {
                write!(f, " children={}", node.child_count())?;
            }
            writeln!(f)?;

            stack.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }
        Ok(())
    }
}

impl<K: fmt::Debug, const N: usize> fmt::Debug for TreeView<'_, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::node::Kind;
    use alloc::string::ToString;

    #[test]
    fn empty_tree_renders_placeholder() {
        let tree: RawTree<i32, 3> = RawTree::new(Kind::BTree);
        assert_eq!(tree.dump().to_string(), "(empty)\n");
    }

    #[test]
    fn single_leaf_has_no_child_count() {
        let mut tree: RawTree<&str, 5> = RawTree::new(Kind::BPlusTree);
        tree.insert("b");
        tree.insert("a");
        assert_eq!(tree.dump().to_string(), "[\"a\" \"b\"]\n");
    }

    #[test]
    fn three_levels_indent_by_depth() {
        let mut tree: RawTree<i32, 3> = RawTree::new(Kind::BTree);
        for key in 1..=7 {
            tree.insert(key);
        }
        let expected = "[4] children=2\n  [2] children=2\n    [1]\n    [3]\n  [6] children=2\n    [5]\n    [7]\n";
        assert_eq!(tree.dump().to_string(), expected);
    }
}
