use alloc::vec;
use alloc::vec::Vec;

use super::handle::Handle;
use super::node::{Kind, Node};
use super::raw_tree::RawTree;
use crate::error::Violation;

/// One pending node of the validation walk, with what its ancestors expect of it.
struct Frame<'a, K> {
    handle: Handle,
    parent: Option<Handle>,
    position: usize,
    depth: usize,
    // Exclusive upper bound; the lower bound is exclusive for B-trees and inclusive for B+trees.
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K: Ord, const N: usize> RawTree<K, N> {
    /// Checks every structural invariant, walking the tree depth-first without recursion.
    pub(crate) fn validate(&self) -> Result<(), Violation> {
        let Some(root) = self.root() else {
            return self.validate_empty();
        };

        let mut stack = vec![Frame {
            handle: root,
            parent: None,
            position: 0,
            depth: 1,
            lower: None,
            upper: None,
        }];
        let mut leaves: Vec<Handle> = Vec::new();
        let mut leaf_depth = None;
        let mut keys = 0usize;
        let mut reachable = 0usize;

        while let Some(frame) = stack.pop() {
            let node = self.node(frame.handle);
            reachable += 1;
            self.check_node(&frame, node)?;

            if node.is_leaf() {
                let expected = *leaf_depth.get_or_insert(frame.depth);
                if frame.depth != expected {
                    return Err(Violation::LeafDepth {
                        node: frame.handle.to_index(),
                        depth: frame.depth,
                        expected,
                    });
                }
                keys += node.key_count();
                leaves.push(frame.handle);
                continue;
            }

            if self.kind() == Kind::BTree {
                keys += node.key_count();
            } else {
                self.check_separators(frame.handle, node)?;
            }

            let last = node.key_count();
            for position in (0..node.child_count()).rev() {
                stack.push(Frame {
                    handle: node.child(position),
                    parent: Some(frame.handle),
                    position,
                    depth: frame.depth + 1,
                    lower: if position == 0 { frame.lower } else { Some(node.key(position - 1)) },
                    upper: if position == last { frame.upper } else { Some(node.key(position)) },
                });
            }
        }

        if keys != self.len() {
            return Err(Violation::Length {
                recorded: self.len(),
                actual: keys,
            });
        }
        if reachable != self.node_count() {
            return Err(Violation::Leak {
                allocated: self.node_count(),
                reachable,
            });
        }

        match self.kind() {
            Kind::BPlusTree => self.check_leaf_chain(&leaves),
            Kind::BTree if self.first_leaf().is_some() || self.last_leaf().is_some() => {
                Err(Violation::LeafChainOrder {
                    expected: None,
                    found: self.first_leaf().or(self.last_leaf()).map(Handle::to_index),
                })
            }
            Kind::BTree => Ok(()),
        }
    }

    fn validate_empty(&self) -> Result<(), Violation> {
        if self.len() != 0 {
            return Err(Violation::Length {
                recorded: self.len(),
                actual: 0,
            });
        }
        if self.node_count() != 0 {
            return Err(Violation::Leak {
                allocated: self.node_count(),
                reachable: 0,
            });
        }
        if let Some(leaf) = self.first_leaf().or(self.last_leaf()) {
            return Err(Violation::LeafChainOrder {
                expected: None,
                found: Some(leaf.to_index()),
            });
        }
        Ok(())
    }

    /// Parent link, occupancy, fan-out, ordering and ancestor bounds of a single node.
    fn check_node(&self, frame: &Frame<'_, K>, node: &Node<K, N>) -> Result<(), Violation> {
        let id = frame.handle.to_index();

        if node.parent() != frame.parent || (frame.parent.is_some() && node.parent_position() != frame.position) {
            return Err(Violation::ParentLink {
                node: id,
                parent: node.parent().map(Handle::to_index),
                position: node.parent_position(),
            });
        }

        let count = node.key_count();
        let min = if frame.parent.is_none() { 1 } else { Node::<K, N>::MIN_KEYS };
        if count < min || count > Node::<K, N>::MAX_KEYS {
            return Err(Violation::Occupancy {
                node: id,
                keys: count,
                min,
                max: Node::<K, N>::MAX_KEYS,
            });
        }
        if !node.is_leaf() && node.child_count() != count + 1 {
            return Err(Violation::ChildCount {
                node: id,
                keys: count,
                children: node.child_count(),
            });
        }

        let keys = node.keys();
        if let Some(index) = (1..count).find(|&i| keys[i - 1] >= keys[i]) {
            return Err(Violation::Unsorted { node: id, index });
        }

        let inclusive_lower = self.kind() == Kind::BPlusTree;
        let in_range = |key: &K| {
            let above = frame.lower.is_none_or(|lower| if inclusive_lower { lower <= key } else { lower < key });
            let below = frame.upper.is_none_or(|upper| key < upper);
            above && below
        };
        if let Some(index) = keys.iter().position(|key| !in_range(key)) {
            return Err(Violation::OutOfRange { node: id, index });
        }
        Ok(())
    }

    /// Every B+tree separator must equal the smallest key of the subtree to its right.
    fn check_separators(&self, handle: Handle, node: &Node<K, N>) -> Result<(), Violation> {
        for index in 0..node.key_count() {
            let leaf = self.leftmost_leaf(node.child(index + 1));
            if self.node(leaf).first_key() != Some(node.key(index)) {
                return Err(Violation::StaleSeparator {
                    node: handle.to_index(),
                    index,
                });
            }
        }
        Ok(())
    }

    /// The chain must be acyclic, visit `leaves` in order and link back correctly.
    fn check_leaf_chain(&self, leaves: &[Handle]) -> Result<(), Violation> {
        let step = |handle: Option<Handle>| handle.and_then(|handle| self.node(handle).next_leaf());

        let mut slow = self.first_leaf();
        let mut fast = self.first_leaf();
        loop {
            fast = step(step(fast));
            slow = step(slow);
            match (slow, fast) {
                (_, None) => break,
                (Some(slow), Some(fast)) if slow == fast => return Err(Violation::LeafChainCycle),
                _ => {}
            }
        }

        let mut previous = None;
        let mut current = self.first_leaf();
        for &expected in leaves {
            let Some(handle) = current.filter(|&handle| handle == expected) else {
                return Err(Violation::LeafChainOrder {
                    expected: Some(expected.to_index()),
                    found: current.map(Handle::to_index),
                });
            };
            let leaf = self.node(handle);
            if leaf.prev_leaf() != previous {
                return Err(Violation::LeafChainBackLink {
                    node: handle.to_index(),
                });
            }
            previous = Some(handle);
            current = leaf.next_leaf();
        }

        if current.is_some() || self.last_leaf() != previous {
            return Err(Violation::LeafChainOrder {
                expected: previous.map(Handle::to_index),
                found: current.or(self.last_leaf()).map(Handle::to_index),
            });
        }
        Ok(())
    }
}
