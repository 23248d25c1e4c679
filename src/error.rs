//! Diagnostics reported by the sets' `validate()` methods.

use thiserror::Error;

/// A broken structural invariant found by `validate()`.
///
/// Nodes are identified by their arena slot. A violation always means a bug in this crate, or a
/// key whose ordering changed while it was in the set.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Violation {
    #[error("node #{node} holds {keys} keys, expected {min}..={max}")]
    Occupancy { node: usize, keys: usize, min: usize, max: usize },

    #[error("node #{node} has {keys} keys but {children} children")]
    ChildCount { node: usize, keys: usize, children: usize },

    #[error("keys of node #{node} are not strictly ascending at index {index}")]
    Unsorted { node: usize, index: usize },

    #[error("key {index} of node #{node} lies outside the range its ancestors allow")]
    OutOfRange { node: usize, index: usize },

    #[error("separator {index} of node #{node} is not the smallest key of its right subtree")]
    StaleSeparator { node: usize, index: usize },

    #[error("node #{node} is linked to parent {parent:?} at position {position} inconsistently")]
    ParentLink { node: usize, parent: Option<usize>, position: usize },

    #[error("leaf #{node} sits at depth {depth}, expected {expected}")]
    LeafDepth { node: usize, depth: usize, expected: usize },

    #[error("leaf chain does not terminate")]
    LeafChainCycle,

    #[error("leaf chain reaches slot {found:?} where tree order expects slot {expected:?}")]
    LeafChainOrder { expected: Option<usize>, found: Option<usize> },

    #[error("leaf #{node} does not point back at its predecessor")]
    LeafChainBackLink { node: usize },

    #[error("tree records {recorded} keys but holds {actual}")]
    Length { recorded: usize, actual: usize },

    #[error("{allocated} nodes are allocated but only {reachable} are reachable")]
    Leak { allocated: usize, reachable: usize },
}
