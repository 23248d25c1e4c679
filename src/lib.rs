//! In-memory ordered key sets backed by multiway search trees.
//!
//! This crate provides two sets with the same interface and different layouts:
//!
//! - [`BSet`] - a classic B-tree: every key is stored exactly once, at whatever level it lands.
//! - [`BPlusSet`] - a B+tree: all keys live in leaves, internal nodes hold routing copies, and the
//!   leaves form a doubly linked chain that is walked for ordered iteration.
//!
//! Both are parameterised by their order `N`, the maximum number of children per node. A node
//! holds at most `N - 1` keys and, unless it is the root, at least `ceil(N / 2) - 1`.
//!
//! # Example
//!
//! ```
//! use mwtree::{BPlusSet, BSet};
//!
//! let mut btree: BSet<i32, 3> = BSet::new();
//! let mut bplus: BPlusSet<i32, 3> = BPlusSet::new();
//!
//! for key in [5, 15, 25, 35, 45] {
//!     btree.insert(key);
//!     bplus.insert(key);
//! }
//!
//! // Same contents, different shapes.
//! assert!(btree.iter().eq(bplus.iter()));
//! assert_eq!(btree.tree_view().to_string(), "[15 35] children=3\n  [5]\n  [25]\n  [45]\n");
//! assert_eq!(bplus.tree_view().to_string(), "[25] children=2\n  [15] children=2\n    [5]\n    [15]\n  [35] children=2\n    [25]\n    [35 45]\n");
//!
//! // The B+tree iterates its leaf chain from either end.
//! assert_eq!(bplus.iter().rev().next(), Some(&45));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Structural validation** - `validate()` checks every invariant and reports a [`Violation`]
//! - **Structured tracing** - Splits, borrows, merges and height changes emit [`tracing`] events
//!
//! # Implementation
//!
//! Nodes live in a slot arena and refer to each other by index, including an upward link to
//! their parent and their position within it. Overflow and underflow are repaired iteratively
//! from the affected leaf towards the root; no operation recurses.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod bplus_set;
pub mod bset;
pub mod error;

pub use bplus_set::BPlusSet;
pub use bset::BSet;
pub use error::Violation;
pub use raw::TreeView;
