mod arena;
mod bounded;
mod check;
mod dump;
mod handle;
mod iter;
mod node;
mod raw_tree;
mod rebalance;

pub use dump::TreeView;
pub(crate) use iter::{InOrder, LeafWalk};
pub(crate) use node::{Kind, Node};
pub(crate) use raw_tree::RawTree;
