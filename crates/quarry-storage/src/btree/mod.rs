//! Page-based B+ tree index with latch crabbing.

mod index;
mod iterator;
mod node;
mod tree;
mod types;

pub use index::{BPlusTreeIndex, IndexIter};
pub use iterator::BPlusTreeIter;
pub use node::{InternalNode, LeafNode, NodeKind};
pub use tree::BPlusTree;
pub use types::{KeyComparator, OrdComparator, Storable};
