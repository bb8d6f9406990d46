//! Storage engine for QuarryDB.
//!
//! This crate provides:
//! - File-backed disk manager for page-level I/O
//! - Tuple representation and serialization
//! - Slotted heap pages and the table heap
//! - Concurrent B+ tree index with latch crabbing

mod btree;
mod disk;
mod heap;
mod tuple;

pub use btree::{
    BPlusTree, BPlusTreeIndex, BPlusTreeIter, IndexIter, InternalNode, KeyComparator, LeafNode,
    NodeKind, OrdComparator, Storable,
};
pub use disk::{DiskManagerConfig, FileDiskManager};
pub use heap::{TableHeap, TableIter, TablePage};
pub use tuple::{Rid, Tuple, TupleMeta};
