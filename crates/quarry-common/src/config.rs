//! Configuration structures for QuarryDB.

use crate::page::PageId;
use serde::{Deserialize, Serialize};

/// Configuration for the buffer pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool.
    pub pool_size: usize,
    /// LRU-K history window: number of recent accesses tracked per frame.
    pub replacer_k: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 1024,
            replacer_k: 2,
        }
    }
}

/// Configuration for a B+ tree index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BTreeConfig {
    /// Maximum number of entries in a leaf page.
    pub leaf_max_size: usize,
    /// Maximum number of entries in an internal page.
    pub internal_max_size: usize,
    /// Page holding the tree's root pointer.
    pub header_page_id: PageId,
}

impl BTreeConfig {
    /// Creates a config with the given fan-outs and header page.
    pub fn new(leaf_max_size: usize, internal_max_size: usize, header_page_id: PageId) -> Self {
        Self {
            leaf_max_size,
            internal_max_size,
            header_page_id,
        }
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            leaf_max_size: 128,
            internal_max_size: 128,
            header_page_id: PageId(0),
        }
    }
}
