//! Buffer pool management for QuarryDB.
//!
//! This crate provides in-memory page caching with:
//! - Fixed-size buffer pool with configurable page count
//! - LRU-K eviction policy for cache management
//! - Pin counting for concurrent access
//! - RAII page guards pairing pins with page latches

mod disk;
mod frame;
mod guard;
mod pool;
mod replacer;

pub use disk::{DiskManager, MemoryDiskManager};
pub use frame::{Frame, FrameId};
pub use guard::{PageGuard, ReadPageGuard, WritePageGuard};
pub use pool::{BufferPoolManager, BufferPoolStats};
pub use replacer::{LruKReplacer, Replacer};
