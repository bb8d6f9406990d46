//! Forward iterator over the B+ tree leaf chain.

use super::node::LeafNode;
use super::types::Storable;
use quarry_buffer::{BufferPoolManager, ReadPageGuard};
use quarry_common::page::PageId;
use quarry_common::Result;
use std::sync::Arc;

/// One-way cursor over `(key, value)` pairs in key order.
///
/// Holds at most one read guard: the guard on the current leaf. Moving
/// to the next leaf acquires the next guard before the previous one is
/// released, so concurrent readers are never blocked and the current
/// leaf cannot change underneath the cursor.
pub struct BPlusTreeIter<K, V> {
    bpm: Arc<BufferPoolManager>,
    page_id: PageId,
    index: usize,
    guard: Option<ReadPageGuard>,
    leaf: Option<LeafNode<K, V>>,
}

impl<K: Storable, V: Storable> BPlusTreeIter<K, V> {
    /// An exhausted iterator.
    pub(crate) fn end(bpm: Arc<BufferPoolManager>) -> Self {
        Self {
            bpm,
            page_id: PageId::INVALID,
            index: 0,
            guard: None,
            leaf: None,
        }
    }

    /// An iterator positioned at `index` within the guarded leaf.
    ///
    /// If `index` is past the leaf's last entry the cursor rolls forward
    /// to the first entry of the next non-empty leaf.
    pub(crate) fn at(bpm: Arc<BufferPoolManager>, guard: ReadPageGuard, index: usize) -> Self {
        let leaf = LeafNode::<K, V>::from_bytes(guard.data());
        let mut iter = Self {
            bpm,
            page_id: guard.page_id(),
            index,
            guard: Some(guard),
            leaf: Some(leaf),
        };
        if let Err(error) = iter.skip_exhausted() {
            log::warn!("iterator failed to position: {}", error);
            iter.finish();
        }
        iter
    }

    /// Returns true once the cursor has moved past the last leaf.
    pub fn is_end(&self) -> bool {
        !self.page_id.is_valid()
    }

    fn finish(&mut self) {
        self.page_id = PageId::INVALID;
        self.index = 0;
        self.guard = None;
        self.leaf = None;
    }

    /// Rolls the cursor forward while it sits past the current leaf's
    /// entries, following `next_page_id` through empty leaves.
    fn skip_exhausted(&mut self) -> Result<()> {
        loop {
            let Some(leaf) = &self.leaf else {
                return Ok(());
            };
            if self.index < leaf.size() {
                return Ok(());
            }
            let next_page_id = leaf.next_page_id();
            if !next_page_id.is_valid() {
                self.finish();
                return Ok(());
            }
            // Fetch the next leaf before the old guard is dropped.
            let next_guard = self.bpm.fetch_page_read(next_page_id)?;
            let next_leaf = LeafNode::<K, V>::from_bytes(next_guard.data());
            self.page_id = next_page_id;
            self.index = 0;
            self.guard = Some(next_guard);
            self.leaf = Some(next_leaf);
        }
    }

    /// Yields the next entry in ascending key order.
    pub fn next(&mut self) -> Result<Option<(K, V)>> {
        if self.is_end() {
            return Ok(None);
        }
        let leaf = self
            .leaf
            .as_ref()
            .expect("positioned iterator holds a leaf");
        let entry = (leaf.key_at(self.index), leaf.value_at(self.index));
        self.index += 1;
        self.skip_exhausted()?;
        Ok(Some(entry))
    }
}
