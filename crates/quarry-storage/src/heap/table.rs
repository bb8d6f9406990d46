//! Table heap: a linked chain of slotted pages behind the buffer pool.

use super::page::TablePage;
use crate::tuple::{Rid, Tuple, TupleMeta};
use bytes::Bytes;
use parking_lot::Mutex;
use quarry_buffer::BufferPoolManager;
use quarry_common::page::PageId;
use quarry_common::{QuarryError, Result};
use std::sync::Arc;

/// A table stored as a singly-linked chain of slotted pages.
///
/// Inserts append to the last page and grow the chain on demand; the
/// append path is serialized by a small mutex while reads go straight
/// through page guards.
pub struct TableHeap {
    bpm: Arc<BufferPoolManager>,
    first_page_id: PageId,
    last_page_id: Mutex<PageId>,
}

impl TableHeap {
    /// Creates a new, empty table heap with one page.
    pub fn new(bpm: Arc<BufferPoolManager>) -> Result<Self> {
        let mut guard = bpm.new_page()?.upgrade_write();
        let first_page_id = guard.page_id();
        TablePage::init(guard.data_mut());
        drop(guard);

        log::debug!("created table heap rooted at {}", first_page_id);
        Ok(Self {
            bpm,
            first_page_id,
            last_page_id: Mutex::new(first_page_id),
        })
    }

    /// Returns the first page of the chain.
    pub fn first_page_id(&self) -> PageId {
        self.first_page_id
    }

    /// Inserts a tuple, returning its record id.
    ///
    /// Returns `Ok(None)` only when the payload can never fit a page.
    pub fn insert_tuple(&self, meta: TupleMeta, tuple: &Tuple) -> Result<Option<Rid>> {
        let payload = tuple.data();
        if payload.len() > TablePage::MAX_TUPLE_SIZE {
            return Ok(None);
        }

        let mut last = self.last_page_id.lock();
        let mut guard = self.bpm.fetch_page_write(*last)?;
        loop {
            if let Some(slot) = TablePage::insert_tuple(guard.data_mut(), meta, payload) {
                return Ok(Some(Rid::new(guard.page_id(), slot)));
            }

            // Current tail is full: allocate, link, and move right.
            let mut new_guard = self.bpm.new_page()?.upgrade_write();
            let new_page_id = new_guard.page_id();
            TablePage::init(new_guard.data_mut());
            TablePage::set_next_page_id(guard.data_mut(), new_page_id);
            log::trace!("table heap grew with {}", new_page_id);

            *last = new_page_id;
            guard = new_guard;
        }
    }

    /// Reads a tuple and its metadata.
    pub fn get_tuple(&self, rid: Rid) -> Result<(TupleMeta, Tuple)> {
        let guard = self.bpm.fetch_page_read(rid.page_id)?;
        let (meta, payload) = TablePage::get_tuple(guard.data(), rid.slot)
            .ok_or_else(|| QuarryError::TupleNotFound(rid.to_string()))?;
        let tuple = Tuple::from_bytes(rid, Bytes::copy_from_slice(payload));
        Ok((meta, tuple))
    }

    /// Rewrites a tuple's metadata (tombstoning and un-tombstoning).
    pub fn update_tuple_meta(&self, meta: TupleMeta, rid: Rid) -> Result<()> {
        let mut guard = self.bpm.fetch_page_write(rid.page_id)?;
        if !TablePage::update_tuple_meta(guard.data_mut(), rid.slot, meta) {
            return Err(QuarryError::TupleNotFound(rid.to_string()));
        }
        Ok(())
    }

    /// Returns a forward iterator over the whole heap.
    ///
    /// Deleted tuples are yielded with their metadata; callers filter.
    pub fn iter(&self) -> TableIter {
        TableIter {
            bpm: Arc::clone(&self.bpm),
            page_id: self.first_page_id,
            slot: 0,
        }
    }
}

/// Forward cursor over a table heap.
pub struct TableIter {
    bpm: Arc<BufferPoolManager>,
    page_id: PageId,
    slot: u16,
}

impl TableIter {
    /// Yields the next tuple, deleted or not, in chain order.
    pub fn next(&mut self) -> Result<Option<(TupleMeta, Tuple)>> {
        loop {
            if !self.page_id.is_valid() {
                return Ok(None);
            }
            let guard = self.bpm.fetch_page_read(self.page_id)?;
            if self.slot < TablePage::slot_count(guard.data()) {
                let rid = Rid::new(self.page_id, self.slot);
                let (meta, payload) = TablePage::get_tuple(guard.data(), self.slot)
                    .ok_or_else(|| QuarryError::TupleNotFound(rid.to_string()))?;
                let tuple = Tuple::from_bytes(rid, Bytes::copy_from_slice(payload));
                self.slot += 1;
                return Ok(Some((meta, tuple)));
            }
            self.page_id = TablePage::next_page_id(guard.data());
            self.slot = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_buffer::MemoryDiskManager;
    use quarry_common::{BufferPoolConfig, Column, Schema, TypeId, Value};

    fn test_heap() -> TableHeap {
        let bpm = Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 16,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ));
        TableHeap::new(bpm).unwrap()
    }

    fn row_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", TypeId::Integer),
            Column::new("name", TypeId::Varchar),
        ])
    }

    fn make_row(id: i64, name: &str) -> Tuple {
        Tuple::from_values(
            &[Value::Integer(id), Value::Varchar(name.to_string())],
            &row_schema(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let heap = test_heap();
        let tuple = make_row(1, "alpha");

        let rid = heap
            .insert_tuple(TupleMeta::default(), &tuple)
            .unwrap()
            .unwrap();

        let (meta, fetched) = heap.get_tuple(rid).unwrap();
        assert!(!meta.is_deleted);
        assert_eq!(fetched.data(), tuple.data());
        assert_eq!(fetched.rid, rid);
    }

    #[test]
    fn test_insert_spills_to_new_pages() {
        let heap = test_heap();
        let schema = row_schema();

        let mut rids = Vec::new();
        for i in 0..500 {
            let tuple = make_row(i, "some moderately long tuple payload");
            let rid = heap
                .insert_tuple(TupleMeta::default(), &tuple)
                .unwrap()
                .unwrap();
            rids.push((i, rid));
        }

        // Inserts crossed at least one page boundary.
        assert!(rids.iter().any(|(_, rid)| rid.page_id != rids[0].1.page_id));

        for (i, rid) in rids {
            let (_, tuple) = heap.get_tuple(rid).unwrap();
            assert!(matches!(
                tuple.value_at(&schema, 0).unwrap(),
                Value::Integer(v) if v == i
            ));
        }
    }

    #[test]
    fn test_oversized_tuple_rejected() {
        let heap = test_heap();
        let schema = Schema::new(vec![Column::new("blob", TypeId::Varchar)]);
        let tuple =
            Tuple::from_values(&[Value::Varchar("x".repeat(8000))], &schema).unwrap();

        assert!(heap
            .insert_tuple(TupleMeta::default(), &tuple)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_tombstone_and_iterate() {
        let heap = test_heap();

        let r1 = heap
            .insert_tuple(TupleMeta::default(), &make_row(1, "a"))
            .unwrap()
            .unwrap();
        let _r2 = heap
            .insert_tuple(TupleMeta::default(), &make_row(2, "b"))
            .unwrap()
            .unwrap();

        heap.update_tuple_meta(TupleMeta { is_deleted: true }, r1)
            .unwrap();

        let mut iter = heap.iter();
        let mut live = 0;
        let mut dead = 0;
        while let Some((meta, _)) = iter.next().unwrap() {
            if meta.is_deleted {
                dead += 1;
            } else {
                live += 1;
            }
        }
        assert_eq!(live, 1);
        assert_eq!(dead, 1);
    }

    #[test]
    fn test_get_missing_tuple_fails() {
        let heap = test_heap();
        let rid = Rid::new(heap.first_page_id(), 5);
        assert!(matches!(
            heap.get_tuple(rid),
            Err(QuarryError::TupleNotFound(_))
        ));
    }
}
