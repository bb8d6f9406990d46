//! Table page implementation using slotted page format.
//!
//! Page layout:
//! ```text
//! +--------------------+
//! | Header (8 bytes)   |  next_page_id:4, slot_count:2, free_end:2
//! +--------------------+
//! | Slot Array         |  <- Grows downward (6 bytes/slot)
//! +--------------------+
//! | Free Space         |
//! +--------------------+
//! | Tuple Data         |  <- Grows upward from the end
//! +--------------------+
//! ```
//!
//! All accessors are static functions over a page buffer so callers can
//! operate directly on guard payloads without copying the page.

use crate::tuple::TupleMeta;
use quarry_common::page::{PageBuf, PageId, PAGE_SIZE};

const HEADER_SIZE: usize = 8;
const SLOT_SIZE: usize = 6;

const FLAG_DELETED: u16 = 0x0001;

/// Slotted page accessors for table heap pages.
pub struct TablePage;

impl TablePage {
    /// Largest payload a single page can hold.
    pub const MAX_TUPLE_SIZE: usize = PAGE_SIZE - HEADER_SIZE - SLOT_SIZE;

    /// Initializes an empty page in place.
    pub fn init(data: &mut PageBuf) {
        data[..HEADER_SIZE].fill(0);
        Self::set_next_page_id(data, PageId::INVALID);
        Self::set_free_end(data, PAGE_SIZE as u16);
    }

    /// Returns the next page in the heap chain.
    pub fn next_page_id(data: &PageBuf) -> PageId {
        PageId(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Links the next page in the heap chain.
    pub fn set_next_page_id(data: &mut PageBuf, page_id: PageId) {
        data[0..4].copy_from_slice(&page_id.0.to_le_bytes());
    }

    /// Returns the number of slots on this page.
    pub fn slot_count(data: &PageBuf) -> u16 {
        u16::from_le_bytes([data[4], data[5]])
    }

    fn set_slot_count(data: &mut PageBuf, count: u16) {
        data[4..6].copy_from_slice(&count.to_le_bytes());
    }

    fn free_end(data: &PageBuf) -> u16 {
        u16::from_le_bytes([data[6], data[7]])
    }

    fn set_free_end(data: &mut PageBuf, offset: u16) {
        data[6..8].copy_from_slice(&offset.to_le_bytes());
    }

    fn slot_offset(slot: u16) -> usize {
        HEADER_SIZE + slot as usize * SLOT_SIZE
    }

    fn read_slot(data: &PageBuf, slot: u16) -> (u16, u16, u16) {
        let base = Self::slot_offset(slot);
        let offset = u16::from_le_bytes([data[base], data[base + 1]]);
        let len = u16::from_le_bytes([data[base + 2], data[base + 3]]);
        let flags = u16::from_le_bytes([data[base + 4], data[base + 5]]);
        (offset, len, flags)
    }

    fn write_slot(data: &mut PageBuf, slot: u16, offset: u16, len: u16, flags: u16) {
        let base = Self::slot_offset(slot);
        data[base..base + 2].copy_from_slice(&offset.to_le_bytes());
        data[base + 2..base + 4].copy_from_slice(&len.to_le_bytes());
        data[base + 4..base + 6].copy_from_slice(&flags.to_le_bytes());
    }

    /// Returns the free space available for one more tuple.
    pub fn free_space(data: &PageBuf) -> usize {
        let slot_array_end = HEADER_SIZE + Self::slot_count(data) as usize * SLOT_SIZE;
        (Self::free_end(data) as usize).saturating_sub(slot_array_end + SLOT_SIZE)
    }

    /// Inserts a tuple payload, returning its slot, or None if the page
    /// is full.
    pub fn insert_tuple(data: &mut PageBuf, meta: TupleMeta, payload: &[u8]) -> Option<u16> {
        if payload.len() > Self::free_space(data) {
            return None;
        }
        let slot = Self::slot_count(data);
        let offset = Self::free_end(data) - payload.len() as u16;
        data[offset as usize..offset as usize + payload.len()].copy_from_slice(payload);

        let flags = if meta.is_deleted { FLAG_DELETED } else { 0 };
        Self::write_slot(data, slot, offset, payload.len() as u16, flags);
        Self::set_slot_count(data, slot + 1);
        Self::set_free_end(data, offset);
        Some(slot)
    }

    /// Reads a tuple payload and its metadata.
    pub fn get_tuple(data: &PageBuf, slot: u16) -> Option<(TupleMeta, &[u8])> {
        if slot >= Self::slot_count(data) {
            return None;
        }
        let (offset, len, flags) = Self::read_slot(data, slot);
        let meta = TupleMeta {
            is_deleted: flags & FLAG_DELETED != 0,
        };
        Some((meta, &data[offset as usize..offset as usize + len as usize]))
    }

    /// Rewrites a tuple's metadata in place. Returns false if the slot
    /// does not exist.
    pub fn update_tuple_meta(data: &mut PageBuf, slot: u16, meta: TupleMeta) -> bool {
        if slot >= Self::slot_count(data) {
            return false;
        }
        let (offset, len, mut flags) = Self::read_slot(data, slot);
        if meta.is_deleted {
            flags |= FLAG_DELETED;
        } else {
            flags &= !FLAG_DELETED;
        }
        Self::write_slot(data, slot, offset, len, flags);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_page() -> Box<PageBuf> {
        let mut data = Box::new([0u8; PAGE_SIZE]);
        TablePage::init(&mut data);
        data
    }

    #[test]
    fn test_init() {
        let data = fresh_page();
        assert_eq!(TablePage::next_page_id(&data), PageId::INVALID);
        assert_eq!(TablePage::slot_count(&data), 0);
        assert_eq!(TablePage::free_space(&data), PAGE_SIZE - HEADER_SIZE - SLOT_SIZE);
    }

    #[test]
    fn test_insert_and_get() {
        let mut data = fresh_page();

        let slot = TablePage::insert_tuple(&mut data, TupleMeta::default(), b"hello").unwrap();
        assert_eq!(slot, 0);
        assert_eq!(TablePage::slot_count(&data), 1);

        let (meta, payload) = TablePage::get_tuple(&data, slot).unwrap();
        assert!(!meta.is_deleted);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_multiple_inserts_keep_order() {
        let mut data = fresh_page();

        for i in 0..10u8 {
            let payload = vec![i; 16];
            let slot = TablePage::insert_tuple(&mut data, TupleMeta::default(), &payload).unwrap();
            assert_eq!(slot, i as u16);
        }
        for i in 0..10u8 {
            let (_, payload) = TablePage::get_tuple(&data, i as u16).unwrap();
            assert_eq!(payload, vec![i; 16].as_slice());
        }
    }

    #[test]
    fn test_page_full() {
        let mut data = fresh_page();
        let big = vec![0u8; 1000];

        let mut inserted = 0;
        while TablePage::insert_tuple(&mut data, TupleMeta::default(), &big).is_some() {
            inserted += 1;
        }
        // 4 KB page with 1000-byte tuples: 4 fit (header + slots eat the rest).
        assert_eq!(inserted, 4);
    }

    #[test]
    fn test_get_out_of_range_slot() {
        let data = fresh_page();
        assert!(TablePage::get_tuple(&data, 0).is_none());
    }

    #[test]
    fn test_update_meta_tombstones() {
        let mut data = fresh_page();

        let slot = TablePage::insert_tuple(&mut data, TupleMeta::default(), b"row").unwrap();
        assert!(TablePage::update_tuple_meta(
            &mut data,
            slot,
            TupleMeta { is_deleted: true }
        ));

        let (meta, payload) = TablePage::get_tuple(&data, slot).unwrap();
        assert!(meta.is_deleted);
        assert_eq!(payload, b"row");

        assert!(!TablePage::update_tuple_meta(
            &mut data,
            99,
            TupleMeta { is_deleted: true }
        ));
    }
}
