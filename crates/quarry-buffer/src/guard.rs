//! RAII page guards.
//!
//! Guards pair a pin with an optional page latch so every acquisition
//! path releases on every exit path. All three variants are single-owner
//! and move-only; transferring ownership is the only way to hand a page
//! to another component.

use crate::frame::Frame;
use crate::pool::BufferPoolManager;
use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::RawRwLock;
use quarry_common::page::{PageBuf, PageId};
use std::sync::Arc;

type LatchReadGuard = ArcRwLockReadGuard<RawRwLock, Box<PageBuf>>;
type LatchWriteGuard = ArcRwLockWriteGuard<RawRwLock, Box<PageBuf>>;

/// Basic guard: holds a pin, no latch.
///
/// `data`/`data_mut` take the page latch only for the duration of the
/// call. The dirty bit recorded by `data_mut`/`set_dirty` is passed to
/// the pool on drop.
pub struct PageGuard {
    pool: Arc<BufferPoolManager>,
    frame: Arc<Frame>,
    page_id: PageId,
    is_dirty: bool,
    active: bool,
}

impl PageGuard {
    pub(crate) fn new(pool: Arc<BufferPoolManager>, page_id: PageId, frame: Arc<Frame>) -> Self {
        Self {
            pool,
            frame,
            page_id,
            is_dirty: false,
            active: true,
        }
    }

    /// Returns the guarded page's id.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Reads the page payload under a briefly held read latch.
    pub fn data(&self) -> parking_lot::RwLockReadGuard<'_, Box<PageBuf>> {
        self.frame.read_data()
    }

    /// Mutates the page payload under a briefly held write latch and
    /// marks the guard dirty.
    pub fn data_mut(&mut self) -> parking_lot::RwLockWriteGuard<'_, Box<PageBuf>> {
        self.is_dirty = true;
        self.frame.write_data()
    }

    /// Marks the page dirty without touching the payload.
    pub fn set_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// Converts this guard into a read guard without dropping the pin.
    pub fn upgrade_read(mut self) -> ReadPageGuard {
        self.active = false;
        if self.is_dirty {
            // Read guards unpin clean; pin the dirty bit to the frame
            // so it is not lost in the conversion.
            self.frame.set_dirty(true);
        }
        let latch = self.frame.data_lock().read_arc();
        ReadPageGuard {
            pool: Arc::clone(&self.pool),
            frame: Arc::clone(&self.frame),
            page_id: self.page_id,
            latch: Some(latch),
            active: true,
        }
    }

    /// Converts this guard into a write guard without dropping the pin.
    pub fn upgrade_write(mut self) -> WritePageGuard {
        self.active = false;
        let latch = self.frame.data_lock().write_arc();
        WritePageGuard {
            pool: Arc::clone(&self.pool),
            frame: Arc::clone(&self.frame),
            page_id: self.page_id,
            latch: Some(latch),
            is_dirty: self.is_dirty,
            active: true,
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            self.pool.unpin_page(self.page_id, self.is_dirty);
        }
    }
}

/// Read guard: holds the page's read latch for its whole lifetime.
pub struct ReadPageGuard {
    pool: Arc<BufferPoolManager>,
    #[allow(dead_code)]
    frame: Arc<Frame>,
    page_id: PageId,
    latch: Option<LatchReadGuard>,
    active: bool,
}

impl ReadPageGuard {
    /// Returns the guarded page's id.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the page payload.
    pub fn data(&self) -> &PageBuf {
        let latch = self.latch.as_ref().expect("read guard already released");
        &**latch
    }
}

impl Drop for ReadPageGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            // Latch released before the pool mutex is taken in unpin;
            // the reverse order can deadlock against a flusher.
            self.latch = None;
            self.pool.unpin_page(self.page_id, false);
        }
    }
}

/// Write guard: holds the page's write latch for its whole lifetime.
pub struct WritePageGuard {
    pool: Arc<BufferPoolManager>,
    #[allow(dead_code)]
    frame: Arc<Frame>,
    page_id: PageId,
    latch: Option<LatchWriteGuard>,
    is_dirty: bool,
    active: bool,
}

impl WritePageGuard {
    /// Returns the guarded page's id.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the page payload.
    pub fn data(&self) -> &PageBuf {
        let latch = self.latch.as_ref().expect("write guard already released");
        &**latch
    }

    /// Returns the page payload mutably and marks the page dirty.
    pub fn data_mut(&mut self) -> &mut PageBuf {
        self.is_dirty = true;
        let latch = self.latch.as_mut().expect("write guard already released");
        &mut **latch
    }

    /// Marks the page dirty without touching the payload.
    pub fn set_dirty(&mut self) {
        self.is_dirty = true;
    }
}

impl Drop for WritePageGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            self.latch = None;
            self.pool.unpin_page(self.page_id, self.is_dirty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemoryDiskManager;
    use crate::pool::BufferPoolManager;
    use quarry_common::BufferPoolConfig;

    fn test_pool() -> Arc<BufferPoolManager> {
        Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 4,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ))
    }

    #[test]
    fn test_basic_guard_pin_lifecycle() {
        let pool = test_pool();

        let guard = pool.new_page().unwrap();
        let page_id = guard.page_id();
        assert_eq!(pool.replacer_size(), 0);

        drop(guard);
        assert_eq!(pool.replacer_size(), 1);
        assert!(pool.contains(page_id));
    }

    #[test]
    fn test_basic_guard_dirty_tracking() {
        let pool = test_pool();

        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 1;
        drop(guard);

        // The guard's dirty bit landed on the frame at unpin.
        let stats = pool.stats();
        assert_eq!(stats.dirty_frames, 1);
    }

    #[test]
    fn test_read_guards_share_access() {
        let pool = test_pool();
        let guard = pool.new_page().unwrap();
        let page_id = guard.page_id();
        drop(guard);

        let r1 = pool.fetch_page_read(page_id).unwrap();
        let r2 = pool.fetch_page_read(page_id).unwrap();
        assert_eq!(r1.page_id(), r2.page_id());
    }

    #[test]
    fn test_write_guard_exclusive_via_try() {
        let pool = test_pool();
        let guard = pool.new_page().unwrap();

        let w = guard.upgrade_write();
        // The frame's data lock is held; a bare try_read must fail.
        assert!(w.frame.data_lock().try_read().is_none());
        drop(w);
    }

    #[test]
    fn test_manual_drop_is_safe() {
        let pool = test_pool();
        let guard = pool.new_page().unwrap();
        let page_id = guard.page_id();

        drop(guard);
        // Page unpinned exactly once; a second fetch works normally.
        let again = pool.fetch_page_basic(page_id).unwrap();
        drop(again);
        assert_eq!(pool.replacer_size(), 1);
    }
}
