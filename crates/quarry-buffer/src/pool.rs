//! Buffer pool manager.

use crate::disk::DiskManager;
use crate::frame::{Frame, FrameId};
use crate::guard::{PageGuard, ReadPageGuard, WritePageGuard};
use crate::replacer::{LruKReplacer, Replacer};
use parking_lot::Mutex;
use quarry_common::page::{AccessType, PageBuf, PageId, PAGE_SIZE};
use quarry_common::{BufferPoolConfig, QuarryError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use sysinfo::System;

/// State protected by the pool mutex.
///
/// The mutex linearizes all page-table and free-list mutations; frame
/// metadata (pins, dirty bits) lives in atomics on the frames themselves.
struct PoolInner {
    /// Maps resident page ids to their frames.
    page_table: HashMap<PageId, FrameId>,
    /// Frames not holding any page. Always frame ids, never page ids.
    free_list: VecDeque<FrameId>,
    /// Next page id to hand out; ids are dense and monotonic.
    next_page_id: u32,
}

/// Buffer pool manager.
///
/// Manages a fixed-size pool of page frames with:
/// - Page id to frame id mapping under a single mutex
/// - Free frame list for unallocated frames
/// - LRU-K replacement for eviction
/// - Pin counting and RAII guards for concurrent access
pub struct BufferPoolManager {
    /// Number of frames in the pool.
    pool_size: usize,
    /// Array of frames.
    frames: Vec<Arc<Frame>>,
    /// Page replacement policy.
    replacer: LruKReplacer,
    /// Disk backend for page I/O.
    disk: Arc<dyn DiskManager>,
    /// Mutex-protected pool state.
    inner: Mutex<PoolInner>,
}

impl BufferPoolManager {
    /// Creates a new buffer pool over the given disk backend.
    pub fn new(config: BufferPoolConfig, disk: Arc<dyn DiskManager>) -> Self {
        let pool_size = config.pool_size;
        let frames: Vec<_> = (0..pool_size)
            .map(|i| Arc::new(Frame::new(FrameId(i as u32))))
            .collect();

        // Initially, every frame is in the free list.
        let free_list: VecDeque<_> = (0..pool_size).map(|i| FrameId(i as u32)).collect();

        Self {
            pool_size,
            frames,
            replacer: LruKReplacer::new(pool_size, config.replacer_k),
            disk,
            inner: Mutex::new(PoolInner {
                page_table: HashMap::new(),
                free_list,
                next_page_id: 0,
            }),
        }
    }

    /// Creates a buffer pool sized to 25% of available system RAM.
    ///
    /// Minimum 1024 frames so caching stays useful on small machines.
    pub fn auto_sized(disk: Arc<dyn DiskManager>) -> Self {
        let mut sys = System::new_all();
        sys.refresh_memory();

        let available_bytes = sys.available_memory() as usize;
        let pool_size = (available_bytes / 4 / PAGE_SIZE).max(1024);

        Self::new(
            BufferPoolConfig {
                pool_size,
                ..Default::default()
            },
            disk,
        )
    }

    /// Returns the number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the number of free frames.
    pub fn free_count(&self) -> usize {
        self.inner.lock().free_list.len()
    }

    /// Returns the number of pages currently resident.
    pub fn page_count(&self) -> usize {
        self.inner.lock().page_table.len()
    }

    /// Returns the number of evictable frames.
    pub fn replacer_size(&self) -> usize {
        self.replacer.size()
    }

    /// Checks whether a page is resident.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.inner.lock().page_table.contains_key(&page_id)
    }

    /// Finds a frame for a new page: free list first, then eviction.
    ///
    /// Called with the pool mutex held. The evicted page, if dirty, is
    /// written through the disk backend before the frame is reused.
    fn acquire_frame(&self, inner: &mut PoolInner) -> Result<FrameId> {
        if let Some(frame_id) = inner.free_list.pop_front() {
            return Ok(frame_id);
        }

        let victim = self.replacer.evict().ok_or(QuarryError::BufferPoolFull)?;
        let frame = &self.frames[victim.0 as usize];
        if let Some(old_page_id) = frame.page_id() {
            if frame.is_dirty() {
                log::debug!("evicting dirty {} from {}", old_page_id, victim);
                self.disk.write_page(old_page_id, &frame.read_data())?;
            }
            inner.page_table.remove(&old_page_id);
        }
        Ok(victim)
    }

    /// Installs a page into a freshly acquired frame: resets the frame,
    /// binds the page id, pins it, and registers the access (new replacer
    /// nodes start non-evictable).
    fn install_page(
        &self,
        frame_id: FrameId,
        page_id: PageId,
        access_type: AccessType,
    ) -> Result<Arc<Frame>> {
        let frame = Arc::clone(&self.frames[frame_id.0 as usize]);
        frame.reset();
        frame.set_page_id(Some(page_id));
        frame.pin();
        self.replacer.record_access(frame_id, access_type)?;
        Ok(frame)
    }

    /// Allocates a fresh page id and a pinned frame for it.
    pub(crate) fn new_page_inner(&self, access_type: AccessType) -> Result<(PageId, Arc<Frame>)> {
        let mut inner = self.inner.lock();
        let frame_id = self.acquire_frame(&mut inner)?;
        let page_id = PageId(inner.next_page_id);
        inner.next_page_id += 1;
        inner.page_table.insert(page_id, frame_id);
        let frame = self.install_page(frame_id, page_id, access_type)?;
        Ok((page_id, frame))
    }

    /// Pins a page, loading it from disk if it is not resident.
    pub(crate) fn fetch_page_inner(
        &self,
        page_id: PageId,
        access_type: AccessType,
    ) -> Result<Arc<Frame>> {
        // Read into a scratch buffer before taking a frame so a disk
        // error leaves the pool untouched.
        let mut inner = self.inner.lock();
        if let Some(&frame_id) = inner.page_table.get(&page_id) {
            let frame = Arc::clone(&self.frames[frame_id.0 as usize]);
            frame.pin();
            self.replacer.record_access(frame_id, access_type)?;
            self.replacer.set_evictable(frame_id, false)?;
            return Ok(frame);
        }

        let mut buf: Box<PageBuf> = Box::new([0u8; PAGE_SIZE]);
        self.disk.read_page(page_id, &mut buf)?;

        let frame_id = self.acquire_frame(&mut inner)?;
        inner.page_table.insert(page_id, frame_id);
        let frame = self.install_page(frame_id, page_id, access_type)?;
        frame.copy_from(&buf);
        Ok(frame)
    }

    /// Decrements a page's pin count, recording the dirty bit.
    ///
    /// The dirty flag is sticky: once set it stays until the page is
    /// flushed or the frame is reused. When the pin count reaches zero
    /// the frame becomes evictable. Returns false if the page is not
    /// resident or was not pinned.
    pub(crate) fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id.0 as usize];
        if is_dirty {
            frame.set_dirty(true);
        }
        if frame.pin_count() == 0 {
            return false;
        }
        if frame.unpin() == 0 {
            let _ = self.replacer.set_evictable(frame_id, true);
        }
        true
    }

    /// Allocates a new page and returns it pinned behind a basic guard.
    pub fn new_page(self: &Arc<Self>) -> Result<PageGuard> {
        let (page_id, frame) = self.new_page_inner(AccessType::Unknown)?;
        log::trace!("allocated {}", page_id);
        Ok(PageGuard::new(Arc::clone(self), page_id, frame))
    }

    /// Fetches a page behind a basic guard (pin only, no latch).
    pub fn fetch_page_basic(self: &Arc<Self>, page_id: PageId) -> Result<PageGuard> {
        let frame = self.fetch_page_inner(page_id, AccessType::Unknown)?;
        Ok(PageGuard::new(Arc::clone(self), page_id, frame))
    }

    /// Fetches a page and holds its read latch for the guard's lifetime.
    pub fn fetch_page_read(self: &Arc<Self>, page_id: PageId) -> Result<ReadPageGuard> {
        let frame = self.fetch_page_inner(page_id, AccessType::Unknown)?;
        // The latch is acquired after the pool mutex is released.
        Ok(PageGuard::new(Arc::clone(self), page_id, frame).upgrade_read())
    }

    /// Fetches a page and holds its write latch for the guard's lifetime.
    pub fn fetch_page_write(self: &Arc<Self>, page_id: PageId) -> Result<WritePageGuard> {
        let frame = self.fetch_page_inner(page_id, AccessType::Unknown)?;
        Ok(PageGuard::new(Arc::clone(self), page_id, frame).upgrade_write())
    }

    /// Writes a page through the disk backend and clears its dirty bit.
    ///
    /// The frame is resolved under the pool mutex but the write happens
    /// outside it; the page data lock alone protects the copy. Returns
    /// false if the page is not resident.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        let frame = {
            let inner = self.inner.lock();
            let Some(&frame_id) = inner.page_table.get(&page_id) else {
                return Ok(false);
            };
            Arc::clone(&self.frames[frame_id.0 as usize])
        };
        let data = frame.read_data();
        // The frame may have been rebound while the mutex was released;
        // re-verify the binding under the data lock before writing.
        if frame.page_id() != Some(page_id) {
            return Ok(false);
        }
        self.disk.write_page(page_id, &data)?;
        frame.set_dirty(false);
        Ok(true)
    }

    /// Flushes every resident page. Returns the number flushed.
    pub fn flush_all(&self) -> Result<usize> {
        // Collect targets first so no page lock is taken under the mutex.
        let targets: Vec<(PageId, Arc<Frame>)> = {
            let inner = self.inner.lock();
            inner
                .page_table
                .iter()
                .map(|(&pid, &fid)| (pid, Arc::clone(&self.frames[fid.0 as usize])))
                .collect()
        };

        let mut flushed = 0;
        for (page_id, frame) in targets {
            let data = frame.read_data();
            if frame.page_id() != Some(page_id) {
                continue;
            }
            self.disk.write_page(page_id, &data)?;
            frame.set_dirty(false);
            flushed += 1;
        }
        Ok(flushed)
    }

    /// Deletes a page from the pool and deallocates it on disk.
    ///
    /// Returns `Ok(true)` if the page was absent or successfully removed,
    /// `Ok(false)` if it is pinned.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return Ok(true);
        };
        let frame = &self.frames[frame_id.0 as usize];
        if frame.is_pinned() {
            return Ok(false);
        }
        self.replacer.remove(frame_id)?;
        inner.page_table.remove(&page_id);
        frame.reset();
        inner.free_list.push_back(frame_id);
        self.disk.deallocate_page(page_id)?;
        Ok(true)
    }

    /// Returns statistics about the buffer pool.
    pub fn stats(&self) -> BufferPoolStats {
        let inner = self.inner.lock();
        let mut pinned_frames = 0;
        let mut dirty_frames = 0;
        for &frame_id in inner.page_table.values() {
            let frame = &self.frames[frame_id.0 as usize];
            if frame.is_pinned() {
                pinned_frames += 1;
            }
            if frame.is_dirty() {
                dirty_frames += 1;
            }
        }
        BufferPoolStats {
            total_frames: self.pool_size,
            free_frames: inner.free_list.len(),
            used_frames: inner.page_table.len(),
            pinned_frames,
            dirty_frames,
        }
    }
}

/// Statistics about the buffer pool.
#[derive(Debug, Clone)]
pub struct BufferPoolStats {
    /// Total number of frames.
    pub total_frames: usize,
    /// Number of free frames.
    pub free_frames: usize,
    /// Number of frames holding pages.
    pub used_frames: usize,
    /// Number of pinned frames.
    pub pinned_frames: usize,
    /// Number of dirty frames.
    pub dirty_frames: usize,
}
