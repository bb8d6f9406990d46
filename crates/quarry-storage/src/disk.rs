//! File-backed disk manager for page-level I/O.

use parking_lot::Mutex;
use quarry_buffer::DiskManager;
use quarry_common::page::{PageBuf, PageId, PAGE_SIZE};
use quarry_common::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Configuration for the file disk manager.
#[derive(Debug, Clone)]
pub struct DiskManagerConfig {
    /// Path of the data file.
    pub path: PathBuf,
    /// Enable fsync after writes.
    pub fsync_enabled: bool,
}

impl Default for DiskManagerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./quarry.dat"),
            fsync_enabled: true,
        }
    }
}

struct FileInner {
    file: File,
    /// Number of pages the file currently covers.
    num_pages: u32,
}

/// Disk manager backed by a single data file.
///
/// Page ids are dense, so a page's offset is simply `id * PAGE_SIZE`.
/// Reads past the current end of file return zeroed pages: allocation is
/// logical and the file is extended on first write.
pub struct FileDiskManager {
    config: DiskManagerConfig,
    inner: Mutex<FileInner>,
}

impl FileDiskManager {
    /// Opens (or creates) the data file.
    pub fn new(config: DiskManagerConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&config.path)?;

        let file_size = file.metadata()?.len();
        let num_pages = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            config,
            inner: Mutex::new(FileInner { file, num_pages }),
        })
    }

    /// Opens a data file at the given path with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(DiskManagerConfig {
            path: path.as_ref().to_path_buf(),
            fsync_enabled: true,
        })
    }

    /// Returns the number of pages the data file covers.
    pub fn num_pages(&self) -> u32 {
        self.inner.lock().num_pages
    }

    /// Flushes pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().file.sync_all()?;
        Ok(())
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut PageBuf) -> Result<()> {
        let mut inner = self.inner.lock();
        if page_id.0 >= inner.num_pages {
            // Never written: logical zero page.
            buf.fill(0);
            return Ok(());
        }
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.read_exact(buf)?;
        Ok(())
    }

    fn write_page(&self, page_id: PageId, data: &PageBuf) -> Result<()> {
        let mut inner = self.inner.lock();
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(data)?;

        if self.config.fsync_enabled {
            inner.file.sync_all()?;
        }

        if page_id.0 >= inner.num_pages {
            inner.num_pages = page_id.0 + 1;
        }
        Ok(())
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<()> {
        // Space reclamation is a compaction concern; deallocation is
        // logical only.
        log::trace!("deallocated {}", page_id);
        Ok(())
    }
}
