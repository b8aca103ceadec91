//! Page-granular file I/O for one index file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Reads, writes and appends fixed-size pages.
///
/// Page `n` lives at byte offset `n * PAGE_SIZE`; page 0 is the index
/// metadata page once an index has been created in the file. The file only
/// grows.
///
/// Not synchronised: the buffer pool owns the disk manager behind a mutex.
pub struct DiskManager {
    file: File,
    page_count: u32,
}

impl DiskManager {
    /// Create an empty index file. Fails if `path` already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Ok(Self {
            file,
            page_count: 0,
        })
    }

    /// Open an existing index file.
    ///
    /// A length that is not a whole number of pages means the last append
    /// was torn, and is reported as a corrupted page.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        let page_count = (len / PAGE_SIZE as u64) as u32;
        if len % PAGE_SIZE as u64 != 0 {
            return Err(Error::CorruptedPage {
                page: page_count,
                reason: format!("file length {} is not a multiple of the page size", len),
            });
        }
        Ok(Self { file, page_count })
    }

    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::open(&path) {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::create(path),
            other => other,
        }
    }

    /// Returns `Error::PageNotFound` past the end of the file.
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.seek_to(page_id)?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;
        Ok(page)
    }

    /// Overwrite an allocated page.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.seek_to(page_id)?;
        self.file.write_all(page.as_slice())?;
        Ok(())
    }

    /// Extend the file by one zeroed page.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);
        if !page_id.is_valid() {
            return Err(Error::CorruptedPage {
                page: page_id.0,
                reason: "page id space exhausted".to_string(),
            });
        }
        self.file
            .set_len((self.page_count as u64 + 1) * PAGE_SIZE as u64)?;
        self.page_count += 1;
        Ok(page_id)
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.page_count as u64 * PAGE_SIZE as u64
    }

    fn seek_to(&mut self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }
        self.file
            .seek(SeekFrom::Start(page_id.0 as u64 * PAGE_SIZE as u64))?;
        Ok(())
    }
}
