use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use parking_lot::Mutex;

use crate::common::config::{PageId, DB_PAGE_SIZE};
use crate::common::exception::DBError;

/// File-backed page store. Pages live at `page_id * DB_PAGE_SIZE` offsets in
/// a single database file; a page that was never written reads back zeroed.
pub struct FileDiskManager {
    db_file: Mutex<File>,
}

impl FileDiskManager {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, DBError> {
        let db_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(db_path.as_ref())?;
        debug!("opened database file {:?}", db_path.as_ref());
        Ok(Self {
            db_file: Mutex::new(db_file),
        })
    }

    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<(), DBError> {
        assert!(data.len() <= DB_PAGE_SIZE as usize, "page overflow");
        let mut file = self.db_file.lock();
        file.seek(SeekFrom::Start(page_id * DB_PAGE_SIZE))?;
        file.write_all(data)?;
        // Pad short payloads so the next page starts on its slot boundary.
        if data.len() < DB_PAGE_SIZE as usize {
            let pad = vec![0u8; DB_PAGE_SIZE as usize - data.len()];
            file.write_all(&pad)?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), DBError> {
        assert_eq!(buf.len(), DB_PAGE_SIZE as usize);
        let mut file = self.db_file.lock();
        let file_len = file.metadata()?.len();
        let offset = page_id * DB_PAGE_SIZE;
        if offset >= file_len {
            buf.fill(0);
            return Ok(());
        }
        file.seek(SeekFrom::Start(offset))?;
        let n = file.read(buf)?;
        buf[n..].fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_page() {
        let dir = TempDir::new().unwrap();
        let dm = FileDiskManager::new(dir.path().join("test.db")).unwrap();

        let payload = b"hello pages";
        dm.write_page(3, payload).unwrap();

        let mut buf = vec![0u8; DB_PAGE_SIZE as usize];
        dm.read_page(3, &mut buf).unwrap();
        assert_eq!(&buf[..payload.len()], payload);
        assert!(buf[payload.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_unwritten_page_is_zeroed() {
        let dir = TempDir::new().unwrap();
        let dm = FileDiskManager::new(dir.path().join("test.db")).unwrap();

        let mut buf = vec![1u8; DB_PAGE_SIZE as usize];
        dm.read_page(9, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }
}
