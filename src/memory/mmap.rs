// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryError, MetadataBlob};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Read-only file mapping that metadata blobs can borrow from.
pub struct MmapMemory {
    mmap: Arc<Mmap>,
}

impl MmapMemory {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let file = File::open(path).map_err(MemoryError::Io)?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(MemoryError::Io)?;
        Ok(Self {
            mmap: Arc::new(mmap),
        })
    }

    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }

    /// Borrows `len` bytes starting at file offset `offset` as a blob mapped
    /// at `base`.
    pub fn blob(&self, offset: usize, len: usize, base: Address) -> Result<MetadataBlob<'_>, MemoryError> {
        let out_of_bounds = || MemoryError::OutOfBounds {
            offset: offset as u64,
            len,
            size: self.mmap.len(),
        };
        let end = offset.checked_add(len).ok_or_else(out_of_bounds)?;
        let bytes = self.mmap.get(offset..end).ok_or_else(out_of_bounds)?;
        Ok(MetadataBlob::with_base(bytes, base))
    }

    pub fn whole_blob(&self, base: Address) -> MetadataBlob<'_> {
        MetadataBlob::with_base(self.as_slice(), base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryReader;
    use std::io::Write;

    #[test]
    fn test_maps_file_and_slices_blob() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee]).unwrap();
        file.flush().unwrap();

        let memory = MmapMemory::from_file(file.path()).unwrap();
        assert_eq!(memory.size(), 5);

        let blob = memory.blob(1, 3, Address::new(0x1000)).unwrap();
        assert_eq!(blob.bytes(), &[0xbb, 0xcc, 0xdd]);
        assert_eq!(blob.base(), Address::new(0x1000));
        assert_eq!(blob.read_u8(2).unwrap(), 0xdd);

        assert!(memory.blob(4, 2, Address::zero()).is_err());
        assert_eq!(memory.whole_blob(Address::zero()).len(), 5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MmapMemory::from_file("/nonexistent/pclntab.bin");
        assert!(matches!(result, Err(MemoryError::Io(_))));
    }
}
