// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryRange, MemoryReader};
use std::fmt;

/// Borrowed view over a module's metadata region.
///
/// The blob is never owned or modified here. `base` is the address the first
/// byte is mapped at, which for an in-process handle is the pointer itself and
/// for a file dump is whatever address the caller says the region was loaded at.
#[derive(Clone, Copy)]
pub struct MetadataBlob<'a> {
    bytes: &'a [u8],
    base: Address,
}

impl<'a> MetadataBlob<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            base: Address::from_ptr(bytes.as_ptr()),
        }
    }

    pub fn with_base(bytes: &'a [u8], base: Address) -> Self {
        Self { bytes, base }
    }

    /// Wraps a host-supplied handle to a loaded module's metadata.
    ///
    /// # Safety
    ///
    /// `base` must point to `len` initialized bytes that stay mapped and
    /// unmodified for `'a`. Nothing here can detect the owning image being
    /// unloaded underneath a live blob.
    pub unsafe fn from_raw_parts(base: *const u8, len: usize) -> Self {
        Self::new(std::slice::from_raw_parts(base, len))
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn range(&self) -> MemoryRange {
        MemoryRange::from_start_size(self.base, self.bytes.len() as u64)
    }

    pub fn truncated(&self, len: usize) -> Self {
        Self {
            bytes: &self.bytes[..len.min(self.bytes.len())],
            base: self.base,
        }
    }
}

impl<'a> MemoryReader<'a> for MetadataBlob<'a> {
    fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl fmt::Debug for MetadataBlob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataBlob")
            .field("base", &self.base)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_base_defaults_to_pointer() {
        let data = vec![0u8; 32];
        let blob = MetadataBlob::new(&data);
        assert_eq!(blob.base(), Address::from_ptr(data.as_ptr()));
        assert_eq!(blob.len(), 32);

        let rebased = MetadataBlob::with_base(&data, Address::new(0x40_0000));
        assert_eq!(rebased.range().end(), Address::new(0x40_0020));
    }

    #[test]
    fn test_raw_parts_matches_slice() {
        let data = [7u8; 16];
        let blob = unsafe { MetadataBlob::from_raw_parts(data.as_ptr(), data.len()) };
        assert_eq!(blob.bytes(), &data);
        assert_eq!(blob.read_u8(15).unwrap(), 7);
        assert_eq!(blob.truncated(4).len(), 4);
        assert_eq!(blob.truncated(64).len(), 16);
    }

    #[test]
    fn test_blob_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<MetadataBlob<'static>>();
    }
}
