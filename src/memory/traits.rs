// Wed Jan 15 2026 - Alex

use crate::memory::MemoryError;

/// Bounds-checked, native-endian field readers over a borrowed byte region.
///
/// Offsets are relative to the start of the region. Every read either returns
/// the requested value or an error; nothing here reinterprets memory as a
/// struct.
pub trait MemoryReader<'a> {
    fn as_bytes(&self) -> &'a [u8];

    fn size(&self) -> usize {
        self.as_bytes().len()
    }

    fn read_bytes(&self, offset: u64, len: usize) -> Result<&'a [u8], MemoryError> {
        let bytes = self.as_bytes();
        let out_of_bounds = || MemoryError::OutOfBounds {
            offset,
            len,
            size: bytes.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        bytes.get(start..end).ok_or_else(out_of_bounds)
    }

    fn read_u8(&self, offset: u64) -> Result<u8, MemoryError> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    fn read_u32(&self, offset: u64) -> Result<u32, MemoryError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read_bytes(offset, 4)?);
        Ok(u32::from_ne_bytes(raw))
    }

    fn read_i32(&self, offset: u64) -> Result<i32, MemoryError> {
        Ok(self.read_u32(offset)? as i32)
    }

    fn read_u64(&self, offset: u64) -> Result<u64, MemoryError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.read_bytes(offset, 8)?);
        Ok(u64::from_ne_bytes(raw))
    }

    /// Reads an unsigned word of `width` bytes (4 or 8).
    fn read_word(&self, offset: u64, width: u8) -> Result<u64, MemoryError> {
        match width {
            4 => Ok(u64::from(self.read_u32(offset)?)),
            8 => self.read_u64(offset),
            other => Err(MemoryError::UnsupportedWordSize(other)),
        }
    }

    /// Reads a signed word of `width` bytes, sign-extending 4-byte words.
    fn read_signed_word(&self, offset: u64, width: u8) -> Result<i64, MemoryError> {
        match width {
            4 => Ok(i64::from(self.read_i32(offset)?)),
            8 => Ok(self.read_u64(offset)? as i64),
            other => Err(MemoryError::UnsupportedWordSize(other)),
        }
    }

    /// Returns the bytes from `offset` up to (not including) the first null
    /// byte. The terminator must appear before `end`.
    fn read_c_string(&self, offset: u64, end: usize) -> Result<&'a [u8], MemoryError> {
        let bytes = self.as_bytes();
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| *start <= end && end <= bytes.len())
            .ok_or(MemoryError::OutOfBounds {
                offset,
                len: end.saturating_sub(offset as usize),
                size: bytes.len(),
            })?;
        let window = &bytes[start..end];
        match window.iter().position(|&b| b == 0) {
            Some(len) => Ok(&window[..len]),
            None => Err(MemoryError::Unterminated {
                offset,
                limit: window.len(),
            }),
        }
    }
}

impl<'a> MemoryReader<'a> for &'a [u8] {
    fn as_bytes(&self) -> &'a [u8] {
        *self
    }
}
