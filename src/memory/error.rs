// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: {len} bytes at offset 0x{offset:x} exceed region of {size} bytes")]
    OutOfBounds { offset: u64, len: usize, size: usize },
    #[error("No null terminator within {limit} bytes at offset 0x{offset:x}")]
    Unterminated { offset: u64, limit: usize },
    #[error("Unsupported word size: {0}")]
    UnsupportedWordSize(u8),
    #[error("Binary parse error: {0}")]
    BinaryParseError(String),
    #[error("Section not found: {0}")]
    SectionNotFound(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
}
