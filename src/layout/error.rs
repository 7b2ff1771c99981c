// Tue Jan 13 2026 - Alex

use crate::layout::TableKind;
use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid magic 0x{found:08x}, expected 0x{expected:08x}")]
    InvalidMagic { found: u32, expected: u32 },
    #[error("Header truncated: need {needed} bytes, blob holds {available}")]
    TruncatedHeader { needed: usize, available: usize },
    #[error("Unsupported pointer size: {0}")]
    UnsupportedPointerSize(u8),
    #[error("Negative function count: {0}")]
    NegativeFunctionCount(i64),
    #[error("Function count {0} exceeds the host address space")]
    FunctionCountOverflow(i64),
    #[error("{table} offset 0x{offset:x} outside blob of {size} bytes")]
    OffsetOutOfBounds { table: TableKind, offset: u64, size: usize },
    #[error("Function table truncated at record {index} of {count}")]
    TruncatedTable { index: usize, count: usize },
    #[error("Name offset {offset} outside name table of {table_len} bytes")]
    InvalidNameOffset { offset: i32, table_len: usize },
    #[error("Name at offset 0x{offset:x} has no terminator before the end of the name table")]
    UnterminatedName { offset: u64 },
    #[error("Name at offset 0x{offset:x} is not valid UTF-8")]
    InvalidNameEncoding { offset: u64 },
    #[error("Function table out of order at record {index}")]
    UnorderedTable { index: usize },
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}

impl LayoutError {
    /// Every layout error means the blob does not have the layout this crate
    /// decodes; none of them go away on retry.
    pub fn is_incompatible(&self) -> bool {
        !matches!(self, LayoutError::Memory(MemoryError::Io(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_display() {
        let err = LayoutError::InvalidMagic {
            found: 0xfffffff1,
            expected: 0xfffffffa,
        };
        assert_eq!(err.to_string(), "Invalid magic 0xfffffff1, expected 0xfffffffa");

        let err = LayoutError::OffsetOutOfBounds {
            table: TableKind::FunctionName,
            offset: 0x400,
            size: 0x100,
        };
        assert!(err.to_string().contains("function name table"));
        assert!(err.is_incompatible());
    }
}
