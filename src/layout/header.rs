// Tue Jan 13 2026 - Alex

use crate::layout::LayoutError;
use crate::memory::{MemoryReader, MetadataBlob};
use serde::Serialize;
use std::fmt;

/// Magic of the only header layout this crate understands.
pub const MAGIC: u32 = 0xFFFF_FFFA;

/// Bytes before the first word-sized field: magic, two pad bytes, minimum
/// instruction size and pointer size.
pub const HEADER_PREFIX_SIZE: usize = 8;

const TABLE_ORDER: [TableKind; 5] = [
    TableKind::FunctionName,
    TableKind::CompilationUnit,
    TableKind::File,
    TableKind::ProgramCounter,
    TableKind::Function,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    FunctionName,
    CompilationUnit,
    File,
    ProgramCounter,
    Function,
    Descriptor,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::FunctionName => "function name table",
            TableKind::CompilationUnit => "compilation unit table",
            TableKind::File => "file table",
            TableKind::ProgramCounter => "pc table",
            TableKind::Function => "function table",
            TableKind::Descriptor => "function descriptor",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub magic: u32,
    pub min_instruction_size: u8,
    pub pointer_size: u8,
    pub function_count: usize,
    pub file_count: u64,
    pub name_table_offset: u64,
    pub cu_table_offset: u64,
    pub file_table_offset: u64,
    pub pc_table_offset: u64,
    pub function_table_offset: u64,
}

impl Header {
    pub fn size_for(pointer_size: u8) -> usize {
        HEADER_PREFIX_SIZE + 7 * pointer_size as usize
    }

    pub fn size(&self) -> usize {
        Self::size_for(self.pointer_size)
    }

    /// One function table record: entry address then metadata offset.
    pub fn record_size(&self) -> u64 {
        2 * u64::from(self.pointer_size)
    }

    pub fn table_offset(&self, kind: TableKind) -> Option<u64> {
        match kind {
            TableKind::FunctionName => Some(self.name_table_offset),
            TableKind::CompilationUnit => Some(self.cu_table_offset),
            TableKind::File => Some(self.file_table_offset),
            TableKind::ProgramCounter => Some(self.pc_table_offset),
            TableKind::Function => Some(self.function_table_offset),
            TableKind::Descriptor => None,
        }
    }

    pub fn tables(&self) -> [(TableKind, u64); 5] {
        [
            (TableKind::FunctionName, self.name_table_offset),
            (TableKind::CompilationUnit, self.cu_table_offset),
            (TableKind::File, self.file_table_offset),
            (TableKind::ProgramCounter, self.pc_table_offset),
            (TableKind::Function, self.function_table_offset),
        ]
    }

    /// End offset of a table. Tables are laid out in header order, so a table
    /// runs up to the next one declared after it; a table with nothing after
    /// it runs to the end of the blob.
    pub fn table_end(&self, kind: TableKind, blob_len: usize) -> usize {
        let Some(start) = self.table_offset(kind) else {
            return blob_len;
        };
        let position = TABLE_ORDER.iter().position(|k| *k == kind).unwrap_or(0);
        let following = TABLE_ORDER[position + 1..]
            .iter()
            .filter_map(|k| self.table_offset(*k))
            .filter(|offset| *offset >= start)
            .min();
        let end = following.or_else(|| {
            self.tables()
                .iter()
                .map(|(_, offset)| *offset)
                .filter(|offset| *offset > start)
                .min()
        });
        end.and_then(|end| usize::try_from(end).ok())
            .map_or(blob_len, |end| end.min(blob_len))
    }
}

fn checked_function_count(raw: i64) -> Result<usize, LayoutError> {
    if raw < 0 {
        return Err(LayoutError::NegativeFunctionCount(raw));
    }
    usize::try_from(raw).map_err(|_| LayoutError::FunctionCountOverflow(raw))
}

/// Decodes and validates the header at the start of `blob`.
///
/// The magic is checked before any other field is read.
pub fn decode_header(blob: &MetadataBlob<'_>) -> Result<Header, LayoutError> {
    let available = blob.len();
    if available < 4 {
        return Err(LayoutError::TruncatedHeader { needed: 4, available });
    }

    let magic = blob.read_u32(0)?;
    if magic != MAGIC {
        return Err(LayoutError::InvalidMagic {
            found: magic,
            expected: MAGIC,
        });
    }

    if available < HEADER_PREFIX_SIZE {
        return Err(LayoutError::TruncatedHeader {
            needed: HEADER_PREFIX_SIZE,
            available,
        });
    }

    let min_instruction_size = blob.read_u8(6)?;
    let pointer_size = blob.read_u8(7)?;
    if pointer_size != 4 && pointer_size != 8 {
        return Err(LayoutError::UnsupportedPointerSize(pointer_size));
    }

    let needed = Header::size_for(pointer_size);
    if available < needed {
        return Err(LayoutError::TruncatedHeader { needed, available });
    }

    let word = u64::from(pointer_size);
    let field = |index: u64| HEADER_PREFIX_SIZE as u64 + index * word;

    let function_count = checked_function_count(blob.read_signed_word(field(0), pointer_size)?)?;

    let header = Header {
        magic,
        min_instruction_size,
        pointer_size,
        function_count,
        file_count: blob.read_word(field(1), pointer_size)?,
        name_table_offset: blob.read_word(field(2), pointer_size)?,
        cu_table_offset: blob.read_word(field(3), pointer_size)?,
        file_table_offset: blob.read_word(field(4), pointer_size)?,
        pc_table_offset: blob.read_word(field(5), pointer_size)?,
        function_table_offset: blob.read_word(field(6), pointer_size)?,
    };

    for (table, offset) in header.tables() {
        if offset >= available as u64 {
            return Err(LayoutError::OffsetOutOfBounds {
                table,
                offset,
                size: available,
            });
        }
    }

    log::trace!(
        "Decoded header: {} functions, {} files, pointer size {}",
        header.function_count,
        header.file_count,
        header.pointer_size
    );

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ImageBuilder;

    fn sample(pointer_size: u8) -> Vec<u8> {
        ImageBuilder::new(pointer_size)
            .function("main.main", 0x1000)
            .function("main.init", 0x1080)
            .file("main.go")
            .build()
            .unwrap()
    }

    #[test]
    fn test_decodes_both_pointer_sizes() {
        for pointer_size in [4u8, 8] {
            let image = sample(pointer_size);
            let header = decode_header(&MetadataBlob::new(&image)).unwrap();
            assert_eq!(header.magic, MAGIC);
            assert_eq!(header.pointer_size, pointer_size);
            assert_eq!(header.function_count, 2);
            assert_eq!(header.file_count, 1);
            assert_eq!(header.name_table_offset, Header::size_for(pointer_size) as u64);
            assert!(header.name_table_offset < header.cu_table_offset);
            assert!(header.pc_table_offset < header.function_table_offset);
        }
    }

    #[test]
    fn test_bad_magic_rejected_first() {
        let mut image = sample(8);
        image[0] ^= 0xff;
        // Also break a later field; the magic must be reported, not this.
        image[7] = 3;
        let err = decode_header(&MetadataBlob::new(&image)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidMagic { expected: MAGIC, .. }));
    }

    #[test]
    fn test_short_blobs_are_truncated_headers() {
        let image = sample(8);
        let blob = MetadataBlob::new(&image);
        assert!(matches!(
            decode_header(&blob.truncated(2)),
            Err(LayoutError::TruncatedHeader { needed: 4, available: 2 })
        ));
        assert!(matches!(
            decode_header(&blob.truncated(20)),
            Err(LayoutError::TruncatedHeader { needed: 64, available: 20 })
        ));
    }

    #[test]
    fn test_unsupported_pointer_size() {
        let mut image = sample(8);
        image[7] = 2;
        assert!(matches!(
            decode_header(&MetadataBlob::new(&image)),
            Err(LayoutError::UnsupportedPointerSize(2))
        ));
    }

    #[test]
    fn test_negative_function_count() {
        let mut image = sample(8);
        image[8..16].copy_from_slice(&(-1i64).to_ne_bytes());
        assert!(matches!(
            decode_header(&MetadataBlob::new(&image)),
            Err(LayoutError::NegativeFunctionCount(-1))
        ));
    }

    #[test]
    fn test_function_count_bounds() {
        assert_eq!(checked_function_count(0).unwrap(), 0);
        assert_eq!(checked_function_count(3).unwrap(), 3);
        assert!(matches!(
            checked_function_count(i64::MIN),
            Err(LayoutError::NegativeFunctionCount(i64::MIN))
        ));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_function_count_wider_than_host() {
        let raw = i64::from(u32::MAX) + 1;
        assert!(matches!(
            checked_function_count(raw),
            Err(LayoutError::FunctionCountOverflow(r)) if r == raw
        ));
    }

    #[test]
    fn test_offset_past_blob_rejected() {
        let mut image = sample(8);
        let len = image.len() as u64;
        // cu table offset is the fourth word.
        image[8 + 3 * 8..8 + 4 * 8].copy_from_slice(&len.to_ne_bytes());
        let err = decode_header(&MetadataBlob::new(&image)).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::OffsetOutOfBounds { table: TableKind::CompilationUnit, .. }
        ));
    }

    #[test]
    fn test_table_end_follows_declared_order() {
        let image = sample(8);
        let header = decode_header(&MetadataBlob::new(&image)).unwrap();
        assert_eq!(
            header.table_end(TableKind::FunctionName, image.len()),
            header.cu_table_offset as usize
        );
        assert_eq!(header.table_end(TableKind::Function, image.len()), image.len());
    }

    #[test]
    fn test_empty_tables_share_offsets() {
        let image = ImageBuilder::new(8).build().unwrap();
        let header = decode_header(&MetadataBlob::new(&image)).unwrap();
        assert_eq!(header.function_count, 0);
        assert_eq!(header.name_table_offset, header.cu_table_offset);
        assert_eq!(
            header.table_end(TableKind::FunctionName, image.len()),
            header.name_table_offset as usize
        );
    }
}
