// Tue Jan 13 2026 - Alex

use crate::layout::{Header, LayoutError, TableKind};
use crate::memory::{Address, MemoryError, MemoryReader, MetadataBlob};
use serde::Serialize;

/// Fixed fields after the leading entry word: name offset, args, deferreturn,
/// pcsp, pcfile, pcln, npcdata, cu offset (eight 4-byte fields), then func id,
/// two pad bytes and nfuncdata.
const FIXED_FIELDS_SIZE: usize = 8 * 4 + 4;

/// Per-function metadata record referenced by a function table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    pub entry: Address,
    pub name_offset: i32,
    pub args: i32,
    pub deferreturn: u32,
    pub pcsp: u32,
    pub pcfile: u32,
    pub pcln: u32,
    pub npcdata: u32,
    pub cu_offset: u32,
    pub func_id: u8,
    pub nfuncdata: u8,
}

impl FunctionDescriptor {
    pub fn size_for(pointer_size: u8) -> usize {
        pointer_size as usize + FIXED_FIELDS_SIZE
    }

    pub fn decode(
        blob: &MetadataBlob<'_>,
        header: &Header,
        metadata_offset: u64,
    ) -> Result<Self, LayoutError> {
        let width = header.pointer_size;
        let base = descriptor_offset(blob, header, metadata_offset, Self::size_for(width))?;
        let field = |index: u64| base + u64::from(width) + 4 * index;

        Ok(Self {
            entry: Address::new(blob.read_word(base, width)?),
            name_offset: blob.read_i32(field(0))?,
            args: blob.read_i32(field(1))?,
            deferreturn: blob.read_u32(field(2))?,
            pcsp: blob.read_u32(field(3))?,
            pcfile: blob.read_u32(field(4))?,
            pcln: blob.read_u32(field(5))?,
            npcdata: blob.read_u32(field(6))?,
            cu_offset: blob.read_u32(field(7))?,
            func_id: blob.read_u8(field(8))?,
            nfuncdata: blob.read_u8(field(8) + 3)?,
        })
    }
}

/// Absolute offset of the descriptor at `metadata_offset`, checked to have
/// `needed` bytes in the blob. Metadata offsets are relative to the start of
/// the function table, which heads the line table.
fn descriptor_offset(
    blob: &MetadataBlob<'_>,
    header: &Header,
    metadata_offset: u64,
    needed: usize,
) -> Result<u64, LayoutError> {
    let out_of_bounds = || LayoutError::OffsetOutOfBounds {
        table: TableKind::Descriptor,
        offset: metadata_offset,
        size: blob.len(),
    };
    let start = header
        .function_table_offset
        .checked_add(metadata_offset)
        .ok_or_else(out_of_bounds)?;
    let end = start.checked_add(needed as u64).ok_or_else(out_of_bounds)?;
    if end > blob.len() as u64 {
        return Err(out_of_bounds());
    }
    Ok(start)
}

/// Reads only the signed name offset of the descriptor at `metadata_offset`.
pub fn decode_name_offset(
    blob: &MetadataBlob<'_>,
    header: &Header,
    metadata_offset: u64,
) -> Result<i32, LayoutError> {
    let width = header.pointer_size;
    let base = descriptor_offset(blob, header, metadata_offset, width as usize + 4)?;
    Ok(blob.read_i32(base + u64::from(width))?)
}

/// Decodes the name of the function whose descriptor lives at
/// `metadata_offset`.
pub fn decode_name<'a>(
    blob: &MetadataBlob<'a>,
    header: &Header,
    metadata_offset: u64,
) -> Result<&'a str, LayoutError> {
    let name_offset = decode_name_offset(blob, header, metadata_offset)?;
    name_at(blob, header, name_offset)
}

/// Reads the null-terminated name at `name_offset` in the name table.
pub fn name_at<'a>(
    blob: &MetadataBlob<'a>,
    header: &Header,
    name_offset: i32,
) -> Result<&'a str, LayoutError> {
    let table_start = header.name_table_offset as usize;
    let table_end = header.table_end(TableKind::FunctionName, blob.len());
    let table_len = table_end.saturating_sub(table_start);

    let relative = usize::try_from(name_offset)
        .ok()
        .filter(|offset| *offset <= table_len)
        .ok_or(LayoutError::InvalidNameOffset {
            offset: name_offset,
            table_len,
        })?;

    let start = (table_start + relative) as u64;
    let bytes = blob.read_c_string(start, table_end).map_err(|err| match err {
        MemoryError::Unterminated { .. } => LayoutError::UnterminatedName { offset: start },
        other => LayoutError::Memory(other),
    })?;

    std::str::from_utf8(bytes).map_err(|_| LayoutError::InvalidNameEncoding { offset: start })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{decode_header, FunctionTable, ImageBuilder};

    fn metadata_offsets(image: &[u8]) -> (Header, Vec<u64>) {
        let blob = MetadataBlob::new(image);
        let header = decode_header(&blob).unwrap();
        let offsets = FunctionTable::new(blob, header)
            .entries()
            .map(|e| e.unwrap().metadata_offset)
            .collect();
        (header, offsets)
    }

    fn patch_name_offset(image: &mut [u8], header: &Header, metadata_offset: u64, value: i32) {
        let at = (header.function_table_offset + metadata_offset) as usize + header.pointer_size as usize;
        image[at..at + 4].copy_from_slice(&value.to_ne_bytes());
    }

    #[test]
    fn test_decodes_names_and_descriptor() {
        for pointer_size in [4u8, 8] {
            let image = ImageBuilder::new(pointer_size)
                .function("runtime.main", 0x40_1000)
                .function("main.main", 0x40_2000)
                .build()
                .unwrap();
            let blob = MetadataBlob::new(&image);
            let (header, offsets) = metadata_offsets(&image);

            assert_eq!(decode_name(&blob, &header, offsets[0]).unwrap(), "runtime.main");
            assert_eq!(decode_name(&blob, &header, offsets[1]).unwrap(), "main.main");

            let descriptor = FunctionDescriptor::decode(&blob, &header, offsets[1]).unwrap();
            assert_eq!(descriptor.entry, Address::new(0x40_2000));
            assert_eq!(descriptor.name_offset, "runtime.main\0".len() as i32);
        }
    }

    #[test]
    fn test_shared_names_decode_from_same_offset() {
        let image = ImageBuilder::new(8)
            .function("dup", 0x1000)
            .function("dup", 0x2000)
            .build()
            .unwrap();
        let blob = MetadataBlob::new(&image);
        let (header, offsets) = metadata_offsets(&image);
        let first = decode_name_offset(&blob, &header, offsets[0]).unwrap();
        let second = decode_name_offset(&blob, &header, offsets[1]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_name_offset_rejected() {
        let mut image = ImageBuilder::new(8).function("f", 0x1000).build().unwrap();
        let (header, offsets) = metadata_offsets(&image);
        patch_name_offset(&mut image, &header, offsets[0], -1);
        let err = decode_name(&MetadataBlob::new(&image), &header, offsets[0]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidNameOffset { offset: -1, .. }));
    }

    #[test]
    fn test_name_offset_past_table_rejected() {
        let mut image = ImageBuilder::new(8).function("f", 0x1000).build().unwrap();
        let (header, offsets) = metadata_offsets(&image);
        let table_len = (header.cu_table_offset - header.name_table_offset) as i32;
        patch_name_offset(&mut image, &header, offsets[0], table_len + 1);
        let err = decode_name(&MetadataBlob::new(&image), &header, offsets[0]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidNameOffset { .. }));
    }

    #[test]
    fn test_name_offset_at_table_end_is_unterminated() {
        let mut image = ImageBuilder::new(8).function("f", 0x1000).build().unwrap();
        let (header, offsets) = metadata_offsets(&image);
        let table_len = (header.cu_table_offset - header.name_table_offset) as i32;
        patch_name_offset(&mut image, &header, offsets[0], table_len);
        let err = decode_name(&MetadataBlob::new(&image), &header, offsets[0]).unwrap_err();
        assert!(matches!(err, LayoutError::UnterminatedName { .. }));
    }

    #[test]
    fn test_name_without_terminator_is_unterminated() {
        let mut image = ImageBuilder::new(8).function("abc", 0x1000).build().unwrap();
        let (header, offsets) = metadata_offsets(&image);
        let terminator = header.name_table_offset as usize + 3;
        image[terminator] = b'!';
        let err = decode_name(&MetadataBlob::new(&image), &header, offsets[0]).unwrap_err();
        assert!(matches!(err, LayoutError::UnterminatedName { .. }));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let mut image = ImageBuilder::new(8).function("abc", 0x1000).build().unwrap();
        let (header, _) = metadata_offsets(&image);
        image[header.name_table_offset as usize] = 0xff;
        let blob = MetadataBlob::new(&image);
        assert!(matches!(
            name_at(&blob, &header, 0),
            Err(LayoutError::InvalidNameEncoding { .. })
        ));
    }

    #[test]
    fn test_descriptor_outside_blob() {
        let image = ImageBuilder::new(8).function("f", 0x1000).build().unwrap();
        let blob = MetadataBlob::new(&image);
        let (header, _) = metadata_offsets(&image);
        let err = decode_name(&blob, &header, image.len() as u64).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::OffsetOutOfBounds { table: TableKind::Descriptor, .. }
        ));
        assert!(FunctionDescriptor::decode(&blob, &header, u64::MAX).is_err());
    }
}
