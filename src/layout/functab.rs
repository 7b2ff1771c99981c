// Tue Jan 13 2026 - Alex

use crate::layout::{Header, LayoutError};
use crate::memory::{Address, MemoryRange, MemoryReader, MetadataBlob};
use serde::Serialize;
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionTableEntry {
    pub entry: Address,
    pub metadata_offset: u64,
}

/// A function table row together with the code range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionSlot {
    pub index: usize,
    pub entry: FunctionTableEntry,
    pub range: MemoryRange,
}

/// Read-through view of the function table described by a header.
///
/// The table holds `function_count` records followed by one sentinel record
/// whose entry marks the end of the last function.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable<'a> {
    blob: MetadataBlob<'a>,
    header: Header,
}

impl<'a> FunctionTable<'a> {
    pub fn new(blob: MetadataBlob<'a>, header: Header) -> Self {
        Self { blob, header }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.header.function_count
    }

    pub fn is_empty(&self) -> bool {
        self.header.function_count == 0
    }

    fn record(&self, index: usize, count: usize) -> Result<FunctionTableEntry, LayoutError> {
        let truncated = || LayoutError::TruncatedTable { index, count };
        let record_size = self.header.record_size();
        let offset = (index as u64)
            .checked_mul(record_size)
            .and_then(|rel| rel.checked_add(self.header.function_table_offset))
            .ok_or_else(truncated)?;
        let end = offset.checked_add(record_size).ok_or_else(truncated)?;
        if end > self.blob.len() as u64 {
            return Err(truncated());
        }

        let width = self.header.pointer_size;
        Ok(FunctionTableEntry {
            entry: Address::new(self.blob.read_word(offset, width)?),
            metadata_offset: self.blob.read_word(offset + u64::from(width), width)?,
        })
    }

    pub fn get(&self, index: usize) -> Result<Option<FunctionTableEntry>, LayoutError> {
        if index >= self.len() {
            return Ok(None);
        }
        self.record(index, self.len()).map(Some)
    }

    /// Entry of the sentinel record, i.e. the end of the last function.
    pub fn end_of_text(&self) -> Result<Address, LayoutError> {
        let count = self.len().saturating_add(1);
        Ok(self.record(self.len(), count)?.entry)
    }

    /// Walks the table in declaration order. Each call starts over from the
    /// first record.
    pub fn entries(&self) -> FunctionEntries<'a> {
        FunctionEntries {
            table: *self,
            index: 0,
            done: false,
        }
    }

    /// Finds the function whose code range contains `pc`.
    ///
    /// Relies on the table being sorted by entry address.
    pub fn find_by_pc(&self, pc: Address) -> Result<Option<FunctionSlot>, LayoutError> {
        if self.is_empty() {
            return Ok(None);
        }

        let count = self.len();
        let first = self.record(0, count)?.entry;
        let end_of_text = self.end_of_text()?;
        if pc < first || pc >= end_of_text {
            return Ok(None);
        }

        let mut lo = 0usize;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.record(mid, count)?.entry <= pc {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let index = lo.saturating_sub(1);
        let entry = self.record(index, count)?;
        let end = if index + 1 == count {
            end_of_text
        } else {
            self.record(index + 1, count)?.entry
        };

        let range = MemoryRange::try_new(entry.entry, end)
            .filter(|range| range.contains(pc))
            .ok_or(LayoutError::UnorderedTable { index: index + 1 })?;

        Ok(Some(FunctionSlot { index, entry, range }))
    }
}

pub struct FunctionEntries<'a> {
    table: FunctionTable<'a>,
    index: usize,
    done: bool,
}

impl Iterator for FunctionEntries<'_> {
    type Item = Result<FunctionTableEntry, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.table.len() {
            return None;
        }
        match self.table.record(self.index, self.table.len()) {
            Ok(entry) => {
                self.index += 1;
                Some(Ok(entry))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.table.len() - self.index))
        }
    }
}

impl FusedIterator for FunctionEntries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{decode_header, ImageBuilder};

    fn table_of(image: &[u8]) -> FunctionTable<'_> {
        let blob = MetadataBlob::new(image);
        FunctionTable::new(blob, decode_header(&blob).unwrap())
    }

    fn three_functions(pointer_size: u8) -> Vec<u8> {
        ImageBuilder::new(pointer_size)
            .function("alpha", 0x1000)
            .function("beta", 0x2000)
            .function("gamma", 0x3000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_walks_in_declaration_order() {
        for pointer_size in [4u8, 8] {
            let image = three_functions(pointer_size);
            let table = table_of(&image);
            let entries: Vec<u64> = table
                .entries()
                .map(|e| e.unwrap().entry.as_u64())
                .collect();
            assert_eq!(entries, vec![0x1000, 0x2000, 0x3000]);
            assert_eq!(table.len(), 3);
        }
    }

    #[test]
    fn test_walk_is_restartable() {
        let image = three_functions(8);
        let table = table_of(&image);
        let first: Vec<_> = table.entries().collect::<Result<_, _>>().unwrap();
        let second: Vec<_> = table.entries().collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsorted_table_is_not_resorted() {
        let image = ImageBuilder::new(8)
            .function("late", 0x5000)
            .function("early", 0x1000)
            .build()
            .unwrap();
        let table = table_of(&image);
        let entries: Vec<u64> = table.entries().map(|e| e.unwrap().entry.as_u64()).collect();
        assert_eq!(entries, vec![0x5000, 0x1000]);
    }

    #[test]
    fn test_truncated_table_yields_valid_prefix_then_error() {
        let image = three_functions(8);
        let header = decode_header(&MetadataBlob::new(&image)).unwrap();
        // Cut through the middle of the third record.
        let cut = (header.function_table_offset + 2 * header.record_size() + 8) as usize;
        let blob = MetadataBlob::new(&image).truncated(cut);
        let table = FunctionTable::new(blob, header);

        let mut entries = table.entries();
        assert_eq!(entries.next().unwrap().unwrap().entry, Address::new(0x1000));
        assert_eq!(entries.next().unwrap().unwrap().entry, Address::new(0x2000));
        assert!(matches!(
            entries.next(),
            Some(Err(LayoutError::TruncatedTable { index: 2, count: 3 }))
        ));
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_get_and_end_of_text() {
        let image = ImageBuilder::new(8)
            .function("alpha", 0x1000)
            .function("beta", 0x2000)
            .text_end(0x2400)
            .build()
            .unwrap();
        let table = table_of(&image);
        assert_eq!(table.get(1).unwrap().unwrap().entry, Address::new(0x2000));
        assert!(table.get(2).unwrap().is_none());
        assert_eq!(table.end_of_text().unwrap(), Address::new(0x2400));
    }

    #[test]
    fn test_find_by_pc() {
        let image = three_functions(8);
        let table = table_of(&image);

        let slot = table.find_by_pc(Address::new(0x2010)).unwrap().unwrap();
        assert_eq!(slot.index, 1);
        assert_eq!(slot.range.start(), Address::new(0x2000));
        assert_eq!(slot.range.end(), Address::new(0x3000));

        let slot = table.find_by_pc(Address::new(0x1000)).unwrap().unwrap();
        assert_eq!(slot.index, 0);

        let last = table.find_by_pc(Address::new(0x3fff)).unwrap().unwrap();
        assert_eq!(last.index, 2);
        assert_eq!(last.range.end(), Address::new(0x4000));

        assert!(table.find_by_pc(Address::new(0xfff)).unwrap().is_none());
        assert!(table.find_by_pc(Address::new(0x4000)).unwrap().is_none());
    }

    #[test]
    fn test_find_by_pc_on_empty_table() {
        let image = ImageBuilder::new(8).build().unwrap();
        assert!(table_of(&image).find_by_pc(Address::new(0x1000)).unwrap().is_none());
    }
}
