// Tue Jan 13 2026 - Alex

use crate::layout::{decode_header, decode_name, FunctionTable};
use crate::memory::{Address, MetadataBlob};
use crate::symbol::SymbolError;
use ahash::AHashMap;

/// Name to entry address map built from one full table scan.
///
/// Only built when a caller asks for it; plain resolution always scans. The
/// first occurrence of a duplicated name wins, matching the scan order.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    by_name: AHashMap<String, Address>,
    duplicates: usize,
}

impl SymbolIndex {
    pub fn build(blob: &MetadataBlob<'_>) -> Result<Self, SymbolError> {
        let header = decode_header(blob)?;
        let table = FunctionTable::new(*blob, header);
        let mut by_name = AHashMap::with_capacity(table.len());
        let mut duplicates = 0;

        for entry in table.entries() {
            let entry = entry?;
            let name = decode_name(blob, &header, entry.metadata_offset)?;
            if by_name.contains_key(name) {
                duplicates += 1;
                log::warn!("Duplicate function name {} at {}, keeping first", name, entry.entry);
                continue;
            }
            by_name.insert(name.to_string(), entry.entry);
        }

        log::debug!("Indexed {} functions ({} duplicates)", by_name.len(), duplicates);

        Ok(Self { by_name, duplicates })
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.by_name.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<Address, SymbolError> {
        self.get(name)
            .ok_or_else(|| SymbolError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
