// Tue Jan 13 2026 - Alex

use crate::layout::{decode_header, decode_name, FunctionTable, Header, LayoutError};
use crate::memory::{Address, MetadataBlob};
use crate::symbol::{synthesize, FunctionPointer, FunctionSpan, ResolvedSymbol, SymbolError, SymbolIndex};

/// Resolves `name` to the entry address of the first function table row
/// carrying that name.
///
/// The header is decoded on every call and the table is scanned linearly in
/// declaration order. The first decode failure aborts the scan and is returned
/// in place of `NotFound`.
pub fn resolve(blob: &MetadataBlob<'_>, name: &str) -> Result<Address, SymbolError> {
    let header = decode_header(blob)?;
    let table = FunctionTable::new(*blob, header);

    for (index, entry) in table.entries().enumerate() {
        let entry = entry?;
        let candidate = decode_name(blob, &header, entry.metadata_offset)?;
        log::trace!("record {}: {} @ {}", index, candidate, entry.entry);
        if candidate == name {
            log::debug!("Resolved {} to {} at record {}", name, entry.entry, index);
            return Ok(entry.entry);
        }
    }

    log::debug!("{} not found among {} functions", name, table.len());
    Err(SymbolError::NotFound(name.to_string()))
}

/// Symbol lookups against one module's metadata blob.
///
/// Holds nothing but the blob handle, so it is as cheap to copy and as safe
/// to share between threads as the blob itself.
#[derive(Debug, Clone, Copy)]
pub struct SymbolResolver<'a> {
    blob: MetadataBlob<'a>,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(blob: MetadataBlob<'a>) -> Self {
        Self { blob }
    }

    pub fn blob(&self) -> MetadataBlob<'a> {
        self.blob
    }

    pub fn header(&self) -> Result<Header, LayoutError> {
        decode_header(&self.blob)
    }

    pub fn table(&self) -> Result<FunctionTable<'a>, LayoutError> {
        Ok(FunctionTable::new(self.blob, self.header()?))
    }

    pub fn resolve(&self, name: &str) -> Result<Address, SymbolError> {
        resolve(&self.blob, name)
    }

    pub fn resolve_symbol(&self, name: &str) -> Result<ResolvedSymbol, SymbolError> {
        let address = self.resolve(name)?;
        Ok(ResolvedSymbol::new(name, address))
    }

    /// Every function in table order, duplicates included.
    pub fn symbols(&self) -> Result<Vec<ResolvedSymbol>, SymbolError> {
        let header = self.header()?;
        let table = FunctionTable::new(self.blob, header);
        let mut symbols = Vec::with_capacity(table.len());
        for entry in table.entries() {
            let entry = entry?;
            let name = decode_name(&self.blob, &header, entry.metadata_offset)?;
            symbols.push(ResolvedSymbol::new(name, entry.entry));
        }
        Ok(symbols)
    }

    /// The function whose code contains `pc`, if any.
    pub fn function_at(&self, pc: Address) -> Result<Option<FunctionSpan>, SymbolError> {
        let header = self.header()?;
        let table = FunctionTable::new(self.blob, header);
        let Some(slot) = table.find_by_pc(pc)? else {
            return Ok(None);
        };
        let name = decode_name(&self.blob, &header, slot.entry.metadata_offset)?;
        Ok(Some(FunctionSpan {
            symbol: ResolvedSymbol::new(name, slot.entry.entry),
            range: slot.range,
        }))
    }

    pub fn build_index(&self) -> Result<SymbolIndex, SymbolError> {
        SymbolIndex::build(&self.blob)
    }

    /// Resolves `name` and hands its address to [`synthesize`].
    ///
    /// # Safety
    ///
    /// Same contract as [`synthesize`]: the function named `name` must have
    /// exactly the signature of `F`. A mismatch is undefined behavior when the
    /// pointer is called and is never reported here.
    pub unsafe fn resolve_callable<F: FunctionPointer>(&self, name: &str) -> Result<F, SymbolError> {
        let address = self.resolve(name)?;
        Ok(synthesize::<F>(address)?)
    }
}
