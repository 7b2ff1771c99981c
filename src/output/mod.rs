// Tue Jan 13 2026 - Alex

pub mod formatter;
pub mod json;

pub use formatter::OutputFormatter;
pub use json::{JsonError, JsonSerializer};

use crate::layout::{Header, VerifyReport};
use crate::memory::{Address, MemoryRange};
use crate::symbol::{FunctionSpan, ResolvedSymbol, SymbolError};
use serde::Serialize;

/// Where a metadata blob came from.
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    pub path: String,
    /// Section the blob was taken from, `None` for raw dumps.
    pub section: Option<String>,
    pub range: MemoryRange,
}

impl InputInfo {
    pub fn raw(path: impl Into<String>, range: MemoryRange) -> Self {
        Self {
            path: path.into(),
            section: None,
            range,
        }
    }

    pub fn section(path: impl Into<String>, section: impl Into<String>, range: MemoryRange) -> Self {
        Self {
            path: path.into(),
            section: Some(section.into()),
            range,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderReport {
    pub input: InputInfo,
    pub header: Header,
    pub tables: Vec<TableSpan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSpan {
    pub table: String,
    pub offset: u64,
    pub end: usize,
}

impl HeaderReport {
    pub fn new(input: InputInfo, header: Header, blob_len: usize) -> Self {
        let tables = header
            .tables()
            .iter()
            .map(|(kind, offset)| TableSpan {
                table: kind.name().to_string(),
                offset: *offset,
                end: header.table_end(*kind, blob_len),
            })
            .collect();
        Self { input, header, tables }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub name: String,
    pub address: Option<Address>,
    pub error: Option<String>,
}

impl ResolveOutcome {
    pub fn from_result(name: &str, result: Result<Address, SymbolError>) -> Self {
        match result {
            Ok(address) => Self {
                name: name.to_string(),
                address: Some(address),
                error: None,
            },
            Err(err) => Self {
                name: name.to_string(),
                address: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub input: InputInfo,
    pub results: Vec<ResolveOutcome>,
}

impl ResolveReport {
    pub fn unresolved(&self) -> usize {
        self.results.iter().filter(|r| !r.is_resolved()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    pub input: InputInfo,
    /// Functions in the table before filtering.
    pub total: usize,
    pub symbols: Vec<ResolvedSymbol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub input: InputInfo,
    pub pc: Address,
    pub function: Option<FunctionSpan>,
    pub location: Option<String>,
}

impl LookupReport {
    pub fn new(input: InputInfo, pc: Address, function: Option<FunctionSpan>) -> Self {
        let location = function.as_ref().map(|span| span.format_pc(pc));
        Self {
            input,
            pc,
            function,
            location,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutput {
    pub input: InputInfo,
    pub report: VerifyReport,
}
