// Tue Jan 13 2026 - Alex

use crate::layout::LayoutIssue;
use crate::memory::Address;
use crate::output::{HeaderReport, InputInfo, ListReport, LookupReport, ResolveOutcome};
use crate::symbol::ResolvedSymbol;

/// Plain-text rendering of reports. Coloring is left to the caller.
pub struct OutputFormatter {
    address_width: usize,
    max_name_width: usize,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            address_width: 16,
            max_name_width: 60,
        }
    }

    pub fn with_address_width(mut self, width: usize) -> Self {
        self.address_width = width;
        self
    }

    pub fn with_max_name_width(mut self, width: usize) -> Self {
        self.max_name_width = width.max(4);
        self
    }

    pub fn format_address(&self, address: Address) -> String {
        format!("0x{:0width$x}", address.as_u64(), width = self.address_width)
    }

    fn fit_name(&self, name: &str) -> String {
        if name.chars().count() <= self.max_name_width {
            return name.to_string();
        }
        let kept: String = name.chars().take(self.max_name_width - 3).collect();
        format!("{}...", kept)
    }

    pub fn format_input(&self, input: &InputInfo) -> String {
        match &input.section {
            Some(section) => format!(
                "{} [{}] {} ({} bytes)",
                input.path,
                section,
                self.format_address(input.range.start()),
                input.range.size()
            ),
            None => format!(
                "{} [raw] {} ({} bytes)",
                input.path,
                self.format_address(input.range.start()),
                input.range.size()
            ),
        }
    }

    pub fn format_header(&self, report: &HeaderReport) -> Vec<String> {
        let header = &report.header;
        let mut lines = vec![
            format!("magic            0x{:08x}", header.magic),
            format!("pointer size     {}", header.pointer_size),
            format!("min instruction  {}", header.min_instruction_size),
            format!("functions        {}", header.function_count),
            format!("files            {}", header.file_count),
        ];
        for span in &report.tables {
            lines.push(format!(
                "{:<24} 0x{:08x}..0x{:08x}",
                span.table, span.offset, span.end
            ));
        }
        lines
    }

    pub fn format_symbol(&self, symbol: &ResolvedSymbol) -> String {
        format!(
            "{}  {}",
            self.format_address(symbol.address),
            self.fit_name(&symbol.name)
        )
    }

    pub fn format_outcome(&self, outcome: &ResolveOutcome) -> String {
        match (&outcome.address, &outcome.error) {
            (Some(address), _) => format!("{}  {}", self.format_address(*address), outcome.name),
            (None, Some(error)) => format!("{}  {}", outcome.name, error),
            (None, None) => outcome.name.clone(),
        }
    }

    pub fn format_list(&self, report: &ListReport) -> Vec<String> {
        report.symbols.iter().map(|s| self.format_symbol(s)).collect()
    }

    pub fn format_lookup(&self, report: &LookupReport) -> String {
        match (&report.function, &report.location) {
            (Some(span), Some(location)) => format!(
                "{}  {}  [{} - {})",
                self.format_address(report.pc),
                location,
                self.format_address(span.range.start()),
                self.format_address(span.range.end())
            ),
            _ => format!("{}  <no function>", self.format_address(report.pc)),
        }
    }

    pub fn format_issue(&self, issue: &LayoutIssue) -> String {
        issue.to_string()
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRange;

    #[test]
    fn test_format_address_width() {
        let formatter = OutputFormatter::new().with_address_width(8);
        assert_eq!(formatter.format_address(Address::new(0xabc)), "0x00000abc");
    }

    #[test]
    fn test_long_names_are_truncated() {
        let formatter = OutputFormatter::new().with_address_width(4).with_max_name_width(10);
        let symbol = ResolvedSymbol::new("github.com/pkg/very.Long", Address::new(0x10));
        assert_eq!(formatter.format_symbol(&symbol), "0x0010  github....");
    }

    #[test]
    fn test_format_outcome() {
        let formatter = OutputFormatter::new().with_address_width(4);
        let hit = ResolveOutcome {
            name: "main.main".to_string(),
            address: Some(Address::new(0x1000)),
            error: None,
        };
        let miss = ResolveOutcome {
            name: "main.gone".to_string(),
            address: None,
            error: Some("Symbol not found: main.gone".to_string()),
        };
        assert_eq!(formatter.format_outcome(&hit), "0x1000  main.main");
        assert_eq!(formatter.format_outcome(&miss), "main.gone  Symbol not found: main.gone");
    }

    #[test]
    fn test_format_input() {
        let formatter = OutputFormatter::new().with_address_width(6);
        let range = MemoryRange::from_start_size(Address::new(0x4a0000), 0x200);
        let input = InputInfo::section("bin/app", ".gopclntab", range);
        assert_eq!(formatter.format_input(&input), "bin/app [.gopclntab] 0x4a0000 (512 bytes)");
    }
}
