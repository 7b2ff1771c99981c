// Tue Jan 13 2026 - Alex

use crate::layout::{FunctionDescriptor, Header, LayoutError, MAGIC};
use crate::memory::MemoryError;
use std::collections::HashMap;

/// Gap left after the last function when no explicit end of text is given.
const DEFAULT_TRAILING_SIZE: u64 = 0x1000;

/// Writes synthetic metadata images in the native byte order.
///
/// Layout: header, name table, compilation unit table, file table, pc table,
/// then (pointer aligned) the function table with its sentinel record followed
/// by one descriptor per function. Functions are written in the order they
/// were added; nothing is sorted.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    pointer_size: u8,
    min_instruction_size: u8,
    functions: Vec<(String, u64)>,
    files: Vec<String>,
    text_end: Option<u64>,
}

impl ImageBuilder {
    pub fn new(pointer_size: u8) -> Self {
        Self {
            pointer_size,
            min_instruction_size: 1,
            functions: Vec::new(),
            files: Vec::new(),
            text_end: None,
        }
    }

    pub fn min_instruction_size(mut self, size: u8) -> Self {
        self.min_instruction_size = size;
        self
    }

    pub fn function(mut self, name: &str, entry: u64) -> Self {
        self.functions.push((name.to_string(), entry));
        self
    }

    pub fn file(mut self, name: &str) -> Self {
        self.files.push(name.to_string());
        self
    }

    pub fn text_end(mut self, end: u64) -> Self {
        self.text_end = Some(end);
        self
    }

    pub fn build(&self) -> Result<Vec<u8>, LayoutError> {
        let width = self.pointer_size;
        if width != 4 && width != 8 {
            return Err(LayoutError::UnsupportedPointerSize(width));
        }
        let word = width as usize;

        let mut names = Vec::new();
        let mut name_offsets: HashMap<&str, usize> = HashMap::new();
        for (name, _) in &self.functions {
            if !name_offsets.contains_key(name.as_str()) {
                name_offsets.insert(name.as_str(), names.len());
                names.extend_from_slice(name.as_bytes());
                names.push(0);
            }
        }

        let mut files = Vec::new();
        let mut cu_table = Vec::new();
        for file in &self.files {
            cu_table.extend_from_slice(&(files.len() as u32).to_ne_bytes());
            files.extend_from_slice(file.as_bytes());
            files.push(0);
        }

        let name_table_offset = Header::size_for(width);
        let cu_table_offset = name_table_offset + names.len();
        let file_table_offset = cu_table_offset + cu_table.len();
        let pc_table_offset = file_table_offset + files.len();
        let pc_table = [0u8];
        let function_table_offset = align(pc_table_offset + pc_table.len(), word);

        let record_size = 2 * word;
        let count = self.functions.len();
        let descriptor_size = align(FunctionDescriptor::size_for(width), word);
        let descriptors_start = (count + 1) * record_size;
        let total = function_table_offset + descriptors_start + count * descriptor_size;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&MAGIC.to_ne_bytes());
        out.extend_from_slice(&[0, 0, self.min_instruction_size, width]);
        put_word(&mut out, count as u64, width)?;
        put_word(&mut out, self.files.len() as u64, width)?;
        for offset in [
            name_table_offset,
            cu_table_offset,
            file_table_offset,
            pc_table_offset,
            function_table_offset,
        ] {
            put_word(&mut out, offset as u64, width)?;
        }

        out.extend_from_slice(&names);
        out.extend_from_slice(&cu_table);
        out.extend_from_slice(&files);
        out.extend_from_slice(&pc_table);
        out.resize(function_table_offset, 0);

        for (index, (_, entry)) in self.functions.iter().enumerate() {
            put_word(&mut out, *entry, width)?;
            put_word(&mut out, (descriptors_start + index * descriptor_size) as u64, width)?;
        }
        let last_entry = self.functions.iter().map(|(_, entry)| *entry).max();
        let text_end = self
            .text_end
            .unwrap_or_else(|| last_entry.unwrap_or(0) + DEFAULT_TRAILING_SIZE);
        put_word(&mut out, text_end, width)?;
        put_word(&mut out, 0, width)?;

        for (name, entry) in &self.functions {
            let start = out.len();
            put_word(&mut out, *entry, width)?;
            let name_offset = name_offsets.get(name.as_str()).copied().unwrap_or(0);
            out.extend_from_slice(&(name_offset as i32).to_ne_bytes());
            // args, deferreturn, pcsp, pcfile, pcln, npcdata, cu offset,
            // func id / pad / nfuncdata
            out.extend_from_slice(&[0u8; 7 * 4 + 4]);
            out.resize(start + descriptor_size, 0);
        }

        debug_assert_eq!(out.len(), total);
        Ok(out)
    }
}

fn align(value: usize, to: usize) -> usize {
    (value + to - 1) / to * to
}

fn put_word(out: &mut Vec<u8>, value: u64, width: u8) -> Result<(), LayoutError> {
    match width {
        4 => {
            let value = u32::try_from(value).map_err(|_| {
                MemoryError::NotSupported(format!("value 0x{:x} does not fit a 4-byte word", value))
            })?;
            out.extend_from_slice(&value.to_ne_bytes());
        }
        _ => out.extend_from_slice(&value.to_ne_bytes()),
    }
    Ok(())
}
