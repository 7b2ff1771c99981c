// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryError, MetadataBlob, MmapMemory};
use goblin::mach::Mach;
use goblin::Object;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECTION_NAMES: [&str; 2] = [".gopclntab", "__gopclntab"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSection {
    pub name: String,
    pub file_offset: u64,
    pub size: u64,
    pub address: Address,
}

/// An executable on disk whose metadata section is exposed as a blob.
pub struct BinaryImage {
    memory: MmapMemory,
    path: PathBuf,
    section: MetadataSection,
}

impl BinaryImage {
    pub fn load<P: AsRef<Path>>(path: P, section_names: &[String]) -> Result<Self, MemoryError> {
        let path_buf = path.as_ref().to_path_buf();
        let memory = MmapMemory::from_file(&path_buf)?;
        let section = Self::find_section(memory.as_slice(), section_names)?;

        log::debug!(
            "Found {} in {} at file offset 0x{:x} ({} bytes, mapped at {})",
            section.name,
            path_buf.display(),
            section.file_offset,
            section.size,
            section.address
        );

        Ok(Self {
            memory,
            path: path_buf,
            section,
        })
    }

    pub fn find_section(data: &[u8], section_names: &[String]) -> Result<MetadataSection, MemoryError> {
        let object = Object::parse(data)
            .map_err(|e| MemoryError::BinaryParseError(format!("Failed to parse binary: {}", e)))?;

        let candidates: Vec<MetadataSection> = match object {
            Object::Elf(elf) => elf
                .section_headers
                .iter()
                .filter_map(|sh| {
                    let name = elf.shdr_strtab.get_at(sh.sh_name)?;
                    Some(MetadataSection {
                        name: name.to_string(),
                        file_offset: sh.sh_offset,
                        size: sh.sh_size,
                        address: Address::new(sh.sh_addr),
                    })
                })
                .collect(),
            Object::Mach(Mach::Binary(macho)) => {
                let mut candidates = Vec::new();
                for segment in &macho.segments {
                    for section_result in segment.into_iter() {
                        if let Ok((section, _data)) = section_result {
                            let sectname = std::str::from_utf8(&section.sectname)
                                .unwrap_or("")
                                .trim_end_matches('\0');
                            candidates.push(MetadataSection {
                                name: sectname.to_string(),
                                file_offset: u64::from(section.offset),
                                size: section.size,
                                address: Address::new(section.addr),
                            });
                        }
                    }
                }
                candidates
            }
            Object::Mach(Mach::Fat(_)) => {
                return Err(MemoryError::NotSupported(
                    "Fat binaries not supported".to_string(),
                ))
            }
            _ => {
                return Err(MemoryError::NotSupported(
                    "Only ELF and Mach-O images carry a separate metadata section".to_string(),
                ))
            }
        };

        // Earlier names win over later ones, whatever the file's section order.
        let found = section_names
            .iter()
            .find_map(|wanted| candidates.iter().find(|section| &section.name == wanted).cloned());

        found.ok_or_else(|| MemoryError::SectionNotFound(section_names.join(", ")))
    }

    pub fn blob(&self) -> Result<MetadataBlob<'_>, MemoryError> {
        let offset = usize::try_from(self.section.file_offset)
            .map_err(|_| MemoryError::BinaryParseError("section offset exceeds address space".to_string()))?;
        let len = usize::try_from(self.section.size)
            .map_err(|_| MemoryError::BinaryParseError("section size exceeds address space".to_string()))?;
        self.memory.blob(offset, len, self.section.address)
    }

    pub fn section(&self) -> &MetadataSection {
        &self.section
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
