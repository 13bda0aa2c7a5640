//! PE header walk down to the export name table.
//!
//! Path through the image:
//! 1. DOS header: `MZ` magic, PE header offset at `0x3C`
//! 2. PE signature, COFF machine type and section count
//! 3. Export data directory, at a machine-dependent distance
//! 4. Section table, used to turn RVAs into file offsets
//! 5. Export directory: name count and name-pointer table

use std::path::Path;

use tracing::debug;

use crate::error::ImageError;

#[cfg(test)]
mod tests;

const DOS_MAGIC: u16 = 0x5A4D;
const PE_OFFSET_FIELD: usize = 0x3C;
const PE_SIGNATURE: u32 = 0x0000_4550;
const MACHINE_AMD64: u16 = 0x8664;

/// From just after the section-count field to the export data directory.
const EXPORT_DIRECTORY_SKIP_64: usize = 128;
const EXPORT_DIRECTORY_SKIP_32: usize = 112;
/// The fifteen data directories after the export directory.
const REMAINING_DATA_DIRECTORIES: usize = 15 * 8;

const NUMBER_OF_NAMES_OFFSET: usize = 24;
const ADDRESS_OF_NAMES_OFFSET: usize = 32;

/// Read a PE image from disk and list its exported names.
pub fn read_exports(path: impl AsRef<Path>) -> Result<Vec<String>, ImageError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let names = parse_exports(&data)?;
    debug!(path = %path.display(), exports = names.len(), "read export table");
    Ok(names)
}

/// List the exported names of an in-memory PE image, in table order.
///
/// An image without an export directory yields an empty list.
#[tracing::instrument(level = "debug", skip_all, fields(len = data.len()))]
pub fn parse_exports(data: &[u8]) -> Result<Vec<String>, ImageError> {
    let mut cursor = Cursor::new(data);
    if cursor.u16()? != DOS_MAGIC {
        return Err(ImageError::BadDosMagic);
    }

    cursor.seek(PE_OFFSET_FIELD);
    let pe_offset = cursor.u32()? as usize;
    cursor.seek(pe_offset);
    if cursor.u32()? != PE_SIGNATURE {
        return Err(ImageError::BadPeSignature { offset: pe_offset });
    }

    let machine = cursor.u16()?;
    let section_count = cursor.u16()?;
    cursor.skip(if machine == MACHINE_AMD64 {
        EXPORT_DIRECTORY_SKIP_64
    } else {
        EXPORT_DIRECTORY_SKIP_32
    });
    let export_rva = cursor.u32()?;
    let _export_size = cursor.u32()?;
    if export_rva == 0 {
        debug!("image has no export directory");
        return Ok(Vec::new());
    }

    cursor.skip(REMAINING_DATA_DIRECTORIES);
    let sections = (0..section_count)
        .map(|_| Section::read(&mut cursor))
        .collect::<Result<Vec<_>, _>>()?;
    let to_offset = |rva: u32| {
        sections
            .iter()
            .find_map(|section| section.file_offset(rva))
            .ok_or(ImageError::UnmappedAddress { rva })
    };

    let export_dir = to_offset(export_rva)?;
    cursor.seek(export_dir + NUMBER_OF_NAMES_OFFSET);
    let name_count = cursor.u32()?;
    cursor.seek(export_dir + ADDRESS_OF_NAMES_OFFSET);
    let names_rva = cursor.u32()?;
    if name_count == 0 {
        return Ok(Vec::new());
    }

    cursor.seek(to_offset(names_rva)?);
    let mut names = Vec::with_capacity(name_count.min(0x1_0000) as usize);
    for _ in 0..name_count {
        let name_rva = cursor.u32()?;
        names.push(cursor.c_string_at(to_offset(name_rva)?)?);
    }
    Ok(names)
}

#[derive(Copy, Clone, Debug)]
struct Section {
    virtual_size: u32,
    virtual_address: u32,
    raw_size: u32,
    raw_offset: u32,
}

impl Section {
    /// Section header: 8-byte name, four address fields, 16 bytes we ignore.
    fn read(cursor: &mut Cursor<'_>) -> Result<Section, ImageError> {
        cursor.skip(8);
        let section = Section {
            virtual_size: cursor.u32()?,
            virtual_address: cursor.u32()?,
            raw_size: cursor.u32()?,
            raw_offset: cursor.u32()?,
        };
        cursor.skip(16);
        Ok(section)
    }

    /// File offset of `rva` if this section holds it.
    fn file_offset(&self, rva: u32) -> Option<usize> {
        let start = u64::from(self.virtual_address);
        let extent = u64::from(self.virtual_size.max(self.raw_size));
        let rva = u64::from(rva);
        if rva < start || rva >= start + extent {
            return None;
        }
        usize::try_from(rva - start + u64::from(self.raw_offset)).ok()
    }
}

/// Little-endian reader with bounds-checked reads.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ImageError> {
        let bytes = self
            .pos
            .checked_add(N)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or(ImageError::Truncated { offset: self.pos })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos += N;
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, ImageError> {
        self.take().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, ImageError> {
        self.take().map(u32::from_le_bytes)
    }

    /// NUL-terminated string at `offset`; the cursor does not move.
    fn c_string_at(&self, offset: usize) -> Result<String, ImageError> {
        let tail = self
            .data
            .get(offset..)
            .ok_or(ImageError::Truncated { offset })?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(ImageError::Truncated {
                offset: self.data.len(),
            })?;
        Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
    }
}
