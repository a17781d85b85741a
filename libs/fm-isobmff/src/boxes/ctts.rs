use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionOffsetEntry {
    pub count: u32,
    pub offset: i32,
}

/// Version 1 (signed offsets) is selected automatically whenever any entry
/// has a negative offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionOffsetBox {
    pub entries: Vec<CompositionOffsetEntry>,
}

impl CompositionOffsetBox {
    pub fn new(entries: Vec<CompositionOffsetEntry>) -> Self {
        CompositionOffsetBox { entries }
    }

    pub fn add_sample_offset(&mut self, offset: i32) {
        match self.entries.last_mut() {
            Some(entry) if entry.offset == offset => entry.count += 1,
            _ => self.entries.push(CompositionOffsetEntry { count: 1, offset }),
        }
    }

    fn version(&self) -> u8 {
        if self.entries.iter().any(|entry| entry.offset < 0) {
            1
        } else {
            0
        }
    }
}

impl Mp4Box for CompositionOffsetBox {
    const NAME: FourCC = FourCC(*b"ctts");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(self.version(), 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64
            + (size_of::<u32>() as u64 + size_of::<u32>() as u64) * self.entries.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            stream.write_u32(entry.count);
            stream.write_i32(entry.offset);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(CompositionOffsetEntry {
                count: stream.read_u32()?,
                offset: stream.read_i32()?,
            });
        }

        Ok(CompositionOffsetBox { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offsets_select_version_1() {
        let mut ctts = CompositionOffsetBox::new(Vec::new());
        ctts.add_sample_offset(0);
        ctts.add_sample_offset(0);
        assert_eq!(ctts.full_box_header().map(|h| h.version), Some(0));
        assert_eq!(ctts.entries.len(), 1);

        ctts.add_sample_offset(-3000);
        assert_eq!(ctts.full_box_header().map(|h| h.version), Some(1));
    }
}
