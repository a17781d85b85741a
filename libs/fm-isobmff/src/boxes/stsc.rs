use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleToChunkEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleToChunkBox {
    pub entries: Vec<SampleToChunkEntry>,
}

impl SampleToChunkBox {
    pub fn new(entries: Vec<SampleToChunkEntry>) -> Self {
        SampleToChunkBox { entries }
    }
}

impl Mp4Box for SampleToChunkBox {
    const NAME: FourCC = FourCC(*b"stsc");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + size_of::<u32>() as u64 * 3 * self.entries.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            stream.write_u32(entry.first_chunk);
            stream.write_u32(entry.samples_per_chunk);
            stream.write_u32(entry.sample_description_index);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(SampleToChunkEntry {
                first_chunk: stream.read_u32()?,
                samples_per_chunk: stream.read_u32()?,
                sample_description_index: stream.read_u32()?,
            });
        }

        Ok(SampleToChunkBox { entries })
    }
}
