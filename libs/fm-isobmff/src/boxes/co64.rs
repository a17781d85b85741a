use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLargeOffsetBox {
    pub chunk_offsets: Vec<u64>,
}

impl ChunkLargeOffsetBox {
    pub fn new(chunk_offsets: Vec<u64>) -> Self {
        ChunkLargeOffsetBox { chunk_offsets }
    }
}

impl Mp4Box for ChunkLargeOffsetBox {
    const NAME: FourCC = FourCC(*b"co64");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + (size_of::<u64>() as u64) * self.chunk_offsets.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.chunk_offsets.len() as u32);

        for &chunk_offset in &self.chunk_offsets {
            stream.write_u64(chunk_offset);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut chunk_offsets = Vec::new();
        for _ in 0..entry_count {
            chunk_offsets.push(stream.read_u64()?);
        }

        Ok(ChunkLargeOffsetBox { chunk_offsets })
    }
}

impl ChunkLargeOffsetBox {
    /// Reads a 32-bit 'stco' table into the 64-bit representation.
    pub fn parse_stco_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut chunk_offsets = Vec::new();
        for _ in 0..entry_count {
            chunk_offsets.push(stream.read_u32()? as u64);
        }

        Ok(ChunkLargeOffsetBox { chunk_offsets })
    }
}
