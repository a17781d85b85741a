use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

/// Sample numbers are 1-based, per ISOBMFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSampleBox {
    pub sample_numbers: Vec<u32>,
}

impl SyncSampleBox {
    pub fn new(sample_numbers: Vec<u32>) -> Self {
        SyncSampleBox { sample_numbers }
    }
}

impl Mp4Box for SyncSampleBox {
    const NAME: FourCC = FourCC(*b"stss");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + size_of::<u32>() as u64 * self.sample_numbers.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.sample_numbers.len() as _);

        for &sample_number in &self.sample_numbers {
            stream.write_u32(sample_number);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut sample_numbers = Vec::new();
        for _ in 0..entry_count {
            sample_numbers.push(stream.read_u32()?);
        }

        Ok(SyncSampleBox { sample_numbers })
    }
}
