use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

/// Always written in the per-sample form; a uniform-size table is expanded
/// into individual entries when parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSizeBox {
    pub sample_sizes: Vec<u32>,
}

impl SampleSizeBox {
    pub fn new(sample_sizes: Vec<u32>) -> Self {
        SampleSizeBox { sample_sizes }
    }
}

impl Mp4Box for SampleSizeBox {
    const NAME: FourCC = FourCC(*b"stsz");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64
            + size_of::<u32>() as u64
            + size_of::<u32>() as u64 * self.sample_sizes.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(0);
        stream.write_u32(self.sample_sizes.len() as u32);

        for &size in &self.sample_sizes {
            stream.write_u32(size);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let sample_size = stream.read_u32()?;
        let sample_count = stream.read_u32()?;

        let mut sample_sizes = Vec::new();
        if sample_size != 0 {
            sample_sizes.resize(sample_count as usize, sample_size);
        } else {
            for _ in 0..sample_count {
                sample_sizes.push(stream.read_u32()?);
            }
        }

        Ok(SampleSizeBox { sample_sizes })
    }
}
