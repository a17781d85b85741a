use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeToSampleEntry {
    pub count: u32,
    pub delta: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeToSampleBox {
    pub entries: Vec<TimeToSampleEntry>,
}

impl TimeToSampleBox {
    pub fn new(entries: Vec<TimeToSampleEntry>) -> Self {
        TimeToSampleBox { entries }
    }

    /// Appends one sample's delta, merging it into the previous run when
    /// the delta is unchanged.
    pub fn add_sample_delta(&mut self, delta: u32) {
        match self.entries.last_mut() {
            Some(entry) if entry.delta == delta => entry.count += 1,
            _ => self.entries.push(TimeToSampleEntry { count: 1, delta }),
        }
    }
}

impl Mp4Box for TimeToSampleBox {
    const NAME: FourCC = FourCC(*b"stts");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64
            + (size_of::<u32>() as u64 + size_of::<u32>() as u64) * self.entries.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            stream.write_u32(entry.count);
            stream.write_u32(entry.delta);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(TimeToSampleEntry {
                count: stream.read_u32()?,
                delta: stream.read_u32()?,
            });
        }

        Ok(TimeToSampleBox { entries })
    }
}
