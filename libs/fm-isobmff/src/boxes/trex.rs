use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackExtendsBox {
    pub track_id: u32,
    pub default_sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl TrackExtendsBox {
    pub fn new(
        track_id: u32,
        default_sample_description_index: u32,
        default_sample_duration: u32,
        default_sample_size: u32,
        default_sample_flags: u32,
    ) -> Self {
        TrackExtendsBox {
            track_id,
            default_sample_description_index,
            default_sample_duration,
            default_sample_size,
            default_sample_flags,
        }
    }
}

impl Mp4Box for TrackExtendsBox {
    const NAME: FourCC = FourCC(*b"trex");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + // track_ID
        size_of::<u32>() as u64 + // default_sample_description_index
        size_of::<u32>() as u64 + // default_sample_duration
        size_of::<u32>() as u64 + // default_sample_size
        size_of::<u32>() as u64 // default_sample_flags
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.track_id);
        stream.write_u32(self.default_sample_description_index);
        stream.write_u32(self.default_sample_duration);
        stream.write_u32(self.default_sample_size);
        stream.write_u32(self.default_sample_flags);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        Ok(TrackExtendsBox {
            track_id: stream.read_u32()?,
            default_sample_description_index: stream.read_u32()?,
            default_sample_duration: stream.read_u32()?,
            default_sample_size: stream.read_u32()?,
            default_sample_flags: stream.read_u32()?,
        })
    }
}
