use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundMediaHeaderBox {}

impl Mp4Box for SoundMediaHeaderBox {
    const NAME: FourCC = FourCC(*b"smhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u16>() as u64 + // balance
        size_of::<u16>() as u64 // reserved
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_bytes(&[0u8; 4]);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;
        stream.skip_bytes(4)?;

        Ok(SoundMediaHeaderBox {})
    }
}
