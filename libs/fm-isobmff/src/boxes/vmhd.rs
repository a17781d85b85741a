use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMediaHeaderBox {}

impl Mp4Box for VideoMediaHeaderBox {
    const NAME: FourCC = FourCC(*b"vmhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 1))
    }

    fn content_size(&self) -> u64 {
        size_of::<u16>() as u64 + // graphicsmode
        (size_of::<u16>() as u64 * 3) // opcolor
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_bytes(&[0u8; 8]);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;
        stream.skip_bytes(8)?;

        Ok(VideoMediaHeaderBox {})
    }
}
