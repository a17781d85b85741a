use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

/// Null media header, used by tracks that are neither video nor audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullMediaHeaderBox {}

impl Mp4Box for NullMediaHeaderBox {
    const NAME: FourCC = FourCC(*b"nmhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        0
    }

    fn write_box_contents(&self, _stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        Ok(NullMediaHeaderBox {})
    }
}
