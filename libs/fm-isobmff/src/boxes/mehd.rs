use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieExtendsHeaderBox {
    pub fragment_duration: u64,
}

impl MovieExtendsHeaderBox {
    pub fn new(fragment_duration: u64) -> Self {
        MovieExtendsHeaderBox { fragment_duration }
    }
}

impl Mp4Box for MovieExtendsHeaderBox {
    const NAME: FourCC = FourCC(*b"mehd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 // fragment_duration
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u64(self.fragment_duration);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;

        let fragment_duration = if header.version == 1 {
            stream.read_u64()?
        } else {
            stream.read_u32()? as u64
        };

        Ok(MovieExtendsHeaderBox { fragment_duration })
    }
}
