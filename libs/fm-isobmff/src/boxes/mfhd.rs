use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFragmentHeaderBox {
    pub sequence_number: u32,
}

impl MovieFragmentHeaderBox {
    pub fn new(sequence_number: u32) -> Self {
        MovieFragmentHeaderBox { sequence_number }
    }
}

impl Mp4Box for MovieFragmentHeaderBox {
    const NAME: FourCC = FourCC(*b"mfhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        4
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.sequence_number);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        Ok(MovieFragmentHeaderBox {
            sequence_number: stream.read_u32()?,
        })
    }
}
