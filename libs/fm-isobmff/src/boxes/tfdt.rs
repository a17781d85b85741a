use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragmentBaseMediaDecodeTimeBox {
    pub base_media_decode_time: u64,
}

impl TrackFragmentBaseMediaDecodeTimeBox {
    pub fn new(base_media_decode_time: u64) -> Self {
        TrackFragmentBaseMediaDecodeTimeBox {
            base_media_decode_time,
        }
    }
}

impl Mp4Box for TrackFragmentBaseMediaDecodeTimeBox {
    const NAME: FourCC = FourCC(*b"tfdt");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 // base_media_decode_time
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u64(self.base_media_decode_time);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;

        let base_media_decode_time = if header.version == 1 {
            stream.read_u64()?
        } else {
            stream.read_u32()? as u64
        };

        Ok(TrackFragmentBaseMediaDecodeTimeBox {
            base_media_decode_time,
        })
    }
}
