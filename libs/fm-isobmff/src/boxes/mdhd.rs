use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHeaderBox {
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
}

impl MediaHeaderBox {
    pub fn new(timescale: u32, duration: u64) -> Self {
        MediaHeaderBox {
            creation_time: 0,
            modification_time: 0,
            timescale,
            duration,
        }
    }
}

impl Mp4Box for MediaHeaderBox {
    const NAME: FourCC = FourCC(*b"mdhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 + // creation_time
        size_of::<u64>() as u64 + // modification_time
        size_of::<u32>() as u64 + // timescale
        size_of::<u64>() as u64 + // duration
        size_of::<u16>() as u64 + // language
        size_of::<u16>() as u64 // pre_defined
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u64(self.creation_time);
        stream.write_u64(self.modification_time);
        stream.write_u32(self.timescale);
        stream.write_u64(self.duration);

        stream.write_u16(0x55c4); // language: und
        stream.write_u16(0);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;

        let (creation_time, modification_time, timescale, duration) = if header.version == 1 {
            let creation_time = stream.read_u64()?;
            let modification_time = stream.read_u64()?;
            let timescale = stream.read_u32()?;
            let duration = stream.read_u64()?;
            (creation_time, modification_time, timescale, duration)
        } else {
            let creation_time = stream.read_u32()? as u64;
            let modification_time = stream.read_u32()? as u64;
            let timescale = stream.read_u32()?;
            let duration = stream.read_u32()? as u64;
            (creation_time, modification_time, timescale, duration)
        };

        stream.skip_bytes(4)?; // language, pre_defined

        Ok(MediaHeaderBox {
            creation_time,
            modification_time,
            timescale,
            duration,
        })
    }
}
