use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use super::mvhd::write_identity_matrix;

use std::mem::size_of;

bitflags::bitflags! {
    pub struct TrackHeaderFlags: u32 {
        const ENABLED = 0x000001;
        const IN_MOVIE = 0x000002;
        const IN_PREVIEW = 0x000004;
        const SIZE_IS_ASPECT_RATIO = 0x000008;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHeaderBox {
    pub flags: TrackHeaderFlags,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub volume: i16,
    /// Width and height as 16.16 fixed point.
    pub width: u32,
    pub height: u32,
}

impl TrackHeaderBox {
    pub fn new(flags: TrackHeaderFlags, track_id: u32, duration: u64, width: u32, height: u32) -> Self {
        TrackHeaderBox {
            flags,
            creation_time: 0,
            modification_time: 0,
            track_id,
            duration,
            volume: 0,
            width,
            height,
        }
    }
}

impl Mp4Box for TrackHeaderBox {
    const NAME: FourCC = FourCC(*b"tkhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, self.flags.bits()))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 + // creation_time
        size_of::<u64>() as u64 + // modification_time
        size_of::<u32>() as u64 + // track_ID
        size_of::<u32>() as u64 + // reserved
        size_of::<u64>() as u64 + // duration
        size_of::<u32>() as u64 * 2 + // reserved
        size_of::<u16>() as u64 + // layer
        size_of::<u16>() as u64 + // alternate_group
        size_of::<u16>() as u64 + // volume
        size_of::<u16>() as u64 + // reserved
        size_of::<i32>() as u64 * 9 + // matrix
        size_of::<u32>() as u64 + // width
        size_of::<u32>() as u64 // height
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u64(self.creation_time);
        stream.write_u64(self.modification_time);
        stream.write_u32(self.track_id);
        stream.write_u32(0);
        stream.write_u64(self.duration);

        stream.write_u64(0);
        stream.write_u16(0); // layer
        stream.write_u16(0); // alternate_group
        stream.write_i16(self.volume);
        stream.write_u16(0);

        write_identity_matrix(stream);

        stream.write_u32(self.width);
        stream.write_u32(self.height);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;
        let flags = TrackHeaderFlags::from_bits_truncate(header.flags);

        let (creation_time, modification_time, track_id, duration) = if header.version == 1 {
            let creation_time = stream.read_u64()?;
            let modification_time = stream.read_u64()?;
            let track_id = stream.read_u32()?;
            stream.skip_bytes(4)?;
            let duration = stream.read_u64()?;
            (creation_time, modification_time, track_id, duration)
        } else {
            let creation_time = stream.read_u32()? as u64;
            let modification_time = stream.read_u32()? as u64;
            let track_id = stream.read_u32()?;
            stream.skip_bytes(4)?;
            let duration = stream.read_u32()? as u64;
            (creation_time, modification_time, track_id, duration)
        };

        stream.skip_bytes(8 + 2 + 2)?; // reserved, layer, alternate_group
        let volume = stream.read_i16()?;
        stream.skip_bytes(2)?;
        stream.skip_bytes(4 * 9)?; // matrix
        let width = stream.read_u32()?;
        let height = stream.read_u32()?;

        Ok(TrackHeaderBox {
            flags,
            creation_time,
            modification_time,
            track_id,
            duration,
            volume,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let tkhd = TrackHeaderBox::new(
            TrackHeaderFlags::ENABLED | TrackHeaderFlags::IN_MOVIE,
            2,
            90_000,
            1280 << 16,
            720 << 16,
        );

        let mut stream = BitStream::from(tkhd.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, TrackHeaderBox::NAME);
        assert_eq!(
            TrackHeaderBox::parse_box_contents(&mut contents).unwrap(),
            tkhd
        );
    }
}
