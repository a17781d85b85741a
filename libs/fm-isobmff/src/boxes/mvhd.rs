use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieHeaderBox {
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    pub next_track_id: u32,
}

impl MovieHeaderBox {
    pub fn new(timescale: u32, duration: u64) -> Self {
        MovieHeaderBox {
            creation_time: 0,
            modification_time: 0,
            timescale,
            duration,
            next_track_id: 1,
        }
    }
}

impl Mp4Box for MovieHeaderBox {
    const NAME: FourCC = FourCC(*b"mvhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 + // creation_time
        size_of::<u64>() as u64 + // modification_time
        size_of::<u32>() as u64 + // timescale
        size_of::<u64>() as u64 + // duration
        size_of::<u32>() as u64 + // rate
        size_of::<u16>() as u64 + // volume
        size_of::<u16>() as u64 + // reserved
        size_of::<u32>() as u64 * 2 + // reserved
        size_of::<i32>() as u64 * 9 + // matrix
        size_of::<u32>() as u64 * 6 + // pre_defined
        size_of::<u32>() as u64 // next_track_ID
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u64(self.creation_time);
        stream.write_u64(self.modification_time);
        stream.write_u32(self.timescale);
        stream.write_u64(self.duration);

        stream.write_i32(0x0001_0000); // rate
        stream.write_i16(0x0100); // volume
        stream.write_u16(0);
        stream.write_u64(0);

        write_identity_matrix(stream);

        for _ in 0..6 {
            stream.write_u32(0); // pre_defined
        }

        stream.write_u32(self.next_track_id);

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

        stream.skip_bytes(4 + 2 + 2 + 8)?; // rate, volume, reserved
        stream.skip_bytes(4 * 9)?; // matrix
        stream.skip_bytes(4 * 6)?; // pre_defined
        let next_track_id = stream.read_u32()?;

        Ok(MovieHeaderBox {
            creation_time,
            modification_time,
            timescale,
            duration,
            next_track_id,
        })
    }
}

pub(crate) fn write_identity_matrix(stream: &mut BitStream) {
    stream.write_i32(0x0001_0000);
    stream.write_i32(0);
    stream.write_i32(0);
    stream.write_i32(0);
    stream.write_i32(0x0001_0000);
    stream.write_i32(0);
    stream.write_i32(0);
    stream.write_i32(0);
    stream.write_i32(0x4000_0000);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mvhd = MovieHeaderBox {
            creation_time: 3,
            modification_time: 4,
            timescale: 1000,
            duration: 60_000,
            next_track_id: 3,
        };

        let mut stream = BitStream::from(mvhd.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, MovieHeaderBox::NAME);
        assert_eq!(
            MovieHeaderBox::parse_box_contents(&mut contents).unwrap(),
            mvhd
        );
    }
}
