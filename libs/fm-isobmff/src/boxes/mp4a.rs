use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::EsdBox;

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mpeg4AudioSampleEntryBox {
    pub channel_count: u16,
    pub sample_size: u16,
    pub sample_rate: u32,
    pub esds: EsdBox,
    pub unknown: Vec<UnknownBox>,
}

impl Mpeg4AudioSampleEntryBox {
    pub fn new(channel_count: u16, sample_size: u16, sample_rate: u32, esds: EsdBox) -> Self {
        Mpeg4AudioSampleEntryBox {
            channel_count,
            sample_size,
            sample_rate,
            esds,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for Mpeg4AudioSampleEntryBox {
    const NAME: FourCC = FourCC(*b"mp4a");

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u8>() as u64 * 6 // reserved
            + size_of::<u16>() as u64 // data_reference_index
            + size_of::<u32>() as u64 * 2 // reserved
            + size_of::<u16>() as u64 // channelcount
            + size_of::<u16>() as u64 // samplesize
            + size_of::<u16>() as u64 // pre_defined
            + size_of::<u16>() as u64 // reserved
            + size_of::<u32>() as u64 // samplerate
            + self.esds.total_size();

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_bytes(&[0u8; 6]);
        stream.write_u16(1); // data_reference_index

        stream.write_u64(0);
        stream.write_u16(self.channel_count);
        stream.write_u16(self.sample_size);
        stream.write_u16(0);
        stream.write_u16(0);
        stream.write_u32(self.sample_rate << 16);

        self.esds.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        stream.skip_bytes(6 + 2)?; // reserved, data_reference_index
        stream.skip_bytes(8)?;

        let channel_count = stream.read_u16()?;
        let sample_size = stream.read_u16()?;
        stream.skip_bytes(4)?; // pre_defined, reserved
        let sample_rate = stream.read_u32()? >> 16;

        let mut esds = None;
        let mut unknown = Vec::new();
        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"esds" => esds = Some(EsdBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'mp4a'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let esds = esds.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: EsdBox::NAME,
        })?;

        Ok(Mpeg4AudioSampleEntryBox {
            channel_count,
            sample_size,
            sample_rate,
            esds,
            unknown,
        })
    }
}
