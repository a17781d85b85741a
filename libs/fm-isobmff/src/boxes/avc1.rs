use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::AvcConfigurationBox;

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcSampleEntryBox {
    pub width: u16,
    pub height: u16,
    pub avcc: AvcConfigurationBox,
    /// Extension boxes we have no layout for (pasp, colr, ...), kept raw.
    pub unknown: Vec<UnknownBox>,
}

impl AvcSampleEntryBox {
    pub fn new(width: u16, height: u16, avcc: AvcConfigurationBox) -> Self {
        AvcSampleEntryBox {
            width,
            height,
            avcc,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for AvcSampleEntryBox {
    const NAME: FourCC = FourCC(*b"avc1");

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u8>() as u64 * 6 // reserved
            + size_of::<u16>() as u64 // data_reference_index
            + size_of::<u8>() as u64 * 16 // pre_defined, reserved
            + size_of::<u16>() as u64 // width
            + size_of::<u16>() as u64 // height
            + size_of::<u32>() as u64 // horizresolution
            + size_of::<u32>() as u64 // vertresolution
            + size_of::<u8>() as u64 * 4 // reserved
            + size_of::<u16>() as u64 // frame_count
            + size_of::<u8>() as u64 * 32 // compressorname
            + size_of::<u16>() as u64 // depth
            + size_of::<i16>() as u64 // pre_defined
            + self.avcc.total_size();

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_bytes(&[0u8; 6]);
        stream.write_u16(1); // data_reference_index

        stream.write_bytes(&[0u8; 16]);

        stream.write_u16(self.width);
        stream.write_u16(self.height);
        stream.write_u32(0x0048_0000);
        stream.write_u32(0x0048_0000);
        stream.write_bytes(&[0u8; 4]);
        stream.write_u16(1); // frame_count
        stream.write_bytes(&[0u8; 32]);
        stream.write_u16(0x0018);
        stream.write_i16(-1);

        self.avcc.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        stream.skip_bytes(6 + 2)?; // reserved, data_reference_index
        stream.skip_bytes(16)?;

        let width = stream.read_u16()?;
        let height = stream.read_u16()?;
        stream.skip_bytes(4 + 4 + 4)?; // resolutions, reserved
        stream.skip_bytes(2)?; // frame_count
        stream.skip_bytes(32)?; // compressorname
        stream.skip_bytes(2 + 2)?; // depth, pre_defined

        let mut avcc = None;
        let mut unknown = Vec::new();
        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"avcC" => avcc = Some(AvcConfigurationBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'avc1'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let avcc = avcc.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: AvcConfigurationBox::NAME,
        })?;

        Ok(AvcSampleEntryBox {
            width,
            height,
            avcc,
            unknown,
        })
    }
}
