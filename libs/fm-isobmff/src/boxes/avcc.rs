use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcConfigurationBox {
    pub config: AvcDecoderConfigurationRecord,
}

impl AvcConfigurationBox {
    pub fn new(config: AvcDecoderConfigurationRecord) -> Self {
        AvcConfigurationBox { config }
    }
}

impl Mp4Box for AvcConfigurationBox {
    const NAME: FourCC = FourCC(*b"avcC");

    fn content_size(&self) -> u64 {
        self.config.size()
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.config.write(stream);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        Ok(AvcConfigurationBox {
            config: AvcDecoderConfigurationRecord::parse(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcDecoderConfigurationRecord {
    pub profile_indication: u8,
    pub profile_compatibility: u8,
    pub level_indication: u8,
    pub sequence_parameter_sets: Vec<Vec<u8>>,
    pub picture_parameter_sets: Vec<Vec<u8>>,
}

impl AvcDecoderConfigurationRecord {
    fn size(&self) -> u64 {
        let mut size = size_of::<u8>() as u64 // configurationVersion
            + size_of::<u8>() as u64 // AVCProfileIndication
            + size_of::<u8>() as u64 // profile_compatibility
            + size_of::<u8>() as u64 // AVCLevelIndication
            + size_of::<u8>() as u64 // lengthSizeMinusOne
            + size_of::<u8>() as u64; // numOfSequenceParameterSets

        for sps in &self.sequence_parameter_sets {
            size += size_of::<u16>() as u64 + sps.len() as u64;
        }

        size += size_of::<u8>() as u64; // numOfPictureParameterSets

        for pps in &self.picture_parameter_sets {
            size += size_of::<u16>() as u64 + pps.len() as u64;
        }

        size
    }

    fn write(&self, stream: &mut BitStream) {
        stream.write_u8(1);
        stream.write_u8(self.profile_indication);
        stream.write_u8(self.profile_compatibility);
        stream.write_u8(self.level_indication);
        stream.write_u8(0b1111_1100 | 3);

        stream.write_u8(0b1110_0000 | self.sequence_parameter_sets.len() as u8);
        for sps in &self.sequence_parameter_sets {
            stream.write_u16(sps.len() as u16);
            stream.write_bytes(sps);
        }

        stream.write_u8(self.picture_parameter_sets.len() as u8);
        for pps in &self.picture_parameter_sets {
            stream.write_u16(pps.len() as u16);
            stream.write_bytes(pps);
        }
    }

    fn parse(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _configuration_version = stream.read_u8()?;
        let profile_indication = stream.read_u8()?;
        let profile_compatibility = stream.read_u8()?;
        let level_indication = stream.read_u8()?;
        let _length_size_minus_one = stream.read_u8()?;

        let sps_count = stream.read_u8()? & 0b0001_1111;
        let mut sequence_parameter_sets = Vec::new();
        for _ in 0..sps_count {
            let len = stream.read_u16()?;
            sequence_parameter_sets.push(stream.read_bytes(len as u64)?);
        }

        let pps_count = stream.read_u8()?;
        let mut picture_parameter_sets = Vec::new();
        for _ in 0..pps_count {
            let len = stream.read_u16()?;
            picture_parameter_sets.push(stream.read_bytes(len as u64)?);
        }

        Ok(AvcDecoderConfigurationRecord {
            profile_indication,
            profile_compatibility,
            level_indication,
            sequence_parameter_sets,
            picture_parameter_sets,
        })
    }
}
