use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndexReference {
    pub reference_type: bool,
    pub referenced_size: u32,
    pub subsegment_duration: u32,
    pub starts_with_sap: bool,
    pub sap_type: u8,
    pub sap_delta_time: u32,
}

/// Version 0 uses 32-bit earliest presentation time and first offset,
/// version 1 uses 64-bit. Only those two versions exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndexBox {
    pub version: u8,
    pub reference_id: u32,
    pub timescale: u32,
    pub earliest_presentation_time: u64,
    pub first_offset: u64,
    pub references: Vec<SegmentIndexReference>,
}

impl SegmentIndexBox {
    pub fn new(version: u8, reference_id: u32, timescale: u32) -> Self {
        SegmentIndexBox {
            version,
            reference_id,
            timescale,
            earliest_presentation_time: 0,
            first_offset: 0,
            references: Vec::new(),
        }
    }

    fn check_version(&self) -> Result<(), Mp4BoxError> {
        if self.version > 1 {
            return Err(Mp4BoxError::UnsupportedVersion {
                name: Self::NAME,
                version: self.version,
            });
        }

        Ok(())
    }
}

impl Mp4Box for SegmentIndexBox {
    const NAME: FourCC = FourCC(*b"sidx");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(self.version, 0))
    }

    fn content_size(&self) -> u64 {
        let time_fields = if self.version == 0 {
            size_of::<u32>() as u64 * 2
        } else {
            size_of::<u64>() as u64 * 2
        };

        size_of::<u32>() as u64 + // reference_ID
        size_of::<u32>() as u64 + // timescale
        time_fields +
        size_of::<u16>() as u64 + // reserved
        size_of::<u16>() as u64 + // reference_count
        12 * self.references.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.check_version()?;

        stream.write_u32(self.reference_id);
        stream.write_u32(self.timescale);

        if self.version == 0 {
            stream.write_u32(self.earliest_presentation_time as u32);
            stream.write_u32(self.first_offset as u32);
        } else {
            stream.write_u64(self.earliest_presentation_time);
            stream.write_u64(self.first_offset);
        }

        stream.write_u16(0);
        stream.write_u16(self.references.len() as u16);

        for reference in &self.references {
            stream.write_bit(reference.reference_type);
            stream.write_bits(reference.referenced_size as u64, 31);
            stream.write_u32(reference.subsegment_duration);
            stream.write_bit(reference.starts_with_sap);
            stream.write_bits(reference.sap_type as u64, 3);
            stream.write_bits(reference.sap_delta_time as u64, 28);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;
        if header.version > 1 {
            return Err(Mp4BoxError::UnsupportedVersion {
                name: Self::NAME,
                version: header.version,
            });
        }

        let reference_id = stream.read_u32()?;
        let timescale = stream.read_u32()?;

        let (earliest_presentation_time, first_offset) = if header.version == 0 {
            (stream.read_u32()? as u64, stream.read_u32()? as u64)
        } else {
            (stream.read_u64()?, stream.read_u64()?)
        };

        stream.skip_bytes(2)?; // reserved
        let reference_count = stream.read_u16()?;

        let mut references = Vec::new();
        for _ in 0..reference_count {
            references.push(SegmentIndexReference {
                reference_type: stream.read_bit()?,
                referenced_size: stream.read_bits(31)? as u32,
                subsegment_duration: stream.read_u32()?,
                starts_with_sap: stream.read_bit()?,
                sap_type: stream.read_bits(3)? as u8,
                sap_delta_time: stream.read_bits(28)? as u32,
            });
        }

        Ok(SegmentIndexBox {
            version: header.version,
            reference_id,
            timescale,
            earliest_presentation_time,
            first_offset,
            references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(referenced_size: u32, subsegment_duration: u32) -> SegmentIndexReference {
        SegmentIndexReference {
            reference_type: false,
            referenced_size,
            subsegment_duration,
            starts_with_sap: true,
            sap_type: 1,
            sap_delta_time: 0,
        }
    }

    #[test]
    fn round_trip_version_0() {
        let mut sidx = SegmentIndexBox::new(0, 1, 90_000);
        sidx.earliest_presentation_time = 180_000;
        sidx.references.push(reference(52_000, 90_000));
        sidx.references.push(reference(48_123, 90_000));

        let bytes = sidx.to_bytes().unwrap();
        assert_eq!(bytes.len() as u64, sidx.total_size());

        let mut stream = BitStream::from(bytes);
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, SegmentIndexBox::NAME);
        assert_eq!(
            SegmentIndexBox::parse_box_contents(&mut contents).unwrap(),
            sidx
        );
    }

    #[test]
    fn round_trip_version_1() {
        let mut sidx = SegmentIndexBox::new(1, 1, 48_000);
        sidx.earliest_presentation_time = u32::MAX as u64 + 1;
        sidx.first_offset = 44;
        sidx.references.push(reference(1024, 48_000));

        let mut stream = BitStream::from(sidx.to_bytes().unwrap());
        let (_, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(
            SegmentIndexBox::parse_box_contents(&mut contents).unwrap(),
            sidx
        );
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let sidx = SegmentIndexBox::new(2, 1, 90_000);
        assert!(matches!(
            sidx.to_bytes(),
            Err(Mp4BoxError::UnsupportedVersion { .. })
        ));
    }
}
