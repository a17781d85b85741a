use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError};

use std::mem::size_of;

/// Same layout as 'ftyp', but marks a media segment rather than a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTypeBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl SegmentTypeBox {
    pub fn new(major_brand: FourCC, minor_version: u32, compatible_brands: Vec<FourCC>) -> Self {
        SegmentTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        }
    }
}

impl Mp4Box for SegmentTypeBox {
    const NAME: FourCC = FourCC(*b"styp");

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 +
        size_of::<u32>() as u64 +
        size_of::<u32>() as u64 * self.compatible_brands.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_fourcc(self.major_brand);
        stream.write_u32(self.minor_version);

        for &brand in &self.compatible_brands {
            stream.write_fourcc(brand);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let major_brand = stream.read_fourcc()?;
        let minor_version = stream.read_u32()?;

        let mut compatible_brands = Vec::new();
        while stream.bytes_left() >= 4 {
            compatible_brands.push(stream.read_fourcc()?);
        }

        if stream.bytes_left() != 0 {
            return Err(Mp4BoxError::Truncated);
        }

        Ok(SegmentTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        })
    }
}
