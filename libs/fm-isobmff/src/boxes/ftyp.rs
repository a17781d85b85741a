use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl FileTypeBox {
    pub fn new(major_brand: FourCC, minor_version: u32, compatible_brands: Vec<FourCC>) -> Self {
        FileTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        }
    }
}

impl Mp4Box for FileTypeBox {
    const NAME: FourCC = FourCC(*b"ftyp");

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + // major_brand
        size_of::<u32>() as u64 + // minor_version
        size_of::<u32>() as u64 * self.compatible_brands.len() as u64 // compatible_brands
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

        Ok(FileTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ftyp = FileTypeBox::new(
            FourCC(*b"isom"),
            512,
            vec![FourCC(*b"isom"), FourCC(*b"iso2"), FourCC(*b"mp41")],
        );

        let mut stream = BitStream::from(ftyp.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, FileTypeBox::NAME);
        assert_eq!(FileTypeBox::parse_box_contents(&mut contents).unwrap(), ftyp);
    }
}
