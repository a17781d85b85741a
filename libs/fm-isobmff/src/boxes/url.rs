use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

const SELF_CONTAINED: u32 = 0x000001;

/// A `location` of `None` means the media data lives in the same file; no
/// string is written at all in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntryUrlBox {
    pub location: Option<String>,
}

impl DataEntryUrlBox {
    pub fn self_contained() -> Self {
        DataEntryUrlBox { location: None }
    }
}

impl Mp4Box for DataEntryUrlBox {
    const NAME: FourCC = FourCC(*b"url ");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        let flags = if self.location.is_none() {
            SELF_CONTAINED
        } else {
            0
        };

        Some(FullBoxHeader::new(0, flags))
    }

    fn content_size(&self) -> u64 {
        match &self.location {
            Some(location) => location.as_bytes().len() as u64 + 1,
            None => 0,
        }
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        if let Some(location) = &self.location {
            stream.write_zero_terminated_string(location);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;

        let location = if header.flags & SELF_CONTAINED != 0 {
            None
        } else {
            Some(stream.read_zero_terminated_string())
        };

        Ok(DataEntryUrlBox { location })
    }
}
