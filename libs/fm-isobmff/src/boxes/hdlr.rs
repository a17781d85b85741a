use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerBox {
    pub handler_type: FourCC,
    pub name: String,
}

impl HandlerBox {
    pub fn new(handler_type: FourCC, name: String) -> Self {
        HandlerBox { handler_type, name }
    }
}

impl Mp4Box for HandlerBox {
    const NAME: FourCC = FourCC(*b"hdlr");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + // pre_defined
        size_of::<u32>() as u64 + // handler_type
        size_of::<u32>() as u64 * 3 + // reserved
        self.name.as_bytes().len() as u64 + // name
        1
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(0);
        stream.write_fourcc(self.handler_type);
        stream.write_u32(0);
        stream.write_u32(0);
        stream.write_u32(0);
        stream.write_zero_terminated_string(&self.name);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        stream.skip_bytes(4)?;
        let handler_type = stream.read_fourcc()?;
        stream.skip_bytes(12)?;
        let name = stream.read_zero_terminated_string();

        Ok(HandlerBox { handler_type, name })
    }
}
