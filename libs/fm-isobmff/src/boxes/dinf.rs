use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError};

use super::DataReferenceBox;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInformationBox {
    pub dref: DataReferenceBox,
}

impl DataInformationBox {
    pub fn new(dref: DataReferenceBox) -> Self {
        DataInformationBox { dref }
    }
}

impl Mp4Box for DataInformationBox {
    const NAME: FourCC = FourCC(*b"dinf");

    fn content_size(&self) -> u64 {
        self.dref.total_size()
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.dref.write(stream)?;

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut dref = None;

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"dref" => dref = Some(DataReferenceBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'dinf'", name);
                }
            }
        }

        let dref = dref.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: DataReferenceBox::NAME,
        })?;

        Ok(DataInformationBox { dref })
    }
}
