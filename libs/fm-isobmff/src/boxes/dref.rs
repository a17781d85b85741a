use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError, UnknownBox};

use super::DataEntryUrlBox;

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEntry {
    Url(DataEntryUrlBox),
    Unknown(UnknownBox),
}

impl DataEntry {
    fn size(&self) -> u64 {
        match self {
            DataEntry::Url(url) => url.total_size(),
            DataEntry::Unknown(unknown) => unknown.total_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataReferenceBox {
    pub entries: Vec<DataEntry>,
}

impl DataReferenceBox {
    pub fn new(entries: Vec<DataEntryUrlBox>) -> Self {
        DataReferenceBox {
            entries: entries.into_iter().map(DataEntry::Url).collect(),
        }
    }
}

impl Mp4Box for DataReferenceBox {
    const NAME: FourCC = FourCC(*b"dref");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u32>() as u64; // entry_count

        for entry in &self.entries {
            size += entry.size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            match entry {
                DataEntry::Url(url) => url.write(stream)?,
                DataEntry::Unknown(unknown) => unknown.write(stream)?,
            }
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let entry_count = stream.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"url " => {
                    entries.push(DataEntry::Url(DataEntryUrlBox::parse_box_contents(
                        &mut contents,
                    )?));
                }
                _ => {
                    tracing::warn!("skipping unknown data entry '{}' in 'dref'", name);
                    entries.push(DataEntry::Unknown(UnknownBox::parse(name, &mut contents)));
                }
            }
        }

        Ok(DataReferenceBox { entries })
    }
}
