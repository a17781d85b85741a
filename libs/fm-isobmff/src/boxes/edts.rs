use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditListEntry {
    pub segment_duration: u32,
    /// -1 marks an empty edit; a non-negative value is the media time the
    /// presentation starts at.
    pub media_time: i32,
    pub media_rate_integer: i16,
    pub media_rate_fraction: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditListBox {
    pub entries: Vec<EditListEntry>,
}

impl EditListBox {
    pub fn new(entries: Vec<EditListEntry>) -> Self {
        EditListBox { entries }
    }
}

impl Mp4Box for EditListBox {
    const NAME: FourCC = FourCC(*b"elst");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + 12 * self.entries.len() as u64
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            stream.write_u32(entry.segment_duration);
            stream.write_i32(entry.media_time);
            stream.write_i16(entry.media_rate_integer);
            stream.write_i16(entry.media_rate_fraction);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;
        if header.version > 0 {
            return Err(Mp4BoxError::UnsupportedVersion {
                name: Self::NAME,
                version: header.version,
            });
        }

        let entry_count = stream.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(EditListEntry {
                segment_duration: stream.read_u32()?,
                media_time: stream.read_i32()?,
                media_rate_integer: stream.read_i16()?,
                media_rate_fraction: stream.read_i16()?,
            });
        }

        Ok(EditListBox { entries })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBox {
    pub elst: EditListBox,
}

impl EditBox {
    pub fn new(elst: EditListBox) -> Self {
        EditBox { elst }
    }
}

impl Mp4Box for EditBox {
    const NAME: FourCC = FourCC(*b"edts");

    fn content_size(&self) -> u64 {
        self.elst.total_size()
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.elst.write(stream)?;

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut elst = None;

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"elst" => elst = Some(EditListBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'edts'", name);
                }
            }
        }

        let elst = elst.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: EditListBox::NAME,
        })?;

        Ok(EditBox { elst })
    }
}
