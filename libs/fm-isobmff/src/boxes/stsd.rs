use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError, UnknownBox};

use super::{AvcSampleEntryBox, Mpeg4AudioSampleEntryBox};

use std::mem::size_of;

/// The finite set of sample entries this crate interprets. Everything else
/// is carried as raw bytes so foreign codec configurations survive a
/// parse/write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEntry {
    Avc(AvcSampleEntryBox),
    Mp4a(Mpeg4AudioSampleEntryBox),
    Raw(UnknownBox),
}

impl SampleEntry {
    pub fn size(&self) -> u64 {
        match self {
            SampleEntry::Avc(avc) => avc.total_size(),
            SampleEntry::Mp4a(mp4a) => mp4a.total_size(),
            SampleEntry::Raw(raw) => raw.total_size(),
        }
    }

    pub fn name(&self) -> FourCC {
        match self {
            SampleEntry::Avc(_) => AvcSampleEntryBox::NAME,
            SampleEntry::Mp4a(_) => Mpeg4AudioSampleEntryBox::NAME,
            SampleEntry::Raw(raw) => raw.name,
        }
    }

    fn write(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        match self {
            SampleEntry::Avc(avc) => avc.write(stream),
            SampleEntry::Mp4a(mp4a) => mp4a.write(stream),
            SampleEntry::Raw(raw) => raw.write(stream),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDescriptionBox {
    pub entries: Vec<SampleEntry>,
}

impl SampleDescriptionBox {
    pub fn new(entries: Vec<SampleEntry>) -> Self {
        SampleDescriptionBox { entries }
    }
}

impl Mp4Box for SampleDescriptionBox {
    const NAME: FourCC = FourCC(*b"stsd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u32>() as u64;

        for entry in &self.entries {
            size += entry.size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.entries.len() as _);

        for entry in &self.entries {
            entry.write(stream)?;
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
                b"avc1" => entries.push(SampleEntry::Avc(AvcSampleEntryBox::parse_box_contents(
                    &mut contents,
                )?)),
                b"mp4a" => entries.push(SampleEntry::Mp4a(
                    Mpeg4AudioSampleEntryBox::parse_box_contents(&mut contents)?,
                )),
                _ => entries.push(SampleEntry::Raw(UnknownBox::parse(name, &mut contents))),
            }
        }

        Ok(SampleDescriptionBox { entries })
    }
}
