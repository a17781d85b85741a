use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{
    DataInformationBox, NullMediaHeaderBox, SampleTableBox, SoundMediaHeaderBox,
    VideoMediaHeaderBox,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaHeader {
    Video(VideoMediaHeaderBox),
    Sound(SoundMediaHeaderBox),
    Null(NullMediaHeaderBox),
}

impl MediaHeader {
    fn size(&self) -> u64 {
        match self {
            MediaHeader::Video(vmhd) => vmhd.total_size(),
            MediaHeader::Sound(smhd) => smhd.total_size(),
            MediaHeader::Null(nmhd) => nmhd.total_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInformationBox {
    pub media_header: MediaHeader,
    pub dinf: DataInformationBox,
    pub stbl: SampleTableBox,
    pub unknown: Vec<UnknownBox>,
}

impl MediaInformationBox {
    pub fn new(media_header: MediaHeader, dinf: DataInformationBox, stbl: SampleTableBox) -> Self {
        MediaInformationBox {
            media_header,
            dinf,
            stbl,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for MediaInformationBox {
    const NAME: FourCC = FourCC(*b"minf");

    fn content_size(&self) -> u64 {
        let mut size = self.media_header.size() + self.dinf.total_size() + self.stbl.total_size();

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        match &self.media_header {
            MediaHeader::Video(vmhd) => vmhd.write(stream)?,
            MediaHeader::Sound(smhd) => smhd.write(stream)?,
            MediaHeader::Null(nmhd) => nmhd.write(stream)?,
        }

        self.dinf.write(stream)?;
        self.stbl.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut media_header = None;
        let mut dinf = None;
        let mut stbl = None;
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"vmhd" => {
                    media_header = Some(MediaHeader::Video(
                        VideoMediaHeaderBox::parse_box_contents(&mut contents)?,
                    ))
                }
                b"smhd" => {
                    media_header = Some(MediaHeader::Sound(
                        SoundMediaHeaderBox::parse_box_contents(&mut contents)?,
                    ))
                }
                b"nmhd" => {
                    media_header = Some(MediaHeader::Null(NullMediaHeaderBox::parse_box_contents(
                        &mut contents,
                    )?))
                }
                b"dinf" => dinf = Some(DataInformationBox::parse_box_contents(&mut contents)?),
                b"stbl" => stbl = Some(SampleTableBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'minf'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        // a track without any media header cannot be interpreted; the null
        // header is the weakest acceptable one
        let media_header = media_header.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: NullMediaHeaderBox::NAME,
        })?;
        let dinf = dinf.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: DataInformationBox::NAME,
        })?;
        let stbl = stbl.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: SampleTableBox::NAME,
        })?;

        Ok(MediaInformationBox {
            media_header,
            dinf,
            stbl,
            unknown,
        })
    }
}
