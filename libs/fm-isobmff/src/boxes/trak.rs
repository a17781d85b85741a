use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{EditBox, MediaBox, TrackHeaderBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackBox {
    pub tkhd: TrackHeaderBox,
    pub edts: Option<EditBox>,
    pub mdia: MediaBox,
    pub unknown: Vec<UnknownBox>,
}

impl TrackBox {
    pub fn new(tkhd: TrackHeaderBox, mdia: MediaBox) -> Self {
        TrackBox {
            tkhd,
            edts: None,
            mdia,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for TrackBox {
    const NAME: FourCC = FourCC(*b"trak");

    fn content_size(&self) -> u64 {
        let mut size = self.tkhd.total_size() + self.mdia.total_size();

        if let Some(edts) = &self.edts {
            size += edts.total_size();
        }

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.tkhd.write(stream)?;

        if let Some(edts) = &self.edts {
            edts.write(stream)?;
        }

        self.mdia.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut tkhd = None;
        let mut edts = None;
        let mut mdia = None;
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"tkhd" => tkhd = Some(TrackHeaderBox::parse_box_contents(&mut contents)?),
                b"edts" => edts = Some(EditBox::parse_box_contents(&mut contents)?),
                b"mdia" => mdia = Some(MediaBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'trak'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let missing = |child: FourCC| Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child,
        };

        Ok(TrackBox {
            tkhd: tkhd.ok_or_else(|| missing(TrackHeaderBox::NAME))?,
            edts,
            mdia: mdia.ok_or_else(|| missing(MediaBox::NAME))?,
            unknown,
        })
    }
}
