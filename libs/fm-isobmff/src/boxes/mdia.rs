use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{HandlerBox, MediaHeaderBox, MediaInformationBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBox {
    pub mdhd: MediaHeaderBox,
    pub hdlr: HandlerBox,
    pub minf: MediaInformationBox,
    pub unknown: Vec<UnknownBox>,
}

impl MediaBox {
    pub fn new(mdhd: MediaHeaderBox, hdlr: HandlerBox, minf: MediaInformationBox) -> Self {
        MediaBox {
            mdhd,
            hdlr,
            minf,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for MediaBox {
    const NAME: FourCC = FourCC(*b"mdia");

    fn content_size(&self) -> u64 {
        let mut size = self.mdhd.total_size() + self.hdlr.total_size() + self.minf.total_size();

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.mdhd.write(stream)?;
        self.hdlr.write(stream)?;
        self.minf.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut mdhd = None;
        let mut hdlr = None;
        let mut minf = None;
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"mdhd" => mdhd = Some(MediaHeaderBox::parse_box_contents(&mut contents)?),
                b"hdlr" => hdlr = Some(HandlerBox::parse_box_contents(&mut contents)?),
                b"minf" => minf = Some(MediaInformationBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'mdia'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let missing = |child: FourCC| Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child,
        };

        Ok(MediaBox {
            mdhd: mdhd.ok_or_else(|| missing(MediaHeaderBox::NAME))?,
            hdlr: hdlr.ok_or_else(|| missing(HandlerBox::NAME))?,
            minf: minf.ok_or_else(|| missing(MediaInformationBox::NAME))?,
            unknown,
        })
    }
}
