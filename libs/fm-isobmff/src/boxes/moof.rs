use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{MovieFragmentHeaderBox, TrackFragmentBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFragmentBox {
    pub mfhd: MovieFragmentHeaderBox,
    pub track_fragments: Vec<TrackFragmentBox>,
    pub unknown: Vec<UnknownBox>,
}

impl MovieFragmentBox {
    pub fn new(mfhd: MovieFragmentHeaderBox, track_fragments: Vec<TrackFragmentBox>) -> Self {
        MovieFragmentBox {
            mfhd,
            track_fragments,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for MovieFragmentBox {
    const NAME: FourCC = FourCC(*b"moof");

    fn content_size(&self) -> u64 {
        let mut size = self.mfhd.total_size();

        for traf in &self.track_fragments {
            size += traf.total_size();
        }

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.mfhd.write(stream)?;

        for traf in &self.track_fragments {
            traf.write(stream)?;
        }

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut mfhd = None;
        let mut track_fragments = Vec::new();
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"mfhd" => mfhd = Some(MovieFragmentHeaderBox::parse_box_contents(&mut contents)?),
                b"traf" => track_fragments.push(TrackFragmentBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'moof'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let mfhd = mfhd.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: MovieFragmentHeaderBox::NAME,
        })?;

        Ok(MovieFragmentBox {
            mfhd,
            track_fragments,
            unknown,
        })
    }
}
