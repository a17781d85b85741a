use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{MovieExtendsBox, MovieHeaderBox, TrackBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieBox {
    pub mvhd: MovieHeaderBox,
    pub mvex: Option<MovieExtendsBox>,
    pub tracks: Vec<TrackBox>,
    pub unknown: Vec<UnknownBox>,
}

impl MovieBox {
    pub fn new(mvhd: MovieHeaderBox, mvex: Option<MovieExtendsBox>, tracks: Vec<TrackBox>) -> Self {
        MovieBox {
            mvhd,
            mvex,
            tracks,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for MovieBox {
    const NAME: FourCC = FourCC(*b"moov");

    fn content_size(&self) -> u64 {
        let mut size = self.mvhd.total_size();

        if let Some(mvex) = &self.mvex {
            size += mvex.total_size();
        }

        for track in &self.tracks {
            size += track.total_size();
        }

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.mvhd.write(stream)?;

        if let Some(mvex) = &self.mvex {
            mvex.write(stream)?;
        }

        for track in &self.tracks {
            track.write(stream)?;
        }

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut mvhd = None;
        let mut mvex = None;
        let mut tracks = Vec::new();
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"mvhd" => mvhd = Some(MovieHeaderBox::parse_box_contents(&mut contents)?),
                b"mvex" => mvex = Some(MovieExtendsBox::parse_box_contents(&mut contents)?),
                b"trak" => tracks.push(TrackBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'moov'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let mvhd = mvhd.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: MovieHeaderBox::NAME,
        })?;

        Ok(MovieBox {
            mvhd,
            mvex,
            tracks,
            unknown,
        })
    }
}
