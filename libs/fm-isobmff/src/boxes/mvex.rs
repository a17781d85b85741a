use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError};

use super::{MovieExtendsHeaderBox, TrackExtendsBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieExtendsBox {
    pub mehd: Option<MovieExtendsHeaderBox>,
    pub track_extends: Vec<TrackExtendsBox>,
}

impl MovieExtendsBox {
    pub fn new(mehd: Option<MovieExtendsHeaderBox>, track_extends: Vec<TrackExtendsBox>) -> Self {
        MovieExtendsBox {
            mehd,
            track_extends,
        }
    }
}

impl Mp4Box for MovieExtendsBox {
    const NAME: FourCC = FourCC(*b"mvex");

    fn content_size(&self) -> u64 {
        let mut size = 0;

        if let Some(mehd) = &self.mehd {
            size += mehd.total_size();
        }

        for trex in &self.track_extends {
            size += trex.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        if let Some(mehd) = &self.mehd {
            mehd.write(stream)?;
        }

        for trex in &self.track_extends {
            trex.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut mehd = None;
        let mut track_extends = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"mehd" => mehd = Some(MovieExtendsHeaderBox::parse_box_contents(&mut contents)?),
                b"trex" => track_extends.push(TrackExtendsBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'mvex'", name);
                }
            }
        }

        if track_extends.is_empty() {
            return Err(Mp4BoxError::MissingChild {
                parent: Self::NAME,
                child: TrackExtendsBox::NAME,
            });
        }

        Ok(MovieExtendsBox {
            mehd,
            track_extends,
        })
    }
}
