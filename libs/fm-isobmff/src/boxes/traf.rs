use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{TrackFragmentBaseMediaDecodeTimeBox, TrackFragmentHeaderBox, TrackFragmentRunBox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragmentBox {
    pub tfhd: TrackFragmentHeaderBox,
    pub base_media_decode_time: Option<TrackFragmentBaseMediaDecodeTimeBox>,
    pub track_runs: Vec<TrackFragmentRunBox>,
    pub unknown: Vec<UnknownBox>,
}

impl TrackFragmentBox {
    pub fn new(
        tfhd: TrackFragmentHeaderBox,
        track_runs: Vec<TrackFragmentRunBox>,
        base_media_decode_time: Option<TrackFragmentBaseMediaDecodeTimeBox>,
    ) -> Self {
        TrackFragmentBox {
            tfhd,
            base_media_decode_time,
            track_runs,
            unknown: Vec::new(),
        }
    }
}

impl Mp4Box for TrackFragmentBox {
    const NAME: FourCC = FourCC(*b"traf");

    fn content_size(&self) -> u64 {
        let mut size = self.tfhd.total_size();

        if let Some(base_media_decode_time) = &self.base_media_decode_time {
            size += base_media_decode_time.total_size();
        }

        for trun in &self.track_runs {
            size += trun.total_size();
        }

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.tfhd.write(stream)?;

        if let Some(base_media_decode_time) = &self.base_media_decode_time {
            base_media_decode_time.write(stream)?;
        }

        for run in &self.track_runs {
            run.write(stream)?;
        }

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut tfhd = None;
        let mut base_media_decode_time = None;
        let mut track_runs = Vec::new();
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"tfhd" => tfhd = Some(TrackFragmentHeaderBox::parse_box_contents(&mut contents)?),
                b"tfdt" => {
                    base_media_decode_time = Some(
                        TrackFragmentBaseMediaDecodeTimeBox::parse_box_contents(&mut contents)?,
                    )
                }
                b"trun" => track_runs.push(TrackFragmentRunBox::parse_box_contents(&mut contents)?),
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'traf'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let tfhd = tfhd.ok_or(Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child: TrackFragmentHeaderBox::NAME,
        })?;

        Ok(TrackFragmentBox {
            tfhd,
            base_media_decode_time,
            track_runs,
            unknown,
        })
    }
}
