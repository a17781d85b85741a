use bytes::Bytes;
use fm_isobmff::{
    BitStream, DataEntryUrlBox, DataInformationBox, DataReferenceBox, FileTypeBox, FourCC,
    HandlerBox, MediaBox, MediaHeader, MediaHeaderBox, MediaInformationBox, MovieBox,
    MovieExtendsBox, MovieExtendsHeaderBox, MovieFragmentBox, MovieFragmentHeaderBox,
    MovieHeaderBox, Mp4Box, NullMediaHeaderBox, SampleDescriptionBox, SampleTableBox,
    SegmentTypeBox, SoundMediaHeaderBox, TrackBox, TrackExtendsBox, TrackFragmentBaseMediaDecodeTimeBox,
    TrackFragmentBox, TrackFragmentHeaderBox, TrackFragmentRunBox, TrackFragmentSample,
    TrackHeaderBox, TrackHeaderFlags, VideoMediaHeaderBox,
};

use crate::{
    Fraction, MediaType, MovieDescription, Rational, Segment, SegmenterError, TrackDescription,
};

/// Timescale of the movie header; track media keep their own timescales.
pub const MOVIE_TIMESCALE: u32 = 1000;

/// sample_depends_on = 2 (this is a sync sample)
pub const SYNC_SAMPLE_FLAGS: u32 = 0x0200_0000;
/// sample_depends_on = 1, sample_is_non_sync_sample = 1
pub const NON_SYNC_SAMPLE_FLAGS: u32 = 0x0101_0000;

#[derive(Debug, Clone, PartialEq)]
pub struct InitSegment {
    pub ftyp: FileTypeBox,
    pub moov: MovieBox,
}

impl InitSegment {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SegmenterError> {
        let mut stream = BitStream::new();
        self.ftyp.write(&mut stream)?;
        self.moov.write(&mut stream)?;

        Ok(stream.into_storage())
    }
}

pub fn default_file_type() -> FileTypeBox {
    FileTypeBox::new(
        FourCC(*b"isom"),
        512,
        vec![
            FourCC(*b"isom"),
            FourCC(*b"iso2"),
            FourCC(*b"mp41"),
            FourCC(*b"mp42"),
        ],
    )
}

pub fn segment_type() -> SegmentTypeBox {
    SegmentTypeBox::new(
        FourCC(*b"msdh"),
        0,
        vec![FourCC(*b"msdh"), FourCC(*b"msix")],
    )
}

fn movie_ticks(duration: Rational) -> u64 {
    duration.to_ticks(Fraction::new(MOVIE_TIMESCALE, 1)).max(0) as u64
}

fn make_track(track: &TrackDescription) -> Result<TrackBox, SegmenterError> {
    let meta = &track.meta;

    if meta.timescale.numerator == 0 || meta.timescale.denominator == 0 {
        return Err(SegmenterError::InvalidConfiguration(format!(
            "track {} has timescale {}",
            meta.track_id, meta.timescale
        )));
    }

    let entry = track.sample_entry.make_sample_entry(meta.track_id)?;

    let (handler_type, handler_name) = match meta.media_type {
        MediaType::Video => (FourCC(*b"vide"), "VideoHandler"),
        MediaType::Audio => (FourCC(*b"soun"), "SoundHandler"),
        MediaType::Data => (FourCC(*b"meta"), "DataHandler"),
    };

    let media_header = match meta.media_type {
        MediaType::Video => MediaHeader::Video(VideoMediaHeaderBox {}),
        MediaType::Audio => MediaHeader::Sound(SoundMediaHeaderBox {}),
        MediaType::Data => MediaHeader::Null(NullMediaHeaderBox {}),
    };

    let timescale = meta.timescale.integer_timescale();
    let media_timescale = timescale.numerator;
    let media_duration = track.media.duration.to_ticks(timescale).max(0) as u64;

    let mut tkhd = TrackHeaderBox::new(
        TrackHeaderFlags::ENABLED | TrackHeaderFlags::IN_MOVIE,
        meta.track_id,
        movie_ticks(track.media.duration),
        track.sample_entry.width_fp(),
        track.sample_entry.height_fp(),
    );
    tkhd.creation_time = track.media.creation_time;
    tkhd.modification_time = track.media.modification_time;
    if meta.media_type == MediaType::Audio {
        tkhd.volume = 0x0100;
    }

    let mut mdhd = MediaHeaderBox::new(media_timescale, media_duration);
    mdhd.creation_time = track.media.creation_time;
    mdhd.modification_time = track.media.modification_time;

    Ok(TrackBox::new(
        tkhd,
        MediaBox::new(
            mdhd,
            HandlerBox::new(handler_type, String::from(handler_name)),
            MediaInformationBox::new(
                media_header,
                DataInformationBox::new(DataReferenceBox::new(vec![
                    DataEntryUrlBox::self_contained(),
                ])),
                SampleTableBox::empty(SampleDescriptionBox::new(vec![entry])),
            ),
        ),
    ))
}

/// Builds the initialization segment for the given tracks. Fails as a whole
/// if any track's sample entry cannot be constructed; a partially valid
/// container is never produced.
pub fn make_init_segment(
    tracks: &[TrackDescription],
    movie: &MovieDescription,
    fragmented: bool,
) -> Result<InitSegment, SegmenterError> {
    if tracks.is_empty() {
        return Err(SegmenterError::InvalidConfiguration(
            "init segment needs at least one track".into(),
        ));
    }

    let ftyp = match &movie.file_type {
        Some(brands) => FileTypeBox::new(
            brands.major_brand,
            brands.minor_version,
            brands.compatible_brands.clone(),
        ),
        None => default_file_type(),
    };

    let mut track_boxes = Vec::new();
    let mut track_extends = Vec::new();
    let mut max_track_id = 0;

    for track in tracks {
        track_boxes.push(make_track(track)?);
        track_extends.push(TrackExtendsBox::new(track.meta.track_id, 1, 0, 0, 0));
        max_track_id = max_track_id.max(track.meta.track_id);
    }

    let mut mvhd = MovieHeaderBox::new(MOVIE_TIMESCALE, movie_ticks(movie.duration));
    mvhd.creation_time = movie.creation_time;
    mvhd.modification_time = movie.modification_time;
    mvhd.next_track_id = max_track_id + 1;

    let mvex = fragmented.then(|| {
        MovieExtendsBox::new(Some(MovieExtendsHeaderBox::new(0)), track_extends)
    });

    Ok(InitSegment {
        ftyp,
        moov: MovieBox::new(mvhd, mvex, track_boxes),
    })
}

/// A fully assembled media segment: the fragment metadata plus the payload
/// slices of its 'mdat', in track-run order.
#[derive(Debug, Clone)]
pub struct MediaSegment {
    pub moof: MovieFragmentBox,
    pub payload: Vec<Bytes>,
}

impl MediaSegment {
    pub fn payload_size(&self) -> u64 {
        self.payload.iter().map(|data| data.len() as u64).sum()
    }

    pub fn total_size(&self) -> u64 {
        self.moof.total_size() + 8 + self.payload_size()
    }

    /// Writes the 'moof' followed by the 'mdat', payloads in run order.
    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> Result<(), SegmenterError> {
        out.write_all(&self.moof.to_bytes()?)?;

        let mut header = BitStream::new();
        header.write_box_headers(FourCC(*b"mdat"), self.payload_size());
        out.write_all(header.storage())?;

        for data in &self.payload {
            out.write_all(data)?;
        }

        Ok(())
    }
}

/// Builds the 'moof' and payload for one segment. The data offset of each
/// track's run points past the 'moof' and the payloads of the preceding
/// tracks, which is possible in a single pass because a run's size does
/// not depend on the offset value.
pub fn make_media_segment(segment: &Segment) -> Result<MediaSegment, SegmenterError> {
    let mut track_fragments = Vec::new();
    let mut payload = Vec::new();

    for track in segment.tracks.values() {
        let timescale = track.meta.timescale.integer_timescale();
        let mut decode_time = track.t0;

        let mut samples = Vec::new();
        for sample in &track.samples {
            let offset = sample.pres_time - decode_time;

            samples.push(TrackFragmentSample {
                duration: Some(sample.duration.to_ticks(timescale) as u32),
                size: Some(sample.data.len() as u32),
                flags: Some(if sample.is_sync {
                    SYNC_SAMPLE_FLAGS
                } else {
                    NON_SYNC_SAMPLE_FLAGS
                }),
                composition_time_offset: Some(offset.to_ticks(timescale) as i32),
            });

            payload.push(sample.data.clone());
            decode_time += sample.duration;
        }

        let base_decode_time = track.t0.to_ticks(timescale);
        if base_decode_time < 0 {
            return Err(SegmenterError::InvalidConfiguration(format!(
                "track {} starts at negative time {}",
                track.meta.track_id, track.t0
            )));
        }

        track_fragments.push(TrackFragmentBox::new(
            TrackFragmentHeaderBox::with_default_base(track.meta.track_id),
            vec![TrackFragmentRunBox::new(Some(0), None, samples)],
            Some(TrackFragmentBaseMediaDecodeTimeBox::new(
                base_decode_time as u64,
            )),
        ));
    }

    let mut moof = MovieFragmentBox::new(
        MovieFragmentHeaderBox::new(segment.sequence_id),
        track_fragments,
    );

    // patch data offsets to point into the contents of our 'mdat'
    let moof_size = moof.total_size();
    let mut data_offset = moof_size as i64 + 8;
    for (traf, track) in moof.track_fragments.iter_mut().zip(segment.tracks.values()) {
        for run in &mut traf.track_runs {
            run.data_offset = Some(data_offset as i32);
        }

        data_offset += track
            .samples
            .iter()
            .map(|sample| sample.data.len() as i64)
            .sum::<i64>();
    }

    Ok(MediaSegment {
        moof,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SegmentTrack, Sample, TrackMeta};
    use std::collections::BTreeMap;

    fn sample(pres: Rational, duration: Rational, is_sync: bool, len: usize) -> Sample {
        Sample {
            data: Bytes::from(vec![0u8; len]),
            coding_index: 0,
            pres_index: 0,
            coding_time: pres,
            pres_time: pres,
            duration,
            is_sync,
            decoder_config: None,
        }
    }

    fn video_meta(track_id: u32) -> TrackMeta {
        TrackMeta {
            track_id,
            timescale: Fraction::new(90_000, 1),
            media_type: MediaType::Video,
        }
    }

    #[test]
    fn data_offsets_point_past_the_moof() {
        let mut tracks = BTreeMap::new();
        tracks.insert(
            1,
            SegmentTrack {
                t0: Rational::ZERO,
                meta: video_meta(1),
                samples: vec![
                    sample(Rational::ZERO, Rational::new(1, 30), true, 100),
                    sample(Rational::new(1, 30), Rational::new(1, 30), false, 60),
                ],
            },
        );
        tracks.insert(
            2,
            SegmentTrack {
                t0: Rational::ZERO,
                meta: video_meta(2),
                samples: vec![sample(Rational::ZERO, Rational::new(1, 30), true, 40)],
            },
        );

        let segment = Segment {
            sequence_id: 1,
            t0: Rational::ZERO,
            duration: Rational::new(2, 30),
            tracks,
        };

        let media = make_media_segment(&segment).unwrap();
        let moof_size = media.moof.total_size() as i32;

        assert_eq!(
            media.moof.track_fragments[0].track_runs[0].data_offset,
            Some(moof_size + 8)
        );
        assert_eq!(
            media.moof.track_fragments[1].track_runs[0].data_offset,
            Some(moof_size + 8 + 160)
        );
        assert_eq!(media.payload_size(), 200);
    }

    #[test]
    fn sync_flags_follow_the_samples() {
        let mut tracks = BTreeMap::new();
        tracks.insert(
            1,
            SegmentTrack {
                t0: Rational::ZERO,
                meta: video_meta(1),
                samples: vec![
                    sample(Rational::ZERO, Rational::new(1, 30), true, 10),
                    sample(Rational::new(1, 30), Rational::new(1, 30), false, 10),
                ],
            },
        );

        let segment = Segment {
            sequence_id: 0,
            t0: Rational::ZERO,
            duration: Rational::new(2, 30),
            tracks,
        };

        let media = make_media_segment(&segment).unwrap();
        let run = &media.moof.track_fragments[0].track_runs[0];
        assert_eq!(run.samples[0].flags, Some(SYNC_SAMPLE_FLAGS));
        assert_eq!(run.samples[1].flags, Some(NON_SYNC_SAMPLE_FLAGS));
        assert_eq!(run.samples[0].duration, Some(3000));
    }

    #[test]
    fn reordered_samples_get_a_signed_run() {
        // decode order I P B: the B frame presents before the P it follows
        let mut samples = vec![
            sample(Rational::ZERO, Rational::new(1, 30), true, 10),
            sample(Rational::new(3, 30), Rational::new(1, 30), false, 10),
            sample(Rational::new(1, 30), Rational::new(1, 30), false, 10),
        ];
        samples[1].coding_time = Rational::new(1, 30);
        samples[2].coding_time = Rational::new(2, 30);

        let mut tracks = BTreeMap::new();
        tracks.insert(
            1,
            SegmentTrack {
                t0: Rational::ZERO,
                meta: video_meta(1),
                samples,
            },
        );

        let segment = Segment {
            sequence_id: 0,
            t0: Rational::ZERO,
            duration: Rational::new(3, 30),
            tracks,
        };

        let media = make_media_segment(&segment).unwrap();
        let run = &media.moof.track_fragments[0].track_runs[0];

        assert_eq!(run.samples[0].composition_time_offset, Some(0));
        assert_eq!(run.samples[1].composition_time_offset, Some(6000));
        assert_eq!(run.samples[2].composition_time_offset, Some(-3000));
        assert_eq!(run.version(), 1);
    }

    #[test]
    fn rational_timescales_are_lifted_to_integer_ticks() {
        // NTSC: 30000/1001 ticks per second, declared as 30000, with one
        // frame lasting 1001 ticks
        let frame = Rational::new(1001, 30_000);
        let t0 = Rational::new(10_010, 30_000);

        let mut tracks = BTreeMap::new();
        tracks.insert(
            1,
            SegmentTrack {
                t0,
                meta: TrackMeta {
                    track_id: 1,
                    timescale: Fraction::new(30_000, 1001),
                    media_type: MediaType::Video,
                },
                samples: vec![sample(t0, frame, true, 20), sample(t0 + frame, frame, false, 20)],
            },
        );

        let segment = Segment {
            sequence_id: 0,
            t0,
            duration: frame + frame,
            tracks,
        };

        let media = make_media_segment(&segment).unwrap();
        let traf = &media.moof.track_fragments[0];

        let tfdt = traf.base_media_decode_time.as_ref().unwrap();
        assert_eq!(tfdt.base_media_decode_time, 10_010);

        let run = &traf.track_runs[0];
        assert_eq!(run.samples[0].duration, Some(1001));
        assert_eq!(run.samples[1].duration, Some(1001));
        assert_eq!(run.samples[0].composition_time_offset, Some(0));
        assert_eq!(run.samples[1].composition_time_offset, Some(0));
    }

    #[test]
    fn rational_timescale_declares_its_numerator_in_the_media_header() {
        use crate::{AvcVideoSampleEntry, MediaDescription, TrackSampleEntry};

        let movie = MovieDescription {
            creation_time: 0,
            modification_time: 0,
            duration: Rational::new(1, 1),
            file_type: None,
        };

        let tracks = vec![TrackDescription {
            meta: TrackMeta {
                track_id: 1,
                timescale: Fraction::new(30_000, 1001),
                media_type: MediaType::Video,
            },
            media: MediaDescription {
                creation_time: 0,
                modification_time: 0,
                duration: Rational::new(1, 1),
            },
            sample_entry: TrackSampleEntry::Avc(AvcVideoSampleEntry {
                width: 1920,
                height: 1080,
                sps: Bytes::from_static(&[0x67, 0x64, 0x00, 0x29, 0xac]),
                pps: Bytes::from_static(&[0x68, 0xee, 0x3c, 0x80]),
            }),
        }];

        let init = make_init_segment(&tracks, &movie, true).unwrap();
        let mdhd = &init.moov.tracks[0].mdia.mdhd;
        assert_eq!(mdhd.timescale, 30_000);
        // one second of media expressed in the lifted scale
        assert_eq!(mdhd.duration, 30_000);
    }

    #[test]
    fn init_segment_fails_atomically_on_a_bad_entry() {
        use crate::{AvcVideoSampleEntry, MediaDescription, TrackSampleEntry};

        let movie = MovieDescription {
            creation_time: 0,
            modification_time: 0,
            duration: Rational::new(1, 1),
            file_type: None,
        };

        let media = MediaDescription {
            creation_time: 0,
            modification_time: 0,
            duration: Rational::new(1, 1),
        };

        let tracks = vec![TrackDescription {
            meta: video_meta(1),
            media: media.clone(),
            sample_entry: TrackSampleEntry::Avc(AvcVideoSampleEntry {
                width: 1920,
                height: 1080,
                sps: Bytes::from_static(&[0x67]),
                pps: Bytes::from_static(&[0x68]),
            }),
        }];

        assert!(make_init_segment(&tracks, &movie, true).is_err());
    }
}
