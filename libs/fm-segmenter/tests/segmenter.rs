use bytes::Bytes;
use fm_segmenter::{
    make_segments, Fraction, MediaType, Rational, Sample, SegmenterConfig, SegmenterError,
    TrackFrames, TrackMeta,
};

fn video_meta(track_id: u32) -> TrackMeta {
    TrackMeta {
        track_id,
        timescale: Fraction::new(90_000, 1),
        media_type: MediaType::Video,
    }
}

fn audio_meta(track_id: u32) -> TrackMeta {
    TrackMeta {
        track_id,
        timescale: Fraction::new(48_000, 1),
        media_type: MediaType::Audio,
    }
}

/// `count` samples of duration 1/`fps`, sync samples every `sync_every`
/// (every sample if 1), starting at `start`.
fn samples(count: u64, fps: i64, sync_every: u64, start: Rational) -> Vec<Sample> {
    (0..count)
        .map(|index| {
            let pres_time = start + Rational::new(index as i64, fps);
            Sample {
                data: Bytes::from(vec![index as u8; 16]),
                coding_index: index,
                pres_index: index,
                coding_time: pres_time,
                pres_time,
                duration: Rational::new(1, fps),
                is_sync: index % sync_every == 0,
                decoder_config: None,
            }
        })
        .collect()
}

fn config(segment_duration: Rational) -> SegmenterConfig {
    SegmenterConfig {
        segment_duration,
        base_sequence_id: 1,
    }
}

#[test]
fn example_scenario_cuts_three_even_segments() {
    // 30 samples of 1/30s, sync at 0/10/20, one-third-second segments
    let tracks = vec![TrackFrames::new(video_meta(1), samples(30, 30, 10, Rational::ZERO))];

    let segments = make_segments(tracks, &config(Rational::new(1, 3))).unwrap();

    assert_eq!(segments.len(), 3);
    for (index, segment) in segments.iter().enumerate() {
        let track = &segment.tracks[&1];
        assert_eq!(track.samples.len(), 10);
        assert!(track.samples[0].is_sync);
        assert_eq!(segment.sequence_id, 1 + index as u32);
        assert_eq!(segment.duration, Rational::new(10, 30));
    }

    assert_eq!(segments[1].t0, Rational::new(10, 30));
    assert_eq!(segments[1].tracks[&1].t0, Rational::new(10, 30));
    assert_eq!(segments[2].t0, Rational::new(20, 30));
}

#[test]
fn segments_partition_the_input_exactly() {
    let original = samples(97, 30, 12, Rational::ZERO);
    let tracks = vec![TrackFrames::new(video_meta(1), original.clone())];

    let segments = make_segments(tracks, &config(Rational::new(1, 2))).unwrap();

    let replay: Vec<Sample> = segments
        .iter()
        .flat_map(|segment| segment.tracks[&1].samples.iter().cloned())
        .collect();

    assert_eq!(replay, original);
}

#[test]
fn a_track_without_later_sync_samples_degenerates_to_one_segment() {
    // only the very first sample is a sync sample
    let tracks = vec![TrackFrames::new(video_meta(1), samples(50, 30, 1000, Rational::ZERO))];

    let segments = make_segments(tracks, &config(Rational::new(1, 3))).unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].tracks[&1].samples.len(), 50);
}

#[test]
fn sync_cadence_slower_than_the_target_stretches_segments() {
    // syncs every 25 samples but a 10-sample target duration
    let tracks = vec![TrackFrames::new(video_meta(1), samples(75, 30, 25, Rational::ZERO))];

    let segments = make_segments(tracks, &config(Rational::new(10, 30))).unwrap();

    assert_eq!(segments.len(), 3);
    for segment in &segments {
        let track = &segment.tracks[&1];
        assert_eq!(track.samples.len(), 25);
        assert!(track.samples[0].is_sync);
    }
}

#[test]
fn a_gap_wider_than_the_segment_duration_drops_nothing() {
    let mut input = samples(10, 30, 10, Rational::ZERO);
    // the stream resumes two full segment durations later
    input.extend(samples(10, 30, 10, Rational::new(2, 1)));

    let tracks = vec![TrackFrames::new(video_meta(1), input.clone())];
    let segments = make_segments(tracks, &config(Rational::new(1, 3))).unwrap();

    let consumed: usize = segments
        .iter()
        .map(|segment| segment.tracks[&1].samples.len())
        .sum();
    assert_eq!(consumed, input.len());

    // no empty segments, and sequence ids stay contiguous
    for (index, segment) in segments.iter().enumerate() {
        assert!(!segment.tracks[&1].samples.is_empty());
        assert_eq!(segment.sequence_id, 1 + index as u32);
    }

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].t0, Rational::new(2, 1));
}

#[test]
fn tracks_cut_independently_and_t0_stays_monotonic() {
    let tracks = vec![
        TrackFrames::new(video_meta(1), samples(90, 30, 10, Rational::ZERO)),
        // audio: every sample is a sync sample, different cadence
        TrackFrames::new(audio_meta(2), samples(140, 47, 1, Rational::ZERO)),
    ];

    let segments = make_segments(tracks, &config(Rational::new(1, 3))).unwrap();

    for track_id in [1u32, 2] {
        let mut previous: Option<Rational> = None;
        let mut first_segment = true;
        for segment in &segments {
            if let Some(track) = segment.tracks.get(&track_id) {
                if !first_segment {
                    assert!(track.samples[0].is_sync);
                }
                if let Some(previous) = previous {
                    assert!(previous <= track.t0);
                }
                previous = Some(track.t0);
            }
            first_segment = false;
        }
    }

    for segment in &segments {
        let earliest = segment.tracks.values().map(|track| track.t0).min();
        assert_eq!(Some(segment.t0), earliest);
    }

    // both tracks are fully consumed
    let consumed: usize = segments
        .iter()
        .flat_map(|segment| segment.tracks.values())
        .map(|track| track.samples.len())
        .sum();
    assert_eq!(consumed, 90 + 140);
}

#[test]
fn boundary_sample_opens_the_next_segment() {
    // a sync sample landing exactly on the threshold is not consumed by
    // the closing segment
    let tracks = vec![TrackFrames::new(video_meta(1), samples(20, 30, 10, Rational::ZERO))];

    let segments = make_segments(tracks, &config(Rational::new(10, 30))).unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].tracks[&1].samples.len(), 10);
    assert_eq!(segments[1].tracks[&1].t0, Rational::new(10, 30));
}

#[test]
fn invalid_configurations_are_rejected_before_any_work() {
    let no_tracks = make_segments(Vec::new(), &config(Rational::new(1, 3)));
    assert!(matches!(
        no_tracks,
        Err(SegmenterError::InvalidConfiguration(_))
    ));

    let zero_duration = make_segments(
        vec![TrackFrames::new(video_meta(1), samples(10, 30, 5, Rational::ZERO))],
        &config(Rational::ZERO),
    );
    assert!(matches!(
        zero_duration,
        Err(SegmenterError::InvalidConfiguration(_))
    ));

    let duplicate_ids = make_segments(
        vec![
            TrackFrames::new(video_meta(1), samples(10, 30, 5, Rational::ZERO)),
            TrackFrames::new(audio_meta(1), samples(10, 47, 1, Rational::ZERO)),
        ],
        &config(Rational::new(1, 3)),
    );
    assert!(matches!(
        duplicate_ids,
        Err(SegmenterError::InvalidConfiguration(_))
    ));

    let bad_timescale = make_segments(
        vec![TrackFrames::new(
            TrackMeta {
                track_id: 1,
                timescale: Fraction::new(0, 1),
                media_type: MediaType::Video,
            },
            samples(10, 30, 5, Rational::ZERO),
        )],
        &config(Rational::new(1, 3)),
    );
    assert!(matches!(
        bad_timescale,
        Err(SegmenterError::InvalidConfiguration(_))
    ));
}
