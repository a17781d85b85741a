use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::warn;

use crate::{Rational, Sample, SegmenterError, TrackFrames, TrackMeta};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterConfig {
    /// Target duration of one segment. Actual cuts land on sync samples,
    /// so emitted segments overshoot or undershoot this.
    pub segment_duration: Rational,
    pub base_sequence_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTrack {
    /// Where this track's cut landed; may differ slightly between tracks
    /// of the same segment since each track searches for its own sync
    /// sample.
    pub t0: Rational,
    pub meta: TrackMeta,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub sequence_id: u32,
    /// Earliest track t0 of this segment.
    pub t0: Rational,
    /// Largest per-track sum of consumed sample durations.
    pub duration: Rational,
    pub tracks: BTreeMap<u32, SegmentTrack>,
}

struct TrackState {
    meta: TrackMeta,
    remaining: VecDeque<Sample>,
    next_t0: Rational,
}

fn validate(tracks: &[TrackFrames], config: &SegmenterConfig) -> Result<(), SegmenterError> {
    if tracks.is_empty() {
        return Err(SegmenterError::InvalidConfiguration(
            "no tracks to segment".into(),
        ));
    }

    if !config.segment_duration.is_positive() {
        return Err(SegmenterError::InvalidConfiguration(format!(
            "segment duration {} is not positive",
            config.segment_duration
        )));
    }

    let mut seen = BTreeSet::new();
    for track in tracks {
        let timescale = track.meta.timescale;
        if timescale.numerator == 0 || timescale.denominator == 0 {
            return Err(SegmenterError::InvalidConfiguration(format!(
                "track {} has timescale {}",
                track.meta.track_id, timescale
            )));
        }

        if !seen.insert(track.meta.track_id) {
            return Err(SegmenterError::InvalidConfiguration(format!(
                "duplicate track id {}",
                track.meta.track_id
            )));
        }
    }

    Ok(())
}

/// Cuts the given per-track sample queues into segments of roughly
/// `segment_duration`, aligned to sync samples.
///
/// Tracks are consumed up to a presentation-time threshold that advances by
/// the configured duration each round; once a track crosses the threshold,
/// consumption continues until its next sync sample, which then opens the
/// following segment. A sample landing exactly on the threshold belongs to
/// the next segment. Every input sample ends up in exactly one segment, in
/// its original order, and no empty segments are emitted.
pub fn make_segments(
    tracks: Vec<TrackFrames>,
    config: &SegmenterConfig,
) -> Result<Vec<Segment>, SegmenterError> {
    validate(&tracks, config)?;

    let mut states: Vec<TrackState> = tracks
        .into_iter()
        .map(|track| TrackState {
            meta: track.meta,
            remaining: track.samples,
            next_t0: Rational::ZERO,
        })
        .collect();

    let mut segments = Vec::new();
    let mut last_cts = config.segment_duration;
    let mut sequence_id = config.base_sequence_id;

    while states.iter().any(|state| !state.remaining.is_empty()) {
        let mut segment_tracks = BTreeMap::new();
        let mut duration = Rational::ZERO;

        for state in &mut states {
            let t0 = state.next_t0;
            let mut consumed = Vec::new();
            let mut track_duration = Rational::ZERO;
            let mut first = true;

            loop {
                let (pres_time, is_sync) = match state.remaining.front() {
                    Some(front) => (front.pres_time, front.is_sync),
                    None => break,
                };

                if pres_time >= last_cts {
                    if is_sync {
                        // the cut point; this sample opens the next segment
                        state.next_t0 = pres_time;
                        break;
                    }
                    // past the threshold without a sync sample; keep
                    // consuming until one shows up
                }

                if first && !is_sync {
                    warn!(
                        track_id = state.meta.track_id,
                        sequence_id, "segment does not begin on a sync sample"
                    );
                }
                first = false;

                if let Some(sample) = state.remaining.pop_front() {
                    track_duration += sample.duration;
                    consumed.push(sample);
                }
            }

            if !consumed.is_empty() {
                if track_duration > duration {
                    duration = track_duration;
                }

                segment_tracks.insert(
                    state.meta.track_id,
                    SegmentTrack {
                        t0,
                        meta: state.meta.clone(),
                        samples: consumed,
                    },
                );
            }
        }

        last_cts += config.segment_duration;

        // a gap wider than the segment duration can leave a round empty;
        // advance the threshold without emitting anything
        if segment_tracks.is_empty() {
            continue;
        }

        let t0 = segment_tracks
            .values()
            .map(|track| track.t0)
            .min()
            .unwrap_or(Rational::ZERO);

        segments.push(Segment {
            sequence_id,
            t0,
            duration,
            tracks: segment_tracks,
        });
        sequence_id += 1;
    }

    Ok(segments)
}
