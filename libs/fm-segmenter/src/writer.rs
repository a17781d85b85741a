use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};

use fm_isobmff::{
    BitStream, ChunkLargeOffsetBox, CompositionOffsetBox, EditBox, EditListBox, EditListEntry,
    FourCC, Mp4Box, SampleSizeBox, SampleToChunkBox, SampleToChunkEntry, SegmentIndexBox,
    SegmentIndexReference, SyncSampleBox, TimeToSampleBox,
};

use crate::{
    make_media_segment, segment_type, Fraction, InitSegment, Rational, Segment, SegmenterError,
    MOVIE_TIMESCALE,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SidxState {
    Empty,
    Accumulating,
    Finalized,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SidxInfo {
    /// Absolute position of the box in the output stream.
    pub position: u64,
    pub size: u64,
}

/// Two-pass 'sidx' writer.
///
/// The box must physically precede the subsegments it describes, but the
/// referenced sizes are only known after those subsegments are serialized.
/// So: add every subsegment, call [`write_sidx`](SidxWriter::write_sidx)
/// once with no position to reserve the box (the reference count is final,
/// the sizes are placeholders), write the subsegments while feeding their
/// byte sizes back, then call it again with the reserved position.
///
/// No other writer may touch the sink between the two passes.
pub struct SidxWriter {
    state: SidxState,
    timescale: Option<Fraction>,
    earliest_presentation_time: Rational,
    durations: Vec<Rational>,
    sizes: Vec<u64>,
    first_subsegment_offset: u64,
}

impl SidxWriter {
    pub fn new() -> Self {
        SidxWriter {
            state: SidxState::Empty,
            timescale: None,
            earliest_presentation_time: Rational::ZERO,
            durations: Vec::new(),
            sizes: Vec::new(),
            first_subsegment_offset: 0,
        }
    }

    pub fn add_subsegment(&mut self, segment: &Segment) -> Result<(), SegmenterError> {
        if self.state == SidxState::Finalized {
            return Err(SegmenterError::InvalidState(
                "subsegment added after finalization",
            ));
        }

        if self.state == SidxState::Empty {
            // the index is timed against the first (lowest-id) track, and
            // starts at the earliest cut across the first subsegment's
            // tracks
            self.timescale = segment
                .tracks
                .values()
                .next()
                .map(|track| track.meta.timescale);
            self.earliest_presentation_time = segment
                .tracks
                .values()
                .map(|track| track.t0)
                .min()
                .unwrap_or(Rational::ZERO);
            self.state = SidxState::Accumulating;
        }

        self.durations.push(segment.duration);

        Ok(())
    }

    pub fn add_subsegment_size(&mut self, size: u64) -> Result<(), SegmenterError> {
        if self.state != SidxState::Accumulating {
            return Err(SegmenterError::InvalidState(
                "subsegment size without a subsegment",
            ));
        }

        if self.sizes.len() >= self.durations.len() {
            return Err(SegmenterError::InvalidState(
                "more subsegment sizes than subsegments",
            ));
        }

        self.sizes.push(size);

        Ok(())
    }

    /// Distance from the end of the 'sidx' to the first subsegment's first
    /// byte; zero when the index immediately precedes it.
    pub fn set_first_subsegment_offset(&mut self, offset: u64) {
        self.first_subsegment_offset = offset;
    }

    pub fn write_sidx<W: Write + Seek>(
        &mut self,
        out: &mut W,
        position: Option<u64>,
    ) -> Result<SidxInfo, SegmenterError> {
        if self.state == SidxState::Finalized {
            return Err(SegmenterError::InvalidState("sidx already finalized"));
        }

        let timescale = match self.timescale {
            Some(timescale) => timescale.integer_timescale(),
            None => return Err(SegmenterError::InvalidState("no subsegments to index")),
        };

        if position.is_some() && self.sizes.len() != self.durations.len() {
            return Err(SegmenterError::InvalidState(
                "every subsegment needs a size before finalization",
            ));
        }

        let origin = out.stream_position()?;
        if let Some(position) = position {
            out.seek(SeekFrom::Start(position))?;
        }
        let begin = out.stream_position()?;

        let mut sidx = SegmentIndexBox::new(1, 1, timescale.numerator);
        sidx.earliest_presentation_time =
            self.earliest_presentation_time.to_ticks(timescale).max(0) as u64;
        sidx.first_offset = self.first_subsegment_offset;

        for (index, &duration) in self.durations.iter().enumerate() {
            sidx.references.push(SegmentIndexReference {
                reference_type: false,
                referenced_size: self.sizes.get(index).copied().unwrap_or(0) as u32,
                subsegment_duration: duration.to_ticks(timescale) as u32,
                starts_with_sap: true,
                sap_type: 1,
                sap_delta_time: 0,
            });
        }

        out.write_all(&sidx.to_bytes()?)?;
        let end = out.stream_position()?;

        if position.is_some() {
            out.seek(SeekFrom::Start(origin))?;
            self.state = SidxState::Finalized;
        }

        Ok(SidxInfo {
            position: begin,
            size: end - begin,
        })
    }
}

impl Default for SidxWriter {
    fn default() -> Self {
        SidxWriter::new()
    }
}

/// Serializes init segments and media segments to a seekable sink.
pub struct Writer {
    write_segment_header: bool,
    write_sidx: bool,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            write_segment_header: true,
            write_sidx: true,
        }
    }

    pub fn with_segment_header(mut self, write_segment_header: bool) -> Self {
        self.write_segment_header = write_segment_header;
        self
    }

    pub fn with_sidx(mut self, write_sidx: bool) -> Self {
        self.write_sidx = write_sidx;
        self
    }

    pub fn write_init_segment<W: Write>(
        &self,
        out: &mut W,
        init: &InitSegment,
    ) -> Result<(), SegmenterError> {
        out.write_all(&init.to_bytes()?)?;

        Ok(())
    }

    /// Writes the subsegments as one media segment: optional 'styp', then
    /// a 'sidx' covering them, then each subsegment's 'moof' + 'mdat'.
    pub fn write_subsegments<W: Write + Seek>(
        &self,
        out: &mut W,
        subsegments: &[Segment],
    ) -> Result<(), SegmenterError> {
        if subsegments.is_empty() {
            return Ok(());
        }

        if self.write_segment_header {
            out.write_all(&segment_type().to_bytes()?)?;
        }

        let mut sidx = None;
        if self.write_sidx {
            let mut writer = SidxWriter::new();
            for subsegment in subsegments {
                writer.add_subsegment(subsegment)?;
            }
            writer.set_first_subsegment_offset(0);

            let info = writer.write_sidx(out, None)?;
            sidx = Some((writer, info));
        }

        for subsegment in subsegments {
            let media = make_media_segment(subsegment)?;

            let before = out.stream_position()?;
            media.write_to(out)?;
            let after = out.stream_position()?;

            if let Some((writer, _)) = &mut sidx {
                writer.add_subsegment_size(after - before)?;
            }
        }

        if let Some((mut writer, info)) = sidx {
            writer.write_sidx(out, Some(info.position))?;
        }

        Ok(())
    }

    pub fn write_segment<W: Write + Seek>(
        &self,
        out: &mut W,
        segment: &Segment,
    ) -> Result<(), SegmenterError> {
        self.write_subsegments(out, std::slice::from_ref(segment))
    }
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

struct TrackWriteState {
    timescale: Fraction,
    stts: TimeToSampleBox,
    ctts: CompositionOffsetBox,
    sync_samples: Vec<u32>,
    any_non_sync: bool,
    chunk_offsets: Vec<u64>,
    sample_sizes: Vec<u32>,
    chunks: Vec<SampleToChunkEntry>,
    decode_time: Rational,
    duration_ticks: u64,
    sample_index: u32,
    presentation_offset: Rational,
}

impl TrackWriteState {
    fn new(timescale: Fraction) -> Self {
        TrackWriteState {
            timescale,
            stts: TimeToSampleBox::new(Vec::new()),
            ctts: CompositionOffsetBox::new(Vec::new()),
            sync_samples: Vec::new(),
            any_non_sync: false,
            chunk_offsets: Vec::new(),
            sample_sizes: Vec::new(),
            chunks: Vec::new(),
            decode_time: Rational::ZERO,
            duration_ticks: 0,
            sample_index: 0,
            presentation_offset: Rational::ZERO,
        }
    }
}

/// Progressive (non-fragmented) writer: one growing 'mdat' followed by a
/// 'moov' whose sample tables are accumulated as segments arrive.
///
/// The 'mdat' size is patched on [`finalize`](MovieWriter::finalize), so
/// the sink must be seekable.
pub struct MovieWriter<W: Write + Seek> {
    out: W,
    moov: fm_isobmff::MovieBox,
    mdat_offset: u64,
    tracks: BTreeMap<u32, TrackWriteState>,
}

impl<W: Write + Seek> MovieWriter<W> {
    /// Writes the 'ftyp' and a placeholder 'mdat' header, and remembers
    /// the init segment's 'moov' for finalization. Build the init segment
    /// with fragmentation disabled; a 'mvex' is dropped here.
    pub fn new(mut out: W, init: &InitSegment) -> Result<Self, SegmenterError> {
        out.write_all(&init.ftyp.to_bytes()?)?;

        let mdat_offset = out.stream_position()?;
        let mut header = BitStream::new();
        header.write_u32(0);
        header.write_fourcc(FourCC(*b"mdat"));
        out.write_all(header.storage())?;

        let mut moov = init.moov.clone();
        moov.mvex = None;

        let mut tracks = BTreeMap::new();
        for track in &moov.tracks {
            let timescale = Fraction::new(track.mdia.mdhd.timescale, 1);
            tracks.insert(track.tkhd.track_id, TrackWriteState::new(timescale));
        }

        Ok(MovieWriter {
            out,
            moov,
            mdat_offset,
            tracks,
        })
    }

    /// Appends one segment's payloads to the 'mdat', one chunk per track,
    /// and accumulates its sample table state.
    pub fn write_segment(&mut self, segment: &Segment) -> Result<(), SegmenterError> {
        for (track_id, track) in &segment.tracks {
            let chunk_offset = self.out.stream_position()?;

            let state = self.tracks.get_mut(track_id).ok_or_else(|| {
                SegmenterError::InvalidConfiguration(format!(
                    "segment references unknown track {}",
                    track_id
                ))
            })?;

            for sample in &track.samples {
                self.out.write_all(&sample.data)?;

                let delta = sample.duration.to_ticks(state.timescale) as u32;
                state.stts.add_sample_delta(delta);
                state.duration_ticks += delta as u64;

                let offset = sample.pres_time - state.decode_time;
                state.ctts.add_sample_offset(offset.to_ticks(state.timescale) as i32);

                state.sample_sizes.push(sample.data.len() as u32);

                state.sample_index += 1;
                if sample.is_sync {
                    state.sync_samples.push(state.sample_index);
                } else {
                    state.any_non_sync = true;
                }

                let lag = sample.coding_time - sample.pres_time;
                if lag > state.presentation_offset {
                    state.presentation_offset = lag;
                }

                state.decode_time += sample.duration;
            }

            state.chunk_offsets.push(chunk_offset);

            let samples_per_chunk = track.samples.len() as u32;
            if state.chunks.last().map(|chunk| chunk.samples_per_chunk)
                != Some(samples_per_chunk)
            {
                state.chunks.push(SampleToChunkEntry {
                    first_chunk: state.chunk_offsets.len() as u32,
                    samples_per_chunk,
                    sample_description_index: 1,
                });
            }
        }

        Ok(())
    }

    /// Patches the 'mdat' size and writes the finished 'moov'. Returns the
    /// sink, positioned after the end of the file.
    pub fn finalize(mut self) -> Result<W, SegmenterError> {
        let moov_offset = self.out.stream_position()?;

        let mut patch = BitStream::new();
        patch.write_u32((moov_offset - self.mdat_offset) as u32);
        self.out.seek(SeekFrom::Start(self.mdat_offset))?;
        self.out.write_all(patch.storage())?;
        self.out.seek(SeekFrom::Start(moov_offset))?;

        let mut movie_duration = 0u64;
        for track in &mut self.moov.tracks {
            let state = match self.tracks.get(&track.tkhd.track_id) {
                Some(state) => state,
                None => continue,
            };

            let media_timescale = track.mdia.mdhd.timescale.max(1) as u64;
            let track_duration = (state.duration_ticks * MOVIE_TIMESCALE as u64)
                .div_ceil(media_timescale);
            movie_duration = movie_duration.max(track_duration);

            track.mdia.mdhd.duration = state.duration_ticks;
            track.tkhd.duration = track_duration;

            let stbl = &mut track.mdia.minf.stbl;
            stbl.stts = state.stts.clone();
            stbl.stsz = SampleSizeBox::new(state.sample_sizes.clone());
            stbl.stsc = SampleToChunkBox::new(state.chunks.clone());
            stbl.co64 = ChunkLargeOffsetBox::new(state.chunk_offsets.clone());

            // composition offsets only matter when the track reorders
            let reordered = state.ctts.entries.len() != 1
                || state.ctts.entries[0].offset != 0;
            stbl.ctts = (reordered && !state.ctts.entries.is_empty())
                .then(|| state.ctts.clone());

            stbl.stss = state
                .any_non_sync
                .then(|| SyncSampleBox::new(state.sync_samples.clone()));

            if state.presentation_offset.is_positive() {
                let media_time = state.presentation_offset.to_ticks(state.timescale) as i32;
                track.edts = Some(EditBox::new(EditListBox::new(vec![EditListEntry {
                    segment_duration: 0,
                    media_time,
                    media_rate_integer: 1,
                    media_rate_fraction: 0,
                }])));
            }
        }

        self.moov.mvhd.duration = movie_duration;
        self.out.write_all(&self.moov.to_bytes()?)?;

        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MediaType, SegmentTrack, TrackMeta};
    use bytes::Bytes;
    use std::io::Cursor;

    fn segment(sequence_id: u32, t0: Rational, sizes: &[usize]) -> Segment {
        let mut samples = Vec::new();
        let mut pres = t0;
        for (index, &size) in sizes.iter().enumerate() {
            samples.push(crate::Sample {
                data: Bytes::from(vec![0xaa; size]),
                coding_index: index as u64,
                pres_index: index as u64,
                coding_time: pres,
                pres_time: pres,
                duration: Rational::new(1, 30),
                is_sync: index == 0,
                decoder_config: None,
            });
            pres += Rational::new(1, 30);
        }

        let track = SegmentTrack {
            t0,
            meta: TrackMeta {
                track_id: 1,
                timescale: Fraction::new(90_000, 1),
                media_type: MediaType::Video,
            },
            samples,
        };

        Segment {
            sequence_id,
            t0,
            duration: Rational::new(sizes.len() as i64, 30),
            tracks: [(1, track)].into_iter().collect(),
        }
    }

    #[test]
    fn sidx_writer_rejects_misuse() {
        let mut writer = SidxWriter::new();
        let mut out = Cursor::new(Vec::new());

        assert!(matches!(
            writer.write_sidx(&mut out, None),
            Err(SegmenterError::InvalidState(_))
        ));
        assert!(matches!(
            writer.add_subsegment_size(100),
            Err(SegmenterError::InvalidState(_))
        ));

        writer.add_subsegment(&segment(1, Rational::ZERO, &[10])).unwrap();
        let info = writer.write_sidx(&mut out, None).unwrap();
        writer.add_subsegment_size(100).unwrap();
        assert!(matches!(
            writer.add_subsegment_size(100),
            Err(SegmenterError::InvalidState(_))
        ));

        writer.write_sidx(&mut out, Some(info.position)).unwrap();
        assert!(matches!(
            writer.add_subsegment(&segment(2, Rational::ZERO, &[10])),
            Err(SegmenterError::InvalidState(_))
        ));
    }

    #[test]
    fn both_passes_reserve_the_same_space() {
        let mut writer = SidxWriter::new();
        let mut out = Cursor::new(Vec::new());

        writer.add_subsegment(&segment(1, Rational::ZERO, &[10, 20])).unwrap();
        writer.add_subsegment(&segment(2, Rational::new(2, 30), &[30])).unwrap();

        let reserved = writer.write_sidx(&mut out, None).unwrap();
        let reserved_len = out.get_ref().len();

        writer.add_subsegment_size(123).unwrap();
        writer.add_subsegment_size(456).unwrap();
        let along = out.stream_position().unwrap();

        let finalized = writer.write_sidx(&mut out, Some(reserved.position)).unwrap();
        assert_eq!(finalized.position, reserved.position);
        assert_eq!(finalized.size, reserved.size);
        assert_eq!(out.get_ref().len(), reserved_len);
        // the cursor is back where the caller left it
        assert_eq!(out.stream_position().unwrap(), along);
    }
}
