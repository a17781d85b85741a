use std::collections::VecDeque;

use bytes::Bytes;
use fm_isobmff::{
    AvcConfigurationBox, AvcDecoderConfigurationRecord, AvcSampleEntryBox, DecoderConfigDescriptor,
    DecoderSpecificInfo, EsDescriptor, EsdBox, FourCC, Mpeg4AudioSampleEntryBox, SampleEntry,
    UnknownBox,
};

use crate::{Fraction, Rational, SegmenterError};

/// One encoded access unit plus its timing, as handed over by a demuxer or
/// an encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub data: Bytes,
    /// Position in encode/storage order.
    pub coding_index: u64,
    /// Position in presentation order.
    pub pres_index: u64,
    pub coding_time: Rational,
    pub pres_time: Rational,
    pub duration: Rational,
    pub is_sync: bool,
    /// Present only on samples that change the codec configuration.
    pub decoder_config: Option<Bytes>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
    /// Timed metadata; stored with a 'meta' handler and a null media header.
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub track_id: u32,
    pub timescale: Fraction,
    pub media_type: MediaType,
}

/// The segmentation engine's per-track input: samples in coding order.
#[derive(Debug, Clone)]
pub struct TrackFrames {
    pub meta: TrackMeta,
    pub samples: VecDeque<Sample>,
}

impl TrackFrames {
    pub fn new(meta: TrackMeta, samples: impl IntoIterator<Item = Sample>) -> Self {
        TrackFrames {
            meta,
            samples: samples.into_iter().collect(),
        }
    }
}

/// The minimal non-negative constant that, added to every sample's
/// presentation time, keeps it at or past its coding time. A non-zero
/// offset means the track reorders frames and needs an edit list in
/// progressive output.
pub fn presentation_offset<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Rational {
    let mut offset = Rational::ZERO;

    for sample in samples {
        let lag = sample.coding_time - sample.pres_time;
        if lag > offset {
            offset = lag;
        }
    }

    offset
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSpec {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDescription {
    pub creation_time: u64,
    pub modification_time: u64,
    pub duration: Rational,
    /// Brands for the leading 'ftyp'; a conservative ISO base set is used
    /// when absent.
    pub file_type: Option<BrandSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaDescription {
    pub creation_time: u64,
    pub modification_time: u64,
    pub duration: Rational,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcVideoSampleEntry {
    pub width: u16,
    pub height: u16,
    pub sps: Bytes,
    pub pps: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp4AudioSampleEntry {
    pub channel_count: u16,
    pub sample_size: u16,
    pub sample_rate: u32,
    pub decoder_specific_info: Bytes,
}

/// Codec configuration for one track, turned into a 'stsd' sample entry
/// when the init segment is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSampleEntry {
    Avc(AvcVideoSampleEntry),
    Aac(Mp4AudioSampleEntry),
    /// A ready-made sample entry carried through untouched.
    Raw(UnknownBox),
}

impl TrackSampleEntry {
    pub fn make_sample_entry(&self, track_id: u32) -> Result<SampleEntry, SegmenterError> {
        match self {
            TrackSampleEntry::Avc(avc) => {
                // profile, compatibility and level live in the first bytes
                // after the SPS NAL header
                if avc.sps.len() < 4 {
                    return Err(SegmenterError::SampleEntry {
                        track_id,
                        reason: "sequence parameter set is too short",
                    });
                }
                if avc.pps.is_empty() {
                    return Err(SegmenterError::SampleEntry {
                        track_id,
                        reason: "picture parameter set is empty",
                    });
                }

                Ok(SampleEntry::Avc(AvcSampleEntryBox::new(
                    avc.width,
                    avc.height,
                    AvcConfigurationBox::new(AvcDecoderConfigurationRecord {
                        profile_indication: avc.sps[1],
                        profile_compatibility: avc.sps[2],
                        level_indication: avc.sps[3],
                        sequence_parameter_sets: vec![avc.sps.to_vec()],
                        picture_parameter_sets: vec![avc.pps.to_vec()],
                    }),
                )))
            }
            TrackSampleEntry::Aac(aac) => {
                if aac.decoder_specific_info.is_empty() {
                    return Err(SegmenterError::SampleEntry {
                        track_id,
                        reason: "decoder specific info is empty",
                    });
                }

                Ok(SampleEntry::Mp4a(Mpeg4AudioSampleEntryBox::new(
                    aac.channel_count,
                    aac.sample_size,
                    aac.sample_rate,
                    EsdBox::new(EsDescriptor::new(
                        track_id as u16,
                        DecoderConfigDescriptor::new(
                            0x40, // Audio ISO/IEC 14496-3
                            Some(DecoderSpecificInfo::new(aac.decoder_specific_info.to_vec())),
                        ),
                    )),
                )))
            }
            TrackSampleEntry::Raw(raw) => Ok(SampleEntry::Raw(raw.clone())),
        }
    }

    /// Width and height as 16.16 fixed point, for the track header.
    pub fn width_fp(&self) -> u32 {
        match self {
            TrackSampleEntry::Avc(avc) => (avc.width as u32) << 16,
            _ => 0,
        }
    }

    pub fn height_fp(&self) -> u32 {
        match self {
            TrackSampleEntry::Avc(avc) => (avc.height as u32) << 16,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescription {
    pub meta: TrackMeta,
    pub media: MediaDescription,
    pub sample_entry: TrackSampleEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(coding: Rational, pres: Rational) -> Sample {
        Sample {
            data: Bytes::new(),
            coding_index: 0,
            pres_index: 0,
            coding_time: coding,
            pres_time: pres,
            duration: Rational::new(1, 30),
            is_sync: true,
            decoder_config: None,
        }
    }

    #[test]
    fn presentation_offset_is_zero_without_reordering() {
        let samples = vec![
            sample(Rational::ZERO, Rational::ZERO),
            sample(Rational::new(1, 30), Rational::new(1, 30)),
        ];

        assert_eq!(presentation_offset(&samples), Rational::ZERO);
    }

    #[test]
    fn presentation_offset_covers_the_worst_sample() {
        // decode order: I P B B, with the B frames presented before the P
        let samples = vec![
            sample(Rational::ZERO, Rational::ZERO),
            sample(Rational::new(1, 30), Rational::new(3, 30)),
            sample(Rational::new(2, 30), Rational::new(1, 30)),
            sample(Rational::new(3, 30), Rational::new(2, 30)),
        ];

        assert_eq!(presentation_offset(&samples), Rational::new(1, 30));
    }

    #[test]
    fn malformed_sps_fails_entry_construction() {
        let entry = TrackSampleEntry::Avc(AvcVideoSampleEntry {
            width: 1920,
            height: 1080,
            sps: Bytes::from_static(&[0x67, 0x64]),
            pps: Bytes::from_static(&[0x68, 0xee]),
        });

        assert!(matches!(
            entry.make_sample_entry(1),
            Err(SegmenterError::SampleEntry { track_id: 1, .. })
        ));
    }
}
