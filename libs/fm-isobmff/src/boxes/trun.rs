use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

bitflags::bitflags! {
    pub struct TrackFragmentRunFlags: u32 {
        const DATA_OFFSET_PRESENT = 0x00000001;
        const FIRST_SAMPLE_FLAGS_PRESENT = 0x00000004;
        const SAMPLE_DURATION_PRESENT = 0x00000100;
        const SAMPLE_SIZE_PRESENT = 0x00000200;
        const SAMPLE_FLAGS_PRESENT = 0x00000400;
        const SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT = 0x00000800;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragmentSample {
    pub duration: Option<u32>,
    pub size: Option<u32>,
    pub flags: Option<u32>,
    pub composition_time_offset: Option<i32>,
}

/// Version 0 stores composition time offsets unsigned; version 1 is chosen
/// automatically as soon as any sample carries a negative offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragmentRunBox {
    pub data_offset: Option<i32>,
    pub first_sample_flags: Option<u32>,
    pub samples: Vec<TrackFragmentSample>,
}

impl TrackFragmentRunBox {
    pub fn new(
        data_offset: Option<i32>,
        first_sample_flags: Option<u32>,
        samples: Vec<TrackFragmentSample>,
    ) -> Self {
        TrackFragmentRunBox {
            data_offset,
            first_sample_flags,
            samples,
        }
    }

    pub fn version(&self) -> u8 {
        let negative_offset = self
            .samples
            .iter()
            .any(|sample| sample.composition_time_offset.unwrap_or(0) < 0);

        if negative_offset {
            1
        } else {
            0
        }
    }

    fn sample_size(&self, flags: TrackFragmentRunFlags) -> u64 {
        let mut sample_size = 0;

        if flags.contains(TrackFragmentRunFlags::SAMPLE_DURATION_PRESENT) {
            sample_size += 4; // sample_duration
        }

        if flags.contains(TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT) {
            sample_size += 4; // sample_size
        }

        if flags.contains(TrackFragmentRunFlags::SAMPLE_FLAGS_PRESENT) {
            sample_size += 4; // sample_flags
        }

        if flags.contains(TrackFragmentRunFlags::SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT) {
            sample_size += 4; // sample_composition_time_offset
        }

        sample_size
    }

    fn flags_from_fields(&self) -> TrackFragmentRunFlags {
        let mut flags = TrackFragmentRunFlags::empty();

        if self.data_offset.is_some() {
            flags.insert(TrackFragmentRunFlags::DATA_OFFSET_PRESENT);
        }

        if self.first_sample_flags.is_some() {
            flags.insert(TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT);
        }

        if let Some(sample) = self.samples.first() {
            if sample.duration.is_some() {
                flags.insert(TrackFragmentRunFlags::SAMPLE_DURATION_PRESENT);
            }

            if sample.size.is_some() {
                flags.insert(TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT);
            }

            if sample.flags.is_some() {
                flags.insert(TrackFragmentRunFlags::SAMPLE_FLAGS_PRESENT);
            }

            if sample.composition_time_offset.is_some() {
                flags.insert(TrackFragmentRunFlags::SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT);
            }
        }

        flags
    }
}

impl Mp4Box for TrackFragmentRunBox {
    const NAME: FourCC = FourCC(*b"trun");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(
            self.version(),
            self.flags_from_fields().bits(),
        ))
    }

    fn content_size(&self) -> u64 {
        let flags = self.flags_from_fields();

        let mut size = 0;

        size += size_of::<u32>() as u64; // sample_count

        if flags.contains(TrackFragmentRunFlags::DATA_OFFSET_PRESENT) {
            size += size_of::<i32>() as u64; // data_offset
        }

        if flags.contains(TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT) {
            size += size_of::<u32>() as u64; // first_sample_flags
        }

        size += self.sample_size(flags) * self.samples.len() as u64;

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.samples.len() as u32);

        if let Some(data_offset) = self.data_offset {
            stream.write_i32(data_offset);
        }

        if let Some(first_sample_flags) = self.first_sample_flags {
            stream.write_u32(first_sample_flags);
        }

        for sample in &self.samples {
            if let Some(duration) = sample.duration {
                stream.write_u32(duration);
            }

            if let Some(size) = sample.size {
                stream.write_u32(size);
            }

            if let Some(flags) = sample.flags {
                stream.write_u32(flags);
            }

            if let Some(composition_time_offset) = sample.composition_time_offset {
                stream.write_i32(composition_time_offset);
            }
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;
        let flags = TrackFragmentRunFlags::from_bits_truncate(header.flags);

        let sample_count = stream.read_u32()?;

        let data_offset = if flags.contains(TrackFragmentRunFlags::DATA_OFFSET_PRESENT) {
            Some(stream.read_i32()?)
        } else {
            None
        };

        let first_sample_flags = if flags.contains(TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT)
        {
            Some(stream.read_u32()?)
        } else {
            None
        };

        let mut samples = Vec::new();
        for _ in 0..sample_count {
            let duration = if flags.contains(TrackFragmentRunFlags::SAMPLE_DURATION_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

            let size = if flags.contains(TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

            let sample_flags = if flags.contains(TrackFragmentRunFlags::SAMPLE_FLAGS_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

            let composition_time_offset =
                if flags.contains(TrackFragmentRunFlags::SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT) {
                    Some(stream.read_i32()?)
                } else {
                    None
                };

            samples.push(TrackFragmentSample {
                duration,
                size,
                flags: sample_flags,
                composition_time_offset,
            });
        }

        Ok(TrackFragmentRunBox {
            data_offset,
            first_sample_flags,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(duration: u32, size: u32, composition_time_offset: i32) -> TrackFragmentSample {
        TrackFragmentSample {
            duration: Some(duration),
            size: Some(size),
            flags: Some(0x0200_0000),
            composition_time_offset: Some(composition_time_offset),
        }
    }

    #[test]
    fn version_0_for_non_negative_offsets() {
        let trun = TrackFragmentRunBox::new(Some(0), None, vec![sample(3000, 100, 0)]);
        assert_eq!(trun.version(), 0);

        let mut stream = BitStream::from(trun.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, TrackFragmentRunBox::NAME);
        assert_eq!(
            TrackFragmentRunBox::parse_box_contents(&mut contents).unwrap(),
            trun
        );
    }

    #[test]
    fn negative_offsets_select_version_1() {
        let trun = TrackFragmentRunBox::new(
            Some(124),
            None,
            vec![sample(3000, 100, 3000), sample(3000, 80, -3000)],
        );
        assert_eq!(trun.version(), 1);

        let bytes = trun.to_bytes().unwrap();
        assert_eq!(bytes[8], 1); // version

        let mut stream = BitStream::from(bytes);
        let (_, mut contents) = stream.read_sub_box().unwrap();
        let parsed = TrackFragmentRunBox::parse_box_contents(&mut contents).unwrap();
        assert_eq!(parsed.samples[1].composition_time_offset, Some(-3000));
        assert_eq!(parsed, trun);
    }
}
