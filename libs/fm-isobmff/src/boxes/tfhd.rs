use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

bitflags::bitflags! {
    pub struct TrackFragmentHeaderFlags: u32 {
        const BASE_DATA_OFFSET_PRESENT = 0x000001;
        const SAMPLE_DESCRIPTION_INDEX_PRESENT = 0x000002;
        const DEFAULT_SAMPLE_DURATION_PRESENT = 0x000008;
        const DEFAULT_SAMPLE_SIZE_PRESENT = 0x000010;
        const DEFAULT_SAMPLE_FLAGS_PRESENT = 0x000020;
        const DURATION_IS_EMPTY = 0x010000;
        const DEFAULT_BASE_IS_MOOF = 0x020000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFragmentHeaderBox {
    pub track_id: u32,
    pub base_data_offset: Option<u64>,
    pub sample_description_index: Option<u32>,
    pub default_sample_duration: Option<u32>,
    pub default_sample_size: Option<u32>,
    pub default_sample_flags: Option<u32>,
    pub duration_is_empty: bool,
    pub default_base_is_moof: bool,
}

impl TrackFragmentHeaderBox {
    pub fn with_default_base(track_id: u32) -> Self {
        TrackFragmentHeaderBox {
            track_id,
            base_data_offset: None,
            sample_description_index: None,
            default_sample_duration: None,
            default_sample_size: None,
            default_sample_flags: None,
            duration_is_empty: false,
            default_base_is_moof: true,
        }
    }

    fn flags_from_fields(&self) -> TrackFragmentHeaderFlags {
        let mut flags = TrackFragmentHeaderFlags::empty();

        if self.base_data_offset.is_some() {
            flags.insert(TrackFragmentHeaderFlags::BASE_DATA_OFFSET_PRESENT);
        }

        if self.sample_description_index.is_some() {
            flags.insert(TrackFragmentHeaderFlags::SAMPLE_DESCRIPTION_INDEX_PRESENT);
        }

        if self.default_sample_duration.is_some() {
            flags.insert(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT);
        }

        if self.default_sample_size.is_some() {
            flags.insert(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_SIZE_PRESENT);
        }

        if self.default_sample_flags.is_some() {
            flags.insert(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_FLAGS_PRESENT);
        }

        if self.duration_is_empty {
            flags.insert(TrackFragmentHeaderFlags::DURATION_IS_EMPTY);
        }

        if self.default_base_is_moof {
            flags.insert(TrackFragmentHeaderFlags::DEFAULT_BASE_IS_MOOF);
        }

        flags
    }
}

impl Mp4Box for TrackFragmentHeaderBox {
    const NAME: FourCC = FourCC(*b"tfhd");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, self.flags_from_fields().bits()))
    }

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u32>() as u64; // track_ID

        if self.base_data_offset.is_some() {
            size += size_of::<u64>() as u64;
        }

        if self.sample_description_index.is_some() {
            size += size_of::<u32>() as u64;
        }

        if self.default_sample_duration.is_some() {
            size += size_of::<u32>() as u64;
        }

        if self.default_sample_size.is_some() {
            size += size_of::<u32>() as u64;
        }

        if self.default_sample_flags.is_some() {
            size += size_of::<u32>() as u64;
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_u32(self.track_id);

        if let Some(base_data_offset) = self.base_data_offset {
            stream.write_u64(base_data_offset);
        }

        if let Some(sample_description_index) = self.sample_description_index {
            stream.write_u32(sample_description_index);
        }

        if let Some(default_sample_duration) = self.default_sample_duration {
            stream.write_u32(default_sample_duration);
        }

        if let Some(default_sample_size) = self.default_sample_size {
            stream.write_u32(default_sample_size);
        }

        if let Some(default_sample_flags) = self.default_sample_flags {
            stream.write_u32(default_sample_flags);
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let header = FullBoxHeader::parse(stream)?;
        let flags = TrackFragmentHeaderFlags::from_bits_truncate(header.flags);

        let track_id = stream.read_u32()?;

        let base_data_offset = if flags.contains(TrackFragmentHeaderFlags::BASE_DATA_OFFSET_PRESENT)
        {
            Some(stream.read_u64()?)
        } else {
            None
        };

        let sample_description_index =
            if flags.contains(TrackFragmentHeaderFlags::SAMPLE_DESCRIPTION_INDEX_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

        let default_sample_duration =
            if flags.contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

        let default_sample_size =
            if flags.contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_SIZE_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

        let default_sample_flags =
            if flags.contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_FLAGS_PRESENT) {
                Some(stream.read_u32()?)
            } else {
                None
            };

        Ok(TrackFragmentHeaderBox {
            track_id,
            base_data_offset,
            sample_description_index,
            default_sample_duration,
            default_sample_size,
            default_sample_flags,
            duration_is_empty: flags.contains(TrackFragmentHeaderFlags::DURATION_IS_EMPTY),
            default_base_is_moof: flags.contains(TrackFragmentHeaderFlags::DEFAULT_BASE_IS_MOOF),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_present_fields() {
        let mut tfhd = TrackFragmentHeaderBox::with_default_base(1);
        tfhd.default_sample_duration = Some(512);

        let flags = tfhd.flags_from_fields();
        assert!(flags.contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT));
        assert!(flags.contains(TrackFragmentHeaderFlags::DEFAULT_BASE_IS_MOOF));
        assert!(!flags.contains(TrackFragmentHeaderFlags::BASE_DATA_OFFSET_PRESENT));

        let mut stream = BitStream::from(tfhd.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, TrackFragmentHeaderBox::NAME);
        assert_eq!(
            TrackFragmentHeaderBox::parse_box_contents(&mut contents).unwrap(),
            tfhd
        );
    }
}
