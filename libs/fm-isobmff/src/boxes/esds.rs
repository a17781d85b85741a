use four_cc::FourCC;

use crate::{BitStream, FullBoxHeader, Mp4Box, Mp4BoxError};

const ES_DESCRIPTOR_TAG: u8 = 0x03;
const DECODER_CONFIG_DESCRIPTOR_TAG: u8 = 0x04;
const DECODER_SPECIFIC_INFO_TAG: u8 = 0x05;
const SL_CONFIG_DESCRIPTOR_TAG: u8 = 0x06;

/// Minimal-length expandable size as used by MPEG-4 descriptors.
fn descriptor_header_size(payload: u64) -> u64 {
    let mut size_bytes = 1;
    let mut left = payload >> 7;
    while left > 0 {
        size_bytes += 1;
        left >>= 7;
    }

    1 + size_bytes
}

fn write_descriptor_header(stream: &mut BitStream, tag: u8, payload: u64) {
    stream.write_u8(tag);

    let size_bytes = descriptor_header_size(payload) - 1;
    for i in (0..size_bytes).rev() {
        let mut byte = ((payload >> (7 * i)) & 0x7f) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        stream.write_u8(byte);
    }
}

fn read_descriptor_header(stream: &mut BitStream) -> Result<(u8, u64), Mp4BoxError> {
    let tag = stream.read_u8()?;

    let mut size = 0u64;
    for _ in 0..4 {
        let byte = stream.read_u8()?;
        size = (size << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 == 0 {
            return Ok((tag, size));
        }
    }

    // a fifth continuation byte would overflow the 32-bit size the format allows
    Err(Mp4BoxError::Truncated)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSpecificInfo {
    pub data: Vec<u8>,
}

impl DecoderSpecificInfo {
    pub fn new(data: Vec<u8>) -> Self {
        DecoderSpecificInfo { data }
    }

    fn size(&self) -> u64 {
        descriptor_header_size(self.data.len() as u64) + self.data.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfigDescriptor {
    pub object_type_indication: u8,
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    pub decoder_specific_info: Option<DecoderSpecificInfo>,
}

impl DecoderConfigDescriptor {
    pub fn new(object_type_indication: u8, decoder_specific_info: Option<DecoderSpecificInfo>) -> Self {
        DecoderConfigDescriptor {
            object_type_indication,
            buffer_size_db: 0,
            max_bitrate: 0,
            avg_bitrate: 0,
            decoder_specific_info,
        }
    }

    fn payload_size(&self) -> u64 {
        let mut size = 1 + 1 + 3 + 4 + 4;

        if let Some(info) = &self.decoder_specific_info {
            size += info.size();
        }

        size
    }

    fn size(&self) -> u64 {
        descriptor_header_size(self.payload_size()) + self.payload_size()
    }

    fn write(&self, stream: &mut BitStream) {
        write_descriptor_header(stream, DECODER_CONFIG_DESCRIPTOR_TAG, self.payload_size());

        stream.write_u8(self.object_type_indication);
        stream.write_u8(0x05 << 2 | 1); // streamType AudioStream, reserved
        stream.write_u24(self.buffer_size_db);
        stream.write_u32(self.max_bitrate);
        stream.write_u32(self.avg_bitrate);

        if let Some(info) = &self.decoder_specific_info {
            write_descriptor_header(stream, DECODER_SPECIFIC_INFO_TAG, info.data.len() as u64);
            stream.write_bytes(&info.data);
        }
    }

    fn parse(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let object_type_indication = stream.read_u8()?;
        stream.skip_bytes(1)?; // streamType, upStream, reserved
        let buffer_size_db = stream.read_u24()?;
        let max_bitrate = stream.read_u32()?;
        let avg_bitrate = stream.read_u32()?;

        let mut decoder_specific_info = None;
        while stream.bytes_left() > 0 {
            let (tag, size) = read_descriptor_header(stream)?;
            if tag == DECODER_SPECIFIC_INFO_TAG {
                decoder_specific_info = Some(DecoderSpecificInfo {
                    data: stream.read_bytes(size)?,
                });
            } else {
                stream.skip_bytes(size)?;
            }
        }

        Ok(DecoderConfigDescriptor {
            object_type_indication,
            buffer_size_db,
            max_bitrate,
            avg_bitrate,
            decoder_specific_info,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsDescriptor {
    pub es_id: u16,
    pub decoder_config: DecoderConfigDescriptor,
}

impl EsDescriptor {
    pub fn new(es_id: u16, decoder_config: DecoderConfigDescriptor) -> Self {
        EsDescriptor {
            es_id,
            decoder_config,
        }
    }

    fn payload_size(&self) -> u64 {
        2 + 1 // ES_ID, flags
            + self.decoder_config.size()
            + descriptor_header_size(1) + 1 // SLConfigDescriptor
    }

    fn size(&self) -> u64 {
        descriptor_header_size(self.payload_size()) + self.payload_size()
    }

    fn write(&self, stream: &mut BitStream) {
        write_descriptor_header(stream, ES_DESCRIPTOR_TAG, self.payload_size());

        stream.write_u16(self.es_id);
        stream.write_u8(0); // no stream dependency, no URL, no OCR

        self.decoder_config.write(stream);

        write_descriptor_header(stream, SL_CONFIG_DESCRIPTOR_TAG, 1);
        stream.write_u8(0x02); // predefined: MP4
    }

    fn parse(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let es_id = stream.read_u16()?;
        let flags = stream.read_u8()?;
        if flags & 0x80 != 0 {
            stream.skip_bytes(2)?; // dependsOn_ES_ID
        }
        if flags & 0x40 != 0 {
            let url_len = stream.read_u8()?;
            stream.skip_bytes(url_len as u64)?;
        }
        if flags & 0x20 != 0 {
            stream.skip_bytes(2)?; // OCR_ES_ID
        }

        let mut decoder_config = None;
        while stream.bytes_left() > 0 {
            let (tag, size) = read_descriptor_header(stream)?;
            if tag == DECODER_CONFIG_DESCRIPTOR_TAG {
                let begin = stream.position();
                let mut contents = stream.extract(begin, begin + size)?;
                stream.skip_bytes(size)?;
                decoder_config = Some(DecoderConfigDescriptor::parse(&mut contents)?);
            } else {
                stream.skip_bytes(size)?;
            }
        }

        // an ES descriptor without a decoder config cannot describe a stream
        let decoder_config = decoder_config.ok_or(Mp4BoxError::Truncated)?;

        Ok(EsDescriptor {
            es_id,
            decoder_config,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsdBox {
    pub es: EsDescriptor,
}

impl EsdBox {
    pub fn new(es: EsDescriptor) -> Self {
        EsdBox { es }
    }
}

impl Mp4Box for EsdBox {
    const NAME: FourCC = FourCC(*b"esds");

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        self.es.size()
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.es.write(stream);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let _header = FullBoxHeader::parse(stream)?;

        let (tag, size) = read_descriptor_header(stream)?;
        if tag != ES_DESCRIPTOR_TAG {
            return Err(Mp4BoxError::Truncated);
        }

        let begin = stream.position();
        let mut contents = stream.extract(begin, begin + size)?;
        stream.skip_bytes(size)?;

        Ok(EsdBox {
            es: EsDescriptor::parse(&mut contents)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expandable_sizes_use_minimal_length() {
        assert_eq!(descriptor_header_size(0), 2);
        assert_eq!(descriptor_header_size(127), 2);
        assert_eq!(descriptor_header_size(128), 3);
        assert_eq!(descriptor_header_size(16_383), 3);
        assert_eq!(descriptor_header_size(16_384), 4);
    }

    #[test]
    fn multi_byte_sizes_parse_back(){
        let mut stream = BitStream::new();
        write_descriptor_header(&mut stream, DECODER_SPECIFIC_INFO_TAG, 300);
        let (tag, size) = read_descriptor_header(&mut stream).unwrap();
        assert_eq!(tag, DECODER_SPECIFIC_INFO_TAG);
        assert_eq!(size, 300);
    }

    #[test]
    fn round_trip() {
        let esds = EsdBox::new(EsDescriptor::new(
            2,
            DecoderConfigDescriptor::new(0x40, Some(DecoderSpecificInfo::new(vec![0x12, 0x10]))),
        ));

        let mut stream = BitStream::from(esds.to_bytes().unwrap());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, EsdBox::NAME);
        assert_eq!(EsdBox::parse_box_contents(&mut contents).unwrap(), esds);
    }
}
