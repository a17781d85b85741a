use std::borrow::Cow;

pub use four_cc::FourCC;

mod bitstream;
mod boxes;

pub use bitstream::{BitStream, BoxHeader};
pub use boxes::*;

#[derive(Debug, thiserror::Error)]
pub enum Mp4BoxError {
    #[error("input ended in the middle of a field")]
    Truncated,
    #[error("'{parent}' is missing its mandatory '{child}' child")]
    MissingChild { parent: FourCC, child: FourCC },
    #[error("'{name}' declared {declared} bytes but serialized {written}")]
    SizeMismatch {
        name: FourCC,
        declared: u64,
        written: u64,
    },
    #[error("'{name}' version {version} is not supported")]
    UnsupportedVersion { name: FourCC, version: u8 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FullBoxHeader {
    pub version: u8,
    pub flags: u32,
}

impl FullBoxHeader {
    pub const SIZE: u64 = 4;

    pub fn new(version: u8, flags: u32) -> Self {
        FullBoxHeader { version, flags }
    }

    pub fn write(&self, stream: &mut BitStream) {
        stream.write_u8(self.version);
        stream.write_u24(self.flags);
    }

    pub fn parse(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let version = stream.read_u8()?;
        let flags = stream.read_u24()?;

        Ok(FullBoxHeader { version, flags })
    }
}

/// A trait interface for a MP4 box.
///
/// `write` and `parse_box_contents` are exact mirrors: whatever a box
/// serializes it must be able to read back into an equal value.
pub trait Mp4Box: Sized {
    const NAME: FourCC;

    fn full_box_header(&self) -> Option<FullBoxHeader> {
        None
    }

    fn flags(&self) -> Option<u32> {
        self.full_box_header().map(|h| h.flags)
    }

    /// The size of the contents of the box, excluding headers.
    fn content_size(&self) -> u64;

    fn total_size(&self) -> u64 {
        let mut payload = self.content_size();

        if self.full_box_header().is_some() {
            payload += FullBoxHeader::SIZE;
        }

        payload + bitstream::box_header_size(payload)
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError>;

    fn write(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        let start = stream.len();

        let mut payload = self.content_size();
        if self.full_box_header().is_some() {
            payload += FullBoxHeader::SIZE;
        }

        stream.write_box_headers(Self::NAME, payload);

        if let Some(header) = self.full_box_header() {
            header.write(stream);
        }

        self.write_box_contents(stream)?;

        let written = (stream.len() - start) as u64;
        if written != self.total_size() {
            return Err(Mp4BoxError::SizeMismatch {
                name: Self::NAME,
                declared: self.total_size(),
                written,
            });
        }

        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Mp4BoxError> {
        let mut stream = BitStream::new();
        self.write(&mut stream)?;

        Ok(stream.into_storage())
    }

    /// Parses the contents of the box from a stream bounded to its payload,
    /// as handed out by [`BitStream::read_sub_box`]. Full boxes consume
    /// their version and flags first.
    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError>;
}

/// A box this crate has no layout for. The raw payload is kept so that
/// containers holding vendor boxes survive a parse/write cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBox {
    pub name: FourCC,
    pub data: Vec<u8>,
}

impl UnknownBox {
    pub fn parse(name: FourCC, stream: &mut BitStream) -> Self {
        UnknownBox {
            name,
            data: stream.read_remaining(),
        }
    }

    pub fn total_size(&self) -> u64 {
        let payload = self.data.len() as u64;

        payload + bitstream::box_header_size(payload)
    }

    pub fn write(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_box_headers(self.name, self.data.len() as u64);
        stream.write_bytes(&self.data);

        Ok(())
    }
}

pub struct MediaDataBox<'a> {
    pub data: Cow<'a, [u8]>,
}

impl<'a> Mp4Box for MediaDataBox<'a> {
    const NAME: FourCC = FourCC(*b"mdat");

    fn content_size(&self) -> u64 {
        self.data.len() as _
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        stream.write_bytes(&self.data);

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        Ok(MediaDataBox {
            data: Cow::Owned(stream.read_remaining()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_box_survives_rewrite() {
        let boks = UnknownBox {
            name: FourCC(*b"xywz"),
            data: vec![1, 2, 3, 4, 5],
        };

        let mut stream = BitStream::new();
        boks.write(&mut stream).unwrap();
        assert_eq!(stream.len() as u64, boks.total_size());

        let mut stream = BitStream::from(stream.into_storage());
        let (name, mut contents) = stream.read_sub_box().unwrap();
        assert_eq!(name, FourCC(*b"xywz"));
        assert_eq!(UnknownBox::parse(name, &mut contents), boks);
    }

    #[test]
    fn size_mismatch_is_fatal() {
        struct Liar;

        impl Mp4Box for Liar {
            const NAME: FourCC = FourCC(*b"liar");

            fn content_size(&self) -> u64 {
                4
            }

            fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
                stream.write_u8(0);

                Ok(())
            }

            fn parse_box_contents(_stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
                Ok(Liar)
            }
        }

        let mut stream = BitStream::new();
        assert!(matches!(
            Liar.write(&mut stream),
            Err(Mp4BoxError::SizeMismatch { .. })
        ));
    }
}
