use four_cc::FourCC;

use crate::{BitStream, Mp4Box, Mp4BoxError, UnknownBox};

use super::{
    ChunkLargeOffsetBox, CompositionOffsetBox, SampleDescriptionBox, SampleSizeBox,
    SampleToChunkBox, SyncSampleBox, TimeToSampleBox,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTableBox {
    pub stsd: SampleDescriptionBox,
    pub stts: TimeToSampleBox,
    pub ctts: Option<CompositionOffsetBox>,
    pub stss: Option<SyncSampleBox>,
    pub stsc: SampleToChunkBox,
    pub stsz: SampleSizeBox,
    pub co64: ChunkLargeOffsetBox,
    pub unknown: Vec<UnknownBox>,
}

impl SampleTableBox {
    pub fn new(
        stsd: SampleDescriptionBox,
        stts: TimeToSampleBox,
        stsc: SampleToChunkBox,
        stsz: SampleSizeBox,
        co64: ChunkLargeOffsetBox,
    ) -> Self {
        SampleTableBox {
            stsd,
            stts,
            ctts: None,
            stss: None,
            stsc,
            stsz,
            co64,
            unknown: Vec::new(),
        }
    }

    /// An empty sample table, as used by the tracks of a fragmented init
    /// segment: all sample information lives in the movie fragments.
    pub fn empty(stsd: SampleDescriptionBox) -> Self {
        SampleTableBox::new(
            stsd,
            TimeToSampleBox::new(Vec::new()),
            SampleToChunkBox::new(Vec::new()),
            SampleSizeBox::new(Vec::new()),
            ChunkLargeOffsetBox::new(Vec::new()),
        )
    }
}

impl Mp4Box for SampleTableBox {
    const NAME: FourCC = FourCC(*b"stbl");

    fn content_size(&self) -> u64 {
        let mut size = self.stsd.total_size()
            + self.stts.total_size()
            + self.stsc.total_size()
            + self.stsz.total_size()
            + self.co64.total_size();

        if let Some(ctts) = &self.ctts {
            size += ctts.total_size();
        }

        if let Some(stss) = &self.stss {
            size += stss.total_size();
        }

        for unknown in &self.unknown {
            size += unknown.total_size();
        }

        size
    }

    fn write_box_contents(&self, stream: &mut BitStream) -> Result<(), Mp4BoxError> {
        self.stsd.write(stream)?;
        self.stts.write(stream)?;

        if let Some(ctts) = &self.ctts {
            ctts.write(stream)?;
        }

        if let Some(stss) = &self.stss {
            stss.write(stream)?;
        }

        self.stsc.write(stream)?;
        self.stsz.write(stream)?;
        self.co64.write(stream)?;

        for unknown in &self.unknown {
            unknown.write(stream)?;
        }

        Ok(())
    }

    fn parse_box_contents(stream: &mut BitStream) -> Result<Self, Mp4BoxError> {
        let mut stsd = None;
        let mut stts = None;
        let mut ctts = None;
        let mut stss = None;
        let mut stsc = None;
        let mut stsz = None;
        let mut co64 = None;
        let mut unknown = Vec::new();

        while stream.bytes_left() > 0 {
            let (name, mut contents) = stream.read_sub_box()?;
            match &name.0 {
                b"stsd" => stsd = Some(SampleDescriptionBox::parse_box_contents(&mut contents)?),
                b"stts" => stts = Some(TimeToSampleBox::parse_box_contents(&mut contents)?),
                b"ctts" => ctts = Some(CompositionOffsetBox::parse_box_contents(&mut contents)?),
                b"stss" => stss = Some(SyncSampleBox::parse_box_contents(&mut contents)?),
                b"stsc" => stsc = Some(SampleToChunkBox::parse_box_contents(&mut contents)?),
                b"stsz" => stsz = Some(SampleSizeBox::parse_box_contents(&mut contents)?),
                b"co64" => co64 = Some(ChunkLargeOffsetBox::parse_box_contents(&mut contents)?),
                b"stco" => {
                    co64 = Some(ChunkLargeOffsetBox::parse_stco_box_contents(&mut contents)?)
                }
                _ => {
                    tracing::warn!("skipping unknown box '{}' in 'stbl'", name);
                    unknown.push(UnknownBox::parse(name, &mut contents));
                }
            }
        }

        let missing = |child: FourCC| Mp4BoxError::MissingChild {
            parent: Self::NAME,
            child,
        };

        Ok(SampleTableBox {
            stsd: stsd.ok_or_else(|| missing(SampleDescriptionBox::NAME))?,
            stts: stts.ok_or_else(|| missing(TimeToSampleBox::NAME))?,
            ctts,
            stss,
            stsc: stsc.ok_or_else(|| missing(SampleToChunkBox::NAME))?,
            stsz: stsz.ok_or_else(|| missing(SampleSizeBox::NAME))?,
            co64: co64.ok_or_else(|| missing(ChunkLargeOffsetBox::NAME))?,
            unknown,
        })
    }
}
