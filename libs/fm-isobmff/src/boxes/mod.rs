mod avc1;
mod avcc;
mod co64;
mod ctts;
mod dinf;
mod dref;
mod edts;
mod esds;
mod ftyp;
mod hdlr;
mod mdhd;
mod mdia;
mod mehd;
mod mfhd;
mod minf;
mod moof;
mod moov;
mod mp4a;
mod mvex;
mod mvhd;
mod nmhd;
mod sidx;
mod smhd;
mod stbl;
mod stsc;
mod stsd;
mod stss;
mod stsz;
mod stts;
mod styp;
mod tfdt;
mod tfhd;
mod tkhd;
mod traf;
mod trak;
mod trex;
mod trun;
mod url;
mod vmhd;

pub use self::{
    avc1::*, avcc::*, co64::*, ctts::*, dinf::*, dref::*, edts::*, esds::*, ftyp::*, hdlr::*,
    mdhd::*, mdia::*, mehd::*, mfhd::*, minf::*, moof::*, moov::*, mp4a::*, mvex::*, mvhd::*,
    nmhd::*, sidx::*, smhd::*, stbl::*, stsc::*, stsd::*, stss::*, stsz::*, stts::*, styp::*,
    tfdt::*, tfhd::*, tkhd::*, traf::*, trak::*, trex::*, trun::*, url::*, vmhd::*,
};
