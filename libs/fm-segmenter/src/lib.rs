use std::{cmp::Ordering, fmt, io, ops};

mod fragment;
mod segmenter;
mod track;
mod writer;

pub use fragment::*;
pub use segmenter::*;
pub use track::*;
pub use writer::*;

#[derive(Debug, thiserror::Error)]
pub enum SegmenterError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("segment index writer misuse: {0}")]
    InvalidState(&'static str),
    #[error("cannot build sample entry for track {track_id}: {reason}")]
    SampleEntry { track_id: u32, reason: &'static str },
    #[error(transparent)]
    Box(#[from] fm_isobmff::Mp4BoxError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A timescale in ticks per second, e.g. 90000/1 for common video tracks.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Fraction {
            numerator,
            denominator,
        }
    }

    pub fn simplify(&self) -> Fraction {
        use gcd::Gcd;

        let divisor = self.numerator.gcd(self.denominator);

        Fraction::new(self.numerator / divisor, self.denominator / divisor)
    }

    /// The integer ticks-per-second a container header can declare for
    /// this timescale: the numerator of the reduced fraction. Every tick
    /// value must be computed against this same lifted scale, so a
    /// 30000/1001 track declares 30000 and one frame of 1001/30000 s
    /// lasts exactly 1001 ticks.
    pub fn integer_timescale(&self) -> Fraction {
        Fraction::new(self.simplify().numerator, 1)
    }

    pub fn decimal(&self) -> f32 {
        self.numerator as f32 / self.denominator as f32
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl fmt::Debug for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Exact time as a signed rational. All arithmetic stays in integers so
/// timestamps never drift, no matter how timescales mix.
///
/// Comparison and equality are by value: 10/30 == 1/3.
#[derive(Copy, Clone)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0);

        if den < 0 {
            Rational {
                num: -num,
                den: -den,
            }
        } else {
            Rational { num, den }
        }
    }

    pub fn reduce(self) -> Rational {
        use gcd::Gcd;

        let divisor = (self.num.unsigned_abs()).gcd(self.den.unsigned_abs()) as i64;
        if divisor == 0 {
            return Rational::new(0, 1);
        }

        Rational::new(self.num / divisor, self.den / divisor)
    }

    /// Converts into integer ticks of the given timescale, truncating
    /// toward zero.
    pub fn to_ticks(self, timescale: Fraction) -> i64 {
        let num = self.num as i128 * timescale.numerator as i128;
        let den = self.den as i128 * timescale.denominator as i128;

        (num / den) as i64
    }

    pub fn is_positive(self) -> bool {
        self.num > 0
    }

    pub fn is_negative(self) -> bool {
        self.num < 0
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Rational) -> bool {
        self.num as i128 * other.den as i128 == other.num as i128 * self.den as i128
    }
}

impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Rational) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;

        lhs.cmp(&rhs)
    }
}

fn lcm(a: i64, b: i64) -> i64 {
    use gcd::Gcd;

    let divisor = (a.unsigned_abs()).gcd(b.unsigned_abs()) as i64;

    a / divisor * b
}

impl ops::Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        let den = lcm(self.den, rhs.den);

        Rational::new(self.num * (den / self.den) + rhs.num * (den / rhs.den), den)
    }
}

impl ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        let den = lcm(self.den, rhs.den);

        Rational::new(self.num * (den / self.den) - rhs.num * (den / rhs.den), den)
    }
}

impl ops::AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl ops::SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Rational) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_arithmetic_shares_denominators() {
        let sum = Rational::new(1, 30) + Rational::new(1, 25);
        assert_eq!(sum, Rational::new(11, 150));

        let mut acc = Rational::ZERO;
        for _ in 0..30 {
            acc += Rational::new(1, 30);
        }
        assert_eq!(acc, Rational::new(1, 1));
    }

    #[test]
    fn rational_compares_by_value() {
        assert_eq!(Rational::new(10, 30), Rational::new(1, 3));
        assert!(Rational::new(9, 30) < Rational::new(1, 3));
        assert!(Rational::new(11, 30) > Rational::new(1, 3));
        assert!(Rational::new(-1, 2) < Rational::ZERO);
        assert_eq!(Rational::new(1, -2), Rational::new(-1, 2));
    }

    #[test]
    fn rational_reduces_to_lowest_terms() {
        let reduced = Rational::new(10, 30).reduce();
        assert_eq!(reduced.num, 1);
        assert_eq!(reduced.den, 3);

        let reduced = Rational::new(-30_000, 90_000).reduce();
        assert_eq!(reduced.num, -1);
        assert_eq!(reduced.den, 3);
    }

    #[test]
    fn ticks_truncate_toward_zero() {
        let timescale = Fraction::new(90_000, 1);
        assert_eq!(Rational::new(1, 3).to_ticks(timescale), 30_000);
        assert_eq!(Rational::new(1, 7).to_ticks(timescale), 12_857);
        assert_eq!(Rational::new(-1, 7).to_ticks(timescale), -12_857);
    }

    #[test]
    fn fraction_simplifies() {
        let fraction = Fraction::new(30_000, 1001).simplify();
        assert_eq!(fraction.numerator, 30_000);
        assert_eq!(fraction.denominator, 1001);

        let fraction = Fraction::new(48_000, 2).simplify();
        assert_eq!(fraction.numerator, 24_000);
        assert_eq!(fraction.denominator, 1);
    }

    #[test]
    fn integer_timescale_lifts_rational_scales() {
        let timescale = Fraction::new(30_000, 1001).integer_timescale();
        assert_eq!(timescale.numerator, 30_000);
        assert_eq!(timescale.denominator, 1);
        // one NTSC frame lands on an exact tick count in the lifted scale
        assert_eq!(Rational::new(1001, 30_000).to_ticks(timescale), 1001);

        let timescale = Fraction::new(48_000, 2).integer_timescale();
        assert_eq!(timescale.numerator, 24_000);
        assert_eq!(timescale.denominator, 1);
    }
}
