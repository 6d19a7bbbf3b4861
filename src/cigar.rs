use bytemuck::{Contiguous, Pod, Zeroable};

use nom::{bytes::complete::*, IResult};

use crate::parser::ParseFieldError;

/// The alignment operations allowed in a GFA overlap field.
#[repr(u8)]
#[derive(
    Contiguous, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum CigarOp {
    M = 0,
    I = 1,
    D = 2,
    N = 3,
    S = 4,
    H = 5,
    P = 6,
    E = 7,
    X = 8,
}

impl CigarOp {
    fn from_u8_byte(value: u8) -> Option<Self> {
        Self::from_integer(value)
    }

    fn to_u8_char(self) -> u8 {
        use CigarOp::*;
        match self {
            M => b'M',
            I => b'I',
            D => b'D',
            N => b'N',
            S => b'S',
            H => b'H',
            P => b'P',
            E => b'=',
            X => b'X',
        }
    }

    /// Match operators are the only ones that contribute to the
    /// overlap length between two linked segments.
    #[inline]
    pub fn is_match(&self) -> bool {
        use CigarOp::*;
        matches!(self, M | E | X)
    }
}

impl std::fmt::Display for CigarOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(self.to_u8_char()))
    }
}

/// A single CIGAR op + length packed into a u32.
#[repr(transparent)]
#[derive(
    Zeroable, Pod, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct CigarPair(u32);

#[allow(clippy::len_without_is_empty)]
impl CigarPair {
    pub fn new(len: u32, op: CigarOp) -> Option<Self> {
        if len < (1 << 28) {
            Some(CigarPair((len << 4) | (op as u32)))
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.0 >> 4
    }

    #[inline]
    pub fn op(&self) -> CigarOp {
        let op = (self.0 & 0xF) as u8;
        CigarOp::from_u8_byte(op).unwrap()
    }

    pub fn into_pair(&self) -> (u32, CigarOp) {
        (self.len(), self.op())
    }
}

impl std::fmt::Display for CigarPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.len(), self.op())
    }
}

/// A compact alignment string, e.g. `20M2I3M`.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cigar(pub Vec<CigarPair>);

impl Cigar {
    fn parse_op_cmd(input: &[u8]) -> IResult<&[u8], CigarOp> {
        use nom::{branch::alt, combinator::map};
        use CigarOp::*;
        alt((
            map(tag("M"), |_| M),
            map(tag("I"), |_| I),
            map(tag("D"), |_| D),
            map(tag("N"), |_| N),
            map(tag("S"), |_| S),
            map(tag("H"), |_| H),
            map(tag("P"), |_| P),
            map(tag("="), |_| E),
            map(tag("X"), |_| X),
        ))(input)
    }

    fn parser_bytestring(i: &[u8]) -> IResult<&[u8], Self> {
        use nom::{
            character::complete::digit1,
            combinator::{map, map_res},
            multi::many1,
            sequence::pair,
        };
        map(
            many1(map_res(
                pair(
                    map_res(digit1, |bs: &[u8]| {
                        // digit1 guarantees ASCII digits
                        let s = unsafe { std::str::from_utf8_unchecked(bs) };
                        s.parse::<u32>()
                    }),
                    Self::parse_op_cmd,
                ),
                // counts past the packed-pair limit are malformed, not
                // silently truncated
                |(len, op)| {
                    CigarPair::new(len, op).ok_or(ParseFieldError::CigarError)
                },
            )),
            Cigar,
        )(i)
    }

    /// Parse a Cigar from an ASCII byte slice. The entire input must
    /// consist of `<count><operator>` tokens; trailing garbage is an
    /// error.
    pub fn from_bytestring(i: &[u8]) -> Result<Self, ParseFieldError> {
        match Self::parser_bytestring(i) {
            Ok((rest, cg)) if rest.is_empty() => Ok(cg),
            _ => Err(ParseFieldError::CigarError),
        }
    }

    /// Total length over all operations.
    pub fn len(&self) -> usize {
        self.0.iter().fold(0, |s, pair| s + pair.len() as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The summed length of the match operations only. This is the
    /// number of contiguous matched bases shared by the two segments
    /// of a link, and so the number of bases to trim at a junction.
    pub fn match_len(&self) -> usize {
        self.0
            .iter()
            .filter(|pair| pair.op().is_match())
            .fold(0, |s, pair| s + pair.len() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, CigarOp)> + '_ {
        self.0.iter().map(CigarPair::into_pair)
    }
}

impl std::fmt::Display for Cigar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for pair in self.0.iter() {
            write!(f, "{}", pair)?
        }
        Ok(())
    }
}

/// Parse a GFA overlap field into an overlap length in bases.
///
/// Only match operators (`M`, `=`, `X`) contribute; insertions and the
/// rest are skipped. A `*` (unspecified overlap) counts as zero.
pub fn parse_overlap(overlap: &[u8]) -> Result<usize, ParseFieldError> {
    if overlap == b"*" {
        return Ok(0);
    }
    let cigar = Cigar::from_bytestring(overlap)?;
    Ok(cigar.match_len())
}
