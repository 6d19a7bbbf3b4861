pub mod error;

pub use self::error::*;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bstr::{io::*, BString, ByteSlice};
use lazy_static::lazy_static;
use regex::bytes::Regex;

use crate::gfa::*;
use crate::optfields::OptFields;

/// Builder struct for GfaParsers.
#[derive(Debug, Default, Clone, Copy)]
pub struct GfaParserBuilder {
    pub tolerance: ParserTolerance,
}

impl GfaParserBuilder {
    pub fn ignore_errors(mut self) -> Self {
        self.tolerance = ParserTolerance::IgnoreAll;
        self
    }

    pub fn pedantic_errors(mut self) -> Self {
        self.tolerance = ParserTolerance::Pedantic;
        self
    }

    pub fn build<T: OptFields>(self) -> GfaParser<T> {
        GfaParser {
            tolerance: self.tolerance,
            _optional_fields: std::marker::PhantomData,
        }
    }
}

/// A line-oriented GFA1 parser, generic over the optional field
/// storage.
#[derive(Debug, Clone, Copy)]
pub struct GfaParser<T: OptFields> {
    tolerance: ParserTolerance,
    _optional_fields: std::marker::PhantomData<T>,
}

impl<T: OptFields> Default for GfaParser<T> {
    fn default() -> Self {
        GfaParserBuilder::default().build()
    }
}

impl<T: OptFields> GfaParser<T> {
    /// New parser with default tolerance: unknown line types and
    /// empty lines are skipped, anything else is fatal.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn parse_gfa_line(&self, bytes: &[u8]) -> GfaResult<Line<T>> {
        let line = bytes.trim_with(|c| c.is_ascii_whitespace());

        let mut fields = line.split_str(b"\t");
        let hdr = fields.next().ok_or(ParseError::EmptyLine)?;

        let invalid_line =
            |e: ParseFieldError| ParseError::invalid_line(e, bytes);

        let line = match hdr {
            b"H" => parse_header(&mut fields).map(Line::Header),
            b"S" => parse_segment(&mut fields).map(Line::Segment),
            b"L" => parse_link(&mut fields).map(Line::Link),
            b"P" => parse_path(&mut fields).map(Line::Path),
            _ => return Err(ParseError::UnknownLineType),
        };
        line.map_err(invalid_line)
    }

    /// Parse a whole Gfa from an iterator of lines, applying the
    /// parser's tolerance to per-line failures.
    pub fn parse_lines<I>(&self, lines: I) -> GfaResult<Gfa<T>>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut gfa = Gfa::new();

        for line in lines {
            match self.parse_gfa_line(line.as_ref()) {
                Ok(parsed) => gfa.insert_line(parsed),
                Err(err) if err.can_safely_continue(&self.tolerance) => (),
                Err(err) => return Err(err),
            }
        }

        Ok(gfa)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> GfaResult<Gfa<T>> {
        let file = File::open(path.as_ref())?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse a whole Gfa from a buffered reader, line by line.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> GfaResult<Gfa<T>> {
        let mut gfa = Gfa::new();

        for line in reader.byte_lines() {
            let line = line?;
            match self.parse_gfa_line(line.as_ref()) {
                Ok(parsed) => gfa.insert_line(parsed),
                Err(err) if err.can_safely_continue(&self.tolerance) => (),
                Err(err) => return Err(err),
            }
        }

        Ok(gfa)
    }
}

fn next_field<'a, I>(input: &mut I) -> GfaFieldResult<&'a [u8]>
where
    I: Iterator<Item = &'a [u8]>,
{
    input.next().ok_or(ParseFieldError::MissingFields)
}

fn parse_name<'a, I>(input: &mut I) -> GfaFieldResult<usize>
where
    I: Iterator<Item = &'a [u8]>,
{
    let field = next_field(input)?;
    field
        .to_str()
        .map_err(|_| ParseFieldError::UintIdError)?
        .parse::<usize>()
        .map_err(|_| ParseFieldError::UintIdError)
}

fn parse_sequence<'a, I>(input: &mut I) -> GfaFieldResult<BString>
where
    I: Iterator<Item = &'a [u8]>,
{
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?-u)^(\*|[A-Za-z=.]+)$").unwrap();
    }

    let field = next_field(input)?;
    if RE.is_match(field) {
        // `*` means the sequence is deferred; store it as empty
        if field == b"*" {
            Ok(BString::from(""))
        } else {
            Ok(BString::from(field))
        }
    } else {
        Err(ParseFieldError::InvalidField("Sequence"))
    }
}

fn parse_orientation<'a, I>(input: &mut I) -> GfaFieldResult<Orientation>
where
    I: Iterator<Item = &'a [u8]>,
{
    let field = next_field(input)?;
    Orientation::parse_error(Orientation::from_bytes_plus_minus(field))
}

fn parse_header<'a, T, I>(input: &mut I) -> GfaFieldResult<Header<T>>
where
    T: OptFields,
    I: Iterator<Item = &'a [u8]>,
{
    let fields: Vec<_> = input.collect();
    let version = fields
        .iter()
        .find(|f| f.starts_with(b"VN:Z:"))
        .map(|f| BString::from(&f[5..]));

    // the version lives in its own slot; keeping the VN field in the
    // optional storage too would make the writer emit it twice
    let optional =
        T::parse(fields.iter().filter(|f| !f.starts_with(b"VN:Z:")).copied());

    Ok(Header { version, optional })
}

fn parse_segment<'a, T, I>(input: &mut I) -> GfaFieldResult<Segment<T>>
where
    T: OptFields,
    I: Iterator<Item = &'a [u8]>,
{
    let name = parse_name(input)?;
    let sequence = parse_sequence(input)?;
    let optional = T::parse(input);
    Ok(Segment {
        name,
        sequence,
        optional,
    })
}

fn parse_link<'a, T, I>(input: &mut I) -> GfaFieldResult<Link<T>>
where
    T: OptFields,
    I: Iterator<Item = &'a [u8]>,
{
    let from_segment = parse_name(input)?;
    let from_orient = parse_orientation(input)?;
    let to_segment = parse_name(input)?;
    let to_orient = parse_orientation(input)?;
    let overlap = BString::from(next_field(input)?);
    let optional = T::parse(input);

    Ok(Link {
        from_segment,
        from_orient,
        to_segment,
        to_orient,
        overlap,
        optional,
    })
}

fn parse_path<'a, T, I>(input: &mut I) -> GfaFieldResult<GfaPath<T>>
where
    T: OptFields,
    I: Iterator<Item = &'a [u8]>,
{
    let path_name = BString::from(next_field(input)?);

    let mut segment_names = Vec::new();
    for step in next_field(input)?.split_str(b",") {
        if step.len() < 2 {
            return Err(ParseFieldError::InvalidField("SegmentNames"));
        }
        let (name, orient) = step.split_at(step.len() - 1);
        let orient =
            Orientation::parse_error(Orientation::from_bytes_plus_minus(orient))?;
        let name = name
            .to_str()
            .map_err(|_| ParseFieldError::UintIdError)?
            .parse::<usize>()
            .map_err(|_| ParseFieldError::UintIdError)?;
        segment_names.push((name, orient));
    }

    let overlaps = next_field(input)?
        .split_str(b",")
        .map(BString::from)
        .collect();

    let optional = T::parse(input);

    Ok(GfaPath {
        path_name,
        segment_names,
        overlaps,
        optional,
    })
}
