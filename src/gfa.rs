//! The GFA line types and the [`Gfa`] container used throughout the
//! toolkit. Segment names are parsed as `usize`, which is what the
//! assemblers this tool targets emit.

pub mod orientation;

pub use self::orientation::*;

use crate::cigar::parse_overlap;
use crate::optfields::*;
use crate::parser::ParseFieldError;
use crate::util::gc_content;

use bstr::BString;

/// Tags under which assemblers write per-segment read coverage.
const SEGMENT_COVERAGE_TAGS: &[&[u8]] = &[b"ll", b"dp", b"rc", b"RC"];
/// Tags under which per-link (edge) coverage appears.
const LINK_COVERAGE_TAGS: &[&[u8]] = &[b"ec", b"RC"];

/// Coverage used when a record carries no coverage tag at all.
pub const NEUTRAL_COVERAGE: f64 = 1.0;

/// Simple representation of a parsed GFA file, using a Vec<T> to
/// store each separate GFA line type.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Gfa<T: OptFields> {
    pub header: Header<T>,
    pub segments: Vec<Segment<T>>,
    pub links: Vec<Link<T>>,
    pub paths: Vec<GfaPath<T>>,
}

/// Enum containing the different kinds of GFA lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<T: OptFields> {
    Header(Header<T>),
    Segment(Segment<T>),
    Link(Link<T>),
    Path(GfaPath<T>),
}

impl<T: OptFields> Gfa<T> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert a GFA line (wrapped in the Line enum) into an existing
    /// Gfa. Simply pushes it into the corresponding Vec, or replaces
    /// the header; there's no deduplication or sorting taking place.
    pub fn insert_line(&mut self, line: Line<T>) {
        use Line::*;
        match line {
            Header(h) => self.header = h,
            Segment(s) => self.segments.push(s),
            Link(l) => self.links.push(l),
            Path(p) => self.paths.push(p),
        }
    }

    /// Find a segment by name.
    pub fn segment(&self, name: usize) -> Option<&Segment<T>> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// A new Gfa containing only the elements that reference the given
    /// segment names: matching segments, links with both endpoints in
    /// the set, and paths visiting at least one member.
    pub fn subgraph(&self, segment_names: &[usize]) -> Gfa<T> {
        let segments = self
            .segments
            .iter()
            .filter(|s| segment_names.contains(&s.name))
            .cloned()
            .collect();

        let links = self
            .links
            .iter()
            .filter(|l| {
                segment_names.contains(&l.from_segment)
                    && segment_names.contains(&l.to_segment)
            })
            .cloned()
            .collect();

        let paths: Vec<_> = self
            .paths
            .iter()
            .filter(|p| {
                p.segment_names
                    .iter()
                    .any(|(s, _)| segment_names.contains(s))
            })
            .cloned()
            .collect();

        Gfa {
            header: self.header.clone(),
            segments,
            links,
            paths,
        }
    }
}

/// The header line of a GFA file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header<T: OptFields> {
    pub version: Option<BString>,
    pub optional: T,
}

impl<T: OptFields> Default for Header<T> {
    fn default() -> Self {
        Header {
            version: Some("1.0".into()),
            optional: Default::default(),
        }
    }
}

/// A segment in a GFA graph.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Segment<T: OptFields> {
    pub name: usize,
    pub sequence: BString,
    pub optional: T,
}

impl<T: OptFields> Segment<T> {
    pub fn new(name: usize, sequence: &[u8]) -> Self {
        Segment {
            name,
            sequence: BString::from(sequence),
            optional: Default::default(),
        }
    }

    /// Sequence length in bases.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Read coverage from the segment's tags, or the neutral default
    /// when no recognized tag is present.
    pub fn coverage(&self) -> f64 {
        self.optional
            .first_numeric(SEGMENT_COVERAGE_TAGS)
            .unwrap_or(NEUTRAL_COVERAGE)
    }

    /// GC fraction of the sequence.
    pub fn gc(&self) -> f64 {
        gc_content(&self.sequence)
    }
}

/// A link between two oriented segment ends, annotated with an
/// overlap.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Link<T: OptFields> {
    pub from_segment: usize,
    pub from_orient: Orientation,
    pub to_segment: usize,
    pub to_orient: Orientation,
    pub overlap: BString,
    pub optional: T,
}

impl<T: OptFields> Link<T> {
    pub fn new(
        from_segment: usize,
        from_orient: Orientation,
        to_segment: usize,
        to_orient: Orientation,
        overlap: &[u8],
    ) -> Link<T> {
        Link {
            from_segment,
            from_orient,
            to_segment,
            to_orient,
            overlap: overlap.into(),
            optional: Default::default(),
        }
    }

    /// The overlap length in bases, derived from the CIGAR overlap
    /// field. Only match operators contribute.
    pub fn overlap_len(&self) -> Result<usize, ParseFieldError> {
        parse_overlap(&self.overlap)
    }

    /// Edge coverage from the link's tags, if any.
    pub fn coverage(&self) -> Option<f64> {
        self.optional.first_numeric(LINK_COVERAGE_TAGS)
    }
}

/// A named walk over oriented segments.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct GfaPath<T: OptFields> {
    pub path_name: BString,
    pub segment_names: Vec<(usize, Orientation)>,
    pub overlaps: Vec<BString>,
    pub optional: T,
}

impl<T: OptFields> GfaPath<T> {
    pub fn new(
        path_name: BString,
        segment_names: Vec<(usize, Orientation)>,
        overlaps: Vec<BString>,
        optional: T,
    ) -> Self {
        GfaPath {
            path_name,
            segment_names,
            overlaps,
            optional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_component_gfa() -> Gfa<()> {
        let mut gfa: Gfa<()> = Gfa::new();
        gfa.segments.push(Segment::new(1, b"ACGT"));
        gfa.segments.push(Segment::new(2, b"GGGG"));
        gfa.segments.push(Segment::new(3, b"TTTT"));
        gfa.links.push(Link::new(
            1,
            Orientation::Forward,
            2,
            Orientation::Forward,
            b"2M",
        ));
        gfa.links.push(Link::new(
            2,
            Orientation::Forward,
            3,
            Orientation::Forward,
            b"1M",
        ));
        gfa
    }

    #[test]
    fn subgraph_filters_links_consistently() {
        let gfa = two_component_gfa();
        let sub = gfa.subgraph(&[1, 2]);
        assert_eq!(sub.segments.len(), 2);
        // the 2->3 link loses an endpoint and must go
        assert_eq!(sub.links.len(), 1);
        assert_eq!(sub.links[0].from_segment, 1);
    }

    #[test]
    fn coverage_defaults_to_neutral() {
        let seg: Segment<OptionalFields> = Segment::new(1, b"ACGT");
        assert_eq!(seg.coverage(), NEUTRAL_COVERAGE);

        let mut seg = seg;
        seg.optional = OptFields::parse(vec![&b"ll:f:12.5"[..]]);
        assert_eq!(seg.coverage(), 12.5);
    }

    #[test]
    fn link_overlap_length() {
        let link: Link<()> =
            Link::new(1, Orientation::Forward, 2, Orientation::Backward, b"5M3I2M");
        assert_eq!(link.overlap_len().unwrap(), 7);
    }
}
