//! Overlap inspection: the actual sequence around each link's
//! junction, and coverage normalized against the graph-wide mean.

use bstr::BString;
use fnv::FnvHashMap;
use std::io::Write;
use tracing::debug;

use crate::error::Result;
use crate::gfa::{Gfa, Orientation};
use crate::graph::GraphLookups;
use crate::optfields::OptFields;
use crate::util::reverse_complement;

/// The sequence context of one link. Four slots, one per segment end
/// and orientation; only the two slots the link's orientations realize
/// are populated.
///
/// The from-side slot holds the suffix of the (oriented) from-sequence
/// covering the overlap plus the extension; the to-side slot holds the
/// extension immediately after the overlap in the (oriented)
/// to-sequence, so concatenating the populated slots reads through the
/// junction without duplicating the overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapRecord {
    pub from_segment: usize,
    pub from_orient: Orientation,
    pub to_segment: usize,
    pub to_orient: Orientation,
    pub overlap_len: usize,
    pub from_forward: Option<BString>,
    pub from_reverse: Option<BString>,
    pub to_forward: Option<BString>,
    pub to_reverse: Option<BString>,
}

impl OverlapRecord {
    /// The populated slots concatenated in from-then-to order.
    pub fn sequence(&self) -> BString {
        let mut out = BString::from("");
        for slot in [
            &self.from_forward,
            &self.from_reverse,
            &self.to_forward,
            &self.to_reverse,
        ]
        .into_iter()
        .flatten()
        {
            out.extend_from_slice(slot);
        }
        out
    }
}

/// All overlap records of a GFA, in link order.
#[derive(Debug, Clone, Default)]
pub struct Overlaps {
    records: Vec<OverlapRecord>,
    extend: usize,
}

impl Overlaps {
    pub fn records(&self) -> &[OverlapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the records as fasta, one record per link, the header
    /// naming the oriented endpoints and the extension.
    pub fn write_fasta<W: Write>(&self, writer: &mut W) -> Result<()> {
        for record in &self.records {
            writeln!(
                writer,
                ">{}({})->{}({}): extend = {}\n{}",
                record.from_segment,
                record.from_orient,
                record.to_segment,
                record.to_orient,
                self.extend,
                record.sequence(),
            )?;
        }
        Ok(())
    }
}

/// Oriented view of a segment's sequence.
fn oriented(sequence: &[u8], orient: Orientation) -> Vec<u8> {
    match orient {
        Orientation::Forward => sequence.to_vec(),
        Orientation::Backward => reverse_complement(sequence),
    }
}

/// The suffix covering the final `overlap + extend` bases, the whole
/// sequence if it is shorter than that.
fn junction_suffix(sequence: &[u8], overlap: usize, extend: usize) -> BString {
    let start = sequence.len().saturating_sub(overlap + extend);
    BString::from(&sequence[start..])
}

/// The `extend` bases immediately after the first `overlap`, truncated
/// at the end of the sequence.
fn junction_prefix(sequence: &[u8], overlap: usize, extend: usize) -> BString {
    let start = overlap.min(sequence.len());
    let end = (overlap + extend).min(sequence.len());
    BString::from(&sequence[start..end])
}

impl<T: OptFields> Gfa<T> {
    /// One [`OverlapRecord`] per link, extending `extend` bases past
    /// the overlap on both sides. Sequences saturate at their ends
    /// rather than failing; a link endpoint with no segment line
    /// contributes an empty slot.
    pub fn make_overlaps(&self, extend: usize) -> Result<Overlaps> {
        let mut records = Vec::with_capacity(self.links.len());

        for link in &self.links {
            let overlap = link
                .overlap_len()
                .map_err(crate::parser::ParseError::from)?;

            let from_seq = self
                .segment(link.from_segment)
                .map(|s| oriented(&s.sequence, link.from_orient))
                .unwrap_or_default();
            let to_seq = self
                .segment(link.to_segment)
                .map(|s| oriented(&s.sequence, link.to_orient))
                .unwrap_or_default();

            let from_slot = junction_suffix(&from_seq, overlap, extend);
            let to_slot = junction_prefix(&to_seq, overlap, extend);

            let (from_forward, from_reverse) = match link.from_orient {
                Orientation::Forward => (Some(from_slot), None),
                Orientation::Backward => (None, Some(from_slot)),
            };
            let (to_forward, to_reverse) = match link.to_orient {
                Orientation::Forward => (Some(to_slot), None),
                Orientation::Backward => (None, Some(to_slot)),
            };

            records.push(OverlapRecord {
                from_segment: link.from_segment,
                from_orient: link.from_orient,
                to_segment: link.to_segment,
                to_orient: link.to_orient,
                overlap_len: overlap,
                from_forward,
                from_reverse,
                to_forward,
                to_reverse,
            });
        }

        debug!(links = records.len(), extend, "computed overlap records");
        Ok(Overlaps { records, extend })
    }
}

/// Per-segment coverage divided by the graph-wide mean coverage, keyed
/// by segment id. Useful for spotting repeat or organelle segments,
/// which sit well above or below 1.0.
pub fn relative_coverage(lookups: &GraphLookups) -> FnvHashMap<usize, f64> {
    let mean = lookups.mean_coverage();
    lookups
        .records()
        .iter()
        .map(|r| {
            let rel = if mean == 0.0 { 0.0 } else { r.coverage / mean };
            (r.seg_id, rel)
        })
        .collect()
}
