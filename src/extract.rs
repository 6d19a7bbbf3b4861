//! Subgraph extraction: breadth-limited neighborhoods around a
//! segment, and the organelle shortcuts built on the classifier.

use tracing::info;

use crate::error::Result;
use crate::gfa::Gfa;
use crate::optfields::OptFields;
use crate::stats::{graph_stats, OrganelleParams};

/// The subgraph within `iterations` undirected hops of a segment.
///
/// An unknown segment id is a hard error rather than an empty result,
/// since it is almost always a typo.
pub fn neighborhood<T: OptFields>(
    gfa: &Gfa<T>,
    seg_id: usize,
    iterations: u32,
) -> Result<Gfa<T>> {
    let (lookups, ungraph) = gfa.into_ungraph()?;
    let start = lookups.seg_id_to_node_index(seg_id)?;
    let segment_ids = ungraph.neighborhood(start, iterations, &lookups)?;
    info!(
        seg_id,
        iterations,
        segments = segment_ids.len(),
        "extracted neighborhood"
    );
    Ok(gfa.subgraph(&segment_ids))
}

/// The best organelle candidate component as its own GFA, or `None`
/// when no component qualifies.
pub fn organelle<T: OptFields>(
    gfa: &Gfa<T>,
    params: &OrganelleParams,
) -> Result<Option<Gfa<T>>> {
    let stats = graph_stats(gfa)?;
    let candidates = stats.candidates(params);
    match candidates.first() {
        Some(stat) => {
            info!(
                component = stat.index,
                segments = stat.segments.len(),
                total_seq_len = stat.total_seq_len,
                "extracting organelle candidate"
            );
            Ok(Some(gfa.subgraph(&stat.segments)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AsmError;
    use crate::gfa::{Link, Orientation, Segment};
    use crate::stats::{OrganelleParams, OutlierDirection};

    fn chain() -> Gfa<()> {
        let mut gfa: Gfa<()> = Gfa::new();
        for (name, seq) in
            [(1usize, &b"ACGT"[..]), (2, b"GGGG"), (3, b"TTTT"), (4, b"CCCC")]
        {
            gfa.segments.push(Segment::new(name, seq));
        }
        for (from, to) in [(1, 2), (2, 3), (3, 4)] {
            gfa.links.push(Link::new(
                from,
                Orientation::Forward,
                to,
                Orientation::Forward,
                b"0M",
            ));
        }
        gfa
    }

    #[test]
    fn neighborhood_is_breadth_limited() {
        let sub = neighborhood(&chain(), 1, 2).unwrap();
        let names: Vec<usize> = sub.segments.iter().map(|s| s.name).collect();
        assert_eq!(names, vec![1, 2, 3]);
        // the 3 -> 4 link lost an endpoint
        assert_eq!(sub.links.len(), 2);
    }

    #[test]
    fn unknown_segment_is_an_error() {
        let err = neighborhood(&chain(), 99, 1).unwrap_err();
        assert!(matches!(err, AsmError::Lookup(_)));
    }

    #[test]
    fn organelle_extracts_the_circular_component() {
        // a chain plus a separate 2-node cycle
        let mut gfa = chain();
        gfa.segments.push(Segment::new(10, b"ACGTACGT"));
        gfa.segments.push(Segment::new(11, b"TTGGCCAA"));
        gfa.links.push(Link::new(
            10,
            Orientation::Forward,
            11,
            Orientation::Forward,
            b"0M",
        ));
        gfa.links.push(Link::new(
            11,
            Orientation::Forward,
            10,
            Orientation::Forward,
            b"0M",
        ));

        let params = OrganelleParams {
            expected_size: 16,
            sigma: 0.5,
            direction: OutlierDirection::Either,
            max_nodes: 30,
            max_edges: 60,
        };
        let sub = organelle(&gfa, &params).unwrap().unwrap();
        let names: Vec<usize> = sub.segments.iter().map(|s| s.name).collect();
        assert_eq!(names, vec![10, 11]);
    }
}
