//! Force a linear sequence through a GFA: enumerate candidate paths
//! between terminal nodes, pick the best one, and render it to fasta
//! with junction overlaps trimmed.

use bstr::BString;
use petgraph::graph::NodeIndex;
use tracing::{debug, info};

use crate::error::{AsmError, Result};
use crate::gfa::{Gfa, Orientation};
use crate::graph::paths::{
    all_pairs_paths, enumerate_paths, CandidatePath, SearchLimits,
};
use crate::graph::{AsmDigraph, GraphLookups};
use crate::optfields::OptFields;
use crate::util::reverse_complement;

/// Options for a linearization run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearOpts {
    pub limits: SearchLimits,
    /// Score candidate paths by cumulative coverage instead of
    /// rendered length.
    pub use_coverage: bool,
}

/// A chosen walk through the graph, rendered to sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPath {
    /// Oriented steps, in walk order.
    pub steps: Vec<(usize, Orientation)>,
    /// The rendered sequence: oriented segments concatenated, each
    /// junction trimmed by its declared overlap.
    pub sequence: BString,
}

impl LinearPath {
    /// Fasta header encoding the walk, e.g. `1+,2-,3+`.
    pub fn fasta_header(&self) -> String {
        self.steps
            .iter()
            .map(|(id, orient)| format!("{}{}", id, orient))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Pick the best path through the graph and render it.
///
/// Candidate endpoints are the in-degree-zero sources crossed with the
/// out-degree-zero sinks. A cyclic component has neither, so the
/// search falls back to every node pair sharing a component. Among
/// completed paths the greatest rendered length wins, first discovery
/// breaking ties; with coverage scoring enabled the greatest
/// cumulative coverage wins instead. Returns `None` when no path
/// completes.
pub fn linearize<T: OptFields>(
    gfa: &Gfa<T>,
    lookups: &GraphLookups,
    graph: &AsmDigraph,
    opts: &LinearOpts,
) -> Result<Option<LinearPath>> {
    let (sources, sinks) = graph.terminal_nodes();

    let mut candidates: Vec<CandidatePath> = Vec::new();
    let mut depth_capped = false;

    if sources.is_empty() || sinks.is_empty() {
        debug!("no terminal nodes; falling back to all node pairs");
        for (_, _, search) in all_pairs_paths(graph, &opts.limits) {
            depth_capped |= search.is_depth_capped();
            candidates.extend(search.into_paths());
        }
    } else {
        for &start in &sources {
            for &end in &sinks {
                let search = enumerate_paths(graph, start, end, &opts.limits);
                depth_capped |= search.is_depth_capped();
                candidates.extend(search.into_paths());
            }
        }
    }

    if depth_capped {
        debug!("some branches were truncated by the depth bound");
    }

    let mut best: Option<&CandidatePath> = None;
    for candidate in &candidates {
        let better = match best {
            None => true,
            Some(current) => {
                if opts.use_coverage {
                    candidate.coverage > current.coverage
                } else {
                    candidate.seq_len > current.seq_len
                }
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    let Some(best) = best else {
        info!("no linear path found");
        return Ok(None);
    };

    info!(
        steps = best.nodes.len(),
        seq_len = best.seq_len,
        "chose linear path"
    );
    render(gfa, lookups, graph, &best.nodes).map(Some)
}

/// Render a node walk to its oriented, overlap-trimmed sequence.
fn render<T: OptFields>(
    gfa: &Gfa<T>,
    lookups: &GraphLookups,
    graph: &AsmDigraph,
    nodes: &[NodeIndex],
) -> Result<LinearPath> {
    // orientation of each step, and the overlap trimmed off the start
    // of each non-first step; both come from the first declared edge
    // of each junction
    let mut steps: Vec<(usize, Orientation)> = Vec::with_capacity(nodes.len());
    let mut trims: Vec<usize> = Vec::with_capacity(nodes.len());

    for (i, window) in nodes.windows(2).enumerate() {
        let edges = graph.connecting_edges(window[0], window[1]);
        // the walk followed a directed edge, so one must exist
        let edge = edges
            .first()
            .copied()
            .ok_or(crate::error::LookupError::NodeIndex(window[1].index()))?;

        if i == 0 {
            steps.push((
                lookups.node_index_to_seg_id(window[0])?,
                edge.from_orient,
            ));
            trims.push(0);
        }
        steps.push((lookups.node_index_to_seg_id(window[1])?, edge.to_orient));
        trims.push(edge.overlap);
    }

    if steps.is_empty() {
        // single-node walk
        let seg_id = lookups.node_index_to_seg_id(nodes[0])?;
        steps.push((seg_id, Orientation::Forward));
        trims.push(0);
    }

    let sequence = render_steps(gfa, &steps, &trims);
    Ok(LinearPath { steps, sequence })
}

/// Concatenate oriented segment sequences, trimming `trims[i]` bases
/// off the start of step `i`.
fn render_steps<T: OptFields>(
    gfa: &Gfa<T>,
    steps: &[(usize, Orientation)],
    trims: &[usize],
) -> BString {
    let mut sequence = BString::from("");
    for ((seg_id, orient), trim) in steps.iter().zip(trims) {
        let raw: &[u8] = gfa
            .segment(*seg_id)
            .map(|s| s.sequence.as_ref())
            .unwrap_or_default();
        let oriented = match orient {
            Orientation::Forward => raw.to_vec(),
            Orientation::Backward => reverse_complement(raw),
        };
        let start = (*trim).min(oriented.len());
        sequence.extend_from_slice(&oriented[start..]);
    }
    sequence
}

/// Parse a comma-separated walk like `11+,12-,13+` into oriented
/// steps. Whitespace around steps is tolerated.
pub fn parse_walk(input: &str) -> Result<Vec<(usize, Orientation)>> {
    let mut steps = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        let Some(orient_char) = token.chars().last() else {
            return Err(AsmError::Walk("empty step in the walk".into()));
        };
        let orient = match orient_char {
            '+' => Orientation::Forward,
            '-' => Orientation::Backward,
            _ => {
                return Err(AsmError::Walk(format!(
                    "step `{}` must end in + or -",
                    token
                )))
            }
        };
        let id = token[..token.len() - orient_char.len_utf8()]
            .parse::<usize>()
            .map_err(|_| {
                AsmError::Walk(format!(
                    "step `{}` has a non-numeric segment id",
                    token
                ))
            })?;
        steps.push((id, orient));
    }
    Ok(steps)
}

/// Render a user-supplied walk through the graph.
///
/// Unlike [`linearize`], nothing is searched: each consecutive pair of
/// steps must match a declared link exactly, orientations included,
/// and that link's overlap is trimmed at the junction. Steps may
/// revisit a segment.
pub fn render_walk<T: OptFields>(
    gfa: &Gfa<T>,
    lookups: &GraphLookups,
    graph: &AsmDigraph,
    steps: &[(usize, Orientation)],
) -> Result<LinearPath> {
    if steps.is_empty() {
        return Err(AsmError::Walk("the walk has no steps".into()));
    }

    let mut trims = vec![0];
    for window in steps.windows(2) {
        let (from_id, from_orient) = window[0];
        let (to_id, to_orient) = window[1];
        let from = lookups.seg_id_to_node_index(from_id)?;
        let to = lookups.seg_id_to_node_index(to_id)?;

        let edge = graph
            .connecting_edges(from, to)
            .into_iter()
            .find(|e| e.from_orient == from_orient && e.to_orient == to_orient)
            .ok_or_else(|| {
                AsmError::Walk(format!(
                    "no link {}{} -> {}{} in the GFA",
                    from_id, from_orient, to_id, to_orient
                ))
            })?;
        trims.push(edge.overlap);
    }

    let sequence = render_steps(gfa, steps, &trims);
    info!(steps = steps.len(), seq_len = sequence.len(), "rendered walk");
    Ok(LinearPath {
        steps: steps.to_vec(),
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::{Link, Segment};
    use crate::optfields::{OptField, OptFields};

    fn chain_gfa() -> Gfa<()> {
        let mut gfa: Gfa<()> = Gfa::new();
        gfa.segments.push(Segment::new(1, b"AAAATT"));
        gfa.segments.push(Segment::new(2, b"TTGGGG"));
        gfa.segments.push(Segment::new(3, b"GGCCCC"));
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
            b"2M",
        ));
        gfa
    }

    #[test]
    fn chain_renders_with_overlaps_trimmed_once() {
        let gfa = chain_gfa();
        let (lookups, graph) = gfa.into_digraph().unwrap();
        let linear = linearize(&gfa, &lookups, &graph, &LinearOpts::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            linear.steps,
            vec![
                (1, Orientation::Forward),
                (2, Orientation::Forward),
                (3, Orientation::Forward),
            ]
        );
        assert_eq!(linear.fasta_header(), "1+,2+,3+");
        // 6 + 6 + 6 minus two 2-base overlaps
        assert_eq!(linear.sequence.len(), 14);
        assert_eq!(linear.sequence, "AAAATTGGGGCCCC");
    }

    #[test]
    fn cyclic_graph_falls_back_to_all_pairs() {
        let mut gfa: Gfa<()> = Gfa::new();
        gfa.segments.push(Segment::new(1, b"ACGT"));
        gfa.segments.push(Segment::new(2, b"TTGG"));
        gfa.links.push(Link::new(
            1,
            Orientation::Forward,
            2,
            Orientation::Forward,
            b"0M",
        ));
        gfa.links.push(Link::new(
            2,
            Orientation::Forward,
            1,
            Orientation::Forward,
            b"0M",
        ));

        let (lookups, graph) = gfa.into_digraph().unwrap();
        let linear = linearize(&gfa, &lookups, &graph, &LinearOpts::default())
            .unwrap()
            .unwrap();
        assert_eq!(linear.steps.len(), 2);
        assert_eq!(linear.sequence.len(), 8);
    }

    #[test]
    fn reverse_steps_render_the_reverse_complement() {
        let mut gfa: Gfa<()> = Gfa::new();
        gfa.segments.push(Segment::new(1, b"ACGT"));
        gfa.segments.push(Segment::new(2, b"AAAACC"));
        gfa.links.push(Link::new(
            1,
            Orientation::Forward,
            2,
            Orientation::Backward,
            b"0M",
        ));

        let (lookups, graph) = gfa.into_digraph().unwrap();
        let linear = linearize(&gfa, &lookups, &graph, &LinearOpts::default())
            .unwrap()
            .unwrap();
        assert_eq!(linear.fasta_header(), "1+,2-");
        assert_eq!(linear.sequence, "ACGTGGTTTT");
    }

    #[test]
    fn walk_strings_parse_with_whitespace() {
        assert_eq!(
            parse_walk("11+, 12-,13+").unwrap(),
            vec![
                (11, Orientation::Forward),
                (12, Orientation::Backward),
                (13, Orientation::Forward),
            ]
        );
        assert!(parse_walk("11").is_err());
        assert!(parse_walk("x+").is_err());
        assert!(parse_walk("").is_err());
    }

    #[test]
    fn walk_renders_along_declared_links() {
        let gfa = chain_gfa();
        let (lookups, graph) = gfa.into_digraph().unwrap();

        let steps = parse_walk("1+,2+,3+").unwrap();
        let path = render_walk(&gfa, &lookups, &graph, &steps).unwrap();
        assert_eq!(path.sequence, "AAAATTGGGGCCCC");

        // a walk may stop partway
        let steps = parse_walk("1+,2+").unwrap();
        let path = render_walk(&gfa, &lookups, &graph, &steps).unwrap();
        assert_eq!(path.sequence, "AAAATTGGGG");
    }

    #[test]
    fn walk_junctions_must_match_a_link_exactly() {
        let gfa = chain_gfa();
        let (lookups, graph) = gfa.into_digraph().unwrap();

        // the declared link is 1+ -> 2+
        let steps = parse_walk("1+,2-").unwrap();
        let err = render_walk(&gfa, &lookups, &graph, &steps).unwrap_err();
        assert!(matches!(err, crate::error::AsmError::Walk(_)));

        // no link 1 -> 3 at all
        let steps = parse_walk("1+,3+").unwrap();
        assert!(render_walk(&gfa, &lookups, &graph, &steps).is_err());
    }

    #[test]
    fn coverage_scoring_changes_the_winner() {
        let mut gfa: Gfa<Vec<OptField>> = Gfa::new();
        let mut long_branch = Segment::new(2, b"AAAAAAAAAA");
        long_branch.optional = OptFields::parse(vec!["ll:f:1.0".to_string()]);
        let mut covered_branch = Segment::new(3, b"CCCC");
        covered_branch.optional =
            OptFields::parse(vec!["ll:f:50.0".to_string()]);
        gfa.segments.push(Segment::new(1, b"ACGT"));
        gfa.segments.push(long_branch);
        gfa.segments.push(covered_branch);
        gfa.segments.push(Segment::new(4, b"TTTT"));
        for (from, to) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            gfa.links.push(Link::new(
                from,
                Orientation::Forward,
                to,
                Orientation::Forward,
                b"0M",
            ));
        }

        let (lookups, graph) = gfa.into_digraph().unwrap();

        let by_length = linearize(&gfa, &lookups, &graph, &LinearOpts::default())
            .unwrap()
            .unwrap();
        assert_eq!(by_length.fasta_header(), "1+,2+,4+");

        let opts = LinearOpts {
            use_coverage: true,
            ..Default::default()
        };
        let by_coverage = linearize(&gfa, &lookups, &graph, &opts)
            .unwrap()
            .unwrap();
        assert_eq!(by_coverage.fasta_header(), "1+,3+,4+");
    }
}
