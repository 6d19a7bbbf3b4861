//! Per-component summary statistics, and the organelle candidate
//! classifier built on top of them.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::error::Result;
use crate::gfa::Gfa;
use crate::optfields::OptFields;
use crate::util::format_kb;

/// Summary of one weakly-connected component.
#[derive(Debug, Clone, Serialize)]
pub struct Stat {
    /// 1-based component index, in discovery order.
    pub index: usize,
    /// The segment ids in the component, sorted.
    pub segments: Vec<usize>,
    pub node_count: usize,
    pub edge_count: usize,
    /// Total sequence length in bases, overlaps included.
    pub total_seq_len: usize,
    /// Total declared overlap length across the component's links.
    pub total_overlap_len: usize,
    /// Mean segment coverage.
    pub coverage: f64,
    /// Mean segment GC fraction.
    pub gc: f64,
    pub circular: bool,
}

impl Stat {
    /// Sequence length with each junction's overlap counted once.
    pub fn seq_len_minus_overlaps(&self) -> isize {
        self.total_seq_len as isize - self.total_overlap_len as isize
    }
}

/// Statistics for every component of a GFA.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats(pub Vec<Stat>);

/// Which tail of the coverage/GC distribution marks a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutlierDirection {
    High,
    Low,
    #[default]
    Either,
}

/// Tunables for organelle candidate classification.
#[derive(Debug, Clone, Copy)]
pub struct OrganelleParams {
    /// Expected genome size in bases; candidates are ranked by
    /// closeness to it.
    pub expected_size: usize,
    /// How many standard deviations from the mean coverage or GC a
    /// component must sit to count as an outlier.
    pub sigma: f64,
    pub direction: OutlierDirection,
    /// Upper bounds on component size; organelle components are small.
    pub max_nodes: usize,
    pub max_edges: usize,
}

impl OrganelleParams {
    pub fn mitochondria() -> Self {
        OrganelleParams {
            expected_size: 300_000,
            sigma: 2.0,
            direction: OutlierDirection::Either,
            max_nodes: 30,
            max_edges: 60,
        }
    }

    pub fn chloroplast() -> Self {
        OrganelleParams {
            expected_size: 160_000,
            ..Self::mitochondria()
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

fn is_outlier(
    value: f64,
    mean: f64,
    sd: f64,
    sigma: f64,
    direction: OutlierDirection,
) -> bool {
    if sd == 0.0 {
        return false;
    }
    match direction {
        OutlierDirection::High => value > mean + sigma * sd,
        OutlierDirection::Low => value < mean - sigma * sd,
        OutlierDirection::Either => (value - mean).abs() > sigma * sd,
    }
}

impl Stats {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Components that look like an organelle genome, best first.
    ///
    /// A candidate must be circular, small (within the node/edge
    /// bounds), and a coverage or GC outlier against the distribution
    /// over all components. When the GFA has a single component the
    /// outlier test is vacuous and is skipped; circularity and size
    /// alone decide. Qualifying components are ranked by closeness of
    /// their total sequence length to the expected genome size. The
    /// classification is advisory, never a hard filter on the data.
    pub fn candidates(&self, params: &OrganelleParams) -> Vec<&Stat> {
        let coverages: Vec<f64> = self.0.iter().map(|s| s.coverage).collect();
        let gcs: Vec<f64> = self.0.iter().map(|s| s.gc).collect();
        let cov_mean = mean(&coverages);
        let cov_sd = std_dev(&coverages, cov_mean);
        let gc_mean = mean(&gcs);
        let gc_sd = std_dev(&gcs, gc_mean);

        let single_component = self.0.len() == 1;

        let mut candidates: Vec<&Stat> = self
            .0
            .iter()
            .filter(|s| {
                s.circular
                    && s.node_count <= params.max_nodes
                    && s.edge_count <= params.max_edges
            })
            .filter(|s| {
                single_component
                    || is_outlier(
                        s.coverage,
                        cov_mean,
                        cov_sd,
                        params.sigma,
                        params.direction,
                    )
                    || is_outlier(
                        s.gc,
                        gc_mean,
                        gc_sd,
                        params.sigma,
                        params.direction,
                    )
            })
            .collect();

        candidates.sort_by_key(|s| {
            s.total_seq_len.abs_diff(params.expected_size)
        });

        info!(
            components = self.0.len(),
            candidates = candidates.len(),
            "classified organelle candidates"
        );
        candidates
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stat in &self.0 {
            writeln!(f, "component {}:", stat.index)?;
            writeln!(f, "\tnodes:\t{}", stat.node_count)?;
            writeln!(f, "\tedges:\t{}", stat.edge_count)?;
            writeln!(
                f,
                "\ttotal sequence length:\t{} ({})",
                stat.total_seq_len,
                format_kb(stat.total_seq_len)
            )?;
            writeln!(
                f,
                "\tsequence length minus overlaps:\t{}",
                stat.seq_len_minus_overlaps()
            )?;
            writeln!(f, "\tmean coverage:\t{:.2}", stat.coverage)?;
            writeln!(f, "\tmean GC:\t{:.4}", stat.gc)?;
            writeln!(f, "\tcircular:\t{}", stat.circular)?;
        }
        writeln!(f, "total components:\t{}", self.0.len())
    }
}

/// Compute per-component statistics for a GFA.
///
/// The graph is split on weak connectivity; each component is rebuilt
/// as its own subgraph so counts and circularity are local to it.
pub fn graph_stats<T: OptFields>(gfa: &Gfa<T>) -> Result<Stats> {
    let (lookups, digraph) = gfa.into_digraph()?;
    let components = digraph.weakly_connected_components(&lookups)?;

    let mut stats = Vec::with_capacity(components.len());
    for (i, segment_ids) in components.into_iter().enumerate() {
        let subgraph = gfa.subgraph(&segment_ids);
        let (sub_lookups, sub_digraph) = subgraph.into_digraph()?;

        let total_seq_len =
            sub_lookups.records().iter().map(|r| r.seq_len).sum();
        let total_overlap_len = subgraph
            .links
            .iter()
            .map(|l| l.overlap_len().map_err(crate::parser::ParseError::from))
            .sum::<std::result::Result<usize, _>>()?;
        let gcs: Vec<f64> =
            sub_lookups.records().iter().map(|r| r.gc).collect();

        stats.push(Stat {
            index: i + 1,
            segments: segment_ids,
            node_count: sub_digraph.node_count(),
            edge_count: sub_digraph.edge_count(),
            total_seq_len,
            total_overlap_len,
            coverage: sub_lookups.mean_coverage(),
            gc: mean(&gcs),
            circular: sub_digraph.is_circular(),
        });
    }

    debug!(components = stats.len(), "computed graph stats");
    Ok(Stats(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::{Link, Orientation, Segment};
    use crate::optfields::{OptField, OptFields};

    fn tagged_segment(name: usize, seq: &[u8], cov: f64) -> Segment<Vec<OptField>> {
        let mut s = Segment::new(name, seq);
        s.optional = OptFields::parse(vec![format!("ll:f:{}", cov)]);
        s
    }

    fn link(from: usize, to: usize) -> Link<Vec<OptField>> {
        Link::new(from, Orientation::Forward, to, Orientation::Forward, b"0M")
    }

    /// One 2-node cycle at coverage 30, two chains at coverage 10.
    fn three_component_gfa() -> Gfa<Vec<OptField>> {
        let mut gfa: Gfa<Vec<OptField>> = Gfa::new();
        gfa.segments.push(tagged_segment(1, b"ACGTACGT", 30.0));
        gfa.segments.push(tagged_segment(2, b"GGGGCCCC", 30.0));
        gfa.links.push(link(1, 2));
        gfa.links.push(link(2, 1));

        gfa.segments.push(tagged_segment(3, b"AAAA", 10.0));
        gfa.segments.push(tagged_segment(4, b"TTTT", 10.0));
        gfa.links.push(link(3, 4));

        gfa.segments.push(tagged_segment(5, b"AATT", 10.0));
        gfa.segments.push(tagged_segment(6, b"TTAA", 10.0));
        gfa.links.push(link(5, 6));

        gfa
    }

    #[test]
    fn stats_are_per_component() {
        let stats = graph_stats(&three_component_gfa()).unwrap();
        assert_eq!(stats.0.len(), 3);

        let first = &stats.0[0];
        assert_eq!(first.segments, vec![1, 2]);
        assert_eq!(first.node_count, 2);
        assert_eq!(first.edge_count, 2);
        assert_eq!(first.total_seq_len, 16);
        assert_eq!(first.coverage, 30.0);
        assert!(first.circular);

        assert!(!stats.0[1].circular);
        assert!(!stats.0[2].circular);
    }

    #[test]
    fn classifier_picks_the_circular_outlier() {
        let stats = graph_stats(&three_component_gfa()).unwrap();
        let params = OrganelleParams {
            expected_size: 16,
            sigma: 1.0,
            direction: OutlierDirection::High,
            max_nodes: 30,
            max_edges: 60,
        };
        let candidates = stats.candidates(&params);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].segments, vec![1, 2]);
    }

    #[test]
    fn single_component_skips_the_outlier_test() {
        let mut gfa: Gfa<Vec<OptField>> = Gfa::new();
        gfa.segments.push(tagged_segment(1, b"ACGT", 10.0));
        gfa.segments.push(tagged_segment(2, b"GGCC", 10.0));
        gfa.links.push(link(1, 2));
        gfa.links.push(link(2, 1));

        let stats = graph_stats(&gfa).unwrap();
        let candidates = stats.candidates(&OrganelleParams::mitochondria());
        assert_eq!(candidates.len(), 1);

        // an acyclic single component is still rejected
        let mut chain: Gfa<Vec<OptField>> = Gfa::new();
        chain.segments.push(tagged_segment(1, b"ACGT", 10.0));
        chain.segments.push(tagged_segment(2, b"GGCC", 10.0));
        chain.links.push(link(1, 2));
        let stats = graph_stats(&chain).unwrap();
        assert!(stats.candidates(&OrganelleParams::mitochondria()).is_empty());
    }
}
