//! Simple-path enumeration between node pairs.
//!
//! One iterative depth-first enumerator serves both the
//! coverage-agnostic and the coverage-aware searches; the latter adds
//! a cumulative sequence-length budget, recomputed at each step.
//! Coverage weights are carried on the frames for later scoring of
//! completed paths, never used to prune branches mid-search.

use fnv::FnvHashSet;
use petgraph::{
    graph::{Graph, NodeIndex},
    visit::EdgeRef,
    Direction::Outgoing,
};
use std::collections::HashSet;
use tracing::trace;

use super::{AsmDigraph, EdgeWeight, NodeWeight};

/// Default bound on the search depth (the number of nodes held on the
/// traversal stack at once). Tunable per invocation; this default is
/// ample for organelle-scale graphs while keeping pathological inputs
/// from blowing up.
pub const DEFAULT_MAX_DEPTH: usize = 255;

/// Runtime bounds on a path search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    /// Maximum traversal depth. Branches that would exceed it are
    /// truncated; truncation is a soft limit, not an error.
    pub max_depth: usize,
    /// Optional budget on the cumulative rendered sequence length
    /// (bases, junction overlaps already subtracted). `None` disables
    /// the budget; this is the coverage-agnostic variant.
    pub max_length: Option<usize>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: None,
        }
    }
}

impl SearchLimits {
    pub fn depth(max_depth: usize) -> Self {
        SearchLimits {
            max_depth,
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// A completed simple path, restartable as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePath {
    /// Visited nodes, start to end. No node appears twice.
    pub nodes: Vec<NodeIndex>,
    /// Rendered length in bases: segment lengths minus junction
    /// overlaps.
    pub seq_len: usize,
    /// Carried coverage: node coverages plus edge coverages where the
    /// links declared one. Only used to score completed paths.
    pub coverage: f64,
}

/// The outcome of a path search. The three states are distinguishable
/// on purpose: an exhaustive search that found nothing is not the same
/// thing as a search the depth bound cut short.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSearch {
    /// At least one path, and the search ran to exhaustion.
    Complete(Vec<CandidatePath>),
    /// The search ran to exhaustion and no path exists.
    Exhausted,
    /// The depth bound truncated at least one branch. Paths completed
    /// on other branches are still included, so this may carry any
    /// number of paths, including none.
    DepthCapped(Vec<CandidatePath>),
}

impl PathSearch {
    /// The completed paths, regardless of whether the search was
    /// truncated.
    pub fn paths(&self) -> &[CandidatePath] {
        match self {
            PathSearch::Complete(p) | PathSearch::DepthCapped(p) => p,
            PathSearch::Exhausted => &[],
        }
    }

    pub fn into_paths(self) -> Vec<CandidatePath> {
        match self {
            PathSearch::Complete(p) | PathSearch::DepthCapped(p) => p,
            PathSearch::Exhausted => Vec::new(),
        }
    }

    pub fn is_depth_capped(&self) -> bool {
        matches!(self, PathSearch::DepthCapped(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct Step {
    target: NodeIndex,
    overlap: usize,
    edge_cov: Option<f64>,
}

/// Outgoing steps from a node, in edge insertion order. Insertion
/// order fixes the branch order at every node, which makes tie
/// breaking deterministic downstream.
fn outgoing_steps(
    graph: &Graph<NodeWeight, EdgeWeight>,
    node: NodeIndex,
) -> Vec<Step> {
    let mut steps: Vec<Step> = graph
        .edges_directed(node, Outgoing)
        .map(|e| Step {
            target: e.target(),
            overlap: e.weight().overlap,
            edge_cov: e.weight().coverage,
        })
        .collect();
    // petgraph iterates edges most-recently-added first
    steps.reverse();
    steps
}

struct Frame {
    steps: Vec<Step>,
    cursor: usize,
    /// What this frame added to the running totals, undone on
    /// backtrack.
    added_len: usize,
    added_cov: f64,
}

/// Enumerate simple paths from `start` to `end`.
///
/// A node is marked visited only while it sits on the current path
/// prefix, so it may appear on several candidate paths but never twice
/// within one.
pub fn enumerate_paths(
    digraph: &AsmDigraph,
    start: NodeIndex,
    end: NodeIndex,
    limits: &SearchLimits,
) -> PathSearch {
    let graph = &digraph.0;

    let start_weight = graph[start];
    if start == end {
        return PathSearch::Complete(vec![CandidatePath {
            nodes: vec![start],
            seq_len: start_weight.seq_len,
            coverage: start_weight.coverage,
        }]);
    }

    let mut visited: FnvHashSet<NodeIndex> = FnvHashSet::default();
    visited.insert(start);
    let mut path = vec![start];
    let mut cum_len = start_weight.seq_len;
    let mut cum_cov = start_weight.coverage;

    let mut stack = vec![Frame {
        steps: outgoing_steps(graph, start),
        cursor: 0,
        added_len: 0,
        added_cov: 0.0,
    }];

    let mut completed: Vec<CandidatePath> = Vec::new();
    let mut depth_capped = false;

    while let Some(frame_ix) = stack.len().checked_sub(1) {
        let cursor = stack[frame_ix].cursor;

        if cursor >= stack[frame_ix].steps.len() {
            // this frame is spent; backtrack
            let frame = stack.pop().expect("stack is non-empty");
            let node = path.pop().expect("path tracks the stack");
            visited.remove(&node);
            cum_len -= frame.added_len;
            cum_cov -= frame.added_cov;
            continue;
        }
        stack[frame_ix].cursor += 1;

        let step = stack[frame_ix].steps[cursor];
        if visited.contains(&step.target) {
            continue;
        }

        let target_weight = graph[step.target];
        let added_len = target_weight.seq_len.saturating_sub(step.overlap);
        if let Some(max_length) = limits.max_length {
            if cum_len + added_len > max_length {
                continue;
            }
        }
        let added_cov = target_weight.coverage + step.edge_cov.unwrap_or(0.0);

        if step.target == end {
            let mut nodes = path.clone();
            nodes.push(end);
            completed.push(CandidatePath {
                nodes,
                seq_len: cum_len + added_len,
                coverage: cum_cov + added_cov,
            });
            continue;
        }

        if stack.len() >= limits.max_depth {
            // truncate this branch only; anything already completed
            // stays in the result
            depth_capped = true;
            continue;
        }

        visited.insert(step.target);
        path.push(step.target);
        cum_len += added_len;
        cum_cov += added_cov;
        stack.push(Frame {
            steps: outgoing_steps(graph, step.target),
            cursor: 0,
            added_len,
            added_cov,
        });
    }

    trace!(
        found = completed.len(),
        depth_capped,
        "path search finished"
    );

    if depth_capped {
        PathSearch::DepthCapped(completed)
    } else if completed.is_empty() {
        PathSearch::Exhausted
    } else {
        PathSearch::Complete(completed)
    }
}

/// Run the enumerator for a batch of (start, end) pairs.
pub fn paths_between_many(
    digraph: &AsmDigraph,
    pairs: &[(NodeIndex, NodeIndex)],
    limits: &SearchLimits,
) -> Vec<(NodeIndex, NodeIndex, PathSearch)> {
    pairs
        .iter()
        .map(|(start, end)| {
            (*start, *end, enumerate_paths(digraph, *start, *end, limits))
        })
        .collect()
}

/// Enumerate all simple paths between every ordered pair of distinct
/// nodes sharing a weakly-connected component.
///
/// Combinatorially expensive; callers should restrict this to small,
/// pre-split subgraphs.
pub fn all_pairs_paths(
    digraph: &AsmDigraph,
    limits: &SearchLimits,
) -> Vec<(NodeIndex, NodeIndex, PathSearch)> {
    let graph = &digraph.0;

    // component label per node, direction ignored
    let mut component: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut label = 0;
    for node in graph.node_indices() {
        if component[node.index()].is_some() {
            continue;
        }
        let mut frontier = vec![node];
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        seen.insert(node);
        while let Some(n) = frontier.pop() {
            component[n.index()] = Some(label);
            for neighbor in graph.neighbors_undirected(n) {
                if seen.insert(neighbor) {
                    frontier.push(neighbor);
                }
            }
        }
        label += 1;
    }

    let mut results = Vec::new();
    for a in graph.node_indices() {
        for b in graph.node_indices() {
            if a == b || component[a.index()] != component[b.index()] {
                continue;
            }
            results.push((a, b, enumerate_paths(digraph, a, b, limits)));
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::{Gfa, Link, Orientation, Segment};

    fn digraph(
        segments: &[(usize, usize)],
        links: &[(usize, usize, usize)],
    ) -> (crate::graph::GraphLookups, AsmDigraph) {
        let mut gfa: Gfa<()> = Gfa::new();
        for (name, len) in segments {
            gfa.segments.push(Segment::new(*name, &vec![b'A'; *len]));
        }
        for (from, to, overlap) in links {
            gfa.links.push(Link::new(
                *from,
                Orientation::Forward,
                *to,
                Orientation::Forward,
                format!("{}M", overlap).as_bytes(),
            ));
        }
        gfa.into_digraph().unwrap()
    }

    #[test]
    fn linear_chain_has_one_path() {
        let (lookups, graph) =
            digraph(&[(1, 10), (2, 10), (3, 10)], &[(1, 2, 2), (2, 3, 2)]);
        let start = lookups.seg_id_to_node_index(1).unwrap();
        let end = lookups.seg_id_to_node_index(3).unwrap();

        let search =
            enumerate_paths(&graph, start, end, &SearchLimits::default());
        match search {
            PathSearch::Complete(paths) => {
                assert_eq!(paths.len(), 1);
                let ids: Vec<usize> = paths[0]
                    .nodes
                    .iter()
                    .map(|n| lookups.node_index_to_seg_id(*n).unwrap())
                    .collect();
                assert_eq!(ids, vec![1, 2, 3]);
                // 10 + (10 - 2) + (10 - 2)
                assert_eq!(paths[0].seq_len, 26);
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn disconnected_pair_is_exhausted() {
        let (lookups, graph) = digraph(&[(1, 5), (2, 5)], &[]);
        let start = lookups.seg_id_to_node_index(1).unwrap();
        let end = lookups.seg_id_to_node_index(2).unwrap();
        let search =
            enumerate_paths(&graph, start, end, &SearchLimits::default());
        assert_eq!(search, PathSearch::Exhausted);
    }

    #[test]
    fn depth_bound_is_distinguishable_from_no_path() {
        // shortest path 1->2->3->4 needs depth 3
        let (lookups, graph) = digraph(
            &[(1, 5), (2, 5), (3, 5), (4, 5)],
            &[(1, 2, 0), (2, 3, 0), (3, 4, 0)],
        );
        let start = lookups.seg_id_to_node_index(1).unwrap();
        let end = lookups.seg_id_to_node_index(4).unwrap();

        let search =
            enumerate_paths(&graph, start, end, &SearchLimits::depth(2));
        assert!(search.is_depth_capped());
        assert!(search.paths().is_empty());

        let search =
            enumerate_paths(&graph, start, end, &SearchLimits::default());
        assert!(matches!(search, PathSearch::Complete(_)));
    }

    #[test]
    fn node_reuse_is_path_scoped() {
        // diamond: both branches go through to the sink, sharing no
        // intermediate; 2 appears in one path, 3 in the other
        let (lookups, graph) = digraph(
            &[(1, 5), (2, 5), (3, 5), (4, 5)],
            &[(1, 2, 0), (1, 3, 0), (2, 4, 0), (3, 4, 0)],
        );
        let start = lookups.seg_id_to_node_index(1).unwrap();
        let end = lookups.seg_id_to_node_index(4).unwrap();
        let search =
            enumerate_paths(&graph, start, end, &SearchLimits::default());
        let paths = search.paths();
        assert_eq!(paths.len(), 2);
        // branch order at node 1 follows edge insertion order
        let first: Vec<usize> = paths[0]
            .nodes
            .iter()
            .map(|n| lookups.node_index_to_seg_id(*n).unwrap())
            .collect();
        assert_eq!(first, vec![1, 2, 4]);
    }

    #[test]
    fn length_budget_prunes_without_capping() {
        // long detour 1->2->4 (15 bases added) vs direct 1->3->4
        let (lookups, graph) = digraph(
            &[(1, 5), (2, 100), (3, 5), (4, 5)],
            &[(1, 2, 0), (1, 3, 0), (2, 4, 0), (3, 4, 0)],
        );
        let start = lookups.seg_id_to_node_index(1).unwrap();
        let end = lookups.seg_id_to_node_index(4).unwrap();
        let limits = SearchLimits::default().with_max_length(20);
        let search = enumerate_paths(&graph, start, end, &limits);
        match search {
            PathSearch::Complete(paths) => {
                assert_eq!(paths.len(), 1);
                assert_eq!(paths[0].seq_len, 15);
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn all_pairs_respects_components() {
        let (_, graph) = digraph(
            &[(1, 5), (2, 5), (3, 5), (4, 5)],
            &[(1, 2, 0), (3, 4, 0)],
        );
        let results = all_pairs_paths(&graph, &SearchLimits::default());
        // two components of two nodes each: two ordered pairs per
        // component
        assert_eq!(results.len(), 4);
    }
}
