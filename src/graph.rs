//! Graph representations of a [`Gfa`], and the lookups tying petgraph
//! node indices back to segment ids.
//!
//! Graphs are built once from a parsed [`Gfa`] and are read-only for
//! every downstream query.

pub mod paths;

use fnv::FnvHashMap;
use petgraph::{
    graph::{Graph, NodeIndex},
    visit::NodeIndexable,
    Direction::{Incoming, Outgoing},
    Undirected,
};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{LookupError, Result};
use crate::gfa::{Gfa, Orientation, NEUTRAL_COVERAGE};
use crate::optfields::OptFields;

/// Node weight in both graph representations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeWeight {
    pub seg_id: usize,
    pub seq_len: usize,
    pub coverage: f64,
}

/// Edge weight in the directed graph: the link orientations, the
/// overlap length derived from the link's CIGAR, and the edge coverage
/// if the link carried one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeWeight {
    pub from_orient: Orientation,
    pub to_orient: Orientation,
    pub overlap: usize,
    pub coverage: Option<f64>,
}

/// One segment's entry in the lookups arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRecord {
    pub seg_id: usize,
    pub node_index: NodeIndex,
    pub seq_len: usize,
    pub coverage: f64,
    pub gc: f64,
}

/// The bijection between petgraph node indices and GFA segment ids.
///
/// A single arena of segment records in first-discovery order, plus
/// two synchronized maps. All conversions go through here, so the
/// bijection invariant lives in one place; a missing entry means the
/// graph and lookups have diverged, which is fatal.
#[derive(Debug, Default, Clone)]
pub struct GraphLookups {
    records: Vec<SegmentRecord>,
    id_to_node: FnvHashMap<usize, NodeIndex>,
    node_to_slot: FnvHashMap<NodeIndex, usize>,
}

impl GraphLookups {
    pub fn new() -> Self {
        Default::default()
    }

    fn insert(&mut self, record: SegmentRecord) {
        debug_assert!(
            !self.id_to_node.contains_key(&record.seg_id),
            "segment ID inserted twice into the lookups"
        );
        self.id_to_node.insert(record.seg_id, record.node_index);
        self.node_to_slot.insert(record.node_index, self.records.len());
        self.records.push(record);
    }

    /// Return a segment ID from a node index.
    pub fn node_index_to_seg_id(
        &self,
        node_index: NodeIndex,
    ) -> std::result::Result<usize, LookupError> {
        self.record(node_index).map(|r| r.seg_id)
    }

    /// Return a node index from a segment ID.
    pub fn seg_id_to_node_index(
        &self,
        seg_id: usize,
    ) -> std::result::Result<NodeIndex, LookupError> {
        self.id_to_node
            .get(&seg_id)
            .copied()
            .ok_or(LookupError::SegmentId(seg_id))
    }

    /// The full record behind a node index.
    pub fn record(
        &self,
        node_index: NodeIndex,
    ) -> std::result::Result<&SegmentRecord, LookupError> {
        self.node_to_slot
            .get(&node_index)
            .map(|slot| &self.records[*slot])
            .ok_or(LookupError::NodeIndex(node_index.index()))
    }

    /// All records, in first-discovery order.
    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-segment (sequence length, coverage) pairs, keyed by node
    /// index, for downstream scoring.
    pub fn seq_len_and_cov(&self) -> FnvHashMap<NodeIndex, (usize, f64)> {
        self.records
            .iter()
            .map(|r| (r.node_index, (r.seq_len, r.coverage)))
            .collect()
    }

    /// Mean coverage over all segments. Neutral if there are none.
    pub fn mean_coverage(&self) -> f64 {
        if self.records.is_empty() {
            return NEUTRAL_COVERAGE;
        }
        let total: f64 = self.records.iter().map(|r| r.coverage).sum();
        total / self.records.len() as f64
    }
}

/// The directed representation of a GFA. Almost all the toolkit's
/// functionality is implemented against this.
pub struct AsmDigraph(pub Graph<NodeWeight, EdgeWeight>);

/// The undirected representation, used for neighborhood extraction
/// where link direction is irrelevant.
pub struct AsmUngraph(pub Graph<NodeWeight, (), Undirected>);

impl<T: OptFields> Gfa<T> {
    /// Read this GFA into a directed graph plus its lookups.
    ///
    /// Links referencing a segment id with no segment line create a
    /// node on the fly (zero length, neutral coverage). Duplicate
    /// links and self-loops are kept. A malformed overlap CIGAR on any
    /// link aborts the build.
    pub fn into_digraph(&self) -> Result<(GraphLookups, AsmDigraph)> {
        let mut graph = Graph::new();
        let mut lookups = GraphLookups::new();

        for segment in &self.segments {
            let weight = NodeWeight {
                seg_id: segment.name,
                seq_len: segment.len(),
                coverage: segment.coverage(),
            };
            let node_index = graph.add_node(weight);
            lookups.insert(SegmentRecord {
                seg_id: segment.name,
                node_index,
                seq_len: segment.len(),
                coverage: segment.coverage(),
                gc: segment.gc(),
            });
        }

        for link in &self.links {
            let overlap = link
                .overlap_len()
                .map_err(crate::parser::ParseError::from)?;
            let from = node_or_insert(&mut graph, &mut lookups, link.from_segment);
            let to = node_or_insert(&mut graph, &mut lookups, link.to_segment);

            graph.add_edge(
                from,
                to,
                EdgeWeight {
                    from_orient: link.from_orient,
                    to_orient: link.to_orient,
                    overlap,
                    coverage: link.coverage(),
                },
            );
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built directed graph"
        );

        Ok((lookups, AsmDigraph(graph)))
    }

    /// Read this GFA into an undirected graph plus its lookups.
    pub fn into_ungraph(&self) -> Result<(GraphLookups, AsmUngraph)> {
        let mut graph = Graph::new_undirected();
        let mut lookups = GraphLookups::new();

        for segment in &self.segments {
            let weight = NodeWeight {
                seg_id: segment.name,
                seq_len: segment.len(),
                coverage: segment.coverage(),
            };
            let node_index = graph.add_node(weight);
            lookups.insert(SegmentRecord {
                seg_id: segment.name,
                node_index,
                seq_len: segment.len(),
                coverage: segment.coverage(),
                gc: segment.gc(),
            });
        }

        for link in &self.links {
            let from =
                node_or_insert_un(&mut graph, &mut lookups, link.from_segment);
            let to = node_or_insert_un(&mut graph, &mut lookups, link.to_segment);
            graph.add_edge(from, to, ());
        }

        Ok((lookups, AsmUngraph(graph)))
    }
}

fn node_or_insert(
    graph: &mut Graph<NodeWeight, EdgeWeight>,
    lookups: &mut GraphLookups,
    seg_id: usize,
) -> NodeIndex {
    match lookups.seg_id_to_node_index(seg_id) {
        Ok(node_index) => node_index,
        Err(_) => {
            let node_index = graph.add_node(NodeWeight {
                seg_id,
                seq_len: 0,
                coverage: NEUTRAL_COVERAGE,
            });
            lookups.insert(SegmentRecord {
                seg_id,
                node_index,
                seq_len: 0,
                coverage: NEUTRAL_COVERAGE,
                gc: 0.0,
            });
            node_index
        }
    }
}

fn node_or_insert_un(
    graph: &mut Graph<NodeWeight, (), Undirected>,
    lookups: &mut GraphLookups,
    seg_id: usize,
) -> NodeIndex {
    match lookups.seg_id_to_node_index(seg_id) {
        Ok(node_index) => node_index,
        Err(_) => {
            let node_index = graph.add_node(NodeWeight {
                seg_id,
                seq_len: 0,
                coverage: NEUTRAL_COVERAGE,
            });
            lookups.insert(SegmentRecord {
                seg_id,
                node_index,
                seq_len: 0,
                coverage: NEUTRAL_COVERAGE,
                gc: 0.0,
            });
            node_index
        }
    }
}

impl AsmDigraph {
    pub fn node_count(&self) -> usize {
        self.0.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }

    /// Split into weakly-connected components: connectivity computed
    /// ignoring edge direction, since a link may be declared in only
    /// one orientation. Returns the segment id sets in discovery
    /// order.
    pub fn weakly_connected_components(
        &self,
        lookups: &GraphLookups,
    ) -> Result<Vec<Vec<usize>>> {
        let graph = &self.0;
        let mut seen: HashSet<NodeIndex> =
            HashSet::with_capacity(graph.node_count());
        let mut components = Vec::new();

        for node in graph.node_indices() {
            if seen.contains(&node) {
                continue;
            }

            let mut component = Vec::new();
            let mut next_level = vec![node];
            seen.insert(node);

            while let Some(bfs_node) = next_level.pop() {
                component.push(bfs_node);
                for neighbor in graph.neighbors_undirected(bfs_node) {
                    if seen.insert(neighbor) {
                        next_level.push(neighbor);
                    }
                }
            }

            component.sort();
            let seg_ids = component
                .iter()
                .map(|n| lookups.node_index_to_seg_id(*n))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            components.push(seg_ids);
        }

        Ok(components)
    }

    /// True if the graph contains a directed cycle, detected by
    /// depth-first back-edge search. The node/edge count comparison
    /// only short-circuits the impossible case; it is never the final
    /// answer.
    ///
    /// Meant to be called on a single weakly-connected component; the
    /// count pre-filter assumes weak connectivity.
    pub fn is_circular(&self) -> bool {
        let graph = &self.0;

        // a weakly-connected graph on n nodes needs at least n edges
        // to close a directed cycle
        if graph.edge_count() < graph.node_count() {
            return false;
        }

        // iterative coloring DFS; a back edge targets a node still on
        // the current stack
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Grey,
            Black,
        }

        let mut color = vec![Color::White; graph.node_bound()];
        for start in graph.node_indices() {
            if color[start.index()] != Color::White {
                continue;
            }
            let mut stack = vec![(start, graph.neighbors_directed(start, Outgoing))];
            color[start.index()] = Color::Grey;

            loop {
                let next = match stack.last_mut() {
                    Some((_, neighbors)) => neighbors.next(),
                    None => break,
                };
                match next {
                    Some(next) => match color[next.index()] {
                        Color::Grey => return true,
                        Color::White => {
                            color[next.index()] = Color::Grey;
                            stack.push((
                                next,
                                graph.neighbors_directed(next, Outgoing),
                            ));
                        }
                        Color::Black => (),
                    },
                    None => {
                        if let Some((node, _)) = stack.pop() {
                            color[node.index()] = Color::Black;
                        }
                    }
                }
            }
        }

        false
    }

    /// Remove all degree-zero nodes from this snapshot. Remaining
    /// edges are untouched, so components are neither merged nor
    /// split. Returns the surviving segment ids, for rewriting the
    /// GFA.
    pub fn trim_isolated(&self, lookups: &GraphLookups) -> Result<Vec<usize>> {
        let graph = &self.0;
        let mut keep = Vec::new();
        for node in graph.node_indices() {
            if graph.neighbors_undirected(node).next().is_some() {
                keep.push(lookups.node_index_to_seg_id(node)?);
            }
        }
        debug!(
            removed = graph.node_count() - keep.len(),
            "trimmed isolated nodes"
        );
        Ok(keep)
    }

    /// Nodes with no incoming edges (sources) and nodes with no
    /// outgoing edges (sinks); the terminal candidates for
    /// linearization.
    pub fn terminal_nodes(&self) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
        let sources = self.0.externals(Incoming).collect();
        let sinks = self.0.externals(Outgoing).collect();
        (sources, sinks)
    }

    /// The edges from `a` to `b`, in insertion order.
    pub fn connecting_edges(
        &self,
        a: NodeIndex,
        b: NodeIndex,
    ) -> Vec<EdgeWeight> {
        let mut edges: Vec<EdgeWeight> = self
            .0
            .edges_connecting(a, b)
            .map(|e| *e.weight())
            .collect();
        // petgraph iterates edges most-recently-added first
        edges.reverse();
        edges
    }
}

impl AsmUngraph {
    pub fn node_count(&self) -> usize {
        self.0.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }

    /// Collect every segment within `iterations` hops of the given
    /// node, by breadth-first ring expansion. The start segment is
    /// always included.
    pub fn neighborhood(
        &self,
        start: NodeIndex,
        iterations: u32,
        lookups: &GraphLookups,
    ) -> Result<Vec<usize>> {
        let graph = &self.0;
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        seen.insert(start);
        let mut frontier = vec![start];

        for _ in 0..iterations {
            let mut next_frontier = Vec::new();
            for node in frontier {
                for neighbor in graph.neighbors(node) {
                    if seen.insert(neighbor) {
                        next_frontier.push(neighbor);
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        let mut seg_ids = seen
            .iter()
            .map(|n| lookups.node_index_to_seg_id(*n))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        seg_ids.sort();
        Ok(seg_ids)
    }
}
