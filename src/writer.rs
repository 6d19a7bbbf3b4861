//! Text output: GFA round-trip, DOT for graph visualization, and
//! plain fasta.

use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;
use crate::gfa::Gfa;
use crate::graph::{AsmDigraph, GraphLookups};
use crate::optfields::OptFields;

fn push_optional<T: OptFields>(out: &mut String, optional: &T) {
    for field in optional.fields() {
        // infallible on String
        let _ = write!(out, "\t{}", field);
    }
}

/// Render a [`Gfa`] back to GFA1 text, optional fields included. The
/// output parses back to an equal `Gfa`.
pub fn gfa_string<T: OptFields>(gfa: &Gfa<T>) -> String {
    let mut out = String::new();

    out.push('H');
    if let Some(version) = &gfa.header.version {
        let _ = write!(out, "\tVN:Z:{}", version);
    }
    push_optional(&mut out, &gfa.header.optional);
    out.push('\n');

    for segment in &gfa.segments {
        if segment.is_empty() {
            let _ = write!(out, "S\t{}\t*", segment.name);
        } else {
            let _ = write!(out, "S\t{}\t{}", segment.name, segment.sequence);
        }
        push_optional(&mut out, &segment.optional);
        out.push('\n');
    }

    for link in &gfa.links {
        let _ = write!(
            out,
            "L\t{}\t{}\t{}\t{}\t{}",
            link.from_segment,
            link.from_orient,
            link.to_segment,
            link.to_orient,
            link.overlap
        );
        push_optional(&mut out, &link.optional);
        out.push('\n');
    }

    for path in &gfa.paths {
        let steps = path
            .segment_names
            .iter()
            .map(|(name, orient)| format!("{}{}", name, orient))
            .collect::<Vec<_>>()
            .join(",");
        let overlaps = path
            .overlaps
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let _ = write!(out, "P\t{}\t{}\t{}", path.path_name, steps, overlaps);
        push_optional(&mut out, &path.optional);
        out.push('\n');
    }

    out
}

/// Render the directed graph as DOT. Nodes are labeled with segment
/// id, length, and coverage; edges with the overlap length and, where
/// present, edge coverage.
pub fn dot_string(
    lookups: &GraphLookups,
    digraph: &AsmDigraph,
) -> Result<String> {
    use petgraph::visit::EdgeRef;

    let graph = &digraph.0;
    let mut out = String::from("digraph assembly {\n");

    for node in graph.node_indices() {
        let record = lookups.record(node)?;
        let _ = writeln!(
            out,
            "    {} [label=\"{}\\nlen={}\\ncov={}\"];",
            node.index(),
            record.seg_id,
            record.seq_len,
            record.coverage
        );
    }

    for edge in graph.edge_references() {
        let weight = edge.weight();
        let label = match weight.coverage {
            Some(cov) => format!("ov={} cov={}", weight.overlap, cov),
            None => format!("ov={}", weight.overlap),
        };
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\"];",
            edge.source().index(),
            edge.target().index(),
            label
        );
    }

    out.push_str("}\n");
    Ok(out)
}

/// Write each segment as a fasta record.
pub fn write_fasta<W: Write, T: OptFields>(
    gfa: &Gfa<T>,
    writer: &mut W,
) -> Result<()> {
    for segment in &gfa.segments {
        writeln!(writer, ">{}\n{}", segment.name, segment.sequence)?;
    }
    Ok(())
}
