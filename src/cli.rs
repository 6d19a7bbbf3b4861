//! Command-line interface: one subcommand per tool, all reading a GFA
//! file (or stdin) and writing results to stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use crate::gfa::Gfa;
use crate::graph::paths::{SearchLimits, DEFAULT_MAX_DEPTH};
use crate::linear::{linearize, parse_walk, render_walk, LinearOpts};
use crate::load::{load_gfa, load_gfa_reader};
use crate::optfields::OptionalFields;
use crate::stats::{graph_stats, OrganelleParams, OutlierDirection};
use crate::writer::{dot_string, gfa_string, write_fasta};
use crate::{extract, overlap};

#[derive(Parser, Debug)]
#[command(
    name = "asmtk",
    version,
    about = "A toolkit for exploring and pulling apart assembly graphs in GFA format"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// A GFA input argument; absent or `-` reads stdin.
#[derive(Args, Debug)]
struct GfaInput {
    /// Path to a GFA file; omit or pass `-` to read stdin
    gfa: Option<PathBuf>,
}

impl GfaInput {
    fn load(&self) -> anyhow::Result<Gfa<OptionalFields>> {
        match &self.gfa {
            Some(path) if path.as_os_str() != "-" => load_gfa(path)
                .with_context(|| format!("failed to load {}", path.display())),
            _ => load_gfa_reader(std::io::stdin().lock())
                .context("failed to load GFA from stdin"),
        }
    }
}

/// Overrides for the organelle classifier defaults.
#[derive(Args, Debug)]
struct OrganelleArgs {
    /// Expected genome size in bases
    #[arg(long)]
    size: Option<usize>,

    /// Standard deviations from the mean marking an outlier
    #[arg(long)]
    sigma: Option<f64>,

    /// Which tail of the coverage/GC distribution qualifies
    #[arg(long, value_enum)]
    direction: Option<OutlierDirection>,

    /// Maximum nodes in a candidate component
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Maximum edges in a candidate component
    #[arg(long)]
    max_edges: Option<usize>,
}

impl OrganelleArgs {
    fn params(&self, mut base: OrganelleParams) -> OrganelleParams {
        if let Some(size) = self.size {
            base.expected_size = size;
        }
        if let Some(sigma) = self.sigma {
            base.sigma = sigma;
        }
        if let Some(direction) = self.direction {
            base.direction = direction;
        }
        if let Some(max_nodes) = self.max_nodes {
            base.max_nodes = max_nodes;
        }
        if let Some(max_edges) = self.max_edges {
            base.max_edges = max_edges;
        }
        base
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-component summary statistics
    Stats {
        #[command(flatten)]
        input: GfaInput,

        /// Emit JSON instead of the plain table
        #[arg(long)]
        json: bool,
    },

    /// Force a linear sequence through the graph
    Linear {
        #[command(flatten)]
        input: GfaInput,

        /// Score candidate paths by coverage instead of length
        #[arg(long)]
        coverage: bool,

        /// Maximum search depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Maximum rendered path length in bases
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Render a user-supplied walk through the graph to fasta
    Path {
        #[command(flatten)]
        input: GfaInput,

        /// Comma-separated oriented steps, e.g. `11+,12-,13+`
        #[arg(short, long, conflicts_with = "walk_file")]
        walk: Option<String>,

        /// Read the walk from the first line of a file instead
        #[arg(long)]
        walk_file: Option<PathBuf>,
    },

    /// Extract the subgraph around a segment
    Extract {
        #[command(flatten)]
        input: GfaInput,

        /// Segment id at the center of the neighborhood
        #[arg(short, long)]
        segment: usize,

        /// How many undirected hops to expand
        #[arg(short, long, default_value_t = 1)]
        iterations: u32,
    },

    /// Extract the best mitochondrial candidate component
    ExtractMito {
        #[command(flatten)]
        input: GfaInput,

        #[command(flatten)]
        organelle: OrganelleArgs,
    },

    /// Extract the best chloroplast candidate component
    ExtractChloro {
        #[command(flatten)]
        input: GfaInput,

        #[command(flatten)]
        organelle: OrganelleArgs,
    },

    /// Print the sequence context around each link's junction
    Overlap {
        #[command(flatten)]
        input: GfaInput,

        /// Bases to extend past the overlap on both sides
        #[arg(short, long, default_value_t = 1000)]
        extend: usize,
    },

    /// Remove segments with no links
    Trim {
        #[command(flatten)]
        input: GfaInput,
    },

    /// Render the graph as DOT
    Dot {
        #[command(flatten)]
        input: GfaInput,
    },

    /// Print each segment as fasta
    Fasta {
        #[command(flatten)]
        input: GfaInput,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Stats { input, json } => {
            let gfa = input.load()?;
            let stats = graph_stats(&gfa)?;
            if json {
                writeln!(out, "{}", stats.to_json()?)?;
            } else {
                write!(out, "{}", stats)?;
            }
        }
        Command::Linear {
            input,
            coverage,
            max_depth,
            max_length,
        } => {
            let gfa = input.load()?;
            let (lookups, graph) = gfa.into_digraph()?;
            let opts = LinearOpts {
                limits: SearchLimits {
                    max_depth,
                    max_length,
                },
                use_coverage: coverage,
            };
            match linearize(&gfa, &lookups, &graph, &opts)? {
                Some(path) => {
                    writeln!(out, ">{}\n{}", path.fasta_header(), path.sequence)?
                }
                None => bail!("no linear path through the graph was found"),
            }
        }
        Command::Path {
            input,
            walk,
            walk_file,
        } => {
            let walk_text = match (walk, walk_file) {
                (Some(text), None) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| {
                        format!("failed to read walk from {}", path.display())
                    })?
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                _ => bail!("specify a walk with --walk or --walk-file"),
            };
            let gfa = input.load()?;
            let steps = parse_walk(&walk_text)?;
            let (lookups, graph) = gfa.into_digraph()?;
            let path = render_walk(&gfa, &lookups, &graph, &steps)?;
            writeln!(out, ">{}\n{}", path.fasta_header(), path.sequence)?;
        }
        Command::Extract {
            input,
            segment,
            iterations,
        } => {
            let gfa = input.load()?;
            let sub = extract::neighborhood(&gfa, segment, iterations)?;
            write!(out, "{}", gfa_string(&sub))?;
        }
        Command::ExtractMito { input, organelle } => {
            let gfa = input.load()?;
            let params = organelle.params(OrganelleParams::mitochondria());
            match extract::organelle(&gfa, &params)? {
                Some(sub) => write!(out, "{}", gfa_string(&sub))?,
                None => bail!("no mitochondrial candidate component found"),
            }
        }
        Command::ExtractChloro { input, organelle } => {
            let gfa = input.load()?;
            let params = organelle.params(OrganelleParams::chloroplast());
            match extract::organelle(&gfa, &params)? {
                Some(sub) => write!(out, "{}", gfa_string(&sub))?,
                None => bail!("no chloroplast candidate component found"),
            }
        }
        Command::Overlap { input, extend } => {
            let gfa = input.load()?;
            let overlaps = gfa.make_overlaps(extend)?;
            overlaps.write_fasta(&mut out)?;
            // keep the normalized coverage handy alongside the
            // junction sequences
            let (lookups, _) = gfa.into_digraph()?;
            let mut relative: Vec<_> =
                overlap::relative_coverage(&lookups).into_iter().collect();
            relative.sort_by_key(|(id, _)| *id);
            for (seg_id, rel) in relative {
                eprintln!("segment {}: relative coverage {:.2}", seg_id, rel);
            }
        }
        Command::Trim { input } => {
            let gfa = input.load()?;
            let (lookups, graph) = gfa.into_digraph()?;
            let keep = graph.trim_isolated(&lookups)?;
            write!(out, "{}", gfa_string(&gfa.subgraph(&keep)))?;
        }
        Command::Dot { input } => {
            let gfa = input.load()?;
            let (lookups, graph) = gfa.into_digraph()?;
            write!(out, "{}", dot_string(&lookups, &graph)?)?;
        }
        Command::Fasta { input } => {
            let gfa = input.load()?;
            write_fasta(&gfa, &mut out)?;
        }
    }

    Ok(())
}
