//! A toolkit for exploring and pulling apart assembly graphs in GFA
//! format, aimed at pulling organelle genomes out of whole-genome
//! assemblies.
//!
//! The GFA model ([`gfa`], [`optfields`], [`cigar`], [`parser`]) is
//! generic over optional field storage: use `()` to skip tags
//! entirely, or [`optfields::OptionalFields`] to keep them, which the
//! coverage-aware tools need. On top of the model sit the graph
//! representations ([`graph`]) and the tools: path enumeration
//! ([`graph::paths`]), linearization ([`linear`]), per-component
//! statistics and organelle classification ([`stats`]), subgraph
//! extraction ([`extract`]), and junction inspection ([`overlap`]).
//!
//! ```no_run
//! use asmtk::load::load_gfa;
//! use asmtk::optfields::OptionalFields;
//! use asmtk::stats::graph_stats;
//!
//! # fn main() -> asmtk::error::Result<()> {
//! let gfa = load_gfa::<OptionalFields, _>("assembly.gfa")?;
//! let stats = graph_stats(&gfa)?;
//! print!("{}", stats);
//! # Ok(())
//! # }
//! ```

pub mod cigar;
pub mod cli;
pub mod error;
pub mod extract;
pub mod gfa;
pub mod graph;
pub mod linear;
pub mod load;
pub mod optfields;
pub mod overlap;
pub mod parser;
pub mod stats;
pub mod util;
pub mod writer;
