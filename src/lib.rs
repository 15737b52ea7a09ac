//! # saspector
//!
//! Compare a draft bacterial genome assembly with a closed reference and find
//! out what the draft is missing.
//!
//! progressiveMauve aligns the two genomes; its backbone file tells which
//! reference regions have no counterpart in the draft. Those unmapped regions
//! are extracted with flanking sequence, summarized, and handed to a series of
//! optional analyses.
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface
//! - [`core`]: Run configuration, regions, contig layouts and sequence statistics
//! - [`parsing`]: Readers for FASTA and the tabular output of the external programs
//! - [`tools`]: Running external programs and checking they are installed
//! - [`stages`]: The analysis steps, one module per program or computation
//! - [`pipeline`]: Preflight checks and stage orchestration
//! - [`utils`]: Option validation and output directory handling

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod stages;
pub mod tools;
pub mod utils;

pub use core::config::RunConfig;
pub use core::region::{Region, RegionKind, RegionSets};
pub use pipeline::{execute, RunSummary};
