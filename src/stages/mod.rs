//! The analysis stages, in the order the pipeline runs them.
//!
//! | Stage | Program | Enabled by |
//! |-------|---------|------------|
//! | [`select`] | `mash`, `average_nucleotide_identity.py` | `--mash_selection` |
//! | [`mapper`] | `union`, `progressiveMauve` | always |
//! | [`extract`] | (in process) | always |
//! | [`annotate`] | `prokka`, `blastx` | always / `--proteindb` |
//! | [`kmer`] | (in process) | `--kmers` |
//! | [`repeats`] | `trf` | `--tandem_repeats` |
//! | [`quast`] | `quast.py` | `--quast` |
//! | [`coverage`] | `samtools` | `--coverage` |
//!
//! Stages take the [`RunConfig`](crate::core::config::RunConfig) and a
//! [`ToolRunner`](crate::tools::ToolRunner) explicitly and return the paths
//! or values later stages need.

pub mod annotate;
pub mod coverage;
pub mod extract;
pub mod kmer;
pub mod mapper;
pub mod quast;
pub mod repeats;
pub mod select;
