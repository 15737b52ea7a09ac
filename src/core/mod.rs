//! Core data types shared by the pipeline stages.
//!
//! - [`RunConfig`](config::RunConfig): the resolved command line, passed explicitly to every stage
//! - [`Region`](region::Region), [`RegionKind`](region::RegionKind),
//!   [`RegionSets`](region::RegionSets): intervals extracted from the Mauve backbone
//! - [`Contig`](contig::Contig), [`ContigLayout`](contig::ContigLayout): contig offsets inside a
//!   concatenated multi-record FASTA
//! - [`sequence`]: GC content and six-frame translation statistics
//!
//! ## Coordinates
//!
//! | Source | Convention |
//! |--------|------------|
//! | Mauve backbone | 1-based, inclusive, sign = orientation, 0 = absent |
//! | [`Region`](region::Region) | 1-based, inclusive, unsigned |
//! | BED / [`ContigSpan`](contig::ContigSpan) | 0-based, half-open |

pub mod config;
pub mod contig;
pub mod region;
pub mod sequence;
