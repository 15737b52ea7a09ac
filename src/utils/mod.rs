pub mod outdir;
pub mod validation;
