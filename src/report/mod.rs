//! Report generation and persistence.

mod generator;
mod writer;

pub use writer::{write_artifacts, ArtifactPaths};
