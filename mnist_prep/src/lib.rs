// THEORY:
// This file is the entry point for the `mnist_prep` library crate. It exposes the
// two ways of running the preparation (`pipeline::PrepPipeline`, sequential, and
// `parallel_pipeline::ParallelPrep`, multi-core with identical output) together with
// the building blocks in `core_modules`: the data model, the IDX loader, the
// resize/binarize/flatten stages, and the text record writer and reader.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::dataset::{Dataset, Label, Partition, PartitionKind, Sample};
pub use error::{PrepError, Result};
pub use parallel_pipeline::ParallelPrep;
pub use pipeline::{PrepConfig, PrepPipeline, PrepReport};
