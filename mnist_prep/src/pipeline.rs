// THEORY:
// The `pipeline` module is the top-level API of the preparation engine. It strings
// the core modules together in their only valid order:
//
//     load -> verify -> resize -> binarize -> flatten -> serialize
//
// and runs it once over the training partition and once over the test partition,
// writing both into the same file. `PrepPipeline` is the sequential reference: every
// image is processed on the calling thread, front to back. `ParallelPrep` in
// `parallel_pipeline` must produce byte-identical output.

use crate::core_modules::binarizer::{self, Bit};
use crate::core_modules::dataset::{DatasetShape, MNIST_SHAPE, PreparedDataset, RawDataset};
use crate::core_modules::flattener;
use crate::core_modules::loader::{MNIST_BASE_URL, MnistSource, RemoteMnist};
use crate::core_modules::resizer::{self, TARGET_SIDE};
use crate::core_modules::serializer;
use crate::error::Result;
use image::GrayImage;
use std::path::PathBuf;
use tracing::info;

pub const OUTPUT_PATH: &str = "data/mnist.txt";
pub const CACHE_DIR: &str = "data/mnist_raw";

/// Every tunable of the pipeline. The binary only ever uses `PrepConfig::default()`.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    pub output_path: PathBuf,
    /// Where the raw IDX files are cached between runs.
    pub cache_dir: PathBuf,
    pub base_url: String,
    pub target_width: u32,
    pub target_height: u32,
    /// The split the loaded dataset must match before anything is written.
    pub expected_shape: DatasetShape,
    /// Number of chunks each partition is split into by `ParallelPrep`.
    pub workers: usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(OUTPUT_PATH),
            cache_dir: PathBuf::from(CACHE_DIR),
            base_url: MNIST_BASE_URL.to_string(),
            target_width: TARGET_SIDE,
            target_height: TARGET_SIDE,
            expected_shape: MNIST_SHAPE,
            workers: num_cpus::get(),
        }
    }
}

impl PrepConfig {
    /// The dataset provider described by this config.
    pub fn remote_source(&self) -> RemoteMnist {
        RemoteMnist::new(&self.cache_dir, &self.base_url)
    }
}

/// What a finished run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepReport {
    pub train_records: usize,
    pub test_records: usize,
    pub output_path: PathBuf,
}

impl PrepReport {
    pub fn total_records(&self) -> usize {
        self.train_records + self.test_records
    }
}

/// Resize, binarize and flatten a single source image.
pub fn prepare_image(image: &GrayImage, config: &PrepConfig) -> Vec<Bit> {
    let resized = resizer::resize(image, config.target_width, config.target_height);
    let binary = binarizer::binarize(&resized);
    flattener::flatten(&binary)
}

/// Sequential reference implementation.
pub struct PrepPipeline {
    config: PrepConfig,
}

impl PrepPipeline {
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Loads from `source`, verifies, transforms both partitions and writes the output file.
    pub fn run<S: MnistSource>(&self, source: &S) -> Result<PrepReport> {
        // Stage 1: Loading
        let raw = source.load()?;

        // Stage 2: Shape check
        raw.verify(&self.config.expected_shape)?;

        // Stage 3: Resize, binarize, flatten
        let prepared = self.prepare(raw);

        // Stage 4: Serialization
        write_report(&self.config, &prepared)
    }

    pub fn prepare(&self, raw: RawDataset) -> PreparedDataset {
        info!(
            "preparing {} train and {} test images at {}x{}",
            raw.train.len(),
            raw.test.len(),
            self.config.target_width,
            self.config.target_height
        );
        raw.map(|image| prepare_image(&image, &self.config))
    }
}

pub(crate) fn write_report(config: &PrepConfig, prepared: &PreparedDataset) -> Result<PrepReport> {
    serializer::write_dataset(&config.output_path, prepared)?;
    Ok(PrepReport {
        train_records: prepared.train.len(),
        test_records: prepared.test.len(),
        output_path: config.output_path.clone(),
    })
}
