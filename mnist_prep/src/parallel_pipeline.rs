// THEORY:
// Every image is processed independently, so the resize/binarize/flatten stage can
// be spread across cores. What cannot change is the output order: line N of the file
// must still be sample N of the source.
//
// `ParallelPrep` splits each partition into `workers` contiguous chunks, moves each
// chunk into a blocking task, and joins the handles with `try_join_all`. The join
// yields results in submission order no matter which task finishes first, so
// concatenating the chunks rebuilds the partition in its original order. Loading and
// writing stay sequential.

use crate::core_modules::binarizer::Bit;
use crate::core_modules::dataset::{Partition, PreparedDataset, Sample};
use crate::core_modules::loader::MnistSource;
use crate::error::{PrepError, Result};
use crate::pipeline::{PrepConfig, PrepReport, prepare_image, write_report};
use futures::future::try_join_all;
use image::GrayImage;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ParallelPrep {
    config: Arc<PrepConfig>,
}

impl ParallelPrep {
    pub fn new(config: PrepConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    pub async fn run<S>(&self, source: S) -> Result<PrepReport>
    where
        S: MnistSource + Send + 'static,
    {
        let raw = tokio::task::spawn_blocking(move || source.load())
            .await
            .map_err(|e| PrepError::Worker(e.to_string()))??;
        raw.verify(&self.config.expected_shape)?;

        info!(
            "preparing {} train and {} test images on {} workers",
            raw.train.len(),
            raw.test.len(),
            self.config.workers
        );
        let prepared = PreparedDataset {
            train: self.prepare_partition(raw.train).await?,
            test: self.prepare_partition(raw.test).await?,
        };

        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || write_report(&config, &prepared))
            .await
            .map_err(|e| PrepError::Worker(e.to_string()))?
    }

    pub async fn prepare_partition(
        &self,
        partition: Partition<GrayImage>,
    ) -> Result<Partition<Vec<Bit>>> {
        let kind = partition.kind;
        let workers = self.config.workers.max(1);
        let chunk_len = partition.len().div_ceil(workers).max(1);

        let mut handles = Vec::with_capacity(workers);
        let mut remaining = partition.samples;
        while !remaining.is_empty() {
            let tail = remaining.split_off(chunk_len.min(remaining.len()));
            let chunk = std::mem::replace(&mut remaining, tail);
            let config = Arc::clone(&self.config);

            handles.push(tokio::task::spawn_blocking(move || {
                chunk
                    .into_iter()
                    .map(|sample| {
                        Sample::new(prepare_image(&sample.image, &config), sample.label)
                    })
                    .collect::<Vec<_>>()
            }));
        }
        debug!(
            "{} partition split into {} chunks of up to {}",
            kind,
            handles.len(),
            chunk_len
        );

        let chunks = try_join_all(handles)
            .await
            .map_err(|e| PrepError::Worker(e.to_string()))?;

        Ok(Partition::new(kind, chunks.into_iter().flatten().collect()))
    }
}
