// Downloads MNIST (or reuses the local cache), shrinks every digit to 8x8,
// binarizes it and writes `data/mnist.txt`. Takes no arguments.

use anyhow::Context;
use mnist_prep::{ParallelPrep, PrepConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PrepConfig::default();
    let source = config.remote_source();
    let pipeline = ParallelPrep::new(config);

    let report = pipeline
        .run(source)
        .await
        .context("MNIST preparation failed")?;

    info!(
        "done: {} train + {} test records in {}",
        report.train_records,
        report.test_records,
        report.output_path.display()
    );
    Ok(())
}
