// THEORY:
// The `dataset` module is the data model shared by every stage of the pipeline.
// A `Sample` pairs one image with its `Label`, a `Partition` is an ordered list of
// samples tagged as train or test, and a `Dataset` owns exactly one of each.
//
// Key architectural principles:
// 1.  **Owned Values Between Stages**: Each stage consumes a `Dataset<I>` and hands
//     back a `Dataset<J>`. Nothing is mutated in place behind the caller's back, and
//     the image type parameter records how far along the pipeline a dataset is
//     (`GrayImage` from the loader, `Vec<u8>` once flattened).
// 2.  **Pairing Is Structural**: Images and labels never live in parallel vectors.
//     The loader zips them once, so a transform cannot drop or reorder one side.
// 3.  **Order Is Identity**: `map` walks samples front to back and keeps the
//     partition kind. Output line N always comes from input sample N.

use crate::error::{PrepError, Result};
use image::GrayImage;
use std::fmt;

/// A digit class in 0..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u8);

impl Label {
    pub fn new(digit: u8) -> Result<Self> {
        if digit > 9 {
            return Err(PrepError::InvalidLabel(digit));
        }
        Ok(Label(digit))
    }

    pub fn digit(self) -> u8 {
        self.0
    }

    /// The label as the single ASCII character written to a record.
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<u8> for Label {
    type Error = PrepError;

    fn try_from(digit: u8) -> Result<Self> {
        Label::new(digit)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Train,
    Test,
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKind::Train => write!(f, "train"),
            PartitionKind::Test => write!(f, "test"),
        }
    }
}

/// One image and the label it was published with.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<I> {
    pub image: I,
    pub label: Label,
}

impl<I> Sample<I> {
    pub fn new(image: I, label: Label) -> Self {
        Self { image, label }
    }
}

/// An ordered run of samples belonging to one side of the split.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<I> {
    pub kind: PartitionKind,
    pub samples: Vec<Sample<I>>,
}

impl<I> Partition<I> {
    pub fn new(kind: PartitionKind, samples: Vec<Sample<I>>) -> Self {
        Self { kind, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Transforms every image, keeping sample order, labels and partition kind.
    pub fn map<J>(self, mut f: impl FnMut(I) -> J) -> Partition<J> {
        let samples = self
            .samples
            .into_iter()
            .map(|sample| Sample::new(f(sample.image), sample.label))
            .collect();
        Partition::new(self.kind, samples)
    }
}

/// The train and test partitions of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<I> {
    pub train: Partition<I>,
    pub test: Partition<I>,
}

/// Images as delivered by the loader.
pub type RawDataset = Dataset<GrayImage>;
/// Flattened, binarized images ready to be serialized.
pub type PreparedDataset = Dataset<Vec<u8>>;

impl<I> Dataset<I> {
    pub fn new(train: Vec<Sample<I>>, test: Vec<Sample<I>>) -> Self {
        Self {
            train: Partition::new(PartitionKind::Train, train),
            test: Partition::new(PartitionKind::Test, test),
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Train samples first, then test samples, each in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample<I>> {
        self.train.samples.iter().chain(self.test.samples.iter())
    }

    /// Applies `f` to every train image, then every test image.
    pub fn map<J>(self, mut f: impl FnMut(I) -> J) -> Dataset<J> {
        Dataset {
            train: self.train.map(&mut f),
            test: self.test.map(&mut f),
        }
    }
}

/// The sizes a loaded dataset must have before it is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetShape {
    pub train_len: usize,
    pub test_len: usize,
    pub rows: u32,
    pub cols: u32,
}

/// The published MNIST split: 60,000 training and 10,000 test digits of 28x28.
pub const MNIST_SHAPE: DatasetShape = DatasetShape {
    train_len: 60_000,
    test_len: 10_000,
    rows: 28,
    cols: 28,
};

impl RawDataset {
    /// Checks partition sizes and every image's dimensions against `shape`.
    pub fn verify(&self, shape: &DatasetShape) -> Result<()> {
        let expected_lens = [
            (&self.train, shape.train_len),
            (&self.test, shape.test_len),
        ];
        for (partition, expected) in expected_lens {
            if partition.len() != expected {
                return Err(PrepError::Shape(format!(
                    "{} partition has {} samples, expected {}",
                    partition.kind,
                    partition.len(),
                    expected
                )));
            }

            if let Some((index, sample)) = partition
                .samples
                .iter()
                .enumerate()
                .find(|(_, s)| s.image.dimensions() != (shape.cols, shape.rows))
            {
                let (width, height) = sample.image.dimensions();
                return Err(PrepError::Shape(format!(
                    "{} image {} is {}x{}, expected {}x{}",
                    partition.kind, index, width, height, shape.cols, shape.rows
                )));
            }
        }
        Ok(())
    }
}
