// THEORY:
// The `loader` is the only stage that touches the outside world. It produces a
// `RawDataset` from the four IDX files MNIST is published as, fetching and caching
// them when they are not already on disk.
//
// Key architectural principles:
// 1.  **One Seam**: Everything downstream depends on the `MnistSource` trait, not on
//     where the bytes come from. `IdxDirectory` reads files already on disk,
//     `RemoteMnist` fills a cache directory first and then reads it the same way.
// 2.  **Fail As Unavailable**: A refused connection, an HTTP error, a missing cache
//     file or a failed cache write all surface as `PrepError::DataUnavailable`.
//     Malformed bytes are a different failure (`PrepError::Shape`): the data arrived
//     but is not MNIST.
// 3.  **Atomic Cache Fill**: A download is decompressed into a `.part` file and
//     renamed into place only once complete, so an interrupted run never leaves a
//     truncated file that a later run would trust.
//
// IDX layout: a big-endian u32 magic (2051 for images, 2049 for labels), a u32 item
// count, for images a u32 row count and a u32 column count, then one byte per value.

use crate::core_modules::dataset::{Dataset, Label, RawDataset, Sample};
use crate::error::{PrepError, Result};
use flate2::read::GzDecoder;
use image::GrayImage;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";
pub const MNIST_FILES: [&str; 4] = [TRAIN_IMAGES, TRAIN_LABELS, TEST_IMAGES, TEST_LABELS];

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

/// Anything that can hand over the labeled train/test split.
pub trait MnistSource {
    fn load(&self) -> Result<RawDataset>;
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}

fn malformed(what: &str, err: io::Error) -> PrepError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        PrepError::Shape(format!("{what} is truncated"))
    } else {
        PrepError::unavailable(what, err)
    }
}

fn check_magic<R: Read>(reader: &mut R, expected: u32, what: &str) -> Result<()> {
    let magic = read_u32(reader).map_err(|e| malformed(what, e))?;
    if magic != expected {
        return Err(PrepError::Shape(format!(
            "{what} has magic number {magic}, expected {expected}"
        )));
    }
    Ok(())
}

/// Reads exactly `len` payload bytes. The buffer grows with what the reader actually
/// delivers, so a header that lies about its size cannot force a huge allocation.
fn read_payload<R: Read>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut data)
        .map_err(|e| malformed(what, e))?;
    if data.len() != len {
        return Err(PrepError::Shape(format!(
            "{what} is truncated: header declares {len} bytes, found {}",
            data.len()
        )));
    }
    Ok(data)
}

/// Parses an IDX3 image file into one greyscale image per item.
pub fn read_images<R: Read>(reader: &mut R) -> Result<Vec<GrayImage>> {
    const WHAT: &str = "image file";
    check_magic(reader, IMAGES_MAGIC, WHAT)?;
    let count = read_u32(reader).map_err(|e| malformed(WHAT, e))?;
    let rows = read_u32(reader).map_err(|e| malformed(WHAT, e))?;
    let cols = read_u32(reader).map_err(|e| malformed(WHAT, e))?;

    let image_len = (rows as usize)
        .checked_mul(cols as usize)
        .filter(|&len| len > 0)
        .ok_or_else(|| PrepError::Shape(format!("{WHAT} declares {rows}x{cols} images")))?;
    let payload_len = (count as usize).checked_mul(image_len).ok_or_else(|| {
        PrepError::Shape(format!("{WHAT} declares {count} images of {rows}x{cols}"))
    })?;

    let data = read_payload(reader, payload_len, WHAT)?;

    data.chunks_exact(image_len)
        .map(|pixels| {
            GrayImage::from_raw(cols, rows, pixels.to_vec())
                .ok_or_else(|| PrepError::Shape(format!("cannot build a {cols}x{rows} image")))
        })
        .collect()
}

/// Parses an IDX1 label file.
pub fn read_labels<R: Read>(reader: &mut R) -> Result<Vec<Label>> {
    const WHAT: &str = "label file";
    check_magic(reader, LABELS_MAGIC, WHAT)?;
    let count = read_u32(reader).map_err(|e| malformed(WHAT, e))? as usize;

    let data = read_payload(reader, count, WHAT)?;

    data.into_iter().map(Label::new).collect()
}

/// Zips images with their labels, refusing to pair lists of different lengths.
pub fn pair_samples(
    images: Vec<GrayImage>,
    labels: Vec<Label>,
) -> Result<Vec<Sample<GrayImage>>> {
    if images.len() != labels.len() {
        return Err(PrepError::Shape(format!(
            "{} images but {} labels",
            images.len(),
            labels.len()
        )));
    }
    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(image, label)| Sample::new(image, label))
        .collect())
}

/// Reads the four decompressed IDX files from a local directory.
#[derive(Debug, Clone)]
pub struct IdxDirectory {
    dir: PathBuf,
}

impl IdxDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn open(&self, name: &str) -> Result<BufReader<File>> {
        let path = self.dir.join(name);
        File::open(&path)
            .map(BufReader::new)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))
    }

    fn load_split(&self, images: &str, labels: &str) -> Result<Vec<Sample<GrayImage>>> {
        let images = read_images(&mut self.open(images)?)?;
        let labels = read_labels(&mut self.open(labels)?)?;
        pair_samples(images, labels)
    }
}

impl MnistSource for IdxDirectory {
    fn load(&self) -> Result<RawDataset> {
        let train = self.load_split(TRAIN_IMAGES, TRAIN_LABELS)?;
        let test = self.load_split(TEST_IMAGES, TEST_LABELS)?;
        info!(
            "loaded {} train and {} test samples from {}",
            train.len(),
            test.len(),
            self.dir.display()
        );
        Ok(Dataset::new(train, test))
    }
}

/// Downloads any missing IDX file into `cache_dir`, then reads the cache.
#[derive(Debug, Clone)]
pub struct RemoteMnist {
    cache_dir: PathBuf,
    base_url: String,
}

impl RemoteMnist {
    pub fn new(cache_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            base_url: base_url.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Makes sure every file is present locally, fetching only what is missing.
    pub fn ensure_cached(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| PrepError::unavailable(self.cache_dir.display().to_string(), e))?;

        for name in MNIST_FILES {
            let target = self.cache_dir.join(name);
            if target.is_file() {
                debug!("{} already cached", target.display());
                continue;
            }
            self.download(name, &target)?;
        }
        Ok(())
    }

    fn download(&self, name: &str, target: &Path) -> Result<()> {
        let url = format!("{}{}.gz", self.base_url, name);
        info!("downloading {}", url);

        let response = ureq::get(&url)
            .call()
            .map_err(|e| PrepError::unavailable(url.clone(), e))?;
        let mut decoder = GzDecoder::new(response.into_reader());

        let partial = target.with_extension("part");
        let copied = File::create(&partial).and_then(|mut out| io::copy(&mut decoder, &mut out));
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(PrepError::unavailable(url, e));
            }
        };

        fs::rename(&partial, target)
            .map_err(|e| PrepError::unavailable(target.display().to_string(), e))?;
        debug!("cached {} ({} bytes)", target.display(), bytes);
        Ok(())
    }
}

impl MnistSource for RemoteMnist {
    fn load(&self) -> Result<RawDataset> {
        self.ensure_cached()?;
        IdxDirectory::new(&self.cache_dir).load()
    }
}
