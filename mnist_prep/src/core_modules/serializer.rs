// THEORY:
// The `serializer` is the last stage of the pipeline. One sample becomes one line:
// each flattened pixel rendered as the character '0' or '1', immediately followed by
// the label digit and a newline. There is no header and no delimiter.
//
// Key architectural principles:
// 1.  **Validate at the Edge**: `format_record` refuses a pixel outside {0, 1} or a
//     vector of the wrong length, so a malformed line never reaches the file.
// 2.  **Fixed Write Order**: `write_dataset` emits the whole train partition before
//     the whole test partition, each in source order. The downstream reader relies
//     on line position alone to tell the partitions apart.
// 3.  **Scoped Handle**: The file is owned by a `BufWriter` that lives only inside
//     `write_dataset`; it is flushed on success and dropped (closed) on every path.

use crate::core_modules::binarizer::Bit;
use crate::core_modules::dataset::{Label, Partition, PreparedDataset};
use crate::core_modules::resizer::TARGET_SIDE;
use crate::error::{PrepError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Number of pixel characters on a line.
pub const RECORD_PIXELS: usize = (TARGET_SIDE * TARGET_SIDE) as usize;
/// Pixel characters plus the label digit, excluding the newline.
pub const RECORD_WIDTH: usize = RECORD_PIXELS + 1;

/// Renders one sample as a newline-terminated record.
pub fn format_record(pixels: &[Bit], label: Label) -> Result<String> {
    if pixels.len() != RECORD_PIXELS {
        return Err(PrepError::Shape(format!(
            "record needs {} pixels, got {}",
            RECORD_PIXELS,
            pixels.len()
        )));
    }

    let mut line = String::with_capacity(RECORD_WIDTH + 1);
    for (i, &bit) in pixels.iter().enumerate() {
        match bit {
            0 => line.push('0'),
            1 => line.push('1'),
            value => return Err(PrepError::NonBinaryPixel { index: i, value }),
        }
    }
    line.push(label.as_char());
    line.push('\n');
    Ok(line)
}

/// Streams records to any writer and counts them.
pub struct RecordWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write_record(&mut self, pixels: &[Bit], label: Label) -> Result<()> {
        let line = format_record(pixels, label).map_err(|e| match e {
            PrepError::NonBinaryPixel { .. } => PrepError::record(self.written + 1, e.to_string()),
            other => other,
        })?;
        self.inner.write_all(line.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    pub fn write_partition(&mut self, partition: &Partition<Vec<Bit>>) -> Result<usize> {
        let before = self.written;
        for sample in &partition.samples {
            self.write_record(&sample.image, sample.label)?;
        }
        let count = self.written - before;
        debug!("wrote {} {} records", count, partition.kind);
        Ok(count)
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Creates (or truncates) `path` and writes train then test records to it.
///
/// The parent directory is created when missing. Returns the number of lines written.
pub fn write_dataset(path: &Path, dataset: &PreparedDataset) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = RecordWriter::new(BufWriter::new(file));
    writer.write_partition(&dataset.train)?;
    writer.write_partition(&dataset.test)?;
    let written = writer.written();
    writer.finish()?;

    info!("wrote {} records to {}", written, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::dataset::{Dataset, Sample};
    use tempfile::tempdir;

    fn label(digit: u8) -> Label {
        Label::new(digit).unwrap()
    }

    #[test]
    fn all_ones_with_label_seven() {
        let line = format_record(&[1; RECORD_PIXELS], label(7)).unwrap();
        assert_eq!(line, format!("{}7\n", "1".repeat(64)));
    }

    #[test]
    fn all_zeros_with_label_zero() {
        let line = format_record(&[0; RECORD_PIXELS], label(0)).unwrap();
        assert_eq!(line, format!("{}0\n", "0".repeat(64)));
        assert_eq!(line.trim_end().len(), RECORD_WIDTH);
    }

    #[test]
    fn pixels_keep_their_order() {
        let mut pixels = [0; RECORD_PIXELS];
        pixels[0] = 1;
        pixels[63] = 1;
        let line = format_record(&pixels, label(3)).unwrap();

        assert!(line.starts_with("10"));
        assert!(line.ends_with("013\n"));
    }

    #[test]
    fn rejects_non_binary_pixel() {
        let mut pixels = [0; RECORD_PIXELS];
        pixels[5] = 2;
        assert!(matches!(
            format_record(&pixels, label(1)),
            Err(PrepError::NonBinaryPixel { index: 5, value: 2 })
        ));
    }

    #[test]
    fn rejects_short_vector() {
        assert!(matches!(format_record(&[0; 10], label(1)), Err(PrepError::Shape(_))));
    }

    #[test]
    fn record_writer_numbers_bad_lines() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(&[0; RECORD_PIXELS], label(1)).unwrap();

        let mut bad = [0; RECORD_PIXELS];
        bad[0] = 9;
        let err = writer.write_record(&bad, label(1)).unwrap_err();

        assert!(matches!(err, PrepError::InvalidRecord { line: 2, .. }));
        assert!(err.to_string().contains("pixel 0 has value 9"));
        assert_eq!(writer.written(), 1);
    }

    #[test]
    fn write_dataset_creates_directory_and_orders_partitions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("mnist.txt");
        let dataset = Dataset::new(
            vec![
                Sample::new(vec![1; RECORD_PIXELS], label(1)),
                Sample::new(vec![0; RECORD_PIXELS], label(2)),
            ],
            vec![Sample::new(vec![1; RECORD_PIXELS], label(3))],
        );

        let written = write_dataset(&path, &dataset).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let labels: Vec<char> = contents.lines().map(|l| l.chars().last().unwrap()).collect();

        assert_eq!(written, 3);
        assert_eq!(labels, vec!['1', '2', '3']);
        assert!(contents.lines().all(|l| l.len() == RECORD_WIDTH));
    }

    #[test]
    fn write_dataset_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mnist.txt");
        fs::write(&path, "stale contents that are longer than one record ".repeat(10)).unwrap();

        let dataset = Dataset::new(vec![Sample::new(vec![0; RECORD_PIXELS], label(4))], vec![]);
        write_dataset(&path, &dataset).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}4\n", "0".repeat(64)));
    }
}
