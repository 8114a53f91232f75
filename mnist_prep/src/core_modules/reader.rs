// THEORY:
// The `reader` is the consumer side of the prepared file. Every character of a line
// except the last is a pixel, the last one is the label, and position alone decides
// the partition: the first `train_len` lines are training samples, the rest test.
// It validates each line strictly so a truncated or hand-edited file is caught at
// the line where it goes wrong.

use crate::core_modules::binarizer::Bit;
use crate::core_modules::dataset::{Dataset, Label, PreparedDataset, Sample};
use crate::core_modules::serializer::{RECORD_PIXELS, RECORD_WIDTH};
use crate::error::{PrepError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parses one line (without its newline). `line_number` is 1-based and only used in errors.
pub fn parse_record(line: &str, line_number: usize) -> Result<Sample<Vec<Bit>>> {
    let bytes = line.as_bytes();
    if bytes.len() != RECORD_WIDTH {
        return Err(PrepError::record(
            line_number,
            format!("expected {} characters, found {}", RECORD_WIDTH, bytes.len()),
        ));
    }

    let mut pixels = Vec::with_capacity(RECORD_PIXELS);
    for (i, &c) in bytes[..RECORD_PIXELS].iter().enumerate() {
        match c {
            b'0' => pixels.push(0),
            b'1' => pixels.push(1),
            _ => {
                return Err(PrepError::record(
                    line_number,
                    format!("pixel {} is {:?}, expected '0' or '1'", i, c as char),
                ));
            }
        }
    }

    let label_char = bytes[RECORD_PIXELS];
    if !label_char.is_ascii_digit() {
        return Err(PrepError::record(
            line_number,
            format!("label is {:?}, expected a digit", label_char as char),
        ));
    }
    let label = Label::new(label_char - b'0')?;

    Ok(Sample::new(pixels, label))
}

/// Reads a prepared file back into its train and test partitions.
pub fn read_prepared(path: &Path, train_len: usize) -> Result<PreparedDataset> {
    let reader = BufReader::new(File::open(path)?);
    let mut train = Vec::with_capacity(train_len);
    let mut test = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let sample = parse_record(&line?, index + 1)?;
        if index < train_len {
            train.push(sample);
        } else {
            test.push(sample);
        }
    }

    Ok(Dataset::new(train, test))
}

/// Reads the record on 0-based line `index`.
pub fn read_record(path: &Path, index: usize) -> Result<Sample<Vec<Bit>>> {
    let reader = BufReader::new(File::open(path)?);
    match reader.lines().nth(index) {
        Some(line) => parse_record(&line?, index + 1),
        None => Err(PrepError::record(index + 1, "past the end of the file")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn line(pixel: char, label: char) -> String {
        let mut s: String = std::iter::repeat_n(pixel, RECORD_PIXELS).collect();
        s.push(label);
        s
    }

    #[test]
    fn parses_a_valid_line() {
        let sample = parse_record(&line('1', '7'), 1).unwrap();
        assert_eq!(sample.image, vec![1; RECORD_PIXELS]);
        assert_eq!(sample.label.digit(), 7);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = parse_record("0101", 12).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRecord { line: 12, .. }));
    }

    #[test]
    fn rejects_non_binary_pixel() {
        let mut bad = line('0', '3');
        bad.replace_range(10..11, "5");
        assert!(parse_record(&bad, 1).is_err());
    }

    #[test]
    fn rejects_non_digit_label() {
        assert!(parse_record(&line('0', 'x'), 1).is_err());
    }

    #[test]
    fn splits_partitions_by_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mnist.txt");
        let contents = [line('0', '1'), line('1', '2'), line('0', '3')].join("\n") + "\n";
        fs::write(&path, contents).unwrap();

        let dataset = read_prepared(&path, 2).unwrap();

        assert_eq!(dataset.train.len(), 2);
        assert_eq!(dataset.test.len(), 1);
        assert_eq!(dataset.test.samples[0].label.digit(), 3);
    }

    #[test]
    fn read_record_picks_one_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mnist.txt");
        fs::write(&path, format!("{}\n{}\n", line('0', '4'), line('1', '5'))).unwrap();

        let sample = read_record(&path, 1).unwrap();
        assert_eq!(sample.label.digit(), 5);
        assert!(read_record(&path, 2).is_err());
    }
}
