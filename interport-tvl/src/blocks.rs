//! Block list input: a headered CSV with `number` and `timestamp` columns.
//!
//! Each cell is read up to its first non-digit, so `1000.0` or `1000abc`
//! count as block 1000. Rows whose `number` has no leading digits, or whose
//! `timestamp` is missing, has no leading digits or is zero, are skipped.
//! Extra columns are ignored.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use interport::BlockRequest;
use serde::Deserialize;

/// One raw input record; both cells are validated after reading.
#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl RawBlock {
    fn parse(&self) -> Option<BlockRequest> {
        let number = leading_integer(self.number.as_deref()?)?;
        let timestamp = leading_integer(self.timestamp.as_deref()?).filter(|&t| t != 0)?;
        Some(BlockRequest::new(number, timestamp))
    }
}

/// The unsigned integer formed by the leading digits of `cell`.
///
/// Leading whitespace and a `+` sign are allowed. Negative values, cells
/// without leading digits and values beyond `u64` yield `None`.
fn leading_integer(cell: &str) -> Option<u64> {
    let cell = cell.trim_start();
    let cell = cell.strip_prefix('+').unwrap_or(cell);
    let end = cell
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(cell.len());
    cell.get(..end)?.parse().ok()
}

/// Read the block list at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV with
/// `number` and `timestamp` headers.
pub fn read(path: &Path) -> Result<Vec<BlockRequest>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_from(file).with_context(|| format!("reading {}", path.display()))
}

/// Read a block list from any reader.
///
/// # Errors
///
/// Returns an error on malformed CSV or missing required headers.
pub fn read_from<R: Read>(reader: R) -> Result<Vec<BlockRequest>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().context("reading header row")?;
    for required in ["number", "timestamp"] {
        if !headers.iter().any(|h| h == required) {
            bail!("missing `{required}` column");
        }
    }

    let mut blocks = Vec::new();
    for (index, record) in reader.deserialize::<RawBlock>().enumerate() {
        let raw = record.with_context(|| format!("record {}", index + 1))?;
        match raw.parse() {
            Some(block) => blocks.push(block),
            None => tracing::debug!(
                record = index + 1,
                number = ?raw.number,
                timestamp = ?raw.timestamp,
                "skipping block row"
            ),
        }
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_valid_rows_in_order() {
        let input = "number,timestamp\n1000,1700000000\n2000,1700003600\n";
        let blocks = read_from(input.as_bytes()).unwrap();
        assert_eq!(
            blocks,
            vec![
                BlockRequest::new(1000, 1_700_000_000),
                BlockRequest::new(2000, 1_700_003_600),
            ]
        );
    }

    #[test]
    fn skips_malformed_rows() {
        let input = "number,timestamp\n\
                     abc,1700000000\n\
                     1000,0\n\
                     1100,\n\
                     1200,soon\n\
                     1300,1700000300\n";
        let blocks = read_from(input.as_bytes()).unwrap();
        assert_eq!(blocks, vec![BlockRequest::new(1300, 1_700_000_300)]);
    }

    #[test]
    fn reads_leading_digits_of_decimal_cells() {
        let input = "number,timestamp\n\
                     1000.0,1700000000.0\n\
                     2000abc,1700003600.5\n\
                     +3000,1700007200\n\
                     -4000,1700010800\n\
                     5000,0.9\n";
        let blocks = read_from(input.as_bytes()).unwrap();
        assert_eq!(
            blocks,
            vec![
                BlockRequest::new(1000, 1_700_000_000),
                BlockRequest::new(2000, 1_700_003_600),
                BlockRequest::new(3000, 1_700_007_200),
            ]
        );
    }

    #[test]
    fn leading_integer_cells() {
        assert_eq!(leading_integer("42"), Some(42));
        assert_eq!(leading_integer("42.9"), Some(42));
        assert_eq!(leading_integer("  7 days"), Some(7));
        assert_eq!(leading_integer("1e18"), Some(1));
        assert_eq!(leading_integer(".5"), None);
        assert_eq!(leading_integer("-1"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("99999999999999999999999"), None);
    }

    #[test]
    fn ignores_extra_columns_and_order() {
        let input = "timestamp,hash,number\n1700000000,0xabc,42\n";
        let blocks = read_from(input.as_bytes()).unwrap();
        assert_eq!(blocks, vec![BlockRequest::new(42, 1_700_000_000)]);
    }

    #[test]
    fn missing_column_is_fatal() {
        let input = "block,timestamp\n1,2\n";
        assert!(read_from(input.as_bytes()).is_err(), "no `number` column");
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(read(Path::new("/nonexistent/hourly_blocks.csv")).is_err());
    }
}
