//! Row sinks: CSV (default) and Parquet.
//!
//! Both formats carry the same seven columns in the same order. The
//! balance column is always an exact decimal string since it can exceed
//! every native numeric type.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use arrow_array::{Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use clap::ValueEnum;
use interport::OutputRow;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Zstd-compressed Parquet.
    Parquet,
}

/// Arrow schema of the exported rows.
static ROW_SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    let [block_number, timestamp, user, token, balance, symbol, price] = OutputRow::HEADER;
    Arc::new(Schema::new(vec![
        Field::new(block_number, DataType::UInt64, false),
        Field::new(timestamp, DataType::UInt64, false),
        Field::new(user, DataType::Utf8, false),
        Field::new(token, DataType::Utf8, false),
        Field::new(balance, DataType::Utf8, false),
        Field::new(symbol, DataType::Utf8, false),
        Field::new(price, DataType::Float64, false),
    ]))
});

/// Write `rows` to `path` in `format`, replacing any existing file.
///
/// # Errors
///
/// Returns an error on any I/O or encoding failure.
pub fn write(path: &Path, rows: &[OutputRow], format: Format) -> Result<()> {
    replace_file(path, |file| match format {
        Format::Csv => write_csv(file, rows),
        Format::Parquet => write_parquet(file, rows),
    })
}

/// Fill a temp file next to `path` with `fill`, then rename it into place.
///
/// A failed run never leaves a truncated export or a stray temp file
/// behind; an existing file at `path` is only replaced on success.
fn replace_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(std::fs::File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let file = std::fs::File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
    if let Err(e) = fill(file) {
        if let Err(rm) = std::fs::remove_file(tmp) {
            tracing::warn!(path = %tmp.display(), error = %rm, "could not remove temp file");
        }
        return Err(e.context(format!("writing {}", tmp.display())));
    }

    std::fs::rename(tmp, path)
        .with_context(|| format!("renaming {} → {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Write `rows` as CSV with a header row.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn write_csv<W: Write>(writer: W, rows: &[OutputRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(OutputRow::HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Convert rows into a single columnar [`RecordBatch`].
///
/// # Errors
///
/// Returns an error if the Arrow `RecordBatch` construction fails.
pub fn rows_to_batch(rows: &[OutputRow]) -> Result<RecordBatch> {
    let cap = rows.len();
    let mut block_numbers = Vec::with_capacity(cap);
    let mut timestamps = Vec::with_capacity(cap);
    let mut users = Vec::with_capacity(cap);
    let mut tokens = Vec::with_capacity(cap);
    let mut balances = Vec::with_capacity(cap);
    let mut symbols = Vec::with_capacity(cap);
    let mut prices = Vec::with_capacity(cap);

    for row in rows {
        block_numbers.push(row.block_number);
        timestamps.push(row.timestamp);
        users.push(row.user_address.to_checksum(None));
        tokens.push(row.token_address.to_checksum(None));
        balances.push(row.token_balance.to_string());
        symbols.push(row.token_symbol.as_str());
        prices.push(row.usd_price);
    }

    let batch = RecordBatch::try_new(
        Arc::clone(&ROW_SCHEMA),
        vec![
            Arc::new(UInt64Array::from(block_numbers)),
            Arc::new(UInt64Array::from(timestamps)),
            Arc::new(StringArray::from(users)),
            Arc::new(StringArray::from(tokens)),
            Arc::new(StringArray::from(balances)),
            Arc::new(StringArray::from(symbols)),
            Arc::new(Float64Array::from(prices)),
        ],
    )?;
    Ok(batch)
}

/// Write `rows` as a Zstd-compressed Parquet file.
///
/// # Errors
///
/// Returns an error on I/O failure or if the Parquet writer rejects the data.
pub fn write_parquet<W: Write + Send>(writer: W, rows: &[OutputRow]) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3).context("invalid zstd level")?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(writer, Arc::clone(&ROW_SCHEMA), Some(props))?;
    writer.write(&rows_to_batch(rows)?)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{U256, address};
    use interport::TokenBalance;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;

    fn rows() -> Vec<OutputRow> {
        let row = OutputRow {
            block_number: 950,
            timestamp: 1_700_000_000,
            user_address: address!("1111111111111111111111111111111111111111"),
            token_address: address!("3333333333333333333333333333333333333333"),
            token_balance: TokenBalance::debit(U256::MAX),
            token_symbol: "USDX".to_owned(),
            usd_price: 0.0,
        };
        let mut mirror = row.clone();
        mirror.user_address = address!("2222222222222222222222222222222222222222");
        mirror.token_balance = -row.token_balance;
        vec![row, mirror]
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "block_number,timestamp,user_address,token_address,token_balance,token_symbol,usd_price"
        );
        assert_eq!(
            lines[1],
            format!(
                "950,1700000000,0x1111111111111111111111111111111111111111,\
                 0x3333333333333333333333333333333333333333,-{},USDX,0",
                U256::MAX
            )
        );
        assert_eq!(lines.len(), 3, "header plus two rows");
    }

    #[test]
    fn empty_csv_has_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputData.csv");
        std::fs::write(&path, "stale").unwrap();

        write(&path, &rows(), Format::Csv).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("block_number,"), "overwritten");
        assert!(!dir.path().join("outputData.csv.tmp").exists(), "temp file renamed");
    }

    #[test]
    fn failed_write_keeps_previous_file_and_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputData.csv");
        std::fs::write(&path, "previous export").unwrap();

        let result = replace_file(&path, |mut file| {
            file.write_all(b"block_number,timest")?;
            anyhow::bail!("disk full")
        });

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("disk full"), "cause kept: {err:#}");
        assert!(!dir.path().join("outputData.csv.tmp").exists(), "temp file removed");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous export");
    }

    #[test]
    fn parquet_keeps_exact_balances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        write(&path, &rows(), Format::Parquet).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let batches: Vec<RecordBatch> = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(batches.iter().map(RecordBatch::num_rows).sum::<usize>(), 2);

        let balances = batches[0]
            .column(4)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(balances.value(0), format!("-{}", U256::MAX));
        assert_eq!(balances.value(1), U256::MAX.to_string());
    }
}
