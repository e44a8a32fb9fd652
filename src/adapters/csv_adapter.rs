//! CSV file data adapter.
//!
//! One file per code, `<CODE>.csv`, header row then
//! `date,open,high,low,close,volume` records with `%Y-%m-%d` dates.

use crate::domain::error::SteptraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn column<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, SteptraderError> {
    record.get(index).ok_or_else(|| SteptraderError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_f64(value: &str, name: &str) -> Result<f64, SteptraderError> {
    value.parse().map_err(|e| SteptraderError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, code: &str) -> Result<Vec<OhlcvBar>, SteptraderError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| SteptraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SteptraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = column(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SteptraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let open = parse_f64(column(&record, 1, "open")?, "open")?;
            let high = parse_f64(column(&record, 2, "high")?, "high")?;
            let low = parse_f64(column(&record, 3, "low")?, "low")?;
            let close = parse_f64(column(&record, 4, "close")?, "close")?;

            let volume: i64 = column(&record, 5, "volume")?
                .parse()
                .map_err(|e| SteptraderError::Data {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, code: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(format!("{}.csv", code))).unwrap();
        write!(file, "{}", content).unwrap();
    }

    const HEADER: &str = "date,open,high,low,close,volume\n";

    #[test]
    fn fetch_parses_and_sorts_rows() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "BHP",
            &format!(
                "{}2024-01-03,103,104,102,103.5,3000\n2024-01-01,101,102,100,101.5,1000\n2024-01-02,102,103,101,102.5,2000\n",
                HEADER
            ),
        );

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_ohlcv("BHP").unwrap();

        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(bars[0].code, "BHP");
        assert!((bars[0].close - 101.5).abs() < f64::EPSILON);
        assert_eq!(bars[2].volume, 3000);
    }

    #[test]
    fn fetch_missing_file_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_ohlcv("GHOST").unwrap_err();
        assert!(matches!(err, SteptraderError::Data { .. }));
    }

    #[test]
    fn fetch_invalid_date_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BAD", &format!("{}01/02/2024,1,1,1,1,1\n", HEADER));

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_ohlcv("BAD").unwrap_err();
        assert!(matches!(err, SteptraderError::Data { ref reason } if reason.contains("date")));
    }

    #[test]
    fn fetch_invalid_price_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BAD", &format!("{}2024-01-01,1,1,xyz,1,1\n", HEADER));

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_ohlcv("BAD").unwrap_err();
        assert!(matches!(err, SteptraderError::Data { ref reason } if reason.contains("low")));
    }

    #[test]
    fn fetch_short_row_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BAD", &format!("{}2024-01-01,1,1,1,1\n", HEADER));

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_ohlcv("BAD").unwrap_err();
        assert!(matches!(err, SteptraderError::Data { .. }));
    }

    #[test]
    fn fetch_header_only_yields_no_bars() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "EMPTY", HEADER);

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_ohlcv("EMPTY").unwrap();
        assert!(bars.is_empty());
    }
}
