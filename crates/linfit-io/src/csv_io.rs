use linfit_core::Matrix;
use linfit_data::DataSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IoError, IoResult};

/// How a CSV file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Skip the first row.
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions { has_header: true }
    }
}

/// Read a numeric CSV file into a matrix. Every field must parse as `f64`
/// and every row must have the same number of fields.
pub fn read_csv<P: AsRef<Path>>(path: P, has_header: bool) -> IoResult<Matrix<f64>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut data = Vec::new();
    let mut n_rows = 0usize;
    let mut n_cols = 0usize;

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        if row == 0 {
            n_cols = record.len();
        }
        for (col, field) in record.iter().enumerate() {
            let val: f64 = field.parse().map_err(|_| IoError::Parse {
                row,
                col,
                value: field.to_string(),
            })?;
            data.push(val);
        }
        n_rows += 1;
    }

    if n_rows == 0 {
        return Err(IoError::NoData(path.display().to_string()));
    }
    Ok(Matrix::new(data, n_rows, n_cols)?)
}

/// Write a matrix to a CSV file with optional headers.
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    data: &Matrix<f64>,
    headers: Option<&[String]>,
) -> IoResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;

    if let Some(h) = headers {
        wtr.write_record(h)?;
    }

    for i in 0..data.rows() {
        let row: Vec<String> = data.row(i)?.iter().map(|v| v.to_string()).collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// A labelled dataset read from CSV: the last column holds the labels,
/// the others the features.
///
/// Loading never panics. A file that cannot be read or parsed yields an
/// empty dataset whose [`is_good`](DataSource::is_good) is `false`; the
/// reason is logged at `error` level.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    features: Matrix<f64>,
    labels: Matrix<f64>,
    good: bool,
}

impl CsvDataset {
    pub fn load<P: AsRef<Path>>(path: P, options: CsvOptions) -> Self {
        let path = path.as_ref();
        match Self::try_load(path, options) {
            Ok(ds) => ds,
            Err(e) => {
                log::error!("failed to load {}: {}", path.display(), e);
                CsvDataset {
                    features: Matrix::zeros(0, 0),
                    labels: Matrix::zeros(0, 1),
                    good: false,
                }
            }
        }
    }

    /// Like [`load`](Self::load), but hands the error back instead of
    /// recording it.
    pub fn try_load<P: AsRef<Path>>(path: P, options: CsvOptions) -> IoResult<Self> {
        let path = path.as_ref();
        let raw = read_csv(path, options.has_header)?;
        let cols = raw.cols();
        if cols < 2 {
            return Err(IoError::TooFewColumns(cols));
        }
        let features = raw.slice_cols(0, cols - 1)?;
        let labels = raw.slice_cols(cols - 1, cols)?;
        log::info!(
            "loaded {}: {} rows, {} features",
            path.display(),
            features.rows(),
            features.cols()
        );
        Ok(CsvDataset {
            features,
            labels,
            good: true,
        })
    }
}

impl DataSource<f64> for CsvDataset {
    fn features(&self) -> &Matrix<f64> {
        &self.features
    }

    fn labels(&self) -> &Matrix<f64> {
        &self.labels
    }

    fn is_good(&self) -> bool {
        self.good
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("linfit-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_load_splits_last_column() {
        let path = temp_path("split.csv");
        fs::write(&path, "x1,x2,y\n1,2,3\n4,5,6\n").unwrap();

        let ds = CsvDataset::load(&path, CsvOptions::default());
        assert!(ds.is_good());
        assert_eq!(ds.features().shape(), (2, 2));
        assert_eq!(ds.features().data(), &[1.0, 2.0, 4.0, 5.0]);
        assert_eq!(ds.labels().data(), &[3.0, 6.0]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_headerless_file() {
        let path = temp_path("noheader.csv");
        fs::write(&path, "1, 2, -1\n0.5, 3, 1\n").unwrap();

        let ds = CsvDataset::load(&path, CsvOptions { has_header: false });
        assert!(ds.is_good());
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.labels().data(), &[-1.0, 1.0]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_not_good() {
        let ds = CsvDataset::load(temp_path("does-not-exist.csv"), CsvOptions::default());
        assert!(!ds.is_good());
        assert_eq!(ds.n_samples(), 0);
    }

    #[test]
    fn test_bad_field_reported() {
        let path = temp_path("bad.csv");
        fs::write(&path, "a,b\n1,2\n3,oops\n").unwrap();

        let err = CsvDataset::try_load(&path, CsvOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::Parse { row: 1, col: 1, .. }));
        assert!(!CsvDataset::load(&path, CsvOptions::default()).is_good());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_single_column_rejected() {
        let path = temp_path("single.csv");
        fs::write(&path, "y\n1\n2\n").unwrap();
        assert!(matches!(
            CsvDataset::try_load(&path, CsvOptions::default()),
            Err(IoError::TooFewColumns(1))
        ));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_then_read() {
        let path = temp_path("roundtrip.csv");
        let m: Matrix<f64> = Matrix::from_rows(&[vec![1.5, -2.0], vec![0.25, 4.0]]).unwrap();
        let headers = vec!["a".to_string(), "b".to_string()];
        write_csv(&path, &m, Some(headers.as_slice())).unwrap();

        let back = read_csv(&path, true).unwrap();
        assert_eq!(back, m);
        fs::remove_file(&path).ok();
    }
}
