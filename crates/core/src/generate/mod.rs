//! Seeded synthetic dataset generators.
//!
//! - [`college`]: the clean relational dataset matching the college schema
//! - [`messy`]: a denormalised student sheet with injected quality problems
//! - [`sales`]: a flat sales ledger for statistics exercises
//!
//! Generation is deterministic for a given seed. Each generator builds its
//! records in memory and then writes them out with [`write_csv`].

pub mod college;
pub mod messy;
pub mod sales;

use std::fs::File;
use std::path::Path;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Date;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// Create the deterministic RNG every generator draws from.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniformly pick a date in `start..=end`.
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, start: Date, end: Date) -> Date {
    let span = (end - start).num_days().max(0);
    start + Duration::days(rng.random_range(0..=span))
}

/// Build a date from literal parts. Only used with known-valid constants.
pub(crate) fn ymd(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd_opt(year, month, day).unwrap_or(Date::MIN)
}

/// Pick one element from a non-empty constant pool.
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Round to two decimal places, the precision of every money column.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serialize `rows` to `dir/file_name` with a header row.
///
/// Returns the number of data rows written.
pub fn write_csv<T: Serialize>(dir: &Path, file_name: &str, rows: &[T]) -> Result<usize, CoreError> {
    let path = dir.join(file_name);
    let shown = path.display().to_string();

    let file = File::create(&path).map_err(|source| CoreError::Io {
        path: shown.clone(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(|source| CoreError::Csv {
            path: shown.clone(),
            source,
        })?;
    }
    writer.flush().map_err(|source| CoreError::Io {
        path: shown.clone(),
        source,
    })?;

    tracing::debug!(path = %shown, rows = rows.len(), "CSV written");
    Ok(rows.len())
}

/// Create the output directory if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), CoreError> {
    std::fs::create_dir_all(dir).map_err(|source| CoreError::Io {
        path: dir.display().to_string(),
        source,
    })
}

/// Row counts for each file a generator produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub files: Vec<FileSummary>,
}

/// One written file and its data row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub rows: usize,
}

impl DatasetSummary {
    pub fn push(&mut self, file_name: impl Into<String>, rows: usize) {
        self.files.push(FileSummary {
            file_name: file_name.into(),
            rows,
        });
    }

    /// Row count for a file, if it was written.
    pub fn rows_for(&self, file_name: &str) -> Option<usize> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| f.rows)
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_date_stays_in_range() {
        let mut rng = seeded_rng(7);
        let start = ymd(2023, 1, 1);
        let end = ymd(2023, 1, 10);
        for _ in 0..500 {
            let d = random_date(&mut rng, start, end);
            assert!(d >= start && d <= end);
        }
    }

    #[test]
    fn random_date_single_day_range() {
        let mut rng = seeded_rng(7);
        let day = ymd(2024, 2, 29);
        assert_eq!(random_date(&mut rng, day, day), day);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded_rng(DEFAULT_SEED);
        let mut b = seeded_rng(DEFAULT_SEED);
        let xs: Vec<u32> = (0..10).map(|_| a.random_range(0..1000)).collect();
        let ys: Vec<u32> = (0..10).map(|_| b.random_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn round2_rounds_half_away() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(12.344), 12.34);
    }

    #[test]
    fn summary_totals() {
        let mut summary = DatasetSummary::default();
        summary.push("a.csv", 3);
        summary.push("b.csv", 4);
        assert_eq!(summary.total_rows(), 7);
        assert_eq!(summary.rows_for("b.csv"), Some(4));
        assert_eq!(summary.rows_for("c.csv"), None);
    }
}
