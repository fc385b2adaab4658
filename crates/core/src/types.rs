/// Primary keys of the college tables are PostgreSQL BIGINT.
pub type DbId = i64;

/// Calendar dates carried in CSV files and DATE columns.
pub type Date = chrono::NaiveDate;

/// ISO date format used by every clean CSV file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
