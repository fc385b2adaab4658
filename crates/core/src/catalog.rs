//! The college-management tables and the order they must be touched in.
//!
//! Every tool that walks the schema (setup, load, truncate, access repair)
//! goes through [`CollegeTable`] so the dependency order lives in one place.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Insert chunk size for small and medium tables.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Insert chunk size for the high-volume fact tables.
pub const LARGE_BATCH_SIZE: usize = 5000;

// ---------------------------------------------------------------------------
// College Table
// ---------------------------------------------------------------------------

/// One of the eight tables of the college schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollegeTable {
    Departments,
    Courses,
    Students,
    Enrollments,
    Attendance,
    Results,
    Fees,
    Activities,
}

impl CollegeTable {
    /// All tables in foreign-key dependency order (parents first).
    pub const ALL: [CollegeTable; 8] = [
        Self::Departments,
        Self::Courses,
        Self::Students,
        Self::Enrollments,
        Self::Attendance,
        Self::Results,
        Self::Fees,
        Self::Activities,
    ];

    /// Tables in the order they can be dropped without violating foreign keys.
    pub fn drop_order() -> impl Iterator<Item = CollegeTable> {
        Self::ALL.into_iter().rev()
    }

    /// Table name as used in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::Courses => "courses",
            Self::Students => "students",
            Self::Enrollments => "enrollments",
            Self::Attendance => "attendance",
            Self::Results => "results",
            Self::Fees => "fees",
            Self::Activities => "activities",
        }
    }

    /// Parse a table name, ignoring case. Returns `None` for unknown tables.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// File name of the table's CSV within a dataset directory.
    pub fn csv_file(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Number of rows sent per multi-row insert.
    pub fn batch_size(&self) -> usize {
        match self {
            Self::Attendance | Self::Results | Self::Fees => LARGE_BATCH_SIZE,
            _ => DEFAULT_BATCH_SIZE,
        }
    }

    /// Human label used in progress output, e.g. `Departments`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Departments => "Departments",
            Self::Courses => "Courses",
            Self::Students => "Students",
            Self::Enrollments => "Enrollments",
            Self::Attendance => "Attendance",
            Self::Results => "Results",
            Self::Fees => "Fees",
            Self::Activities => "Activities",
        }
    }
}

impl std::fmt::Display for CollegeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
