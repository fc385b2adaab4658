//! Row types for the eight college tables.
//!
//! Field order matches the CSV header of the clean dataset, so the same
//! structs are used to write the generated files and to read them back
//! in the loader.

use serde::{Deserialize, Serialize};

use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Constrained values
// ---------------------------------------------------------------------------

macro_rules! check_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All values accepted by the column's check constraint.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as stored in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse an exact stored value. Returns `None` for anything else.
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

check_enum! {
    /// `students.gender`.
    Gender { Male => "Male", Female => "Female", Other => "Other" }
}

check_enum! {
    /// `students.category` (reservation category).
    Category { Sc => "SC", St => "ST", Obc => "OBC", General => "General" }
}

check_enum! {
    /// `attendance.status`.
    AttendanceStatus { Present => "Present", Absent => "Absent" }
}

check_enum! {
    /// `results.grade`.
    Grade {
        APlus => "A+",
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        F => "F",
    }
}

check_enum! {
    /// `results.result_status`.
    ResultStatus { Pass => "Pass", Fail => "Fail" }
}

check_enum! {
    /// `fees.payment_mode`.
    PaymentMode { Cash => "Cash", Online => "Online", Upi => "UPI", Cheque => "Cheque" }
}

check_enum! {
    /// `activities.activity_type`.
    ActivityType {
        Cultural => "Cultural",
        Sports => "Sports",
        Academic => "Academic",
        Nss => "NSS",
    }
}

/// Lowest mark that still passes a course.
pub const PASS_MARK: f64 = 50.0;

impl Grade {
    /// Letter grade for a mark out of 100.
    ///
    /// Bands: 90+ A+, 80+ A, 70+ B, 60+ C, 50+ D, otherwise F. Marks are
    /// floored first so 89.5 still earns an A.
    pub fn for_marks(marks: f64) -> Self {
        match marks.floor() as i64 {
            90..=100 => Self::APlus,
            80..=89 => Self::A,
            70..=79 => Self::B,
            60..=69 => Self::C,
            50..=59 => Self::D,
            _ => Self::F,
        }
    }
}

impl ResultStatus {
    pub fn for_marks(marks: f64) -> Self {
        if marks >= PASS_MARK {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

// ---------------------------------------------------------------------------
// CSV flag encodings
// ---------------------------------------------------------------------------

/// `True` / `False` flags, as the clean dataset writes them.
///
/// Reading is lenient: only the exact text `True` counts as set.
pub mod title_case_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw == "True")
    }
}

/// `Yes` / `No` flags. Only the exact text `Yes` counts as set.
pub mod yes_no_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw == "Yes")
    }
}

/// Numbers that are usually whole (`87`, `12000`). Whole values are written
/// without a fraction; anything else keeps its decimals. Reading accepts
/// both.
pub mod whole_number {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer)
    }
}

/// Single-character flag stored in `CHAR(1)` columns.
pub fn flag_char(value: bool, set: char, unset: char) -> String {
    let marker = if value { set } else { unset };
    marker.to_string()
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row of `departments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub dept_id: DbId,
    pub dept_name: String,
    pub hod: String,
    pub building: String,
    pub established_year: i32,
}

/// A row of `courses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: DbId,
    pub course_name: String,
    pub dept_id: DbId,
    pub credits: i32,
    pub semester_offered: i32,
    pub instructor: String,
}

/// A row of `students`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: DbId,
    pub full_name: String,
    pub gender: Gender,
    pub dob: Date,
    pub city: String,
    pub state: String,
    pub dept_id: DbId,
    pub admission_year: i32,
    pub category: Category,
    #[serde(with = "title_case_bool")]
    pub hostel_resident: bool,
    pub phone: String,
    pub email: String,
}

/// A row of `enrollments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enroll_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub semester: i32,
    pub year: i32,
    pub enrollment_date: Date,
}

/// A row of `attendance`. The CSV column is `date`; the table column is
/// `attendance_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub attendance_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    #[serde(rename = "date")]
    pub attendance_date: Date,
    pub status: AttendanceStatus,
    pub lecture_hours: i32,
}

/// A row of `results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub result_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub semester: i32,
    pub exam_date: Date,
    #[serde(with = "whole_number")]
    pub marks: f64,
    pub grade: Grade,
    pub result_status: ResultStatus,
}

/// A row of `fees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeePayment {
    pub receipt_id: DbId,
    pub student_id: DbId,
    #[serde(with = "whole_number")]
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub payment_date: Date,
    pub semester: i32,
}

/// A row of `activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: DbId,
    pub student_id: DbId,
    pub activity_name: String,
    pub activity_type: ActivityType,
    pub participation_date: Date,
    #[serde(with = "yes_no_bool")]
    pub award_received: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
