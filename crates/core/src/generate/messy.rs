//! Student sheet with deliberate data-quality problems.
//!
//! The rows start out clean and are then damaged by a fixed list of
//! corruption rules (mixed case, inconsistent phone and date formats,
//! out-of-range numbers, spelling variants of flags, blanks, duplicates).
//! The output is raw material for data-cleaning exercises, so every
//! column is carried as text.

use std::path::Path;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    ensure_dir, pick, random_date, round2, seeded_rng, write_csv, ymd, DatasetSummary,
    DEFAULT_SEED,
};
use crate::error::CoreError;
use crate::types::Date;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_ROWS: usize = 500;
pub const DEFAULT_DUPLICATES: usize = 10;
pub const MESSY_FILE: &str = "indian_college_messy_data.csv";

/// Admission dates reach back this many years from the reference date.
const ADMISSION_LOOKBACK_DAYS: i64 = 5 * 365;

const STATES: &[(&str, &str)] = &[
    ("Maharashtra", "MH"),
    ("Karnataka", "KA"),
    ("Tamil Nadu", "TN"),
    ("Delhi", "DL"),
    ("Gujarat", "GJ"),
    ("West Bengal", "WB"),
    ("Telangana", "TS"),
    ("Rajasthan", "RJ"),
    ("Uttar Pradesh", "UP"),
    ("Kerala", "KL"),
];

const DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Electronics",
    "Mechanical",
    "Civil",
    "Information Technology",
    "Electrical",
    "Chemical",
];

const PROGRAMMES: &[&str] = &["B.Tech", "M.Tech", "B.E", "M.E", "BCA", "MCA"];

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Vivaan", "Aditya", "Ishaan", "Arjun", "Sai", "Reyansh", "Kabir", "Dhruv", "Yash",
    "Aanya", "Diya", "Saanvi", "Isha", "Myra", "Anika", "Kiara", "Riya", "Tara", "Nandini",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Verma", "Iyer", "Banerjee", "Chatterjee", "Pillai", "Mehta", "Shah", "Reddy",
    "Naidu", "Kapoor", "Malhotra", "Bose", "Mishra", "Yadav", "Das", "Ghosh", "Agarwal",
];

const CITIES: &[&str] = &[
    "Mumbai", "Pune", "Bengaluru", "Chennai", "New Delhi", "Ahmedabad", "Kolkata", "Hyderabad",
    "Jaipur", "Lucknow", "Kochi", "Mysuru", "Nagpur", "Surat",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.co.in", "hotmail.com", "rediffmail.com"];

const MALE_SPELLINGS: &[&str] = &["Male", "M", "male", "MALE", "Man"];
const FEMALE_SPELLINGS: &[&str] = &["Female", "F", "female", "FEMALE", "Woman"];
const OTHER_SPELLINGS: &[&str] = &["Other", "O", "other", "Non-Binary"];

const PAID_SPELLINGS: &[&str] = &["True", "Yes", "yes", "Y", "1", "1", "True", "TRUE"];
const UNPAID_SPELLINGS: &[&str] = &["False", "No", "no", "N", "0", "0", "False", "FALSE"];

const HOSTEL_YES_SPELLINGS: &[&str] = &["Yes", "yes", "YES", " Yes ", "Y", "y"];
const HOSTEL_NO_SPELLINGS: &[&str] = &["No", "no", "NO", " No ", "N", "n"];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessyConfig {
    /// Distinct rows before duplicates are appended.
    pub rows: usize,
    pub duplicates: usize,
    pub seed: u64,
    /// Latest possible admission date.
    pub as_of: Date,
}

impl Default for MessyConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            duplicates: DEFAULT_DUPLICATES,
            seed: DEFAULT_SEED,
            as_of: ymd(2025, 1, 1),
        }
    }
}

impl MessyConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.rows == 0 {
            return Err(CoreError::Validation("row count must be at least 1".into()));
        }
        if self.duplicates > self.rows {
            return Err(CoreError::Validation(format!(
                "cannot duplicate {} rows out of {}",
                self.duplicates, self.rows
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One row of the messy sheet. `None` is written as an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessyStudent {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: String,
    pub gender: String,
    pub course: String,
    pub department: String,
    pub semester: u8,
    pub cgpa: Option<String>,
    pub attendance: Option<String>,
    pub city: Option<String>,
    pub state: String,
    pub admission_date: String,
    pub fees_paid: String,
    pub hostel: String,
}

/// Clean values a row starts from, before any corruption is applied.
#[derive(Debug, Clone)]
struct BaseRow {
    student_id: String,
    name: String,
    email: String,
    phone: String,
    age: i32,
    gender: &'static str,
    course: &'static str,
    department: &'static str,
    semester: u8,
    cgpa: f64,
    attendance: f64,
    city: &'static str,
    state: usize,
    admission_date: Date,
    fees_paid: bool,
    hostel: bool,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Build the messy sheet in memory: clean rows, corruption, duplicates,
/// then a shuffle.
pub fn generate(config: &MessyConfig) -> Result<Vec<MessyStudent>, CoreError> {
    config.validate()?;
    let mut rng = seeded_rng(config.seed);
    let n = config.rows;

    let base: Vec<BaseRow> = (0..n).map(|_| base_row(&mut rng, config.as_of)).collect();

    let mut names: Vec<String> = base.iter().map(|r| r.name.clone()).collect();
    for i in sample_share(&mut rng, n, 0.3) {
        names[i] = names[i].to_uppercase();
    }
    for i in sample_share(&mut rng, n, 0.2) {
        names[i] = names[i].to_lowercase();
    }

    let mut emails: Vec<String> = base.iter().map(|r| r.email.clone()).collect();
    for i in sample_share(&mut rng, n, 0.4) {
        emails[i] = if rng.random::<f64>() > 0.5 {
            format!("  {}  ", emails[i])
        } else {
            emails[i].to_uppercase()
        };
    }

    let mut rows: Vec<MessyStudent> = base
        .into_iter()
        .zip(names)
        .zip(emails)
        .map(|((row, name), email)| MessyStudent {
            phone: Some(mangle_phone(&mut rng, &row.phone)),
            age: mangle_age(&mut rng, row.age),
            gender: gender_spelling(&mut rng, row.gender),
            cgpa: Some(mangle_cgpa(&mut rng, row.cgpa)),
            attendance: Some(mangle_attendance(&mut rng, row.attendance)),
            state: mangle_state(&mut rng, row.state),
            admission_date: mangle_date(&mut rng, row.admission_date),
            fees_paid: (*pick(
                &mut rng,
                if row.fees_paid { PAID_SPELLINGS } else { UNPAID_SPELLINGS },
            ))
            .to_string(),
            hostel: (*pick(
                &mut rng,
                if row.hostel {
                    HOSTEL_YES_SPELLINGS
                } else {
                    HOSTEL_NO_SPELLINGS
                },
            ))
            .to_string(),
            student_id: row.student_id,
            name,
            email: Some(email),
            course: row.course.to_string(),
            department: row.department.to_string(),
            semester: row.semester,
            city: Some(row.city.to_string()),
        })
        .collect();

    blank_cells(&mut rng, &mut rows);

    let dupes: Vec<MessyStudent> = index::sample(&mut rng, n, config.duplicates)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect();
    rows.extend(dupes);
    rows.shuffle(&mut rng);

    Ok(rows)
}

/// Write the sheet to `<dir>/indian_college_messy_data.csv`.
pub fn write(rows: &[MessyStudent], dir: &Path) -> Result<DatasetSummary, CoreError> {
    ensure_dir(dir)?;
    let written = write_csv(dir, MESSY_FILE, rows)?;
    tracing::info!(rows = written, "Generated {MESSY_FILE}");

    let mut summary = DatasetSummary::default();
    summary.push(MESSY_FILE, written);
    Ok(summary)
}

fn base_row<R: Rng + ?Sized>(rng: &mut R, as_of: Date) -> BaseRow {
    let first = *pick(rng, FIRST_NAMES);
    let last = *pick(rng, LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.random_range(1..=99),
        pick(rng, EMAIL_DOMAINS)
    );
    let phone = format!(
        "{}-{:03}-{:04}",
        rng.random_range(700..=999),
        rng.random_range(0..1000),
        rng.random_range(0..10_000)
    );
    let gender = match rng.random_range(0..3) {
        0 => "Male",
        1 => "Female",
        _ => "Other",
    };

    BaseRow {
        student_id: format!(
            "STU{}{}",
            2020 + rng.random_range(0..=4),
            rng.random_range(1000..=9999)
        ),
        name: format!("{first} {last}"),
        email,
        phone,
        age: rng.random_range(17..=28),
        gender,
        course: *pick(rng, PROGRAMMES),
        department: *pick(rng, DEPARTMENTS),
        semester: rng.random_range(1..=8),
        cgpa: round2(rng.random_range(5.0..=10.0)),
        attendance: round1(rng.random_range(40.0..=100.0)),
        city: *pick(rng, CITIES),
        state: rng.random_range(0..STATES.len()),
        admission_date: random_date(
            rng,
            as_of - chrono::Duration::days(ADMISSION_LOOKBACK_DAYS),
            as_of,
        ),
        fees_paid: rng.random_bool(0.5),
        hostel: rng.random_bool(0.5),
    }
}

// ---------------------------------------------------------------------------
// Corruption rules
// ---------------------------------------------------------------------------

/// Distinct row indices covering `share` of `n` rows.
fn sample_share<R: Rng + ?Sized>(rng: &mut R, n: usize, share: f64) -> Vec<usize> {
    let amount = ((n as f64) * share) as usize;
    index::sample(rng, n, amount.min(n)).into_vec()
}

fn mangle_phone<R: Rng + ?Sized>(rng: &mut R, phone: &str) -> String {
    let roll: f64 = rng.random();
    if roll < 0.2 {
        format!("+91-{phone}")
    } else if roll < 0.4 {
        phone.replace('-', " ")
    } else if roll < 0.6 {
        phone.replace(['-', ' '], "")
    } else if roll < 0.8 {
        format!("({phone})")
    } else {
        phone.to_string()
    }
}

fn mangle_age<R: Rng + ?Sized>(rng: &mut R, age: i32) -> String {
    // The first 15% are "stored as text" upstream, which is invisible in CSV.
    let roll: f64 = rng.random();
    let value = if (0.15..0.25).contains(&roll) {
        -age
    } else if (0.25..0.30).contains(&roll) {
        age + 50
    } else {
        age
    };
    value.to_string()
}

fn gender_spelling<R: Rng + ?Sized>(rng: &mut R, gender: &str) -> String {
    let spellings = match gender {
        "Male" => MALE_SPELLINGS,
        "Female" => FEMALE_SPELLINGS,
        _ => OTHER_SPELLINGS,
    };
    (*pick(rng, spellings)).to_string()
}

fn mangle_cgpa<R: Rng + ?Sized>(rng: &mut R, cgpa: f64) -> String {
    let roll: f64 = rng.random();
    let value = if (0.10..0.15).contains(&roll) {
        round2(cgpa + 5.0)
    } else if (0.15..0.20).contains(&roll) {
        -cgpa
    } else {
        cgpa
    };
    format_decimal(value)
}

fn mangle_attendance<R: Rng + ?Sized>(rng: &mut R, attendance: f64) -> String {
    let roll: f64 = rng.random();
    if roll < 0.3 {
        format!("{}%", format_decimal(attendance))
    } else if roll < 0.4 {
        format_decimal(round1(attendance + 20.0))
    } else {
        format_decimal(attendance)
    }
}

fn mangle_state<R: Rng + ?Sized>(rng: &mut R, state: usize) -> String {
    let (full, abbrev) = STATES[state];
    if rng.random::<f64>() < 0.4 {
        abbrev.to_string()
    } else {
        full.to_string()
    }
}

fn mangle_date<R: Rng + ?Sized>(rng: &mut R, date: Date) -> String {
    let roll: f64 = rng.random();
    let format = if roll < 0.3 {
        "%d/%m/%Y"
    } else if roll < 0.5 {
        "%d-%m-%Y"
    } else if roll < 0.6 {
        "%d %B %Y"
    } else {
        crate::types::DATE_FORMAT
    };
    date.format(format).to_string()
}

/// Blank 5-10% of the cells in each nullable column, independently.
fn blank_cells<R: Rng + ?Sized>(rng: &mut R, rows: &mut [MessyStudent]) {
    let n = rows.len();
    for column in 0..5 {
        let share = rng.random_range(0.05..0.10);
        for i in sample_share(rng, n, share) {
            let row = &mut rows[i];
            match column {
                0 => row.email = None,
                1 => row.phone = None,
                2 => row.city = None,
                3 => row.cgpa = None,
                _ => row.attendance = None,
            }
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render like a spreadsheet float: `8.0`, `7.25`, `-6.4`.
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashSet;

    fn parses_as_any_known_format(raw: &str) -> bool {
        ["%d/%m/%Y", "%d-%m-%Y", "%d %B %Y", "%Y-%m-%d"]
            .iter()
            .any(|f| Date::parse_from_str(raw, f).is_ok())
    }

    #[test]
    fn row_count_includes_duplicates() {
        let rows = generate(&MessyConfig::default()).unwrap();
        assert_eq!(rows.len(), DEFAULT_ROWS + DEFAULT_DUPLICATES);
    }

    #[test]
    fn deterministic_for_seed() {
        let a = generate(&MessyConfig::default()).unwrap();
        let b = generate(&MessyConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blanks_stay_within_ten_percent() {
        let rows = generate(&MessyConfig::default()).unwrap();
        let blank_emails = rows.iter().filter(|r| r.email.is_none()).count();
        let blank_cgpa = rows.iter().filter(|r| r.cgpa.is_none()).count();
        // 5-10% of 500 base rows, plus at most every duplicate.
        assert!((25..=60).contains(&blank_emails), "{blank_emails}");
        assert!((25..=60).contains(&blank_cgpa), "{blank_cgpa}");
    }

    #[test]
    fn spellings_come_from_known_variants() {
        let rows = generate(&MessyConfig::default()).unwrap();
        let genders: HashSet<_> = MALE_SPELLINGS
            .iter()
            .chain(FEMALE_SPELLINGS)
            .chain(OTHER_SPELLINGS)
            .collect();
        for r in &rows {
            assert!(genders.contains(&r.gender.as_str()));
            assert!(
                PAID_SPELLINGS.contains(&r.fees_paid.as_str())
                    || UNPAID_SPELLINGS.contains(&r.fees_paid.as_str())
            );
            assert!(
                HOSTEL_YES_SPELLINGS.contains(&r.hostel.as_str())
                    || HOSTEL_NO_SPELLINGS.contains(&r.hostel.as_str())
            );
            assert!(STATES
                .iter()
                .any(|(full, abbrev)| r.state == *full || r.state == *abbrev));
            assert!(parses_as_any_known_format(&r.admission_date), "{}", r.admission_date);
            assert!(r.student_id.starts_with("STU"));
            assert!((1..=8).contains(&r.semester));
        }
    }

    #[test]
    fn corruption_actually_happens() {
        let rows = generate(&MessyConfig::default()).unwrap();
        assert!(rows.iter().any(|r| r.age.starts_with('-')));
        assert!(rows
            .iter()
            .filter_map(|r| r.attendance.as_deref())
            .any(|a| a.ends_with('%')));
        assert!(rows
            .iter()
            .filter_map(|r| r.phone.as_deref())
            .any(|p| p.starts_with("+91-")));
        assert!(rows
            .iter()
            .filter_map(|r| r.email.as_deref())
            .any(|e| e.starts_with("  ")));
        assert!(rows.iter().any(|r| r.name == r.name.to_uppercase()));
        assert!(rows.iter().any(|r| r.state.len() == 2));
    }

    #[test]
    fn duplicates_are_exact_copies() {
        let rows = generate(&MessyConfig::default()).unwrap();
        let mut seen = HashSet::new();
        let mut repeats = 0;
        for r in &rows {
            let key = format!("{r:?}");
            if !seen.insert(key) {
                repeats += 1;
            }
        }
        assert!(repeats >= DEFAULT_DUPLICATES);
    }

    #[test]
    fn phone_rules() {
        let mut rng = seeded_rng(1);
        for _ in 0..200 {
            let p = mangle_phone(&mut rng, "987-654-3210");
            assert!(
                [
                    "+91-987-654-3210",
                    "987 654 3210",
                    "9876543210",
                    "(987-654-3210)",
                    "987-654-3210"
                ]
                .contains(&p.as_str()),
                "{p}"
            );
        }
    }

    #[test]
    fn decimal_rendering() {
        assert_eq!(format_decimal(8.0), "8.0");
        assert_eq!(format_decimal(7.25), "7.25");
        assert_eq!(format_decimal(-6.4), "-6.4");
    }

    #[test]
    fn rejects_more_duplicates_than_rows() {
        let err = generate(&MessyConfig {
            rows: 5,
            duplicates: 6,
            ..MessyConfig::default()
        });
        assert_matches!(err, Err(CoreError::Validation(_)));
    }

    #[test]
    fn writes_sheet_with_blank_cells() {
        let dir = tempfile::tempdir().unwrap();
        let rows = generate(&MessyConfig {
            rows: 50,
            duplicates: 2,
            ..MessyConfig::default()
        })
        .unwrap();
        let summary = write(&rows, dir.path()).unwrap();
        assert_eq!(summary.rows_for(MESSY_FILE), Some(52));

        let text = std::fs::read_to_string(dir.path().join(MESSY_FILE)).unwrap();
        assert!(text.starts_with("student_id,name,email,phone,age,gender,"));
        assert_eq!(text.lines().count(), 53);
    }
}
