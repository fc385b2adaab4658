//! Clean relational dataset for the college schema.
//!
//! Students live in the Bidar district of Karnataka. Every generated row
//! satisfies the table constraints, so the output loads without rejects.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::Duration;
use rand::seq::index;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use super::{
    ensure_dir, pick, random_date, seeded_rng, write_csv, ymd, DatasetSummary, DEFAULT_SEED,
};
use crate::catalog::CollegeTable;
use crate::error::CoreError;
use crate::records::{
    Activity, ActivityType, Attendance, AttendanceStatus, Category, Course, Department, Enrollment,
    ExamResult, FeePayment, Gender, Grade, PaymentMode, ResultStatus, Student,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_STUDENTS: usize = 10_000;
pub const DEFAULT_COURSES_PER_STUDENT: usize = 6;
pub const DEFAULT_ACTIVITY_SHARE: f64 = 0.35;

/// Semesters run 1 through 6.
pub const SEMESTERS: i32 = 6;

const FIRST_STUDENT_ID: DbId = 101;
const FIRST_COURSE_ID: DbId = 301;
const FIRST_ENROLL_ID: DbId = 5001;
const FIRST_ATTENDANCE_ID: DbId = 8001;
const FIRST_RESULT_ID: DbId = 9001;
const FIRST_RECEIPT_ID: DbId = 7001;
const FIRST_ACTIVITY_ID: DbId = 6001;

/// Days of attendance history ending on the last class day.
const ATTENDANCE_WINDOW_DAYS: i64 = 180;

const CITIES: &[&str] = &["Bidar", "Humnabad", "Basavakalyan", "Bhalki", "Aurad"];

const FIRST_NAMES_MALE: &[&str] = &[
    "Manoj", "Ravi", "Suresh", "Prakash", "Amit", "Vijay", "Arun", "Kiran", "Deepak", "Sandeep",
    "Rahul", "Nikhil", "Prashant", "Vishal", "Rohan", "Sachin", "Akash", "Pavan", "Ganesh",
    "Krishna",
];

const FIRST_NAMES_FEMALE: &[&str] = &[
    "Ananya", "Shreya", "Priya", "Kavya", "Sneha", "Pooja", "Divya", "Anjali", "Neha", "Swati",
    "Manisha", "Jyoti", "Rekha", "Sunita", "Meena", "Shalini", "Vandana", "Pallavi", "Shweta",
    "Archana",
];

const LAST_NAMES: &[&str] = &[
    "Patil", "Reddy", "Kulkarni", "Desai", "Naik", "Chavan", "Jadhav", "Gowda", "Rao", "Shetty",
    "Kumar", "Singh", "Sharma", "Gupta", "Verma", "Nair", "Menon", "Iyer", "Joshi", "Bhat",
];

const INSTRUCTORS: &[&str] = &[
    "Prof. Asha Jadhav",
    "Dr. Ramesh Kumar",
    "Prof. Lakshmi Nair",
    "Dr. Sunil Patil",
    "Prof. Meera Deshmukh",
    "Dr. Anil Joshi",
    "Prof. Sunita Rao",
    "Dr. Prakash Shetty",
];

/// Courses offered by each department id.
const COURSES_BY_DEPT: &[(DbId, &[&str])] = &[
    (1, &["Python Programming", "Data Structures", "Web Development"]),
    (2, &["Cost Accounting", "Business Mathematics", "Financial Management"]),
    (3, &["Electrodynamics", "Quantum Mechanics"]),
    (4, &["British Literature", "Creative Writing"]),
];

const ACTIVITIES: &[(&str, ActivityType)] = &[
    ("Tech Fest", ActivityType::Academic),
    ("Annual Sports Meet", ActivityType::Sports),
    ("Debate Competition", ActivityType::Cultural),
    ("Hackathon", ActivityType::Academic),
    ("Cricket Tournament", ActivityType::Sports),
    ("Music Competition", ActivityType::Cultural),
    ("NSS Camp", ActivityType::Nss),
    ("Science Exhibition", ActivityType::Academic),
    ("Dance Competition", ActivityType::Cultural),
    ("Marathon", ActivityType::Sports),
];

const STUDENT_GENDERS: &[Gender] = &[Gender::Male, Gender::Female];
const CATEGORIES: &[Category] = &[Category::General, Category::Obc, Category::Sc, Category::St];
const ADMISSION_YEARS: &[i32] = &[2021, 2022, 2023, 2024];
const FEE_MODES: &[PaymentMode] = &[PaymentMode::Cash, PaymentMode::Online, PaymentMode::Upi];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Size and seed of a college dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeConfig {
    pub students: usize,
    pub courses_per_student: usize,
    /// Fraction of students that take part in at least one activity.
    pub activity_share: f64,
    pub seed: u64,
}

impl Default for CollegeConfig {
    fn default() -> Self {
        Self {
            students: DEFAULT_STUDENTS,
            courses_per_student: DEFAULT_COURSES_PER_STUDENT,
            activity_share: DEFAULT_ACTIVITY_SHARE,
            seed: DEFAULT_SEED,
        }
    }
}

impl CollegeConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.students == 0 {
            return Err(CoreError::Validation(
                "student count must be at least 1".into(),
            ));
        }
        if self.courses_per_student == 0 || self.courses_per_student > SEMESTERS as usize {
            return Err(CoreError::Validation(format!(
                "courses per student must be between 1 and {SEMESTERS}, got {}",
                self.courses_per_student
            )));
        }
        if !(0.0..=1.0).contains(&self.activity_share) {
            return Err(CoreError::Validation(format!(
                "activity share must be between 0 and 1, got {}",
                self.activity_share
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// All eight tables of a generated college dataset.
#[derive(Debug, Clone, Default)]
pub struct CollegeDataset {
    pub departments: Vec<Department>,
    pub courses: Vec<Course>,
    pub students: Vec<Student>,
    pub enrollments: Vec<Enrollment>,
    pub attendance: Vec<Attendance>,
    pub results: Vec<ExamResult>,
    pub fees: Vec<FeePayment>,
    pub activities: Vec<Activity>,
}

impl CollegeDataset {
    /// Write each table to `<dir>/<table>.csv`, creating `dir` if needed.
    pub fn write(&self, dir: &Path) -> Result<DatasetSummary, CoreError> {
        ensure_dir(dir)?;
        let mut summary = DatasetSummary::default();

        for table in CollegeTable::ALL {
            let file = table.csv_file();
            let rows = match table {
                CollegeTable::Departments => write_csv(dir, &file, &self.departments)?,
                CollegeTable::Courses => write_csv(dir, &file, &self.courses)?,
                CollegeTable::Students => write_csv(dir, &file, &self.students)?,
                CollegeTable::Enrollments => write_csv(dir, &file, &self.enrollments)?,
                CollegeTable::Attendance => write_csv(dir, &file, &self.attendance)?,
                CollegeTable::Results => write_csv(dir, &file, &self.results)?,
                CollegeTable::Fees => write_csv(dir, &file, &self.fees)?,
                CollegeTable::Activities => write_csv(dir, &file, &self.activities)?,
            };
            tracing::info!(table = %table, rows, "Generated {file}");
            summary.push(file, rows);
        }

        Ok(summary)
    }
}

/// Build a complete dataset in memory.
pub fn generate(config: &CollegeConfig) -> Result<CollegeDataset, CoreError> {
    config.validate()?;
    let mut rng = seeded_rng(config.seed);

    let departments = departments();
    let courses = courses(&mut rng);
    let students = students(&mut rng, config.students, departments.len() as DbId);
    let enrollments = enrollments(&mut rng, &students, &courses, config.courses_per_student);
    let attendance = attendance(&mut rng, &enrollments);
    let results = results(&mut rng, &enrollments);
    let fees = fees(&mut rng, &students);
    let activities = activities(&mut rng, &students, config.activity_share);

    Ok(CollegeDataset {
        departments,
        courses,
        students,
        enrollments,
        attendance,
        results,
        fees,
        activities,
    })
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn departments() -> Vec<Department> {
    let dept = |dept_id, dept_name: &str, hod: &str, building: &str, established_year| Department {
        dept_id,
        dept_name: dept_name.into(),
        hod: hod.into(),
        building: building.into(),
        established_year,
    };
    vec![
        dept(1, "Computer Science", "Dr. Veeresh Desai", "Main Block", 2002),
        dept(2, "Commerce", "Prof. Sahana Naik", "Commerce Wing", 1998),
        dept(3, "Physics", "Dr. Ravi Chavan", "Science Block", 1995),
        dept(4, "English", "Prof. Meenakshi Patil", "Arts Block", 2000),
    ]
}

fn courses<R: Rng + ?Sized>(rng: &mut R) -> Vec<Course> {
    let mut courses = Vec::new();
    let mut course_id = FIRST_COURSE_ID;

    for (dept_id, names) in COURSES_BY_DEPT {
        for name in *names {
            courses.push(Course {
                course_id,
                course_name: (*name).into(),
                dept_id: *dept_id,
                credits: rng.random_range(3..=4),
                semester_offered: rng.random_range(1..=SEMESTERS),
                instructor: (*pick(rng, INSTRUCTORS)).into(),
            });
            course_id += 1;
        }
    }
    courses
}

fn students<R: Rng + ?Sized>(rng: &mut R, count: usize, dept_count: DbId) -> Vec<Student> {
    let dob_start = ymd(2000, 1, 1);
    let dob_end = ymd(2006, 12, 31);

    (0..count as DbId)
        .map(|offset| {
            let student_id = FIRST_STUDENT_ID + offset;
            let gender = *pick(rng, STUDENT_GENDERS);
            let first = match gender {
                Gender::Female => pick(rng, FIRST_NAMES_FEMALE),
                _ => pick(rng, FIRST_NAMES_MALE),
            };
            let full_name = format!("{first} {}", pick(rng, LAST_NAMES));

            Student {
                student_id,
                gender,
                dob: random_date(rng, dob_start, dob_end),
                city: (*pick(rng, CITIES)).into(),
                state: "Karnataka".into(),
                dept_id: rng.random_range(1..=dept_count),
                admission_year: *pick(rng, ADMISSION_YEARS),
                category: *pick(rng, CATEGORIES),
                hostel_resident: rng.random_bool(0.5),
                phone: format!("9{}", rng.random_range(100_000_000..=999_999_999u32)),
                email: student_email(&full_name, student_id),
                full_name,
            }
        })
        .collect()
}

/// `ravi.patil@college.edu101`. The id suffix keeps addresses unique.
pub fn student_email(full_name: &str, student_id: DbId) -> String {
    format!(
        "{}@college.edu{student_id}",
        full_name.to_lowercase().replace(' ', ".")
    )
}

fn enrollments<R: Rng + ?Sized>(
    rng: &mut R,
    students: &[Student],
    courses: &[Course],
    per_student: usize,
) -> Vec<Enrollment> {
    let mut by_dept: BTreeMap<DbId, Vec<DbId>> = BTreeMap::new();
    for course in courses {
        by_dept.entry(course.dept_id).or_default().push(course.course_id);
    }

    let start = ymd(2023, 1, 1);
    let end = ymd(2024, 8, 31);
    let mut enrollments = Vec::with_capacity(students.len() * per_student);
    let mut enroll_id = FIRST_ENROLL_ID;

    for student in students {
        let Some(available) = by_dept.get(&student.dept_id).filter(|c| !c.is_empty()) else {
            tracing::warn!(
                student_id = student.student_id,
                dept_id = student.dept_id,
                "Department offers no courses, skipping enrollments"
            );
            continue;
        };

        let selected: Vec<DbId> = if available.len() >= per_student {
            available.choose_multiple(rng, per_student).copied().collect()
        } else {
            available.iter().cycle().take(per_student).copied().collect()
        };

        let mut used = HashSet::new();
        for (idx, course_id) in selected.into_iter().enumerate() {
            let mut semester = (idx as i32 % SEMESTERS) + 1;
            let mut year = if semester <= 3 { 2023 } else { 2024 };

            while used.contains(&(course_id, semester, year)) {
                semester = rng.random_range(1..=SEMESTERS);
                year = *pick(rng, &[2023, 2024]);
            }
            used.insert((course_id, semester, year));

            enrollments.push(Enrollment {
                enroll_id,
                student_id: student.student_id,
                course_id,
                semester,
                year,
                enrollment_date: random_date(rng, start, end),
            });
            enroll_id += 1;
        }
    }
    enrollments
}

fn attendance<R: Rng + ?Sized>(rng: &mut R, enrollments: &[Enrollment]) -> Vec<Attendance> {
    let end = ymd(2024, 10, 31);
    let start = end - Duration::days(ATTENDANCE_WINDOW_DAYS);
    let mut records = Vec::new();
    let mut attendance_id = FIRST_ATTENDANCE_ID;

    for enrollment in enrollments {
        let classes = rng.random_range(40..=60);
        for _ in 0..classes {
            let attendance_date = random_date(rng, start, end);
            let present = rng.random_bool(0.85);
            records.push(Attendance {
                attendance_id,
                student_id: enrollment.student_id,
                course_id: enrollment.course_id,
                attendance_date,
                status: if present {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                },
                lecture_hours: if present { 2 } else { 0 },
            });
            attendance_id += 1;
        }
    }

    // Stable: rows on the same day keep their id order.
    records.sort_by_key(|r| r.attendance_date);
    records
}

fn results<R: Rng + ?Sized>(rng: &mut R, enrollments: &[Enrollment]) -> Vec<ExamResult> {
    enrollments
        .iter()
        .zip(FIRST_RESULT_ID..)
        .map(|(enrollment, result_id)| {
            let marks = f64::from(rng.random_range(35..=100u8));
            // Even semesters sit exams in April, odd ones in November.
            let exam_month = if enrollment.semester % 2 == 0 { 4 } else { 11 };
            ExamResult {
                result_id,
                student_id: enrollment.student_id,
                course_id: enrollment.course_id,
                semester: enrollment.semester,
                exam_date: ymd(2024, exam_month, rng.random_range(15..=25)),
                marks,
                grade: Grade::for_marks(marks),
                result_status: ResultStatus::for_marks(marks),
            }
        })
        .collect()
}

fn fees<R: Rng + ?Sized>(rng: &mut R, students: &[Student]) -> Vec<FeePayment> {
    let start = ymd(2023, 1, 1);
    let end = ymd(2024, 10, 31);
    let mut fees = Vec::new();
    let mut receipt_id = FIRST_RECEIPT_ID;

    for student in students {
        let payments = rng.random_range(2..=4);
        for _ in 0..payments {
            fees.push(FeePayment {
                receipt_id,
                student_id: student.student_id,
                amount: f64::from(rng.random_range(12_000..=18_000u32)),
                payment_mode: *pick(rng, FEE_MODES),
                payment_date: random_date(rng, start, end),
                semester: rng.random_range(1..=SEMESTERS),
            });
            receipt_id += 1;
        }
    }
    fees
}

fn activities<R: Rng + ?Sized>(rng: &mut R, students: &[Student], share: f64) -> Vec<Activity> {
    let start = ymd(2023, 1, 1);
    let end = ymd(2024, 10, 31);
    let participants = ((students.len() as f64) * share) as usize;
    let mut activities = Vec::new();
    let mut activity_id = FIRST_ACTIVITY_ID;

    for idx in index::sample(rng, students.len(), participants.min(students.len())) {
        let student_id = students[idx].student_id;
        let joined = rng.random_range(1..=3);
        let chosen: Vec<_> = ACTIVITIES.choose_multiple(rng, joined).copied().collect();

        for (name, activity_type) in chosen {
            activities.push(Activity {
                activity_id,
                student_id,
                activity_name: name.into(),
                activity_type,
                participation_date: random_date(rng, start, end),
                award_received: rng.random_bool(0.5),
            });
            activity_id += 1;
        }
    }
    activities
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Datelike;

    fn small() -> CollegeConfig {
        CollegeConfig {
            students: 200,
            ..CollegeConfig::default()
        }
    }

    #[test]
    fn fixed_reference_tables() {
        let data = generate(&small()).unwrap();
        assert_eq!(data.departments.len(), 4);
        assert_eq!(data.courses.len(), 10);
        assert_eq!(data.courses[0].course_id, 301);
        assert_eq!(data.courses[9].course_id, 310);
        assert!(data.courses.iter().all(|c| c.credits == 3 || c.credits == 4));
        assert!(data
            .courses
            .iter()
            .all(|c| (1..=6).contains(&c.semester_offered)));
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generate(&small()).unwrap();
        let b = generate(&small()).unwrap();
        assert_eq!(a.students, b.students);
        assert_eq!(a.enrollments, b.enrollments);
        assert_eq!(a.activities, b.activities);

        let c = generate(&CollegeConfig {
            seed: 7,
            ..small()
        })
        .unwrap();
        assert_ne!(a.students, c.students);
    }

    #[test]
    fn students_are_consistent() {
        let data = generate(&small()).unwrap();
        assert_eq!(data.students.len(), 200);
        assert_eq!(data.students[0].student_id, 101);

        let emails: HashSet<_> = data.students.iter().map(|s| &s.email).collect();
        assert_eq!(emails.len(), 200);

        for s in &data.students {
            assert!((1..=4).contains(&s.dept_id));
            assert!(s.phone.starts_with('9') && s.phone.len() == 10);
            assert!(s.dob.year() >= 2000 && s.dob.year() <= 2006);
            assert!(ADMISSION_YEARS.contains(&s.admission_year));
            assert_eq!(s.state, "Karnataka");
            assert_ne!(s.gender, Gender::Other);
        }
    }

    #[test]
    fn enrollments_are_unique_and_within_department() {
        let data = generate(&small()).unwrap();
        assert_eq!(data.enrollments.len(), 200 * DEFAULT_COURSES_PER_STUDENT);

        let dept_of_course: BTreeMap<_, _> =
            data.courses.iter().map(|c| (c.course_id, c.dept_id)).collect();
        let dept_of_student: BTreeMap<_, _> = data
            .students
            .iter()
            .map(|s| (s.student_id, s.dept_id))
            .collect();

        let mut seen = HashSet::new();
        for e in &data.enrollments {
            assert!(seen.insert((e.student_id, e.course_id, e.semester, e.year)));
            assert_eq!(dept_of_course[&e.course_id], dept_of_student[&e.student_id]);
            assert!((1..=6).contains(&e.semester));
            assert!(e.year == 2023 || e.year == 2024);
        }
    }

    #[test]
    fn attendance_sorted_and_hours_follow_status() {
        let data = generate(&CollegeConfig {
            students: 20,
            ..CollegeConfig::default()
        })
        .unwrap();

        assert!(data
            .attendance
            .windows(2)
            .all(|w| w[0].attendance_date <= w[1].attendance_date));
        for a in &data.attendance {
            match a.status {
                AttendanceStatus::Present => assert_eq!(a.lecture_hours, 2),
                AttendanceStatus::Absent => assert_eq!(a.lecture_hours, 0),
            }
        }
        let per_enrollment = data.attendance.len() / data.enrollments.len();
        assert!((40..=60).contains(&per_enrollment));
    }

    #[test]
    fn results_follow_grade_bands() {
        let data = generate(&small()).unwrap();
        assert_eq!(data.results.len(), data.enrollments.len());
        for r in &data.results {
            assert!((35.0..=100.0).contains(&r.marks));
            assert_eq!(r.grade, Grade::for_marks(r.marks));
            assert_eq!(r.result_status == ResultStatus::Pass, r.marks >= 50.0);
            let expected_month = if r.semester % 2 == 0 { 4 } else { 11 };
            assert_eq!(r.exam_date.month(), expected_month);
            assert!((15..=25).contains(&r.exam_date.day()));
        }
    }

    #[test]
    fn fees_and_activities_ranges() {
        let data = generate(&small()).unwrap();
        assert!(data.fees.len() >= 400 && data.fees.len() <= 800);
        assert!(data
            .fees
            .iter()
            .all(|f| (12_000.0..=18_000.0).contains(&f.amount) && f.payment_mode != PaymentMode::Cheque));

        let participants: HashSet<_> = data.activities.iter().map(|a| a.student_id).collect();
        assert_eq!(participants.len(), (200.0 * DEFAULT_ACTIVITY_SHARE) as usize);
        let mut per_student_names = HashSet::new();
        for a in &data.activities {
            assert!(per_student_names.insert((a.student_id, a.activity_name.clone())));
        }
    }

    #[test]
    fn short_departments_cycle_courses() {
        // Departments 3 and 4 only offer two courses each.
        let data = generate(&small()).unwrap();
        let physics_student = data.students.iter().find(|s| s.dept_id == 3).unwrap();
        let taken: Vec<_> = data
            .enrollments
            .iter()
            .filter(|e| e.student_id == physics_student.student_id)
            .collect();
        assert_eq!(taken.len(), 6);
        let distinct: HashSet<_> = taken.iter().map(|e| e.course_id).collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn rejects_invalid_config() {
        let err = generate(&CollegeConfig {
            students: 0,
            ..CollegeConfig::default()
        });
        assert_matches!(err, Err(CoreError::Validation(_)));

        let err = CollegeConfig {
            courses_per_student: 7,
            ..CollegeConfig::default()
        }
        .validate();
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("between 1 and 6"));

        let err = CollegeConfig {
            activity_share: 1.5,
            ..CollegeConfig::default()
        }
        .validate();
        assert_matches!(err, Err(CoreError::Validation(_)));
    }

    #[test]
    fn writes_all_eight_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sample dataset");
        let data = generate(&CollegeConfig {
            students: 10,
            ..CollegeConfig::default()
        })
        .unwrap();

        let summary = data.write(&out).unwrap();
        assert_eq!(summary.files.len(), 8);
        assert_eq!(summary.rows_for("students.csv"), Some(10));
        assert_eq!(summary.rows_for("departments.csv"), Some(4));
        for table in CollegeTable::ALL {
            assert!(out.join(table.csv_file()).exists());
        }

        let header = std::fs::read_to_string(out.join("attendance.csv")).unwrap();
        assert!(header.starts_with("attendance_id,student_id,course_id,date,status,lecture_hours"));
    }

    #[test]
    fn email_format() {
        assert_eq!(
            student_email("Kavya Rao", 345),
            "kavya.rao@college.edu345"
        );
    }
}
