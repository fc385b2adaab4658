//! Column lists and bind order for each college row type.

use campus_core::catalog::CollegeTable;
use campus_core::records::{
    flag_char, Activity, Attendance, Course, Department, Enrollment, ExamResult, FeePayment,
    Student,
};
use sqlx::query_builder::Separated;
use sqlx::Postgres;

/// A row type that can be appended to a multi-row `INSERT`.
pub trait InsertRow {
    /// Destination table.
    const TABLE: CollegeTable;

    /// Column list, in bind order.
    const COLUMNS: &'static [&'static str];

    /// Push one bind per entry of [`Self::COLUMNS`].
    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>);
}

impl InsertRow for Department {
    const TABLE: CollegeTable = CollegeTable::Departments;
    const COLUMNS: &'static [&'static str] =
        &["dept_id", "dept_name", "hod", "building", "established_year"];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.dept_id)
            .push_bind(self.dept_name.clone())
            .push_bind(self.hod.clone())
            .push_bind(self.building.clone())
            .push_bind(self.established_year);
    }
}

impl InsertRow for Course {
    const TABLE: CollegeTable = CollegeTable::Courses;
    const COLUMNS: &'static [&'static str] = &[
        "course_id",
        "course_name",
        "dept_id",
        "credits",
        "semester_offered",
        "instructor",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.course_id)
            .push_bind(self.course_name.clone())
            .push_bind(self.dept_id)
            .push_bind(self.credits)
            .push_bind(self.semester_offered)
            .push_bind(self.instructor.clone());
    }
}

impl InsertRow for Student {
    const TABLE: CollegeTable = CollegeTable::Students;
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "full_name",
        "gender",
        "dob",
        "city",
        "state",
        "dept_id",
        "admission_year",
        "category",
        "hostel_resident",
        "phone",
        "email",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.student_id)
            .push_bind(self.full_name.clone())
            .push_bind(self.gender.as_str())
            .push_bind(self.dob)
            .push_bind(self.city.clone())
            .push_bind(self.state.clone())
            .push_bind(self.dept_id)
            .push_bind(self.admission_year)
            .push_bind(self.category.as_str())
            .push_bind(flag_char(self.hostel_resident, 'T', 'F'))
            .push_bind(self.phone.clone())
            .push_bind(self.email.clone());
    }
}

impl InsertRow for Enrollment {
    const TABLE: CollegeTable = CollegeTable::Enrollments;
    const COLUMNS: &'static [&'static str] = &[
        "enroll_id",
        "student_id",
        "course_id",
        "semester",
        "year",
        "enrollment_date",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.enroll_id)
            .push_bind(self.student_id)
            .push_bind(self.course_id)
            .push_bind(self.semester)
            .push_bind(self.year)
            .push_bind(self.enrollment_date);
    }
}

impl InsertRow for Attendance {
    const TABLE: CollegeTable = CollegeTable::Attendance;
    const COLUMNS: &'static [&'static str] = &[
        "attendance_id",
        "student_id",
        "course_id",
        "attendance_date",
        "status",
        "lecture_hours",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.attendance_id)
            .push_bind(self.student_id)
            .push_bind(self.course_id)
            .push_bind(self.attendance_date)
            .push_bind(self.status.as_str())
            .push_bind(self.lecture_hours);
    }
}

impl InsertRow for ExamResult {
    const TABLE: CollegeTable = CollegeTable::Results;
    const COLUMNS: &'static [&'static str] = &[
        "result_id",
        "student_id",
        "course_id",
        "semester",
        "exam_date",
        "marks",
        "grade",
        "result_status",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.result_id)
            .push_bind(self.student_id)
            .push_bind(self.course_id)
            .push_bind(self.semester)
            .push_bind(self.exam_date)
            .push_bind(self.marks)
            .push_bind(self.grade.as_str())
            .push_bind(self.result_status.as_str());
    }
}

impl InsertRow for FeePayment {
    const TABLE: CollegeTable = CollegeTable::Fees;
    const COLUMNS: &'static [&'static str] = &[
        "receipt_id",
        "student_id",
        "amount",
        "payment_mode",
        "payment_date",
        "semester",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.receipt_id)
            .push_bind(self.student_id)
            .push_bind(self.amount)
            .push_bind(self.payment_mode.as_str())
            .push_bind(self.payment_date)
            .push_bind(self.semester);
    }
}

impl InsertRow for Activity {
    const TABLE: CollegeTable = CollegeTable::Activities;
    const COLUMNS: &'static [&'static str] = &[
        "activity_id",
        "student_id",
        "activity_name",
        "activity_type",
        "participation_date",
        "award_received",
    ];

    fn push_binds(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.activity_id)
            .push_bind(self.student_id)
            .push_bind(self.activity_name.clone())
            .push_bind(self.activity_type.as_str())
            .push_bind(self.participation_date)
            .push_bind(flag_char(self.award_received, 'Y', 'N'));
    }
}
