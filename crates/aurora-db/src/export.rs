use std::borrow::Cow;

use anyhow::Result;
use aurora_types::filter::StudentFilter;
use aurora_types::models::Student;

use crate::Database;

pub const CSV_HEADERS: [&str; 10] = [
    "Serial ID",
    "Name",
    "Enrollment",
    "Year",
    "Course",
    "Email",
    "Fee",
    "Status",
    "Interests",
    "Checked In",
];

/// Separator used when flattening interests into a single cell.
pub const INTEREST_SEPARATOR: &str = "; ";

impl Database {
    /// CSV of every student matching `filter`, same predicate as search.
    pub fn export_csv(&self, filter: &StudentFilter) -> Result<String> {
        Ok(students_to_csv(&self.search_students(filter)?))
    }
}

/// Header row plus one line per student, joined with `\n`.
pub fn students_to_csv(students: &[Student]) -> String {
    let mut lines = Vec::with_capacity(students.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for s in students {
        let interests = s.participation_interests.join(INTEREST_SEPARATOR);
        let cells = [
            s.serial_id.as_str(),
            s.full_name.as_str(),
            s.enrollment_no.as_str(),
            s.year.as_str(),
            s.course.as_str(),
            s.email.as_str(),
            s.fee_amount.as_str(),
            s.verification_status.as_str(),
            interests.as_str(),
            if s.checked_in { "Yes" } else { "No" },
        ];
        let line: Vec<Cow<'_, str>> = cells.into_iter().map(escape_field).collect();
        lines.push(line.join(","));
    }

    lines.join("\n")
}

/// Quote a cell if it contains a comma, quote or line break; inner quotes are doubled.
fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
