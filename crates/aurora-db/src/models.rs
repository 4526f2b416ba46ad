//! Database row types — these map directly to SQLite rows.
//! Distinct from aurora-types models to keep the DB layer independent.

use aurora_types::models::Student;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracing::warn;

/// Column list shared by every student SELECT, in [`StudentRow::from_row`] order.
pub const STUDENT_COLUMNS: &str = "serial_id, enrollment_no, full_name, father_name, dob, email, \
     year, course, branch, photo_url, participation_interests, fee_amount, \
     verification_status, checked_in, checked_in_at, created_at";

pub struct StudentRow {
    pub serial_id: String,
    pub enrollment_no: String,
    pub full_name: String,
    pub father_name: String,
    pub dob: String,
    pub email: String,
    pub year: String,
    pub course: String,
    pub branch: String,
    pub photo_url: String,
    /// JSON array of strings.
    pub participation_interests: String,
    pub fee_amount: String,
    pub verification_status: String,
    pub checked_in: bool,
    pub checked_in_at: Option<String>,
    pub created_at: String,
}

pub struct AdminRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl StudentRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            serial_id: row.get(0)?,
            enrollment_no: row.get(1)?,
            full_name: row.get(2)?,
            father_name: row.get(3)?,
            dob: row.get(4)?,
            email: row.get(5)?,
            year: row.get(6)?,
            course: row.get(7)?,
            branch: row.get(8)?,
            photo_url: row.get(9)?,
            participation_interests: row.get(10)?,
            fee_amount: row.get(11)?,
            verification_status: row.get(12)?,
            checked_in: row.get(13)?,
            checked_in_at: row.get(14)?,
            created_at: row.get(15)?,
        })
    }

    pub fn from_student(student: &Student) -> Self {
        Self {
            serial_id: student.serial_id.clone(),
            enrollment_no: student.enrollment_no.clone(),
            full_name: student.full_name.clone(),
            father_name: student.father_name.clone(),
            dob: student.dob.clone(),
            email: student.email.clone(),
            year: student.year.to_string(),
            course: student.course.to_string(),
            branch: student.branch.to_string(),
            photo_url: student.photo_url.clone(),
            participation_interests: serde_json::to_string(&student.participation_interests)
                .unwrap_or_else(|_| "[]".to_string()),
            fee_amount: student.fee_amount.clone(),
            verification_status: student.verification_status.to_string(),
            checked_in: student.checked_in,
            checked_in_at: student.checked_in_at.map(format_timestamp),
            created_at: format_timestamp(student.created_at),
        }
    }

    /// Corrupt stored values are logged and replaced rather than failing the read.
    pub fn into_student(self) -> Student {
        let participation_interests = serde_json::from_str(&self.participation_interests)
            .unwrap_or_else(|e| {
                warn!(
                    "Corrupt participation_interests on student '{}': {}",
                    self.serial_id, e
                );
                Vec::new()
            });

        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on student '{}'", self.created_at, self.serial_id);
            DateTime::default()
        });

        let checked_in_at = if self.checked_in {
            let parsed = self.checked_in_at.as_deref().and_then(parse_timestamp);
            if parsed.is_none() {
                warn!(
                    "Corrupt checked_in_at {:?} on student '{}'",
                    self.checked_in_at, self.serial_id
                );
            }
            Some(parsed.unwrap_or(created_at))
        } else {
            None
        };

        Student {
            serial_id: self.serial_id,
            enrollment_no: self.enrollment_no,
            full_name: self.full_name,
            father_name: self.father_name,
            dob: self.dob,
            email: self.email,
            year: self.year.into(),
            course: self.course.into(),
            branch: self.branch.into(),
            photo_url: self.photo_url,
            participation_interests,
            fee_amount: self.fee_amount,
            verification_status: self.verification_status.into(),
            checked_in: self.checked_in,
            checked_in_at,
            created_at,
        }
    }
}

impl AdminRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

/// RFC 3339, UTC, millisecond precision. Lexical order equals time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone. Parse as naive UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}
