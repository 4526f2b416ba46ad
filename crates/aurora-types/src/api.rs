use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkin::CheckInOutcome;
use crate::models::{Branch, Course, DEFAULT_FEE, Student, VerificationStatus, Year};

// -- Registration --

/// Registration payload. Every field is optional; missing ones take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub enrollment_no: Option<String>,
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub year: Option<String>,
    pub course: Option<String>,
    pub branch: Option<String>,
    pub photo_url: Option<String>,
    pub participation_interests: Option<Vec<String>>,
    pub fee_amount: Option<String>,
}

impl RegisterRequest {
    /// Build a fresh record: pending, not checked in, created `now`.
    /// Empty `year`, `course` and `feeAmount` count as missing.
    pub fn into_student(self, serial_id: String, now: DateTime<Utc>) -> Student {
        Student {
            serial_id,
            enrollment_no: self.enrollment_no.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            father_name: self.father_name.unwrap_or_default(),
            dob: self.dob.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            year: non_empty(self.year).map(Year::from).unwrap_or_default(),
            course: non_empty(self.course).map(Course::from).unwrap_or_default(),
            branch: self.branch.map(Branch::from).unwrap_or_default(),
            photo_url: self.photo_url.unwrap_or_default(),
            participation_interests: self.participation_interests.unwrap_or_default(),
            fee_amount: non_empty(self.fee_amount).unwrap_or_else(|| DEFAULT_FEE.to_string()),
            verification_status: VerificationStatus::Pending,
            checked_in: false,
            checked_in_at: None,
            created_at: now,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct DeleteStudentResponse {
    pub success: bool,
    pub student: Student,
}

// -- Check-in --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckInQuery {
    /// Staff override of the pending-verification warning.
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub warning: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        let warning = matches!(outcome, CheckInOutcome::PendingVerification(_));
        let success = warning || matches!(outcome, CheckInOutcome::CheckedIn(_));
        Self {
            success,
            warning,
            message: outcome.message().to_string(),
            student: outcome.into_student(),
        }
    }
}

// -- Admin --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
}

// -- Health --

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Unix milliseconds.
    pub time: i64,
}
