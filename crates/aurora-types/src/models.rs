use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of known wire values that still carries anything else verbatim.
/// Incoming strings are never rejected: unknown values land in `Other` and
/// serialize back exactly as they arrived.
macro_rules! lenient_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

lenient_enum! {
    /// Year of study.
    Year {
        First => "1st",
        Second => "2nd",
        Third => "3rd",
        Fourth => "4th",
    }
}

lenient_enum! {
    Course {
        BTech => "B.Tech",
        MTech => "M.Tech",
        Bca => "BCA",
        Mca => "MCA",
    }
}

lenient_enum! {
    Branch {
        Cse => "CSE",
        Ece => "ECE",
        Mechanical => "Mechanical",
        Civil => "Civil",
        Electrical => "Electrical",
        It => "IT",
        AiMl => "AI & ML",
    }
}

lenient_enum! {
    /// Administrative approval state. Distinct from check-in.
    VerificationStatus {
        Pending => "Pending",
        Verified => "Verified",
    }
}

impl Default for Year {
    fn default() -> Self {
        Year::First
    }
}

impl Default for Course {
    fn default() -> Self {
        Course::BTech
    }
}

/// Branch has no natural first choice; a missing branch stays empty.
impl Default for Branch {
    fn default() -> Self {
        Branch::Other(String::new())
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Pending
    }
}

/// Fee recorded when the registrant supplies none.
pub const DEFAULT_FEE: &str = "0";

/// A registered attendee.
///
/// `checked_in_at` is `Some` exactly when `checked_in` is true, and
/// `checked_in` never goes back to false once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub serial_id: String,
    pub enrollment_no: String,
    pub full_name: String,
    pub father_name: String,
    pub dob: String,
    pub email: String,
    pub year: Year,
    pub course: Course,
    pub branch: Branch,
    /// Embedded image payload, stored as received.
    pub photo_url: String,
    pub participation_interests: Vec<String>,
    pub fee_amount: String,
    pub verification_status: VerificationStatus,
    pub checked_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn is_pending(&self) -> bool {
        self.verification_status == VerificationStatus::Pending
    }

    /// Flip to checked-in. Returns false (and changes nothing) if already in.
    pub fn mark_checked_in(&mut self, at: DateTime<Utc>) -> bool {
        if self.checked_in {
            return false;
        }
        self.checked_in = true;
        self.checked_in_at = Some(at);
        true
    }
}

/// Current time at the precision timestamps are persisted with (milliseconds),
/// so a record returned from a write compares equal to the same record read back.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Allow-listed partial update. Keys outside this struct are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentUpdate {
    pub enrollment_no: Option<String>,
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub year: Option<Year>,
    pub course: Option<Course>,
    pub branch: Option<Branch>,
    pub photo_url: Option<String>,
    pub participation_interests: Option<Vec<String>>,
    pub fee_amount: Option<String>,
    pub verification_status: Option<VerificationStatus>,
    pub checked_in: Option<bool>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == StudentUpdate::default()
    }

    /// Merge the supplied fields into `student`. Returns whether anything changed.
    ///
    /// `checked_in: Some(false)` is ignored: a record is never un-checked.
    pub fn apply(self, student: &mut Student, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        assign(&mut student.enrollment_no, self.enrollment_no, &mut changed);
        assign(&mut student.full_name, self.full_name, &mut changed);
        assign(&mut student.father_name, self.father_name, &mut changed);
        assign(&mut student.dob, self.dob, &mut changed);
        assign(&mut student.email, self.email, &mut changed);
        assign(&mut student.year, self.year, &mut changed);
        assign(&mut student.course, self.course, &mut changed);
        assign(&mut student.branch, self.branch, &mut changed);
        assign(&mut student.photo_url, self.photo_url, &mut changed);
        assign(
            &mut student.participation_interests,
            self.participation_interests,
            &mut changed,
        );
        assign(&mut student.fee_amount, self.fee_amount, &mut changed);
        assign(
            &mut student.verification_status,
            self.verification_status,
            &mut changed,
        );

        if self.checked_in == Some(true) && student.mark_checked_in(now) {
            changed = true;
        }

        changed
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: Option<T>, changed: &mut bool) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            *changed = true;
        }
    }
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total: u64,
    pub checked_in: u64,
    pub pending: u64,
    pub by_year: std::collections::BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Student {
        Student {
            serial_id: "AUR-test-100".into(),
            enrollment_no: "EN01".into(),
            full_name: "Asha Rao".into(),
            father_name: "R. Rao".into(),
            dob: "2004-02-11".into(),
            email: "asha@college.edu".into(),
            year: Year::Second,
            course: Course::BTech,
            branch: Branch::Cse,
            photo_url: String::new(),
            participation_interests: vec!["Singing".into()],
            fee_amount: "200".into(),
            verification_status: VerificationStatus::Pending,
            checked_in: false,
            checked_in_at: None,
            created_at: timestamp_now(),
        }
    }

    #[test]
    fn unknown_enum_values_round_trip_verbatim() {
        let year: Year = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(year, Year::Other("1".into()));
        assert_eq!(serde_json::to_string(&year).unwrap(), "\"1\"");

        let branch: Branch = serde_json::from_str("\"AI & ML\"").unwrap();
        assert_eq!(branch, Branch::AiMl);
        assert_eq!(serde_json::to_string(&branch).unwrap(), "\"AI & ML\"");
    }

    #[test]
    fn student_json_uses_camel_case_and_hides_missing_check_in_time() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["serialId"], "AUR-test-100");
        assert_eq!(json["verificationStatus"], "Pending");
        assert_eq!(json["year"], "2nd");
        assert!(json.get("checkedInAt").is_none());
    }

    #[test]
    fn update_ignores_unknown_and_protected_keys() {
        let update: StudentUpdate = serde_json::from_str(
            r#"{"serialId":"AUR-hijack-999","createdAt":"2000-01-01T00:00:00Z","isAdmin":true}"#,
        )
        .unwrap();
        assert!(update.is_empty());

        let mut student = sample();
        let before = student.clone();
        assert!(!update.apply(&mut student, timestamp_now()));
        assert_eq!(student, before);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let update: StudentUpdate =
            serde_json::from_str(r#"{"verificationStatus":"Verified","feeAmount":"500"}"#).unwrap();

        let mut student = sample();
        assert!(update.apply(&mut student, timestamp_now()));
        assert_eq!(student.verification_status, VerificationStatus::Verified);
        assert_eq!(student.fee_amount, "500");
        assert_eq!(student.full_name, "Asha Rao");
    }

    #[test]
    fn update_never_unchecks() {
        let mut student = sample();
        let at = timestamp_now();
        student.mark_checked_in(at);

        let update = StudentUpdate {
            checked_in: Some(false),
            ..Default::default()
        };
        assert!(!update.apply(&mut student, timestamp_now()));
        assert!(student.checked_in);
        assert_eq!(student.checked_in_at, Some(at));
    }

    #[test]
    fn update_check_in_sets_timestamp_once() {
        let mut student = sample();
        let first = timestamp_now();
        let update = StudentUpdate {
            checked_in: Some(true),
            ..Default::default()
        };
        assert!(update.clone().apply(&mut student, first));
        assert_eq!(student.checked_in_at, Some(first));

        let later = first + chrono::Duration::seconds(30);
        assert!(!update.apply(&mut student, later));
        assert_eq!(student.checked_in_at, Some(first));
    }
}
