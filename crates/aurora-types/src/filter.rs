use serde::Deserialize;

use crate::models::Student;

/// Filter value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// Shared predicate behind search and CSV export.
///
/// `term` is a case-insensitive substring match against name, enrollment
/// number and serial ID; `year` and `status` are exact matches unless set to
/// [`ALL`]. All three must hold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentFilter {
    pub term: String,
    pub year: String,
    pub status: String,
}

impl Default for StudentFilter {
    fn default() -> Self {
        Self {
            term: String::new(),
            year: ALL.to_string(),
            status: ALL.to_string(),
        }
    }
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        self.matches_term(student) && self.matches_year(student) && self.matches_status(student)
    }

    pub fn apply(&self, students: Vec<Student>) -> Vec<Student> {
        students.into_iter().filter(|s| self.matches(s)).collect()
    }

    fn matches_term(&self, student: &Student) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let needle = self.term.to_lowercase();
        [&student.full_name, &student.enrollment_no, &student.serial_id]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_year(&self, student: &Student) -> bool {
        self.year == ALL || student.year.as_str() == self.year
    }

    fn matches_status(&self, student: &Student) -> bool {
        self.status == ALL || student.verification_status.as_str() == self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, Course, VerificationStatus, Year, timestamp_now};

    fn student(serial: &str, name: &str, enrollment: &str, year: Year, status: VerificationStatus) -> Student {
        Student {
            serial_id: serial.into(),
            enrollment_no: enrollment.into(),
            full_name: name.into(),
            father_name: String::new(),
            dob: String::new(),
            email: String::new(),
            year,
            course: Course::BTech,
            branch: Branch::Cse,
            photo_url: String::new(),
            participation_interests: vec![],
            fee_amount: "0".into(),
            verification_status: status,
            checked_in: false,
            checked_in_at: None,
            created_at: timestamp_now(),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("AUR-a-101", "Meera Nair", "CS2201", Year::First, VerificationStatus::Pending),
            student("AUR-b-202", "Vikram Shah", "EC2145", Year::Second, VerificationStatus::Verified),
            student("AUR-c-303", "Nairobi Lee", "ME1190", Year::First, VerificationStatus::Verified),
        ]
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = StudentFilter::default();
        assert_eq!(filter.apply(roster()).len(), 3);
    }

    #[test]
    fn term_is_case_insensitive_across_fields() {
        let by_name = StudentFilter { term: "NAIR".into(), ..Default::default() };
        let names: Vec<_> = by_name.apply(roster()).into_iter().map(|s| s.full_name).collect();
        assert_eq!(names, vec!["Meera Nair", "Nairobi Lee"]);

        let by_enrollment = StudentFilter { term: "ec21".into(), ..Default::default() };
        assert_eq!(by_enrollment.apply(roster()).len(), 1);

        let by_serial = StudentFilter { term: "aur-c".into(), ..Default::default() };
        assert_eq!(by_serial.apply(roster())[0].full_name, "Nairobi Lee");
    }

    #[test]
    fn filters_are_anded() {
        let filter = StudentFilter {
            term: "nair".into(),
            year: "1st".into(),
            status: "Verified".into(),
        };
        let hits = filter.apply(roster());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].serial_id, "AUR-c-303");
    }

    #[test]
    fn unmatched_term_yields_nothing() {
        let filter = StudentFilter { term: "zzz".into(), ..Default::default() };
        assert!(filter.apply(roster()).is_empty());
    }

    #[test]
    fn missing_query_fields_default_to_all() {
        let filter: StudentFilter = serde_json::from_str(r#"{"term":"vik"}"#).unwrap();
        assert_eq!(filter.year, ALL);
        assert_eq!(filter.status, ALL);
        assert_eq!(filter.apply(roster()).len(), 1);
    }
}
