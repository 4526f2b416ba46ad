use crate::Database;
use crate::models::{AdminRow, STUDENT_COLUMNS, StudentRow, format_timestamp};
use anyhow::{Result, bail};
use aurora_crypto::password::{hash_password, verify_password};
use aurora_crypto::serial::generate_serial_id;
use aurora_types::api::RegisterRequest;
use aurora_types::checkin::{self, CheckInDecision, CheckInOutcome};
use aurora_types::filter::StudentFilter;
use aurora_types::models::{Student, StudentStats, StudentUpdate, VerificationStatus, timestamp_now};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// How many fresh serials to try before giving up on a registration.
const MAX_SERIAL_ATTEMPTS: usize = 16;

impl Database {
    // -- Students --

    /// Register a new student. The record starts pending and not checked in.
    pub fn create_student(&self, req: RegisterRequest) -> Result<Student> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let now = timestamp_now();

            let serial_id = reserve_serial(&tx, now)?;
            let student = req.into_student(serial_id, now);
            insert_student(&tx, &StudentRow::from_student(&student))?;

            tx.commit()?;
            debug!("Registered student {}", student.serial_id);
            Ok(student)
        })
    }

    pub fn get_student(&self, serial_id: &str) -> Result<Option<Student>> {
        self.with_conn(|conn| {
            Ok(query_student(conn, serial_id)?.map(StudentRow::into_student))
        })
    }

    /// All students, most recently registered first.
    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.with_conn(|conn| {
            let rows = query_all_students(conn)?;
            Ok(rows.into_iter().map(StudentRow::into_student).collect())
        })
    }

    /// Apply an allow-listed partial update. `None` if the student does not exist.
    /// An update that changes nothing returns the stored record without writing.
    pub fn update_student(&self, serial_id: &str, update: StudentUpdate) -> Result<Option<Student>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(row) = query_student(&tx, serial_id)? else {
                return Ok(None);
            };
            let mut student = row.into_student();

            if update.apply(&mut student, timestamp_now()) {
                write_student(&tx, &StudentRow::from_student(&student))?;
                tx.commit()?;
                debug!("Updated student {}", serial_id);
            }

            Ok(Some(student))
        })
    }

    /// Remove a student, returning the removed record. The serial stays reserved.
    pub fn delete_student(&self, serial_id: &str) -> Result<Option<Student>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(row) = query_student(&tx, serial_id)? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM students WHERE serial_id = ?1", [serial_id])?;
            tx.commit()?;

            info!("Deleted student {}", serial_id);
            Ok(Some(row.into_student()))
        })
    }

    pub fn search_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        Ok(filter.apply(self.list_students()?))
    }

    pub fn student_stats(&self) -> Result<StudentStats> {
        self.with_conn(|conn| {
            let (total, checked_in, pending): (i64, i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(checked_in), 0),
                        COALESCE(SUM(verification_status = ?1), 0)
                 FROM students",
                [VerificationStatus::Pending.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            let mut stmt = conn.prepare("SELECT year, COUNT(*) FROM students GROUP BY year")?;
            let by_year: BTreeMap<String, u64> = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
                .collect::<std::result::Result<_, _>>()?;

            Ok(StudentStats {
                total: total as u64,
                checked_in: checked_in as u64,
                pending: pending as u64,
                by_year,
            })
        })
    }

    // -- Check-in --

    /// Evaluate the check-in rules against the stored record and apply the
    /// result, all under one transaction. Only an admitted student is written.
    pub fn check_in(&self, serial_id: &str, force: bool) -> Result<CheckInOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = query_student(&tx, serial_id)?.map(StudentRow::into_student);

            let outcome = match (checkin::decide(current.as_ref(), force), current) {
                (CheckInDecision::NotFound, _) | (_, None) => CheckInOutcome::Rejected,
                (CheckInDecision::AlreadyCheckedIn, Some(student)) => {
                    CheckInOutcome::AlreadyCheckedIn(student)
                }
                (CheckInDecision::PendingVerification, Some(student)) => {
                    CheckInOutcome::PendingVerification(student)
                }
                (CheckInDecision::Admit, Some(mut student)) => {
                    let pending = student.is_pending();
                    let now = timestamp_now();
                    student.mark_checked_in(now);

                    tx.execute(
                        "UPDATE students SET checked_in = 1, checked_in_at = ?2
                         WHERE serial_id = ?1 AND checked_in = 0",
                        (serial_id, format_timestamp(now)),
                    )?;
                    tx.commit()?;

                    if pending {
                        warn!("Student {} checked in with verification still pending (forced)", serial_id);
                    } else {
                        info!("Student {} checked in", serial_id);
                    }
                    CheckInOutcome::CheckedIn(student)
                }
            };

            Ok(outcome)
        })
    }

    // -- Admins --

    /// Insert the admin credential unless one with this email already exists.
    /// Returns whether a row was created.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            if query_admin_by_email(conn, email)?.is_some() {
                return Ok(false);
            }

            let password_hash = hash_password(password)?;
            conn.execute(
                "INSERT INTO admins (email, password_hash) VALUES (?1, ?2)",
                (email, &password_hash),
            )?;

            info!("Seeded admin credential for {}", email);
            Ok(true)
        })
    }

    pub fn get_admin_by_email(&self, email: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin_by_email(conn, email))
    }

    /// Verify admin credentials. Unknown email and wrong password are both `Ok(false)`.
    pub fn authenticate_admin(&self, email: &str, password: &str) -> Result<bool> {
        let Some(admin) = self.get_admin_by_email(email)? else {
            return Ok(false);
        };
        verify_password(password, &admin.password_hash)
    }
}

fn reserve_serial(conn: &Connection, now: DateTime<Utc>) -> Result<String> {
    for _ in 0..MAX_SERIAL_ATTEMPTS {
        let serial_id = generate_serial_id(now);
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO issued_serials (serial_id, issued_at) VALUES (?1, ?2)",
            (&serial_id, format_timestamp(now)),
        )?;
        if inserted == 1 {
            return Ok(serial_id);
        }
        debug!("Serial {} already issued, retrying", serial_id);
    }
    bail!("Could not allocate a unique serial after {} attempts", MAX_SERIAL_ATTEMPTS)
}

fn insert_student(conn: &Connection, row: &StudentRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO students ({STUDENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        rusqlite::params![
            row.serial_id,
            row.enrollment_no,
            row.full_name,
            row.father_name,
            row.dob,
            row.email,
            row.year,
            row.course,
            row.branch,
            row.photo_url,
            row.participation_interests,
            row.fee_amount,
            row.verification_status,
            row.checked_in,
            row.checked_in_at,
            row.created_at,
        ],
    )?;
    Ok(())
}

/// Overwrite the mutable columns. `serial_id` and `created_at` never change.
fn write_student(conn: &Connection, row: &StudentRow) -> Result<()> {
    conn.execute(
        "UPDATE students SET
            enrollment_no = ?2, full_name = ?3, father_name = ?4, dob = ?5, email = ?6,
            year = ?7, course = ?8, branch = ?9, photo_url = ?10,
            participation_interests = ?11, fee_amount = ?12, verification_status = ?13,
            checked_in = ?14, checked_in_at = ?15
         WHERE serial_id = ?1",
        rusqlite::params![
            row.serial_id,
            row.enrollment_no,
            row.full_name,
            row.father_name,
            row.dob,
            row.email,
            row.year,
            row.course,
            row.branch,
            row.photo_url,
            row.participation_interests,
            row.fee_amount,
            row.verification_status,
            row.checked_in,
            row.checked_in_at,
        ],
    )?;
    Ok(())
}

fn query_student(conn: &Connection, serial_id: &str) -> Result<Option<StudentRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE serial_id = ?1"))?;

    let row = stmt.query_row([serial_id], StudentRow::from_row).optional()?;

    Ok(row)
}

fn query_all_students(conn: &Connection) -> Result<Vec<StudentRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt
        .query_map([], StudentRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_admin_by_email(conn: &Connection, email: &str) -> Result<Option<AdminRow>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password_hash, created_at FROM admins WHERE email = ?1")?;

    let row = stmt.query_row([email], AdminRow::from_row).optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
