use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE students (
                serial_id               TEXT PRIMARY KEY,
                enrollment_no           TEXT NOT NULL DEFAULT '',
                full_name               TEXT NOT NULL DEFAULT '',
                father_name             TEXT NOT NULL DEFAULT '',
                dob                     TEXT NOT NULL DEFAULT '',
                email                   TEXT NOT NULL DEFAULT '',
                year                    TEXT NOT NULL,
                course                  TEXT NOT NULL,
                branch                  TEXT NOT NULL DEFAULT '',
                photo_url               TEXT NOT NULL DEFAULT '',
                participation_interests TEXT NOT NULL DEFAULT '[]',
                fee_amount              TEXT NOT NULL DEFAULT '0',
                verification_status     TEXT NOT NULL DEFAULT 'Pending',
                checked_in              INTEGER NOT NULL DEFAULT 0,
                checked_in_at           TEXT,
                created_at              TEXT NOT NULL,
                CHECK ((checked_in = 0) = (checked_in_at IS NULL))
            );

            CREATE INDEX idx_students_created
                ON students(created_at);

            -- Every serial ever handed out, kept after the student row is deleted
            CREATE TABLE issued_serials (
                serial_id   TEXT PRIMARY KEY,
                issued_at   TEXT NOT NULL
            );

            CREATE TABLE admins (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            "
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn check_in_columns_must_agree() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO students (serial_id, year, course, checked_in, created_at)
             VALUES ('AUR-bad-100', '1st', 'B.Tech', 1, '2025-01-01T00:00:00.000Z')",
            [],
        );
        assert!(result.is_err());
    }
}
