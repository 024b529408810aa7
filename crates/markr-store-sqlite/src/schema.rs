//! SQL schema for the Markr SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Names are written once, on first sighting.
CREATE TABLE IF NOT EXISTS students (
    student_number  INTEGER PRIMARY KEY,
    first_name      TEXT,
    last_name       TEXT
);

-- available_marks only ever increases.
CREATE TABLE IF NOT EXISTS tests (
    test_id          INTEGER PRIMARY KEY,
    available_marks  INTEGER NOT NULL CHECK (available_marks > 0)
);

-- One row per (test, student); obtained_marks only ever increases.
CREATE TABLE IF NOT EXISTS scores (
    test_id         INTEGER NOT NULL REFERENCES tests(test_id),
    student_number  INTEGER NOT NULL REFERENCES students(student_number),
    obtained_marks  INTEGER NOT NULL CHECK (obtained_marks >= 0),
    percent_score   REAL    NOT NULL,
    PRIMARY KEY (test_id, student_number)
);

CREATE INDEX IF NOT EXISTS scores_student_idx ON scores(student_number);

PRAGMA user_version = 1;
";
