//! [`SqliteStore`]: the SQLite implementation of [`ScoreStore`].

use std::path::Path;

use markr_core::{
  model::{Score, Student, StudentNumber, Test, TestId},
  store::ScoreStore,
  work::{Change, CommitSummary, UnitOfWork},
};
use rusqlite::OptionalExtension as _;

use crate::{Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Markr score store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests and `test_mode`.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn score_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Score> {
  Ok(Score {
    test_id:        row.get(0)?,
    student_number: row.get(1)?,
    obtained_marks: row.get(2)?,
    percent_score:  row.get(3)?,
  })
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = crate::Error;

  async fn find_student(&self, student_number: StudentNumber) -> Result<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT student_number, first_name, last_name
             FROM students WHERE student_number = ?1",
            rusqlite::params![student_number],
            |row| {
              Ok(Student {
                student_number: row.get(0)?,
                first_name:     row.get(1)?,
                last_name:      row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(student)
  }

  async fn find_test(&self, test_id: TestId) -> Result<Option<Test>> {
    let test = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT test_id, available_marks FROM tests WHERE test_id = ?1",
            rusqlite::params![test_id],
            |row| {
              Ok(Test {
                test_id:         row.get(0)?,
                available_marks: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(test)
  }

  async fn find_score(
    &self,
    test_id: TestId,
    student_number: StudentNumber,
  ) -> Result<Option<Score>> {
    let score = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT test_id, student_number, obtained_marks, percent_score
             FROM scores WHERE test_id = ?1 AND student_number = ?2",
            rusqlite::params![test_id, student_number],
            score_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(score)
  }

  async fn scores_for_test(&self, test_id: TestId) -> Result<Vec<Score>> {
    let scores = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT test_id, student_number, obtained_marks, percent_score
           FROM scores WHERE test_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![test_id], score_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(scores)
  }

  /// Apply the staged rows in one transaction.
  ///
  /// Every write re-checks the grow-only rules in SQL, so a batch committed
  /// concurrently by another import can never be overwritten with a lower
  /// value.
  async fn commit(&self, work: UnitOfWork) -> Result<CommitSummary> {
    let rows = work.into_parts();
    let summary = rows.summary();
    if summary == CommitSummary::default() {
      return Ok(summary);
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut insert_student = tx.prepare_cached(
            "INSERT INTO students (student_number, first_name, last_name)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (student_number) DO NOTHING",
          )?;
          for s in &rows.students {
            insert_student.execute(rusqlite::params![
              s.student_number,
              s.first_name,
              s.last_name,
            ])?;
          }

          let mut insert_test = tx.prepare_cached(
            "INSERT INTO tests (test_id, available_marks) VALUES (?1, ?2)
             ON CONFLICT (test_id) DO UPDATE
               SET available_marks = excluded.available_marks
               WHERE excluded.available_marks > tests.available_marks",
          )?;
          let mut update_test = tx.prepare_cached(
            "UPDATE tests SET available_marks = ?2
             WHERE test_id = ?1 AND available_marks < ?2",
          )?;
          for t in &rows.tests {
            let stmt = match t.change {
              Change::Insert => &mut insert_test,
              Change::Update => &mut update_test,
            };
            stmt.execute(rusqlite::params![t.row.test_id, t.row.available_marks])?;
          }

          let mut insert_score = tx.prepare_cached(
            "INSERT INTO scores (test_id, student_number, obtained_marks, percent_score)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (test_id, student_number) DO UPDATE
               SET obtained_marks = excluded.obtained_marks,
                   percent_score  = excluded.percent_score
               WHERE excluded.obtained_marks > scores.obtained_marks",
          )?;
          let mut update_score = tx.prepare_cached(
            "UPDATE scores SET obtained_marks = ?3, percent_score = ?4
             WHERE test_id = ?1 AND student_number = ?2 AND obtained_marks < ?3",
          )?;
          for s in &rows.scores {
            let stmt = match s.change {
              Change::Insert => &mut insert_score,
              Change::Update => &mut update_score,
            };
            stmt.execute(rusqlite::params![
              s.row.test_id,
              s.row.student_number,
              s.row.obtained_marks,
              s.row.percent_score,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(?summary, "committed unit of work");
    Ok(summary)
  }
}
