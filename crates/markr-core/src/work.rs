//! The unit of work: mutations staged by one ingestion call.
//!
//! A [`UnitOfWork`] is owned by a single import. Records merged earlier in the
//! same document are visible to later ones through the `staged_*` lookups.
//! Dropping it discards everything; handing it to
//! [`ScoreStore::commit`](crate::store::ScoreStore::commit) applies it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Score, Student, StudentNumber, Test, TestId};

/// How a staged row must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
  Insert,
  Update,
}

/// A row together with the write that will persist it.
#[derive(Debug, Clone, PartialEq)]
pub struct Staged<T> {
  pub change: Change,
  pub row:    T,
}

impl<T> Staged<T> {
  fn insert(row: T) -> Self { Self { change: Change::Insert, row } }

  fn update(row: T) -> Self { Self { change: Change::Update, row } }
}

#[derive(Debug, Default)]
pub struct UnitOfWork {
  students: BTreeMap<StudentNumber, Student>,
  tests:    BTreeMap<TestId, Staged<Test>>,
  scores:   BTreeMap<(TestId, StudentNumber), Staged<Score>>,
}

impl UnitOfWork {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool {
    self.students.is_empty() && self.tests.is_empty() && self.scores.is_empty()
  }

  // ── Lookups ───────────────────────────────────────────────────────────

  pub fn staged_student(&self, student_number: StudentNumber) -> Option<&Student> {
    self.students.get(&student_number)
  }

  pub fn staged_test(&self, test_id: TestId) -> Option<&Test> {
    self.tests.get(&test_id).map(|s| &s.row)
  }

  pub fn staged_score(
    &self,
    test_id: TestId,
    student_number: StudentNumber,
  ) -> Option<&Score> {
    self.scores.get(&(test_id, student_number)).map(|s| &s.row)
  }

  // ── Staging ───────────────────────────────────────────────────────────

  /// Stage a new student. Students are never updated.
  pub fn insert_student(&mut self, student: Student) {
    self.students.entry(student.student_number).or_insert(student);
  }

  pub fn insert_test(&mut self, test: Test) {
    self.tests.insert(test.test_id, Staged::insert(test));
  }

  /// Stage a new value for a test. A test that is itself still a staged
  /// insert stays an insert.
  pub fn update_test(&mut self, test: Test) {
    match self.tests.get_mut(&test.test_id) {
      Some(staged) => staged.row = test,
      None => {
        self.tests.insert(test.test_id, Staged::update(test));
      }
    }
  }

  pub fn insert_score(&mut self, score: Score) {
    self
      .scores
      .insert((score.test_id, score.student_number), Staged::insert(score));
  }

  pub fn update_score(&mut self, score: Score) {
    let key = (score.test_id, score.student_number);
    match self.scores.get_mut(&key) {
      Some(staged) => staged.row = score,
      None => {
        self.scores.insert(key, Staged::update(score));
      }
    }
  }

  // ── Draining (for store backends) ─────────────────────────────────────

  /// Split into the rows to write, in key order. Students and tests come
  /// first so score rows can reference them.
  pub fn into_parts(self) -> StagedRows {
    StagedRows {
      students: self.students.into_values().collect(),
      tests:    self.tests.into_values().collect(),
      scores:   self.scores.into_values().collect(),
    }
  }
}

/// The contents of a [`UnitOfWork`], ready to be written.
#[derive(Debug, Default)]
pub struct StagedRows {
  pub students: Vec<Student>,
  pub tests:    Vec<Staged<Test>>,
  pub scores:   Vec<Staged<Score>>,
}

/// Rows staged for a commit, per entity and change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
  pub students_inserted: usize,
  pub tests_inserted:    usize,
  pub tests_updated:     usize,
  pub scores_inserted:   usize,
  pub scores_updated:    usize,
}

impl StagedRows {
  /// What committing these rows will write.
  pub fn summary(&self) -> CommitSummary {
    CommitSummary {
      students_inserted: self.students.len(),
      tests_inserted:    count(&self.tests, Change::Insert),
      tests_updated:     count(&self.tests, Change::Update),
      scores_inserted:   count(&self.scores, Change::Insert),
      scores_updated:    count(&self.scores, Change::Update),
    }
  }
}

fn count<T>(rows: &[Staged<T>], change: Change) -> usize {
  rows.iter().filter(|s| s.change == change).count()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_row(available_marks: u32) -> Test { Test { test_id: 7, available_marks } }

  fn score_row(obtained_marks: u32) -> Score {
    Score {
      test_id: 7,
      student_number: 1,
      obtained_marks,
      percent_score: f64::from(obtained_marks) * 10.0,
    }
  }

  #[test]
  fn update_of_staged_insert_remains_insert() {
    let mut work = UnitOfWork::new();
    work.insert_test(test_row(5));
    work.update_test(test_row(9));

    let rows = work.into_parts();
    assert_eq!(rows.tests, vec![Staged::insert(test_row(9))]);
  }

  #[test]
  fn update_of_unstaged_row_is_update() {
    let mut work = UnitOfWork::new();
    work.update_score(score_row(4));
    work.update_score(score_row(6));

    let rows = work.into_parts();
    assert_eq!(rows.scores, vec![Staged::update(score_row(6))]);
  }

  #[test]
  fn students_are_first_write_wins() {
    let mut work = UnitOfWork::new();
    work.insert_student(Student {
      student_number: 1,
      first_name:     Some("Jane".into()),
      last_name:      None,
    });
    work.insert_student(Student {
      student_number: 1,
      first_name:     Some("John".into()),
      last_name:      None,
    });

    assert_eq!(
      work.staged_student(1).and_then(|s| s.first_name.as_deref()),
      Some("Jane")
    );
  }

  #[test]
  fn summary_counts_changes() {
    let mut work = UnitOfWork::new();
    work.insert_test(test_row(5));
    work.update_score(score_row(3));
    assert!(!work.is_empty());

    let summary = work.into_parts().summary();
    assert_eq!(summary, CommitSummary {
      tests_inserted: 1,
      scores_updated: 1,
      ..CommitSummary::default()
    });
  }
}
