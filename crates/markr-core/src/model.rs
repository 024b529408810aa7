//! Domain model: students, tests, scores, and the validated result record
//! that ingestion produces for each scanned sheet.

use std::num::NonZeroU32;

use serde::Serialize;

/// Externally supplied student number; asserted unique.
pub type StudentNumber = i64;

/// Externally supplied test identifier; asserted unique.
pub type TestId = i64;

// ─── Entities ────────────────────────────────────────────────────────────────

/// A student, created the first time their number is seen. Names are never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
  pub student_number: StudentNumber,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
}

/// A test and the highest available-marks ever reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Test {
  pub test_id:         TestId,
  pub available_marks: u32,
}

/// The best result a student has obtained on a test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
  pub test_id:        TestId,
  pub student_number: StudentNumber,
  pub obtained_marks: u32,
  /// `obtained / available × 100`, rounded to two decimal places, using the
  /// available-marks of the record that last wrote this score.
  pub percent_score:  f64,
}

// ─── Ingested record ─────────────────────────────────────────────────────────

/// One fully validated `mcq-test-result` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub student_number:  StudentNumber,
  pub test_id:         TestId,
  pub available_marks: NonZeroU32,
  pub obtained_marks:  u32,
}

impl ResultRecord {
  /// Percentage of the available marks obtained, rounded to 2 d.p.
  ///
  /// Obtained marks above the available marks are not clamped.
  pub fn percent_score(&self) -> f64 {
    let ratio =
      f64::from(self.obtained_marks) / f64::from(self.available_marks.get());
    round2(ratio * 100.0)
  }

  pub fn student(&self) -> Student {
    Student {
      student_number: self.student_number,
      first_name:     self.first_name.clone(),
      last_name:      self.last_name.clone(),
    }
  }

  pub fn test(&self) -> Test {
    Test {
      test_id:         self.test_id,
      available_marks: self.available_marks.get(),
    }
  }

  pub fn score(&self) -> Score {
    Score {
      test_id:        self.test_id,
      student_number: self.student_number,
      obtained_marks: self.obtained_marks,
      percent_score:  self.percent_score(),
    }
  }
}

/// Round to two decimal places from the exact decimal value of `value`;
/// exact ties go to the even digit.
pub fn round2(value: f64) -> f64 {
  format!("{value:.2}").parse().unwrap_or(value)
}
