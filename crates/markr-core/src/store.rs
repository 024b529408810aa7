//! The `ScoreStore` trait: the persistence gateway consumed by the merge and
//! aggregation engines.
//!
//! Implemented by storage backends (e.g. `markr-store-sqlite`). Reads go
//! straight to committed state; writes are only ever applied in bulk through
//! [`ScoreStore::commit`].

use std::future::Future;

use crate::{
  model::{Score, Student, StudentNumber, Test, TestId},
  work::{CommitSummary, UnitOfWork},
};

/// Abstraction over a Markr score store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a student by number. Returns `None` if not found.
  fn find_student(
    &self,
    student_number: StudentNumber,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Retrieve a test by id. Returns `None` if not found.
  fn find_test(
    &self,
    test_id: TestId,
  ) -> impl Future<Output = Result<Option<Test>, Self::Error>> + Send + '_;

  /// Retrieve the score for a `(test, student)` pair, if any.
  fn find_score(
    &self,
    test_id: TestId,
    student_number: StudentNumber,
  ) -> impl Future<Output = Result<Option<Score>, Self::Error>> + Send + '_;

  /// Every committed score for a test, in no particular order.
  fn scores_for_test(
    &self,
    test_id: TestId,
  ) -> impl Future<Output = Result<Vec<Score>, Self::Error>> + Send + '_;

  /// Atomically apply every insert and update staged in `work`.
  ///
  /// Either all staged rows become visible or none do.
  fn commit(
    &self,
    work: UnitOfWork,
  ) -> impl Future<Output = Result<CommitSummary, Self::Error>> + Send + '_;
}
