//! The merge engine: reconciles one validated record against committed state
//! plus whatever the current [`UnitOfWork`] has already staged.
//!
//! Policy per record:
//!
//! - **Student**: created on first sighting; names are first-write-wins.
//! - **Test**: created on first sighting; available-marks only ever rises.
//! - **Score**: created on first sighting; obtained-marks only ever rises,
//!   and the percent-score is recomputed from the record that raised it.
//!
//! Equal values are a no-op, so re-importing a document changes nothing.

use crate::{
  Error, Result,
  model::{ResultRecord, Score, Student, Test},
  store::ScoreStore,
  work::UnitOfWork,
};

/// Stage the effects of `record` into `work` without committing anything.
pub async fn merge_record<S>(
  store: &S,
  work: &mut UnitOfWork,
  record: &ResultRecord,
) -> Result<()>
where
  S: ScoreStore,
{
  if current_student(store, work, record).await?.is_none() {
    work.insert_student(record.student());
  }

  match current_test(store, work, record).await? {
    None => work.insert_test(record.test()),
    Some(test) if record.available_marks.get() > test.available_marks => {
      work.update_test(record.test());
    }
    Some(_) => {}
  }

  match current_score(store, work, record).await? {
    None => work.insert_score(record.score()),
    Some(score) if record.obtained_marks > score.obtained_marks => {
      work.update_score(record.score());
    }
    Some(_) => {}
  }

  Ok(())
}

/// Stage every record in order into a fresh [`UnitOfWork`].
pub async fn merge_all<S>(store: &S, records: &[ResultRecord]) -> Result<UnitOfWork>
where
  S: ScoreStore,
{
  let mut work = UnitOfWork::new();
  for record in records {
    merge_record(store, &mut work, record).await?;
  }
  Ok(work)
}

// ─── Staged-then-committed lookups ───────────────────────────────────────────

async fn current_student<S: ScoreStore>(
  store: &S,
  work: &UnitOfWork,
  record: &ResultRecord,
) -> Result<Option<Student>> {
  if let Some(student) = work.staged_student(record.student_number) {
    return Ok(Some(student.clone()));
  }
  store
    .find_student(record.student_number)
    .await
    .map_err(Error::store)
}

async fn current_test<S: ScoreStore>(
  store: &S,
  work: &UnitOfWork,
  record: &ResultRecord,
) -> Result<Option<Test>> {
  if let Some(test) = work.staged_test(record.test_id) {
    return Ok(Some(*test));
  }
  store.find_test(record.test_id).await.map_err(Error::store)
}

async fn current_score<S: ScoreStore>(
  store: &S,
  work: &UnitOfWork,
  record: &ResultRecord,
) -> Result<Option<Score>> {
  if let Some(score) = work.staged_score(record.test_id, record.student_number) {
    return Ok(Some(*score));
  }
  store
    .find_score(record.test_id, record.student_number)
    .await
    .map_err(Error::store)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
  use std::{
    collections::BTreeMap,
    convert::Infallible,
    num::NonZeroU32,
    sync::Mutex,
  };

  use super::*;
  use crate::{
    model::{StudentNumber, TestId},
    work::{Change, CommitSummary},
  };

  /// A `ScoreStore` over plain maps, committing under a mutex.
  #[derive(Default)]
  pub(crate) struct MemoryStore {
    students: Mutex<BTreeMap<StudentNumber, Student>>,
    tests:    Mutex<BTreeMap<TestId, Test>>,
    scores:   Mutex<BTreeMap<(TestId, StudentNumber), Score>>,
  }

  impl MemoryStore {
    pub(crate) fn with_scores(scores: impl IntoIterator<Item = Score>) -> Self {
      let store = Self::default();
      {
        let mut map = store.scores.lock().unwrap();
        for score in scores {
          map.insert((score.test_id, score.student_number), score);
        }
      }
      store
    }
  }

  impl ScoreStore for MemoryStore {
    type Error = Infallible;

    async fn find_student(
      &self,
      student_number: StudentNumber,
    ) -> Result<Option<Student>, Infallible> {
      Ok(self.students.lock().unwrap().get(&student_number).cloned())
    }

    async fn find_test(&self, test_id: TestId) -> Result<Option<Test>, Infallible> {
      Ok(self.tests.lock().unwrap().get(&test_id).copied())
    }

    async fn find_score(
      &self,
      test_id: TestId,
      student_number: StudentNumber,
    ) -> Result<Option<Score>, Infallible> {
      Ok(self.scores.lock().unwrap().get(&(test_id, student_number)).copied())
    }

    async fn scores_for_test(&self, test_id: TestId) -> Result<Vec<Score>, Infallible> {
      Ok(
        self
          .scores
          .lock()
          .unwrap()
          .values()
          .filter(|s| s.test_id == test_id)
          .copied()
          .collect(),
      )
    }

    async fn commit(&self, work: UnitOfWork) -> Result<CommitSummary, Infallible> {
      let rows = work.into_parts();
      let summary = rows.summary();
      let mut students = self.students.lock().unwrap();
      for s in rows.students {
        students.insert(s.student_number, s);
      }
      let mut tests = self.tests.lock().unwrap();
      for t in rows.tests {
        tests.insert(t.row.test_id, t.row);
      }
      let mut scores = self.scores.lock().unwrap();
      for s in rows.scores {
        scores.insert((s.row.test_id, s.row.student_number), s.row);
      }
      Ok(summary)
    }
  }

  fn record(available: u32, obtained: u32) -> ResultRecord {
    ResultRecord {
      first_name:      Some("Jane".into()),
      last_name:       Some("Austen".into()),
      student_number:  99999,
      test_id:         1234,
      available_marks: NonZeroU32::new(available).unwrap(),
      obtained_marks:  obtained,
    }
  }

  async fn import(store: &MemoryStore, records: &[ResultRecord]) -> CommitSummary {
    let work = merge_all(store, records).await.unwrap();
    store.commit(work).await.unwrap()
  }

  async fn score(store: &MemoryStore) -> Score {
    store.find_score(1234, 99999).await.unwrap().unwrap()
  }

  async fn available(store: &MemoryStore) -> u32 {
    store.find_test(1234).await.unwrap().unwrap().available_marks
  }

  #[tokio::test]
  async fn first_sighting_creates_everything() {
    let store = MemoryStore::default();
    let summary = import(&store, &[record(10, 5)]).await;

    assert_eq!(summary, CommitSummary {
      students_inserted: 1,
      tests_inserted: 1,
      scores_inserted: 1,
      ..CommitSummary::default()
    });
    assert_eq!(score(&store).await.obtained_marks, 5);
    assert_eq!(score(&store).await.percent_score, 50.0);
    assert_eq!(available(&store).await, 10);
  }

  #[tokio::test]
  async fn highest_obtained_within_one_batch_wins() {
    let store = MemoryStore::default();
    import(&store, &[record(10, 2), record(10, 9), record(10, 8)]).await;

    assert_eq!(store.scores_for_test(1234).await.unwrap().len(), 1);
    assert_eq!(score(&store).await.obtained_marks, 9);
    assert_eq!(score(&store).await.percent_score, 90.0);
  }

  #[tokio::test]
  async fn highest_obtained_across_batches_wins() {
    let store = MemoryStore::default();
    import(&store, &[record(10, 9)]).await;

    import(&store, &[record(10, 2)]).await;
    assert_eq!(score(&store).await.obtained_marks, 9);

    import(&store, &[record(20, 11)]).await;
    assert_eq!(score(&store).await.obtained_marks, 11);
    assert_eq!(score(&store).await.percent_score, 55.0);
  }

  #[tokio::test]
  async fn highest_available_within_and_across_batches_wins() {
    let store = MemoryStore::default();
    import(&store, &[record(2, 1), record(9, 1), record(8, 1)]).await;
    assert_eq!(available(&store).await, 9);

    import(&store, &[record(2, 1)]).await;
    assert_eq!(available(&store).await, 9);

    import(&store, &[record(11, 1)]).await;
    assert_eq!(available(&store).await, 11);
  }

  #[tokio::test]
  async fn reimport_is_a_no_op() {
    let store = MemoryStore::default();
    import(&store, &[record(10, 5)]).await;

    let work = merge_all(&store, &[record(10, 5)]).await.unwrap();
    assert!(work.is_empty());
    assert_eq!(store.commit(work).await.unwrap(), CommitSummary::default());
  }

  #[tokio::test]
  async fn percent_uses_the_records_own_available_marks() {
    let store = MemoryStore::default();
    import(&store, &[record(20, 5)]).await;
    import(&store, &[record(10, 6)]).await;

    assert_eq!(available(&store).await, 20);
    assert_eq!(score(&store).await.percent_score, 60.0);
  }

  #[tokio::test]
  async fn student_names_are_first_write_wins() {
    let store = MemoryStore::default();
    import(&store, &[record(10, 5)]).await;

    let mut renamed = record(10, 7);
    renamed.first_name = Some("Emma".into());
    import(&store, &[renamed]).await;

    let student = store.find_student(99999).await.unwrap().unwrap();
    assert_eq!(student.first_name.as_deref(), Some("Jane"));
  }

  #[tokio::test]
  async fn update_against_committed_row_is_staged_as_update() {
    let store = MemoryStore::default();
    import(&store, &[record(10, 5)]).await;

    let work = merge_all(&store, &[record(12, 6)]).await.unwrap();
    let rows = work.into_parts();
    assert!(rows.students.is_empty());
    assert_eq!(rows.tests[0].change, Change::Update);
    assert_eq!(rows.scores[0].change, Change::Update);
  }

  #[tokio::test]
  async fn dropped_work_leaves_store_untouched() {
    let store = MemoryStore::default();
    let work = merge_all(&store, &[record(10, 5)]).await.unwrap();
    drop(work);

    assert!(store.find_score(1234, 99999).await.unwrap().is_none());
    assert!(store.find_test(1234).await.unwrap().is_none());
  }
}
