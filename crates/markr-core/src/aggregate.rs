//! Summary statistics over the percent-scores recorded for a test.
//!
//! Percentiles use linear interpolation between order statistics: the value
//! at fractional rank `(n − 1) × p / 100` of the ascending samples. Mean and
//! standard deviation (population) are rounded to two decimal places; the
//! order statistics are reported as found.

use serde::Serialize;

use crate::{
  Error, Result,
  model::{TestId, round2},
  store::ScoreStore,
};

/// Aggregate statistics for one test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
  pub mean:   f64,
  pub stddev: f64,
  pub min:    f64,
  pub max:    f64,
  pub p25:    f64,
  pub p50:    f64,
  pub p95:    f64,
  pub median: f64,
  pub count:  usize,
}

/// Fetch every committed score for `test_id` and summarise it.
///
/// Fails with [`Error::TestNotFound`] when the test has no scores.
pub async fn aggregate_test<S>(store: &S, test_id: TestId) -> Result<Aggregate>
where
  S: ScoreStore,
{
  let scores = store.scores_for_test(test_id).await.map_err(Error::store)?;
  let samples: Vec<f64> = scores.iter().map(|s| s.percent_score).collect();
  summarize(&samples).ok_or(Error::TestNotFound(test_id))
}

/// Summarise a set of samples. Returns `None` for an empty set.
pub fn summarize(samples: &[f64]) -> Option<Aggregate> {
  if samples.is_empty() {
    return None;
  }

  let mut sorted = samples.to_vec();
  sorted.sort_by(f64::total_cmp);

  let count = sorted.len();
  let n = count as f64;
  let mean = sorted.iter().sum::<f64>() / n;
  let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

  Some(Aggregate {
    mean: round2(mean),
    stddev: round2(variance.sqrt()),
    min: sorted[0],
    max: sorted[count - 1],
    p25: percentile(&sorted, 25.0),
    p50: percentile(&sorted, 50.0),
    p95: percentile(&sorted, 95.0),
    median: percentile(&sorted, 50.0),
    count,
  })
}

/// Linearly interpolated percentile of non-empty, ascending `sorted`.
///
/// Interpolates from whichever neighbour is nearer, as NumPy does, so
/// results agree to the last bit.
fn percentile(sorted: &[f64], p: f64) -> f64 {
  let rank = (sorted.len() - 1) as f64 * p / 100.0;
  let lo = rank.floor() as usize;
  let hi = rank.ceil() as usize;
  let (a, b) = (sorted[lo], sorted[hi]);
  let t = rank - lo as f64;
  if t >= 0.5 { b - (b - a) * (1.0 - t) } else { a + (b - a) * t }
}
