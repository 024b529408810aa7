//! Handlers for `/results` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/results/{test_id}/aggregate` | 404 if the test has no scores |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use markr_core::{
  aggregate::{Aggregate, aggregate_test},
  model::TestId,
  store::ScoreStore,
};

use crate::error::ApiError;

/// `GET /results/{test_id}/aggregate`
pub async fn aggregate<S>(
  State(store): State<Arc<S>>,
  Path(test_id): Path<String>,
) -> Result<Json<Aggregate>, ApiError>
where
  S: ScoreStore,
{
  let test_id: TestId = test_id
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("test id {test_id:?} is not an integer")))?;
  let aggregate = aggregate_test(store.as_ref(), test_id).await?;
  Ok(Json(aggregate))
}
