//! `POST /import`: the ingestion pipeline.
//!
//! validate → extract every record → merge in document order → commit once.
//! Nothing is committed unless every record in the document extracts
//! cleanly.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use bytes::Bytes;
use markr_core::{merge::merge_all, store::ScoreStore};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
  /// Number of records merged from the document.
  pub imported: usize,
}

/// `POST /import`, body is a `text/xml+markr` document.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<ImportResponse>, ApiError>
where
  S: ScoreStore,
{
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok());
  let imported = ingest(store.as_ref(), &body, content_type).await?;
  Ok(Json(ImportResponse { imported }))
}

/// Validate, extract, merge, and commit one document. Returns the number of
/// records merged.
pub async fn ingest<S>(
  store: &S,
  payload: &[u8],
  content_type: Option<&str>,
) -> Result<usize, ApiError>
where
  S: ScoreStore,
{
  let records = markr_xml::parse(payload, content_type).inspect_err(|e| {
    tracing::warn!(error = %e, bytes = payload.len(), "rejected result document");
  })?;

  let work = merge_all(store, &records).await?;
  let summary = store
    .commit(work)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(records = records.len(), ?summary, "imported result document");
  Ok(records.len())
}
