//! Error types for `markr-core`.

use thiserror::Error;

use crate::model::TestId;

#[derive(Debug, Error)]
pub enum Error {
  /// No scores exist for the test, whether or not it was ever imported.
  #[error("no scores recorded for test {0}")]
  TestNotFound(TestId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a gateway error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
