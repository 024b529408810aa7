//! Error types for the markr-xml codec.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported media type {0:?}; expected {expected:?}", expected = crate::CONTENT_TYPE)]
  UnsupportedMediaType(String),

  #[error("malformed document: {0}")]
  MalformedDocument(String),

  #[error("unexpected document root <{0}>; expected <{root}>", root = crate::ROOT_TAG)]
  UnexpectedDocumentShape(String),

  #[error("incomplete record #{position}: {field}")]
  IncompleteRecord { position: usize, field: MissingField },

  #[error("invalid record #{position}: {reason}")]
  InvalidRecord { position: usize, reason: String },
}

/// The required part of a record that was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
  StudentNumber,
  TestId,
  SummaryMarks,
  AvailableMarks,
  ObtainedMarks,
}

impl fmt::Display for MissingField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      MissingField::StudentNumber => "no student number",
      MissingField::TestId => "no test id",
      MissingField::SummaryMarks => "no summary marks",
      MissingField::AvailableMarks => "available marks not set",
      MissingField::ObtainedMarks => "obtained marks not set",
    })
  }
}

/// Why a single record was rejected, before its position is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
  #[error("{0}")]
  Incomplete(MissingField),

  #[error("{0}")]
  Invalid(String),
}

impl RecordError {
  /// Attach the record's 1-based position within its document.
  pub fn at(self, position: usize) -> Error {
    match self {
      RecordError::Incomplete(field) => Error::IncompleteRecord { position, field },
      RecordError::Invalid(reason) => Error::InvalidRecord { position, reason },
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
