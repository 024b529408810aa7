//! Codec for scanned multiple-choice result documents.
//!
//! Validates a document against the `text/xml+markr` contract and extracts
//! its `mcq-test-result` records into [`markr_core`] domain types. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let xml = br#"<mcq-test-results>
//!   <mcq-test-result>
//!     <first-name>Jane</first-name>
//!     <last-name>Austen</last-name>
//!     <student-number>521585128</student-number>
//!     <test-id>1234</test-id>
//!     <summary-marks available="20" obtained="13" />
//!   </mcq-test-result>
//! </mcq-test-results>"#;
//! let records = markr_xml::parse(xml, Some(markr_xml::CONTENT_TYPE)).unwrap();
//! assert_eq!(records[0].percent_score(), 65.0);
//! ```

pub mod document;
pub mod error;
pub mod record;

pub use document::{Element, validate};
pub use error::{Error, MissingField, RecordError, Result};
use markr_core::model::ResultRecord;
pub use record::extract;

/// The only content type accepted for result documents.
pub const CONTENT_TYPE: &str = "text/xml+markr";

/// Tag of the document root.
pub const ROOT_TAG: &str = "mcq-test-results";

/// Tag of each result record under the root.
pub const RECORD_TAG: &str = "mcq-test-result";

/// Validate a document and extract every record in document order.
///
/// All-or-nothing: the first record that fails extraction fails the whole
/// document. Children of the root other than `mcq-test-result` are ignored.
pub fn parse(payload: &[u8], content_type: Option<&str>) -> Result<Vec<ResultRecord>> {
  let root = validate(payload, content_type)?;
  root
    .children_named(RECORD_TAG)
    .enumerate()
    .map(|(i, node)| extract(node).map_err(|e| e.at(i + 1)))
    .collect()
}
