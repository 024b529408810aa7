//! Record extraction: one `mcq-test-result` element into a [`ResultRecord`].
//!
//! | Field            | Source                              | Required |
//! |------------------|-------------------------------------|----------|
//! | first name       | `<first-name>` text                 | no       |
//! | last name        | `<last-name>` text                  | no       |
//! | student number   | `<student-number>` text             | yes      |
//! | test id          | `<test-id>` text                    | yes      |
//! | available marks  | `<summary-marks available="…">`     | yes, > 0 |
//! | obtained marks   | `<summary-marks obtained="…">`      | yes      |
//!
//! Blank text or a blank attribute counts as absent. Any other child element
//! or attribute is ignored.

use std::{num::NonZeroU32, str::FromStr};

use markr_core::model::ResultRecord;

use crate::{
  document::Element,
  error::{MissingField, RecordError},
};

pub fn extract(node: &Element) -> Result<ResultRecord, RecordError> {
  let first_name = optional_text(node, "first-name");
  let last_name = optional_text(node, "last-name");

  let student_number = number(
    "student number",
    required_text(node, "student-number", MissingField::StudentNumber)?,
  )?;
  let test_id = number("test id", required_text(node, "test-id", MissingField::TestId)?)?;

  let summary = node
    .child("summary-marks")
    .ok_or(RecordError::Incomplete(MissingField::SummaryMarks))?;
  let available: u32 = number(
    "available marks",
    required_attribute(summary, "available", MissingField::AvailableMarks)?,
  )?;
  let obtained_marks = number(
    "obtained marks",
    required_attribute(summary, "obtained", MissingField::ObtainedMarks)?,
  )?;

  let available_marks = NonZeroU32::new(available).ok_or_else(|| {
    RecordError::Invalid("available marks must be greater than zero".into())
  })?;

  Ok(ResultRecord {
    first_name,
    last_name,
    student_number,
    test_id,
    available_marks,
    obtained_marks,
  })
}

fn optional_text(node: &Element, tag: &str) -> Option<String> {
  node
    .child(tag)
    .map(|c| c.text.trim())
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
}

fn required_text<'a>(
  node: &'a Element,
  tag: &str,
  missing: MissingField,
) -> Result<&'a str, RecordError> {
  node
    .child(tag)
    .map(|c| c.text.trim())
    .filter(|t| !t.is_empty())
    .ok_or(RecordError::Incomplete(missing))
}

fn required_attribute<'a>(
  node: &'a Element,
  name: &str,
  missing: MissingField,
) -> Result<&'a str, RecordError> {
  node
    .attribute(name)
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(RecordError::Incomplete(missing))
}

fn number<T: FromStr>(what: &str, raw: &str) -> Result<T, RecordError> {
  raw
    .parse()
    .map_err(|_| RecordError::Invalid(format!("{what} {raw:?} is not a valid number")))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::parse_tree;

  fn extract_xml(xml: &str) -> Result<ResultRecord, RecordError> {
    extract(&parse_tree(xml.as_bytes()).unwrap())
  }

  fn missing(xml: &str) -> MissingField {
    match extract_xml(xml) {
      Err(RecordError::Incomplete(field)) => field,
      other => panic!("expected incomplete record, got {other:?}"),
    }
  }

  const ANSWERS: &str = r#"
    <answer question="1" marks-available="1" marks-awarded="1">A</answer>
    <answer question="2" marks-available="1" marks-awarded="0">B</answer>"#;

  #[test]
  fn extracts_complete_record() {
    let record = extract_xml(&format!(
      r#"<mcq-test-result scanned-on="2017-01-01T00:00:00Z">
           <first-name>Jane</first-name>
           <more-random-stuff>noise</more-random-stuff>
           <last-name>Student</last-name>
           <student-number> 99999999 </student-number>
           <test-id>78763</test-id>
           <summary-marks available="10" obtained="2" />
           {ANSWERS}
         </mcq-test-result>"#
    ))
    .unwrap();

    assert_eq!(record, ResultRecord {
      first_name:      Some("Jane".into()),
      last_name:       Some("Student".into()),
      student_number:  99999999,
      test_id:         78763,
      available_marks: NonZeroU32::new(10).unwrap(),
      obtained_marks:  2,
    });
    assert_eq!(record.percent_score(), 20.0);
  }

  #[test]
  fn names_are_optional() {
    let record = extract_xml(
      r#"<mcq-test-result>
           <first-name></first-name>
           <student-number>1</student-number>
           <test-id>2</test-id>
           <summary-marks available="4" obtained="3" />
         </mcq-test-result>"#,
    )
    .unwrap();
    assert_eq!(record.first_name, None);
    assert_eq!(record.last_name, None);
  }

  #[test]
  fn missing_summary_marks() {
    let field = missing(&format!(
      r#"<mcq-test-result>
           <student-number>99999999</student-number>
           <test-id>78763</test-id>
           {ANSWERS}
         </mcq-test-result>"#
    ));
    assert_eq!(field, MissingField::SummaryMarks);
  }

  #[test]
  fn missing_available_marks() {
    let field = missing(
      r#"<mcq-test-result>
           <student-number>99999999</student-number>
           <test-id>78763</test-id>
           <summary-marks obtained="2" />
         </mcq-test-result>"#,
    );
    assert_eq!(field, MissingField::AvailableMarks);
  }

  #[test]
  fn missing_obtained_marks() {
    let field = missing(
      r#"<mcq-test-result>
           <student-number>99999999</student-number>
           <test-id>78763</test-id>
           <summary-marks available="10" obtained="" />
         </mcq-test-result>"#,
    );
    assert_eq!(field, MissingField::ObtainedMarks);
  }

  #[test]
  fn missing_student_number() {
    let field = missing(
      r#"<mcq-test-result>
           <first-name>Jane</first-name>
           <test-id>78763</test-id>
           <summary-marks available="10" obtained="2" />
         </mcq-test-result>"#,
    );
    assert_eq!(field, MissingField::StudentNumber);
  }

  #[test]
  fn blank_test_id_is_missing() {
    let field = missing(
      r#"<mcq-test-result>
           <student-number>99999999</student-number>
           <test-id>   </test-id>
           <summary-marks available="10" obtained="2" />
         </mcq-test-result>"#,
    );
    assert_eq!(field, MissingField::TestId);
  }

  #[test]
  fn zero_available_marks_is_invalid() {
    let err = extract_xml(
      r#"<mcq-test-result>
           <student-number>1</student-number>
           <test-id>2</test-id>
           <summary-marks available="0" obtained="0" />
         </mcq-test-result>"#,
    )
    .unwrap_err();
    assert!(matches!(err, RecordError::Invalid(_)), "got {err:?}");
  }

  #[test]
  fn non_numeric_values_are_invalid() {
    for (student, available, obtained) in
      [("abc", "10", "2"), ("1", "ten", "2"), ("1", "10", "-2"), ("1", "10", "2.5")]
    {
      let err = extract_xml(&format!(
        r#"<mcq-test-result>
             <student-number>{student}</student-number>
             <test-id>2</test-id>
             <summary-marks available="{available}" obtained="{obtained}" />
           </mcq-test-result>"#
      ))
      .unwrap_err();
      assert!(matches!(err, RecordError::Invalid(_)), "got {err:?}");
    }
  }

  #[test]
  fn obtained_above_available_is_accepted() {
    let record = extract_xml(
      r#"<mcq-test-result>
           <student-number>1</student-number>
           <test-id>2</test-id>
           <summary-marks available="10" obtained="11" />
         </mcq-test-result>"#,
    )
    .unwrap();
    assert_eq!(record.percent_score(), 110.0);
  }
}
