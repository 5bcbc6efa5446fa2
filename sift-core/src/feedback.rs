//! Feedback preprocessing
//!
//! Review dumps arrive either as a proper JSON array or as "loose" JSON: a
//! sequence of top-level objects with no separating commas (one object per
//! line is the common case). Both shapes are normalized into a list of
//! [`Feedback`] records with sequential ids, which is the payload format
//! expected by the NLP jobs.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::feedback::Feedback;

/// Field holding the review text in uploaded dumps
pub const REVIEW_TEXT_FIELD: &str = "reviewText";

/// Errors produced while normalizing feedback
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Input is not valid JSON
    #[error("Invalid JSON at value {index}: {source}")]
    InvalidJson {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The input contained no values at all
    #[error("Feedback input is empty")]
    Empty,

    /// A top-level value had an unsupported type
    #[error("Unexpected JSON type: expected an array or objects, found {0}")]
    UnexpectedType(&'static str),

    /// A record had no string `reviewText` field
    #[error("Record {index} has no string \"reviewText\" field")]
    MissingField { index: usize },

    /// Writing the normalized output failed
    #[error("Failed to write feedback: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Detects whether the input is loose JSON
///
/// Returns true when the input holds more than one top-level value, or
/// when it cannot be read as a stream of JSON values at all.
pub fn is_loose_json(input: &[u8]) -> bool {
    let mut values = serde_json::Deserializer::from_slice(input).into_iter::<Value>();
    let mut count = 0usize;

    for value in values.by_ref() {
        if value.is_err() {
            return true;
        }
        count += 1;
        if count > 1 {
            return true;
        }
    }

    false
}

/// Normalizes a feedback dump into [`Feedback`] records
///
/// Accepts a single top-level array of objects, or a stream of top-level
/// objects. Ids are assigned from zero in input order.
pub fn process_json(input: &[u8]) -> Result<Vec<Feedback>> {
    let mut values = serde_json::Deserializer::from_slice(input)
        .into_iter::<Value>()
        .enumerate()
        .map(|(index, value)| value.map_err(|source| FeedbackError::InvalidJson { index, source }));

    let first = values.next().ok_or(FeedbackError::Empty)??;

    match first {
        Value::Array(items) => {
            if values.next().is_some() {
                return Err(FeedbackError::UnexpectedType("trailing data after array"));
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| to_feedback(index, item))
                .collect()
        }
        Value::Object(_) => {
            let mut records = vec![to_feedback(0, &first)?];
            for (offset, value) in values.enumerate() {
                let value = value?;
                let index = offset + 1;
                if !value.is_object() {
                    return Err(FeedbackError::UnexpectedType(type_name(&value)));
                }
                records.push(to_feedback(index, &value)?);
            }
            Ok(records)
        }
        other => Err(FeedbackError::UnexpectedType(type_name(&other))),
    }
}

/// Writes records as a JSON array
pub fn write_json<W: Write>(records: &[Feedback], mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, records).map_err(std::io::Error::from)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes records as CSV with a `fb_id,fb_body` header
pub fn write_csv<W: Write>(records: &[Feedback], mut writer: W) -> Result<()> {
    writeln!(writer, "fb_id,fb_body")?;
    for record in records {
        writeln!(writer, "{},{}", record.id, csv_field(&record.body))?;
    }
    writer.flush()?;
    Ok(())
}

/// File name used for exported feedback, e.g. `hk_feedback_processed_20240101120000.csv`
pub fn processed_file_name(extension: &str, now: DateTime<Utc>) -> String {
    format!(
        "hk_feedback_processed_{}.{}",
        now.format("%Y%m%d%H%M%S"),
        extension
    )
}

fn to_feedback(index: usize, value: &Value) -> Result<Feedback> {
    value
        .get(REVIEW_TEXT_FIELD)
        .and_then(Value::as_str)
        .map(|body| Feedback::new(index as u64, body))
        .ok_or(FeedbackError::MissingField { index })
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LOOSE: &str = r#"{"reviewText": "Great product", "overall": 5}
{"reviewText": "Broke after a week", "overall": 1}
{"reviewText": "Fine, I guess", "overall": 3}"#;

    const ARRAY: &str = r#"[{"reviewText": "Great product"}, {"reviewText": "Meh"}]"#;

    #[test]
    fn test_detects_loose_json() {
        assert!(is_loose_json(LOOSE.as_bytes()));
        assert!(!is_loose_json(ARRAY.as_bytes()));
        assert!(!is_loose_json(br#"{"reviewText": "only one"}"#));
    }

    #[test]
    fn test_unparsable_input_counts_as_loose() {
        assert!(is_loose_json(b"{not json"));
    }

    #[test]
    fn test_process_loose_stream() {
        let records = process_json(LOOSE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], Feedback::new(0, "Great product"));
        assert_eq!(records[2], Feedback::new(2, "Fine, I guess"));
    }

    #[test]
    fn test_process_array() {
        let records = process_json(ARRAY.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![Feedback::new(0, "Great product"), Feedback::new(1, "Meh")]
        );
    }

    #[test]
    fn test_missing_review_text() {
        let err = process_json(br#"{"reviewText": "ok"} {"overall": 2}"#).unwrap_err();
        assert!(matches!(err, FeedbackError::MissingField { index: 1 }));
    }

    #[test]
    fn test_unexpected_type() {
        let err = process_json(b"42").unwrap_err();
        assert!(matches!(err, FeedbackError::UnexpectedType("number")));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(process_json(b"  ").unwrap_err(), FeedbackError::Empty));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_string(&Feedback::new(7, "hi")).unwrap();
        assert_eq!(json, r#"{"fb_id":7,"fb_body":"hi"}"#);
    }

    #[test]
    fn test_write_csv_quotes_fields() {
        let records = vec![
            Feedback::new(0, "plain"),
            Feedback::new(1, "has, comma"),
            Feedback::new(2, "say \"hi\""),
        ];
        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "fb_id,fb_body\n0,plain\n1,\"has, comma\"\n2,\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&[Feedback::new(0, "a")], &mut out).unwrap();
        assert_eq!(out, b"[{\"fb_id\":0,\"fb_body\":\"a\"}]\n");
    }

    #[test]
    fn test_processed_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 1).unwrap();
        assert_eq!(
            processed_file_name("csv", now),
            "hk_feedback_processed_20240309170501.csv"
        );
    }
}
