// stowage-core/src/domain/records.rs

use serde_json::{Map, Value};

use crate::domain::error::DomainError;

pub type Record = Map<String, Value>;

/// The records fetched from the remote API: a sequence of JSON objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Accepts only a top-level array whose elements are all objects.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(DomainError::UnexpectedPayload(format!(
                    "expected a JSON array, got {}",
                    kind_of(&other)
                )));
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(DomainError::UnexpectedPayload(format!(
                        "element {} is {}, expected an object",
                        index,
                        kind_of(&other)
                    )));
                }
            }
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// The whole collection as a single JSON document (an array).
    pub fn to_json_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.records)
    }

    /// One compact object per line, every line newline-terminated.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Inverse of [`RecordSet::to_json_lines`]. Blank lines are skipped.
    pub fn from_json_lines(text: &str) -> Result<Self, DomainError> {
        let mut records = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                DomainError::UnexpectedPayload(format!("line {}: {}", line_no + 1, e))
            })?;
            match value {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(DomainError::UnexpectedPayload(format!(
                        "line {} is {}, expected an object",
                        line_no + 1,
                        kind_of(&other)
                    )));
                }
            }
        }
        Ok(Self { records })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    fn sample() -> Result<RecordSet> {
        Ok(RecordSet::from_value(json!([
            {"id": 1, "name": "Ada", "tags": ["a", "b"]},
            {"id": 2, "name": "Grace", "nested": {"x": 1.5}},
            {"id": 3, "name": null}
        ]))?)
    }

    #[test]
    fn test_rejects_non_array_payload() {
        let err = RecordSet::from_value(json!({"data": []})).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn test_rejects_non_object_element() {
        let err = RecordSet::from_value(json!([{"id": 1}, 42])).unwrap_err();
        assert!(err.to_string().contains("element 1 is a number"));
    }

    #[test]
    fn test_json_lines_layout() -> Result<()> {
        let records = RecordSet::from_value(json!([{"a": 1}, {"a": 2}]))?;
        insta::assert_snapshot!(records.to_json_lines()?, @r#"
        {"a":1}
        {"a":2}
        "#);
        Ok(())
    }

    #[test]
    fn test_json_lines_round_trip_keeps_objects() -> Result<()> {
        let original = sample()?;
        let text = original.to_json_lines()?;
        assert_eq!(text.lines().count(), 3);

        let decoded = RecordSet::from_json_lines(&text)?;
        assert_eq!(decoded.len(), original.len());
        for record in original.iter() {
            assert!(decoded.iter().any(|r| r == record));
        }
        Ok(())
    }

    #[test]
    fn test_empty_set_has_no_lines() -> Result<()> {
        let empty = RecordSet::from_value(json!([]))?;
        assert!(empty.is_empty());
        assert_eq!(empty.to_json_lines()?, "");
        assert_eq!(empty.to_json_document()?, "[]");
        Ok(())
    }

    #[test]
    fn test_json_document_is_the_array() -> Result<()> {
        let records = sample()?;
        let back: Value = serde_json::from_str(&records.to_json_document()?)?;
        assert_eq!(back.as_array().map(|a| a.len()), Some(3));
        Ok(())
    }

    #[test]
    fn test_from_json_lines_skips_blank_and_rejects_scalars() -> Result<()> {
        let decoded = RecordSet::from_json_lines("{\"a\":1}\n\n{\"a\":2}\n")?;
        assert_eq!(decoded.len(), 2);
        assert!(RecordSet::from_json_lines("[1,2]\n").is_err());
        Ok(())
    }
}
