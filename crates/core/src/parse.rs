use crate::error::ExtractionError;
use crate::models::ExtractedRecord;
use serde_json::Value;

/// Locates the candidate JSON object in raw model output: the span from the
/// first `{` to the last `}`. Deliberately naive — the reference behavior
/// depends on it — and fragile against non-JSON braces in surrounding prose.
pub fn extract_json_span(raw: &str) -> Result<&str, ExtractionError> {
    let start = raw.find('{');
    let end = raw.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(ExtractionError::NoJsonFound {
            raw: raw.to_string(),
        }),
    }
}

/// Parses raw model output into a record conforming to the requested field
/// list: every field present, string values kept, anything absent, null or
/// non-string becomes null.
pub fn parse_record(raw: &str, fields: &[String]) -> Result<ExtractedRecord, ExtractionError> {
    let span = extract_json_span(raw)?;

    let value: Value =
        serde_json::from_str(span).map_err(|error| ExtractionError::MalformedJson {
            details: error.to_string(),
            raw: raw.to_string(),
        })?;

    let Value::Object(object) = value else {
        return Err(ExtractionError::MalformedJson {
            details: "top-level JSON value is not an object".to_string(),
            raw: raw.to_string(),
        });
    };

    let mut record = ExtractedRecord::new(fields);
    for field in fields {
        if let Some(Value::String(text)) = object.get(field) {
            record.set(field, Some(text.clone()));
        }
    }

    Ok(record)
}
