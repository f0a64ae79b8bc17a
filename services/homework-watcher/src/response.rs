//! Shape checks for the status API response

use serde_json::Value;

/// Key holding the list of homework records
pub const HOMEWORKS_KEY: &str = "homeworks";
/// Key holding the server's time watermark
pub const CURRENT_DATE_KEY: &str = "current_date";

/// One homework entry as reported by the API
///
/// Fields stay optional here; [`crate::verdict::VerdictTable::render`]
/// decides whether a record is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
    pub name: Option<String>,
    pub status: Option<String>,
}

impl StatusRecord {
    fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("homework_name"),
            status: field("status"),
        }
    }
}

/// Records and cursor extracted from a well-formed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResponse {
    /// Most recent first, as ordered by the API
    pub records: Vec<StatusRecord>,
    /// `current_date`, if the server reported one
    pub next_cursor: Option<u64>,
}

/// Check the raw response shape and pull out the records and next cursor
pub fn validate(raw: &Value) -> crate::Result<ValidatedResponse> {
    let object = raw.as_object().ok_or_else(|| {
        crate::WatcherError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            kind_of(raw)
        ))
    })?;

    let homeworks = object.get(HOMEWORKS_KEY).ok_or_else(|| {
        crate::WatcherError::EmptyResponse(format!("no '{}' key in response", HOMEWORKS_KEY))
    })?;

    let records = homeworks
        .as_array()
        .ok_or_else(|| {
            crate::WatcherError::MalformedResponse(format!(
                "'{}' is {}, expected a list",
                HOMEWORKS_KEY,
                kind_of(homeworks)
            ))
        })?
        .iter()
        .map(StatusRecord::from_value)
        .collect();

    let next_cursor = match object.get(CURRENT_DATE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_u64().ok_or_else(|| {
            crate::WatcherError::MalformedResponse(format!(
                "'{}' is not a non-negative integer: {}",
                CURRENT_DATE_KEY, value
            ))
        })?),
    };

    Ok(ValidatedResponse {
        records,
        next_cursor,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
