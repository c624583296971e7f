//! Status payload validation.
//!
//! The status API answers with
//! `{"homeworks": [{"homework_name", "status", "reviewer_comment"?, ...}], "current_date": <unix seconds>}`.
//! Everything here is pure: the raw JSON goes in, typed items and the next
//! cursor come out, or a `MalformedResponse` explaining what was wrong.
//!
//! Only the envelope is strict. Items are read leniently: a field of the wrong
//! type reads as absent, so one odd item never blocks the rest of the list.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{domain::Cursor, errors::Error, Result};

/// One reviewed homework as reported by the API.
///
/// Fields are optional here; the formatter decides which ones it needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WorkItem {
    #[serde(default, deserialize_with = "string_or_none")]
    pub homework_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub reviewer_comment: Option<String>,
}

impl WorkItem {
    /// Read one `homeworks` element. Anything that is not an object yields an
    /// empty item, which the formatter rejects with `MissingField`.
    pub fn from_value(item: &Value) -> Self {
        if !item.is_object() {
            return Self::default();
        }
        Self::deserialize(item).unwrap_or_default()
    }
}

fn string_or_none<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A payload that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedResponse {
    /// Newest first, as returned by the API.
    pub homeworks: Vec<WorkItem>,
    pub current_date: Cursor,
}

impl CheckedResponse {
    /// The single item reported per cycle: the newest one.
    pub fn latest(&self) -> Option<&WorkItem> {
        self.homeworks.first()
    }
}

pub fn validate(payload: &Value) -> Result<CheckedResponse> {
    let obj = as_object(payload)?;
    let homeworks = homeworks(obj)?;
    let current_date = current_date(obj)?;
    Ok(CheckedResponse {
        homeworks,
        current_date,
    })
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>> {
    payload.as_object().ok_or_else(|| {
        Error::MalformedResponse(format!(
            "expected a JSON object, got {}",
            type_name(payload)
        ))
    })
}

fn homeworks(obj: &Map<String, Value>) -> Result<Vec<WorkItem>> {
    let raw = obj
        .get("homeworks")
        .ok_or_else(|| Error::MalformedResponse("homeworks not in response".to_string()))?;
    let list = raw.as_array().ok_or_else(|| {
        Error::MalformedResponse(format!(
            "homeworks must be a list, got {}",
            type_name(raw)
        ))
    })?;

    Ok(list.iter().map(WorkItem::from_value).collect())
}

fn current_date(obj: &Map<String, Value>) -> Result<Cursor> {
    match obj.get("current_date") {
        None | Some(Value::Null) => Err(Error::MalformedResponse(
            "current_date not in response".to_string(),
        )),
        Some(v) => v.as_i64().map(Cursor).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "current_date must be an integer, got {v}"
            ))
        }),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_malformed(payload: Value) {
        match validate(&payload) {
            Err(Error::MalformedResponse(_)) => {}
            other => panic!("expected MalformedResponse for {payload}, got {other:?}"),
        }
    }

    #[test]
    fn accepts_items_and_returns_cursor() {
        let payload = json!({
            "homeworks": [
                {"homework_name": "proj2", "status": "reviewing", "id": 7},
                {"homework_name": "proj1", "status": "approved", "reviewer_comment": "ok"}
            ],
            "current_date": 1000
        });
        let checked = validate(&payload).unwrap();
        assert_eq!(checked.current_date, Cursor(1000));
        assert_eq!(checked.homeworks.len(), 2);
        assert_eq!(checked.homeworks[1].reviewer_comment.as_deref(), Some("ok"));
    }

    #[test]
    fn accepts_empty_list() {
        let checked = validate(&json!({"homeworks": [], "current_date": 5})).unwrap();
        assert!(checked.homeworks.is_empty());
        assert!(checked.latest().is_none());
        assert_eq!(checked.current_date, Cursor(5));
    }

    #[test]
    fn latest_is_first_element() {
        let checked = validate(&json!({
            "homeworks": [
                {"homework_name": "newest", "status": "approved"},
                {"homework_name": "older", "status": "rejected"}
            ],
            "current_date": 1
        }))
        .unwrap();
        assert_eq!(
            checked.latest().and_then(|w| w.homework_name.as_deref()),
            Some("newest")
        );
    }

    #[test]
    fn keeps_items_missing_fields_for_the_formatter() {
        let checked = validate(&json!({"homeworks": [{}], "current_date": 1})).unwrap();
        assert_eq!(checked.homeworks[0], WorkItem::default());
    }

    #[test]
    fn rejects_every_shape_violation() {
        assert_malformed(json!([]));
        assert_malformed(json!("homeworks"));
        assert_malformed(Value::Null);
        assert_malformed(json!({"current_date": 1}));
        assert_malformed(json!({"homeworks": null, "current_date": 1}));
        assert_malformed(json!({"homeworks": {"a": 1}, "current_date": 1}));
        assert_malformed(json!({"homeworks": []}));
        assert_malformed(json!({"homeworks": [], "current_date": null}));
        assert_malformed(json!({"homeworks": [], "current_date": "1000"}));
        assert_malformed(json!({"homeworks": [], "current_date": 10.5}));
    }

    #[test]
    fn odd_items_read_leniently() {
        let checked = validate(&json!({
            "homeworks": [
                {"homework_name": "newest", "status": "approved", "reviewer_comment": 5},
                {"homework_name": 3, "status": null},
                ["proj", "approved"],
                1
            ],
            "current_date": 1000
        }))
        .unwrap();
        assert_eq!(checked.current_date, Cursor(1000));
        assert_eq!(
            checked.homeworks[0],
            WorkItem {
                homework_name: Some("newest".to_string()),
                status: Some("approved".to_string()),
                reviewer_comment: None,
            }
        );
        assert_eq!(checked.homeworks[1], WorkItem::default());
        assert_eq!(checked.homeworks[2], WorkItem::default());
        assert_eq!(checked.homeworks[3], WorkItem::default());
    }

    #[test]
    fn bad_older_item_does_not_hide_newest() {
        let checked = validate(&json!({
            "homeworks": [
                {"homework_name": "newest", "status": "approved"},
                {"homework_name": "older", "status": "approved", "reviewer_comment": 5}
            ],
            "current_date": 1000
        }))
        .unwrap();
        assert_eq!(
            checked.latest().and_then(|w| w.homework_name.as_deref()),
            Some("newest")
        );
    }

    #[test]
    fn negative_and_zero_dates_are_passed_through() {
        let checked = validate(&json!({"homeworks": [], "current_date": -3})).unwrap();
        assert_eq!(checked.current_date, Cursor(-3));
        let checked = validate(&json!({"homeworks": [], "current_date": 0})).unwrap();
        assert_eq!(checked.current_date, Cursor(0));
    }
}
