//! JSON bodies exchanged with the scraping service. Field names are the
//! service's contract and must not change.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractBody {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractReply {
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireUnit {
    Minutes,
    Days,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleBody {
    pub frequency: u32,
    pub unit: WireUnit,
    pub email: String,
    pub url: String,
    pub is_continuous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleReply {
    pub schedule_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopAllReply {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub data_json: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Row of `GET /api/schedules`. The service stores flags as SQLite
/// integers, so they are accepted as either booleans or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub url: String,
    pub email: String,
    pub frequency_days: u32,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub is_continuous: bool,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default)]
    pub last_run: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// FastAPI-style `detail`: a string, or a structured validation report.
    pub(crate) fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn default_true() -> bool {
    true
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Null(()) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_body_uses_contract_field_names() {
        let body = ScheduleBody {
            frequency: 12,
            unit: WireUnit::Minutes,
            email: "ops@example.com".into(),
            url: "https://example.com".into(),
            is_continuous: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "frequency": 12,
                "unit": "minutes",
                "email": "ops@example.com",
                "url": "https://example.com",
                "is_continuous": true,
            })
        );
    }

    #[test]
    fn extract_body_omits_absent_email() {
        let body = ExtractBody {
            url: "https://example.com".into(),
            email: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "url": "https://example.com" })
        );
    }

    #[test]
    fn schedule_entry_accepts_sqlite_flags() {
        let entry: ScheduleEntry = serde_json::from_value(json!({
            "id": 3,
            "url": "https://example.com",
            "topic": "Auto-CSS",
            "email": "ops@example.com",
            "frequency_days": 7,
            "unit": "days",
            "is_continuous": 0,
            "is_active": 1,
            "next_run": "2025-01-08 09:00:00",
            "last_run": null
        }))
        .unwrap();
        assert!(!entry.is_continuous);
        assert_eq!(entry.frequency_days, 7);
        assert_eq!(entry.last_run, None);
    }

    #[test]
    fn error_detail_handles_string_and_structured_forms() {
        let plain: ErrorBody =
            serde_json::from_value(json!({"detail": "Extraction Failed: x"})).unwrap();
        assert_eq!(plain.detail_text().as_deref(), Some("Extraction Failed: x"));

        let structured: ErrorBody =
            serde_json::from_value(json!({"detail": [{"loc": ["body", "url"]}]})).unwrap();
        assert!(structured.detail_text().unwrap().contains("loc"));

        let empty: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.detail_text(), None);
    }
}
