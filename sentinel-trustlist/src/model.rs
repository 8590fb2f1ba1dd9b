use serde::{Deserialize, Serialize};

/// A user record in the remote trustlist registry.
///
/// Timestamps are owned by the remote service: they are read back on lookup
/// and never sent on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustlistEntry {
    pub id: u64,
    pub escalation_level: u8,
    #[serde(default)]
    pub escalation_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl TrustlistEntry {
    /// The zero-level default the registry reports for ids it has never seen.
    pub fn clean(id: u64) -> Self {
        Self {
            id,
            escalation_level: 0,
            escalation_note: String::new(),
            entered_at: None,
            last_updated: None,
        }
    }

    /// A record as submitted by an insert-or-escalate call.
    pub fn record(id: u64, escalation_level: u8, escalation_note: impl Into<String>) -> Self {
        Self {
            id,
            escalation_level,
            escalation_note: escalation_note.into(),
            entered_at: None,
            last_updated: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.escalation_level == 0
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Unix seconds after which the token is no longer accepted.
    pub valid_until: i64,
}

#[cfg(test)]
mod tests {
    use super::TrustlistEntry;

    #[test]
    fn clean_records_are_level_zero() {
        let entry = TrustlistEntry::clean(42);
        assert!(entry.is_clean());
        assert_eq!(entry.id, 42);
        assert!(entry.escalation_note.is_empty());
    }

    #[test]
    fn insert_records_omit_service_owned_timestamps() {
        let record = TrustlistEntry::record(42, 3, "spam account");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["escalationLevel"], 3);
        assert_eq!(json["escalationNote"], "spam account");
        assert!(json.get("enteredAt").is_none());
        assert!(json.get("lastUpdated").is_none());
    }

    #[test]
    fn lookup_payloads_decode_with_timestamps() {
        let entry: TrustlistEntry = serde_json::from_str(
            r#"{"id":7,"escalationLevel":2,"escalationNote":"raid alt","enteredAt":1700000000,"lastUpdated":1700600000}"#,
        )
        .unwrap();
        assert_eq!(entry.escalation_level, 2);
        assert_eq!(entry.entered_at, Some(1_700_000_000));
        assert!(!entry.is_clean());
    }
}
