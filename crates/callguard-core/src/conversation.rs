//! Screened-call conversation history.
//!
//! The backend returns an object keyed by call identifier. Each entry holds a
//! summary of the call and the exchanges between the caller and the screening
//! assistant.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Summary the backend attaches to a screened call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Number of the caller.
    #[serde(default)]
    pub from_number: Option<String>,
    /// When the call happened.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-text summary of the call.
    #[serde(default)]
    pub summary: Option<String>,
    /// Number of messages exchanged, as counted by the backend.
    #[serde(default)]
    pub conversation_length: Option<u32>,
}

/// One caller utterance and the assistant's reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// What the caller said.
    #[serde(default)]
    pub user: String,
    /// What the assistant answered.
    #[serde(default)]
    pub bot: String,
}

/// A screened call with its summary and transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    /// Backend call identifier, usually `<caller>_<suffix>`.
    pub key: String,
    /// Call summary.
    pub summary: ConversationSummary,
    /// Ordered exchanges.
    pub conversation: Vec<Exchange>,
}

impl ConversationRecord {
    /// Number to show and redial: the summary's caller, else the key prefix.
    #[must_use]
    pub fn caller_number(&self) -> &str {
        self.summary
            .from_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.key.split('_').next().unwrap_or(&self.key))
    }

    /// Message count: the backend's count, else the transcript length.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.summary
            .conversation_length
            .map_or(self.conversation.len(), |n| n as usize)
    }

    /// Whether there is a transcript to expand.
    #[must_use]
    pub fn has_transcript(&self) -> bool {
        !self.conversation.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    summary: Option<ConversationSummary>,
    #[serde(default)]
    conversation: Vec<Exchange>,
}

/// Conversation history, newest call first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    records: Vec<ConversationRecord>,
}

impl<'de> Deserialize<'de> for ConversationHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, RawConversation>::deserialize(deserializer)?;
        let records = raw
            .into_iter()
            .map(|(key, entry)| ConversationRecord {
                key,
                summary: entry.summary.unwrap_or_default(),
                conversation: entry.conversation,
            })
            .collect();
        Ok(Self::from_records(records))
    }
}

impl ConversationHistory {
    /// Build a history, ordering records newest first.
    ///
    /// Records without a timestamp go last; ties keep key order.
    #[must_use]
    pub fn from_records(mut records: Vec<ConversationRecord>) -> Self {
        records.sort_by(|a, b| {
            b.summary
                .timestamp
                .cmp(&a.summary.timestamp)
                .then_with(|| a.key.cmp(&b.key))
        });
        Self { records }
    }

    /// Records, newest first.
    #[must_use]
    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    /// Find a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConversationRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS` strings and epoch
/// milliseconds. Anything else becomes `None` rather than failing the whole
/// history.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
        Other(serde_json::Value),
    }

    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(RawTimestamp::Text(text)) => parse_timestamp_text(&text),
        Some(RawTimestamp::Other(_)) | None => None,
    };
    Ok(parsed)
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "9876543210_1700000000": {
            "summary": {
                "fromNumber": "9876543210",
                "timestamp": "2024-03-01T10:15:00Z",
                "summary": "Courier asking for delivery address",
                "conversationLength": 4
            },
            "conversation": [
                {"user": "Hi, I have a parcel", "bot": "Who is it addressed to?"},
                {"user": "Asha", "bot": "I will let her know"}
            ]
        },
        "9123456780_1700000500": {
            "summary": {
                "timestamp": 1709370000000,
                "summary": "Bank verification call"
            },
            "conversation": []
        },
        "9000000000_x": {
            "conversation": [{"user": "hello", "bot": "hi"}]
        }
    }"#;

    #[test]
    fn parses_backend_payload() {
        let history: ConversationHistory = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(history.len(), 3);

        let courier = history.get("9876543210_1700000000").unwrap();
        assert_eq!(courier.caller_number(), "9876543210");
        assert_eq!(courier.message_count(), 4);
        assert_eq!(courier.conversation.len(), 2);
        assert_eq!(courier.conversation[1].bot, "I will let her know");
    }

    #[test]
    fn newest_first_and_undated_last() {
        let history: ConversationHistory = serde_json::from_str(SAMPLE).unwrap();
        let keys: Vec<&str> = history.records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "9123456780_1700000500",
                "9876543210_1700000000",
                "9000000000_x"
            ]
        );
    }

    #[test]
    fn caller_falls_back_to_key_prefix() {
        let history: ConversationHistory = serde_json::from_str(SAMPLE).unwrap();
        let bank = history.get("9123456780_1700000500").unwrap();
        assert_eq!(bank.caller_number(), "9123456780");
    }

    #[test]
    fn message_count_falls_back_to_transcript() {
        let history: ConversationHistory = serde_json::from_str(SAMPLE).unwrap();
        let undated = history.get("9000000000_x").unwrap();
        assert_eq!(undated.message_count(), 1);
        assert!(undated.has_transcript());
        assert_eq!(undated.summary, ConversationSummary::default());
    }

    #[test]
    fn epoch_millis_timestamp() {
        let history: ConversationHistory = serde_json::from_str(SAMPLE).unwrap();
        let bank = history.get("9123456780_1700000500").unwrap();
        let ts = bank.summary.timestamp.unwrap();
        assert_eq!(ts.timestamp_millis(), 1_709_370_000_000);
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        let summary: ConversationSummary =
            serde_json::from_str(r#"{"timestamp": "yesterday"}"#).unwrap();
        assert!(summary.timestamp.is_none());

        let summary: ConversationSummary =
            serde_json::from_str(r#"{"timestamp": null}"#).unwrap();
        assert!(summary.timestamp.is_none());
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let summary: ConversationSummary =
            serde_json::from_str(r#"{"timestamp": "2024-03-01 10:15:00"}"#).unwrap();
        assert_eq!(
            summary.timestamp.unwrap().to_rfc3339(),
            "2024-03-01T10:15:00+00:00"
        );
    }

    #[test]
    fn empty_object_is_empty_history() {
        let history: ConversationHistory = serde_json::from_str("{}").unwrap();
        assert!(history.is_empty());
    }
}
