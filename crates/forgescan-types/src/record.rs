//! On-disk record schema.
//!
//! One line of a session log deserializes into one [`RawRecord`]. The schema is
//! deliberately lenient: unknown record types, odd field shapes and missing
//! fields degrade to "absent" instead of rejecting the whole line. Only a line
//! that is not a JSON object at all fails to parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Error, Result};

/// Discriminant of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Assistant,
    /// Summaries, queue operations, snapshots and anything else
    #[default]
    Other,
}

impl RecordKind {
    fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("user") => RecordKind::User,
            Some("assistant") => RecordKind::Assistant,
            _ => RecordKind::Other,
        }
    }
}

/// One parsed log entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: RecordKind,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<MessageEnvelope>,
}

impl RawRecord {
    /// Parse a single JSONL line. Non-object lines are rejected.
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(line)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("record is not a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn content(&self) -> Option<&MessageContent> {
        self.message.as_ref().map(|m| &m.content)
    }
}

/// The `message` object of a record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub content: MessageContent,
}

/// `message.content`: a plain string or a list of typed blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(#[serde(deserialize_with = "deserialize_blocks")] Vec<ContentBlock>),
    /// Any other shape; contributes nothing
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Other(Value::Null)
    }
}

/// A typed entry of a block list
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: Option<ToolResultContent>,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Unknown,
}

/// Content of a `tool_result` block: a string or a nested block list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(#[serde(deserialize_with = "deserialize_blocks")] Vec<ContentBlock>),
    Other(Value),
}

impl ToolResultContent {
    /// Text carried by the result. Nested lists contribute their `text` blocks
    /// only; deeper nesting is ignored.
    pub fn text_parts(&self) -> Vec<&str> {
        match self {
            ToolResultContent::Text(text) => vec![text.as_str()],
            ToolResultContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            ToolResultContent::Other(_) => Vec::new(),
        }
    }
}

/// A record timestamp as written: ISO-8601 text or epoch milliseconds
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    Text(String),
    EpochMillis(f64),
}

impl RawTimestamp {
    /// Interpret the timestamp as a UTC instant.
    ///
    /// Text accepts RFC 3339 (with `Z` or an offset), a naive
    /// `YYYY-MM-DDTHH:MM:SS[.f]` assumed to be UTC, or a bare calendar date.
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        match self {
            RawTimestamp::Text(text) => parse_text_timestamp(text),
            RawTimestamp::EpochMillis(ms) => {
                if !ms.is_finite() {
                    return Err(Error::InvalidTimestamp(ms.to_string()));
                }
                DateTime::from_timestamp_millis(*ms as i64)
                    .ok_or_else(|| Error::InvalidTimestamp(ms.to_string()))
            }
        }
    }
}

fn parse_text_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }
    Err(Error::InvalidTimestamp(text.to_string()))
}

impl Serialize for RawTimestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RawTimestamp::Text(text) => serializer.serialize_str(text),
            RawTimestamp::EpochMillis(ms) if ms.fract() == 0.0 && ms.abs() < 9.0e15 => {
                serializer.serialize_i64(*ms as i64)
            }
            RawTimestamp::EpochMillis(ms) => serializer.serialize_f64(*ms),
        }
    }
}

fn deserialize_kind<'de, D>(deserializer: D) -> std::result::Result<RecordKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(RecordKind::from_value(&value))
}

// Empty strings and zero are treated as "no timestamp", as are non-scalar values.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<RawTimestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(RawTimestamp::Text(s)),
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| *ms != 0.0)
            .map(RawTimestamp::EpochMillis),
        _ => None,
    })
}

fn deserialize_blocks<'de, D>(deserializer: D) -> std::result::Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or(ContentBlock::Unknown))
        .collect())
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
