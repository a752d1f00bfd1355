//! Shared types for the classification pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Keys written onto an item by enrichment. Incoming values are replaced.
pub const ENRICHMENT_KEYS: [&str; 4] = [
    "category_type",
    "category_type_score",
    "category_type_model_result",
    "notification",
];

// ── Inbound event ───────────────────────────────────────────────────

/// A batch as delivered by the queue transport.
///
/// Shaped like an SQS event: `{"Records": [{"messageId": ..., "body": ...}]}`.
/// Any other record attributes are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<InboundMessage>,
}

/// One queue record. Read by the pipeline, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    /// Transport-assigned identifier, echoed back in the batch response.
    #[serde(rename = "messageId")]
    pub id: String,
    /// Serialized item payload. `None` or empty means there is nothing to do.
    #[serde(default)]
    pub body: Option<String>,
}

impl InboundMessage {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: Some(body.into()),
        }
    }
}

// ── Item ────────────────────────────────────────────────────────────

/// A decoded message body: a JSON object holding at least a string `text`.
///
/// The object is kept whole, so every producer field passes through in its
/// original position.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Item {
    fields: Map<String, Value>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Decode a message body.
    ///
    /// Raw control characters inside strings (literal newlines or tabs in
    /// the text) are accepted. The body must be a JSON object with a
    /// string `text` field.
    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(strict_err) => {
                let escaped = escape_control_chars(body);
                if escaped == body {
                    return Err(strict_err.into());
                }
                serde_json::from_str(&escaped).map_err(|_| strict_err)?
            }
        };

        let Value::Object(fields) = value else {
            return Err(DecodeError::NotAnObject);
        };
        if !fields.get("text").is_some_and(Value::is_string) {
            return Err(DecodeError::MissingText);
        }
        Ok(Self { fields })
    }

    pub fn text(&self) -> &str {
        self.fields
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Every field of the item, `text` included, in producer order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Escape raw control characters that appear inside JSON string literals.
fn escape_control_chars(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in body.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if (c as u32) < 0x20 {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    other => out.push_str(&format!("\\u{:04x}", other as u32)),
                }
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

// ── Enriched item ───────────────────────────────────────────────────

/// An item after classification. Serializes to the original item's
/// fields plus the four enrichment keys.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: Item,
    /// Assigned label, or the fallback label below threshold.
    pub category_type: String,
    /// Winning confidence; 0 below threshold.
    pub category_type_score: f64,
    /// JSON object label → raw score, always the full distribution.
    pub category_type_model_result: String,
    pub notification: bool,
}

impl EnrichedItem {
    /// Build the enriched record. Stale enrichment keys on `item` are dropped.
    pub fn new(
        mut item: Item,
        category_type: String,
        category_type_score: f64,
        category_type_model_result: String,
        notification: bool,
    ) -> Self {
        for key in ENRICHMENT_KEYS {
            item.fields.shift_remove(key);
        }
        Self {
            item,
            category_type,
            category_type_score,
            category_type_model_result,
            notification,
        }
    }

    pub fn text(&self) -> &str {
        self.item.text()
    }

    /// Serialized record, as handed to the notification channel.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
