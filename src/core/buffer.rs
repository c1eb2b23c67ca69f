use crate::utils::error::{GeoShopError, Result};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

pub const SAVED_AT_KEY: &str = "savedAt";
const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One flattened, spreadsheet-shaped row. Immutable once buffered.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    fields: Map<String, Value>,
    saved_at: DateTime<Utc>,
}

impl BufferRecord {
    fn stamp(mut fields: Map<String, Value>, saved_at: DateTime<Utc>) -> Self {
        fields.remove(SAVED_AT_KEY);
        Self { fields, saved_at }
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    pub fn saved_at_display(&self) -> String {
        self.saved_at.format(SAVED_AT_FORMAT).to_string()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Field lookup; `savedAt` resolves to the buffer's own stamp.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == SAVED_AT_KEY {
            return Some(Value::String(self.saved_at_display()));
        }
        self.fields.get(key).cloned()
    }

    /// First present, non-null value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<Value> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_null())
    }

    fn summary(&self) -> RecordSummary {
        RecordSummary {
            geolocation: self.first_of(&["geolocation", "marketCode"]),
            product_title: self.first_of(&["productTitle", "title"]),
            seller_name: self.first_of(&["sellerName", "source"]),
            total_price: self.first_of(&["totalPrice", "price"]),
            saved_at: self.saved_at_display(),
        }
    }
}

impl Serialize for BufferRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(SAVED_AT_KEY, &self.saved_at.to_rfc3339())?;
        map.end()
    }
}

/// Reduced projection used by status queries.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub geolocation: Option<Value>,
    pub product_title: Option<Value>,
    pub seller_name: Option<Value>,
    pub total_price: Option<Value>,
    pub saved_at: String,
}

/// Process-lifetime, append-only buffer of rows awaiting export.
///
/// Appends and clears take the write lock, so a reader never sees half of a bulk append.
#[derive(Debug, Default)]
pub struct ResultBuffer {
    records: RwLock<Vec<BufferRecord>>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record and returns the new total.
    pub async fn append(&self, record: Value) -> Result<usize> {
        self.append_many(vec![record]).await
    }

    /// Appends all records in order, or none if any of them is not a JSON object.
    pub async fn append_many(&self, records: Vec<Value>) -> Result<usize> {
        let fields = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| match record {
                Value::Object(map) => Ok(map),
                other => Err(GeoShopError::validation(format!(
                    "Record {} must be a JSON object, got {}",
                    index,
                    json_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let saved_at = Utc::now();
        let added = fields.len();

        let mut guard = self.records.write().await;
        guard.extend(fields.into_iter().map(|f| BufferRecord::stamp(f, saved_at)));
        let total = guard.len();
        drop(guard);

        tracing::info!("💾 Buffered {} record(s), total {}", added, total);
        Ok(total)
    }

    pub async fn snapshot(&self) -> Vec<BufferRecord> {
        self.records.read().await.clone()
    }

    pub async fn summary(&self) -> Vec<RecordSummary> {
        self.records
            .read()
            .await
            .iter()
            .map(BufferRecord::summary)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Discards everything and returns how many records were dropped.
    pub async fn clear(&self) -> usize {
        let cleared = std::mem::take(&mut *self.records.write().await).len();
        tracing::info!("🗑️ Cleared {} buffered record(s)", cleared);
        cleared
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
