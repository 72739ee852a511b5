use std::collections::BTreeMap;

use chrono::{
    DateTime,
    NaiveDate,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

pub const COIN_SYMBOL_KEY: &str = "coin_symbol";
pub const TRADE_RESULT_KEY: &str = "trade_result";

/// One stored field value. Entries are free-form maps, so the value side
/// mirrors the heterogeneous JSON the journal files have always held:
/// strings, numbers, ISO dates, and checkbox booleans side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Plain-text rendering for tables and CSV cells.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Flag(flag) => flag.to_string(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            FieldValue::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Flag(flag)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(date: NaiveDate) -> Self {
        FieldValue::Date(date)
    }
}

/// One logged record. The id is the stable handle for edits and deletes;
/// duplicate coin symbols are expected, so structural equality is never
/// used to target an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub values: BTreeMap<String, FieldValue>,
}

impl Entry {
    pub fn new(values: BTreeMap<String, FieldValue>) -> Self {
        Self { id: Uuid::new_v4(), logged_at: Utc::now(), values }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: FieldValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn coin_symbol(&self) -> Option<&str> {
        self.values.get(COIN_SYMBOL_KEY).and_then(FieldValue::as_text)
    }

    pub fn trade_result(&self) -> Option<&str> {
        self.values.get(TRADE_RESULT_KEY).and_then(FieldValue::as_text)
    }
}
