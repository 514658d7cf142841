// src/forecast/definitions/forecast_row.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MATERIAL_FIELD: &str = "Material";
pub const BRANCH_FIELD: &str = "Branch";

/// Composite identity of a row inside one fetch result: `"{Material}_{Branch}"`.
pub type RowKey = String;

/// One record as returned by the backend. Field order is kept as sent so the
/// column set can be derived from the first row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastRow(Map<String, Value>);

impl ForecastRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accepts only JSON objects; anything else is not a row.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw value rendered as text. Missing and null fields are empty.
    pub fn text(&self, key: &str) -> String {
        self.0.get(key).map(value_to_text).unwrap_or_default()
    }

    pub fn material(&self) -> String {
        self.text(MATERIAL_FIELD)
    }

    pub fn branch(&self) -> String {
        self.text(BRANCH_FIELD)
    }

    pub fn key(&self) -> RowKey {
        row_key(self)
    }
}

pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn row_key(row: &ForecastRow) -> RowKey {
    format!("{}_{}", row.material(), row.branch())
}
