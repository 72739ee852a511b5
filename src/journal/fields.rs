use std::collections::BTreeMap;

use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    FieldValue,
    JournalError,
};

/// Custom field keys carry this prefix so a user-supplied label can never
/// collide with a built-in key.
pub const CUSTOM_KEY_PREFIX: &str = "custom_";

/// Widget kind plus its kind-specific constraints, tagged with the same
/// `type` strings the journal files have always used on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldKind {
    #[serde(rename = "text_input")]
    Text {
        #[serde(default)]
        placeholder: String,
    },
    #[serde(rename = "text_area")]
    TextArea {
        #[serde(default)]
        placeholder: String,
    },
    #[serde(rename = "number_input")]
    Number {
        #[serde(default)]
        placeholder: String,
    },
    #[serde(rename = "date_input")]
    Date,
    #[serde(rename = "selectbox")]
    Select { options: Vec<String> },
    #[serde(rename = "slider")]
    Slider {
        #[serde(rename = "min_value")]
        min: i64,
        #[serde(rename = "max_value")]
        max: i64,
        #[serde(rename = "value")]
        default: i64,
    },
    #[serde(rename = "checkbox")]
    Checkbox,
}

impl FieldKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "Text Input",
            FieldKind::TextArea { .. } => "Text Area",
            FieldKind::Number { .. } => "Number Input",
            FieldKind::Date => "Date Input",
            FieldKind::Select { .. } => "Dropdown (Select Box)",
            FieldKind::Slider { .. } => "Slider",
            FieldKind::Checkbox => "Checkbox",
        }
    }

    /// The value a freshly rendered widget of this kind would submit when
    /// left untouched. `None` means the field is simply absent (empty
    /// number inputs don't produce a value).
    pub fn default_value(&self) -> Option<FieldValue> {
        match self {
            FieldKind::Text { .. } | FieldKind::TextArea { .. } => {
                Some(FieldValue::Text(String::new()))
            }
            FieldKind::Number { .. } => None,
            FieldKind::Date => Some(FieldValue::Date(Utc::now().date_naive())),
            FieldKind::Select { options } => {
                options.first().map(|option| FieldValue::Text(option.clone()))
            }
            FieldKind::Slider { default, .. } => Some(FieldValue::Integer(*default)),
            FieldKind::Checkbox => Some(FieldValue::Flag(false)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    #[serde(default)]
    pub help: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(label: &str, help: &str, kind: FieldKind) -> Self {
        Self { label: label.to_string(), help: help.to_string(), kind }
    }
}

/// Derives the storage key for a custom field from its label: trimmed,
/// lower-cased, spaces replaced with underscores, prefixed.
pub fn derive_field_key(label: &str) -> String {
    format!("{}{}", CUSTOM_KEY_PREFIX, label.trim().to_lowercase().replace(' ', "_"))
}

fn builtin(key: &str, label: &str, help: &str, kind: FieldKind) -> (String, FieldDescriptor) {
    (key.to_string(), FieldDescriptor::new(label, help, kind))
}

/// The built-in descriptors, fixed at process start.
pub fn builtin_fields() -> Vec<(String, FieldDescriptor)> {
    vec![
        builtin(
            "coin_symbol",
            "Coin Symbol/Name",
            "Enter the cryptocurrency symbol or name (e.g., BTC, Ethereum)",
            FieldKind::Text { placeholder: "BTC".to_string() },
        ),
        builtin(
            "coin_link",
            "Coin Link (Optional)",
            "Enter a link to the coin (e.g., CoinGecko, CoinMarketCap URL)",
            FieldKind::Text { placeholder: "https://coingecko.com/en/coins/bitcoin".to_string() },
        ),
        builtin("date_logged", "Date Logged", "Date when this entry was logged", FieldKind::Date),
        builtin(
            "market_cap",
            "Market Cap",
            "Market capitalization in USD",
            FieldKind::Number { placeholder: "0".to_string() },
        ),
        builtin(
            "trading_volume",
            "Trading Volume",
            "Trading volume in USD",
            FieldKind::Number { placeholder: "0".to_string() },
        ),
        builtin(
            "trading_volume_timeframe",
            "Volume Timeframe",
            "Select the timeframe for trading volume",
            FieldKind::Select {
                options: vec!["5m".to_string(), "1h".to_string(), "24h".to_string()],
            },
        ),
        builtin(
            "established_status",
            "Established Status",
            "How established is this cryptocurrency in the market",
            FieldKind::Select {
                options: vec!["New".to_string(), "Emerging".to_string(), "Established".to_string()],
            },
        ),
        builtin(
            "fib_levels",
            "Fib Levels",
            "Fibonacci retracement levels (e.g., 0.618 retracement)",
            FieldKind::Text { placeholder: "0.618 retracement".to_string() },
        ),
        builtin(
            "conviction_level",
            "Conviction Level",
            "Your conviction level for this investment (1-10)",
            FieldKind::Slider { min: 1, max: 10, default: 5 },
        ),
        builtin(
            "risk_factors",
            "Risk Factors",
            "Potential risks and concerns",
            FieldKind::TextArea {
                placeholder: "Regulatory uncertainty, competition, market volatility...".to_string(),
            },
        ),
        builtin(
            "sentiment_community",
            "Sentiment/Community",
            "Community sentiment and social media buzz",
            FieldKind::Text {
                placeholder: "Bullish on Twitter, active Discord community".to_string(),
            },
        ),
        builtin(
            "entry_strategy",
            "Entry Strategy",
            "Your planned entry strategy and timing",
            FieldKind::TextArea {
                placeholder: "DCA over 3 months, buy on dips below $45k...".to_string(),
            },
        ),
        builtin(
            "target_exit_strategy",
            "Target/Exit Strategy",
            "Price targets and exit strategy",
            FieldKind::TextArea {
                placeholder: "Take profit at $60k, stop loss at $35k...".to_string(),
            },
        ),
        builtin(
            "notes_updates",
            "Notes/Updates",
            "Additional notes and updates",
            FieldKind::TextArea {
                placeholder: "Any additional thoughts or observations...".to_string(),
            },
        ),
        builtin(
            "trade_result",
            "Trade Result",
            "Was this a winning or losing trade?",
            FieldKind::Select {
                options: vec!["Pending".to_string(), "Win".to_string(), "Loss".to_string()],
            },
        ),
    ]
}

pub fn builtin_keys() -> Vec<String> {
    builtin_fields().into_iter().map(|(key, _)| key).collect()
}

/// Built-in descriptors plus the user-declared custom ones. Built-ins are
/// fixed for the process lifetime; custom fields come and go.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    builtin: Vec<(String, FieldDescriptor)>,
    custom: BTreeMap<String, FieldDescriptor>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self { builtin: builtin_fields(), custom: BTreeMap::new() }
    }

    pub fn with_custom(custom: BTreeMap<String, FieldDescriptor>) -> Self {
        Self { builtin: builtin_fields(), custom }
    }

    /// Registers a custom field, deriving its key from the label. A label
    /// whose derived key is already taken is an explicit error, never an
    /// overwrite.
    pub fn register(
        &mut self,
        label: &str,
        kind: FieldKind,
        help: &str,
    ) -> Result<String, JournalError> {
        if label.trim().is_empty() {
            return Err(JournalError::Custom("Field name is required".to_string()));
        }

        let key = derive_field_key(label);
        if self.custom.contains_key(&key) {
            return Err(JournalError::DuplicateFieldKey(key));
        }

        let help = if help.trim().is_empty() {
            format!("Custom field: {}", label.trim())
        } else {
            help.to_string()
        };

        self.custom.insert(key.clone(), FieldDescriptor::new(label.trim(), &help, kind));
        Ok(key)
    }

    /// Removes a custom field descriptor. Stored entries that reference the
    /// key keep their values; orphaned values are documented behavior.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.custom.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.builtin
            .iter()
            .find(|(builtin_key, _)| builtin_key == key)
            .map(|(_, descriptor)| descriptor)
            .or_else(|| self.custom.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_builtin(&self, key: &str) -> bool {
        self.builtin.iter().any(|(builtin_key, _)| builtin_key == key)
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.builtin
            .iter()
            .map(|(key, _)| key.clone())
            .chain(self.custom.keys().cloned())
            .collect()
    }

    pub fn builtin(&self) -> &[(String, FieldDescriptor)] {
        &self.builtin
    }

    pub fn custom(&self) -> &BTreeMap<String, FieldDescriptor> {
        &self.custom
    }

    pub fn clear_custom(&mut self) {
        self.custom.clear();
    }
}
