use serde::{
    Deserialize,
    Serialize,
};

/// Persisted look-and-feel settings. The background image is carried as an
/// already-encoded base64 payload; producing it is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub dark_mode: bool,
    #[serde(default)]
    pub background_image: Option<String>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            accent_color: "#f7931a".to_string(),
            background_color: "#0e1117".to_string(),
            text_color: "#fafafa".to_string(),
            dark_mode: true,
            background_image: None,
        }
    }
}
