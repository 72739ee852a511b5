use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use super::fields::{
    builtin_keys,
    FieldRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSection {
    BuiltIn,
    Custom,
}

/// User-controlled display order, one sequence per section. Reordering is
/// adjacent-swap only, matching the up/down controls of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOrder {
    pub built_in: Vec<String>,
    pub custom: Vec<String>,
}

impl Default for FieldOrder {
    fn default() -> Self {
        Self { built_in: builtin_keys(), custom: Vec::new() }
    }
}

impl FieldOrder {
    pub fn section(&self, section: FieldSection) -> &[String] {
        match section {
            FieldSection::BuiltIn => &self.built_in,
            FieldSection::Custom => &self.custom,
        }
    }

    fn section_mut(&mut self, section: FieldSection) -> &mut Vec<String> {
        match section {
            FieldSection::BuiltIn => &mut self.built_in,
            FieldSection::Custom => &mut self.custom,
        }
    }

    /// Swaps the key with its predecessor. Returns false when the key is
    /// absent or already first.
    pub fn move_up(&mut self, key: &str, section: FieldSection) -> bool {
        let list = self.section_mut(section);
        match list.iter().position(|entry| entry == key) {
            Some(index) if index > 0 => {
                list.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swaps the key with its successor. Returns false when the key is
    /// absent or already last.
    pub fn move_down(&mut self, key: &str, section: FieldSection) -> bool {
        let list = self.section_mut(section);
        match list.iter().position(|entry| entry == key) {
            Some(index) if index + 1 < list.len() => {
                list.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn push_custom(&mut self, key: &str) {
        if !self.custom.iter().any(|entry| entry == key) {
            self.custom.push(key.to_string());
        }
    }

    /// Drops the key from both sections.
    pub fn remove(&mut self, key: &str) {
        self.built_in.retain(|entry| entry != key);
        self.custom.retain(|entry| entry != key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.built_in.iter().chain(self.custom.iter()).any(|entry| entry == key)
    }

    /// All keys in display order, built-in section first.
    pub fn display_order(&self) -> impl Iterator<Item = &str> {
        self.built_in.iter().chain(self.custom.iter()).map(String::as_str)
    }

    /// Brings a loaded order back in sync with the registry: keys the
    /// registry no longer knows are dropped, known keys missing from the
    /// order are appended to their section. Older data files could drift
    /// here because the two were saved independently.
    pub fn reconcile(&mut self, registry: &FieldRegistry) {
        self.built_in.retain(|key| registry.is_builtin(key));
        self.custom.retain(|key| registry.custom().contains_key(key));

        for (key, _) in registry.builtin() {
            if !self.built_in.iter().any(|entry| entry == key) {
                self.built_in.push(key.clone());
            }
        }
        for key in registry.custom().keys() {
            if !self.custom.iter().any(|entry| entry == key) {
                self.custom.push(key.clone());
            }
        }
    }
}

/// Per-field enabled state. Unknown keys default to visible, so newly
/// registered fields show up without an explicit toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Visibility {
    toggles: BTreeMap<String, bool>,
}

impl Visibility {
    pub fn is_visible(&self, key: &str) -> bool {
        self.toggles.get(key).copied().unwrap_or(true)
    }

    pub fn set(&mut self, key: &str, visible: bool) {
        self.toggles.insert(key.to_string(), visible);
    }

    /// Flips the toggle and returns the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        let next = !self.is_visible(key);
        self.set(key, next);
        next
    }

    pub fn remove(&mut self, key: &str) {
        self.toggles.remove(key);
    }

    pub fn retain_known(&mut self, registry: &FieldRegistry) {
        self.toggles.retain(|key, _| registry.contains(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_up_then_down_restores_the_order() {
        let mut order = FieldOrder::default();
        let original = order.built_in.clone();

        assert!(order.move_up("market_cap", FieldSection::BuiltIn));
        assert_ne!(order.built_in, original);
        assert!(order.move_down("market_cap", FieldSection::BuiltIn));
        assert_eq!(order.built_in, original);

        assert!(order.move_down("market_cap", FieldSection::BuiltIn));
        assert!(order.move_up("market_cap", FieldSection::BuiltIn));
        assert_eq!(order.built_in, original);
    }

    #[test]
    fn edges_and_unknown_keys_are_no_ops() {
        let mut order = FieldOrder::default();
        let original = order.built_in.clone();

        assert!(!order.move_up("coin_symbol", FieldSection::BuiltIn));
        assert!(!order.move_down("trade_result", FieldSection::BuiltIn));
        assert!(!order.move_up("custom_missing", FieldSection::Custom));
        assert_eq!(order.built_in, original);
    }

    #[test]
    fn custom_keys_append_once_and_remove_cleanly() {
        let mut order = FieldOrder::default();
        order.push_custom("custom_risk_level");
        order.push_custom("custom_team_size");
        order.push_custom("custom_risk_level");

        assert_eq!(order.custom, vec!["custom_risk_level", "custom_team_size"]);

        order.remove("custom_risk_level");
        assert_eq!(order.custom, vec!["custom_team_size"]);
        assert!(order.contains("custom_team_size"));
        assert!(!order.contains("custom_risk_level"));
    }

    #[test]
    fn reconcile_repairs_drifted_order() {
        let mut registry = FieldRegistry::new();
        let key = registry
            .register("Risk Level", crate::journal::FieldKind::Checkbox, "")
            .unwrap();

        let mut order = FieldOrder {
            built_in: vec!["market_cap".to_string(), "coin_symbol".to_string()],
            custom: vec!["custom_deleted_long_ago".to_string()],
        };
        order.reconcile(&registry);

        // Surviving keys keep their position, missing built-ins are appended,
        // unknown customs are dropped, the registered custom is added.
        assert_eq!(order.built_in[0], "market_cap");
        assert_eq!(order.built_in[1], "coin_symbol");
        assert_eq!(order.built_in.len(), 15);
        assert_eq!(order.custom, vec![key]);
    }

    #[test]
    fn visibility_defaults_to_true_and_toggles() {
        let mut visibility = Visibility::default();
        assert!(visibility.is_visible("coin_symbol"));

        assert!(!visibility.toggle("coin_symbol"));
        assert!(!visibility.is_visible("coin_symbol"));
        assert!(visibility.toggle("coin_symbol"));
        assert!(visibility.is_visible("coin_symbol"));

        visibility.set("market_cap", false);
        visibility.remove("market_cap");
        assert!(visibility.is_visible("market_cap"));
    }
}
