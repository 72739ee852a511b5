use std::collections::{
    BTreeMap,
    HashSet,
};

use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

use crate::core::{
    Entry,
    FieldValue,
    JournalError,
    COIN_SYMBOL_KEY,
};

/// The ordered entry store. Entries keep insertion order; edits and deletes
/// target the entry id, never a position or structural equality, so
/// duplicate records stay safe to work with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a record, stamping its id and creation time.
    /// A missing or blank coin symbol rejects the submission and leaves the
    /// store untouched.
    pub fn append(&mut self, values: BTreeMap<String, FieldValue>) -> Result<Uuid, JournalError> {
        let symbol = values
            .get(COIN_SYMBOL_KEY)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .unwrap_or_default();
        if symbol.is_empty() {
            return Err(JournalError::MissingCoinSymbol);
        }

        let entry = Entry::new(values);
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    pub fn update_field(
        &mut self,
        id: Uuid,
        key: &str,
        value: FieldValue,
    ) -> Result<(), JournalError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(JournalError::EntryNotFound(id))?;
        entry.set(key, value);
        Ok(())
    }

    /// Removes exactly the entry with the given id and returns it.
    pub fn delete(&mut self, id: Uuid) -> Result<Entry, JournalError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(JournalError::EntryNotFound(id))?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Insertion order.
    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    /// The most recent entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<&Entry> {
        self.entries.iter().rev().take(count).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Inserts kind-appropriate defaults for fields missing from stored
    /// entries. Only runs when asked; visibility changes never touch stored
    /// values. Returns the number of values inserted.
    pub fn backfill(&mut self, defaults: &BTreeMap<String, FieldValue>) -> usize {
        let mut inserted = 0;
        for entry in &mut self.entries {
            for (key, default) in defaults {
                if !entry.values.contains_key(key) {
                    entry.values.insert(key.clone(), default.clone());
                    inserted += 1;
                }
            }
        }
        inserted
    }

    pub fn stats(&self) -> JournalStats {
        let unique_coins = self
            .entries
            .iter()
            .filter_map(Entry::coin_symbol)
            .map(str::trim)
            .collect::<HashSet<_>>()
            .len();

        let mut stats = JournalStats { unique_coins, total_entries: self.entries.len(), ..Default::default() };
        for entry in &self.entries {
            match entry.trade_result() {
                Some("Win") => stats.wins += 1,
                Some("Loss") => stats.losses += 1,
                Some("Pending") => stats.pending += 1,
                _ => {}
            }
        }
        stats
    }
}

impl From<Vec<Entry>> for EntryStore {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

/// The Quick Stats panel numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalStats {
    pub total_entries: usize,
    pub unique_coins: usize,
    pub pending: usize,
    pub wins: usize,
    pub losses: usize,
}

impl JournalStats {
    /// Win percentage over completed trades; 0.0 when none are completed.
    pub fn win_rate(&self) -> f64 {
        let completed = self.wins + self.losses;
        if completed == 0 {
            0.0
        } else {
            self.wins as f64 / completed as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str) -> BTreeMap<String, FieldValue> {
        let mut values = BTreeMap::new();
        values.insert(COIN_SYMBOL_KEY.to_string(), FieldValue::from(symbol));
        values
    }

    fn record_with_result(symbol: &str, result: &str) -> BTreeMap<String, FieldValue> {
        let mut values = record(symbol);
        values.insert("trade_result".to_string(), FieldValue::from(result));
        values
    }

    #[test]
    fn rejects_blank_coin_symbols() {
        let mut store = EntryStore::new();

        assert!(matches!(store.append(record("   ")), Err(JournalError::MissingCoinSymbol)));
        assert!(matches!(store.append(BTreeMap::new()), Err(JournalError::MissingCoinSymbol)));
        assert_eq!(store.len(), 0);

        store.append(record("BTC")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_by_id_removes_exactly_one_and_keeps_order() {
        let mut store = EntryStore::new();

        // Duplicate coin symbols on purpose; ids must disambiguate.
        let first = store.append(record("BTC")).unwrap();
        let second = store.append(record("BTC")).unwrap();
        let third = store.append(record("ETH")).unwrap();

        let removed = store.delete(second).unwrap();
        assert_eq!(removed.id, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, first);
        assert_eq!(store.list()[1].id, third);

        assert!(matches!(store.delete(second), Err(JournalError::EntryNotFound(_))));
    }

    #[test]
    fn update_field_edits_in_place() {
        let mut store = EntryStore::new();
        let id = store.append(record_with_result("SOL", "Pending")).unwrap();

        store.update_field(id, "trade_result", FieldValue::from("Win")).unwrap();
        assert_eq!(store.get(id).unwrap().trade_result(), Some("Win"));

        let missing = Uuid::new_v4();
        assert!(store.update_field(missing, "trade_result", FieldValue::from("Loss")).is_err());
    }

    #[test]
    fn recent_lists_newest_first() {
        let mut store = EntryStore::new();
        store.append(record("BTC")).unwrap();
        store.append(record("ETH")).unwrap();
        store.append(record("SOL")).unwrap();

        let recent: Vec<_> =
            store.recent(2).iter().filter_map(|entry| entry.coin_symbol()).collect();
        assert_eq!(recent, vec!["SOL", "ETH"]);
    }

    #[test]
    fn backfill_only_touches_missing_fields() {
        let mut store = EntryStore::new();
        let id = store.append(record_with_result("BTC", "Win")).unwrap();

        let mut defaults = BTreeMap::new();
        defaults.insert("trade_result".to_string(), FieldValue::from("Pending"));
        defaults.insert("custom_risk_level".to_string(), FieldValue::from("High"));

        assert_eq!(store.backfill(&defaults), 1);
        let entry = store.get(id).unwrap();
        assert_eq!(entry.trade_result(), Some("Win"));
        assert_eq!(entry.get("custom_risk_level"), Some(&FieldValue::from("High")));

        // Second pass finds nothing to do.
        assert_eq!(store.backfill(&defaults), 0);
    }

    #[test]
    fn stats_match_the_quick_stats_panel() {
        let mut store = EntryStore::new();
        store.append(record_with_result("BTC", "Win")).unwrap();
        store.append(record_with_result("BTC", "Loss")).unwrap();
        store.append(record_with_result("ETH", "Win")).unwrap();
        store.append(record_with_result("SOL", "Pending")).unwrap();
        store.append(record("DOGE")).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_entries, 5);
        assert_eq!(stats.unique_coins, 4);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.pending, 1);
        assert!((stats.win_rate() - 200.0 / 3.0).abs() < 1e-9);

        assert_eq!(EntryStore::new().stats().win_rate(), 0.0);
    }
}
