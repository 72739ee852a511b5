use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    core::{
        Entry,
        FieldValue,
        JournalError,
    },
    export,
    journal::{
        EntryStore,
        FieldDescriptor,
        FieldKind,
        FieldOrder,
        FieldRegistry,
        FieldSection,
        JournalStats,
        Visibility,
    },
    persistence::{
        JournalData,
        JournalStore,
    },
    theme::ThemeSettings,
};

/// The whole application state, threaded explicitly through every
/// operation. Each mutation persists before returning, so the on-disk
/// document always reflects the last completed action.
#[derive(Debug)]
pub struct Journal {
    entries: EntryStore,
    registry: FieldRegistry,
    order: FieldOrder,
    visibility: Visibility,
    theme: ThemeSettings,
    store: JournalStore,
}

impl Journal {
    /// Loads state from the store's data directory, tolerating missing or
    /// corrupt files, and reconciles the field order with the registry.
    pub fn load(store: JournalStore) -> Self {
        let data = store.load();
        let registry = FieldRegistry::with_custom(data.custom_fields);

        let mut order = data.field_order;
        order.reconcile(&registry);

        let mut visibility = data.visibility;
        visibility.retain_known(&registry);

        Self { entries: data.entries, registry, order, visibility, theme: data.theme, store }
    }

    fn snapshot(&self) -> JournalData {
        JournalData {
            entries: self.entries.clone(),
            custom_fields: self.registry.custom().clone(),
            field_order: self.order.clone(),
            visibility: self.visibility.clone(),
            theme: self.theme.clone(),
        }
    }

    fn persist(&self) -> Result<(), JournalError> {
        self.store.save(&self.snapshot())
    }

    // --- entries ---

    /// Validates and stores one submitted record.
    pub fn submit(&mut self, values: BTreeMap<String, FieldValue>) -> Result<Uuid, JournalError> {
        let id = self.entries.append(values)?;
        self.persist()?;
        Ok(id)
    }

    /// Edits one field of a stored entry in place. The key must be known to
    /// the registry or already present on the entry (orphaned values stay
    /// editable).
    pub fn update_entry_field(
        &mut self,
        id: Uuid,
        key: &str,
        value: FieldValue,
    ) -> Result<(), JournalError> {
        let known = self.registry.contains(key)
            || self.entries.get(id).is_some_and(|entry| entry.values.contains_key(key));
        if !known {
            return Err(JournalError::UnknownField(key.to_string()));
        }

        self.entries.update_field(id, key, value)?;
        self.persist()
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<Entry, JournalError> {
        let removed = self.entries.delete(id)?;
        self.persist()?;
        Ok(removed)
    }

    pub fn clear_entries(&mut self) -> Result<(), JournalError> {
        self.entries.clear();
        self.persist()
    }

    /// Adds kind-appropriate defaults to stored entries for any known field
    /// they are missing. Explicit only; nothing runs this automatically.
    pub fn backfill_entries(&mut self) -> Result<usize, JournalError> {
        let mut defaults = BTreeMap::new();
        for key in self.registry.all_keys() {
            if let Some(descriptor) = self.registry.get(&key) {
                if let Some(default) = descriptor.kind.default_value() {
                    defaults.insert(key, default);
                }
            }
        }

        let inserted = self.entries.backfill(&defaults);
        if inserted > 0 {
            self.persist()?;
            println!("Backfilled {} values across stored entries", inserted);
        }
        Ok(inserted)
    }

    // --- custom fields ---

    /// Registers a custom field and wires it into order and visibility.
    pub fn add_custom_field(
        &mut self,
        label: &str,
        kind: FieldKind,
        help: &str,
    ) -> Result<String, JournalError> {
        let key = self.registry.register(label, kind, help)?;
        self.order.push_custom(&key);
        self.visibility.set(&key, true);
        self.persist()?;
        Ok(key)
    }

    /// Removes a custom field from the registry, the order, and the
    /// visibility map together. Stored entries keep any orphaned values.
    pub fn delete_custom_field(&mut self, key: &str) -> Result<bool, JournalError> {
        if !self.registry.unregister(key) {
            return Ok(false);
        }
        self.order.remove(key);
        self.visibility.remove(key);
        self.persist()?;
        Ok(true)
    }

    pub fn clear_custom_fields(&mut self) -> Result<(), JournalError> {
        for key in self.order.custom.clone() {
            self.visibility.remove(&key);
        }
        self.registry.clear_custom();
        self.order.custom.clear();
        self.persist()
    }

    // --- order & visibility ---

    pub fn move_field_up(
        &mut self,
        key: &str,
        section: FieldSection,
    ) -> Result<bool, JournalError> {
        let moved = self.order.move_up(key, section);
        if moved {
            self.persist()?;
        }
        Ok(moved)
    }

    pub fn move_field_down(
        &mut self,
        key: &str,
        section: FieldSection,
    ) -> Result<bool, JournalError> {
        let moved = self.order.move_down(key, section);
        if moved {
            self.persist()?;
        }
        Ok(moved)
    }

    /// Toggles a field on or off for future submissions and returns the new
    /// state. Stored entries are never touched.
    pub fn toggle_field(&mut self, key: &str) -> Result<bool, JournalError> {
        if !self.registry.contains(key) {
            return Err(JournalError::UnknownField(key.to_string()));
        }
        let visible = self.visibility.toggle(key);
        self.persist()?;
        Ok(visible)
    }

    // --- theme ---

    pub fn set_theme(&mut self, theme: ThemeSettings) -> Result<(), JournalError> {
        self.theme = theme;
        self.persist()
    }

    pub fn theme(&self) -> &ThemeSettings {
        &self.theme
    }

    // --- wipe everything ---

    pub fn clear_all(&mut self) -> Result<(), JournalError> {
        self.entries = EntryStore::new();
        self.registry = FieldRegistry::new();
        self.order = FieldOrder::default();
        self.visibility = Visibility::default();
        self.theme = ThemeSettings::default();
        self.store.clear_all_data()
    }

    // --- views ---

    /// The visible fields in display order, ready for a form renderer.
    pub fn form_fields(&self) -> Vec<(String, &FieldDescriptor)> {
        self.order
            .display_order()
            .filter(|key| self.visibility.is_visible(key))
            .filter_map(|key| self.registry.get(key).map(|descriptor| (key.to_string(), descriptor)))
            .collect()
    }

    /// The record a freshly rendered form would submit: widget defaults for
    /// every visible field that has one.
    pub fn blank_record(&self) -> BTreeMap<String, FieldValue> {
        self.form_fields()
            .into_iter()
            .filter_map(|(key, descriptor)| {
                descriptor.kind.default_value().map(|value| (key, value))
            })
            .collect()
    }

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn order(&self) -> &FieldOrder {
        &self.order
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn stats(&self) -> JournalStats {
        self.entries.stats()
    }

    // --- export ---

    pub fn export_json(&self) -> Result<String, JournalError> {
        export::entries_to_json(self.entries.list())
    }

    pub fn export_csv(&self) -> String {
        export::entries_to_csv(self.entries.list(), &self.order)
    }
}
