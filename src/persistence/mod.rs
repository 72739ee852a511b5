use std::{
    collections::BTreeMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use chrono::{
    DateTime,
    NaiveDateTime,
    Utc,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use uuid::Uuid;

use crate::{
    core::{
        Entry,
        FieldValue,
        JournalError,
    },
    journal::{
        EntryStore,
        FieldDescriptor,
        FieldOrder,
        Visibility,
    },
    theme::ThemeSettings,
};

const APP_NAME: &str = "coinlog";
const JOURNAL_FILE: &str = "journal.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "journal_backup_";

pub const DEFAULT_MAX_BACKUPS: usize = 10;

// File names of the old per-structure layout, kept readable for migration.
const LEGACY_LOGS_FILE: &str = "crypto_logs.json";
const LEGACY_CUSTOM_FIELDS_FILE: &str = "custom_fields.json";
const LEGACY_FIELD_ORDER_FILE: &str = "field_order.json";
const LEGACY_FIELD_TOGGLES_FILE: &str = "field_toggles.json";
const LEGACY_THEME_FILE: &str = "theme_settings.json";

/// Everything the journal persists, as one document. Saving it is a single
/// atomic write, so the four structures can never land on disk mutually
/// inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalData {
    #[serde(default)]
    pub entries: EntryStore,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, FieldDescriptor>,
    #[serde(default)]
    pub field_order: FieldOrder,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub theme: ThemeSettings,
}

/// Handles the on-disk side: data-dir resolution, tolerant loads, atomic
/// saves, and timestamped backups with bounded retention.
#[derive(Debug, Clone)]
pub struct JournalStore {
    data_dir: PathBuf,
    max_backups: usize,
}

impl JournalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), max_backups: DEFAULT_MAX_BACKUPS }
    }

    /// The per-user data directory, falling back to the working directory
    /// when the platform offers none.
    pub fn default_location() -> Self {
        let data_dir = if let Some(dir) = dirs::data_local_dir() {
            dir.join(APP_NAME)
        } else {
            PathBuf::from(".")
        };
        Self::new(data_dir)
    }

    /// 0 disables backups entirely.
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    /// Loads the journal document. A missing file yields defaults; a corrupt
    /// one warns and yields defaults. Never fatal.
    pub fn load(&self) -> JournalData {
        let path = self.journal_path();
        if !path.exists() {
            if let Some(data) = self.load_legacy() {
                println!("Migrated journal data from legacy files in {}", self.data_dir.display());
                return data;
            }
            return JournalData::default();
        }

        match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<JournalData>(&json) {
                Ok(data) => {
                    println!("Journal loaded from: {}", path.display());
                    data
                }
                Err(e) => {
                    eprintln!("Could not parse {}: {}. Using defaults.", path.display(), e);
                    JournalData::default()
                }
            },
            Err(e) => {
                eprintln!("Could not read {}: {}. Using defaults.", path.display(), e);
                JournalData::default()
            }
        }
    }

    /// Writes the document atomically: backup the previous file, write to a
    /// temp file, then rename over the target.
    pub fn save(&self, data: &JournalData) -> Result<(), JournalError> {
        fs::create_dir_all(&self.data_dir)?;
        self.backup_existing()?;

        let path = self.journal_path();
        let temp_path = self.data_dir.join(format!("{}.tmp", JOURNAL_FILE));
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;
        println!("Journal saved to: {}", path.display());
        Ok(())
    }

    /// Removes the journal document and any legacy files. Backups stay.
    pub fn clear_all_data(&self) -> Result<(), JournalError> {
        let legacy = [
            LEGACY_LOGS_FILE,
            LEGACY_CUSTOM_FIELDS_FILE,
            LEGACY_FIELD_ORDER_FILE,
            LEGACY_FIELD_TOGGLES_FILE,
            LEGACY_THEME_FILE,
        ];
        for name in std::iter::once(JOURNAL_FILE).chain(legacy) {
            let path = self.data_dir.join(name);
            if path.exists() {
                fs::remove_file(&path)?;
                println!("Deleted: {}", path.display());
            }
        }
        Ok(())
    }

    pub fn backup_files(&self) -> Vec<PathBuf> {
        let mut backups = Vec::new();
        if let Ok(dir) = fs::read_dir(self.backup_dir()) {
            for entry in dir.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with(BACKUP_PREFIX) && name.ends_with(".json") {
                    backups.push(entry.path());
                }
            }
        }
        backups.sort();
        backups
    }

    fn backup_existing(&self) -> Result<(), JournalError> {
        if self.max_backups == 0 || !self.journal_path().exists() {
            return Ok(());
        }

        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let mut backup_path = backup_dir.join(format!("{}{}.json", BACKUP_PREFIX, stamp));
        let mut counter = 1;
        while backup_path.exists() {
            backup_path = backup_dir.join(format!("{}{}_{}.json", BACKUP_PREFIX, stamp, counter));
            counter += 1;
        }

        fs::copy(self.journal_path(), &backup_path)?;
        self.prune_backups()?;
        Ok(())
    }

    /// Keeps only the most recent `max_backups` copies. The timestamped
    /// names sort lexicographically, oldest first.
    fn prune_backups(&self) -> Result<(), JournalError> {
        let backups = self.backup_files();
        if backups.len() > self.max_backups {
            for path in &backups[..backups.len() - self.max_backups] {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn load_legacy(&self) -> Option<JournalData> {
        let logs_path = self.data_dir.join(LEGACY_LOGS_FILE);
        let fields_path = self.data_dir.join(LEGACY_CUSTOM_FIELDS_FILE);
        if !logs_path.exists() && !fields_path.exists() {
            return None;
        }

        let raw_entries: Vec<serde_json::Map<String, serde_json::Value>> =
            load_json_or_default(&logs_path);
        let entries: EntryStore =
            raw_entries.into_iter().map(legacy_entry).collect::<Vec<Entry>>().into();

        Some(JournalData {
            entries,
            custom_fields: load_json_or_default(&fields_path),
            field_order: load_json_or_default(&self.data_dir.join(LEGACY_FIELD_ORDER_FILE)),
            visibility: load_json_or_default(&self.data_dir.join(LEGACY_FIELD_TOGGLES_FILE)),
            theme: load_json_or_default(&self.data_dir.join(LEGACY_THEME_FILE)),
        })
    }
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path).map_err(JournalError::from).and_then(|json| {
        serde_json::from_str::<T>(&json).map_err(JournalError::from)
    }) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to load {}: {}. Using defaults.", path.display(), e);
            T::default()
        }
    }
}

/// Converts one record of the old flat entry layout. The old `timestamp`
/// key becomes the creation time; everything else is a field value. Old
/// files carry no ids, so a fresh one is minted.
fn legacy_entry(mut record: serde_json::Map<String, serde_json::Value>) -> Entry {
    let logged_at = record
        .remove("timestamp")
        .and_then(|value| value.as_str().map(str::to_string))
        .and_then(|text| parse_legacy_timestamp(&text))
        .unwrap_or_else(Utc::now);

    let values = record
        .into_iter()
        .filter_map(|(key, value)| {
            // Untouched number inputs were stored as nulls; null means the
            // field is simply absent.
            if value.is_null() {
                return None;
            }
            match serde_json::from_value::<FieldValue>(value) {
                Ok(value) => Some((key, value)),
                Err(e) => {
                    eprintln!("Skipping unreadable legacy value for '{}': {}", key, e);
                    None
                }
            }
        })
        .collect();

    Entry { id: Uuid::new_v4(), logged_at, values }
}

fn parse_legacy_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    // Old files used naive local isoformat stamps without an offset.
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
