use crate::{
    core::{
        Entry,
        JournalError,
    },
    journal::FieldOrder,
};

const TIMESTAMP_COLUMN: &str = "timestamp";

/// Export column order: known keys in display order, then orphaned keys in
/// first-seen order, then the creation timestamp. Only keys that actually
/// appear in some entry produce a column.
pub fn export_columns(entries: &[Entry], order: &FieldOrder) -> Vec<String> {
    let mut columns: Vec<String> = order
        .display_order()
        .filter(|key| entries.iter().any(|entry| entry.values.contains_key(*key)))
        .map(str::to_string)
        .collect();

    for entry in entries {
        for key in entry.values.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }
    }

    columns.push(TIMESTAMP_COLUMN.to_string());
    columns
}

/// Pretty-printed JSON array of flat records, same field keys as the
/// persisted document plus the `timestamp` column.
pub fn entries_to_json(entries: &[Entry]) -> Result<String, JournalError> {
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut record = serde_json::Map::new();
        for (key, value) in &entry.values {
            record.insert(key.clone(), serde_json::to_value(value)?);
        }
        record.insert(
            TIMESTAMP_COLUMN.to_string(),
            serde_json::Value::String(entry.logged_at.to_rfc3339()),
        );
        records.push(serde_json::Value::Object(record));
    }
    Ok(serde_json::to_string_pretty(&records)?)
}

/// CSV dump with raw field keys as the header row.
pub fn entries_to_csv(entries: &[Entry], order: &FieldOrder) -> String {
    let columns = export_columns(entries, order);

    let mut out = String::new();
    out.push_str(
        &columns.iter().map(|column| csv_escape(column)).collect::<Vec<_>>().join(","),
    );
    out.push('\n');

    for entry in entries {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                if column == TIMESTAMP_COLUMN {
                    csv_escape(&entry.logged_at.to_rfc3339())
                } else {
                    match entry.values.get(column) {
                        Some(value) => csv_escape(&value.render()),
                        None => String::new(),
                    }
                }
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Readable column name for table display: underscores to spaces, Title
/// Case, then the historical shortening table.
pub fn display_column_name(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let titled = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let replacements = [
        ("Coin Symbol", "Coin"),
        ("Coin Link", "Link"),
        ("Date Logged", "Date"),
        ("Trading Volume", "Volume"),
        ("Trading Volume Timeframe", "Volume Timeframe"),
        ("Established Status", "Status"),
        ("Conviction Level", "Conviction"),
        ("Sentiment Community", "Sentiment"),
        ("Target Exit Strategy", "Exit Strategy"),
        ("Notes Updates", "Notes"),
        ("Trade Result", "Result"),
    ];
    for (from, to) in replacements {
        if titled == from {
            return to.to_string();
        }
    }
    titled
}

/// Abbreviates large numbers for table display (K, M, B).
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::core::FieldValue;

    fn entry(pairs: &[(&str, FieldValue)]) -> Entry {
        let values: BTreeMap<String, FieldValue> =
            pairs.iter().map(|(key, value)| (key.to_string(), value.clone())).collect();
        Entry::new(values)
    }

    #[test]
    fn columns_follow_display_order_then_orphans() {
        let order = FieldOrder::default();
        let entries = vec![
            entry(&[
                ("coin_symbol", FieldValue::from("BTC")),
                ("market_cap", FieldValue::from(1_000_000.0)),
                ("custom_risk_level", FieldValue::from("High")),
            ]),
            entry(&[("coin_symbol", FieldValue::from("ETH"))]),
        ];

        let columns = export_columns(&entries, &order);
        assert_eq!(columns[0], "coin_symbol");
        assert_eq!(columns[1], "market_cap");
        // custom_risk_level has no descriptor any more, so it trails as an
        // orphan; timestamp is always last.
        assert_eq!(columns[columns.len() - 2], "custom_risk_level");
        assert_eq!(columns.last().map(String::as_str), Some("timestamp"));
        assert!(!columns.contains(&"trade_result".to_string()));
    }

    #[test]
    fn csv_escapes_and_renders_values() {
        let order = FieldOrder::default();
        let entries = vec![entry(&[
            ("coin_symbol", FieldValue::from("BTC")),
            ("notes_updates", FieldValue::from("watch support, \"whale\" moves")),
            ("conviction_level", FieldValue::from(7_i64)),
        ])];

        let csv = entries_to_csv(&entries, &order);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("coin_symbol,conviction_level,notes_updates,timestamp"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("BTC,7,\"watch support, \"\"whale\"\" moves\","));
    }

    #[test]
    fn json_export_carries_the_timestamp() {
        let entries = vec![entry(&[("coin_symbol", FieldValue::from("BTC"))])];

        let json = entries_to_json(&entries).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["coin_symbol"], "BTC");
        assert!(parsed[0]["timestamp"].is_string());
        assert!(parsed[0].get("id").is_none());
    }

    #[test]
    fn display_names_match_the_table_headers() {
        assert_eq!(display_column_name("coin_symbol"), "Coin");
        assert_eq!(display_column_name("trade_result"), "Result");
        assert_eq!(display_column_name("fib_levels"), "Fib Levels");
        assert_eq!(display_column_name("custom_risk_level"), "Custom Risk Level");
    }

    #[test]
    fn numbers_abbreviate_like_the_table() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(950.0), "950");
        assert_eq!(format_number(1_500.0), "1.5K");
        assert_eq!(format_number(2_300_000.0), "2.3M");
        assert_eq!(format_number(1_200_000_000.0), "1.2B");
    }
}
