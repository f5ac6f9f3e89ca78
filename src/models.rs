use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::services::catalog::Catalog;
use crate::services::combinations::SetSummary;
use crate::services::spells::SpellFilter;
use crate::utils::{normalize, split_names};

pub const ITEM_HEADER: &str = "Item";
pub const SLOT_HEADER: &str = "Slot";
pub const SPELL_HEADER: &str = "Spell";
pub const TYPE_HEADER: &str = "Type";

/// Application state shared across all handlers. Read-only once the server starts.
pub struct AppState {
    pub catalog: Catalog,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            loaded_at: Utc::now(),
        }
    }
}

/// The record field a catalog column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Item,
    Slot,
    Spell,
    Type,
    Other,
}

impl Column {
    pub fn of(header: &str) -> Self {
        match normalize(header).as_str() {
            "item" | "name" | "item name" => Column::Item,
            "slot" => Column::Slot,
            "spell" => Column::Spell,
            "type" => Column::Type,
            _ => Column::Other,
        }
    }

    /// Header name shown to clients: recognised columns get their canonical spelling
    pub fn display_header(header: &str) -> String {
        match Column::of(header) {
            Column::Item => ITEM_HEADER.to_string(),
            Column::Slot => SLOT_HEADER.to_string(),
            Column::Spell => SPELL_HEADER.to_string(),
            Column::Type => TYPE_HEADER.to_string(),
            Column::Other => header.trim().to_string(),
        }
    }
}

/// One catalog row. On the wire this is a flat object keyed by header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ItemRecord {
    pub item: String,
    pub slot: String,
    pub spell: String,
    pub item_type: String,
    /// Remaining display columns, in catalog order
    pub extra: Vec<(String, String)>,
}

impl ItemRecord {
    pub fn new(item: impl Into<String>, slot: impl Into<String>, spell: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            slot: slot.into(),
            spell: spell.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    /// Build a record from (header, value) pairs. The first column of each
    /// recognised kind wins; later duplicates are kept as display fields.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = ItemRecord::default();
        let mut filled = [false; 4];

        for (header, value) in fields {
            let header = header.as_ref();
            let value = value.into();
            let (index, field) = match Column::of(header) {
                Column::Item => (0, &mut record.item),
                Column::Slot => (1, &mut record.slot),
                Column::Spell => (2, &mut record.spell),
                Column::Type => (3, &mut record.item_type),
                Column::Other => {
                    record.extra.push((header.trim().to_string(), value));
                    continue;
                }
            };
            if filled[index] {
                record.extra.push((header.trim().to_string(), value));
            } else {
                filled[index] = true;
                *field = value;
            }
        }

        record
    }
}

impl From<Map<String, Value>> for ItemRecord {
    fn from(map: Map<String, Value>) -> Self {
        ItemRecord::from_fields(map.into_iter().map(|(key, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        }))
    }
}

impl From<ItemRecord> for Map<String, Value> {
    fn from(record: ItemRecord) -> Self {
        let mut map = Map::new();
        map.insert(ITEM_HEADER.to_string(), Value::String(record.item));
        map.insert(SLOT_HEADER.to_string(), Value::String(record.slot));
        map.insert(SPELL_HEADER.to_string(), Value::String(record.spell));
        map.insert(TYPE_HEADER.to_string(), Value::String(record.item_type));
        for (header, value) in record.extra {
            map.entry(header).or_insert(Value::String(value));
        }
        map
    }
}

/// Names to look up, either as a list or as a pasted blob. The blob may
/// arrive under `input` or `items`; `input` wins when both are sent.
#[derive(Debug, Default, Deserialize)]
pub struct LookupRequest {
    pub names: Option<Vec<String>>,
    pub input: Option<String>,
    pub items: Option<String>,
}

impl LookupRequest {
    pub fn requested_names(&self) -> Vec<String> {
        let pasted = self.input.as_deref().or(self.items.as_deref());
        requested_names(&self.names, pasted)
    }
}

/// Body shared by the set endpoints. The item snapshot travels with every
/// request: either records from an earlier lookup, or names to look up now.
#[derive(Debug, Default, Deserialize)]
pub struct SetsRequest {
    pub items: Option<Vec<ItemRecord>>,
    pub names: Option<Vec<String>>,
    pub input: Option<String>,
    /// A spell name or a list of them. Entries that are not strings never match.
    pub spells: Option<Value>,
    pub limit: Option<usize>,
}

impl SetsRequest {
    pub fn resolve_items(&self, catalog: &Catalog) -> Vec<ItemRecord> {
        match &self.items {
            Some(items) => items.clone(),
            None => {
                let names = requested_names(&self.names, self.input.as_deref());
                if names.is_empty() {
                    Vec::new()
                } else {
                    catalog.lookup(&names).items
                }
            }
        }
    }

    pub fn spell_filter(&self) -> SpellFilter {
        match &self.spells {
            None => SpellFilter::default(),
            Some(Value::Array(entries)) => SpellFilter::new(entries.iter().filter_map(spell_name)),
            Some(entry) => SpellFilter::new(spell_name(entry)),
        }
    }
}

/// Spell name carried by one filter entry. Null means "no spell"; numbers,
/// lists and objects keep their JSON text so they never match a catalog spell.
fn spell_name(entry: &Value) -> Option<String> {
    match entry {
        Value::Null => None,
        Value::String(spell) => Some(spell.clone()),
        other => Some(other.to_string()),
    }
}

fn requested_names(names: &Option<Vec<String>>, input: Option<&str>) -> Vec<String> {
    match (names, input) {
        (Some(names), _) => names.clone(),
        (None, Some(input)) => split_names(input),
        (None, None) => Vec::new(),
    }
}

#[derive(Serialize)]
pub struct ItemsResponse {
    pub ok: bool,
    pub count: usize,
    pub headers: Vec<String>,
    pub items: Vec<ItemRecord>,
    pub not_found: Vec<String>,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub ok: bool,
    pub sets_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_counts: Option<BTreeMap<&'static str, usize>>,
}

#[derive(Serialize)]
pub struct SampleResponse {
    pub ok: bool,
    pub sets: Vec<SetSummary>,
}

#[derive(Serialize)]
pub struct SpellsResponse {
    pub ok: bool,
    pub spells: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub catalog_items: usize,
    pub loaded_at: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_of() {
        assert_eq!(Column::of(" Item Name "), Column::Item);
        assert_eq!(Column::of("NAME"), Column::Item);
        assert_eq!(Column::of("slot"), Column::Slot);
        assert_eq!(Column::of("Spell"), Column::Spell);
        assert_eq!(Column::of("type"), Column::Type);
        assert_eq!(Column::of("Weight"), Column::Other);
    }

    #[test]
    fn test_item_record_from_json() {
        let record: ItemRecord = serde_json::from_value(json!({
            "item": "Ruby Ring",
            "SLOT": "Jewel",
            "Spell": null,
            "Weight": 2,
            "Notes": "shiny"
        }))
        .unwrap();

        assert_eq!(record.item, "Ruby Ring");
        assert_eq!(record.slot, "Jewel");
        assert_eq!(record.spell, "");
        assert_eq!(record.item_type, "");
        assert!(record.extra.contains(&("Weight".to_string(), "2".to_string())));
        assert!(record.extra.contains(&("Notes".to_string(), "shiny".to_string())));
    }

    #[test]
    fn test_item_record_keeps_json_key_order() {
        let record: ItemRecord = serde_json::from_str(
            r#"{"Name": "Old Helm", "Item": "Helm", "Zeta": "z", "Slot": "Head", "Alpha": "a"}"#,
        )
        .unwrap();
        assert_eq!(record.item, "Old Helm");
        let extra: Vec<&str> = record.extra.iter().map(|(header, _)| header.as_str()).collect();
        assert_eq!(extra, vec!["Item", "Zeta", "Alpha"]);

        let text = serde_json::to_string(&ItemRecord::new("Helm", "Head", "").with_type("Armor"))
            .unwrap();
        assert_eq!(text, r#"{"Item":"Helm","Slot":"Head","Spell":"","Type":"Armor"}"#);
    }

    #[test]
    fn test_item_record_to_json_uses_canonical_headers() {
        let record = ItemRecord::new("Ruby Ring", "Jewel", "bless.ii").with_type("Armor");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Item"], "Ruby Ring");
        assert_eq!(value["Slot"], "Jewel");
        assert_eq!(value["Spell"], "bless.ii");
        assert_eq!(value["Type"], "Armor");
    }

    #[test]
    fn test_from_fields_keeps_duplicate_columns_as_extra() {
        let record = ItemRecord::from_fields([("Item", "Helm"), ("Name", "Old Helm"), ("Slot", "Head")]);
        assert_eq!(record.item, "Helm");
        assert_eq!(record.extra, vec![("Name".to_string(), "Old Helm".to_string())]);
    }

    #[test]
    fn test_spell_filter_from_request() {
        let request: SetsRequest =
            serde_json::from_value(json!({ "spells": ["Fire", " ", null, "ICE "] })).unwrap();
        let filter = request.spell_filter();
        assert_eq!(filter.len(), 2);
        assert!(filter.contains("fire"));
        assert!(filter.contains("ice"));

        let single: SetsRequest = serde_json::from_value(json!({ "spells": "Bless.II" })).unwrap();
        assert!(single.spell_filter().contains("bless.ii"));

        let none: SetsRequest = serde_json::from_value(json!({})).unwrap();
        assert!(none.spell_filter().is_empty());
    }

    #[test]
    fn test_spell_filter_keeps_non_string_entries_unmatched() {
        let mixed: SetsRequest = serde_json::from_value(json!({ "spells": ["fire", 5] })).unwrap();
        let filter = mixed.spell_filter();
        assert_eq!(filter.len(), 2);
        assert!(filter.contains("fire"));
        assert!(filter.contains("5"));

        let number: SetsRequest = serde_json::from_value(json!({ "spells": 5 })).unwrap();
        assert_eq!(number.spell_filter().len(), 1);

        let nested: SetsRequest =
            serde_json::from_value(json!({ "spells": [["fire"], { "spell": "ice" }] })).unwrap();
        let filter = nested.spell_filter();
        assert_eq!(filter.len(), 2);
        assert!(!filter.contains("fire"));
        assert!(!filter.contains("ice"));
    }

    #[test]
    fn test_requested_names_prefers_list() {
        let request = LookupRequest {
            names: Some(vec!["Helm".to_string()]),
            input: Some("Ruby Ring, Emerald Ring".to_string()),
            items: None,
        };
        assert_eq!(request.requested_names(), vec!["Helm"]);

        let pasted = LookupRequest {
            input: Some("Ruby Ring, Emerald Ring".to_string()),
            ..Default::default()
        };
        assert_eq!(pasted.requested_names(), vec!["Ruby Ring", "Emerald Ring"]);
    }

    #[test]
    fn test_pasted_text_under_items() {
        let request: LookupRequest =
            serde_json::from_value(json!({ "items": "Ruby Ring\nHelm" })).unwrap();
        assert_eq!(request.requested_names(), vec!["Ruby Ring", "Helm"]);

        let both: LookupRequest =
            serde_json::from_value(json!({ "input": "Helm", "items": "Ruby Ring" })).unwrap();
        assert_eq!(both.requested_names(), vec!["Helm"]);
    }
}
