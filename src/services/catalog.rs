use std::collections::HashMap;

use crate::models::ItemRecord;
use crate::utils::normalize;

/// Reference table of known items, indexed by lowercased name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    headers: Vec<String>,
    records: Vec<ItemRecord>,
    by_name: HashMap<String, Vec<usize>>,
}

/// Result of matching a list of names against the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    pub items: Vec<ItemRecord>,
    pub not_found: Vec<String>,
}

impl Catalog {
    pub fn new(headers: Vec<String>, records: Vec<ItemRecord>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            let name = normalize(&record.item);
            if !name.is_empty() {
                by_name.entry(name).or_default().push(index);
            }
        }
        Self {
            headers,
            records,
            by_name,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive exact-name lookup. Matches come back in request
    /// order; a name listed twice yields its rows twice.
    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Lookup {
        let mut result = Lookup::default();
        for name in names {
            let key = normalize(name.as_ref());
            if key.is_empty() {
                continue;
            }
            match self.by_name.get(&key) {
                Some(indices) => result
                    .items
                    .extend(indices.iter().map(|&i| self.records[i].clone())),
                None => result.not_found.push(key),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            vec!["Item".into(), "Slot".into(), "Spell".into(), "Type".into()],
            vec![
                ItemRecord::new("Ruby Ring", "Jewel", "bless.ii"),
                ItemRecord::new("Helm of Light", "Head", "wisdom.ii"),
                ItemRecord::new("Helm of Light", "Head", "dexterity.iii"),
                ItemRecord::new("Shadow Cloak", "Cloak", ""),
                ItemRecord::new("", "Body", ""),
            ],
        )
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_ordered() {
        let lookup = catalog().lookup(&["shadow cloak", "RUBY RING"]);
        let names: Vec<&str> = lookup.items.iter().map(|i| i.item.as_str()).collect();
        assert_eq!(names, vec!["Shadow Cloak", "Ruby Ring"]);
        assert!(lookup.not_found.is_empty());
    }

    #[test]
    fn test_lookup_returns_every_row_for_a_name() {
        let lookup = catalog().lookup(&["Helm of Light"]);
        assert_eq!(lookup.items.len(), 2);
        assert_eq!(lookup.items[0].spell, "wisdom.ii");
        assert_eq!(lookup.items[1].spell, "dexterity.iii");
    }

    #[test]
    fn test_lookup_duplicates_and_misses() {
        let lookup = catalog().lookup(&["Ruby Ring", " ", "Ruby Ring", "  Laen Sword "]);
        assert_eq!(lookup.items.len(), 2);
        assert_eq!(lookup.not_found, vec!["laen sword"]);
    }

    #[test]
    fn test_exact_match_only() {
        let lookup = catalog().lookup(&["Helm"]);
        assert!(lookup.items.is_empty());
        assert_eq!(lookup.not_found, vec!["helm"]);
    }

    #[test]
    fn test_empty_catalog() {
        let empty = Catalog::default();
        assert!(empty.is_empty());
        assert_eq!(empty.lookup(&["Ruby Ring"]).not_found, vec!["ruby ring"]);
        assert_eq!(catalog().len(), 5);
    }
}
