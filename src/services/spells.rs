use std::collections::BTreeSet;

use crate::models::ItemRecord;
use crate::utils::normalize;

/// Trimmed, lowercased spell name, or None for a blank entry
pub fn normalize_spell(raw: &str) -> Option<String> {
    let spell = normalize(raw);
    if spell.is_empty() {
        None
    } else {
        Some(spell)
    }
}

/// Spells a set must carry. Empty means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellFilter {
    spells: BTreeSet<String>,
}

impl SpellFilter {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            spells: raw
                .into_iter()
                .filter_map(|spell| normalize_spell(spell.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn contains(&self, spell: &str) -> bool {
        self.spells.contains(spell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.spells.iter().map(String::as_str)
    }
}

/// Unique spells across the items, lowercased and sorted
pub fn unique_spells(items: &[ItemRecord]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| normalize_spell(&item.spell))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
