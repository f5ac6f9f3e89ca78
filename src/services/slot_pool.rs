use std::collections::{BTreeMap, HashSet};

use crate::models::ItemRecord;
use crate::services::slot_classifier::{
    classify, classify_display, is_weapon_or_shield, CanonicalSlot, DisplaySlot,
};
use crate::utils::normalize;

/// Content key two rows are considered the same item by
type ItemIdentity = (String, String, String);

fn identity(item: &ItemRecord) -> ItemIdentity {
    let slot = match classify(&item.slot) {
        Some(slot) => slot.name().to_lowercase(),
        None => normalize(&item.slot),
    };
    (slot, normalize(&item.item), normalize(&item.spell))
}

/// Drop rows repeating an earlier (Slot, Item, Spell), keeping the first
pub fn dedupe_items(items: &[ItemRecord]) -> Vec<&ItemRecord> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(identity(item)))
        .collect()
}

/// Candidate items for every set slot
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    pools: BTreeMap<CanonicalSlot, Vec<ItemRecord>>,
}

impl SlotPool {
    /// Partition items by slot after deduplication. Weapons, shields and
    /// unrecognised slots are left out.
    pub fn from_items(items: &[ItemRecord]) -> Self {
        let mut pool = SlotPool::default();
        for item in dedupe_items(items) {
            if is_weapon_or_shield(item) {
                continue;
            }
            if let Some(slot) = classify(&item.slot) {
                pool.pools.entry(slot).or_default().push(item.clone());
            }
        }
        pool
    }

    pub fn get(&self, slot: CanonicalSlot) -> &[ItemRecord] {
        self.pools.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, slot: CanonicalSlot) -> usize {
        self.get(slot).len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.values().all(Vec::is_empty)
    }

    /// Every pooled item, slot by slot
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.pools.values().flatten()
    }
}

/// Per-slot item counts for display, weapons and shields included
pub fn slot_counts(items: &[ItemRecord]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> = CanonicalSlot::ALL
        .iter()
        .map(|slot| (slot.name(), 0))
        .chain([(DisplaySlot::Weapon.name(), 0), (DisplaySlot::Shield.name(), 0)])
        .collect();

    for item in dedupe_items(items) {
        let display = match classify_display(&item.item_type) {
            Some(kind @ (DisplaySlot::Weapon | DisplaySlot::Shield)) => Some(kind),
            _ => classify_display(&item.slot),
        };
        if let Some(slot) = display {
            *counts.entry(slot.name()).or_insert(0) += 1;
        }
    }

    counts
}
