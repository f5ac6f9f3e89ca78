use crate::models::ItemRecord;
use crate::utils::{capitalize_first, normalize};

/// Slot labels that never take part in set computation
pub const EXCLUDED_SLOTS: [&str; 4] = ["weapon", "weapons", "shield", "shields"];

/// Equipment slots a set is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalSlot {
    Head,
    Jewel,
    Body,
    Cloak,
    Hands,
    Legs,
    Feet,
}

impl CanonicalSlot {
    pub const ALL: [CanonicalSlot; 7] = [
        CanonicalSlot::Head,
        CanonicalSlot::Jewel,
        CanonicalSlot::Body,
        CanonicalSlot::Cloak,
        CanonicalSlot::Hands,
        CanonicalSlot::Legs,
        CanonicalSlot::Feet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalSlot::Head => "Head",
            CanonicalSlot::Jewel => "Jewel",
            CanonicalSlot::Body => "Body",
            CanonicalSlot::Cloak => "Cloak",
            CanonicalSlot::Hands => "Hands",
            CanonicalSlot::Legs => "Legs",
            CanonicalSlot::Feet => "Feet",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

/// Slots shown in the per-slot counts, including the ones sets ignore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySlot {
    Armor(CanonicalSlot),
    Weapon,
    Shield,
}

impl DisplaySlot {
    pub fn name(&self) -> &'static str {
        match self {
            DisplaySlot::Armor(slot) => slot.name(),
            DisplaySlot::Weapon => "Weapon",
            DisplaySlot::Shield => "Shield",
        }
    }
}

/// Map a free-text slot label to a canonical slot.
/// Weapons, shields and unknown labels are rejected.
pub fn classify(raw_slot: &str) -> Option<CanonicalSlot> {
    let lowered = normalize(raw_slot);
    if EXCLUDED_SLOTS.contains(&lowered.as_str()) {
        return None;
    }
    if lowered == "jewel" || lowered == "jewels" {
        return Some(CanonicalSlot::Jewel);
    }
    CanonicalSlot::from_name(&capitalize_first(&lowered))
}

pub fn classify_display(raw_slot: &str) -> Option<DisplaySlot> {
    match normalize(raw_slot).as_str() {
        "weapon" | "weapons" => Some(DisplaySlot::Weapon),
        "shield" | "shields" => Some(DisplaySlot::Shield),
        _ => classify(raw_slot).map(DisplaySlot::Armor),
    }
}

/// True when either the Type or the Slot column marks the item as a weapon or shield
pub fn is_weapon_or_shield(item: &ItemRecord) -> bool {
    [item.item_type.as_str(), item.slot.as_str()]
        .iter()
        .any(|field| EXCLUDED_SLOTS.contains(&normalize(field).as_str()))
}
