//! Counting and enumerating equipment sets.
//!
//! A set holds one item for each of Head, Cloak, Body, Hands, Legs and Feet
//! plus two different jewels. Jewel1/Jewel2 are ordered: (A, B) and (B, A)
//! are separate sets, matching two independent pickers that exclude each
//! other's choice.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::ItemRecord;
use crate::services::slot_classifier::CanonicalSlot;
use crate::services::slot_pool::SlotPool;
use crate::services::spells::{normalize_spell, SpellFilter};

/// Items in one complete set
pub const SET_SIZE: usize = 8;

/// Slots filled by exactly one item
const SINGLE_SLOTS: [CanonicalSlot; 6] = [
    CanonicalSlot::Head,
    CanonicalSlot::Cloak,
    CanonicalSlot::Body,
    CanonicalSlot::Hands,
    CanonicalSlot::Legs,
    CanonicalSlot::Feet,
];

/// Positions within a set, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetSlot {
    Head,
    Jewel1,
    Jewel2,
    Cloak,
    Body,
    Hands,
    Legs,
    Feet,
}

impl SetSlot {
    pub const ALL: [SetSlot; SET_SIZE] = [
        SetSlot::Head,
        SetSlot::Jewel1,
        SetSlot::Jewel2,
        SetSlot::Cloak,
        SetSlot::Body,
        SetSlot::Hands,
        SetSlot::Legs,
        SetSlot::Feet,
    ];

    /// Pool this position draws from
    pub fn pool(&self) -> CanonicalSlot {
        match self {
            SetSlot::Head => CanonicalSlot::Head,
            SetSlot::Jewel1 | SetSlot::Jewel2 => CanonicalSlot::Jewel,
            SetSlot::Cloak => CanonicalSlot::Cloak,
            SetSlot::Body => CanonicalSlot::Body,
            SetSlot::Hands => CanonicalSlot::Hands,
            SetSlot::Legs => CanonicalSlot::Legs,
            SetSlot::Feet => CanonicalSlot::Feet,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Number of sets with no spell restriction
pub fn count_sets(pool: &SlotPool) -> u64 {
    let jewels = pool.len(CanonicalSlot::Jewel) as u64;
    if jewels < 2 {
        return 0;
    }
    SINGLE_SLOTS
        .iter()
        .fold(jewels * (jewels - 1), |total, slot| {
            total.saturating_mul(pool.len(*slot) as u64)
        })
}

/// Number of sets whose combined spells include every spell in `filter`.
///
/// Runs a DP over slots where the state is the bitmask of filter spells
/// already covered. Each item carries one spell, so a filter wider than a
/// set can never be met.
pub fn count_filtered_sets(pool: &SlotPool, filter: &SpellFilter) -> u64 {
    if filter.is_empty() {
        return count_sets(pool);
    }
    if filter.len() > SET_SIZE {
        return 0;
    }

    let masks = SpellMasks::new(filter);
    let full = masks.full();
    let mask_of = |item: &ItemRecord| masks.of(item);

    let carried = pool.iter().fold(0, |acc, item| acc | mask_of(item));
    if carried != full {
        return 0;
    }

    let mut ways = vec![0u64; full + 1];
    ways[0] = 1;

    for slot in SINGLE_SLOTS {
        let mut histogram = vec![0u64; full + 1];
        for item in pool.get(slot) {
            histogram[mask_of(item)] += 1;
        }
        ways = combine(&ways, &histogram);
    }

    let mut jewels = vec![0u64; full + 1];
    for item in pool.get(CanonicalSlot::Jewel) {
        jewels[mask_of(item)] += 1;
    }
    let mut pairs = vec![0u64; full + 1];
    for (first, &n_first) in jewels.iter().enumerate() {
        for (second, &n_second) in jewels.iter().enumerate() {
            let ordered = if first == second {
                n_first.saturating_mul(n_first.saturating_sub(1))
            } else {
                n_first.saturating_mul(n_second)
            };
            pairs[first | second] = pairs[first | second].saturating_add(ordered);
        }
    }
    ways = combine(&ways, &pairs);

    ways[full]
}

/// Bit positions of the filter's spells
struct SpellMasks<'f> {
    spells: Vec<&'f str>,
}

impl<'f> SpellMasks<'f> {
    /// Callers keep the filter within `SET_SIZE` spells
    fn new(filter: &'f SpellFilter) -> Self {
        Self {
            spells: filter.iter().collect(),
        }
    }

    fn full(&self) -> usize {
        (1usize << self.spells.len()) - 1
    }

    fn of(&self, item: &ItemRecord) -> usize {
        normalize_spell(&item.spell)
            .and_then(|spell| self.spells.iter().position(|s| *s == spell))
            .map_or(0, |bit| 1 << bit)
    }
}

fn combine(ways: &[u64], histogram: &[u64]) -> Vec<u64> {
    let mut next = vec![0u64; ways.len()];
    for (covered, &count) in ways.iter().enumerate() {
        if count == 0 {
            continue;
        }
        for (mask, &items) in histogram.iter().enumerate() {
            if items == 0 {
                continue;
            }
            let cell = &mut next[covered | mask];
            *cell = cell.saturating_add(count.saturating_mul(items));
        }
    }
    next
}

/// One concrete set
#[derive(Debug, Clone, Copy)]
pub struct EquipmentSet<'a> {
    items: [&'a ItemRecord; SET_SIZE],
}

impl<'a> EquipmentSet<'a> {
    pub fn get(&self, slot: SetSlot) -> &'a ItemRecord {
        self.items[slot.index()]
    }

    pub fn spells(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .filter_map(|item| normalize_spell(&item.spell))
            .collect()
    }

    pub fn satisfies(&self, filter: &SpellFilter) -> bool {
        if filter.is_empty() {
            return true;
        }
        let spells = self.spells();
        filter.iter().all(|spell| spells.contains(spell))
    }

    pub fn summary(&self) -> SetSummary {
        let name = |slot: SetSlot| self.get(slot).item.clone();
        SetSummary {
            head: name(SetSlot::Head),
            jewel1: name(SetSlot::Jewel1),
            jewel2: name(SetSlot::Jewel2),
            cloak: name(SetSlot::Cloak),
            body: name(SetSlot::Body),
            hands: name(SetSlot::Hands),
            legs: name(SetSlot::Legs),
            feet: name(SetSlot::Feet),
        }
    }
}

/// Item names of a set, keyed by slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetSummary {
    pub head: String,
    pub jewel1: String,
    pub jewel2: String,
    pub cloak: String,
    pub body: String,
    pub hands: String,
    pub legs: String,
    pub feet: String,
}

/// Lazily walks every set satisfying a filter, depth first with Feet turning
/// fastest. A prefix is dropped as soon as the remaining positions can no
/// longer cover the spells it is missing, so sparse matches are reached
/// without visiting the rest of the cross product.
pub struct Sets<'a> {
    lists: [&'a [ItemRecord]; SET_SIZE],
    masks: [Vec<usize>; SET_SIZE],
    /// `completes[p][m]`: positions `p..` can take covered mask `m` to full
    completes: Vec<Vec<bool>>,
    indices: [usize; SET_SIZE],
    /// `covered[p]`: filter spells met by positions before `p`
    covered: [usize; SET_SIZE + 1],
    depth: usize,
    exhausted: bool,
}

impl<'a> Sets<'a> {
    pub fn new(pool: &'a SlotPool, filter: &SpellFilter) -> Self {
        let lists = SetSlot::ALL.map(|slot| pool.get(slot.pool()));
        let mut sets = Self {
            lists,
            masks: Default::default(),
            completes: Vec::new(),
            indices: [0; SET_SIZE],
            covered: [0; SET_SIZE + 1],
            depth: 0,
            exhausted: true,
        };
        if filter.len() > SET_SIZE || pool.len(CanonicalSlot::Jewel) < 2 {
            return sets;
        }

        let spell_masks = SpellMasks::new(filter);
        let full = spell_masks.full();
        sets.masks = lists.map(|list| list.iter().map(|item| spell_masks.of(item)).collect());

        let mut completes = vec![Vec::new(); SET_SIZE + 1];
        completes[SET_SIZE] = (0..=full).map(|covered| covered == full).collect();
        for position in (0..SET_SIZE).rev() {
            let after = &completes[position + 1];
            let reachable: Vec<bool> = (0..=full)
                .map(|covered| {
                    sets.masks[position]
                        .iter()
                        .any(|mask| after[covered | mask])
                })
                .collect();
            completes[position] = reachable;
        }

        sets.exhausted = !completes[0][0];
        sets.completes = completes;
        sets
    }

    /// Step back one position and move it to its next candidate
    fn backtrack(&mut self) {
        if self.depth == 0 {
            self.exhausted = true;
            return;
        }
        self.depth -= 1;
        self.indices[self.depth] += 1;
    }
}

impl<'a> Iterator for Sets<'a> {
    type Item = EquipmentSet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let position = self.depth;
            if position == SET_SIZE {
                let lists = self.lists;
                let indices = self.indices;
                let set = EquipmentSet {
                    items: std::array::from_fn(|position| {
                        let list: &'a [ItemRecord] = lists[position];
                        &list[indices[position]]
                    }),
                };
                self.backtrack();
                return Some(set);
            }

            let index = self.indices[position];
            if index >= self.lists[position].len() {
                self.indices[position] = 0;
                self.backtrack();
                continue;
            }

            let repeats_jewel = position == SetSlot::Jewel2.index()
                && index == self.indices[SetSlot::Jewel1.index()];
            let covered = self.covered[position] | self.masks[position][index];
            if repeats_jewel || !self.completes[position + 1][covered] {
                self.indices[position] += 1;
                continue;
            }
            self.covered[position + 1] = covered;
            self.depth += 1;
        }
        None
    }
}

/// Up to `limit` sets satisfying the filter, for spot checks
pub fn sample_sets(pool: &SlotPool, filter: &SpellFilter, limit: usize) -> Vec<SetSummary> {
    if limit == 0 {
        return Vec::new();
    }
    Sets::new(pool, filter)
        .take(limit)
        .map(|set| set.summary())
        .collect()
}
