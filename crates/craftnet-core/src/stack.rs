use crate::id::{FluidId, ItemId};
use serde::{Deserialize, Serialize};

/// How closely two item stacks must agree to count as "the same thing".
///
/// Stands in for the comparer flag set of the surrounding network: `Exact`
/// is the default used for ingredient extraction, `IgnoreDamage` is used when
/// hunting for worn tools at any damage level, and `ItemOnly` backs
/// alternative-matching (oredict) identity where several concrete stacks are
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackMatch {
    /// Item id, damage and tag must all agree.
    Exact,
    /// Item id and tag must agree; damage is ignored.
    IgnoreDamage,
    /// Only the item id must agree.
    ItemOnly,
}

/// A discrete stack of items. Quantity is a 32-bit count, matching the
/// transport layer this engine reports shortages to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
    /// Wear already accumulated. Meaningful only when `max_damage > 0`.
    #[serde(default)]
    pub damage: u32,
    /// Total durability. Zero means the item is not damageable.
    #[serde(default)]
    pub max_damage: u32,
    /// Opaque per-stack data tag (enchantments, machine config, ...).
    /// Compared for identity, never interpreted.
    #[serde(default)]
    pub tag: Option<u32>,
}

impl ItemStack {
    pub fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            count,
            damage: 0,
            max_damage: 0,
            tag: None,
        }
    }

    /// A damageable variant: a tool with `max_damage` total uses, `damage`
    /// of which are already spent.
    pub fn damageable(item: ItemId, count: u32, damage: u32, max_damage: u32) -> Self {
        Self {
            item,
            count,
            damage,
            max_damage,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: u32) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn is_damageable(&self) -> bool {
        self.max_damage > 0
    }

    /// Uses left before the tool breaks.
    pub fn remaining_uses(&self) -> u32 {
        self.max_damage.saturating_sub(self.damage)
    }

    /// Identity comparison under the given mode. Count never participates.
    pub fn matches(&self, other: &ItemStack, mode: StackMatch) -> bool {
        if self.item != other.item {
            return false;
        }
        match mode {
            StackMatch::Exact => self.damage == other.damage && self.tag == other.tag,
            StackMatch::IgnoreDamage => self.tag == other.tag,
            StackMatch::ItemOnly => true,
        }
    }
}

/// A quantity of fluid, tracked in discrete units like item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidStack {
    pub fluid: FluidId,
    pub amount: u32,
}

impl FluidStack {
    pub fn new(fluid: FluidId, amount: u32) -> Self {
        Self { fluid, amount }
    }

    /// Same fluid type, any amount.
    pub fn same_fluid(&self, other: &FluidStack) -> bool {
        self.fluid == other.fluid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_checks_damage_and_tag() {
        let a = ItemStack::damageable(ItemId(0), 1, 3, 100);
        let b = ItemStack::damageable(ItemId(0), 64, 3, 100);
        let c = ItemStack::damageable(ItemId(0), 1, 4, 100);
        assert!(a.matches(&b, StackMatch::Exact)); // count ignored
        assert!(!a.matches(&c, StackMatch::Exact));
        assert!(a.matches(&c, StackMatch::IgnoreDamage));
    }

    #[test]
    fn tag_participates_in_ignore_damage() {
        let plain = ItemStack::new(ItemId(5), 1);
        let tagged = ItemStack::new(ItemId(5), 1).with_tag(7);
        assert!(!plain.matches(&tagged, StackMatch::IgnoreDamage));
        assert!(plain.matches(&tagged, StackMatch::ItemOnly));
    }

    #[test]
    fn different_items_never_match() {
        let a = ItemStack::new(ItemId(0), 1);
        let b = ItemStack::new(ItemId(1), 1);
        assert!(!a.matches(&b, StackMatch::ItemOnly));
    }

    #[test]
    fn remaining_uses_saturates() {
        let worn = ItemStack::damageable(ItemId(0), 1, 250, 100);
        assert_eq!(worn.remaining_uses(), 0);
        let fresh = ItemStack::damageable(ItemId(0), 1, 0, 100);
        assert_eq!(fresh.remaining_uses(), 100);
    }
}
