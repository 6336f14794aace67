//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in the
//! `tests/` directory.

use crate::id::{FluidId, ItemId};
use crate::pattern::Pattern;
use crate::stack::{FluidStack, ItemStack, StackMatch};
use crate::storage::Storage;

// ===========================================================================
// Item and fluid constructors
// ===========================================================================

pub fn log() -> ItemId {
    ItemId(0)
}
pub fn plank() -> ItemId {
    ItemId(1)
}
pub fn stick() -> ItemId {
    ItemId(2)
}
pub fn chest() -> ItemId {
    ItemId(3)
}
pub fn iron_ore() -> ItemId {
    ItemId(4)
}
pub fn iron_ingot() -> ItemId {
    ItemId(5)
}
pub fn axe() -> ItemId {
    ItemId(6)
}
pub fn water() -> FluidId {
    FluidId(0)
}
pub fn steam() -> FluidId {
    FluidId(1)
}

pub fn item(id: ItemId, count: u32) -> ItemStack {
    ItemStack::new(id, count)
}

pub fn fluid(id: FluidId, amount: u32) -> FluidStack {
    FluidStack::new(id, amount)
}

// ===========================================================================
// Pattern builders
// ===========================================================================

/// An instantaneous crafting pattern with item inputs and outputs.
pub fn crafting_pattern(item_inputs: Vec<Vec<ItemStack>>, item_outputs: Vec<ItemStack>) -> Pattern {
    Pattern {
        item_inputs,
        item_outputs,
        valid: true,
        ..Pattern::default()
    }
}

/// A multi-tick processing pattern with item inputs and outputs.
pub fn processing_pattern(
    item_inputs: Vec<Vec<ItemStack>>,
    item_outputs: Vec<ItemStack>,
) -> Pattern {
    Pattern {
        item_inputs,
        item_outputs,
        processing: true,
        valid: true,
        ..Pattern::default()
    }
}

/// A processing pattern producing a fluid from item and fluid inputs.
pub fn fluid_pattern(
    item_inputs: Vec<Vec<ItemStack>>,
    fluid_inputs: Vec<FluidStack>,
    fluid_outputs: Vec<FluidStack>,
) -> Pattern {
    Pattern {
        item_inputs,
        fluid_inputs,
        fluid_outputs,
        processing: true,
        valid: true,
        ..Pattern::default()
    }
}

// ===========================================================================
// In-memory storage
// ===========================================================================

/// Simple in-memory stock for tests: distinct stacks with counts, plus an
/// optional fixed batch size to exercise over-extraction compensation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Vec<ItemStack>,
    fluids: Vec<FluidStack>,
    /// When set, item extraction rounds the request up to whole batches of
    /// this size (bounded by what is stocked), so it can hand out more than
    /// was asked for.
    pub item_batch: Option<u32>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, stack: ItemStack) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|s| s.matches(&stack, StackMatch::Exact))
        {
            existing.count += stack.count;
        } else {
            self.items.push(stack);
        }
    }

    pub fn add_fluid(&mut self, stack: FluidStack) {
        if let Some(existing) = self.fluids.iter_mut().find(|f| f.same_fluid(&stack)) {
            existing.amount += stack.amount;
        } else {
            self.fluids.push(stack);
        }
    }

    /// Total stocked count matching `template` under `mode`.
    pub fn item_count(&self, template: &ItemStack, mode: StackMatch) -> u32 {
        self.items
            .iter()
            .filter(|s| s.matches(template, mode))
            .map(|s| s.count)
            .sum()
    }

    pub fn fluid_amount(&self, template: &FluidStack) -> u32 {
        self.fluids
            .iter()
            .filter(|f| f.same_fluid(template))
            .map(|f| f.amount)
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn extract_item(&mut self, template: &ItemStack, max: u32, mode: StackMatch) -> Option<ItemStack> {
        let batch = self.item_batch;
        for stack in &mut self.items {
            if stack.count == 0 || !stack.matches(template, mode) {
                continue;
            }
            let take = match batch {
                Some(size) => {
                    let rounded = u64::from(max).div_ceil(u64::from(size)) * u64::from(size);
                    u32::try_from(rounded.min(u64::from(stack.count))).unwrap_or(stack.count)
                }
                None => max.min(stack.count),
            };
            if take == 0 {
                continue;
            }
            stack.count -= take;
            let mut extracted = *stack;
            extracted.count = take;
            return Some(extracted);
        }
        None
    }

    fn insert_item(&mut self, template: &ItemStack, amount: u32) -> u32 {
        self.add_item(template.with_count(amount));
        amount
    }

    fn extract_fluid(&mut self, template: &FluidStack, max: u32) -> u32 {
        for stock in &mut self.fluids {
            if stock.amount == 0 || !stock.same_fluid(template) {
                continue;
            }
            let take = max.min(stock.amount);
            stock.amount -= take;
            return take;
        }
        0
    }

    fn insert_fluid(&mut self, template: &FluidStack, amount: u32) -> u32 {
        self.add_fluid(FluidStack::new(template.fluid, amount));
        amount
    }
}
