//! Amount-tracked ingredient requirements.
//!
//! One [`Input`] represents one distinct ingredient of a task: how much is
//! needed in total, how much has been supplied from stock, and how much has
//! been delegated to a sub-task. The original engine modelled the variants as
//! a class hierarchy; here they are a tagged [`InputKind`] dispatched by
//! plain `match`.

use crate::stack::{FluidStack, ItemStack, StackMatch};
use serde::{Deserialize, Serialize};

/// What the input is made of: one oredict-style group of interchangeable
/// item stacks, or a single fluid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ingredient {
    Item {
        /// Mutually-substitutable concrete stacks for this slot, in declared
        /// order. The first entry is the representative used for pattern
        /// lookup and shortage reporting.
        alternatives: Vec<ItemStack>,
    },
    Fluid(FluidStack),
}

/// Behavioural variant of an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputKind {
    /// Plain consumed ingredient.
    Standard,
    /// A reusable tool consumed in wear, not quantity. Extracted one physical
    /// item at a time; one tool instance satisfies any iteration count.
    Durability {
        /// Concrete tool instances pulled from stock, worst wear and all.
        tools: Vec<ItemStack>,
        /// Accumulated uses across the extracted tools.
        uses: u64,
    },
    /// A catalyst: needs at most one extraction ever.
    Infinite {
        /// Whether an extraction actually happened, so cleanup can return
        /// the catalyst afterwards.
        extracted: bool,
    },
    /// Replenished continuously while a multi-tick process runs. Its missing
    /// amount is computed against the per-iteration quantity and it never
    /// delegates to a sub-task.
    Restockable,
}

/// One merged ingredient requirement of a task.
///
/// Invariant, checked after every extraction/delegation step:
/// `amount_missing() == amount_needed() - total_input - to_craft`, never
/// negative and never double-counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    ingredient: Ingredient,
    kind: InputKind,
    /// Quantity consumed by a single pattern iteration.
    quantity_per_craft: u64,
    /// Total quantity this resolution must satisfy (`iterations * per_craft`
    /// once the owning task has scaled it).
    amount_needed: u64,
    /// Quantity already pulled from stock.
    total_input: u64,
    /// Quantity delegated to a sub-task.
    to_craft: u64,
    oredict: bool,
}

impl Input {
    /// A standard item input over a full alternative group.
    pub fn items(alternatives: Vec<ItemStack>, oredict: bool) -> Self {
        let per_craft = alternatives.first().map_or(0, |s| u64::from(s.count));
        Self {
            ingredient: Ingredient::Item { alternatives },
            kind: InputKind::Standard,
            quantity_per_craft: per_craft,
            amount_needed: per_craft,
            total_input: 0,
            to_craft: 0,
            oredict,
        }
    }

    /// A standard fluid input.
    pub fn fluid(stack: FluidStack, oredict: bool) -> Self {
        let per_craft = u64::from(stack.amount);
        Self {
            ingredient: Ingredient::Fluid(stack),
            kind: InputKind::Standard,
            quantity_per_craft: per_craft,
            amount_needed: per_craft,
            total_input: 0,
            to_craft: 0,
            oredict,
        }
    }

    /// A durability input over a single damageable tool.
    pub fn durability(tool: ItemStack, oredict: bool) -> Self {
        Self {
            ingredient: Ingredient::Item {
                alternatives: vec![tool],
            },
            kind: InputKind::Durability {
                tools: Vec::new(),
                uses: 0,
            },
            quantity_per_craft: 1,
            amount_needed: 1,
            total_input: 0,
            to_craft: 0,
            oredict,
        }
    }

    /// An infinite (catalyst) input.
    pub fn infinite(stack: ItemStack, oredict: bool) -> Self {
        Self {
            ingredient: Ingredient::Item {
                alternatives: vec![stack],
            },
            kind: InputKind::Infinite { extracted: false },
            quantity_per_craft: 0,
            amount_needed: 1,
            total_input: 0,
            to_craft: 0,
            oredict,
        }
    }

    /// A restockable input for a tracked processing ingredient.
    pub fn restockable(stack: ItemStack, oredict: bool) -> Self {
        let per_craft = u64::from(stack.count);
        Self {
            ingredient: Ingredient::Item {
                alternatives: vec![stack],
            },
            kind: InputKind::Restockable,
            quantity_per_craft: per_craft,
            amount_needed: per_craft,
            total_input: 0,
            to_craft: 0,
            oredict,
        }
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    pub fn is_fluid(&self) -> bool {
        matches!(self.ingredient, Ingredient::Fluid(_))
    }

    pub fn ingredient(&self) -> &Ingredient {
        &self.ingredient
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    /// Representative stack for pattern lookup and shortage reporting.
    pub fn representative_item(&self) -> Option<ItemStack> {
        match &self.ingredient {
            Ingredient::Item { alternatives } => alternatives.first().copied(),
            Ingredient::Fluid(_) => None,
        }
    }

    pub fn fluid_stack(&self) -> Option<FluidStack> {
        match &self.ingredient {
            Ingredient::Fluid(stack) => Some(*stack),
            Ingredient::Item { .. } => None,
        }
    }

    pub fn alternatives(&self) -> &[ItemStack] {
        match &self.ingredient {
            Ingredient::Item { alternatives } => alternatives,
            Ingredient::Fluid(_) => &[],
        }
    }

    /// Whether two inputs describe the same ingredient. Item inputs compare
    /// under oredict rules when either side has alternative matching enabled;
    /// fluid inputs compare by fluid type.
    pub fn same_ingredient(&self, other: &Input) -> bool {
        match (&self.ingredient, &other.ingredient) {
            (Ingredient::Fluid(a), Ingredient::Fluid(b)) => a.same_fluid(b),
            (Ingredient::Item { alternatives: a }, Ingredient::Item { alternatives: b }) => {
                let mode = if self.oredict || other.oredict {
                    StackMatch::ItemOnly
                } else {
                    StackMatch::Exact
                };
                a.iter().any(|x| b.iter().any(|y| x.matches(y, mode)))
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Amounts
    // -----------------------------------------------------------------------

    /// Total quantity this input must end up with.
    pub fn amount_needed(&self) -> u64 {
        match self.kind {
            // One tool instance or one catalyst covers any iteration count.
            InputKind::Durability { .. } | InputKind::Infinite { .. } => 1,
            _ => self.amount_needed,
        }
    }

    /// Quantity consumed per pattern iteration. Infinite inputs contribute
    /// nothing to iteration scaling.
    pub fn quantity_per_craft(&self) -> u64 {
        match self.kind {
            InputKind::Infinite { .. } => 0,
            _ => self.quantity_per_craft,
        }
    }

    pub fn total_input(&self) -> u64 {
        self.total_input
    }

    pub fn to_craft(&self) -> u64 {
        self.to_craft
    }

    /// Quantity still unaccounted for.
    pub fn amount_missing(&self) -> u64 {
        match self.kind {
            // Restocked continuously during the process: only one iteration's
            // worth needs to be on hand up front.
            InputKind::Restockable => self
                .quantity_per_craft
                .saturating_sub(self.total_input + self.to_craft),
            _ => self
                .amount_needed()
                .saturating_sub(self.total_input + self.to_craft),
        }
    }

    /// Scale the needed amount to the resolved iteration count. Durability
    /// and infinite inputs ignore scaling; restockable inputs stay pinned to
    /// their per-iteration quantity.
    pub fn set_amount_needed(&mut self, amount: u64) {
        match self.kind {
            InputKind::Durability { .. } | InputKind::Infinite { .. } => {}
            InputKind::Restockable => self.amount_needed = self.quantity_per_craft,
            InputKind::Standard => self.amount_needed = amount,
        }
    }

    /// Reset the per-iteration quantity of a restockable input after the
    /// tracked quantity is known.
    pub fn fix_counts(&mut self, quantity_per_craft: u64) {
        if matches!(self.kind, InputKind::Restockable) {
            self.quantity_per_craft = quantity_per_craft;
            self.amount_needed = quantity_per_craft;
        }
    }

    // -----------------------------------------------------------------------
    // Supply accounting
    // -----------------------------------------------------------------------

    /// Credit `amount` freshly extracted units against this input.
    ///
    /// Accepts at most the missing amount and returns the excess, which the
    /// caller must re-insert into storage immediately so extraction never
    /// silently over-consumes.
    #[must_use = "the excess must be re-inserted into storage"]
    pub fn accept(&mut self, amount: u64) -> u64 {
        let missing = self.amount_missing();
        let taken = amount.min(missing);
        self.total_input += taken;
        if taken > 0 {
            if let InputKind::Infinite { extracted } = &mut self.kind {
                *extracted = true;
            }
        }
        amount - taken
    }

    /// Record one extracted tool instance for a durability input. The tool's
    /// remaining uses accumulate; the single-unit need is met by the first
    /// successful extraction.
    pub fn add_tool(&mut self, tool: ItemStack) {
        if let InputKind::Durability { tools, uses } = &mut self.kind {
            *uses += u64::from(tool.remaining_uses());
            tools.push(tool);
            self.total_input = 1;
        }
    }

    /// Mark `amount` as delegated to a sub-task. Restockable inputs never
    /// delegate.
    pub fn increase_to_craft(&mut self, amount: u64) {
        if self.delegates() {
            self.to_craft += amount;
        }
    }

    /// Whether a shortage of this input may be handed to a sub-task.
    pub fn delegates(&self) -> bool {
        !matches!(self.kind, InputKind::Restockable)
    }

    // -----------------------------------------------------------------------
    // Merging
    // -----------------------------------------------------------------------

    /// Fold another declaration of the same ingredient into this one. The
    /// per-craft quantities add up; the owning task rescales the needed
    /// amount afterwards.
    pub fn merge(&mut self, other: &Input) {
        self.quantity_per_craft += other.quantity_per_craft;
        self.amount_needed = self.quantity_per_craft;
    }
}
