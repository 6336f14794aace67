use crate::stack::{FluidStack, ItemStack, StackMatch};
use serde::{Deserialize, Serialize};

/// A recipe-like production pattern.
///
/// Item inputs are grouped: each group is a list of mutually-substitutable
/// stacks filling one ingredient slot ("any of these"). Outputs and
/// byproducts are flat. The flags mirror the pattern provider this engine
/// consumes: `processing` marks a multi-tick machine process as opposed to an
/// instantaneous craft, `oredict` enables alternative matching within a
/// group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub item_inputs: Vec<Vec<ItemStack>>,
    pub fluid_inputs: Vec<FluidStack>,
    pub item_outputs: Vec<ItemStack>,
    pub fluid_outputs: Vec<FluidStack>,
    /// Leftovers returned alongside the outputs (empty buckets, worn tools).
    pub byproducts: Vec<ItemStack>,
    pub processing: bool,
    pub oredict: bool,
    pub valid: bool,
}

impl Pattern {
    /// Whether this pattern produces anything at all of the requested kind.
    pub fn yields_item(&self, stack: &ItemStack) -> bool {
        self.item_outputs
            .iter()
            .any(|out| out.matches(stack, StackMatch::Exact))
    }

    pub fn yields_fluid(&self, stack: &FluidStack) -> bool {
        self.fluid_outputs.iter().any(|out| out.same_fluid(stack))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern declares no outputs")]
    NoOutputs,
    #[error("pattern has an empty item input group")]
    EmptyInputGroup,
    #[error("pattern output has zero quantity")]
    ZeroQuantityOutput,
}

impl Pattern {
    /// Structural validation. A pattern that fails here must never be handed
    /// to task construction with `valid` set.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.item_outputs.is_empty() && self.fluid_outputs.is_empty() {
            return Err(PatternError::NoOutputs);
        }
        if self.item_inputs.iter().any(Vec::is_empty) {
            return Err(PatternError::EmptyInputGroup);
        }
        let zero_item = self.item_outputs.iter().any(|o| o.count == 0);
        let zero_fluid = self.fluid_outputs.iter().any(|o| o.amount == 0);
        if zero_item || zero_fluid {
            return Err(PatternError::ZeroQuantityOutput);
        }
        Ok(())
    }
}

/// Maps a desired stack or fluid to a producing pattern.
///
/// The lookup returns the first matching pattern, not the cheapest; cost
/// optimization across alternative recipes is explicitly not this engine's
/// job.
pub trait PatternRegistry {
    fn pattern_for_item(&self, stack: &ItemStack) -> Option<&Pattern>;
    fn pattern_for_fluid(&self, stack: &FluidStack) -> Option<&Pattern>;
}

/// Vec-backed first-match registry. Suitable as the in-process default; a
/// network-wide crafting manager can implement [`PatternRegistry`] directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl PatternRegistry for PatternCatalog {
    fn pattern_for_item(&self, stack: &ItemStack) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.yields_item(stack))
    }

    fn pattern_for_fluid(&self, stack: &FluidStack) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.yields_fluid(stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{FluidId, ItemId};

    fn plank_pattern() -> Pattern {
        Pattern {
            item_inputs: vec![vec![ItemStack::new(ItemId(0), 1)]],
            item_outputs: vec![ItemStack::new(ItemId(1), 4)],
            valid: true,
            ..Pattern::default()
        }
    }

    #[test]
    fn catalog_finds_first_matching_pattern() {
        let mut catalog = PatternCatalog::new();
        catalog.add(plank_pattern());
        let mut second = plank_pattern();
        second.item_outputs[0].count = 8;
        catalog.add(second);

        let found = catalog
            .pattern_for_item(&ItemStack::new(ItemId(1), 1))
            .unwrap();
        assert_eq!(found.item_outputs[0].count, 4);
    }

    #[test]
    fn catalog_misses_unknown_outputs() {
        let mut catalog = PatternCatalog::new();
        catalog.add(plank_pattern());
        assert!(catalog.pattern_for_item(&ItemStack::new(ItemId(9), 1)).is_none());
        assert!(catalog
            .pattern_for_fluid(&FluidStack::new(FluidId(0), 1))
            .is_none());
    }

    #[test]
    fn item_lookup_is_exact_on_damage_and_tag() {
        let mut catalog = PatternCatalog::new();
        let mut p = plank_pattern();
        p.item_outputs[0].tag = Some(3);
        catalog.add(p);
        assert!(catalog.pattern_for_item(&ItemStack::new(ItemId(1), 1)).is_none());
        assert!(catalog
            .pattern_for_item(&ItemStack::new(ItemId(1), 1).with_tag(3))
            .is_some());
    }

    #[test]
    fn validate_rejects_malformed_patterns() {
        let empty = Pattern::default();
        assert!(matches!(empty.validate(), Err(PatternError::NoOutputs)));

        let mut no_group = plank_pattern();
        no_group.item_inputs.push(vec![]);
        assert!(matches!(
            no_group.validate(),
            Err(PatternError::EmptyInputGroup)
        ));

        let mut zero = plank_pattern();
        zero.item_outputs[0].count = 0;
        assert!(matches!(
            zero.validate(),
            Err(PatternError::ZeroQuantityOutput)
        ));

        assert!(plank_pattern().validate().is_ok());
    }
}
