use crate::stack::{FluidStack, ItemStack, StackMatch};

/// The stock backend a resolution pass extracts from and compensates into.
///
/// Every call is immediately effective: there is no staging or commit phase,
/// and a successful extraction has already mutated the backing stock when the
/// call returns. Resolution assumes exclusive access for the duration of one
/// `calculate` pass; interleaved writers would make the running totals
/// inconsistent with what was actually taken.
pub trait Storage {
    /// Extract up to `max` items matching `template` under `mode`.
    ///
    /// Returns the concrete extracted stack (its `count` is the amount
    /// actually taken, its damage/tag reflect the physical stock), or `None`
    /// when nothing matched. Implementations that hand out fixed discrete
    /// batches may return more than `max`; the resolver re-inserts the
    /// excess immediately.
    fn extract_item(&mut self, template: &ItemStack, max: u32, mode: StackMatch) -> Option<ItemStack>;

    /// Insert `amount` items of `template`'s identity. Returns the amount
    /// actually accepted.
    #[must_use = "returns the amount actually accepted, which may be less than offered"]
    fn insert_item(&mut self, template: &ItemStack, amount: u32) -> u32;

    /// Extract up to `max` units of the given fluid. Returns the amount
    /// actually drained.
    fn extract_fluid(&mut self, template: &FluidStack, max: u32) -> u32;

    /// Insert `amount` units of the given fluid. Returns the amount actually
    /// accepted.
    #[must_use = "returns the amount actually accepted, which may be less than offered"]
    fn insert_fluid(&mut self, template: &FluidStack, amount: u32) -> u32;
}
