use crate::stack::{FluidStack, ItemStack, StackMatch};
use serde::{Deserialize, Serialize};

/// The product side of an output: one item stack or one fluid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Product {
    Item(ItemStack),
    Fluid(FluidStack),
}

/// One distinct product of a task and how much of it one pattern iteration
/// yields. Duplicate declarations within a pattern fold into a single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    product: Product,
    quantity_per_craft: u64,
}

impl Output {
    pub fn item(stack: ItemStack) -> Self {
        Self {
            product: Product::Item(stack),
            quantity_per_craft: u64::from(stack.count),
        }
    }

    pub fn fluid(stack: FluidStack) -> Self {
        Self {
            product: Product::Fluid(stack),
            quantity_per_craft: u64::from(stack.amount),
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn is_fluid(&self) -> bool {
        matches!(self.product, Product::Fluid(_))
    }

    pub fn quantity_per_craft(&self) -> u64 {
        self.quantity_per_craft
    }

    /// Whether two outputs describe the same product. Items compare exactly
    /// (damage and tag included); fluids compare by type.
    pub fn same_product(&self, other: &Output) -> bool {
        match (&self.product, &other.product) {
            (Product::Item(a), Product::Item(b)) => a.matches(b, StackMatch::Exact),
            (Product::Fluid(a), Product::Fluid(b)) => a.same_fluid(b),
            _ => false,
        }
    }

    /// Fold another declaration of the same product into this one.
    pub fn merge(&mut self, other: &Output) {
        self.quantity_per_craft += other.quantity_per_craft;
    }
}
