use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a task in the owning [`TaskArena`](crate::task::TaskArena).
    ///
    /// Parent links between tasks are plain `TaskId` handles: relation plus
    /// lookup, never ownership. Tearing a tree down through the arena can
    /// never dangle.
    pub struct TaskId;
}

/// Identifies an item type. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Identifies a fluid type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FluidId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_equality() {
        let a = ItemId(0);
        let b = ItemId(0);
        let c = ItemId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ItemId(0), "cobblestone");
        map.insert(ItemId(1), "iron_ingot");
        assert_eq!(map[&ItemId(1)], "iron_ingot");
    }
}
