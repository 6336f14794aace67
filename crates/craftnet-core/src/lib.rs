//! Craftnet Core -- recursive autocrafting resolution for item-and-fluid
//! storage networks.
//!
//! Given a request for N units of some item or fluid, the engine determines
//! how to obtain them: extract what is already stocked, spawn sub-tasks for
//! anything a producing pattern exists for, and report what cannot be
//! produced at all.
//!
//! # Resolution Pipeline
//!
//! 1. **Construction** -- [`task::Task::new`] normalizes a pattern's raw
//!    ingredient/output declarations into merged [`input::Input`] and
//!    [`output::Output`] collections and computes the iteration count as
//!    `ceil(requested / smallest_per_craft_yield)`.
//! 2. **Resolution** -- [`task::TaskArena::calculate`] walks each merged
//!    input: direct extraction from [`storage::Storage`], then delegation to
//!    a sub-task found through [`pattern::PatternRegistry`], then shortage
//!    recording. One synchronous recursive pass, depth-bounded by the pattern
//!    dependency depth.
//! 3. **Execution** -- the resolved tree is handed to an external per-tick
//!    engine which drives [`task::Task::advance`] and moves produced stacks.
//!    That engine is out of this crate's scope.
//!
//! # Key Types
//!
//! - [`task::TaskArena`] -- owning arena of all tasks; parent links between
//!   tasks are plain handles, never ownership.
//! - [`task::CalculationResult`] -- flattened sub-task list plus item/fluid
//!   shortage lists, merged append-only across the recursion.
//! - [`input::Input`] -- one merged ingredient requirement with the
//!   `missing = needed - supplied - delegated` bookkeeping, in four variants
//!   (standard, durability, infinite, restockable).
//! - [`pattern::Pattern`] -- a recipe declaring grouped item-input
//!   alternatives, fluid inputs, outputs and byproducts.
//! - [`storage::Storage`] -- the external stock interface; extractions and
//!   compensating insertions are immediately effective.

pub mod id;
pub mod input;
pub mod output;
pub mod pattern;
pub mod stack;
pub mod storage;
pub mod task;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
