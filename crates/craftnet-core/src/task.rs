//! Task construction and recursive resolution.
//!
//! A [`Task`] is built once from a producing pattern and a requested amount:
//! construction merges the pattern's raw ingredient/output declarations into
//! distinct [`Input`]/[`Output`] entries and computes how many pattern
//! iterations are needed. [`TaskArena::calculate`] then walks the merged
//! inputs against storage, spawns sub-tasks for shortages that have a
//! producing pattern, and returns a [`CalculationResult`] describing the full
//! tree delta plus anything that could not be produced at all.

use crate::id::TaskId;
use crate::input::{Ingredient, Input, InputKind};
use crate::output::Output;
use crate::pattern::{Pattern, PatternRegistry};
use crate::stack::{FluidStack, ItemStack, StackMatch};
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that reject a pattern at task-construction time.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The pattern's own validity flag is unset.
    #[error("pattern is not valid and cannot back a task")]
    InvalidPattern,
    /// The boundary precondition: a request for nothing is a caller bug.
    #[error("requested amount must be greater than zero")]
    ZeroAmount,
    /// The pattern yields zero units of the requested kind per craft, so the
    /// iteration count is undefined. Rejected before any division happens.
    #[error("pattern yields nothing of the requested kind per craft")]
    NoYield,
}

// ---------------------------------------------------------------------------
// Requests and task kinds
// ---------------------------------------------------------------------------

/// Which kind of product the requester asked for. Decides which group of
/// outputs drives the iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Item,
    Fluid,
}

/// Execution-phase state, dispatched through [`Task::advance`]. The variants
/// only differ in how the per-tick engine performs work; resolution treats
/// them identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Instantaneous craft: one iteration completes per tick.
    Crafting { completed: u64 },
    /// Multi-tick machine process: iterations are dispatched into the
    /// machine, then finish on later ticks.
    Processing { dispatched: u64, finished: u64 },
}

/// Progress report from [`Task::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Complete,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One node of a production tree: a pattern, the merged requirements to run
/// it, and how many iterations are batched together.
///
/// Parent links are informational back-references only. Ownership flows
/// top-down through the [`CalculationResult`] task lists and the owning
/// [`TaskArena`]; parent handles must never be used to walk "down".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pattern: Pattern,
    kind: TaskKind,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    parents: Vec<TaskId>,
    /// Resolved iteration count: how many times the pattern must run.
    iterations: u64,
    valid: bool,
}

impl Task {
    /// Build a task from a pattern and a requested amount.
    ///
    /// Normalizes the pattern's ingredient/output lists into merged inputs
    /// and outputs, classifies durability inputs, and computes the iteration
    /// count as `ceil(requested / smallest_per_craft_yield)` over the outputs
    /// matching the requested kind. Every merged input's needed amount is
    /// then scaled to `iterations * quantity_per_craft`.
    pub fn new(pattern: Pattern, requested: u64, request: RequestKind) -> Result<Self, TaskError> {
        if requested == 0 {
            return Err(TaskError::ZeroAmount);
        }
        if !pattern.valid {
            return Err(TaskError::InvalidPattern);
        }

        let mut inputs: Vec<Input> = Vec::new();
        for group in &pattern.item_inputs {
            let Some(first) = group.first() else {
                continue;
            };
            // A lone damageable candidate that reappears as a byproduct with
            // exactly one more point of damage is a tool worn by the craft,
            // not consumed by it. Damageable items are never oredicted.
            let durability = !pattern.processing
                && group.len() < 2
                && first.is_damageable()
                && pattern.byproducts.iter().any(|b| {
                    b.matches(first, StackMatch::IgnoreDamage) && b.damage == first.damage + 1
                });

            let new_input = if durability {
                Input::durability(*first, pattern.oredict)
            } else {
                Input::items(group.clone(), pattern.oredict)
            };
            merge_input(&mut inputs, new_input);
        }
        for fluid in &pattern.fluid_inputs {
            merge_input(&mut inputs, Input::fluid(*fluid, pattern.oredict));
        }

        let mut outputs: Vec<Output> = Vec::new();
        for stack in &pattern.item_outputs {
            merge_output(&mut outputs, Output::item(*stack));
        }
        for stack in &pattern.fluid_outputs {
            merge_output(&mut outputs, Output::fluid(*stack));
        }

        // The smallest per-craft yield of the requested kind limits how much
        // one iteration is guaranteed to produce.
        let smallest = outputs
            .iter()
            .filter(|o| o.is_fluid() == matches!(request, RequestKind::Fluid))
            .map(Output::quantity_per_craft)
            .min()
            .filter(|&q| q > 0)
            .ok_or(TaskError::NoYield)?;
        let iterations = requested.div_ceil(smallest);

        for input in &mut inputs {
            input.set_amount_needed(iterations * input.quantity_per_craft());
        }

        let kind = if pattern.processing {
            TaskKind::Processing {
                dispatched: 0,
                finished: 0,
            }
        } else {
            TaskKind::Crafting { completed: 0 }
        };

        Ok(Self {
            pattern,
            kind,
            inputs,
            outputs,
            parents: Vec::new(),
            iterations,
            valid: true,
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.kind, TaskKind::Processing { .. })
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn parents(&self) -> &[TaskId] {
        &self.parents
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Record a parent back-reference. Informational only.
    pub fn add_parent(&mut self, parent: TaskId) {
        self.parents.push(parent);
    }

    /// Advance execution-phase state by one tick.
    ///
    /// The surrounding execution engine calls this each tick and is
    /// responsible for physically moving the produced stacks; the task only
    /// maintains the progress counters it owns.
    pub fn advance(&mut self) -> TaskStatus {
        match &mut self.kind {
            TaskKind::Crafting { completed } => {
                if *completed < self.iterations {
                    *completed += 1;
                }
                if *completed >= self.iterations {
                    TaskStatus::Complete
                } else {
                    TaskStatus::Running
                }
            }
            TaskKind::Processing {
                dispatched,
                finished,
            } => {
                if *dispatched < self.iterations {
                    *dispatched += 1;
                } else if *finished < *dispatched {
                    *finished += 1;
                }
                if *finished >= self.iterations {
                    TaskStatus::Complete
                } else {
                    TaskStatus::Running
                }
            }
        }
    }
}

/// Fold `new` into `list`, merging with the first entry that describes the
/// same ingredient instead of appending a duplicate.
fn merge_input(list: &mut Vec<Input>, new: Input) {
    if let Some(existing) = list.iter_mut().find(|i| i.same_ingredient(&new)) {
        existing.merge(&new);
    } else {
        list.push(new);
    }
}

fn merge_output(list: &mut Vec<Output>, new: Output) {
    if let Some(existing) = list.iter_mut().find(|o| o.same_product(&new)) {
        existing.merge(&new);
    } else {
        list.push(new);
    }
}

// ---------------------------------------------------------------------------
// Calculation result
// ---------------------------------------------------------------------------

/// Aggregated delta of one resolution pass: the sub-tasks it spawned
/// (flattened, not nested) and the shortages it could not cover.
///
/// Duplicate shortages across sibling inputs can appear; nothing deduplicates
/// at this layer and consumers must tolerate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationResult {
    pub new_tasks: Vec<TaskId>,
    pub missing_items: Vec<ItemStack>,
    pub missing_fluids: Vec<FluidStack>,
}

impl CalculationResult {
    /// Append another result's lists onto this one, preserving order.
    pub fn merge(&mut self, other: CalculationResult) {
        self.new_tasks.extend(other.new_tasks);
        self.missing_items.extend(other.missing_items);
        self.missing_fluids.extend(other.missing_fluids);
    }
}

// ---------------------------------------------------------------------------
// Task arena and resolution
// ---------------------------------------------------------------------------

/// Owning collection of all tasks, indexed by handle.
///
/// The arena is the single owner: result lists and parent links carry plain
/// [`TaskId`]s, so a finished tree can be torn down here without dangling
/// references anywhere.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskArena {
    tasks: SlotMap<TaskId, Task>,
}

impl TaskArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: Task) -> TaskId {
        self.tasks.insert(task)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.remove(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter()
    }

    /// Build a root task for `requested` units and resolve it in one pass.
    ///
    /// Returns the root handle and the resolution delta. The root itself is
    /// not listed in `new_tasks`; only spawned sub-tasks are.
    pub fn request(
        &mut self,
        pattern: Pattern,
        requested: u64,
        request: RequestKind,
        storage: &mut dyn Storage,
        patterns: &dyn PatternRegistry,
    ) -> Result<(TaskId, CalculationResult), TaskError> {
        let root = Task::new(pattern, requested, request)?;
        let id = self.tasks.insert(root);
        let result = self.calculate(id, storage, patterns);
        Ok((id, result))
    }

    /// Resolve a single task: per merged input, extract from stock, delegate
    /// the remainder to a producing sub-task when one exists, and record the
    /// irreducible shortage otherwise.
    ///
    /// Must be called exactly once per task; a second call would extract and
    /// delegate on top of already-satisfied inputs. No cycle guard is applied
    /// here -- recursion depth is bounded by the pattern dependency depth,
    /// and callers with potentially cyclic catalogs must impose their own
    /// guard.
    pub fn calculate(
        &mut self,
        id: TaskId,
        storage: &mut dyn Storage,
        patterns: &dyn PatternRegistry,
    ) -> CalculationResult {
        let mut result = CalculationResult::default();
        let Some(task) = self.tasks.get_mut(id) else {
            return result;
        };
        // Inputs move out of the task while the pass runs so sub-tasks can be
        // inserted into the arena mid-loop.
        let mut inputs = std::mem::take(&mut task.inputs);

        for input in &mut inputs {
            extract_from_stock(input, storage);

            if input.amount_missing() > 0 && input.delegates() {
                let found = match input.ingredient() {
                    Ingredient::Item { .. } => input
                        .representative_item()
                        .and_then(|rep| patterns.pattern_for_item(&rep)),
                    Ingredient::Fluid(stack) => patterns.pattern_for_fluid(stack),
                };
                if let Some(child_pattern) = found.filter(|p| p.valid).cloned() {
                    let missing = input.amount_missing();
                    let request = if input.is_fluid() {
                        RequestKind::Fluid
                    } else {
                        RequestKind::Item
                    };
                    match Task::new(child_pattern, missing, request) {
                        Ok(mut child) => {
                            child.add_parent(id);
                            let child_id = self.tasks.insert(child);
                            debug!(?child_id, missing, "delegating shortage to sub-task");
                            let child_result = self.calculate(child_id, storage, patterns);
                            // The sub-task is trusted to supply the full
                            // remainder; no re-validation here.
                            input.increase_to_craft(missing);
                            result.new_tasks.push(child_id);
                            result.merge(child_result);
                        }
                        // A malformed producing pattern is treated exactly
                        // like no pattern at all.
                        Err(err) => debug!(%err, "skipping unusable producing pattern"),
                    }
                }
            }

            let missing = input.amount_missing();
            if missing > 0 {
                // The transport layer counts stacks in 32 bits: clamp, never
                // wrap.
                let clamped = u32::try_from(missing).unwrap_or(u32::MAX);
                match input.ingredient() {
                    Ingredient::Item { .. } => {
                        if let Some(rep) = input.representative_item() {
                            result.missing_items.push(rep.with_count(clamped));
                        }
                    }
                    Ingredient::Fluid(stack) => {
                        let mut shortage = *stack;
                        shortage.amount = clamped;
                        result.missing_fluids.push(shortage);
                    }
                }
                trace!(missing, "recorded shortage");
            }
        }

        if let Some(task) = self.tasks.get_mut(id) {
            task.inputs = inputs;
        }
        result
    }
}

/// Step 1 of resolution: satisfy an input directly from storage.
fn extract_from_stock(input: &mut Input, storage: &mut dyn Storage) {
    if matches!(input.kind(), InputKind::Durability { .. }) {
        let Some(template) = input.representative_item() else {
            return;
        };
        // Tools are pulled one physical item at a time, at any wear level,
        // exact tag required.
        while input.amount_missing() > 0 {
            match storage.extract_item(&template, 1, StackMatch::IgnoreDamage) {
                Some(tool) => input.add_tool(tool),
                None => break,
            }
        }
        return;
    }

    match input.ingredient() {
        Ingredient::Item { .. } => {
            let alternatives: Vec<ItemStack> = input.alternatives().to_vec();
            for alternative in alternatives {
                let missing = input.amount_missing();
                if missing == 0 {
                    break;
                }
                let want = u32::try_from(missing).unwrap_or(u32::MAX);
                let Some(extracted) = storage.extract_item(&alternative, want, StackMatch::Exact)
                else {
                    continue;
                };
                if extracted.count == 0 {
                    continue;
                }
                trace!(count = extracted.count, "extracted ingredient from stock");
                let excess = input.accept(u64::from(extracted.count));
                if excess > 0 {
                    // Discrete packaging handed out more than asked for:
                    // compensate immediately.
                    let _ = storage.insert_item(&alternative, u32::try_from(excess).unwrap_or(u32::MAX));
                }
            }
        }
        Ingredient::Fluid(stack) => {
            let stack = *stack;
            let missing = input.amount_missing();
            if missing == 0 {
                return;
            }
            let want = u32::try_from(missing).unwrap_or(u32::MAX);
            let drained = storage.extract_fluid(&stack, want);
            if drained > 0 {
                trace!(drained, "extracted fluid from stock");
                let excess = input.accept(u64::from(drained));
                if excess > 0 {
                    let _ = storage.insert_fluid(&stack, u32::try_from(excess).unwrap_or(u32::MAX));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::FluidId;
    use crate::test_utils::*;

    #[test]
    fn construction_rejects_zero_request() {
        let pattern = crafting_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 4)]);
        let err = Task::new(pattern, 0, RequestKind::Item).unwrap_err();
        assert!(matches!(err, TaskError::ZeroAmount));
    }

    #[test]
    fn construction_rejects_invalid_pattern() {
        let mut pattern = crafting_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 4)]);
        pattern.valid = false;
        let err = Task::new(pattern, 1, RequestKind::Item).unwrap_err();
        assert!(matches!(err, TaskError::InvalidPattern));
    }

    #[test]
    fn construction_rejects_zero_yield_before_division() {
        // Requesting a fluid from an item-only pattern has no divisor.
        let pattern = crafting_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 4)]);
        let err = Task::new(pattern, 10, RequestKind::Fluid).unwrap_err();
        assert!(matches!(err, TaskError::NoYield));
    }

    #[test]
    fn iteration_count_is_ceiling_of_request_over_yield() {
        let pattern = crafting_pattern(vec![vec![item(log(), 2)]], vec![item(plank(), 3)]);
        let task = Task::new(pattern, 10, RequestKind::Item).unwrap();
        assert_eq!(task.iterations(), 4);
        // Every merged input scales by the iteration count.
        assert_eq!(task.inputs()[0].amount_needed(), 8);
    }

    #[test]
    fn smallest_output_of_requested_kind_drives_iterations() {
        let mut pattern = crafting_pattern(
            vec![vec![item(log(), 1)]],
            vec![item(plank(), 6), item(stick(), 2)],
        );
        pattern.fluid_outputs.push(FluidStack::new(FluidId(9), 50));
        let task = Task::new(pattern.clone(), 10, RequestKind::Item).unwrap();
        // Limited by the stick yield of 2, not the plank yield of 6.
        assert_eq!(task.iterations(), 5);

        let fluid_task = Task::new(pattern, 120, RequestKind::Fluid).unwrap();
        assert_eq!(fluid_task.iterations(), 3);
    }

    #[test]
    fn duplicate_declarations_merge_into_one_input() {
        let pattern = crafting_pattern(
            vec![vec![item(log(), 1)], vec![item(log(), 1)], vec![item(stick(), 2)]],
            vec![item(plank(), 1)],
        );
        let task = Task::new(pattern, 3, RequestKind::Item).unwrap();
        assert_eq!(task.inputs().len(), 2);
        let log_input = &task.inputs()[0];
        assert_eq!(log_input.quantity_per_craft(), 2);
        assert_eq!(log_input.amount_needed(), 6);
    }

    #[test]
    fn duplicate_outputs_merge_too() {
        let pattern = crafting_pattern(
            vec![vec![item(log(), 1)]],
            vec![item(plank(), 2), item(plank(), 2)],
        );
        let task = Task::new(pattern, 4, RequestKind::Item).unwrap();
        assert_eq!(task.outputs().len(), 1);
        assert_eq!(task.outputs()[0].quantity_per_craft(), 4);
        assert_eq!(task.iterations(), 1);
    }

    #[test]
    fn durability_classification_needs_byproduct_one_damage_higher() {
        let axe = ItemStack::damageable(axe(), 1, 3, 60);
        let mut pattern = crafting_pattern(
            vec![vec![axe], vec![item(log(), 1)]],
            vec![item(plank(), 4)],
        );
        pattern.byproducts.push(axe.with_damage(4));
        let task = Task::new(pattern, 100, RequestKind::Item).unwrap();

        let tool_input = task
            .inputs()
            .iter()
            .find(|i| matches!(i.kind(), InputKind::Durability { .. }))
            .expect("axe should classify as durability input");
        assert_eq!(tool_input.amount_needed(), 1);
    }

    #[test]
    fn durability_classification_rejected_for_processing_patterns() {
        let axe = ItemStack::damageable(axe(), 1, 3, 60);
        let mut pattern = processing_pattern(vec![vec![axe]], vec![item(plank(), 4)]);
        pattern.byproducts.push(axe.with_damage(4));
        let task = Task::new(pattern, 10, RequestKind::Item).unwrap();
        assert!(matches!(task.inputs()[0].kind(), InputKind::Standard));
    }

    #[test]
    fn durability_classification_rejected_with_wrong_damage_delta() {
        let axe = ItemStack::damageable(axe(), 1, 3, 60);
        let mut pattern = crafting_pattern(vec![vec![axe]], vec![item(plank(), 4)]);
        pattern.byproducts.push(axe.with_damage(6));
        let task = Task::new(pattern, 10, RequestKind::Item).unwrap();
        assert!(matches!(task.inputs()[0].kind(), InputKind::Standard));
    }

    #[test]
    fn crafting_advance_completes_after_iterations() {
        let pattern = crafting_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 1)]);
        let mut task = Task::new(pattern, 3, RequestKind::Item).unwrap();
        assert_eq!(task.advance(), TaskStatus::Running);
        assert_eq!(task.advance(), TaskStatus::Running);
        assert_eq!(task.advance(), TaskStatus::Complete);
        assert_eq!(task.advance(), TaskStatus::Complete);
    }

    #[test]
    fn processing_advance_dispatches_then_finishes() {
        let pattern = processing_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 1)]);
        let mut task = Task::new(pattern, 2, RequestKind::Item).unwrap();
        assert!(task.is_processing());
        // Two ticks to dispatch, two more to finish.
        assert_eq!(task.advance(), TaskStatus::Running);
        assert_eq!(task.advance(), TaskStatus::Running);
        assert_eq!(task.advance(), TaskStatus::Running);
        assert_eq!(task.advance(), TaskStatus::Complete);
    }

    #[test]
    fn calculation_result_merge_preserves_order() {
        let mut a = CalculationResult {
            missing_items: vec![item(log(), 1)],
            ..CalculationResult::default()
        };
        let b = CalculationResult {
            missing_items: vec![item(stick(), 2), item(plank(), 3)],
            missing_fluids: vec![FluidStack::new(FluidId(0), 5)],
            ..CalculationResult::default()
        };
        a.merge(b);
        assert_eq!(
            a.missing_items,
            vec![item(log(), 1), item(stick(), 2), item(plank(), 3)]
        );
        assert_eq!(a.missing_fluids.len(), 1);
    }

    #[test]
    fn calculate_on_unknown_handle_is_empty() {
        let mut arena = TaskArena::new();
        let pattern = crafting_pattern(vec![vec![item(log(), 1)]], vec![item(plank(), 1)]);
        let id = arena.insert(Task::new(pattern, 1, RequestKind::Item).unwrap());
        arena.remove(id).unwrap();

        let mut storage = MemoryStorage::new();
        let catalog = crate::pattern::PatternCatalog::new();
        let result = arena.calculate(id, &mut storage, &catalog);
        assert_eq!(result, CalculationResult::default());
    }
}
