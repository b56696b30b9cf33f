use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::commands::ModuleCommand;
use super::errors::OrderingError;
use super::value_objects::{Module, ModuleChanges};

// ============================================================================
// Module Ordering Engine
// ============================================================================
//
// Pure functions over a course's module list. Every mutation takes the
// current slice and returns the complete next-state list, sorted by order.
//
// Invariant: the orders of a non-empty list are exactly {1..N}, N = len,
// and no module id appears twice. Inserted or renamed modules must not take
// a title another module of the list already holds.
//
// ============================================================================

/// Rank the next appended module receives.
pub fn next_order(modules: &[Module]) -> i32 {
    modules.len() as i32 + 1
}

/// Check the contiguity invariant and id uniqueness.
pub fn validate_sequence(modules: &[Module]) -> Result<(), OrderingError> {
    let mut ids = HashSet::with_capacity(modules.len());
    for module in modules {
        if !ids.insert(module.id) {
            return Err(OrderingError::DuplicateModuleId(module.id));
        }
    }

    let mut orders: Vec<i32> = modules.iter().map(|m| m.order).collect();
    orders.sort_unstable();

    for (index, &order) in orders.iter().enumerate() {
        let expected = index as i32 + 1;
        if order == expected {
            continue;
        }
        if index > 0 && orders[index - 1] == order {
            return Err(OrderingError::DuplicateOrder(order));
        }
        return Err(OrderingError::OrderGap { expected, found: order });
    }

    Ok(())
}

/// Append a module at the end of the sequence. Any order carried by
/// `module` is ignored.
pub fn insert(modules: &[Module], mut module: Module) -> Result<Vec<Module>, OrderingError> {
    validate_sequence(modules)?;

    if modules.iter().any(|m| m.id == module.id) {
        return Err(OrderingError::DuplicateModuleId(module.id));
    }
    ensure_title_free(modules, &module.title, module.id)?;

    module.order = next_order(modules);

    let mut next = modules.to_vec();
    next.push(module);
    Ok(sorted(next))
}

/// Move one module to `new_order`, shifting the window of siblings between
/// its old and new rank by one.
pub fn relocate(
    modules: &[Module],
    module_id: Uuid,
    new_order: i32,
) -> Result<Vec<Module>, OrderingError> {
    validate_sequence(modules)?;

    let old_order = modules[position(modules, module_id)?].order;
    let max = modules.len() as i32;
    if new_order < 1 || new_order > max {
        return Err(OrderingError::OrderOutOfRange { requested: new_order, max });
    }

    let mut next = modules.to_vec();
    for module in next.iter_mut() {
        if module.id == module_id {
            module.order = new_order;
        } else if new_order < old_order && (new_order..old_order).contains(&module.order) {
            module.order += 1;
        } else if new_order > old_order && (old_order + 1..=new_order).contains(&module.order) {
            module.order -= 1;
        }
    }

    Ok(sorted(next))
}

/// Drop one module and close the gap it leaves.
pub fn remove(modules: &[Module], module_id: Uuid) -> Result<Vec<Module>, OrderingError> {
    validate_sequence(modules)?;

    let removed_order = modules[position(modules, module_id)?].order;

    let next = modules
        .iter()
        .filter(|m| m.id != module_id)
        .cloned()
        .map(|mut m| {
            if m.order > removed_order {
                m.order -= 1;
            }
            m
        })
        .collect();

    Ok(sorted(next))
}

/// Apply content changes and, when the requested order differs from the
/// current one, a move. Without an order change sibling ranks are untouched.
pub fn revise(
    modules: &[Module],
    module_id: Uuid,
    changes: &ModuleChanges,
    revised_at: DateTime<Utc>,
) -> Result<Vec<Module>, OrderingError> {
    validate_sequence(modules)?;

    let current_order = modules[position(modules, module_id)?].order;
    if let Some(title) = changes.effective_title() {
        ensure_title_free(modules, title, module_id)?;
    }

    let mut next = match changes.order.filter(|&order| order != current_order) {
        Some(new_order) => relocate(modules, module_id, new_order)?,
        None => modules.to_vec(),
    };

    if let Some(target) = next.iter_mut().find(|m| m.id == module_id) {
        if let Some(title) = changes.effective_title() {
            target.title = title.to_string();
        }
        if let Some(description) = changes.effective_description() {
            target.description = description.to_string();
        }
        if let Some(data) = &changes.data {
            target.data = data.clone();
        }
        target.updated_at = revised_at;
    }

    Ok(next)
}

/// Rebuild a contiguous sequence from a damaged one. Modules keep their
/// relative order (ties broken by creation time); repeated ids keep their
/// first occurrence.
pub fn renumber(modules: &[Module]) -> Vec<Module> {
    let mut seen = HashSet::with_capacity(modules.len());
    let mut next: Vec<Module> = modules
        .iter()
        .filter(|m| seen.insert(m.id))
        .cloned()
        .collect();

    next.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
    for (index, module) in next.iter_mut().enumerate() {
        module.order = index as i32 + 1;
    }
    next
}

/// Dispatch a command to the matching computation.
pub fn apply(modules: &[Module], command: &ModuleCommand) -> Result<Vec<Module>, OrderingError> {
    match command {
        ModuleCommand::Append { module } => insert(modules, module.clone()),
        ModuleCommand::Revise { module_id, changes, revised_at } => {
            revise(modules, *module_id, changes, *revised_at)
        }
        ModuleCommand::Remove { module_id } => remove(modules, *module_id),
        ModuleCommand::Renumber => Ok(renumber(modules)),
    }
}

fn position(modules: &[Module], module_id: Uuid) -> Result<usize, OrderingError> {
    modules
        .iter()
        .position(|m| m.id == module_id)
        .ok_or(OrderingError::ModuleNotFound(module_id))
}

fn ensure_title_free(modules: &[Module], title: &str, owner: Uuid) -> Result<(), OrderingError> {
    match modules.iter().find(|m| m.title == title && m.id != owner) {
        Some(holder) => Err(OrderingError::DuplicateTitle {
            title: title.to_string(),
            held_by: holder.id,
        }),
        None => Ok(()),
    }
}

fn sorted(mut modules: Vec<Module>) -> Vec<Module> {
    modules.sort_by_key(|m| m.order);
    modules
}

// ============================================================================
// Unit Tests
// ============================================================================
