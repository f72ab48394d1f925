//! Validation and planning for catalog admin operations.
//!
//! All functions here are pure: they take a catalog snapshot and produce
//! either a validated definition or a batch plan for the persistence
//! layer to apply atomically. Nothing in this module writes anything.

use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::types::{EndState, StatusCatalog, StatusDefinition};

/// Input for creating or replacing a status definition.
#[derive(Debug, Clone)]
pub struct NewStatusDefinition {
    /// Display name.
    pub label: String,
    /// Stable machine key, unique across the catalog.
    pub value: String,
    /// Display color.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
    /// Terminal subtype; `None` for ordinary statuses.
    pub end_state: Option<EndState>,
    /// Whether new orders start in this status.
    pub is_default: bool,
    /// Explicit position; appended after the last status when `None`.
    pub sort_order: Option<i32>,
}

/// A single sort-order assignment produced by reorder planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortAssignment {
    /// The definition to move.
    pub id: Uuid,
    /// Its new dense 1-based position.
    pub sort_order: i32,
}

/// A single default-flag assignment produced by set-default planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAssignment {
    /// The definition to change.
    pub id: Uuid,
    /// The new value of its default flag.
    pub is_default: bool,
}

/// Stateless rules for catalog admin operations.
pub struct CatalogAdmin;

impl CatalogAdmin {
    /// Validates a create and produces the definition to insert.
    ///
    /// Rejects a machine key or an explicit position already present in
    /// the catalog. When no position is given the definition is
    /// appended after the last one.
    pub fn prepare_create(
        catalog: &StatusCatalog,
        input: NewStatusDefinition,
    ) -> Result<StatusDefinition, CatalogError> {
        if catalog.find_by_value(&input.value).is_some() {
            return Err(CatalogError::DuplicateValue(input.value));
        }
        Self::check_sort_order_free(catalog, input.sort_order, None)?;

        Ok(StatusDefinition {
            id: Uuid::new_v4(),
            label: input.label,
            value: input.value,
            color: input.color,
            description: input.description,
            end_state: input.end_state,
            is_default: input.is_default,
            sort_order: input
                .sort_order
                .unwrap_or_else(|| catalog.max_sort_order() + 1),
        })
    }

    /// Validates an update and produces the replacement definition.
    ///
    /// The duplicate-value and duplicate-position checks exclude the
    /// record being updated.
    pub fn prepare_update(
        catalog: &StatusCatalog,
        id: Uuid,
        input: NewStatusDefinition,
    ) -> Result<StatusDefinition, CatalogError> {
        let existing = catalog.find_by_id(id).ok_or(CatalogError::NotFound(id))?;

        if catalog
            .find_by_value(&input.value)
            .is_some_and(|d| d.id != id)
        {
            return Err(CatalogError::DuplicateValue(input.value));
        }
        Self::check_sort_order_free(catalog, input.sort_order, Some(id))?;

        Ok(StatusDefinition {
            id,
            label: input.label,
            value: input.value,
            color: input.color,
            description: input.description,
            end_state: input.end_state,
            is_default: input.is_default,
            sort_order: input.sort_order.unwrap_or(existing.sort_order),
        })
    }

    /// Checks that an explicit position is not held by another record.
    fn check_sort_order_free(
        catalog: &StatusCatalog,
        sort_order: Option<i32>,
        exclude: Option<Uuid>,
    ) -> Result<(), CatalogError> {
        if let Some(position) = sort_order {
            let taken = catalog
                .definitions()
                .iter()
                .any(|d| d.sort_order == position && Some(d.id) != exclude);
            if taken {
                return Err(CatalogError::DuplicateSortOrder(position));
            }
        }
        Ok(())
    }

    /// Validates a delete against the orders still holding the status.
    ///
    /// # Errors
    /// * `CatalogError::NotFound` when the id is not in the catalog
    /// * `CatalogError::CannotDeleteDefault` for the default status
    /// * `CatalogError::StatusInUse` when any order still holds the status
    pub fn validate_delete(
        catalog: &StatusCatalog,
        id: Uuid,
        orders_with_status: u64,
    ) -> Result<(), CatalogError> {
        let def = catalog.find_by_id(id).ok_or(CatalogError::NotFound(id))?;

        if def.is_default {
            return Err(CatalogError::CannotDeleteDefault);
        }
        if orders_with_status > 0 {
            return Err(CatalogError::StatusInUse {
                value: def.value.clone(),
                count: orders_with_status,
            });
        }

        Ok(())
    }

    /// Plans a reorder as dense 1-based positions for the given sequence.
    ///
    /// The sequence must be a permutation of the whole catalog so the
    /// resulting sort orders can never be gapped or duplicated. The plan
    /// must be applied as a single atomic batch.
    pub fn plan_reorder(
        catalog: &StatusCatalog,
        ids: &[Uuid],
    ) -> Result<Vec<SortAssignment>, CatalogError> {
        if ids.len() != catalog.len() {
            return Err(CatalogError::IncompleteReorder {
                expected: catalog.len(),
                given: ids.len(),
            });
        }

        let mut seen = Vec::with_capacity(ids.len());
        let mut plan = Vec::with_capacity(ids.len());

        for (position, &id) in ids.iter().enumerate() {
            if catalog.find_by_id(id).is_none() {
                return Err(CatalogError::NotFound(id));
            }
            if seen.contains(&id) {
                return Err(CatalogError::DuplicateReorderId(id));
            }
            seen.push(id);

            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            plan.push(SortAssignment {
                id,
                sort_order: position as i32 + 1,
            });
        }

        Ok(plan)
    }

    /// Plans a set-default as the minimal batch of flag changes.
    ///
    /// Applied atomically, the plan leaves exactly one default: the
    /// given definition gains the flag and every other holder loses it.
    pub fn plan_set_default(
        catalog: &StatusCatalog,
        id: Uuid,
    ) -> Result<Vec<DefaultAssignment>, CatalogError> {
        if catalog.find_by_id(id).is_none() {
            return Err(CatalogError::NotFound(id));
        }

        let mut plan = Vec::new();
        for def in catalog.definitions() {
            if def.id == id && !def.is_default {
                plan.push(DefaultAssignment {
                    id: def.id,
                    is_default: true,
                });
            } else if def.id != id && def.is_default {
                plan.push(DefaultAssignment {
                    id: def.id,
                    is_default: false,
                });
            }
        }

        Ok(plan)
    }
}
