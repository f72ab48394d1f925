//! Status catalog repository.
//!
//! All admin mutations are planned by [`CatalogAdmin`] against a
//! catalog snapshot read inside the same transaction that writes the
//! result, so concurrent admin calls serialize on the database instead
//! of racing on stale snapshots.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use tapiz_core::catalog::{
    CatalogAdmin, CatalogError, EndState, NewStatusDefinition, StatusCatalog, StatusDefinition,
};

use crate::entities::{orders, status_definitions};

/// Error types for status catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum StatusCatalogError {
    /// A catalog business rule was violated.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Untyped input for creating or updating a status definition.
///
/// Carries the end-state flags as they arrive from the API; they are
/// promoted to a typed [`EndState`] before any rule runs.
#[derive(Debug, Clone)]
pub struct StatusDefinitionInput {
    /// Display name.
    pub label: String,
    /// Stable machine key.
    pub value: String,
    /// Display color.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the status is terminal.
    pub is_end_state: bool,
    /// Terminal subtype name; required when `is_end_state` is set.
    pub end_state_type: Option<String>,
    /// Whether new orders start in this status.
    pub is_default: bool,
    /// Explicit position; appended when absent.
    pub sort_order: Option<i32>,
}

impl StatusDefinitionInput {
    fn into_new_definition(self) -> Result<NewStatusDefinition, CatalogError> {
        let end_state = EndState::from_flags(self.is_end_state, self.end_state_type.as_deref())?;
        Ok(NewStatusDefinition {
            label: self.label,
            value: self.value,
            color: self.color,
            description: self.description,
            end_state,
            is_default: self.is_default,
            sort_order: self.sort_order,
        })
    }
}

/// Reads the full status catalog, ordered by sort order.
///
/// Generic over the connection so callers can read the snapshot inside
/// the transaction their decision writes in.
///
/// # Errors
///
/// Returns an error if the query fails or a row carries inconsistent
/// end-state flags.
pub async fn fetch_catalog<C: ConnectionTrait>(
    conn: &C,
) -> Result<StatusCatalog, StatusCatalogError> {
    let models = status_definitions::Entity::find()
        .order_by_asc(status_definitions::Column::SortOrder)
        .all(conn)
        .await?;

    let definitions = models
        .into_iter()
        .map(to_definition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StatusCatalog::new(definitions))
}

fn to_definition(model: status_definitions::Model) -> Result<StatusDefinition, CatalogError> {
    let end_state = EndState::from_flags(model.is_end_state, model.end_state_type.as_deref())?;
    Ok(StatusDefinition {
        id: model.id,
        label: model.label,
        value: model.value,
        color: model.color,
        description: model.description,
        end_state,
        is_default: model.is_default,
        sort_order: model.sort_order,
    })
}

/// Status catalog repository for admin operations.
#[derive(Debug, Clone)]
pub struct StatusCatalogRepository {
    db: DatabaseConnection,
}

impl StatusCatalogRepository {
    /// Creates a new status catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the current catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<StatusCatalog, StatusCatalogError> {
        fetch_catalog(&self.db).await
    }

    /// Creates a new status definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the machine key is already taken, the
    /// end-state flags are inconsistent, or the database write fails.
    pub async fn create(
        &self,
        input: StatusDefinitionInput,
    ) -> Result<StatusDefinition, StatusCatalogError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let definition = CatalogAdmin::prepare_create(&catalog, input.into_new_definition()?)?;

        if definition.is_default {
            clear_other_defaults(&txn, definition.id).await?;
        }

        let now = Utc::now().into();
        let model = status_definitions::ActiveModel {
            id: Set(definition.id),
            label: Set(definition.label.clone()),
            value: Set(definition.value.clone()),
            color: Set(definition.color.clone()),
            description: Set(definition.description.clone()),
            is_end_state: Set(definition.end_state.is_some()),
            end_state_type: Set(definition.end_state.map(|e| e.as_str().to_string())),
            is_default: Set(definition.is_default),
            sort_order: Set(definition.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&txn).await?;

        txn.commit().await?;
        Ok(definition)
    }

    /// Updates an existing status definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition does not exist, the machine
    /// key collides with another definition, or the write fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: StatusDefinitionInput,
    ) -> Result<StatusDefinition, StatusCatalogError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let definition = CatalogAdmin::prepare_update(&catalog, id, input.into_new_definition()?)?;

        if definition.is_default {
            clear_other_defaults(&txn, id).await?;
        }

        let model = status_definitions::ActiveModel {
            id: Set(id),
            label: Set(definition.label.clone()),
            value: Set(definition.value.clone()),
            color: Set(definition.color.clone()),
            description: Set(definition.description.clone()),
            is_end_state: Set(definition.end_state.is_some()),
            end_state_type: Set(definition.end_state.map(|e| e.as_str().to_string())),
            is_default: Set(definition.is_default),
            sort_order: Set(definition.sort_order),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        model.update(&txn).await?;

        txn.commit().await?;
        Ok(definition)
    }

    /// Deletes a status definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition does not exist, is the
    /// default, or is still held by any order.
    pub async fn delete(&self, id: Uuid) -> Result<(), StatusCatalogError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let definition = catalog
            .find_by_id(id)
            .ok_or(CatalogError::NotFound(id))?
            .clone();

        let in_use = orders::Entity::find()
            .filter(orders::Column::StatusValue.eq(&definition.value))
            .count(&txn)
            .await?;
        CatalogAdmin::validate_delete(&catalog, id, in_use)?;

        status_definitions::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Reorders the whole catalog to match the given id sequence.
    ///
    /// The sequence must be a permutation of every definition; the new
    /// dense positions are written as one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is not a full permutation or
    /// the write fails.
    pub async fn reorder(&self, ids: &[Uuid]) -> Result<StatusCatalog, StatusCatalogError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let plan = CatalogAdmin::plan_reorder(&catalog, ids)?;

        for assignment in plan {
            let model = status_definitions::ActiveModel {
                id: Set(assignment.id),
                sort_order: Set(assignment.sort_order),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            };
            model.update(&txn).await?;
        }

        let reordered = fetch_catalog(&txn).await?;
        txn.commit().await?;
        Ok(reordered)
    }

    /// Marks a definition as the single default status.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition does not exist or the write
    /// fails.
    pub async fn set_default(&self, id: Uuid) -> Result<StatusCatalog, StatusCatalogError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let plan = CatalogAdmin::plan_set_default(&catalog, id)?;

        for assignment in plan {
            let model = status_definitions::ActiveModel {
                id: Set(assignment.id),
                is_default: Set(assignment.is_default),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            };
            model.update(&txn).await?;
        }

        let updated = fetch_catalog(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

async fn clear_other_defaults<C: ConnectionTrait>(conn: &C, keep: Uuid) -> Result<(), DbErr> {
    status_definitions::Entity::update_many()
        .col_expr(
            status_definitions::Column::IsDefault,
            sea_orm::sea_query::Expr::value(false),
        )
        .filter(status_definitions::Column::IsDefault.eq(true))
        .filter(status_definitions::Column::Id.ne(keep))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn status_model(value: &str, sort_order: i32) -> status_definitions::Model {
        let now = Utc::now();
        status_definitions::Model {
            id: Uuid::new_v4(),
            label: value.to_uppercase(),
            value: value.to_string(),
            color: "#888888".to_string(),
            description: None,
            is_end_state: false,
            end_state_type: None,
            is_default: sort_order == 1,
            sort_order,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_reorder_rolls_back_when_a_write_fails() {
        let first = status_model("new", 1);
        let second = status_model("in-progress", 2);
        let ids = vec![second.id, first.id];

        let mut moved = second.clone();
        moved.sort_order = 1;

        // The snapshot read and the first write succeed; the second
        // write fails mid-batch.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![first, second]])
            .append_query_results([vec![moved]])
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let repo = StatusCatalogRepository::new(db.clone());
        let result = repo.reorder(&ids).await;
        assert!(matches!(result, Err(StatusCatalogError::Database(_))));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ROLLBACK"), "expected a rollback in {log}");
        assert!(!log.contains("COMMIT"), "nothing may commit in {log}");
    }

    #[tokio::test]
    async fn test_reorder_commits_when_every_write_lands() {
        let first = status_model("new", 1);
        let second = status_model("in-progress", 2);
        let ids = vec![second.id, first.id];

        let mut moved_second = second.clone();
        moved_second.sort_order = 1;
        let mut moved_first = first.clone();
        moved_first.sort_order = 2;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![first, second]])
            .append_query_results([vec![moved_second.clone()]])
            .append_query_results([vec![moved_first.clone()]])
            .append_query_results([vec![moved_second, moved_first]])
            .into_connection();

        let repo = StatusCatalogRepository::new(db.clone());
        let reordered = repo.reorder(&ids).await.unwrap();

        let values: Vec<_> = reordered
            .definitions()
            .iter()
            .map(|d| d.value.as_str())
            .collect();
        assert_eq!(values, ["in-progress", "new"]);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("COMMIT"), "expected a commit in {log}");
    }
}
