//! `PostgreSQL` repository implementation for assignment rules.

use super::{
    models::{AssignmentRuleRow, NewAssignmentRuleRow, RotationRow},
    schema::assignment_rules,
};
use crate::assignment::{
    domain::{
        AssignmentFilters, AssignmentRule, AssignmentRuleId, AssignmentRuleName,
        AssignmentStrategy, PersistedAssignmentRuleData, UserId,
    },
    ports::{
        AssignmentRuleRepository, AssignmentRuleRepositoryError, AssignmentRuleRepositoryResult,
        RotationPick,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by assignment adapters.
pub type AssignmentPgPool = Pool<ConnectionManager<PgConnection>>;

/// Sentinel stored in `last_assigned_index` before the first pick.
const UNSET_CURSOR: i32 = -1;

/// `PostgreSQL`-backed assignment rule repository.
#[derive(Debug, Clone)]
pub struct PostgresAssignmentRuleRepository {
    pool: AssignmentPgPool,
}

impl PostgresAssignmentRuleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AssignmentRuleRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AssignmentRuleRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(AssignmentRuleRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AssignmentRuleRepositoryError::persistence)?
    }

    async fn load_rules(
        &self,
        active_only: bool,
    ) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>> {
        self.run_blocking(move |connection| {
            let mut query = assignment_rules::table
                .select(AssignmentRuleRow::as_select())
                .order((assignment_rules::created_at.asc(), assignment_rules::id.asc()))
                .into_boxed();
            if active_only {
                query = query.filter(assignment_rules::is_active.eq(true));
            }
            let rows = query
                .load::<AssignmentRuleRow>(connection)
                .map_err(AssignmentRuleRepositoryError::persistence)?;
            rows.into_iter().map(row_to_rule).collect()
        })
        .await
    }
}

#[async_trait]
impl AssignmentRuleRepository for PostgresAssignmentRuleRepository {
    async fn store(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()> {
        let rule_id = rule.id();
        let new_row = to_row(rule)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(assignment_rules::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AssignmentRuleRepositoryError::DuplicateRule(rule_id)
                    }
                    _ => AssignmentRuleRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<()> {
        let rule_id = rule.id();
        let row = to_row(rule)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                assignment_rules::table.filter(assignment_rules::id.eq(rule_id.into_inner())),
            )
            .set(&row)
            .execute(connection)
            .map_err(AssignmentRuleRepositoryError::persistence)?;

            if updated_count == 0 {
                return Err(AssignmentRuleRepositoryError::NotFound(rule_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: AssignmentRuleId,
    ) -> AssignmentRuleRepositoryResult<Option<AssignmentRule>> {
        self.run_blocking(move |connection| {
            let row = assignment_rules::table
                .filter(assignment_rules::id.eq(id.into_inner()))
                .select(AssignmentRuleRow::as_select())
                .first::<AssignmentRuleRow>(connection)
                .optional()
                .map_err(AssignmentRuleRepositoryError::persistence)?;
            row.map(row_to_rule).transpose()
        })
        .await
    }

    async fn list_all(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>> {
        self.load_rules(false).await
    }

    async fn list_active(&self) -> AssignmentRuleRepositoryResult<Vec<AssignmentRule>> {
        self.load_rules(true).await
    }

    async fn advance_rotation(
        &self,
        id: AssignmentRuleId,
        at: DateTime<Utc>,
    ) -> AssignmentRuleRepositoryResult<Option<RotationPick>> {
        self.run_blocking(move |connection| {
            // RETURNING sees the new cursor; arrays are 1-based.
            let rotated = diesel::sql_query(concat!(
                "UPDATE assignment_rules ",
                "SET last_assigned_index = ",
                "(last_assigned_index + 1) % cardinality(candidate_user_ids), ",
                "updated_at = $2 ",
                "WHERE id = $1 AND cardinality(candidate_user_ids) > 0 ",
                "RETURNING last_assigned_index, ",
                "candidate_user_ids[last_assigned_index + 1] AS user_id",
            ))
            .bind::<diesel::sql_types::Uuid, _>(id.into_inner())
            .bind::<diesel::sql_types::Timestamptz, _>(at)
            .get_result::<RotationRow>(connection)
            .optional()
            .map_err(AssignmentRuleRepositoryError::persistence)?;

            if let Some(row) = rotated {
                let index = usize::try_from(row.last_assigned_index)
                    .map_err(AssignmentRuleRepositoryError::persistence)?;
                return Ok(Some(RotationPick {
                    index,
                    user_id: UserId::from_uuid(row.user_id),
                }));
            }

            let exists = diesel::select(diesel::dsl::exists(
                assignment_rules::table.filter(assignment_rules::id.eq(id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(AssignmentRuleRepositoryError::persistence)?;
            if exists {
                Ok(None)
            } else {
                Err(AssignmentRuleRepositoryError::NotFound(id))
            }
        })
        .await
    }
}

fn to_row(rule: &AssignmentRule) -> AssignmentRuleRepositoryResult<NewAssignmentRuleRow> {
    let filters =
        serde_json::to_value(rule.filters()).map_err(AssignmentRuleRepositoryError::persistence)?;
    let last_assigned_index = rule
        .last_assigned_index()
        .map(i32::try_from)
        .transpose()
        .map_err(AssignmentRuleRepositoryError::persistence)?
        .unwrap_or(UNSET_CURSOR);

    Ok(NewAssignmentRuleRow {
        id: rule.id().into_inner(),
        name: rule.name().as_str().to_owned(),
        strategy: rule.strategy().as_str().to_owned(),
        candidate_user_ids: rule
            .candidates()
            .iter()
            .map(|user| user.into_inner())
            .collect(),
        filters,
        last_assigned_index,
        is_active: rule.is_active(),
        created_at: rule.created_at(),
        updated_at: rule.updated_at(),
    })
}

fn row_to_rule(row: AssignmentRuleRow) -> AssignmentRuleRepositoryResult<AssignmentRule> {
    let AssignmentRuleRow {
        id,
        name,
        strategy,
        candidate_user_ids,
        filters,
        last_assigned_index,
        is_active,
        created_at,
        updated_at,
    } = row;

    let cursor = if last_assigned_index == UNSET_CURSOR {
        None
    } else {
        Some(
            usize::try_from(last_assigned_index)
                .map_err(AssignmentRuleRepositoryError::persistence)?,
        )
    };

    let data = PersistedAssignmentRuleData {
        id: AssignmentRuleId::from_uuid(id),
        name: AssignmentRuleName::new(name).map_err(AssignmentRuleRepositoryError::persistence)?,
        strategy: AssignmentStrategy::try_from(strategy.as_str())
            .map_err(AssignmentRuleRepositoryError::persistence)?,
        candidates: candidate_user_ids.into_iter().map(UserId::from_uuid).collect(),
        filters: serde_json::from_value::<AssignmentFilters>(filters)
            .map_err(AssignmentRuleRepositoryError::persistence)?,
        last_assigned_index: cursor,
        is_active,
        created_at,
        updated_at,
    };
    AssignmentRule::from_persisted(data).map_err(AssignmentRuleRepositoryError::persistence)
}
