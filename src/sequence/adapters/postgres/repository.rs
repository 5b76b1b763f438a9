//! `PostgreSQL` repository implementation for sequences and enrollments.

use super::{
    models::{EnrollmentRow, NewEnrollmentRow, NewSequenceRow, SequenceRow},
    schema::{sequence_enrollments, sequences},
};
use crate::outreach::domain::ContactId;
use crate::sequence::{
    domain::{
        Enrollment, EnrollmentId, EnrollmentStatus, PersistedEnrollmentData,
        PersistedSequenceData, Sequence, SequenceId, SequenceName, SequenceStep,
    },
    ports::{SequenceRepository, SequenceRepositoryError, SequenceRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by sequence adapters.
pub type SequencePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed sequence repository.
///
/// A partial unique index on `(sequence_id, contact_id) WHERE status =
/// 'active'` backs the idempotent enrollment insert.
#[derive(Debug, Clone)]
pub struct PostgresSequenceRepository {
    pool: SequencePgPool,
}

impl PostgresSequenceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SequencePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SequenceRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SequenceRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SequenceRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SequenceRepositoryError::persistence)?
    }
}

#[async_trait]
impl SequenceRepository for PostgresSequenceRepository {
    async fn store_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        let sequence_id = sequence.id();
        let new_row = sequence_to_row(sequence)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(sequences::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        SequenceRepositoryError::DuplicateSequence(sequence_id)
                    }
                    _ => SequenceRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_sequence(&self, sequence: &Sequence) -> SequenceRepositoryResult<()> {
        let sequence_id = sequence.id();
        let row = sequence_to_row(sequence)?;

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(sequences::table.filter(sequences::id.eq(sequence_id.into_inner())))
                    .set(&row)
                    .execute(connection)
                    .map_err(SequenceRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(SequenceRepositoryError::SequenceNotFound(sequence_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_sequence(&self, id: SequenceId) -> SequenceRepositoryResult<Option<Sequence>> {
        self.run_blocking(move |connection| {
            let row = sequences::table
                .filter(sequences::id.eq(id.into_inner()))
                .select(SequenceRow::as_select())
                .first::<SequenceRow>(connection)
                .optional()
                .map_err(SequenceRepositoryError::persistence)?;
            row.map(row_to_sequence).transpose()
        })
        .await
    }

    async fn store_enrollment_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> SequenceRepositoryResult<Enrollment> {
        let candidate = enrollment.clone();
        let new_row = enrollment_to_row(enrollment)?;

        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(sequence_enrollments::table)
                .values(&new_row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(SequenceRepositoryError::persistence)?;
            if inserted > 0 {
                return Ok(candidate);
            }

            load_active_enrollment(connection, candidate.sequence_id(), candidate.contact_id())?
                .ok_or_else(|| {
                    SequenceRepositoryError::persistence(std::io::Error::other(
                        "enrollment insert conflicted without an active enrollment",
                    ))
                })
        })
        .await
    }

    async fn update_enrollment(&self, enrollment: &Enrollment) -> SequenceRepositoryResult<()> {
        let enrollment_id = enrollment.id();
        let row = enrollment_to_row(enrollment)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                sequence_enrollments::table
                    .filter(sequence_enrollments::id.eq(enrollment_id.into_inner())),
            )
            .set(&row)
            .execute(connection)
            .map_err(SequenceRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(SequenceRepositoryError::EnrollmentNotFound(enrollment_id));
            }
            Ok(())
        })
        .await
    }

    async fn record_attempt(
        &self,
        id: EnrollmentId,
        attempted_at: DateTime<Utc>,
    ) -> SequenceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                sequence_enrollments::table
                    .filter(sequence_enrollments::id.eq(id.into_inner())),
            )
            .set(sequence_enrollments::last_attempted_at.eq(Some(attempted_at)))
            .execute(connection)
            .map_err(SequenceRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(SequenceRepositoryError::EnrollmentNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_enrollment(
        &self,
        id: EnrollmentId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        self.run_blocking(move |connection| {
            let row = sequence_enrollments::table
                .filter(sequence_enrollments::id.eq(id.into_inner()))
                .select(EnrollmentRow::as_select())
                .first::<EnrollmentRow>(connection)
                .optional()
                .map_err(SequenceRepositoryError::persistence)?;
            row.map(row_to_enrollment).transpose()
        })
        .await
    }

    async fn find_active_enrollment(
        &self,
        sequence_id: SequenceId,
        contact_id: ContactId,
    ) -> SequenceRepositoryResult<Option<Enrollment>> {
        self.run_blocking(move |connection| {
            load_active_enrollment(connection, sequence_id, contact_id)
        })
        .await
    }

    async fn list_enrollments(
        &self,
        sequence_id: SequenceId,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        self.run_blocking(move |connection| {
            let rows = sequence_enrollments::table
                .filter(sequence_enrollments::sequence_id.eq(sequence_id.into_inner()))
                .order((
                    sequence_enrollments::started_at.asc(),
                    sequence_enrollments::id.asc(),
                ))
                .select(EnrollmentRow::as_select())
                .load::<EnrollmentRow>(connection)
                .map_err(SequenceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_enrollment).collect()
        })
        .await
    }

    async fn find_due_enrollments(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SequenceRepositoryResult<Vec<Enrollment>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            let rows = sequence_enrollments::table
                .filter(sequence_enrollments::status.eq(EnrollmentStatus::Active.as_str()))
                .filter(sequence_enrollments::next_step_at.le(now))
                // `false` sorts first, so never-attempted rows lead.
                .order((
                    sequence_enrollments::last_attempted_at.is_not_null().asc(),
                    sequence_enrollments::last_attempted_at.asc(),
                    sequence_enrollments::next_step_at.asc(),
                    sequence_enrollments::started_at.asc(),
                ))
                .limit(row_limit)
                .select(EnrollmentRow::as_select())
                .load::<EnrollmentRow>(connection)
                .map_err(SequenceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_enrollment).collect()
        })
        .await
    }
}

fn load_active_enrollment(
    connection: &mut PgConnection,
    sequence_id: SequenceId,
    contact_id: ContactId,
) -> SequenceRepositoryResult<Option<Enrollment>> {
    let row = sequence_enrollments::table
        .filter(sequence_enrollments::sequence_id.eq(sequence_id.into_inner()))
        .filter(sequence_enrollments::contact_id.eq(contact_id.into_inner()))
        .filter(sequence_enrollments::status.eq(EnrollmentStatus::Active.as_str()))
        .select(EnrollmentRow::as_select())
        .first::<EnrollmentRow>(connection)
        .optional()
        .map_err(SequenceRepositoryError::persistence)?;
    row.map(row_to_enrollment).transpose()
}

fn sequence_to_row(sequence: &Sequence) -> SequenceRepositoryResult<NewSequenceRow> {
    Ok(NewSequenceRow {
        id: sequence.id().into_inner(),
        name: sequence.name().as_str().to_owned(),
        steps: serde_json::to_value(sequence.steps())
            .map_err(SequenceRepositoryError::persistence)?,
        is_active: sequence.is_active(),
        created_at: sequence.created_at(),
        updated_at: sequence.updated_at(),
    })
}

fn row_to_sequence(row: SequenceRow) -> SequenceRepositoryResult<Sequence> {
    let SequenceRow {
        id,
        name,
        steps,
        is_active,
        created_at,
        updated_at,
    } = row;

    let data = PersistedSequenceData {
        id: SequenceId::from_uuid(id),
        name: SequenceName::new(name).map_err(SequenceRepositoryError::persistence)?,
        steps: serde_json::from_value::<Vec<SequenceStep>>(steps)
            .map_err(SequenceRepositoryError::persistence)?,
        is_active,
        created_at,
        updated_at,
    };
    Ok(Sequence::from_persisted(data))
}

fn enrollment_to_row(enrollment: &Enrollment) -> SequenceRepositoryResult<NewEnrollmentRow> {
    Ok(NewEnrollmentRow {
        id: enrollment.id().into_inner(),
        sequence_id: enrollment.sequence_id().into_inner(),
        contact_id: enrollment.contact_id().into_inner(),
        current_step: i32::try_from(enrollment.current_step())
            .map_err(SequenceRepositoryError::persistence)?,
        status: enrollment.status().as_str().to_owned(),
        next_step_at: enrollment.next_step_at(),
        last_attempted_at: enrollment.last_attempted_at(),
        started_at: enrollment.started_at(),
        completed_at: enrollment.completed_at(),
        updated_at: enrollment.updated_at(),
    })
}

fn row_to_enrollment(row: EnrollmentRow) -> SequenceRepositoryResult<Enrollment> {
    let EnrollmentRow {
        id,
        sequence_id,
        contact_id,
        current_step,
        status,
        next_step_at,
        last_attempted_at,
        started_at,
        completed_at,
        updated_at,
    } = row;

    let data = PersistedEnrollmentData {
        id: EnrollmentId::from_uuid(id),
        sequence_id: SequenceId::from_uuid(sequence_id),
        contact_id: ContactId::from_uuid(contact_id),
        current_step: usize::try_from(current_step)
            .map_err(SequenceRepositoryError::persistence)?,
        status: EnrollmentStatus::try_from(status.as_str())
            .map_err(SequenceRepositoryError::persistence)?,
        next_step_at,
        last_attempted_at,
        started_at,
        completed_at,
        updated_at,
    };
    Ok(Enrollment::from_persisted(data))
}
