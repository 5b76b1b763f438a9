//! Diesel schema for sequence persistence.

diesel::table! {
    /// Sales sequences with their step definitions.
    sequences (id) {
        /// Sequence identifier.
        id -> Uuid,
        /// Human-readable name.
        #[max_length = 255]
        name -> Varchar,
        /// Ordered step definitions as JSON.
        steps -> Jsonb,
        /// Whether new enrollments are accepted.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact enrollments and their step cursor.
    sequence_enrollments (id) {
        /// Enrollment identifier.
        id -> Uuid,
        /// Sequence identifier.
        sequence_id -> Uuid,
        /// Enrolled contact.
        contact_id -> Uuid,
        /// Index of the next step to run.
        current_step -> Int4,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Due time of the next step.
        next_step_at -> Nullable<Timestamptz>,
        /// Time of the latest sweep attempt.
        last_attempted_at -> Nullable<Timestamptz>,
        /// Enrollment start.
        started_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
