//! Diesel schema for assignment persistence.

diesel::table! {
    /// Assignment rules with their rotation cursor.
    assignment_rules (id) {
        /// Rule identifier.
        id -> Uuid,
        /// Human-readable rule name.
        #[max_length = 255]
        name -> Varchar,
        /// Dispatch strategy.
        #[max_length = 50]
        strategy -> Varchar,
        /// Ordered candidate user identifiers.
        candidate_user_ids -> Array<Uuid>,
        /// Equality filters as JSON.
        filters -> Jsonb,
        /// Rotation cursor, `-1` before the first pick.
        last_assigned_index -> Int4,
        /// Whether the rule takes part in assignment.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lead ownership columns read by load-balanced assignment.
    leads (id) {
        /// Lead identifier.
        id -> Uuid,
        /// Owning user, if assigned.
        owner_id -> Nullable<Uuid>,
        /// Lead pipeline status.
        #[max_length = 50]
        status -> Varchar,
    }
}
