//! Diesel schema for workflow persistence.

diesel::table! {
    /// Workflow rules keyed by trigger.
    workflow_rules (id) {
        /// Rule identifier.
        id -> Uuid,
        /// Human-readable name.
        #[max_length = 255]
        name -> Varchar,
        /// Entity kind the rule listens to.
        #[max_length = 50]
        trigger_entity -> Varchar,
        /// Event the rule listens to.
        #[max_length = 50]
        trigger_event -> Varchar,
        /// Optional single-field condition.
        condition -> Nullable<Jsonb>,
        /// Opaque action list.
        actions -> Jsonb,
        /// Whether the rule participates in evaluation.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only log of rule evaluations.
    workflow_executions (id) {
        /// Execution identifier.
        id -> Uuid,
        /// Evaluated rule.
        rule_id -> Uuid,
        /// Entity kind of the event.
        #[max_length = 50]
        entity_type -> Varchar,
        /// Affected entity.
        entity_id -> Uuid,
        /// Triggering event.
        #[max_length = 50]
        trigger_event -> Varchar,
        /// Evaluation status.
        #[max_length = 50]
        status -> Varchar,
        /// Result payload.
        result -> Jsonb,
        /// Evaluation timestamp.
        executed_at -> Timestamptz,
    }
}
