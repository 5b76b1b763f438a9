//! Diesel schema for outreach persistence.

diesel::table! {
    /// Reusable email templates.
    email_templates (id) {
        /// Template identifier.
        id -> Uuid,
        /// Template name.
        #[max_length = 255]
        name -> Varchar,
        /// Subject template.
        subject -> Text,
        /// Body template.
        body -> Text,
    }
}

diesel::table! {
    /// Contact columns used for rendering.
    contacts (id) {
        /// Contact identifier.
        id -> Uuid,
        /// First name.
        first_name -> Nullable<Varchar>,
        /// Last name.
        last_name -> Nullable<Varchar>,
        /// Email address.
        email -> Nullable<Varchar>,
        /// Company name.
        company -> Nullable<Varchar>,
        /// Job title.
        job_title -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Outbound email queue.
    queued_emails (id) {
        /// Queue record identifier.
        id -> Uuid,
        /// Recipient contact.
        contact_id -> Uuid,
        /// Source template.
        template_id -> Uuid,
        /// Recipient address.
        recipient -> Varchar,
        /// Rendered subject.
        subject -> Text,
        /// Rendered body.
        body -> Text,
        /// Delivery status.
        #[max_length = 50]
        status -> Varchar,
        /// Origin payload, if any.
        origin -> Nullable<Jsonb>,
        /// Queue timestamp.
        queued_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact timeline activities.
    activities (id) {
        /// Activity identifier.
        id -> Uuid,
        /// Contact the activity belongs to.
        contact_id -> Uuid,
        /// Activity kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Due time for tasks.
        due_at -> Nullable<Timestamptz>,
        /// Origin payload, if any.
        origin -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
