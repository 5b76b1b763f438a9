//! `PostgreSQL` email queue.

use super::{
    models::{ContactRow, EmailTemplateRow, NewQueuedEmailRow},
    schema::{contacts, email_templates, queued_emails},
};
use crate::outreach::{
    domain::{
        ContactId, ContactProfile, EmailTemplate, EmailTemplateId, QueuedEmail,
        TemplatedEmailRequest,
    },
    ports::{EmailQueue, EmailQueueError, EmailQueueResult, compose_queued_email},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by outreach adapters.
pub type OutreachPgPool = Pool<ConnectionManager<PgConnection>>;

/// Email queue writing to the `queued_emails` table.
#[derive(Debug, Clone)]
pub struct PostgresEmailQueue {
    pool: OutreachPgPool,
}

impl PostgresEmailQueue {
    /// Creates a new queue from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: OutreachPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> EmailQueueResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EmailQueueResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(EmailQueueError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(EmailQueueError::persistence)?
    }
}

#[async_trait]
impl EmailQueue for PostgresEmailQueue {
    async fn queue_templated(
        &self,
        request: &TemplatedEmailRequest,
        queued_at: DateTime<Utc>,
    ) -> EmailQueueResult<QueuedEmail> {
        let owned_request = request.clone();
        self.run_blocking(move |connection| {
            let template = load_template(connection, owned_request.template_id)?;
            let contact = load_contact(connection, owned_request.contact_id)?;
            let email = compose_queued_email(&owned_request, &template, &contact, queued_at)?;

            diesel::insert_into(queued_emails::table)
                .values(&to_row(&email)?)
                .execute(connection)
                .map_err(EmailQueueError::persistence)?;
            Ok(email)
        })
        .await
    }
}

fn load_template(
    connection: &mut PgConnection,
    template_id: EmailTemplateId,
) -> EmailQueueResult<EmailTemplate> {
    let row = email_templates::table
        .filter(email_templates::id.eq(template_id.into_inner()))
        .select(EmailTemplateRow::as_select())
        .first::<EmailTemplateRow>(connection)
        .optional()
        .map_err(EmailQueueError::persistence)?
        .ok_or(EmailQueueError::TemplateNotFound(template_id))?;
    EmailTemplate::with_id(template_id, row.name, row.subject, row.body)
        .map_err(EmailQueueError::persistence)
}

fn load_contact(
    connection: &mut PgConnection,
    contact_id: ContactId,
) -> EmailQueueResult<ContactProfile> {
    let row = contacts::table
        .filter(contacts::id.eq(contact_id.into_inner()))
        .select(ContactRow::as_select())
        .first::<ContactRow>(connection)
        .optional()
        .map_err(EmailQueueError::persistence)?
        .ok_or(EmailQueueError::ContactNotFound(contact_id))?;

    let ContactRow {
        first_name,
        last_name,
        email,
        company,
        job_title,
        ..
    } = row;
    let mut profile = ContactProfile::new(contact_id);
    if let Some(value) = first_name {
        profile = profile.with_first_name(value);
    }
    if let Some(value) = last_name {
        profile = profile.with_last_name(value);
    }
    if let Some(value) = email {
        profile = profile.with_email(value);
    }
    if let Some(value) = company {
        profile = profile.with_company(value);
    }
    if let Some(value) = job_title {
        profile = profile.with_job_title(value);
    }
    Ok(profile)
}

fn to_row(email: &QueuedEmail) -> EmailQueueResult<NewQueuedEmailRow> {
    let origin = email
        .origin()
        .map(serde_json::to_value)
        .transpose()
        .map_err(EmailQueueError::persistence)?;
    Ok(NewQueuedEmailRow {
        id: email.id().into_inner(),
        contact_id: email.contact_id().into_inner(),
        template_id: email.template_id().into_inner(),
        recipient: email.recipient().to_owned(),
        subject: email.subject().to_owned(),
        body: email.body().to_owned(),
        status: QueuedEmail::QUEUED_STATUS.to_owned(),
        origin,
        queued_at: email.queued_at(),
    })
}
