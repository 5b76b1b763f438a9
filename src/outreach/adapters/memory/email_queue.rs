//! In-memory email queue for automation tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::outreach::{
    domain::{
        ContactId, ContactProfile, EmailTemplate, EmailTemplateId, QueuedEmail,
        TemplatedEmailRequest,
    },
    ports::{EmailQueue, EmailQueueError, EmailQueueResult, compose_queued_email},
};

/// Email queue holding templates, contacts and queued messages in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailQueue {
    state: Arc<RwLock<InMemoryQueueState>>,
}

#[derive(Debug, Default)]
struct InMemoryQueueState {
    templates: HashMap<EmailTemplateId, EmailTemplate>,
    contacts: HashMap<ContactId, ContactProfile>,
    rejected_contacts: HashSet<ContactId>,
    queued: Vec<QueuedEmail>,
}

fn lock_error<T>(err: PoisonError<T>) -> EmailQueueError {
    EmailQueueError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryEmailQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::Persistence`] when lock acquisition fails.
    pub fn add_template(&self, template: EmailTemplate) -> EmailQueueResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.templates.insert(template.id(), template);
        Ok(())
    }

    /// Registers a contact profile.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::Persistence`] when lock acquisition fails.
    pub fn add_contact(&self, contact: ContactProfile) -> EmailQueueResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.contacts.insert(contact.id(), contact);
        Ok(())
    }

    /// Makes every later queue attempt for `contact_id` fail with a
    /// persistence error.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::Persistence`] when lock acquisition fails.
    pub fn reject_contact(&self, contact_id: ContactId) -> EmailQueueResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.rejected_contacts.insert(contact_id);
        Ok(())
    }

    /// Returns a copy of every queued email in queue order.
    ///
    /// # Errors
    ///
    /// Returns [`EmailQueueError::Persistence`] when lock acquisition fails.
    pub fn queued(&self) -> EmailQueueResult<Vec<QueuedEmail>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.queued.clone())
    }
}

#[async_trait]
impl EmailQueue for InMemoryEmailQueue {
    async fn queue_templated(
        &self,
        request: &TemplatedEmailRequest,
        queued_at: DateTime<Utc>,
    ) -> EmailQueueResult<QueuedEmail> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.rejected_contacts.contains(&request.contact_id) {
            return Err(EmailQueueError::persistence(std::io::Error::other(
                "queue rejected contact",
            )));
        }
        let template = state
            .templates
            .get(&request.template_id)
            .ok_or(EmailQueueError::TemplateNotFound(request.template_id))?;
        let contact = state
            .contacts
            .get(&request.contact_id)
            .ok_or(EmailQueueError::ContactNotFound(request.contact_id))?;

        let email = compose_queued_email(request, template, contact, queued_at)?;
        state.queued.push(email.clone());
        Ok(email)
    }
}
