use tracing::{info, warn};

use crate::db::Store;
use crate::error::{StudioError, StudioResult};
use crate::mail::ContactNotifier;
use crate::models::{Contact, ContactForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactFilter {
    #[default]
    All,
    Unread,
}

impl ContactFilter {
    pub fn toggled(&self) -> Self {
        match self {
            ContactFilter::All => ContactFilter::Unread,
            ContactFilter::Unread => ContactFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactFilter::All => "All",
            ContactFilter::Unread => "Unread",
        }
    }
}

/// Trimmed copy of the form, or the first problem found.
pub fn validate(form: &ContactForm) -> StudioResult<ContactForm> {
    let clean = ContactForm {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        message: form.message.trim().to_string(),
    };

    if clean.name.is_empty() {
        return Err(StudioError::validation("name is required"));
    }
    if clean.email.is_empty() {
        return Err(StudioError::validation("e-mail is required"));
    }
    if !clean.email.contains('@') {
        return Err(StudioError::validation("e-mail address is not valid"));
    }
    if clean.message.is_empty() {
        return Err(StudioError::validation("message is required"));
    }
    Ok(clean)
}

/// Store a contact submission and clear the form. Notification failures are only logged.
pub async fn submit(
    store: &dyn Store,
    notifier: Option<&ContactNotifier>,
    form: &mut ContactForm,
) -> StudioResult<i32> {
    let clean = validate(form)?;
    let id = store.create_contact(&clean).await?;
    info!(contact_id = id, "contact message received");
    form.clear();

    if let Some(notifier) = notifier {
        if let Err(e) = notifier.send(&clean).await {
            warn!(contact_id = id, error = %e, "contact notification failed");
        }
    }

    Ok(id)
}

pub fn unread_count(contacts: &[Contact]) -> usize {
    contacts.iter().filter(|c| !c.read).count()
}

pub fn filter(contacts: &[Contact], filter: ContactFilter) -> Vec<&Contact> {
    contacts
        .iter()
        .filter(|c| filter == ContactFilter::All || !c.read)
        .collect()
}
