use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::SmtpSettings;
use crate::error::{StudioError, StudioResult};
use crate::models::ContactForm;

/// Sends an e-mail to the studio whenever the public contact form is used
#[derive(Debug, Clone)]
pub struct ContactNotifier {
    settings: SmtpSettings,
}

impl ContactNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn build_message(&self, form: &ContactForm) -> StudioResult<Message> {
        let from = self
            .settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| StudioError::Mail(format!("invalid sender address: {}", e)))?;
        let to = self
            .settings
            .to
            .parse::<Mailbox>()
            .map_err(|e| StudioError::Mail(format!("invalid recipient address: {}", e)))?;

        let body = format!(
            "New message from the website\n\nName: {}\nE-mail: {}\n\n{}\n",
            form.name, form.email, form.message
        );

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("New contact: {}", form.name))
            .header(ContentType::TEXT_PLAIN);
        if let Ok(reply_to) = form.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .body(body)
            .map_err(|e| StudioError::Mail(e.to_string()))
    }

    pub async fn send(&self, form: &ContactForm) -> StudioResult<()> {
        let email = self.build_message(form)?;
        let settings = self.settings.clone();

        // SmtpTransport blocks, keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let creds = Credentials::new(settings.username, settings.password);
            let mailer = SmtpTransport::relay(&settings.server)
                .map_err(|e| StudioError::Mail(e.to_string()))?
                .credentials(creds)
                .build();

            mailer
                .send(&email)
                .map_err(|e| StudioError::Mail(e.to_string()))?;
            Ok::<(), StudioError>(())
        })
        .await
        .map_err(|e| StudioError::Mail(e.to_string()))??;

        info!("contact notification sent");
        Ok(())
    }
}
