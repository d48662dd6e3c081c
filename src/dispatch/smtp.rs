use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::config::RelayConfig;
use super::traits::{MailRelay, OutboundEmail};
use crate::error::Error;

/// [`MailRelay`] backed by an authenticated SMTP submission (STARTTLS).
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    /// Build the transport from relay configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the SMTP host is not usable.
    pub fn new(config: &RelayConfig) -> Result<Self, Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| Error::Config(format!("SMTP relay: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

impl MailRelay for SmtpRelay {
    async fn relay(
        &self,
        email: OutboundEmail,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let from: Mailbox = format!("{} <{}>", email.from_name, email.from_email).parse()?;
        let to: Mailbox = email.to.as_str().parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;

        self.transport.send(message).await?;
        Ok(())
    }
}
