//!
//! # Mail Collaborator
//!
//! Outbound email for the email-change confirmation flow. Delivery is
//! best-effort by contract: a failed send is logged and swallowed, never
//! surfaced to the operation that requested it.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{debug, error};

/// A plain-text message to deliver.
#[derive(Debug, Clone)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Injected mail-sending seam. Implementations must not fail the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail);
}

/// SMTP-backed mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        username: String,
        password: String,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: Mail) {
        let from = match mail.from.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                error!("Invalid from address {}: {}", mail.from, err);
                return;
            }
        };
        let to = match mail.to.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                error!("Invalid to address {}: {}", mail.to, err);
                return;
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text)
        {
            Ok(message) => message,
            Err(err) => {
                error!("Failed to build mail message: {}", err);
                return;
            }
        };

        if let Err(err) = self.transport.send(message).await {
            error!("Failed to send mail: {}", err);
        }
    }
}

/// Mailer that drops everything on the floor. Used by the test suites and
/// when running without SMTP credentials.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, mail: Mail) {
        debug!("Dropping mail to {}: {}", mail.to, mail.subject);
    }
}
