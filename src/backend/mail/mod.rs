//! Outgoing mail
//!
//! `Mailer` delivers through SMTP when a host is configured and otherwise
//! keeps the latest mails in a bounded in-memory outbox, which tests read
//! back.

pub mod templates;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::backend::error::{BackendError, BackendResult};
use crate::shared::config::MailConfig;

pub use templates::{verify_mail, MailContent};

/// Mails kept by the memory outbox; older ones are dropped
const OUTBOX_LIMIT: usize = 100;

/// A mail captured by the memory outbox
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub content: MailContent,
}

#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Memory(Arc<Mutex<VecDeque<SentMail>>>),
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smtp { from, .. } => f.debug_struct("Smtp").field("from", from).finish(),
            Self::Memory(_) => f.write_str("Memory"),
        }
    }
}

impl Mailer {
    pub fn memory() -> Self {
        Self::Memory(Arc::default())
    }

    /// SMTP mailer for `config.host`, or the memory outbox without a host
    pub fn from_config(config: &MailConfig) -> BackendResult<Self> {
        let Some(host) = config.host.as_deref() else {
            tracing::warn!("SMTP_HOST not set; mails are not delivered and only the last {} are kept in memory", OUTBOX_LIMIT);
            return Ok(Self::memory());
        };

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| BackendError::mail(format!("invalid sender {}: {}", config.from, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| BackendError::mail(e.to_string()))?
            .port(config.port);
        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self::Smtp {
            transport: builder.build(),
            from,
        })
    }

    /// Mails captured so far, oldest first; empty for SMTP
    pub fn outbox(&self) -> Vec<SentMail> {
        match self {
            Self::Memory(outbox) => outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .cloned()
                .collect(),
            Self::Smtp { .. } => Vec::new(),
        }
    }

    pub async fn try_send(&self, to: &str, content: MailContent) -> BackendResult<()> {
        match self {
            Self::Memory(outbox) => {
                let mut outbox = outbox.lock().unwrap_or_else(PoisonError::into_inner);
                if outbox.len() >= OUTBOX_LIMIT {
                    outbox.pop_front();
                }
                outbox.push_back(SentMail {
                    to: to.to_string(),
                    content,
                });
                Ok(())
            }
            Self::Smtp { transport, from } => {
                let to: Mailbox = to
                    .parse()
                    .map_err(|e| BackendError::mail(format!("invalid recipient: {}", e)))?;
                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(content.subject)
                    .multipart(MultiPart::alternative_plain_html(content.text, content.html))
                    .map_err(|e| BackendError::mail(e.to_string()))?;
                transport
                    .send(message)
                    .await
                    .map_err(|e| BackendError::mail(e.to_string()))?;
                Ok(())
            }
        }
    }

    /// Send and log failures instead of returning them
    pub async fn send(&self, to: &str, content: MailContent) {
        if let Err(e) = self.try_send(to, content).await {
            tracing::error!("Error sending email: {}", e);
        }
    }
}
