//! Email dispatch over SMTP.
//!
//! Two transports exist, picked from the policy host: `localhost` means an
//! unauthenticated handoff to the local relay, anything else opens an
//! implicit-TLS session with credentials. Remote relays here are typically
//! self-signed, so certificate chain validation is skipped while the server
//! name check stays on; the weakening is confined to [`SmtpMailer::from_policy`].

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::{ContentType, MIME_VERSION_1_0};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::EmailPolicy;
use crate::error::DispatchError;

/// Host value selecting the unauthenticated local relay path.
pub const LOCAL_RELAY_HOST: &str = "localhost";

/// Delivery seam. Implementations move a composed message to a relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), DispatchError>;
}

/// SMTP-backed mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport for the configured relay.
    pub fn from_policy(policy: &EmailPolicy) -> Result<Self, DispatchError> {
        let transport = if policy.host == LOCAL_RELAY_HOST {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&policy.host)
                .port(policy.port)
                .build()
        } else {
            // Chain trust is skipped for self-signed relays; the server
            // name is still verified against the presented certificate.
            let tls = TlsParameters::builder(policy.host.clone())
                .dangerous_accept_invalid_certs(true)
                .build()?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&policy.host)
                .port(policy.port)
                .tls(Tls::Wrapper(tls))
                .credentials(Credentials::new(
                    policy.username.clone(),
                    policy.password.clone(),
                ))
                .build()
        };
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<(), DispatchError> {
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Outcome of a dispatch attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Message handed to the relay.
    Sent,
    /// Dispatch is disabled; nothing left the process.
    Disabled,
}

/// Sends alert mail for triggered jobs, honoring the enable flag.
pub struct Dispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    from: String,
}

impl Dispatcher {
    /// Build a dispatcher from the email policy. A disabled policy yields
    /// a no-op dispatcher that reports [`DispatchOutcome::Disabled`].
    pub fn from_policy(policy: &EmailPolicy) -> Result<Self, DispatchError> {
        if !policy.enable {
            return Ok(Self::disabled(&policy.from));
        }
        let mailer = SmtpMailer::from_policy(policy)?;
        Ok(Self::new(Arc::new(mailer), &policy.from))
    }

    pub fn new(mailer: Arc<dyn Mailer>, from: &str) -> Self {
        Self {
            mailer: Some(mailer),
            from: from.to_string(),
        }
    }

    pub fn disabled(from: &str) -> Self {
        Self {
            mailer: None,
            from: from.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Compose and deliver one alert.
    pub async fn dispatch(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mailer = match &self.mailer {
            Some(mailer) => mailer,
            None => {
                debug!(
                    to = %recipient,
                    "Email dispatch disabled, not delivering to {}",
                    recipient
                );
                return Ok(DispatchOutcome::Disabled);
            }
        };

        let from: Mailbox = self.from.parse().map_err(|e| DispatchError::Address {
            address: self.from.clone(),
            source: e,
        })?;
        let to: Mailbox = recipient.parse().map_err(|e| DispatchError::Address {
            address: recipient.to_string(),
            source: e,
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(MIME_VERSION_1_0)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        mailer.deliver(message).await?;
        info!(to = %recipient, "Sent email to {}", recipient);
        Ok(DispatchOutcome::Sent)
    }
}
