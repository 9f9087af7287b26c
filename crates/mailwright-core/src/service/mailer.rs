//! The mail client facade.

use super::local::{LocalSubmission, Sendmail};
use crate::config::MailerConfig;
use crate::error::{Outcome, SendError};
use crate::message::OutgoingMessage;
use mailwright_mime::{MessageBuilder, extract_email_address};
use mailwright_smtp::{
    Address, Connector, Envelope, Receipt, SmtpEndpointConfig, TcpConnector, deliver,
};

/// How a message left the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the SMTP relay.
    Smtp {
        /// Session details.
        receipt: Receipt,
        /// `Message-ID` header value.
        message_id: String,
    },
    /// Handed to the local mail system.
    LocalSubmission {
        /// `Message-ID` header value.
        message_id: String,
    },
}

impl Delivery {
    /// Returns the `Message-ID` of the sent message.
    #[must_use]
    pub fn message_id(&self) -> &str {
        match self {
            Self::Smtp { message_id, .. } | Self::LocalSubmission { message_id } => message_id,
        }
    }
}

/// Sends messages with one configuration.
///
/// Each [`Mailer::send`] opens its own connection; nothing is shared between
/// sends, so a `Mailer` can be used from several tasks at once.
#[derive(Debug)]
pub struct Mailer<C = TcpConnector, L = Sendmail> {
    config: MailerConfig,
    connector: C,
    local: L,
}

impl Mailer {
    /// Creates a mailer using TCP and `/usr/sbin/sendmail`.
    #[must_use]
    pub fn new(config: MailerConfig) -> Self {
        Self {
            config,
            connector: TcpConnector,
            local: Sendmail::new(),
        }
    }
}

impl<C, L> Mailer<C, L>
where
    C: Connector,
    L: LocalSubmission,
{
    /// Replaces the transport used to reach the relay.
    #[must_use]
    pub fn with_connector<C2: Connector>(self, connector: C2) -> Mailer<C2, L> {
        Mailer {
            config: self.config,
            connector,
            local: self.local,
        }
    }

    /// Replaces the local-submission fallback.
    #[must_use]
    pub fn with_local<L2: LocalSubmission>(self, local: L2) -> Mailer<C, L2> {
        Mailer {
            config: self.config,
            connector: self.connector,
            local,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Sends one message.
    ///
    /// Uses SMTP when host, username and password are configured, otherwise
    /// the local-submission fallback. The first failing step ends the send;
    /// nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] classifying the failure.
    pub async fn send(&self, message: &OutgoingMessage) -> Outcome {
        let outcome = self.dispatch(message).await;
        match &outcome {
            Ok(delivery) => tracing::info!(
                to = %message.to_address,
                message_id = delivery.message_id(),
                "mail sent"
            ),
            Err(err) => tracing::warn!(
                to = %message.to_address,
                kind = %err.kind(),
                tag = err.tag(),
                error = %err,
                "mail not sent"
            ),
        }
        outcome
    }

    async fn dispatch(&self, message: &OutgoingMessage) -> Outcome {
        let from_raw = message.from_address.trim();
        let from = Address::new(extract_email_address(from_raw))
            .map_err(|_| SendError::Config(format!("Invalid \"from\" address: {from_raw:?}")))?;
        let to_raw = message.to_address.trim();
        let to = Address::new(extract_email_address(to_raw))
            .map_err(|_| SendError::Config(format!("Invalid \"to\" address: {to_raw:?}")))?;
        let envelope = Envelope::new(from, to);

        match self.config.smtp.endpoint()? {
            Some(endpoint) => self.send_smtp(&endpoint, &envelope, message).await,
            None => {
                tracing::debug!("SMTP settings incomplete, using local submission");
                self.send_local(&envelope, message).await
            }
        }
    }

    async fn send_smtp(
        &self,
        endpoint: &SmtpEndpointConfig,
        envelope: &Envelope,
        message: &OutgoingMessage,
    ) -> Outcome {
        let composed = compose(envelope, message)
            .message_id_domain(endpoint.client_name_for(envelope.from()))
            .build()?;
        let payload = composed.to_smtp_payload();

        let receipt = deliver(&self.connector, endpoint, envelope, &payload).await?;

        Ok(Delivery::Smtp {
            receipt,
            message_id: composed.message_id().to_string(),
        })
    }

    async fn send_local(&self, envelope: &Envelope, message: &OutgoingMessage) -> Outcome {
        let composed = compose(envelope, message)
            .reply_to(envelope.from().as_str())
            .build()?;

        self.local
            .submit(&composed)
            .await
            .map_err(|err| SendError::LocalSubmission(err.to_string()))?;

        Ok(Delivery::LocalSubmission {
            message_id: composed.message_id().to_string(),
        })
    }
}

fn compose(envelope: &Envelope, message: &OutgoingMessage) -> MessageBuilder {
    let mut builder = MessageBuilder::new(envelope.from().as_str(), envelope.to().as_str())
        .subject(message.subject.as_str())
        .body(message.body.as_str());

    let from_name = message.from_name.trim();
    if !from_name.is_empty() {
        builder = builder.from_name(from_name);
    }
    if let Some(to_name) = message.to_name.as_deref().map(str::trim)
        && !to_name.is_empty()
    {
        builder = builder.to_name(to_name);
    }
    builder
}

/// Sends one message with a fresh default [`Mailer`].
///
/// # Errors
///
/// Returns a [`SendError`] classifying the failure.
pub async fn send_email(config: &MailerConfig, message: &OutgoingMessage) -> Outcome {
    Mailer::new(config.clone()).send(message).await
}
