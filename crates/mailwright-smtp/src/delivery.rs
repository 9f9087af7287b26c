//! One-shot delivery: connect, greet, secure, authenticate, send, quit.

use crate::config::SmtpEndpointConfig;
use crate::connection::{Client, Connector, open};
use crate::error::Result;
use crate::types::{Address, AuthMechanism, EncryptionMode, Receipt, RecipientStatus, ReplyCode};

/// Envelope sender and recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    from: Address,
    to: Address,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub const fn new(from: Address, to: Address) -> Self {
        Self { from, to }
    }

    /// Reverse-path (`MAIL FROM`).
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// Forward-path (`RCPT TO`).
    #[must_use]
    pub const fn to(&self) -> &Address {
        &self.to
    }
}

/// Delivers one message over a fresh connection.
///
/// `payload` is the header block plus body, CRLF-normalized and
/// dot-stuffed, without the terminating dot line. The connection is opened
/// exactly once and closed on every path. `QUIT` is sent after success and
/// after a rejected step; after an I/O, timeout or TLS failure the socket is
/// just dropped. The reply to `QUIT` never changes the outcome.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn deliver<C: Connector>(
    connector: &C,
    config: &SmtpEndpointConfig,
    envelope: &Envelope,
    payload: &[u8],
) -> Result<Receipt> {
    let client_name = config.client_name_for(envelope.from());
    tracing::debug!(
        host = %config.host(),
        port = config.port(),
        encryption = %config.encryption(),
        client_name,
        "connecting"
    );

    let stream = open(connector, config).await?;
    let client = Client::from_stream(stream, client_name).await?;
    let mut client = client.ehlo().await?;

    if config.encryption() == EncryptionMode::StartTls {
        client = client.starttls(config.host()).await?;
    }

    if let Some(limit) = client.server_info().max_message_size()
        && payload.len() > limit
    {
        tracing::warn!(
            size = payload.len(),
            limit,
            "message exceeds advertised SIZE, sending anyway"
        );
    }

    if !client.server_info().supports_auth(AuthMechanism::Login) {
        tracing::warn!("server does not advertise AUTH LOGIN, trying anyway");
    }

    let client = client
        .auth_login(config.username(), config.password())
        .await?;
    let client = client.mail_from(envelope.from()).await?;
    let (client, recipient) = client.rcpt_to(envelope.to()).await?;
    if recipient == RecipientStatus::Forwarded {
        tracing::info!(to = %envelope.to(), "server will forward the recipient (251)");
    }
    let client = client.data().await?;
    let client = client.send_message(payload).await?;
    let encrypted = client.is_encrypted();

    let quit_acknowledged = match client.quit().await {
        Ok(reply) => {
            if reply.code != ReplyCode::CLOSING {
                tracing::warn!(code = reply.code.as_u16(), "unexpected reply to QUIT");
            }
            reply.code == ReplyCode::CLOSING
        }
        Err(err) => {
            tracing::warn!(error = %err, "QUIT failed after message was accepted");
            false
        }
    };

    Ok(Receipt {
        recipient,
        encrypted,
        quit_acknowledged,
    })
}
