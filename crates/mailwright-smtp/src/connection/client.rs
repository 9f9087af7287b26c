//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, RecipientStatus, Reply, ReplyCode, Step};
use base64::Engine;
use std::collections::HashSet;
use std::marker::PhantomData;
use tokio::io::{AsyncRead, AsyncWrite};

/// Type-state marker: banner received.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: EHLO/HELO accepted.
#[derive(Debug)]
pub struct Greeted;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// Type-state marker: the server accepted the message.
#[derive(Debug)]
pub struct Committed;

/// SMTP client with type-state pattern.
///
/// Each state exposes only the commands valid in it. Dropping the client in
/// any state closes the socket.
#[derive(Debug)]
pub struct Client<S, State> {
    stream: SmtpStream<S>,
    server_info: ServerInfo,
    client_name: String,
    _state: PhantomData<State>,
}

impl<S> Client<S, Connected>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Creates a client from a stream and reads the server banner.
    ///
    /// `client_name` is the identity announced in EHLO/HELO.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the banner fails or it is not 220.
    pub async fn from_stream(
        stream: SmtpStream<S>,
        client_name: impl Into<String>,
    ) -> Result<Self> {
        let mut client = Self {
            stream,
            server_info: ServerInfo {
                hostname: String::new(),
                extensions: HashSet::new(),
            },
            client_name: client_name.into(),
            _state: PhantomData,
        };

        let outcome = read_reply(&mut client.stream, Step::Banner)
            .await
            .and_then(|greeting| {
                expect(Step::Banner, &greeting, &[ReplyCode::SERVICE_READY])?;
                Ok(greeting)
            });
        let (mut client, greeting): (Self, Reply) = client.advance(outcome).await?;

        // First word of the banner names the server
        client.server_info.hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        Ok(client)
    }

    /// Sends EHLO, falling back to HELO once if EHLO is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if both greetings fail.
    pub async fn ehlo(mut self) -> Result<Client<S, Greeted>> {
        let outcome = self.greet(Step::Ehlo, Step::Helo).await;
        let (client, ()) = self.advance(outcome).await?;
        Ok(client)
    }
}

impl<S> Client<S, Greeted>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Upgrades the connection to TLS and greets again (RFC 3207).
    ///
    /// STARTTLS is attempted even if the server did not advertise it; a
    /// refusal then surfaces as a reply error.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is refused, the handshake fails, or the
    /// server rejects the post-TLS greeting.
    pub async fn starttls(mut self, hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            tracing::warn!(
                server = %self.server_info.hostname,
                "STARTTLS not advertised, trying anyway"
            );
        }

        let outcome = self
            .command(Step::StartTls, &Command::StartTls, &[ReplyCode::SERVICE_READY])
            .await;
        let (mut client, _): (Self, Reply) = self.advance(outcome).await?;

        let timeout = client.stream.timeout();
        client.stream = client
            .stream
            .upgrade_to_tls(hostname)
            .await
            .map_err(|err| Error::tls(Step::TlsHandshake, err, timeout))?;
        tracing::debug!(%hostname, "TLS established");

        let outcome = client.greet(Step::EhloAfterTls, Step::HeloAfterTls).await;
        let (client, ()) = client.advance(outcome).await?;
        Ok(client)
    }

    /// Authenticates with AUTH LOGIN.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three exchanges is rejected.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        let outcome = self.login_exchange(username, password).await;
        let (client, ()) = self.advance(outcome).await?;
        Ok(client)
    }

    async fn login_exchange(&mut self, username: &str, password: &str) -> Result<()> {
        let engine = base64::engine::general_purpose::STANDARD;

        self.command(
            Step::AuthLogin,
            &Command::Auth {
                mechanism: AuthMechanism::Login,
            },
            &[ReplyCode::AUTH_CONTINUE],
        )
        .await?;
        self.command(
            Step::AuthUser,
            &Command::AuthResponse(engine.encode(username)),
            &[ReplyCode::AUTH_CONTINUE],
        )
        .await?;
        self.command(
            Step::AuthPass,
            &Command::AuthResponse(engine.encode(password)),
            &[ReplyCode::AUTH_SUCCESS],
        )
        .await?;
        Ok(())
    }
}

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: &Address) -> Result<Client<S, MailTransaction>> {
        let cmd = Command::MailFrom { from: from.clone() };
        let outcome = self.command(Step::MailFrom, &cmd, &[ReplyCode::OK]).await;
        let (client, _) = self.advance(outcome).await?;
        Ok(client)
    }
}

impl<S> Client<S, MailTransaction>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Adds the recipient. 251 (user not local) counts as accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(
        mut self,
        to: &Address,
    ) -> Result<(Client<S, RecipientAdded>, RecipientStatus)> {
        let cmd = Command::RcptTo { to: to.clone() };
        let outcome = self
            .command(Step::RcptTo, &cmd, &[ReplyCode::OK, ReplyCode::FORWARD])
            .await
            .map(|reply| {
                if reply.code == ReplyCode::FORWARD {
                    RecipientStatus::Forwarded
                } else {
                    RecipientStatus::Accepted
                }
            });
        self.advance(outcome).await
    }
}

impl<S> Client<S, RecipientAdded>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<S, Data>> {
        let outcome = self
            .command(Step::DataCommand, &Command::Data, &[ReplyCode::START_DATA])
            .await;
        let (client, _) = self.advance(outcome).await?;
        Ok(client)
    }
}

impl<S> Client<S, Data>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Sends the payload and the terminating dot line.
    ///
    /// The payload must already be CRLF-normalized and dot-stuffed. A CRLF is
    /// inserted before the terminator unless the payload already ends with
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the server rejects the message.
    pub async fn send_message(mut self, payload: &[u8]) -> Result<Client<S, Committed>> {
        let outcome = self.transmit(payload).await;
        let (client, ()) = self.advance(outcome).await?;
        Ok(client)
    }

    async fn transmit(&mut self, payload: &[u8]) -> Result<()> {
        let timeout = self.stream.timeout();
        let terminator: &[u8] = if payload.is_empty() || payload.ends_with(b"\r\n") {
            b".\r\n"
        } else {
            b"\r\n.\r\n"
        };

        self.stream
            .write_all(payload)
            .await
            .map_err(|err| Error::io(Step::DataCommit, err, timeout))?;
        self.stream
            .write_all(terminator)
            .await
            .map_err(|err| Error::io(Step::DataCommit, err, timeout))?;
        tracing::debug!(bytes = payload.len(), "message data sent");

        let reply = read_reply(&mut self.stream, Step::DataCommit).await?;
        expect(Step::DataCommit, &reply, &[ReplyCode::OK])
    }
}

// Common implementation for all states
impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Returns the server information.
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once the session runs over TLS.
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_encrypted()
    }

    /// Sends QUIT and closes the connection.
    ///
    /// Any reply code is returned as-is; the caller decides whether a
    /// missing 221 matters.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange itself fails.
    pub async fn quit(mut self) -> Result<Reply> {
        let timeout = self.stream.timeout();
        tracing::debug!(step = %Step::Quit, command = %Command::Quit, "sending");
        self.stream
            .write_all(&Command::Quit.serialize())
            .await
            .map_err(|err| Error::io(Step::Quit, err, timeout))?;
        let reply = read_reply(&mut self.stream, Step::Quit).await?;
        self.close().await;
        Ok(reply)
    }

    /// Closes the connection without QUIT.
    pub async fn close(mut self) {
        if let Err(err) = self.stream.shutdown().await {
            tracing::debug!(error = %err, "shutdown failed");
        }
    }

    fn transition<Next>(self) -> Client<S, Next> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            client_name: self.client_name,
            _state: PhantomData,
        }
    }

    /// Moves to the next state, or ends the session if the step failed.
    async fn advance<Next, T>(self, outcome: Result<T>) -> Result<(Client<S, Next>, T)> {
        match outcome {
            Ok(value) => Ok((self.transition(), value)),
            Err(err) => Err(self.abort(err).await),
        }
    }

    /// Ends a failed session and hands the error back unchanged.
    ///
    /// After a rejection the server is still listening, so QUIT is sent and
    /// its reply read before closing. Any other failure leaves the
    /// connection unusable and it is simply dropped.
    async fn abort(self, err: Error) -> Error {
        if !err.is_rejection() {
            return err;
        }
        match self.quit().await {
            Ok(reply) => tracing::debug!(code = reply.code.as_u16(), "session aborted"),
            Err(quit_err) => tracing::debug!(error = %quit_err, "QUIT after rejection failed"),
        }
        err
    }

    async fn greet(&mut self, ehlo_step: Step, helo_step: Step) -> Result<()> {
        let ehlo = Command::Ehlo {
            hostname: self.client_name.clone(),
        };
        match self.command(ehlo_step, &ehlo, &[ReplyCode::OK]).await {
            Ok(reply) => {
                // Skip first line which is the greeting
                self.server_info.extensions = reply
                    .message
                    .iter()
                    .skip(1)
                    .map(|line| Extension::parse(line))
                    .collect();
                Ok(())
            }
            Err(err) if err.is_rejection() => {
                tracing::debug!(error = %err, "EHLO rejected, falling back to HELO");
                let helo = Command::Helo {
                    hostname: self.client_name.clone(),
                };
                self.command(helo_step, &helo, &[ReplyCode::OK]).await?;
                self.server_info.extensions.clear();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn command(
        &mut self,
        step: Step,
        cmd: &Command,
        accepted: &[ReplyCode],
    ) -> Result<Reply> {
        let timeout = self.stream.timeout();
        tracing::debug!(step = %step, command = %cmd, "sending");
        self.stream
            .write_all(&cmd.serialize())
            .await
            .map_err(|err| Error::io(step, err, timeout))?;

        let reply = read_reply(&mut self.stream, step).await?;
        expect(step, &reply, accepted)?;
        Ok(reply)
    }
}

async fn read_reply<S>(stream: &mut SmtpStream<S>, step: Step) -> Result<Reply>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let timeout = stream.timeout();
    let mut lines = Vec::new();
    loop {
        let line = stream
            .read_line()
            .await
            .map_err(|err| Error::io(step, err, timeout))?;

        let Some(line) = line else {
            // Connection closed: a partial reply is still parsed
            if lines.is_empty() {
                return Err(Error::EmptyResponse { step });
            }
            break;
        };

        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    let reply =
        parse_reply(&lines).map_err(|err| Error::MalformedReply { step, line: err.0 })?;
    tracing::debug!(step = %step, code = reply.code.as_u16(), raw = %reply.raw, "reply");
    Ok(reply)
}

fn expect(step: Step, reply: &Reply, accepted: &[ReplyCode]) -> Result<()> {
    if accepted.contains(&reply.code) {
        return Ok(());
    }
    Err(Error::UnexpectedReply {
        step,
        code: reply.code.as_u16(),
        message: reply.raw.clone(),
    })
}
