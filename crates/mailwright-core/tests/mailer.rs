//! Integration tests for the mail facade.
//!
//! The relay is a mock stream that replays canned replies and records what
//! the client wrote, so the composed message can be inspected.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use mailwright_core::{
    Delivery, EncryptionMode, ErrorKind, LocalSubmission, Mailer, MailerConfig, OutgoingMessage,
    RecipientStatus, SendError, SmtpSettings,
};
use mailwright_mime::Message;
use mailwright_smtp::Connector;

/// Mock stream that returns predefined responses.
struct MockStream {
    /// Responses to return (in order).
    responses: Cursor<Vec<u8>>,
    /// Captured bytes sent by the client.
    sent: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicUsize>,
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let data = self.responses.get_ref();
        let pos = usize::try_from(self.responses.position()).unwrap();

        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let remaining = &data[pos..];
        let to_read = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Connector handing out at most one mock stream.
#[derive(Clone, Default)]
struct MockRelay {
    responses: Arc<Mutex<Option<Vec<u8>>>>,
    sent: Arc<Mutex<Vec<u8>>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockRelay {
    fn replying(responses: &[&str]) -> Self {
        let relay = Self::default();
        *relay.responses.lock().unwrap() = Some(responses.concat().into_bytes());
        relay
    }

    fn transcript(&self) -> String {
        String::from_utf8(self.sent.lock().unwrap().clone()).unwrap()
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connector for MockRelay {
    type Stream = MockStream;

    async fn connect(&self, _host: &str, _port: u16) -> io::Result<MockStream> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let responses = self
            .responses
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))?;
        Ok(MockStream {
            responses: Cursor::new(responses),
            sent: Arc::clone(&self.sent),
            closed: Arc::clone(&self.closed),
        })
    }
}

/// Local submission that records messages instead of running sendmail.
#[derive(Clone, Default)]
struct RecordingLocal {
    submitted: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingLocal {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

impl LocalSubmission for RecordingLocal {
    async fn submit(&self, message: &Message) -> io::Result<()> {
        self.submitted.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(io::Error::other("sendmail exited with status 75"));
        }
        Ok(())
    }
}

const HAPPY: &[&str] = &[
    "220 smtp.example.com ESMTP\r\n",
    "250-smtp.example.com\r\n250 AUTH LOGIN\r\n",
    "334 VXNlcm5hbWU6\r\n",
    "334 UGFzc3dvcmQ6\r\n",
    "235 ok\r\n",
    "250 ok\r\n",
    "250 ok\r\n",
    "354 go\r\n",
    "250 queued\r\n",
    "221 bye\r\n",
];

fn smtp_config() -> MailerConfig {
    MailerConfig {
        smtp: SmtpSettings {
            host: Some("smtp.example.com".into()),
            username: Some("noreply@swg.example".into()),
            password: Some("secret".into()),
            encryption: EncryptionMode::None,
            ..SmtpSettings::default()
        },
    }
}

fn local_config() -> MailerConfig {
    MailerConfig {
        smtp: SmtpSettings {
            host: Some("smtp.example.com".into()),
            username: Some("noreply@swg.example".into()),
            ..SmtpSettings::default()
        },
    }
}

fn message() -> OutgoingMessage {
    OutgoingMessage::new(
        "SWG <noreply@swg.example>",
        "han@example.com",
        "Verify your account",
        "Hello Han,\n.\n.hidden line\nBye",
    )
    .from_name("SWG Security Team")
    .to_name("Han Solo")
}

fn mailer(
    config: MailerConfig,
    relay: &MockRelay,
    local: &RecordingLocal,
) -> Mailer<MockRelay, RecordingLocal> {
    Mailer::new(config)
        .with_connector(relay.clone())
        .with_local(local.clone())
}

#[tokio::test]
async fn test_sends_over_smtp() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();

    let delivery = mailer(smtp_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap();

    let Delivery::Smtp {
        receipt,
        message_id,
    } = delivery
    else {
        panic!("expected SMTP delivery");
    };
    assert_eq!(receipt.recipient, RecipientStatus::Accepted);
    assert!(receipt.quit_acknowledged);
    assert!(message_id.ends_with("@swg.example>"));

    let transcript = relay.transcript();
    assert!(transcript.starts_with("EHLO swg.example\r\nAUTH LOGIN\r\n"));
    assert!(transcript.contains("MAIL FROM:<noreply@swg.example>\r\n"));
    assert!(transcript.contains("RCPT TO:<han@example.com>\r\nDATA\r\n"));
    assert!(transcript.contains("From: \"SWG Security Team\" <noreply@swg.example>\r\n"));
    assert!(transcript.contains("To: \"Han Solo\" <han@example.com>\r\n"));
    assert!(transcript.contains("Subject: Verify your account\r\n"));
    assert!(transcript.contains(&format!("Message-ID: {message_id}\r\n")));
    assert!(!transcript.contains("Reply-To:"));
    assert!(
        transcript.contains("\r\n\r\nHello Han,\r\n..\r\n..hidden line\r\nBye\r\n.\r\nQUIT\r\n")
    );
    assert!(!transcript.contains("secret"));

    assert_eq!(relay.opened(), 1);
    assert_eq!(relay.closed(), 1);
    assert!(local.submitted().is_empty());
}

#[tokio::test]
async fn test_encodes_non_ascii_headers() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();
    let message = OutgoingMessage::new(
        "noreply@swg.example",
        "han@example.com",
        "Vérifiez votre compte",
        "Bonjour",
    )
    .to_name("Hån Sôlo");

    mailer(smtp_config(), &relay, &local)
        .send(&message)
        .await
        .unwrap();

    let transcript = relay.transcript();
    assert!(transcript.contains("Subject: =?UTF-8?B?"));
    assert!(transcript.contains("To: =?UTF-8?B?"));
    assert!(!transcript.contains("\"=?UTF-8"));
}

#[tokio::test]
async fn test_falls_back_to_local_submission() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();

    let delivery = mailer(local_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap();

    assert!(matches!(delivery, Delivery::LocalSubmission { .. }));
    assert_eq!(relay.opened(), 0);

    let submitted = local.submitted();
    assert_eq!(submitted.len(), 1);
    let rendered = &submitted[0];
    assert!(rendered.contains("Reply-To: noreply@swg.example\r\n"));
    assert!(rendered.contains("To: \"Han Solo\" <han@example.com>\r\n"));
    // Local transports do their own dot handling.
    assert!(rendered.contains("\r\n.hidden line\r\n"));
}

#[tokio::test]
async fn test_local_submission_failure() {
    let relay = MockRelay::default();
    let local = RecordingLocal::failing();

    let err = mailer(local_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap_err();

    assert!(matches!(err, SendError::LocalSubmission(_)));
    assert_eq!(err.kind(), ErrorKind::Transmission);
    assert!(err.to_string().contains("status 75"));
}

#[tokio::test]
async fn test_invalid_from_address() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();
    let mut message = message();
    message.from_address = "not an address".into();

    let err = mailer(smtp_config(), &relay, &local)
        .send(&message)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.tag(), "config");
    assert_eq!(relay.opened(), 0);
    assert!(local.submitted().is_empty());
}

#[tokio::test]
async fn test_invalid_to_address() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();
    let mut message = message();
    message.to_address = "han@".into();

    let err = mailer(smtp_config(), &relay, &local)
        .send(&message)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(relay.opened(), 0);
}

#[tokio::test]
async fn test_local_submission_rejects_header_injection_in_to() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();
    let mut message = message();
    message.to_address = "han@example.com\r\nBcc: victim@evil.example".into();

    let err = mailer(local_config(), &relay, &local)
        .send(&message)
        .await
        .unwrap_err();

    assert!(matches!(&err, SendError::Config(m) if m.contains("\"to\"")));
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(relay.opened(), 0);
    assert!(local.submitted().is_empty());
}

#[tokio::test]
async fn test_zero_port_is_rejected() {
    let relay = MockRelay::replying(HAPPY);
    let local = RecordingLocal::default();
    let mut config = smtp_config();
    config.smtp.port = 0;

    let err = mailer(config, &relay, &local)
        .send(&message())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(relay.opened(), 0);
    assert!(local.submitted().is_empty());
}

#[tokio::test]
async fn test_auth_failure_is_classified() {
    let relay = MockRelay::replying(&[
        "220 smtp.example.com ESMTP\r\n",
        "250 smtp.example.com\r\n",
        "334 VXNlcm5hbWU6\r\n",
        "334 UGFzc3dvcmQ6\r\n",
        "535 5.7.8 Authentication credentials invalid\r\n",
    ]);
    let local = RecordingLocal::default();

    let err = mailer(smtp_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap_err();

    assert!(matches!(err, SendError::Smtp(_)));
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.tag(), "auth-pass");
    let transcript = relay.transcript();
    assert!(!transcript.contains("MAIL FROM"));
    assert!(transcript.ends_with("QUIT\r\n"));
    assert_eq!(relay.opened(), 1);
    assert_eq!(relay.closed(), 1);
}

#[tokio::test]
async fn test_unreachable_relay() {
    let relay = MockRelay::default();
    let local = RecordingLocal::default();

    let err = mailer(smtp_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connect);
    assert_eq!(err.tag(), "connect");
    assert!(local.submitted().is_empty());
}

#[tokio::test]
async fn test_server_hangs_up() {
    let relay = MockRelay::replying(&["220 smtp.example.com ESMTP\r\n"]);
    let local = RecordingLocal::default();

    let err = mailer(smtp_config(), &relay, &local)
        .send(&message())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.tag(), "empty-response");
    assert_eq!(relay.closed(), 1);
}
