//! Local submission through a sendmail-compatible binary.

use mailwright_mime::Message;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Hands a composed message to the host's mail system.
pub trait LocalSubmission: Send + Sync {
    /// Submits the message; recipients are taken from its headers.
    fn submit(&self, message: &Message) -> impl Future<Output = io::Result<()>> + Send;
}

/// Pipes the message into `sendmail -t -i`.
#[derive(Debug, Clone)]
pub struct Sendmail {
    command: PathBuf,
}

impl Default for Sendmail {
    fn default() -> Self {
        Self::new()
    }
}

impl Sendmail {
    /// Uses `/usr/sbin/sendmail`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            command: PathBuf::from("/usr/sbin/sendmail"),
        }
    }

    /// Uses a different sendmail-compatible binary.
    #[must_use]
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl LocalSubmission for Sendmail {
    async fn submit(&self, message: &Message) -> io::Result<()> {
        let mut child = Command::new(&self.command)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sendmail stdin closed"))?;
        stdin.write_all(message.to_string().as_bytes()).await?;
        stdin.shutdown().await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        tracing::debug!(
            command = %self.command.display(),
            status = %output.status,
            message_id = message.message_id(),
            "sendmail finished"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailwright_mime::MessageBuilder;

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let message = MessageBuilder::new("a@example.com", "b@example.com")
            .subject("hi")
            .build()
            .unwrap();
        let sendmail = Sendmail::with_command("/nonexistent/mailwright-sendmail");

        let err = sendmail.submit(&message).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
