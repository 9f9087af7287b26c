//! Low-level SMTP stream handling.

use crate::config::SmtpEndpointConfig;
use crate::error::{Error, Result};
use crate::types::{EncryptionMode, Step};
use rustls::pki_types::ServerName;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

/// Longest reply line accepted from a server.
const MAX_LINE_LEN: u64 = 2048;

/// Opens the raw byte stream to a server.
///
/// [`TcpConnector`] is the production implementation; tests substitute
/// scripted in-memory streams.
pub trait Connector: Send + Sync {
    /// Transport produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connects to `host:port`.
    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

#[derive(Debug)]
enum Inner<S> {
    Plain(BufReader<S>),
    Tls(Box<BufReader<TlsStream<S>>>),
}

/// SMTP stream (plain or TLS) with a per-operation timeout.
#[derive(Debug)]
pub struct SmtpStream<S> {
    inner: Inner<S>,
    timeout: Duration,
    tls_config: Option<Arc<ClientConfig>>,
}

impl<S> SmtpStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps an unencrypted transport.
    pub fn plain(io: S, timeout: Duration) -> Self {
        Self {
            inner: Inner::Plain(BufReader::new(io)),
            timeout,
            tls_config: None,
        }
    }

    /// Verifies the server with `config` when upgrading instead of the
    /// bundled web PKI roots.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Returns true once the stream runs over TLS.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self.inner, Inner::Tls(_))
    }

    /// Per-operation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reads one line, without its terminator.
    ///
    /// Returns `None` when the peer closed the connection before sending
    /// anything. Lines longer than the accepted maximum are cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or times out.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let read = match &mut self.inner {
            Inner::Plain(reader) => read_capped(reader, &mut buf, self.timeout).await?,
            Inner::Tls(reader) => read_capped(&mut **reader, &mut buf, self.timeout).await?,
        };

        if read == 0 {
            return Ok(None);
        }

        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Writes and flushes data.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let timeout = self.timeout;
        match &mut self.inner {
            Inner::Plain(reader) => {
                let io = reader.get_mut();
                with_timeout(timeout, async {
                    io.write_all(data).await?;
                    io.flush().await
                })
                .await
            }
            Inner::Tls(reader) => {
                let io = reader.get_mut();
                with_timeout(timeout, async {
                    io.write_all(data).await?;
                    io.flush().await
                })
                .await
            }
        }
    }

    /// Upgrades a plain stream to TLS, verifying `hostname`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted, the hostname is
    /// not a valid server name, or the handshake fails.
    pub async fn upgrade_to_tls(self, hostname: &str) -> io::Result<Self> {
        let Inner::Plain(reader) = self.inner else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "stream already uses TLS",
            ));
        };

        // Buffered bytes at this point would be a protocol violation
        // (RFC 3207 section 5), so they are dropped with the reader.
        let io = reader.into_inner();

        let server_name = ServerName::try_from(hostname.to_string()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid server name: {hostname}"),
            )
        })?;

        let config = self.tls_config.clone().unwrap_or_else(default_tls_config);
        let tls = with_timeout(
            self.timeout,
            TlsConnector::from(Arc::clone(&config)).connect(server_name, io),
        )
        .await?;

        Ok(Self {
            inner: Inner::Tls(Box::new(BufReader::new(tls))),
            timeout: self.timeout,
            tls_config: Some(config),
        })
    }

    /// Shuts the write side down, sending `close_notify` on TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails or times out.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        let timeout = self.timeout;
        match &mut self.inner {
            Inner::Plain(reader) => with_timeout(timeout, reader.get_mut().shutdown()).await,
            Inner::Tls(reader) => with_timeout(timeout, reader.get_mut().shutdown()).await,
        }
    }
}

/// Connects to the configured server.
///
/// For [`EncryptionMode::ImplicitTls`] the TLS handshake happens here, before
/// the banner is read.
///
/// # Errors
///
/// Returns [`Error::Connect`], [`Error::Timeout`] or [`Error::Tls`], all
/// tagged with [`Step::Connect`].
pub async fn open<C: Connector>(
    connector: &C,
    config: &SmtpEndpointConfig,
) -> Result<SmtpStream<C::Stream>> {
    let timeout = config.timeout();
    let io = with_timeout(timeout, connector.connect(config.host(), config.port()))
        .await
        .map_err(|source| {
            if source.kind() == io::ErrorKind::TimedOut {
                Error::Timeout {
                    step: Step::Connect,
                    timeout,
                }
            } else {
                Error::Connect {
                    host: config.host().to_string(),
                    port: config.port(),
                    source,
                }
            }
        })?;

    let mut stream = SmtpStream::plain(io, timeout);
    if let Some(tls) = config.tls_config() {
        stream = stream.with_tls_config(Arc::clone(tls));
    }
    if config.encryption() == EncryptionMode::ImplicitTls {
        return stream
            .upgrade_to_tls(config.host())
            .await
            .map_err(|err| Error::tls(Step::Connect, err, timeout));
    }
    Ok(stream)
}

async fn read_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: Duration,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let read = with_timeout(
        limit,
        AsyncReadExt::take(&mut *reader, MAX_LINE_LEN).read_until(b'\n', buf),
    )
    .await?;
    if read as u64 == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
        with_timeout(limit, skip_line(reader)).await?;
    }
    Ok(read)
}

/// Consumes input up to and including the next line feed.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), available.is_empty()),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "operation timed out"))?
}

/// TLS 1.3/1.2 client configuration trusting the bundled web PKI roots.
fn default_tls_config() -> Arc<ClientConfig> {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder_with_protocol_versions(&[
        &rustls::version::TLS13,
        &rustls::version::TLS12,
    ])
    .with_root_certificates(root_store)
    .with_no_client_auth();

    Arc::new(config)
}
