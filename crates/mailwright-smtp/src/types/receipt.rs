//! Result of a completed SMTP transaction.

/// How the server took the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientStatus {
    /// 250: the server accepted responsibility for the mailbox.
    Accepted,
    /// 251: user not local, the server will forward.
    ///
    /// Still a success, but the delivery path leaves this server.
    Forwarded,
}

/// Summary of a committed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Recipient acceptance.
    pub recipient: RecipientStatus,
    /// True if the message travelled over TLS.
    pub encrypted: bool,
    /// True if `QUIT` got its 221.
    pub quit_acknowledged: bool,
}
