//! Outgoing message model.

/// A plain-text message to deliver to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Sender address, bare or in `Name <addr>` form.
    pub from_address: String,
    /// Sender display name; empty for none.
    pub from_name: String,
    /// Recipient address, bare or in `Name <addr>` form.
    pub to_address: String,
    /// Recipient display name.
    pub to_name: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Plain text body, any line endings.
    pub body: String,
}

impl OutgoingMessage {
    /// Creates a new outgoing message.
    #[must_use]
    pub fn new(
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            from_name: String::new(),
            to_address: to_address.into(),
            to_name: None,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
    }

    /// Sets the recipient display name.
    #[must_use]
    pub fn to_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }
}
