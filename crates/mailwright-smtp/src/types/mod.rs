//! Core SMTP types.

mod address;
mod encryption;
mod extension;
mod receipt;
mod reply;
mod step;

pub use address::Address;
pub use encryption::EncryptionMode;
pub use extension::{AuthMechanism, Extension};
pub use receipt::{Receipt, RecipientStatus};
pub use reply::{Reply, ReplyCode};
pub use step::Step;
