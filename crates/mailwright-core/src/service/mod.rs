//! Sending services.
//!
//! [`Mailer`] is the entry point; [`LocalSubmission`] is the seam for the
//! fallback transport used when no relay is configured.

mod local;
mod mailer;

pub use local::{LocalSubmission, Sendmail};
pub use mailer::{Delivery, Mailer, send_email};
