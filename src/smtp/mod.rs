pub mod dispatcher;
pub mod transport;

use std::fmt;
use std::io;
use std::path::PathBuf;

pub use dispatcher::MailDispatcher;
pub use transport::{SmtpSubmitter, Submit};

/// How a connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// TLS from the first byte (SMTPS).
    ImplicitTls,
    /// Plaintext connection upgraded with `STARTTLS`.
    StartTls,
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Security::ImplicitTls => f.write_str("implicit TLS"),
            Security::StartTls => f.write_str("STARTTLS"),
        }
    }
}

/// A completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub security: Security,
    /// Set when implicit TLS failed and STARTTLS delivered the message.
    pub fallback_reason: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("failed to read attachment {path}: {source}")]
    Attachment { path: PathBuf, source: io::Error },
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("implicit TLS failed ({implicit_tls}); STARTTLS failed ({starttls})")]
    Exhausted {
        implicit_tls: String,
        starttls: String,
    },
}

impl DeliveryError {
    /// True when the message was built but both connection attempts failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, DeliveryError::Exhausted { .. })
    }
}
