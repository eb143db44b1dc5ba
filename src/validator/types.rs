use std::fmt;

use thiserror::Error;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub reasons: Vec<String>,
}

/// A syntactically valid address, split once into its local part and domain.
///
/// Built only by [`parse_address`](super::parse_address); the fields cannot be
/// changed afterwards.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    original: String,
    local: String,
    domain: String,
    ascii_domain: String,
}

impl EmailAddress {
    pub(crate) fn new(original: &str, local: &str, domain: String, ascii_domain: String) -> Self {
        Self {
            original: original.to_string(),
            local: local.to_string(),
            domain,
            ascii_domain,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Lower-cased domain as typed (may contain Unicode).
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Punycode form of the domain, used for DNS and on the SMTP wire.
    pub fn ascii_domain(&self) -> &str {
        &self.ascii_domain
    }

    /// `local@ascii_domain`, the form sent in `RCPT TO`.
    pub fn mailbox(&self) -> String {
        format!("{}@{}", self.local, self.ascii_domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("invalid email syntax: {}", reasons.join("; "))]
    InvalidFormat { reasons: Vec<String> },
}

impl EmailError {
    pub(crate) fn invalid(reasons: Vec<String>) -> Self {
        Self::InvalidFormat { reasons }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Self::InvalidFormat { reasons } => reasons,
        }
    }
}
