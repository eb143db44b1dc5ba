//! Catch-all detection: a recipient nobody could own is offered first, and
//! its acceptance means the server accepts every address.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, distributions::Alphanumeric};

use super::types::SmtpReply;

const NONCE_LEN: usize = 10;

/// Produces the local part of the synthetic catch-all recipient.
pub trait LocalPartGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `<prefix><nanosecond timestamp, hex><random alphanumeric nonce>`, lower
/// case. The timestamp/nonce pair keeps collisions with real mailboxes out of
/// reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomLocalPart {
    prefix: String,
}

impl RandomLocalPart {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomLocalPart {
    fn default() -> Self {
        Self::new("probe-")
    }
}

impl LocalPartGenerator for RandomLocalPart {
    fn generate(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        format!("{}{nanos:x}{nonce}", self.prefix).to_ascii_lowercase()
    }
}

/// Always returns the same local part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLocalPart(pub String);

impl LocalPartGenerator for FixedLocalPart {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// How the server answered the synthetic recipient.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchAllProbe {
    pub address: String,
    pub reply: SmtpReply,
}

impl CatchAllProbe {
    pub fn new(address: impl Into<String>, reply: SmtpReply) -> Self {
        Self {
            address: address.into(),
            reply,
        }
    }

    /// Any 2xx means the domain takes mail for addresses that cannot exist.
    pub fn is_catch_all(&self) -> bool {
        self.reply.is_positive_completion()
    }
}
