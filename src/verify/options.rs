use std::borrow::Cow;
use std::time::Duration;

use crate::reputation::ReputationLists;
use crate::smtp::SMTP_PORT;

const DEFAULT_HELO: &str = "localhost";

/// Per-call knobs for [`Verifier::verify`](super::Verifier::verify).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOptions {
    pub check_catch_all: bool,
    /// `None` tries every resolved host. Values below 1 are raised to 1.
    pub max_hosts_tried: Option<usize>,
    pub per_host_timeout_ms: u64,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            check_catch_all: true,
            max_hosts_tried: None,
            per_host_timeout_ms: 5_000,
        }
    }
}

impl VerificationOptions {
    /// Deadline applied to the connect and to every command round-trip.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.per_host_timeout_ms)
    }

    pub(crate) fn host_limit(&self, resolved: usize) -> usize {
        self.max_hosts_tried
            .unwrap_or(resolved)
            .max(1)
            .min(resolved)
    }
}

/// Process-level settings, built once and shared by every verification.
///
/// The `Default` identity (`localhost`) is a placeholder: many exchangers
/// refuse a non-FQDN greeting or an unresolvable sender domain, which turns
/// them into `unknown`. Use [`VerifierConfig::new`] with a host name that
/// resolves back to the verifying machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Name announced in `EHLO`/`HELO`.
    pub helo_domain: String,
    /// Envelope sender; `verify@<helo_domain>` when unset.
    pub mail_from: Option<String>,
    pub port: u16,
    pub lists: ReputationLists,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            helo_domain: DEFAULT_HELO.to_string(),
            mail_from: None,
            port: SMTP_PORT,
            lists: ReputationLists::builtin(),
        }
    }
}

impl VerifierConfig {
    /// Built-in lists, port 25 and `verify@<helo_domain>` as sender.
    pub fn new(helo_domain: impl Into<String>) -> Self {
        Self {
            helo_domain: helo_domain.into(),
            ..Self::default()
        }
    }

    /// Whether the greeting still uses the `localhost` placeholder.
    pub fn has_placeholder_helo(&self) -> bool {
        self.helo_domain() == DEFAULT_HELO
    }

    pub fn helo_domain(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() { DEFAULT_HELO } else { trimmed }
    }

    pub fn mail_from(&self) -> Cow<'_, str> {
        self.mail_from
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(format!("verify@{}", self.helo_domain())))
    }
}
