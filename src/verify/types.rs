use std::fmt;

use crate::smtp::{CatchAllProbe, SmtpEvent, SmtpReply};

/// Final answer about an address. Exactly one per verification.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Valid,
    CatchAll,
    Invalid,
    Risky,
    Greylisted,
    SmtpBlocked,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::CatchAll => "catch_all",
            Self::Invalid => "invalid",
            Self::Risky => "risky",
            Self::Greylisted => "greylisted",
            Self::SmtpBlocked => "smtp_blocked",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a verification can end short of `valid` / `catch_all`.
///
/// The first four are decided locally before any SMTP traffic; the last four
/// come out of host probes and only surface once no host is left to try.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidSyntax,
    DisposableDomain,
    RoleBasedAddress,
    NoMxRecords,
    PermanentReject,
    Timeout,
    ConnectionRefused,
    OtherProtocolFailure,
}

impl FailureKind {
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::InvalidSyntax
            | Self::DisposableDomain
            | Self::NoMxRecords
            | Self::PermanentReject => Verdict::Invalid,
            Self::RoleBasedAddress => Verdict::Risky,
            Self::Timeout => Verdict::Greylisted,
            Self::ConnectionRefused => Verdict::SmtpBlocked,
            Self::OtherProtocolFailure => Verdict::Unknown,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "Invalid email syntax",
            Self::DisposableDomain => "Disposable email domain",
            Self::RoleBasedAddress => "Role-based email address",
            Self::NoMxRecords => "No valid MX records",
            Self::PermanentReject => "User not found (550)",
            Self::Timeout => "SMTP server timed out (possible greylisting)",
            Self::ConnectionRefused => "SMTP connection refused",
            Self::OtherProtocolFailure => "SMTP check failed for unknown reasons",
        }
    }
}

pub(crate) const CATCH_ALL_REASON: &str = "Domain accepts all addresses (catch-all)";
pub(crate) const EXHAUSTED_REASON: &str = "All MX checks failed";

/// The SMTP exchange that decided the verdict.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEvidence {
    pub exchange: String,
    /// Reply to the real `RCPT TO`, or the reply that ended the dialogue.
    pub reply: Option<SmtpReply>,
    pub catch_all_probe: Option<CatchAllProbe>,
    pub transcript: Vec<SmtpEvent>,
}

/// One contacted host, in the order hosts were tried.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttempt {
    pub exchange: String,
    pub failure: Option<FailureKind>,
    pub detail: String,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub status: Verdict,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub reason: Option<String>,
    pub catch_all: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub smtp_evidence: Option<SmtpEvidence>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub attempts: Vec<HostAttempt>,
}

impl VerificationResult {
    pub(crate) fn failed(kind: FailureKind) -> Self {
        Self::with_reason(kind.verdict(), kind.reason())
    }

    pub(crate) fn accepted(catch_all: bool) -> Self {
        if catch_all {
            Self {
                catch_all: true,
                ..Self::with_reason(Verdict::CatchAll, CATCH_ALL_REASON)
            }
        } else {
            Self {
                status: Verdict::Valid,
                reason: None,
                catch_all: false,
                smtp_evidence: None,
                attempts: Vec::new(),
            }
        }
    }

    pub(crate) fn exhausted() -> Self {
        Self::with_reason(Verdict::Unknown, EXHAUSTED_REASON)
    }

    fn with_reason(status: Verdict, reason: &str) -> Self {
        Self {
            status,
            reason: Some(reason.to_string()),
            catch_all: false,
            smtp_evidence: None,
            attempts: Vec::new(),
        }
    }

    pub(crate) fn evidence(mut self, evidence: SmtpEvidence) -> Self {
        self.smtp_evidence = Some(evidence);
        self
    }

    pub(crate) fn attempts(mut self, attempts: Vec<HostAttempt>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.status == Verdict::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_table_matches_verdicts() {
        let expected = [
            (FailureKind::InvalidSyntax, Verdict::Invalid),
            (FailureKind::DisposableDomain, Verdict::Invalid),
            (FailureKind::RoleBasedAddress, Verdict::Risky),
            (FailureKind::NoMxRecords, Verdict::Invalid),
            (FailureKind::PermanentReject, Verdict::Invalid),
            (FailureKind::Timeout, Verdict::Greylisted),
            (FailureKind::ConnectionRefused, Verdict::SmtpBlocked),
            (FailureKind::OtherProtocolFailure, Verdict::Unknown),
        ];
        for (kind, verdict) in expected {
            assert_eq!(kind.verdict(), verdict, "{kind:?}");
        }
    }

    #[test]
    fn valid_has_no_reason_and_catch_all_has_one() {
        let valid = VerificationResult::accepted(false);
        assert_eq!(valid.status, Verdict::Valid);
        assert!(valid.reason.is_none());
        assert!(!valid.catch_all);

        let catch_all = VerificationResult::accepted(true);
        assert_eq!(catch_all.status, Verdict::CatchAll);
        assert!(catch_all.catch_all);
        assert!(catch_all.reason.is_some());
    }

    #[test]
    fn verdict_strings_are_snake_case() {
        assert_eq!(Verdict::SmtpBlocked.to_string(), "smtp_blocked");
        assert_eq!(Verdict::CatchAll.to_string(), "catch_all");
    }
}
