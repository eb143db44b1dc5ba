use std::time::Duration;

use thiserror::Error;

use super::types::{AttemptStage, SmtpReply};
use crate::verify::FailureKind;

/// Why a probe against one host ended without an answer about the mailbox.
///
/// A negative SMTP reply at any stage other than the real `RCPT TO` lands in
/// [`ProbeFailure::Reply`]; the mailbox verdicts themselves are carried by
/// [`HostOutcome`](super::HostOutcome), not by this type.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("{stage} timed out after {}ms", timeout.as_millis())]
    Timeout {
        stage: AttemptStage,
        timeout: Duration,
    },
    #[error("connection to {exchange} failed: {source}")]
    ConnectionRefused {
        exchange: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: AttemptStage,
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error during {stage}: {message}")]
    Protocol {
        stage: AttemptStage,
        message: String,
    },
    #[error("{stage} answered {reply}")]
    Reply {
        stage: AttemptStage,
        reply: SmtpReply,
    },
}

impl ProbeFailure {
    pub(crate) fn timeout(stage: AttemptStage, timeout: Duration) -> Self {
        Self::Timeout { stage, timeout }
    }

    pub(crate) fn refused(exchange: impl Into<String>, source: std::io::Error) -> Self {
        Self::ConnectionRefused {
            exchange: exchange.into(),
            source,
        }
    }

    pub(crate) fn io(stage: AttemptStage, source: std::io::Error) -> Self {
        Self::Io { stage, source }
    }

    pub(crate) fn protocol(stage: AttemptStage, message: impl Into<String>) -> Self {
        Self::Protocol {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn reply(stage: AttemptStage, reply: SmtpReply) -> Self {
        Self::Reply { stage, reply }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::ConnectionRefused { .. } => FailureKind::ConnectionRefused,
            Self::Io { .. } | Self::Protocol { .. } | Self::Reply { .. } => {
                FailureKind::OtherProtocolFailure
            }
        }
    }

    /// Stage at which the host gave up, for diagnostics.
    pub fn stage(&self) -> AttemptStage {
        match self {
            Self::ConnectionRefused { .. } => AttemptStage::Connect,
            Self::Timeout { stage, .. }
            | Self::Io { stage, .. }
            | Self::Protocol { stage, .. }
            | Self::Reply { stage, .. } => *stage,
        }
    }
}
