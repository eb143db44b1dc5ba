#![forbid(unsafe_code)]
//! mailprobe_lib : vérifie qu'une adresse e-mail est délivrable
//! (syntaxe, réputation du domaine, MX, sonde SMTP sans envoi).

pub mod mx;
pub mod reputation;
pub mod smtp;
pub mod validator;
pub mod verify;

pub use mx::{Error as MxError, LookupMx, MxRecord, MxStatus, check_mx};
pub use reputation::{ConfigError, ReputationFlag, ReputationLists};
pub use smtp::{
    AttemptStage, CatchAllProbe, Dialer, FixedLocalPart, LocalPartGenerator, ProbeFailure,
    RandomLocalPart, SMTP_PORT, SmtpEvent, SmtpReply, TcpDialer,
};
pub use validator::{EmailAddress, EmailError, ValidationReport, parse_address, validate_email};
pub use verify::{
    FailureKind, HostAttempt, SmtpEvidence, Verdict, VerificationOptions, VerificationResult,
    Verifier, VerifierConfig, VerifierError, verify_email, verify_email_with_options,
};
