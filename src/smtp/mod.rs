//! Minimal SMTP probing: connect, greet, declare a sender, offer recipients,
//! quit. No message is ever transmitted.

mod catchall;
mod dialer;
mod error;
mod probe;
mod session;
mod types;

pub use catchall::{CatchAllProbe, FixedLocalPart, LocalPartGenerator, RandomLocalPart};
pub use dialer::{Dialer, SMTP_PORT, TcpDialer};
pub use error::ProbeFailure;
pub use types::{AttemptStage, SmtpEvent, SmtpReply};

pub(crate) use probe::{HostOutcome, HostReport, ProbePlan, probe_host};
