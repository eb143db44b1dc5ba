//! End-to-end verification: syntax, reputation, MX, then SMTP probes.
//!
//! [`Verifier::verify`] always produces a [`VerificationResult`]; the only
//! errors in this module ([`VerifierError`]) come from building a verifier.

mod error;
mod options;
mod types;

pub use error::VerifierError;
pub use options::{VerificationOptions, VerifierConfig};
pub use types::{FailureKind, HostAttempt, SmtpEvidence, Verdict, VerificationResult};

use trust_dns_resolver::TokioAsyncResolver;

use crate::mx::{self, LookupMx, MxRecord, MxStatus};
use crate::reputation::ReputationFlag;
use crate::smtp::{
    Dialer, HostOutcome, HostReport, LocalPartGenerator, ProbeFailure, ProbePlan,
    RandomLocalPart, TcpDialer, probe_host,
};
use crate::validator::{EmailAddress, parse_address};

/// Verifies `address` with the system resolver, plain TCP on port 25 and the
/// built-in reputation lists.
///
/// The greeting is `EHLO localhost` and the sender `verify@localhost`, which
/// strict exchangers refuse. Outside of quick checks, build a [`Verifier`]
/// from [`VerifierConfig::new`] with the host's real name.
pub async fn verify_email(address: &str) -> Result<VerificationResult, VerifierError> {
    verify_email_with_options(address, &VerificationOptions::default()).await
}

pub async fn verify_email_with_options(
    address: &str,
    options: &VerificationOptions,
) -> Result<VerificationResult, VerifierError> {
    let verifier = Verifier::from_system_conf(VerifierConfig::default())?;
    Ok(verifier.verify(address, options).await)
}

/// Holds the collaborators of a verification; cheap to share behind an `Arc`.
pub struct Verifier<R = TokioAsyncResolver, D = TcpDialer> {
    config: VerifierConfig,
    resolver: R,
    dialer: D,
    local_parts: Box<dyn LocalPartGenerator>,
}

impl Verifier {
    /// Uses `/etc/resolv.conf` (or the platform equivalent) and TCP on
    /// `config.port`.
    pub fn from_system_conf(config: VerifierConfig) -> Result<Self, VerifierError> {
        if config.has_placeholder_helo() {
            tracing::warn!("HELO name is the localhost placeholder; many MX hosts will refuse it");
        }
        let resolver = mx::system_resolver()?;
        let dialer = TcpDialer::new(config.port);
        Ok(Self::with_parts(config, resolver, dialer))
    }
}

impl<R, D> Verifier<R, D>
where
    R: LookupMx,
    D: Dialer,
{
    pub fn with_parts(config: VerifierConfig, resolver: R, dialer: D) -> Self {
        Self {
            config,
            resolver,
            dialer,
            local_parts: Box::new(RandomLocalPart::default()),
        }
    }

    /// Replaces the source of synthetic catch-all local parts.
    pub fn with_local_part_generator<G>(mut self, generator: G) -> Self
    where
        G: LocalPartGenerator + 'static,
    {
        self.local_parts = Box::new(generator);
        self
    }

    pub async fn verify(&self, address: &str, options: &VerificationOptions) -> VerificationResult {
        let result = self.run(address, options).await;
        tracing::info!(
            address,
            status = %result.status,
            reason = result.reason.as_deref().unwrap_or(""),
            catch_all = result.catch_all,
            "verification finished"
        );
        result
    }

    async fn run(&self, raw: &str, options: &VerificationOptions) -> VerificationResult {
        let address = match parse_address(raw) {
            Ok(address) => address,
            Err(err) => {
                tracing::debug!(address = raw, error = %err, "syntax check failed");
                return VerificationResult::failed(FailureKind::InvalidSyntax);
            }
        };

        match self.config.lists.check(&address) {
            Some(ReputationFlag::Disposable) => {
                return VerificationResult::failed(FailureKind::DisposableDomain);
            }
            Some(ReputationFlag::RoleBased) => {
                return VerificationResult::failed(FailureKind::RoleBasedAddress);
            }
            None => {}
        }

        let records = match mx::resolve_with(&self.resolver, address.ascii_domain()).await {
            Ok(MxStatus::Records(records)) => records,
            Ok(MxStatus::NoRecords) => {
                tracing::debug!(domain = address.ascii_domain(), "no MX records");
                return VerificationResult::failed(FailureKind::NoMxRecords);
            }
            Err(err) => {
                tracing::debug!(domain = address.ascii_domain(), error = %err, "MX lookup failed");
                return VerificationResult::failed(FailureKind::NoMxRecords);
            }
        };

        self.probe_hosts(&address, &records, options).await
    }

    /// Tries hosts in preference order, one at a time. A rejection or an
    /// acceptance ends the loop; inconclusive hosts hand over to the next one
    /// and only the last host's failure becomes the verdict.
    async fn probe_hosts(
        &self,
        address: &EmailAddress,
        records: &[MxRecord],
        options: &VerificationOptions,
    ) -> VerificationResult {
        let hosts = &records[..options.host_limit(records.len())];
        let recipient = address.mailbox();
        let synthetic = options
            .check_catch_all
            .then(|| format!("{}@{}", self.local_parts.generate(), address.ascii_domain()));
        let mail_from = self.config.mail_from();

        let mut attempts = Vec::with_capacity(hosts.len());
        for (index, record) in hosts.iter().enumerate() {
            let is_last = index + 1 == hosts.len();
            let plan = ProbePlan {
                exchange: &record.exchange,
                helo: self.config.helo_domain(),
                mail_from: &mail_from,
                recipient: &recipient,
                synthetic: synthetic.as_deref(),
                timeout: options.timeout(),
            };
            let report = probe_host(&self.dialer, &plan).await;
            let catch_all = report.is_catch_all();
            attempts.push(attempt_of(&report));

            let HostReport {
                exchange,
                outcome,
                catch_all: catch_all_probe,
                transcript,
            } = report;
            let mut evidence = SmtpEvidence {
                exchange,
                reply: None,
                catch_all_probe,
                transcript,
            };

            match outcome {
                HostOutcome::Rejected { reply } => {
                    evidence.reply = Some(reply);
                    return VerificationResult::failed(FailureKind::PermanentReject)
                        .evidence(evidence)
                        .attempts(attempts);
                }
                HostOutcome::Accepted { reply } => {
                    evidence.reply = Some(reply);
                    return VerificationResult::accepted(catch_all)
                        .evidence(evidence)
                        .attempts(attempts);
                }
                HostOutcome::Failed(failure) => {
                    let kind = failure.kind();
                    if is_last {
                        if let ProbeFailure::Reply { reply, .. } = failure {
                            evidence.reply = Some(reply);
                        }
                        return VerificationResult::failed(kind)
                            .evidence(evidence)
                            .attempts(attempts);
                    }
                    tracing::warn!(
                        exchange = %evidence.exchange,
                        error = %failure,
                        "host inconclusive, trying next MX"
                    );
                }
            }
        }

        VerificationResult::exhausted().attempts(attempts)
    }
}

fn attempt_of(report: &HostReport) -> HostAttempt {
    let (failure, detail) = match &report.outcome {
        HostOutcome::Accepted { reply } => (None, format!("accepted: {reply}")),
        HostOutcome::Rejected { reply } => {
            (Some(FailureKind::PermanentReject), format!("rejected: {reply}"))
        }
        HostOutcome::Failed(failure) => (Some(failure.kind()), failure.to_string()),
    };
    HostAttempt {
        exchange: report.exchange.clone(),
        failure,
        detail,
    }
}

#[cfg(test)]
mod tests;
