use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use super::catchall::CatchAllProbe;
use super::dialer::Dialer;
use super::error::ProbeFailure;
use super::session::{SmtpSession, bounded};
use super::types::{AttemptStage as Stage, SmtpEvent, SmtpReply};

/// Everything one host probe needs to know.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProbePlan<'a> {
    pub exchange: &'a str,
    pub helo: &'a str,
    pub mail_from: &'a str,
    pub recipient: &'a str,
    /// Synthetic catch-all recipient; `None` skips the catch-all step.
    pub synthetic: Option<&'a str>,
    pub timeout: Duration,
}

/// What the host said about the real recipient.
#[derive(Debug)]
pub(crate) enum HostOutcome {
    /// 2xx on `RCPT TO`.
    Accepted { reply: SmtpReply },
    /// 550 on `RCPT TO`: the mailbox does not exist.
    Rejected { reply: SmtpReply },
    /// No answer about the mailbox from this host.
    Failed(ProbeFailure),
}

#[derive(Debug)]
pub(crate) struct HostReport {
    pub exchange: String,
    pub outcome: HostOutcome,
    pub catch_all: Option<CatchAllProbe>,
    pub transcript: Vec<SmtpEvent>,
}

impl HostReport {
    fn new(exchange: &str, outcome: HostOutcome) -> Self {
        Self {
            exchange: exchange.to_string(),
            outcome,
            catch_all: None,
            transcript: Vec::new(),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
            .as_ref()
            .is_some_and(CatchAllProbe::is_catch_all)
    }
}

/// Runs the whole dialogue against one exchange.
///
/// Once connected, `QUIT` is attempted whatever happened before it; the
/// socket is dropped when this function returns.
pub(crate) async fn probe_host<D>(dialer: &D, plan: &ProbePlan<'_>) -> HostReport
where
    D: Dialer + ?Sized,
{
    tracing::debug!(exchange = plan.exchange, "connecting");
    let connect = bounded(Stage::Connect, plan.timeout, async {
        dialer
            .dial(plan.exchange)
            .await
            .map_err(|err| ProbeFailure::refused(plan.exchange, err))
    })
    .await;

    let stream = match connect {
        Ok(stream) => stream,
        Err(failure) => {
            let event = SmtpEvent::Error {
                stage: Stage::Connect,
                message: failure.to_string(),
            };
            let mut report = HostReport::new(plan.exchange, HostOutcome::Failed(failure));
            report.transcript.push(event);
            return report;
        }
    };

    let mut session = SmtpSession::new(stream, plan.timeout);
    let mut catch_all = None;
    let outcome = match dialogue(&mut session, plan, &mut catch_all).await {
        Ok(outcome) => outcome,
        Err(failure) => HostOutcome::Failed(failure),
    };
    session.quit().await;

    let mut report = HostReport::new(plan.exchange, outcome);
    report.catch_all = catch_all;
    report.transcript = session.into_transcript();
    report
}

async fn dialogue<S>(
    session: &mut SmtpSession<S>,
    plan: &ProbePlan<'_>,
    catch_all: &mut Option<CatchAllProbe>,
) -> Result<HostOutcome, ProbeFailure>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let banner = session.read_banner().await?;
    if !banner.is_positive_completion() {
        return Err(ProbeFailure::reply(Stage::Greeting, banner));
    }

    greet(session, plan.helo).await?;

    let mail_from = session
        .command(&format!("MAIL FROM:<{}>", plan.mail_from), Stage::MailFrom)
        .await?;
    if !mail_from.is_positive_completion() {
        return Err(ProbeFailure::reply(Stage::MailFrom, mail_from));
    }

    if let Some(synthetic) = plan.synthetic {
        let reply = session
            .command(&format!("RCPT TO:<{synthetic}>"), Stage::CatchAllRcpt)
            .await?;
        let probe = CatchAllProbe::new(synthetic, reply);
        tracing::debug!(
            exchange = plan.exchange,
            catch_all = probe.is_catch_all(),
            code = probe.reply.code,
            "catch-all probe answered"
        );
        *catch_all = Some(probe);
    }

    let reply = session
        .command(&format!("RCPT TO:<{}>", plan.recipient), Stage::RcptTo)
        .await?;
    if reply.is_positive_completion() {
        Ok(HostOutcome::Accepted { reply })
    } else if reply.is_mailbox_unknown() {
        Ok(HostOutcome::Rejected { reply })
    } else {
        Err(ProbeFailure::reply(Stage::RcptTo, reply))
    }
}

/// `EHLO`, falling back to `HELO` for servers that refuse the extended form.
async fn greet<S>(session: &mut SmtpSession<S>, helo: &str) -> Result<(), ProbeFailure>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ehlo = session.command(&format!("EHLO {helo}"), Stage::Ehlo).await?;
    if ehlo.is_positive_completion() {
        return Ok(());
    }
    let helo_reply = session.command(&format!("HELO {helo}"), Stage::Helo).await?;
    if helo_reply.is_positive_completion() {
        Ok(())
    } else {
        Err(ProbeFailure::reply(Stage::Helo, helo_reply))
    }
}
