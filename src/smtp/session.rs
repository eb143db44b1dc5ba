use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::error::ProbeFailure;
use super::types::{AttemptStage, SmtpEvent, SmtpReply};

/// A line-oriented SMTP client connection with a per-operation deadline.
///
/// Every network operation (banner read, each command round-trip, `QUIT`) is
/// bounded by `timeout`; the transcript keeps what was sent and received.
pub(crate) struct SmtpSession<S> {
    stream: BufReader<S>,
    timeout: Duration,
    transcript: Vec<SmtpEvent>,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S, timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            timeout,
            transcript: Vec::new(),
        }
    }

    pub(crate) async fn read_banner(&mut self) -> Result<SmtpReply, ProbeFailure> {
        let stage = AttemptStage::Greeting;
        let timeout = self.timeout;
        let reply = bounded(stage, timeout, read_reply(&mut self.stream, stage)).await;
        self.record_result(stage, reply)
    }

    pub(crate) async fn command(
        &mut self,
        command: &str,
        stage: AttemptStage,
    ) -> Result<SmtpReply, ProbeFailure> {
        self.transcript.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        let timeout = self.timeout;
        let stream = &mut self.stream;
        let reply = bounded(stage, timeout, async move {
            write_line(stream, command, stage).await?;
            read_reply(stream, stage).await
        })
        .await;
        self.record_result(stage, reply)
    }

    /// Sends `QUIT` and waits for the goodbye. Never fails: problems are only
    /// recorded in the transcript.
    pub(crate) async fn quit(&mut self) {
        let _ = self.command("QUIT", AttemptStage::Quit).await;
        let _ = tokio::time::timeout(self.timeout, self.stream.get_mut().shutdown()).await;
    }

    pub(crate) fn into_transcript(self) -> Vec<SmtpEvent> {
        self.transcript
    }

    fn record_result(
        &mut self,
        stage: AttemptStage,
        result: Result<SmtpReply, ProbeFailure>,
    ) -> Result<SmtpReply, ProbeFailure> {
        match &result {
            Ok(reply) => self.transcript.push(SmtpEvent::Received {
                stage,
                reply: reply.clone(),
            }),
            Err(err) => self.transcript.push(SmtpEvent::Error {
                stage,
                message: err.to_string(),
            }),
        }
        result
    }
}

/// Runs `operation` under `timeout`, mapping expiry to [`ProbeFailure::Timeout`].
pub(crate) async fn bounded<T, F>(
    stage: AttemptStage,
    timeout: Duration,
    operation: F,
) -> Result<T, ProbeFailure>
where
    F: Future<Output = Result<T, ProbeFailure>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(ProbeFailure::timeout(stage, timeout)),
    }
}

async fn write_line<S>(
    stream: &mut BufReader<S>,
    command: &str,
    stage: AttemptStage,
) -> Result<(), ProbeFailure>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut line = command.as_bytes().to_vec();
    line.extend_from_slice(b"\r\n");
    stream
        .write_all(&line)
        .await
        .map_err(|err| ProbeFailure::io(stage, err))?;
    stream
        .flush()
        .await
        .map_err(|err| ProbeFailure::io(stage, err))
}

/// Reads one possibly multi-line reply (`250-...` continuations, then
/// `250 ...`). All lines must carry the same code.
pub(crate) async fn read_reply<R>(
    reader: &mut R,
    stage: AttemptStage,
) -> Result<SmtpReply, ProbeFailure>
where
    R: AsyncBufRead + Unpin,
{
    let mut reply: Option<SmtpReply> = None;
    let mut raw = String::new();
    loop {
        raw.clear();
        let read = reader
            .read_line(&mut raw)
            .await
            .map_err(|err| ProbeFailure::io(stage, err))?;
        if read == 0 {
            let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "server closed the connection");
            return Err(ProbeFailure::io(stage, eof));
        }

        let (code, more, text) = split_reply_line(raw.trim_end_matches(['\r', '\n']))
            .ok_or_else(|| ProbeFailure::protocol(stage, format!("malformed reply line {raw:?}")))?;

        match reply.as_mut() {
            None => reply = Some(SmtpReply::new(code, text)),
            Some(current) if current.code == code => {
                current.message.push('\n');
                current.message.push_str(text);
            }
            Some(current) => {
                return Err(ProbeFailure::protocol(
                    stage,
                    format!("reply code changed from {} to {code}", current.code),
                ));
            }
        }

        if !more {
            // `reply` was set on this iteration at the latest
            return reply.ok_or_else(|| ProbeFailure::protocol(stage, "empty reply"));
        }
    }
}

/// `"250-text"` gives `(250, true, "text")`, `"250 text"` or `"250"` gives
/// `(250, false, ..)`.
fn split_reply_line(line: &str) -> Option<(u16, bool, &str)> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = digits.parse().ok()?;
    match line.as_bytes().get(3) {
        None => Some((code, false, "")),
        Some(b'-') => Some((code, true, &line[4..])),
        Some(b' ') => Some((code, false, &line[4..])),
        Some(_) => None,
    }
}
