#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use mailprobe_lib::{Verdict, VerificationResult};

use crate::args::Cli;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct OutputRow {
    pub email: String,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub result: VerificationResult,
}

impl OutputRow {
    pub fn new(email: impl Into<String>, result: VerificationResult) -> Self {
        Self {
            email: email.into(),
            result,
        }
    }
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows, cli),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

/// Validates `--format` before any network work starts.
pub fn check_format(format: &str) -> Result<()> {
    match format {
        "human" => Ok(()),
        #[cfg(feature = "with-serde")]
        "json" | "ndjson" => Ok(()),
        #[cfg(not(feature = "with-serde"))]
        "json" | "ndjson" => bail!("format={format} nécessite la feature 'with-serde'"),
        #[cfg(feature = "with-csv")]
        "csv" => Ok(()),
        #[cfg(not(feature = "with-csv"))]
        "csv" => bail!("format=csv nécessite la feature 'with-csv'"),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_not_valid(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.result.is_valid())
}

fn label(status: Verdict) -> String {
    format!("[{}]", status.as_str().to_ascii_uppercase())
}

fn write_human(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    for row in rows {
        let result = &row.result;
        match &result.reason {
            Some(reason) => println!("{:<14} {} :: {reason}", label(result.status), row.email),
            None => println!("{:<14} {}", label(result.status), row.email),
        }

        if let Some(evidence) = &result.smtp_evidence {
            match &evidence.reply {
                Some(reply) => println!("        smtp: {} -> {reply}", evidence.exchange),
                None => println!("        smtp: {}", evidence.exchange),
            }
            if let Some(probe) = &evidence.catch_all_probe {
                println!("        catch-all: {} -> {}", probe.address, probe.reply);
            }
            if cli.verbose {
                for event in &evidence.transcript {
                    println!("          {event}");
                }
            }
        }

        if result.attempts.len() > 1 || (cli.verbose && !result.attempts.is_empty()) {
            for (idx, attempt) in result.attempts.iter().enumerate() {
                let prefix = if idx == 0 { "        tried:" } else { "              " };
                println!("{prefix} {} ({})", attempt.exchange, attempt.detail);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 8] = [
    "email",
    "status",
    "reason",
    "catch_all",
    "exchange",
    "smtp_code",
    "smtp_message",
    "hosts_tried",
];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &OutputRow) -> Vec<String> {
    let result = &row.result;
    let evidence = result.smtp_evidence.as_ref();
    let reply = evidence.and_then(|e| e.reply.as_ref());
    let hosts = result
        .attempts
        .iter()
        .map(|a| a.exchange.as_str())
        .collect::<Vec<_>>()
        .join("|");

    vec![
        row.email.clone(),
        result.status.to_string(),
        result.reason.clone().unwrap_or_default(),
        result.catch_all.to_string(),
        evidence.map(|e| e.exchange.clone()).unwrap_or_default(),
        reply.map(|r| r.code.to_string()).unwrap_or_default(),
        reply.map(|r| r.message.clone()).unwrap_or_default(),
        hosts,
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
