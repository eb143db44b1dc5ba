use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailprobe_lib::{ReputationLists, SMTP_PORT, VerificationOptions, VerifierConfig};

#[derive(Parser)]
#[command(name = "mailprobe-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// désactive la détection catch-all (pas de RCPT synthétique)
    #[arg(long = "no-catch-all")]
    pub no_catch_all: bool,

    /// nombre maximum d'MX interrogés (tous par défaut)
    #[arg(long = "max-hosts")]
    pub max_hosts: Option<usize>,

    /// timeout par hôte (ms), appliqué à la connexion et à chaque commande
    #[arg(long = "timeout", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// nom utilisé pour EHLO/HELO (FQDN de la machine; "localhost" par défaut, souvent refusé)
    #[arg(long)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM (par défaut verify@<helo>)
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// port SMTP des MX
    #[arg(long, default_value_t = SMTP_PORT)]
    pub port: u16,

    /// remplace la liste de domaines jetables (un domaine par ligne)
    #[arg(long = "disposable-list")]
    pub disposable_list: Option<PathBuf>,

    /// remplace la liste de préfixes génériques (admin, info, ...)
    #[arg(long = "role-list")]
    pub role_list: Option<PathBuf>,

    /// logs détaillés et transcript SMTP (RUST_LOG prend le pas)
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une adresse
    Verify {
        /// adresse e-mail à tester
        email: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn options(&self) -> VerificationOptions {
        VerificationOptions {
            check_catch_all: !self.no_catch_all,
            max_hosts_tried: self.max_hosts,
            per_host_timeout_ms: self.timeout_ms,
        }
    }

    pub fn verifier_config(&self) -> Result<VerifierConfig> {
        let mut lists = ReputationLists::builtin();
        if let Some(path) = &self.disposable_list {
            lists = lists
                .with_disposable_file(path)
                .context("chargement de --disposable-list")?;
        }
        if let Some(path) = &self.role_list {
            lists = lists
                .with_role_file(path)
                .context("chargement de --role-list")?;
        }

        let defaults = VerifierConfig::default();
        Ok(VerifierConfig {
            helo_domain: self.helo.clone().unwrap_or(defaults.helo_domain),
            mail_from: self.mail_from.clone(),
            port: self.port,
            lists,
        })
    }
}
