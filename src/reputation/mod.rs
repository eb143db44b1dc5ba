//! Static domain/local-part reputation lists.
//!
//! The lists are loaded once and then only read: [`ReputationLists`] has no
//! mutating methods, so a single value can be shared by every verification.

mod builtin;
mod error;

pub use error::ConfigError;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::validator::EmailAddress;

/// Why the reputation check short-circuited a verification.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationFlag {
    Disposable,
    RoleBased,
}

impl fmt::Display for ReputationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposable => f.write_str("disposable domain"),
            Self::RoleBased => f.write_str("role-based local part"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReputationLists {
    disposable_domains: HashSet<String>,
    role_local_parts: HashSet<String>,
}

impl ReputationLists {
    pub fn new<D, R, S, T>(disposable_domains: D, role_local_parts: R) -> Self
    where
        D: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            disposable_domains: normalize_entries(disposable_domains),
            role_local_parts: normalize_entries(role_local_parts),
        }
    }

    /// Lists compiled into the crate.
    pub fn builtin() -> Self {
        Self::new(
            builtin::DISPOSABLE_DOMAINS.iter(),
            builtin::ROLE_LOCAL_PARTS.iter(),
        )
    }

    /// Reads both lists from text files, one entry per line. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn from_files(
        disposable_path: impl AsRef<Path>,
        role_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let disposable = read_list(disposable_path.as_ref())?;
        let roles = read_list(role_path.as_ref())?;
        Ok(Self::new(disposable, roles))
    }

    /// Replaces the disposable set, keeping the role set.
    pub fn with_disposable_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            disposable_domains: normalize_entries(read_list(path.as_ref())?),
            ..self
        })
    }

    /// Replaces the role set, keeping the disposable set.
    pub fn with_role_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            role_local_parts: normalize_entries(read_list(path.as_ref())?),
            ..self
        })
    }

    /// Case-insensitive; subdomains of a listed domain match too.
    pub fn is_disposable(&self, domain: &str) -> bool {
        let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
        let mut candidate = domain.as_str();
        loop {
            if self.disposable_domains.contains(candidate) {
                return true;
            }
            match candidate.split_once('.') {
                Some((_, parent)) if parent.contains('.') => candidate = parent,
                _ => return false,
            }
        }
    }

    /// Case-insensitive; a `+tag` sub-address suffix is ignored.
    pub fn is_role_based(&self, local: &str) -> bool {
        let base = local.split('+').next().unwrap_or(local);
        self.role_local_parts.contains(&base.to_ascii_lowercase())
    }

    /// Disposable wins over role-based.
    pub fn check(&self, address: &EmailAddress) -> Option<ReputationFlag> {
        if self.is_disposable(address.ascii_domain()) || self.is_disposable(address.domain()) {
            Some(ReputationFlag::Disposable)
        } else if self.is_role_based(address.local()) {
            Some(ReputationFlag::RoleBased)
        } else {
            None
        }
    }

    pub fn disposable_len(&self) -> usize {
        self.disposable_domains.len()
    }

    pub fn role_len(&self) -> usize {
        self.role_local_parts.len()
    }
}

fn normalize_entries<I, S>(entries: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| entry.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn read_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::read_list(path, err))?;
    Ok(parse_list(&raw))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
