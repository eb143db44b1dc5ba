use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Why the MX set of a domain could not be obtained. An empty answer is not
/// an error: it comes back as [`MxStatus::NoRecords`](super::MxStatus::NoRecords).
#[derive(Debug, Error)]
pub enum MxError {
    #[error("cannot resolve MX for an empty domain")]
    EmptyDomain,
    #[error("'{domain}' is not a valid IDNA domain")]
    Idna {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("cannot build a DNS resolver from the system configuration: {source}")]
    ResolverInit {
        #[source]
        source: ResolveError,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn idna(domain: &str, source: idna::Errors) -> Self {
        Self::Idna {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(domain: &str, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.to_string(),
            source,
        }
    }
}
