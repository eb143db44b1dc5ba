//! Pragmatic address syntax check run before any DNS or SMTP work.

mod domain;
mod local;
mod types;

pub use types::{EmailAddress, EmailError, ValidationReport};

use domain::check_domain;
use local::is_local_valid;

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

pub fn validate_email(email: &str) -> ValidationReport {
    let (reasons, _) = inspect(email);
    ValidationReport {
        ok: reasons.is_empty(),
        reasons,
    }
}

/// Validates `email` and splits it into an [`EmailAddress`].
pub fn parse_address(email: &str) -> Result<EmailAddress, EmailError> {
    match inspect(email) {
        (reasons, Some(address)) if reasons.is_empty() => Ok(address),
        (reasons, _) => Err(EmailError::invalid(reasons)),
    }
}

fn inspect(email: &str) -> (Vec<String>, Option<EmailAddress>) {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.len() > MAX_ADDRESS_LEN {
        reasons.push(format!("total length {} > {MAX_ADDRESS_LEN}", input.len()));
    }

    let parts: Vec<&str> = input.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return (reasons, None);
    }
    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        reasons.push(format!(
            "local part length {} invalid (1..={MAX_LOCAL_LEN})",
            local.len()
        ));
    } else if !is_local_valid(local) {
        reasons.push("invalid local part".to_string());
    }

    let ascii_domain = check_domain(domain, &mut reasons);

    match ascii_domain {
        Some(ascii) if reasons.is_empty() => {
            let address = EmailAddress::new(input, local, domain.to_lowercase(), ascii);
            (reasons, Some(address))
        }
        _ => (reasons, None),
    }
}
