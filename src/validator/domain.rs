/// Convertit le domaine en ASCII (IDNA) puis contrôle chaque label.
/// Les problèmes vont dans `reasons`; la forme ASCII n'est renvoyée que si
/// aucun n'a été trouvé.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> Option<String> {
    let before = reasons.len();
    if domain.is_empty() {
        reasons.push("domain is empty".to_string());
        return None;
    }

    let domain_ascii = match idna::domain_to_ascii(domain) {
        Ok(d) => d,
        Err(_) => {
            reasons.push("domain punycode conversion failed".to_string());
            return None;
        }
    };

    if domain_ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return None;
    }

    // au moins un point
    if !domain_ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in domain_ascii.split('.') {
        if let Some(problem) = label_problem(label) {
            reasons.push(problem);
        }
    }

    if let Some(tld) = domain_ascii.rsplit('.').next() {
        if !tld.is_empty() && tld.chars().all(|c| c.is_ascii_digit()) {
            reasons.push(format!("top-level label '{tld}' cannot be numeric"));
        }
    }

    if reasons.len() == before {
        Some(domain_ascii)
    } else {
        None
    }
}

const MAX_LABEL_LEN: usize = 63;

fn label_problem(label: &str) -> Option<String> {
    if label.is_empty() {
        return Some("empty domain label".to_string());
    }
    if label.len() > MAX_LABEL_LEN {
        return Some(format!("label '{label}' longer than {MAX_LABEL_LEN}"));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Some(format!("label '{label}' starts or ends with '-'"));
    }
    label
        .bytes()
        .any(|b| !(b.is_ascii_alphanumeric() || b == b'-'))
        .then(|| format!("label '{label}' has characters outside [a-z0-9-]"))
}
