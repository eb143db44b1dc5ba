/// Caractères `atext` hors alphanumériques (RFC 5322 §3.2.3).
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// Dot-atom: atomes non vides d'atext séparés par des points. Couvre les
/// points en tête, en fin et doublés; les quoted-strings sont refusées.
pub(crate) fn is_local_valid(s: &str) -> bool {
    s.split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}
