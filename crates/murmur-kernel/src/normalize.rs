//! Reply text normalization.

use regex_lite::Regex;
use std::sync::OnceLock;

fn em_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*—\s*").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("static regex"))
}

/// Normalize a raw model reply for delivery.
///
/// Em-dash-separated clauses become comma-separated clauses, runs of
/// whitespace collapse to a single space, and the ends are trimmed.
pub fn normalize_reply(raw: &str) -> String {
    let collapsed = em_dash_re().replace_all(raw.trim(), ", ");
    whitespace_re().replace_all(&collapsed, " ").into_owned()
}
