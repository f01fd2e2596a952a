//! Filesystem-safe title normalization.

use std::sync::LazyLock;

use regex::Regex;

static ILLEGAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));

// Scraped titles sometimes carry list numbering such as "(1. )".
static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+\.\s*\)").expect("valid regex"));

/// Normalizes an arbitrary title into a name that is safe on common filesystems.
///
/// Removes `< > : " / \ | ? *`, drops stray numeric annotations like `(3. )`,
/// collapses whitespace runs to a single space and trims both ends. The
/// function is total and idempotent.
///
/// # Panics
///
/// Panics if the internal regexes fail to compile (they are constants and
/// will not).
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let mut name = ILLEGAL_RE.replace_all(raw, "").into_owned();
    // Removing one annotation can expose another, e.g. "((1. )2. )".
    while NUMBERING_RE.is_match(&name) {
        name = NUMBERING_RE.replace_all(&name, "").into_owned();
    }
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
