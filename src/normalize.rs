//! Company name normalization and query variant generation
//!
//! Provides the pure text transforms used before searching the register:
//! - Quote/whitespace trimming and comma truncation
//! - Slovak legal-form suffix stripping (`s.r.o.`, `a.s.`, `družstvo`, ...)
//! - Whitespace collapsing
//! - Accent stripping (NFKD, combining marks dropped)
//! - Ordered, deduplicated query variants for one raw name

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Legal forms recognised at the end of a name. Dots and inner spaces are
/// optional and the form must start a token, so "Texas" keeps its "as".
static LEGAL_FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?:^|[\s,])\s*
        (?:
            spol\.?\s*s\.?\s*r\.?\s*o\.?
          | s\.?\s*r\.?\s*o\.?
          | a\.?\s*s\.?
          | v\.?\s*o\.?\s*s\.?
          | k\.?\s*s\.?
          | n\.?\s*o\.?
          | o\.?\s*z\.?
          | [šs]t[áa]tny\s+podnik
          | [šs]\.?\s*p\.?
          | dru[žz]stvo
          | akciov[áa]\s+spolo[čc]nos[ťt]
          | komanditn[áa]\s+spolo[čc]nos[ťt]
          | verejn[áa]\s+obchodn[áa]\s+spolo[čc]nos[ťt]
          | neziskov[áa]\s+organiz[áa]cia
          | ob[čc]ianske\s+zdru[žz]enie
        )
        \s*$",
    )
    .unwrap()
});

/// Quote characters trimmed from both ends of a raw name
const QUOTE_CHARS: &[char] = &['"', '\'', '`', '„', '“', '”'];

fn trim_noise(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c))
}

/// Clean a raw company name for searching and comparison.
///
/// Keeps the text before the first comma, strips one trailing legal form and
/// collapses whitespace. Never fails; blank input yields an empty string.
///
/// ```
/// use rpo_resolver::normalize::clean_company_name;
///
/// assert_eq!(clean_company_name("Acme, s.r.o."), "Acme");
/// assert_eq!(clean_company_name("  \"Tatra   Banka a.s.\" "), "Tatra Banka");
/// assert_eq!(clean_company_name("Poľnohospodárske družstvo"), "Poľnohospodárske");
/// ```
pub fn clean_company_name(name: &str) -> String {
    let trimmed = trim_noise(name);
    let head = match trimmed.split_once(',') {
        Some((head, _)) => head,
        None => trimmed,
    };
    let stripped = LEGAL_FORM_RE.replace(head.trim(), "");
    collapse_whitespace(trim_noise(&stripped))
}

/// Remove diacritics: NFKD decomposition with combining marks dropped.
pub fn strip_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for name equality: cleaned, accent-free, lowercased.
pub fn match_key(name: &str) -> String {
    strip_accents(&clean_company_name(name)).to_lowercase()
}

/// Case- and accent-insensitive equality of two names after cleaning.
pub fn names_match(a: &str, b: &str) -> bool {
    match_key(a) == match_key(b)
}

/// Build the ordered search variants for a raw name.
///
/// Order is raw, cleaned, accent-free raw, accent-free cleaned; empty strings
/// and exact duplicates are dropped. Blank input yields no variants.
pub fn query_variants(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let cleaned = clean_company_name(raw);
    let candidates = [
        raw.to_string(),
        cleaned.clone(),
        strip_accents(raw),
        strip_accents(&cleaned),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !variants.iter().any(|v| v == candidate) {
            variants.push(candidate.to_string());
        }
    }
    variants
}
