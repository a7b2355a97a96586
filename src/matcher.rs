//! Best-record selection and identifier extraction
//!
//! Deterministic heuristic: first exact name match in register order, else
//! the register's first result. No similarity scoring.

use crate::identifier::RegistryId;
use crate::normalize::match_key;
use crate::outcome::{IdentifierKind, MatchStrategy};
use crate::rpo::CandidateRecord;

/// Type tags (lowercased) that mark the primary registry number
const PRIMARY_ID_TAGS: &[&str] = &["ico", "ičo", "ico_sk"];

/// Pick the best record for `query`.
///
/// Returns the first record holding a full name equal to the query after
/// cleaning, case and accent folding (`Exact`), otherwise the first record
/// (`First`). An empty slice yields `(None, First)`.
pub fn select_best_record<'a>(
    records: &'a [CandidateRecord],
    query: &str,
) -> (Option<&'a CandidateRecord>, MatchStrategy) {
    let key = match_key(query);
    let exact = records
        .iter()
        .find(|record| record.full_names().any(|name| match_key(name) == key));

    match exact {
        Some(record) => (Some(record), MatchStrategy::Exact),
        None => (records.first(), MatchStrategy::First),
    }
}

/// Full name to report for a chosen record: the last listed name, which is
/// the current one in register order, whatever name the match was made on.
pub fn matched_full_name(record: &CandidateRecord) -> Option<String> {
    record.full_names().last().map(str::to_string)
}

/// Extract the registry identifier from a record.
///
/// Prefers an identifier typed as ICO; falls back to the first identifier of
/// any type that normalizes to 8 digits. Values that do not normalize are
/// skipped.
pub fn extract_identifier(record: &CandidateRecord) -> (Option<RegistryId>, IdentifierKind) {
    let primary = record.identifiers().iter().find_map(|ident| {
        let tag = ident.type_tag().to_lowercase();
        if !PRIMARY_ID_TAGS.contains(&tag.as_str()) {
            return None;
        }
        ident.value.as_deref().and_then(RegistryId::parse)
    });
    if let Some(id) = primary {
        return (Some(id), IdentifierKind::Ico);
    }

    let fallback = record
        .identifiers()
        .iter()
        .find_map(|ident| ident.value.as_deref().and_then(RegistryId::parse));
    (fallback, IdentifierKind::Other)
}
