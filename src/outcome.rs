//! Per-item resolution outcomes and run summaries
//!
//! One `ResolutionOutcome` is produced per input name. Absence of an
//! identifier is data, described by `status` and a free-text `note`.

use serde::Serialize;

use crate::identifier::RegistryId;
use crate::normalize::clean_company_name;

pub const NOTE_EMPTY_INPUT: &str = "empty input";
pub const NOTE_NOT_FOUND: &str = "not found after variants/retries";
pub const NOTE_NO_VALID_IDENTIFIER: &str = "found but no valid identifier";
pub const NOTE_CANCELLED: &str = "cancelled before processing";

/// How the best record was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// A full name equals the query after cleaning, case and accent folding
    Exact,
    /// No exact name; the register's first result was taken
    First,
    /// No record was chosen
    #[serde(rename = "none")]
    Unmatched,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::First => "first",
            Self::Unmatched => "none",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identifier slot the value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Typed as the primary registry number (ICO)
    Ico,
    /// First 8-digit identifier of any other type
    Other,
}

/// Terminal state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Found,
    NoIdentifier,
    NotFound,
    EmptyInput,
    Exception,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionOutcome {
    /// Raw input name
    pub name: String,
    /// Input after legal-form stripping and whitespace cleanup
    pub clean_name: String,
    pub status: OutcomeStatus,
    pub identifier: Option<RegistryId>,
    /// Advisory mod-11 check; `None` when no identifier was extracted
    pub checksum_valid: Option<bool>,
    pub used_query_variant: Option<String>,
    pub matched_full_name: Option<String>,
    pub identifier_kind: Option<IdentifierKind>,
    pub match_strategy: MatchStrategy,
    pub note: Option<String>,
}

impl ResolutionOutcome {
    fn base(name: &str, status: OutcomeStatus) -> Self {
        Self {
            name: name.to_string(),
            clean_name: clean_company_name(name),
            status,
            identifier: None,
            checksum_valid: None,
            used_query_variant: None,
            matched_full_name: None,
            identifier_kind: None,
            match_strategy: MatchStrategy::Unmatched,
            note: None,
        }
    }

    pub fn found(
        name: &str,
        variant: &str,
        matched_full_name: Option<String>,
        identifier: RegistryId,
        kind: IdentifierKind,
        strategy: MatchStrategy,
    ) -> Self {
        Self {
            checksum_valid: Some(identifier.has_valid_checksum()),
            identifier: Some(identifier),
            used_query_variant: Some(variant.to_string()),
            matched_full_name,
            identifier_kind: Some(kind),
            match_strategy: strategy,
            ..Self::base(name, OutcomeStatus::Found)
        }
    }

    /// A record was chosen but carries no 8-digit identifier.
    pub fn without_identifier(
        name: &str,
        variant: &str,
        matched_full_name: Option<String>,
        strategy: MatchStrategy,
    ) -> Self {
        Self {
            used_query_variant: Some(variant.to_string()),
            matched_full_name,
            match_strategy: strategy,
            note: Some(NOTE_NO_VALID_IDENTIFIER.to_string()),
            ..Self::base(name, OutcomeStatus::NoIdentifier)
        }
    }

    pub fn empty_input(name: &str) -> Self {
        Self {
            note: Some(NOTE_EMPTY_INPUT.to_string()),
            ..Self::base(name, OutcomeStatus::EmptyInput)
        }
    }

    /// All variants exhausted; carries the first variant tried.
    pub fn not_found(name: &str, first_variant: Option<&str>) -> Self {
        Self {
            used_query_variant: first_variant.map(str::to_string),
            note: Some(NOTE_NOT_FOUND.to_string()),
            ..Self::base(name, OutcomeStatus::NotFound)
        }
    }

    pub fn exception(name: &str, variant: Option<&str>, message: impl std::fmt::Display) -> Self {
        Self {
            used_query_variant: variant.map(str::to_string),
            note: Some(format!("exception: {}", message)),
            ..Self::base(name, OutcomeStatus::Exception)
        }
    }

    pub fn cancelled(name: &str) -> Self {
        Self {
            note: Some(NOTE_CANCELLED.to_string()),
            ..Self::base(name, OutcomeStatus::Cancelled)
        }
    }

    pub fn is_found(&self) -> bool {
        self.identifier.is_some()
    }
}

/// Aggregate counts over a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub found: usize,
    pub without_identifier: usize,
    pub not_found: usize,
    pub empty_input: usize,
    pub exceptions: usize,
    pub cancelled: usize,
    pub exact_matches: usize,
    pub first_matches: usize,
    pub checksum_failures: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Found => summary.found += 1,
                OutcomeStatus::NoIdentifier => summary.without_identifier += 1,
                OutcomeStatus::NotFound => summary.not_found += 1,
                OutcomeStatus::EmptyInput => summary.empty_input += 1,
                OutcomeStatus::Exception => summary.exceptions += 1,
                OutcomeStatus::Cancelled => summary.cancelled += 1,
            }
            match outcome.match_strategy {
                MatchStrategy::Exact => summary.exact_matches += 1,
                MatchStrategy::First => summary.first_matches += 1,
                MatchStrategy::Unmatched => {}
            }
            if outcome.checksum_valid == Some(false) {
                summary.checksum_failures += 1;
            }
        }
        summary
    }

    /// Found share in percent (0.0 for an empty run)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.found as f64 * 100.0 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_outcome_carries_checksum() {
        let id = RegistryId::parse("31619428").unwrap();
        let outcome = ResolutionOutcome::found(
            "Acme, s.r.o.",
            "Acme",
            Some("Acme s.r.o.".into()),
            id,
            IdentifierKind::Ico,
            MatchStrategy::Exact,
        );
        assert!(outcome.is_found());
        assert_eq!(outcome.clean_name, "Acme");
        assert_eq!(outcome.checksum_valid, Some(true));
        assert!(outcome.note.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let outcome = ResolutionOutcome::not_found("Unknown Org", Some("Unknown Org"));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["match_strategy"], "none");
        assert_eq!(value["note"], NOTE_NOT_FOUND);
        assert_eq!(value["used_query_variant"], "Unknown Org");
        assert!(value["identifier"].is_null());
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            ResolutionOutcome::found(
                "A",
                "A",
                None,
                RegistryId::parse("31619421").unwrap(),
                IdentifierKind::Other,
                MatchStrategy::First,
            ),
            ResolutionOutcome::without_identifier("B", "B", None, MatchStrategy::Exact),
            ResolutionOutcome::empty_input(""),
            ResolutionOutcome::exception("C", None, "boom"),
            ResolutionOutcome::cancelled("D"),
        ];
        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.found, 1);
        assert_eq!(summary.without_identifier, 1);
        assert_eq!(summary.exceptions, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.first_matches, 1);
        assert_eq!(summary.exact_matches, 1);
        assert_eq!(summary.checksum_failures, 1);
        assert!((summary.success_rate() - 20.0).abs() < f64::EPSILON);
        assert_eq!(outcomes[3].note.as_deref(), Some("exception: boom"));
    }
}
