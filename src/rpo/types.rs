//! RPO search response types
//!
//! Every list and value is optional on the wire; missing or `null` lists are
//! treated as empty.

use serde::{Deserialize, Serialize};

/// Top-level search response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<CandidateRecord>>,
}

impl SearchResponse {
    pub fn into_records(self) -> Vec<CandidateRecord> {
        self.results.unwrap_or_default()
    }
}

/// One entity returned for a query
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CandidateRecord {
    #[serde(rename = "fullNames", default)]
    pub full_names: Option<Vec<NameEntry>>,

    #[serde(default)]
    pub identifiers: Option<Vec<IdentifierEntry>>,
}

impl CandidateRecord {
    pub fn new(full_names: &[&str], identifiers: Vec<IdentifierEntry>) -> Self {
        Self {
            full_names: Some(
                full_names
                    .iter()
                    .map(|n| NameEntry {
                        value: Some(n.to_string()),
                    })
                    .collect(),
            ),
            identifiers: Some(identifiers),
        }
    }

    /// Non-empty full names in register order (historical names first)
    pub fn full_names(&self) -> impl Iterator<Item = &str> {
        self.full_names
            .iter()
            .flatten()
            .filter_map(|n| n.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn identifiers(&self) -> &[IdentifierEntry] {
        self.identifiers.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NameEntry {
    #[serde(default)]
    pub value: Option<String>,
}

/// A typed identifier attached to a record
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IdentifierEntry {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<CodeValue>,
}

impl IdentifierEntry {
    pub fn new(value: &str, kind: Option<&str>) -> Self {
        Self {
            value: Some(value.to_string()),
            kind: kind.map(|k| CodeValue {
                value: Some(k.to_string()),
            }),
        }
    }

    pub fn type_tag(&self) -> &str {
        self.kind
            .as_ref()
            .and_then(|k| k.value.as_deref())
            .unwrap_or("")
    }
}

/// Code-list value (`{"value": "ICO"}`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CodeValue {
    #[serde(default)]
    pub value: Option<String>,
}
