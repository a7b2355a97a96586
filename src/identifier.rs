//! Registry identifier (ICO) normalization and checksum
//!
//! An identifier is accepted when it contains exactly 8 ASCII digits after
//! every non-digit character is removed. The mod-11 checksum is advisory:
//! register data carries valid-looking numbers that fail it.

use std::fmt;

use serde::Serialize;

/// Weights applied to the first seven digits
const CHECKSUM_WEIGHTS: [u32; 7] = [8, 7, 6, 5, 4, 3, 2];

/// An 8-digit registry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegistryId(String);

impl RegistryId {
    /// Normalize a raw identifier value. Returns `None` unless exactly
    /// 8 digits remain after stripping non-digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        (digits.len() == 8).then_some(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the eighth digit matches the weighted mod-11 check digit.
    pub fn has_valid_checksum(&self) -> bool {
        let digits: Vec<u32> = self.0.chars().filter_map(|c| c.to_digit(10)).collect();
        let mut leading = [0u32; 7];
        leading.copy_from_slice(&digits[..7]);
        check_digit(&leading) == digits[7]
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegistryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check digit for the first seven digits: weights 8..2, sum mod 11,
/// then 0 maps to 1, 1 maps to 0, anything else to `11 - mod`.
pub fn check_digit(leading: &[u32; 7]) -> u32 {
    let sum: u32 = leading
        .iter()
        .zip(CHECKSUM_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    match sum % 11 {
        0 => 1,
        1 => 0,
        m => 11 - m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_eight_digits() {
        assert_eq!(RegistryId::parse("12345678").unwrap().as_str(), "12345678");
        assert_eq!(RegistryId::parse("31 619 428").unwrap().as_str(), "31619428");
        assert_eq!(RegistryId::parse("SK-3161-9428").unwrap().as_str(), "31619428");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        // 7 digits after stripping
        assert!(RegistryId::parse("123-45.678").is_none());
        assert!(RegistryId::parse("123456789").is_none());
        assert!(RegistryId::parse("").is_none());
        assert!(RegistryId::parse("abcdefgh").is_none());
    }

    #[test]
    fn test_parse_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not ASCII and are stripped
        assert!(RegistryId::parse("١٢٣٤٥٦٧٨").is_none());
    }

    #[test]
    fn test_check_digit_mapping() {
        // 3*8 + 1*7 + 6*6 + 1*5 + 9*4 + 4*3 + 2*2 = 124, 124 % 11 = 3 -> 11 - 3
        assert_eq!(check_digit(&[3, 1, 6, 1, 9, 4, 2]), 8);
        // sum 0 -> mod 0 -> 1
        assert_eq!(check_digit(&[0, 0, 0, 0, 0, 0, 0]), 1);
        // 1*4 + 4*2 = 12 -> mod 1 -> 0
        assert_eq!(check_digit(&[0, 0, 0, 0, 1, 0, 4]), 0);
        // 1*2 = 2 -> mod 2 -> 9
        assert_eq!(check_digit(&[0, 0, 0, 0, 0, 0, 1]), 9);
        // 5*2 = 10 -> mod 10 -> 1
        assert_eq!(check_digit(&[0, 0, 0, 0, 0, 0, 5]), 1);
    }

    #[test]
    fn test_checksum_validation() {
        assert!(!RegistryId::parse("31619421").unwrap().has_valid_checksum());
        assert!(RegistryId::parse("31619428").unwrap().has_valid_checksum());
        assert!(RegistryId::parse("00000001").unwrap().has_valid_checksum());
        assert!(RegistryId::parse("00001040").unwrap().has_valid_checksum());
        assert!(!RegistryId::parse("00001041").unwrap().has_valid_checksum());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RegistryId::parse("31619428").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"31619428\"");
    }
}
