use std::fmt;

use crate::error::{DomainError, Result};

/// A validated `<label>.<tld>` domain name.
///
/// The TLD is everything after the last `.` and is stored lowercase with its
/// leading dot (`.sol`), which is the form the lookup tables are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    label: String,
    tld: String,
}

/// Character class of a label, checked in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPattern {
    Letters,
    Digits,
    Alphanumeric,
    Hyphenated,
    Other,
}

impl DomainName {
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason| DomainError::InvalidDomainName {
            name: name.to_string(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("name contains whitespace"));
        }
        let (label, tld) = name.rsplit_once('.').ok_or_else(|| invalid("missing TLD"))?;
        if label.is_empty() {
            return Err(invalid("label is empty"));
        }
        if tld.is_empty() {
            return Err(invalid("TLD is empty"));
        }

        Ok(Self {
            label: label.to_string(),
            tld: format!(".{}", tld.to_lowercase()),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// TLD with its leading dot, lowercase.
    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Character count of the label, TLD excluded.
    pub fn label_len(&self) -> usize {
        self.label.chars().count()
    }

    pub fn pattern(&self) -> LabelPattern {
        classify_label(&self.label)
    }

    /// `true` for labels like `a1b2` or `7x7`: at least two characters,
    /// all ASCII alphanumeric, with letters and digits strictly alternating.
    pub fn is_alternating(&self) -> bool {
        let chars: Vec<char> = self.label.chars().collect();
        chars.len() >= 2
            && chars.iter().all(char::is_ascii_alphanumeric)
            && chars
                .windows(2)
                .all(|w| w[0].is_ascii_digit() != w[1].is_ascii_digit())
    }

    /// Case-insensitive match of the label against a term table.
    pub fn matches_term<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms
            .iter()
            .any(|t| t.as_ref().eq_ignore_ascii_case(&self.label))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.tld)
    }
}

/// Classify a label. Case does not matter; the first matching class wins.
pub fn classify_label(label: &str) -> LabelPattern {
    if label.is_empty() {
        return LabelPattern::Other;
    }
    if label.chars().all(|c| c.is_ascii_alphabetic()) {
        LabelPattern::Letters
    } else if label.chars().all(|c| c.is_ascii_digit()) {
        LabelPattern::Digits
    } else if label.chars().all(|c| c.is_ascii_alphanumeric()) {
        LabelPattern::Alphanumeric
    } else if label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        LabelPattern::Hyphenated
    } else {
        LabelPattern::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_last_dot() {
        let name = DomainName::parse("crypto.SOL").unwrap();
        assert_eq!(name.label(), "crypto");
        assert_eq!(name.tld(), ".sol");
        assert_eq!(name.label_len(), 6);
        assert_eq!(name.to_string(), "crypto.sol");

        let nested = DomainName::parse("pay.me.eth").unwrap();
        assert_eq!(nested.label(), "pay.me");
        assert_eq!(nested.tld(), ".eth");
    }

    #[test]
    fn parse_rejects_malformed_names() {
        for bad in ["", "   ", "nodot", ".com", "name.", "two words.com"] {
            let err = DomainName::parse(bad).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidDomainName { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn label_length_counts_chars_not_bytes() {
        let name = DomainName::parse("日本.com").unwrap();
        assert_eq!(name.label_len(), 2);
    }

    #[test]
    fn classify_in_priority_order() {
        assert_eq!(classify_label("Crypto"), LabelPattern::Letters);
        assert_eq!(classify_label("777"), LabelPattern::Digits);
        assert_eq!(classify_label("web3"), LabelPattern::Alphanumeric);
        assert_eq!(classify_label("my-web3"), LabelPattern::Hyphenated);
        assert_eq!(classify_label("a_b"), LabelPattern::Other);
        assert_eq!(classify_label("日本"), LabelPattern::Other);
    }

    #[test]
    fn alternating_shapes() {
        let yes = ["a1", "a1b2", "1a2b3", "x9Y"];
        let no = ["a", "ab12", "aa", "a-1", "11"];
        for n in yes {
            assert!(DomainName::parse(&format!("{n}.io")).unwrap().is_alternating(), "{n}");
        }
        for n in no {
            assert!(!DomainName::parse(&format!("{n}.io")).unwrap().is_alternating(), "{n}");
        }
    }

    #[test]
    fn term_match_is_case_insensitive() {
        let name = DomainName::parse("DeFi.xyz").unwrap();
        assert!(name.matches_term(&["nft", "defi"]));
        assert!(!name.matches_term(&["def"]));
    }
}
