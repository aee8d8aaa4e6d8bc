//! Category predicates
//!
//! A predicate accepts a record when its primary code is in an accepted set
//! AND its sub-code is in an explicit set or any of the inclusive ranges.
//! A missing sub-code never matches.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::SubCode;

/// Accepted sub-codes: explicit values OR-ed with inclusive ranges
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubCodeFilter {
    values: BTreeSet<SubCode>,
    ranges: Vec<RangeInclusive<SubCode>>,
}

impl SubCodeFilter {
    pub fn contains(&self, code: SubCode) -> bool {
        self.values.contains(&code) || self.ranges.iter().any(|r| r.contains(&code))
    }

    /// True when no sub-code can match
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.ranges.iter().all(|r| r.is_empty())
    }
}

/// Filter over (primary code, sub-code)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    primary_codes: BTreeSet<String>,
    sub_codes: SubCodeFilter,
}

impl Predicate {
    /// Predicate on a single primary code
    pub fn code(code: &str) -> Self {
        Self::codes([code])
    }

    /// Predicate on a set of primary codes
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary_codes: codes.into_iter().map(Into::into).collect(),
            sub_codes: SubCodeFilter::default(),
        }
    }

    /// Accept one sub-code
    pub fn value(mut self, code: SubCode) -> Self {
        self.sub_codes.values.insert(code);
        self
    }

    /// Accept a set of sub-codes
    pub fn values(mut self, codes: impl IntoIterator<Item = SubCode>) -> Self {
        self.sub_codes.values.extend(codes);
        self
    }

    /// Accept an inclusive range of sub-codes
    pub fn range(mut self, range: RangeInclusive<SubCode>) -> Self {
        self.sub_codes.ranges.push(range);
        self
    }

    pub fn matches(&self, primary_code: Option<&str>, sub_code: Option<SubCode>) -> bool {
        let (Some(primary), Some(sub)) = (primary_code, sub_code) else {
            return false;
        };
        self.primary_codes.contains(primary) && self.sub_codes.contains(sub)
    }

    pub fn primary_codes(&self) -> impl Iterator<Item = &str> {
        self.primary_codes.iter().map(String::as_str)
    }

    pub fn sub_codes(&self) -> &SubCodeFilter {
        &self.sub_codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_set_membership() {
        let p = Predicate::code("1-100-F001").values([33, 34, 35, 20, 1, 2]);
        assert!(p.matches(Some("1-100-F001"), Some(20)));
        assert!(p.matches(Some("1-100-F001"), Some(1)));
        assert!(!p.matches(Some("1-100-F001"), Some(3)));
    }

    #[test]
    fn ranges_are_inclusive_and_or_combined() {
        let p = Predicate::code("2-100-I002")
            .range(1..=13)
            .range(20..=29)
            .range(33..=51);
        for code in [1, 13, 20, 29, 33, 51] {
            assert!(p.matches(Some("2-100-I002"), Some(code)), "{code}");
        }
        for code in [0, 14, 19, 30, 32, 52] {
            assert!(!p.matches(Some("2-100-I002"), Some(code)), "{code}");
        }
    }

    #[test]
    fn values_and_ranges_combine() {
        let p = Predicate::code("1-100-F001").range(1..=3).value(64);
        assert!(p.matches(Some("1-100-F001"), Some(64)));
        assert!(p.matches(Some("1-100-F001"), Some(2)));
        assert!(!p.matches(Some("1-100-F001"), Some(63)));
    }

    #[test]
    fn primary_code_set() {
        let p = Predicate::codes(["2-100-I002", "2-100-I001"]).values([17, 58, 59]);
        assert!(p.matches(Some("2-100-I001"), Some(58)));
        assert!(p.matches(Some("2-100-I002"), Some(17)));
        assert!(!p.matches(Some("1-100-F001"), Some(17)));
        assert_eq!(
            p.primary_codes().collect::<Vec<_>>(),
            vec!["2-100-I001", "2-100-I002"]
        );
    }

    #[test]
    fn missing_inputs_never_match() {
        let p = Predicate::code("1-100-F001").range(0..=99);
        assert!(!p.matches(Some("1-100-F001"), None));
        assert!(!p.matches(None, Some(5)));
        assert!(!p.matches(None, None));
    }

    #[test]
    fn predicate_without_sub_codes_matches_nothing() {
        let p = Predicate::code("1-100-F001");
        assert!(p.sub_codes().is_empty());
        assert!(!p.matches(Some("1-100-F001"), Some(1)));
    }
}
