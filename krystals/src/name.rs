// Content-addressed krystal file names.
//
// Saved krystals are named `{prefix}{level}({max})-{index}{suffix}`, e.g.
// `pk3(12)-2.krys`: a permutation krystal of level 3 whose largest value is
// 12, the second such krystal in the folder. Level and max are recomputed
// from the content on every save, so a name whose tokens no longer match the
// content means an upstream input changed and the krystal must move.

use std::fmt;

use crate::error::KrystalError;

/// File-name prefix of permutation krystals.
pub const PERMUTATION_PREFIX: &str = "pk";

/// A parsed krystal file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KrystalName {
    pub prefix: String,
    pub level: u32,
    pub max_value: u32,
    pub index: u32,
    pub suffix: String,
}

impl KrystalName {
    pub fn new(prefix: &str, level: u32, max_value: u32, index: u32, suffix: &str) -> Self {
        KrystalName {
            prefix: prefix.to_owned(),
            level,
            max_value,
            index,
            suffix: suffix.to_owned(),
        }
    }

    /// Parse `{prefix}{level}({max})-{index}{suffix}`. The prefix is the
    /// leading run of ASCII letters; the suffix is whatever follows the index
    /// digits.
    pub fn parse(name: &str) -> Result<Self, KrystalError> {
        let bad = || KrystalError::BadName(name.to_owned());

        let prefix_len = name
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(bad)?;
        let (prefix, rest) = name.split_at(prefix_len);
        if prefix.is_empty() {
            return Err(bad());
        }

        let open = rest.find('(').ok_or_else(bad)?;
        let level = rest[..open].parse().map_err(|_| bad())?;
        let rest = &rest[open + 1..];

        let close = rest.find(')').ok_or_else(bad)?;
        let max_value = rest[..close].parse().map_err(|_| bad())?;
        let rest = rest[close + 1..].strip_prefix('-').ok_or_else(bad)?;

        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let index = rest[..digits].parse().map_err(|_| bad())?;
        let suffix = &rest[digits..];

        Ok(KrystalName {
            prefix: prefix.to_owned(),
            level,
            max_value,
            index,
            suffix: suffix.to_owned(),
        })
    }

    /// True if this name still describes content with the given level and
    /// max value.
    pub fn matches_content(&self, level: u32, max_value: u32) -> bool {
        self.level == level && self.max_value == max_value
    }
}

impl fmt::Display for KrystalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}({})-{}{}",
            self.prefix, self.level, self.max_value, self.index, self.suffix
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_permutation_name() {
        let name = KrystalName::parse("pk3(12)-2.krys").unwrap();
        assert_eq!(name, KrystalName::new("pk", 3, 12, 2, ".krys"));
        assert_eq!(name.to_string(), "pk3(12)-2.krys");
    }

    #[test]
    fn suffix_may_be_empty_or_custom() {
        assert_eq!(KrystalName::parse("pk1(7)-10").unwrap().suffix, "");
        assert_eq!(KrystalName::parse("ck0(3)-1.kry2").unwrap().suffix, ".kry2");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "pk", "3(12)-1.krys", "pk3-1.krys", "pk3(x)-1.krys", "pk3(12)1.krys", "pk3(12)-.krys"] {
            assert!(
                matches!(KrystalName::parse(bad), Err(KrystalError::BadName(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn content_match_checks_level_and_max() {
        let name = KrystalName::parse("pk2(9)-1.krys").unwrap();
        assert!(name.matches_content(2, 9));
        assert!(!name.matches_content(2, 8));
        assert!(!name.matches_content(3, 9));
    }
}
