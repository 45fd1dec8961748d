//! Segment assignment from the two-digit RF code
//!
//! The pattern table is scanned in declared order and the first matching rule
//! wins. Since the code space is only 5 x 5, the table is resolved once into a
//! dense lookup that also proves every code is covered.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{RfmError, RfmResult};
use crate::score::Rank;

/// Named behavioural segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Hibernating,
    AtRisk,
    CantLoose,
    AboutToSleep,
    NeedAttention,
    LoyalCustomers,
    Promising,
    NewCustomers,
    PotentialLoyalists,
    Champions,
}

impl Segment {
    pub const ALL: [Segment; 10] = [
        Segment::Hibernating,
        Segment::AtRisk,
        Segment::CantLoose,
        Segment::AboutToSleep,
        Segment::NeedAttention,
        Segment::LoyalCustomers,
        Segment::Promising,
        Segment::NewCustomers,
        Segment::PotentialLoyalists,
        Segment::Champions,
    ];

    /// Position of this segment in [`Segment::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Hibernating => "hibernating",
            Segment::AtRisk => "at_risk",
            Segment::CantLoose => "cant_loose",
            Segment::AboutToSleep => "about_to_sleep",
            Segment::NeedAttention => "need_attention",
            Segment::LoyalCustomers => "loyal_customers",
            Segment::Promising => "promising",
            Segment::NewCustomers => "new_customers",
            Segment::PotentialLoyalists => "potential_loyalists",
            Segment::Champions => "champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = RfmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Segment::ALL
            .into_iter()
            .find(|segment| segment.as_str() == wanted)
            .ok_or_else(|| RfmError::UnknownSegment {
                name: s.to_string(),
            })
    }
}

/// One `(recency digits) x (frequency digits) -> segment` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRule {
    pub recency: &'static [u8],
    pub frequency: &'static [u8],
    pub segment: Segment,
}

impl SegmentRule {
    pub const fn new(recency: &'static [u8], frequency: &'static [u8], segment: Segment) -> Self {
        SegmentRule {
            recency,
            frequency,
            segment,
        }
    }

    pub fn matches(&self, recency: u8, frequency: u8) -> bool {
        self.recency.contains(&recency) && self.frequency.contains(&frequency)
    }
}

/// Ordered rule list; order matters where rules overlap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPatternTable {
    rules: Vec<SegmentRule>,
}

const DEFAULT_RULES: [SegmentRule; 10] = [
    SegmentRule::new(&[1, 2], &[1, 2], Segment::Hibernating),
    SegmentRule::new(&[1, 2], &[3, 4], Segment::AtRisk),
    SegmentRule::new(&[1, 2], &[5], Segment::CantLoose),
    SegmentRule::new(&[3], &[1, 2], Segment::AboutToSleep),
    SegmentRule::new(&[3], &[3], Segment::NeedAttention),
    SegmentRule::new(&[3, 4], &[4, 5], Segment::LoyalCustomers),
    SegmentRule::new(&[4], &[1], Segment::Promising),
    SegmentRule::new(&[5], &[1], Segment::NewCustomers),
    SegmentRule::new(&[4, 5], &[2, 3], Segment::PotentialLoyalists),
    SegmentRule::new(&[5], &[4, 5], Segment::Champions),
];

impl Default for SegmentPatternTable {
    fn default() -> Self {
        SegmentPatternTable::new(DEFAULT_RULES.to_vec())
    }
}

impl SegmentPatternTable {
    pub fn new(rules: Vec<SegmentRule>) -> Self {
        SegmentPatternTable { rules }
    }

    pub fn rules(&self) -> &[SegmentRule] {
        &self.rules
    }

    /// First rule matching the digit pair, in declared order
    pub fn classify(&self, recency: u8, frequency: u8) -> Option<Segment> {
        self.rules
            .iter()
            .find(|rule| rule.matches(recency, frequency))
            .map(|rule| rule.segment)
    }
}

const RANKS: usize = Rank::MAX as usize;

/// Dense RF code -> segment table resolved from a [`SegmentPatternTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLookup {
    table: [[Segment; RANKS]; RANKS],
}

impl SegmentLookup {
    /// Resolve every RF code against `patterns`
    ///
    /// # Errors
    /// * `UnmappedSegment` naming the first code no rule matches
    pub fn build(patterns: &SegmentPatternTable) -> RfmResult<Self> {
        let mut table = [[Segment::Hibernating; RANKS]; RANKS];
        for recency in Rank::MIN..=Rank::MAX {
            for frequency in Rank::MIN..=Rank::MAX {
                let segment = patterns.classify(recency, frequency).ok_or_else(|| {
                    RfmError::UnmappedSegment {
                        code: format!("{recency}{frequency}"),
                    }
                })?;
                table[usize::from(recency - 1)][usize::from(frequency - 1)] = segment;
            }
        }
        debug!(rules = patterns.rules().len(), "segment lookup built");
        Ok(SegmentLookup { table })
    }

    pub fn segment(&self, recency: Rank, frequency: Rank) -> Segment {
        self.table[usize::from(recency.get() - 1)][usize::from(frequency.get() - 1)]
    }

    /// Look up a two-character RF code such as `"54"`
    pub fn classify_code(&self, code: &str) -> RfmResult<Segment> {
        let unmapped = || RfmError::UnmappedSegment {
            code: code.to_string(),
        };
        let digits: Vec<Rank> = code
            .chars()
            .map(|c| c.to_digit(10).and_then(|d| Rank::new(d as u8)))
            .collect::<Option<_>>()
            .ok_or_else(unmapped)?;
        match digits.as_slice() {
            [recency, frequency] => Ok(self.segment(*recency, *frequency)),
            _ => Err(unmapped()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> SegmentLookup {
        SegmentLookup::build(&SegmentPatternTable::default()).unwrap()
    }

    #[test]
    fn test_known_codes() {
        let lookup = lookup();
        assert_eq!(lookup.classify_code("55").unwrap(), Segment::Champions);
        assert_eq!(lookup.classify_code("11").unwrap(), Segment::Hibernating);
        assert_eq!(lookup.classify_code("41").unwrap(), Segment::Promising);
        assert_eq!(lookup.classify_code("33").unwrap(), Segment::NeedAttention);
        assert_eq!(lookup.classify_code("24").unwrap(), Segment::AtRisk);
        assert_eq!(lookup.classify_code("15").unwrap(), Segment::CantLoose);
        assert_eq!(lookup.classify_code("32").unwrap(), Segment::AboutToSleep);
        assert_eq!(lookup.classify_code("34").unwrap(), Segment::LoyalCustomers);
        assert_eq!(lookup.classify_code("51").unwrap(), Segment::NewCustomers);
        assert_eq!(lookup.classify_code("43").unwrap(), Segment::PotentialLoyalists);
    }

    #[test]
    fn test_default_table_covers_every_code_and_label() {
        let table = SegmentPatternTable::default();
        let lookup = lookup();
        let mut seen = Vec::new();
        for r in 1..=5 {
            for f in 1..=5 {
                let expected = table.classify(r, f).unwrap();
                let got = lookup.segment(Rank::new(r).unwrap(), Rank::new(f).unwrap());
                assert_eq!(got, expected);
                if !seen.contains(&got) {
                    seen.push(got);
                }
            }
        }
        assert_eq!(seen.len(), Segment::ALL.len());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let table = SegmentPatternTable::new(vec![
            SegmentRule::new(&[1, 2, 3, 4, 5], &[1], Segment::Promising),
            SegmentRule::new(&[5], &[1, 2, 3, 4, 5], Segment::Champions),
            SegmentRule::new(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5], Segment::Hibernating),
        ]);
        let lookup = SegmentLookup::build(&table).unwrap();
        assert_eq!(lookup.classify_code("51").unwrap(), Segment::Promising);
        assert_eq!(lookup.classify_code("52").unwrap(), Segment::Champions);
        assert_eq!(lookup.classify_code("22").unwrap(), Segment::Hibernating);
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let mut rules = SegmentPatternTable::default().rules().to_vec();
        rules.retain(|rule| rule.segment != Segment::NeedAttention);
        let err = SegmentLookup::build(&SegmentPatternTable::new(rules)).unwrap_err();
        assert_eq!(
            err,
            RfmError::UnmappedSegment {
                code: "33".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_codes() {
        let lookup = lookup();
        for code in ["", "5", "555", "06", "5a"] {
            assert!(matches!(
                lookup.classify_code(code),
                Err(RfmError::UnmappedSegment { .. })
            ));
        }
    }

    #[test]
    fn test_segment_names_round_trip() {
        for segment in Segment::ALL {
            assert_eq!(segment.as_str().parse::<Segment>().unwrap(), segment);
        }
        assert_eq!("At_Risk".parse::<Segment>().unwrap(), Segment::AtRisk);
        assert_eq!(
            "vip".parse::<Segment>().unwrap_err(),
            RfmError::UnknownSegment {
                name: "vip".to_string()
            }
        );
    }

    #[test]
    fn test_index_follows_all_order() {
        for (position, segment) in Segment::ALL.into_iter().enumerate() {
            assert_eq!(segment.index(), position);
        }
    }
}
