//! Per-metric ranks and the RF / RFM score codes built from them

use std::fmt;

/// A quantile rank in `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` outside `1..=5`
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Rank(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The single decimal digit of this rank
    pub fn digit(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ranks of one customer on each metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMetrics {
    pub recency: Rank,
    pub frequency: Rank,
    pub monetary: Rank,
}

/// Composite score codes: `RF` is the segment lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreCodes {
    pub rf: String,
    pub rfm: String,
}

impl ScoreCodes {
    pub fn compose(ranks: &RankedMetrics) -> Self {
        let rf: String = [ranks.recency.digit(), ranks.frequency.digit()]
            .into_iter()
            .collect();
        let mut rfm = rf.clone();
        rfm.push(ranks.monetary.digit());
        ScoreCodes { rf, rfm }
    }
}
