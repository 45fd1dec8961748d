//! Equal-frequency (quantile) binning of a metric across the whole population
//!
//! Raw values are first replaced by their ordinal rank, ties broken by input
//! order, so every value is distinct before the bucket edges are computed.
//! Without this, heavily tied metrics such as order counts collapse into
//! duplicate edges and lopsided buckets.

use tracing::debug;

use crate::error::{Metric, RfmError, RfmResult};
use crate::score::Rank;

/// Number of quantile buckets per metric
pub const BIN_COUNT: usize = 5;

/// Which end of the value range earns the highest rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDirection {
    /// Lowest values land in rank 1
    Ascending,
    /// Lowest values land in rank 5 (recency: fewer days is better)
    Descending,
}

impl ScoreDirection {
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Recency => ScoreDirection::Descending,
            Metric::Frequency | Metric::Monetary => ScoreDirection::Ascending,
        }
    }
}

/// Ordinal 1-based ranks of `values`; equal values rank in input order
pub fn ordinal_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps input order among ties
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0; values.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

/// Bucket edges at the 0, 1/bins, ..., 100th percentiles of `sorted`,
/// using linear interpolation between neighbouring values
pub fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    if sorted.is_empty() {
        return Vec::new();
    }
    let last = sorted.len() - 1;
    (0..=bins)
        .map(|k| {
            let position = (last * k) as f64 / bins as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        })
        .collect()
}

/// 1-based bucket of `value`: the first bucket is closed on both ends,
/// every later one is `(edge[k-1], edge[k]]`
fn bucket_of(value: f64, edges: &[f64]) -> usize {
    let interior = &edges[1..edges.len() - 1];
    interior.partition_point(|&edge| edge < value) + 1
}

/// Assign every value a rank in `1..=BIN_COUNT` relative to the population
///
/// # Errors
/// * `InsufficientPopulation` when the population cannot form `BIN_COUNT`
///   distinct bucket edges
pub fn score_metric(
    metric: Metric,
    values: &[f64],
    direction: ScoreDirection,
) -> RfmResult<Vec<Rank>> {
    let insufficient = || RfmError::InsufficientPopulation {
        metric,
        population: values.len(),
        bins: BIN_COUNT,
    };

    let ranks: Vec<f64> = ordinal_ranks(values).into_iter().map(|r| r as f64).collect();
    let mut sorted = ranks.clone();
    sorted.sort_by(f64::total_cmp);

    let edges = quantile_edges(&sorted, BIN_COUNT);
    if edges.len() != BIN_COUNT + 1 || edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(insufficient());
    }
    debug!(%metric, population = values.len(), ?edges, "quantile edges computed");

    ranks
        .iter()
        .map(|&rank| {
            let bucket = bucket_of(rank, &edges);
            let label = match direction {
                ScoreDirection::Ascending => bucket,
                ScoreDirection::Descending => BIN_COUNT + 1 - bucket,
            };
            Rank::new(label as u8).ok_or_else(insufficient)
        })
        .collect()
}
