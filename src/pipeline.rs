//! End-to-end RFM scoring: metrics, quantile ranks, score codes and segments

use chrono::NaiveDateTime;
use tracing::info;

use crate::data::CustomerRecord;
use crate::error::{Metric, RfmResult};
use crate::metrics::{derive_metrics, DerivedMetrics};
use crate::quantile::{score_metric, ScoreDirection};
use crate::score::{Rank, RankedMetrics, ScoreCodes};
use crate::segment::{Segment, SegmentLookup, SegmentPatternTable};

/// Immutable settings for one scoring run
#[derive(Debug, Clone)]
pub struct RfmConfig {
    /// Reference point recency is measured from
    pub analysis_date: NaiveDateTime,
    segments: SegmentLookup,
}

impl RfmConfig {
    /// Config with the default segment table
    pub fn new(analysis_date: NaiveDateTime) -> RfmResult<Self> {
        Self::with_table(analysis_date, &SegmentPatternTable::default())
    }

    /// Config with a custom segment table, rejected if any RF code is unmapped
    pub fn with_table(
        analysis_date: NaiveDateTime,
        table: &SegmentPatternTable,
    ) -> RfmResult<Self> {
        Ok(RfmConfig {
            analysis_date,
            segments: SegmentLookup::build(table)?,
        })
    }

    pub fn segments(&self) -> &SegmentLookup {
        &self.segments
    }
}

/// One scored customer
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub customer_id: String,
    pub recency: u32,
    pub frequency: u32,
    pub monetary: f64,
    pub ranks: RankedMetrics,
    pub codes: ScoreCodes,
    pub segment: Segment,
}

impl SegmentRow {
    /// Average spend per order
    pub fn average_order_value(&self) -> f64 {
        self.monetary / f64::from(self.frequency)
    }
}

/// Score and segment every customer, preserving input order
///
/// All-or-nothing: the first invalid customer aborts the run, since ranks
/// over a partial population would be wrong for everyone else.
///
/// # Errors
/// * `InvalidInput` for the first customer whose metrics cannot be derived
/// * `InsufficientPopulation` when a metric cannot be split into quantiles
pub fn compute_segments(
    customers: &[CustomerRecord],
    config: &RfmConfig,
) -> RfmResult<Vec<SegmentRow>> {
    let metrics = customers
        .iter()
        .map(|customer| derive_metrics(customer, config.analysis_date))
        .collect::<RfmResult<Vec<DerivedMetrics>>>()?;

    let recency = rank_dimension(Metric::Recency, &metrics, |m| f64::from(m.recency))?;
    let frequency = rank_dimension(Metric::Frequency, &metrics, |m| f64::from(m.frequency))?;
    let monetary = rank_dimension(Metric::Monetary, &metrics, |m| m.monetary)?;

    let rows: Vec<SegmentRow> = customers
        .iter()
        .zip(metrics)
        .enumerate()
        .map(|(i, (customer, derived))| {
            let ranks = RankedMetrics {
                recency: recency[i],
                frequency: frequency[i],
                monetary: monetary[i],
            };
            SegmentRow {
                customer_id: customer.customer_id.clone(),
                recency: derived.recency,
                frequency: derived.frequency,
                monetary: derived.monetary,
                codes: ScoreCodes::compose(&ranks),
                segment: config.segments.segment(ranks.recency, ranks.frequency),
                ranks,
            }
        })
        .collect();

    info!(
        customers = rows.len(),
        analysis_date = %config.analysis_date,
        "customers scored"
    );
    Ok(rows)
}

fn rank_dimension(
    metric: Metric,
    metrics: &[DerivedMetrics],
    value: impl Fn(&DerivedMetrics) -> f64,
) -> RfmResult<Vec<Rank>> {
    let values: Vec<f64> = metrics.iter().map(value).collect();
    score_metric(metric, &values, ScoreDirection::for_metric(metric))
}
