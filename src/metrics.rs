//! Recency, frequency and monetary metrics derived from a customer record

use chrono::NaiveDateTime;

use crate::data::CustomerRecord;
use crate::error::{RfmError, RfmResult};

/// Raw RFM metrics for a single customer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// Whole days between the last purchase and the analysis date
    pub recency: u32,
    /// Total orders across online and offline channels
    pub frequency: u32,
    /// Total spend across online and offline channels
    pub monetary: f64,
}

/// Derive the RFM metrics of one customer relative to `analysis_date`
///
/// # Errors
/// * `InvalidInput` when the customer has no purchase date, purchased after
///   the analysis date, has zero orders, or has a negative / non-finite spend
pub fn derive_metrics(
    customer: &CustomerRecord,
    analysis_date: NaiveDateTime,
) -> RfmResult<DerivedMetrics> {
    let id = customer.customer_id.as_str();

    let last_purchase = customer
        .latest_purchase()
        .ok_or_else(|| RfmError::invalid(id, "last purchase date is missing"))?;
    if last_purchase > analysis_date {
        return Err(RfmError::invalid(
            id,
            format!("last purchase {last_purchase} is after analysis date {analysis_date}"),
        ));
    }
    let recency = u32::try_from((analysis_date - last_purchase).num_days())
        .map_err(|_| RfmError::invalid(id, "recency does not fit in a day count"))?;

    let frequency = customer
        .online_orders
        .checked_add(customer.offline_orders)
        .ok_or_else(|| RfmError::invalid(id, "order count overflow"))?;
    if frequency == 0 {
        return Err(RfmError::invalid(id, "customer has no orders"));
    }

    for (channel, spend) in [
        ("online", customer.online_spend),
        ("offline", customer.offline_spend),
    ] {
        if !spend.is_finite() || spend < 0.0 {
            return Err(RfmError::invalid(
                id,
                format!("{channel} spend must be a non-negative amount, got {spend}"),
            ));
        }
    }
    let monetary = customer.online_spend + customer.offline_spend;

    Ok(DerivedMetrics {
        recency,
        frequency,
        monetary,
    })
}
