//! Customer loading and descriptive exploration using Polars

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{info, warn};

const MASTER_ID: &str = "master_id";
const ORDER_CHANNEL: &str = "order_channel";
const LAST_ORDER_CHANNEL: &str = "last_order_channel";
const FIRST_ORDER_DATE: &str = "first_order_date";
const LAST_ORDER_DATE: &str = "last_order_date";
const LAST_ORDER_DATE_ONLINE: &str = "last_order_date_online";
const LAST_ORDER_DATE_OFFLINE: &str = "last_order_date_offline";
const ONLINE_ORDERS: &str = "order_num_total_ever_online";
const OFFLINE_ORDERS: &str = "order_num_total_ever_offline";
const ONLINE_SPEND: &str = "customer_value_total_ever_online";
const OFFLINE_SPEND: &str = "customer_value_total_ever_offline";
const INTERESTS: &str = "interested_in_categories_12";

/// Derived column: online + offline orders
pub const ORDER_NUM_TOTAL: &str = "order_num_total";
/// Derived column: online + offline spend
pub const CUSTOMER_VALUE_TOTAL: &str = "customer_value_total";

/// Purchase history of one omnichannel customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub order_channel: Option<String>,
    pub last_order_channel: Option<String>,
    pub first_order_date: Option<NaiveDateTime>,
    pub last_order_date: Option<NaiveDateTime>,
    pub last_order_date_online: Option<NaiveDateTime>,
    pub last_order_date_offline: Option<NaiveDateTime>,
    pub online_orders: u32,
    pub offline_orders: u32,
    pub online_spend: f64,
    pub offline_spend: f64,
    /// Categories shopped in the last 12 months
    pub interests: Vec<String>,
}

impl CustomerRecord {
    pub fn new(customer_id: impl Into<String>, last_order_date: NaiveDateTime) -> Self {
        CustomerRecord {
            customer_id: customer_id.into(),
            order_channel: None,
            last_order_channel: None,
            first_order_date: None,
            last_order_date: Some(last_order_date),
            last_order_date_online: None,
            last_order_date_offline: None,
            online_orders: 0,
            offline_orders: 0,
            online_spend: 0.0,
            offline_spend: 0.0,
            interests: Vec::new(),
        }
    }

    pub fn with_orders(mut self, online: u32, offline: u32) -> Self {
        self.online_orders = online;
        self.offline_orders = offline;
        self
    }

    pub fn with_spend(mut self, online: f64, offline: f64) -> Self {
        self.online_spend = online;
        self.offline_spend = offline;
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// Latest purchase across the overall, online and offline dates
    pub fn latest_purchase(&self) -> Option<NaiveDateTime> {
        [
            self.last_order_date,
            self.last_order_date_online,
            self.last_order_date_offline,
        ]
        .into_iter()
        .flatten()
        .max()
    }

    /// Substring match against the interest tags, e.g. `KADIN`
    pub fn is_interested_in(&self, category: &str) -> bool {
        self.interests.iter().any(|tag| tag.contains(category))
    }
}

/// Loaded customers alongside the prepared frame used for exploration
#[derive(Debug)]
pub struct CustomerTable {
    /// Raw columns plus `order_num_total` and `customer_value_total`
    pub frame: DataFrame,
    /// One record per row, in file order
    pub records: Vec<CustomerRecord>,
}

/// Load the customer CSV and prepare omnichannel totals
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `CustomerTable` with the prepared frame and typed records
pub fn load_customer_table(file_path: impl AsRef<Path>) -> crate::Result<CustomerTable> {
    let path = file_path.as_ref();

    let frame = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(None)
        .finish()
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_columns([
            (col(ONLINE_ORDERS).cast(DataType::Float64)
                + col(OFFLINE_ORDERS).cast(DataType::Float64))
            .alias(ORDER_NUM_TOTAL),
            (col(ONLINE_SPEND).cast(DataType::Float64)
                + col(OFFLINE_SPEND).cast(DataType::Float64))
            .alias(CUSTOMER_VALUE_TOTAL),
        ])
        .collect()
        .with_context(|| format!("Failed to read customer data from {}", path.display()))?;

    if frame.height() == 0 {
        bail!("No customers found in {}", path.display());
    }

    let records = build_records(&frame)?;
    info!(customers = records.len(), path = %path.display(), "customer data loaded");

    Ok(CustomerTable { frame, records })
}

fn build_records(frame: &DataFrame) -> crate::Result<Vec<CustomerRecord>> {
    let height = frame.height();
    let ids = string_column(frame, MASTER_ID)?;
    let online_orders = float_column(frame, ONLINE_ORDERS)?;
    let offline_orders = float_column(frame, OFFLINE_ORDERS)?;
    let online_spend = float_column(frame, ONLINE_SPEND)?;
    let offline_spend = float_column(frame, OFFLINE_SPEND)?;
    let last_order = string_column(frame, LAST_ORDER_DATE)?;
    let channel = optional_string_column(frame, ORDER_CHANNEL, height)?;
    let last_channel = optional_string_column(frame, LAST_ORDER_CHANNEL, height)?;
    let first_order = optional_string_column(frame, FIRST_ORDER_DATE, height)?;
    let last_online = optional_string_column(frame, LAST_ORDER_DATE_ONLINE, height)?;
    let last_offline = optional_string_column(frame, LAST_ORDER_DATE_OFFLINE, height)?;
    let interests = optional_string_column(frame, INTERESTS, height)?;

    let mut seen = HashSet::with_capacity(height);
    let mut records = Vec::with_capacity(height);

    for row in 0..height {
        let Some(customer_id) = ids[row].clone() else {
            bail!("Row {}: missing {}", row + 1, MASTER_ID);
        };
        if !seen.insert(customer_id.clone()) {
            bail!("Duplicate customer id: {}", customer_id);
        }

        let date = |column: &str, raw: &Option<String>| -> crate::Result<Option<NaiveDateTime>> {
            match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(value) => parse_timestamp(value).map(Some).with_context(|| {
                    format!("Customer {customer_id}: invalid {column} '{value}'")
                }),
            }
        };

        records.push(CustomerRecord {
            order_channel: channel[row].clone(),
            last_order_channel: last_channel[row].clone(),
            first_order_date: date(FIRST_ORDER_DATE, &first_order[row])?,
            last_order_date: date(LAST_ORDER_DATE, &last_order[row])?,
            last_order_date_online: date(LAST_ORDER_DATE_ONLINE, &last_online[row])?,
            last_order_date_offline: date(LAST_ORDER_DATE_OFFLINE, &last_offline[row])?,
            online_orders: order_count(&customer_id, ONLINE_ORDERS, online_orders[row])?,
            offline_orders: order_count(&customer_id, OFFLINE_ORDERS, offline_orders[row])?,
            online_spend: required(&customer_id, ONLINE_SPEND, online_spend[row])?,
            offline_spend: required(&customer_id, OFFLINE_SPEND, offline_spend[row])?,
            interests: interests[row]
                .as_deref()
                .map(|raw| parse_interests(&customer_id, raw))
                .unwrap_or_default(),
            customer_id,
        });
    }

    Ok(records)
}

fn string_column(frame: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let series = frame
        .column(name)
        .with_context(|| format!("Missing column: {name}"))?
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn optional_string_column(
    frame: &DataFrame,
    name: &str,
    height: usize,
) -> crate::Result<Vec<Option<String>>> {
    if frame.column(name).is_ok() {
        string_column(frame, name)
    } else {
        Ok(vec![None; height])
    }
}

fn float_column(frame: &DataFrame, name: &str) -> crate::Result<Vec<Option<f64>>> {
    let series = frame
        .column(name)
        .with_context(|| format!("Missing column: {name}"))?
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn required(customer_id: &str, column: &str, value: Option<f64>) -> crate::Result<f64> {
    value.with_context(|| format!("Customer {customer_id}: missing {column}"))
}

/// Order counts may be written as floats (`4.0`) but must be whole
fn order_count(customer_id: &str, column: &str, value: Option<f64>) -> crate::Result<u32> {
    let value = required(customer_id, column, value)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        bail!("Customer {customer_id}: {column} must be a whole non-negative count, got {value}");
    }
    Ok(value as u32)
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`
pub fn parse_timestamp(raw: &str) -> crate::Result<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .with_context(|| format!("Unrecognised date: {raw}"))
}

/// Parse a category list such as `[KADIN, ERKEK]`
fn parse_interests(customer_id: &str, raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = match trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => inner,
        None => {
            warn!(customer_id, raw, "category list is not bracketed");
            trimmed
        }
    };
    inner
        .split(',')
        .map(|tag| tag.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Customer count, orders and spend per shopping channel, largest first
pub fn channel_summary(frame: &DataFrame) -> crate::Result<DataFrame> {
    let summary = frame
        .clone()
        .lazy()
        .group_by([col(ORDER_CHANNEL)])
        .agg([
            col(MASTER_ID).count().alias("customers"),
            col(ORDER_NUM_TOTAL).sum().alias("orders"),
            col(CUSTOMER_VALUE_TOTAL).sum().alias("spend"),
        ])
        .sort(
            ["customers"],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(summary)
}

/// Ranking key for [`top_customers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBy {
    Revenue,
    Orders,
}

impl TopBy {
    fn column(self) -> &'static str {
        match self {
            TopBy::Revenue => CUSTOMER_VALUE_TOTAL,
            TopBy::Orders => ORDER_NUM_TOTAL,
        }
    }
}

/// The `n` customers with the highest revenue or order count
pub fn top_customers(frame: &DataFrame, by: TopBy, n: usize) -> crate::Result<DataFrame> {
    let limit = IdxSize::try_from(n).context("Top-N limit is too large")?;
    let top = frame
        .clone()
        .lazy()
        .select([
            col(MASTER_ID),
            col(ORDER_CHANNEL),
            col(ORDER_NUM_TOTAL),
            col(CUSTOMER_VALUE_TOTAL),
        ])
        .sort(
            [by.column()],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(limit)
        .collect()?;
    Ok(top)
}

/// Count, mean, standard deviation, min and max of every numeric column,
/// one row per column
pub fn describe(frame: &DataFrame) -> crate::Result<DataFrame> {
    let numeric: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|series| series.dtype().is_numeric())
        .map(|series| series.name().to_string())
        .collect();

    let mut count = Vec::with_capacity(numeric.len());
    let mut mean = Vec::with_capacity(numeric.len());
    let mut std = Vec::with_capacity(numeric.len());
    let mut min = Vec::with_capacity(numeric.len());
    let mut max = Vec::with_capacity(numeric.len());

    for name in &numeric {
        let value = col(name).cast(DataType::Float64);
        let stats = frame
            .clone()
            .lazy()
            .select([
                col(name).count().cast(DataType::Float64).alias("count"),
                value.clone().mean().alias("mean"),
                value.clone().std(1).alias("std"),
                value.clone().min().alias("min"),
                value.max().alias("max"),
            ])
            .collect()?;
        count.push(first_value(&stats, "count")?);
        mean.push(first_value(&stats, "mean")?);
        std.push(first_value(&stats, "std")?);
        min.push(first_value(&stats, "min")?);
        max.push(first_value(&stats, "max")?);
    }

    let summary = df!(
        "column" => numeric,
        "count" => count,
        "mean" => mean,
        "std" => std,
        "min" => min,
        "max" => max,
    )?;
    Ok(summary)
}

fn first_value(stats: &DataFrame, name: &str) -> crate::Result<Option<f64>> {
    Ok(stats.column(name)?.f64()?.get(0))
}

/// Missing values per column, as a single-row frame
pub fn null_counts(frame: &DataFrame) -> DataFrame {
    frame.null_count()
}
