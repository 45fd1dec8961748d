//! Campaign target lists selected from scored customers
//!
//! Each list is written as a `master_id` header followed by one customer id
//! per line, in scoring order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use crate::data::CustomerRecord;
use crate::pipeline::SegmentRow;
use crate::segment::Segment;

pub const NEW_BRAND_FILE: &str = "new_brand_target_customer_ids.csv";
pub const DISCOUNT_FILE: &str = "discount_target_customer_ids.csv";

/// A segment- and interest-based customer selection
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub name: &'static str,
    pub segments: Vec<Segment>,
    /// Any of these interest tags qualifies
    pub categories: Vec<&'static str>,
    /// Exclusive lower bound on spend per order
    pub min_average_order_value: Option<f64>,
}

impl Campaign {
    /// Loyal, high-spending customers interested in women's products
    pub fn new_brand(min_average_order_value: f64) -> Self {
        Campaign {
            name: "new_brand",
            segments: vec![Segment::Champions, Segment::LoyalCustomers],
            categories: vec!["KADIN"],
            min_average_order_value: Some(min_average_order_value),
        }
    }

    /// Lapsed and new customers interested in men's or children's products
    pub fn discount() -> Self {
        Campaign {
            name: "discount",
            segments: vec![
                Segment::CantLoose,
                Segment::Hibernating,
                Segment::NewCustomers,
            ],
            categories: vec!["ERKEK", "COCUK"],
            min_average_order_value: None,
        }
    }

    fn accepts(&self, row: &SegmentRow, customer: &CustomerRecord) -> bool {
        self.segments.contains(&row.segment)
            && self
                .categories
                .iter()
                .any(|category| customer.is_interested_in(category))
            && self
                .min_average_order_value
                .map_or(true, |min| row.average_order_value() > min)
    }

    /// Ids of the scored customers this campaign targets
    pub fn select(
        &self,
        rows: &[SegmentRow],
        customers: &[CustomerRecord],
    ) -> crate::Result<Vec<String>> {
        let by_id: HashMap<&str, &CustomerRecord> = customers
            .iter()
            .map(|customer| (customer.customer_id.as_str(), customer))
            .collect();

        let mut selected = Vec::new();
        for row in rows {
            let Some(customer) = by_id.get(row.customer_id.as_str()) else {
                bail!("Scored customer {} is not in the customer table", row.customer_id);
            };
            if self.accepts(row, customer) {
                selected.push(row.customer_id.clone());
            }
        }

        info!(
            campaign = self.name,
            selected = selected.len(),
            "campaign targets selected"
        );
        Ok(selected)
    }
}

/// Write `ids` to `path`, one per line under a `master_id` header
pub fn write_customer_ids(ids: &[String], path: impl AsRef<Path>) -> crate::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "master_id")?;
    for id in ids {
        writeln!(writer, "{id}")?;
    }
    writer.flush()?;
    info!(ids = ids.len(), path = %path.display(), "customer ids written");
    Ok(())
}
