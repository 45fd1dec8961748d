//! Tabular views of a scoring run

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use polars::prelude::*;
use tracing::info;

use crate::pipeline::SegmentRow;

/// Scored rows as a frame with the columns
/// `customer_id, recency, frequency, monetary, rf_score, rfm_score, segment`
pub fn segments_frame(rows: &[SegmentRow]) -> crate::Result<DataFrame> {
    let frame = df!(
        "customer_id" => rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        "recency" => rows.iter().map(|r| r.recency).collect::<Vec<_>>(),
        "frequency" => rows.iter().map(|r| r.frequency).collect::<Vec<_>>(),
        "monetary" => rows.iter().map(|r| r.monetary).collect::<Vec<_>>(),
        "rf_score" => rows.iter().map(|r| r.codes.rf.as_str()).collect::<Vec<_>>(),
        "rfm_score" => rows.iter().map(|r| r.codes.rfm.as_str()).collect::<Vec<_>>(),
        "segment" => rows.iter().map(|r| r.segment.as_str()).collect::<Vec<_>>(),
    )?;
    Ok(frame)
}

/// Mean recency, frequency and monetary plus customer count per segment,
/// ordered by segment name
pub fn segment_summary(rows: &[SegmentRow]) -> crate::Result<DataFrame> {
    let summary = segments_frame(rows)?
        .lazy()
        .group_by([col("segment")])
        .agg([
            col("recency").cast(DataType::Float64).mean().alias("recency_mean"),
            col("frequency").cast(DataType::Float64).mean().alias("frequency_mean"),
            col("monetary").mean().alias("monetary_mean"),
            col("customer_id").count().alias("count"),
        ])
        .sort(["segment"], SortMultipleOptions::default())
        .collect()?;
    Ok(summary)
}

/// Write the scored table as CSV
pub fn write_segments_csv(rows: &[SegmentRow], path: impl AsRef<Path>) -> crate::Result<()> {
    let path = path.as_ref();
    let mut frame = segments_frame(rows)?;
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "scored table written");
    Ok(())
}
