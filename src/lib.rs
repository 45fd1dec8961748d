//! RfmForge: A Rust CLI application for customer segmentation using RFM scores
//!
//! Customers are scored on Recency, Frequency and Monetary value by
//! equal-frequency quantile binning across the whole population, and the
//! recency/frequency code is mapped onto a fixed set of named segments.

pub mod campaign;
pub mod cli;
pub mod data;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod quantile;
pub mod report;
pub mod score;
pub mod segment;
pub mod viz;

// Re-export public items for easier access
pub use campaign::{write_customer_ids, Campaign};
pub use cli::Args;
pub use data::{load_customer_table, CustomerRecord, CustomerTable};
pub use error::{Metric, RfmError, RfmResult};
pub use metrics::{derive_metrics, DerivedMetrics};
pub use pipeline::{compute_segments, RfmConfig, SegmentRow};
pub use quantile::{score_metric, ScoreDirection, BIN_COUNT};
pub use score::{Rank, RankedMetrics, ScoreCodes};
pub use segment::{Segment, SegmentLookup, SegmentPatternTable, SegmentRule};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
