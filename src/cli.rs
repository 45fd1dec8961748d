//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;

/// Customer segmentation CLI using quantile-binned RFM scores
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "flo_data_20K.csv")]
    pub input: PathBuf,

    /// Reference date recency is measured from (YYYY-MM-DD)
    #[arg(short, long, default_value = "2021-06-01")]
    pub analysis_date: String,

    /// Directory for campaign lists, the scored table and charts
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of customers in the top-N tables
    #[arg(short = 'n', long, default_value = "10")]
    pub top: usize,

    /// Average order value a new-brand target must exceed
    #[arg(long, default_value = "250")]
    pub min_avg_spend: f64,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the analysis date as midnight of the given day
    pub fn parse_analysis_date(&self) -> crate::Result<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.analysis_date.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid analysis date: {}", self.analysis_date))?;
        date.and_hms_opt(0, 0, 0)
            .with_context(|| format!("Invalid analysis date: {}", self.analysis_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analysis_date() {
        let mut args = Args::parse_from(["rfmforge"]);
        assert_eq!(args.top, 10);
        assert_eq!(
            args.parse_analysis_date().unwrap().to_string(),
            "2021-06-01 00:00:00"
        );

        args.analysis_date = "2021-13-01".to_string();
        assert!(args.parse_analysis_date().is_err());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "rfmforge",
            "--input",
            "customers.csv",
            "--analysis-date",
            "2022-01-15",
            "--min-avg-spend",
            "300",
            "--no-charts",
            "-v",
        ]);
        assert_eq!(args.input, PathBuf::from("customers.csv"));
        assert_eq!(args.min_avg_spend, 300.0);
        assert!(args.no_charts);
        assert!(args.verbose);
        assert_eq!(
            args.parse_analysis_date().unwrap().to_string(),
            "2022-01-15 00:00:00"
        );
    }
}
