//! RfmForge: Customer segmentation CLI using RFM scores
//!
//! This is the main entrypoint that orchestrates data loading, exploration,
//! scoring, campaign exports and charts.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rfmforge::campaign::{DISCOUNT_FILE, NEW_BRAND_FILE};
use rfmforge::data::{channel_summary, describe, null_counts, top_customers, TopBy};
use rfmforge::{
    compute_segments, load_customer_table, report, viz, write_customer_ids, Args, Campaign,
    RfmConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if args.verbose {
        println!("RfmForge - Customer Segmentation using RFM scores");
        println!("=================================================\n");
    }

    run_pipeline(&args)
}

/// Run the full segmentation pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let analysis_date = args.parse_analysis_date()?;

    // Step 1: Load and prepare data
    if args.verbose {
        println!("Step 1: Loading customer data");
        println!("  Input file: {}", args.input.display());
    }
    let table = load_customer_table(&args.input)?;
    println!("✓ Data loaded: {} customers", table.records.len());

    // Step 2: Explore
    println!("\n=== First 10 Customers ===");
    println!("{}", table.frame.head(Some(10)));
    println!("\n=== Descriptive Statistics ===");
    println!("{}", describe(&table.frame)?);
    println!("\n=== Missing Values ===");
    println!("{}", null_counts(&table.frame));
    println!("\n=== Channel Summary ===");
    println!("{}", channel_summary(&table.frame)?);
    println!("\n=== Top {} Customers by Revenue ===", args.top);
    println!("{}", top_customers(&table.frame, TopBy::Revenue, args.top)?);
    println!("\n=== Top {} Customers by Orders ===", args.top);
    println!("{}", top_customers(&table.frame, TopBy::Orders, args.top)?);

    // Step 3: Score and segment
    if args.verbose {
        println!("\nStep 3: Scoring customers");
        println!("  Analysis date: {}", analysis_date);
    }
    let score_start = Instant::now();
    let config = RfmConfig::new(analysis_date)?;
    let rows = compute_segments(&table.records, &config)?;
    println!("\n✓ Customers scored: {}", rows.len());
    if args.verbose {
        println!("  Scoring time: {:.2}s", score_start.elapsed().as_secs_f64());
    }

    println!("\n=== Segment Summary ===");
    println!("{}", report::segment_summary(&rows)?);

    // Step 4: Exports
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let scored_path = args.output_dir.join("rfm_segments.csv");
    report::write_segments_csv(&rows, &scored_path)?;

    let campaigns = [
        (Campaign::new_brand(args.min_avg_spend), NEW_BRAND_FILE),
        (Campaign::discount(), DISCOUNT_FILE),
    ];
    println!("\n=== Campaign Targets ===");
    for (campaign, file_name) in &campaigns {
        let ids = campaign.select(&rows, &table.records)?;
        let path = args.output_dir.join(file_name);
        write_customer_ids(&ids, &path)?;
        println!("{}: {} customers -> {}", campaign.name, ids.len(), path.display());
    }

    // Step 5: Charts
    if !args.no_charts {
        viz::generate_segment_charts(&rows, &args.output_dir)?;
        println!("\n✓ Charts saved to: {}", args.output_dir.display());
    }

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Scored table saved to: {}", scored_path.display());

    Ok(())
}
