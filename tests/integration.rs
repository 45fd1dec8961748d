//! Integration tests for RfmForge

use std::collections::HashSet;
use std::io::Write;

use chrono::NaiveDate;
use rfmforge::campaign::{DISCOUNT_FILE, NEW_BRAND_FILE};
use rfmforge::{
    compute_segments, load_customer_table, report, write_customer_ids, Campaign, RfmConfig,
    RfmError, Segment,
};
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str = "master_id,order_channel,last_order_channel,first_order_date,last_order_date,last_order_date_online,last_order_date_offline,order_num_total_ever_online,order_num_total_ever_offline,customer_value_total_ever_offline,customer_value_total_ever_online,interested_in_categories_12";

const CATEGORIES: [&str; 5] = [
    "\"[KADIN]\"",
    "\"[ERKEK, COCUK]\"",
    "\"[KADIN, AKTIFSPOR]\"",
    "\"[COCUK, KADIN, ERKEK]\"",
    "[]",
];

/// Create a test CSV with 40 customers spread over dates, orders and spend
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();

    let channels = ["Android App", "Mobile", "Ios App", "Desktop"];
    let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    for i in 0..40u32 {
        let last_order = start + chrono::Duration::days(i64::from((i * 37) % 360));
        let online_orders = 1 + (i * 7) % 9;
        let offline_orders = i % 3;
        let online_spend = 50.0 + f64::from((i * 53) % 40) * 45.5;
        let offline_spend = f64::from(i % 5) * 30.0;
        writeln!(
            file,
            "cust-{i:02},{channel},Offline,2019-01-01,{last_order},{last_order},2020-01-01,{online_orders}.0,{offline_orders}.0,{offline_spend:.2},{online_spend:.2},{categories}",
            channel = channels[i as usize % channels.len()],
            categories = CATEGORIES[i as usize % CATEGORIES.len()],
        )
        .unwrap();
    }

    file
}

fn analysis_date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    assert_eq!(table.records.len(), 40);

    let config = RfmConfig::new(analysis_date()).unwrap();
    let rows = compute_segments(&table.records, &config).unwrap();

    // Output preserves input order, one row per customer
    assert_eq!(rows.len(), 40);
    for (row, record) in rows.iter().zip(&table.records) {
        assert_eq!(row.customer_id, record.customer_id);
        assert_eq!(row.codes.rf.len(), 2);
        assert_eq!(row.codes.rfm.len(), 3);
        assert_eq!(config.segments().classify_code(&row.codes.rf).unwrap(), row.segment);
    }

    // Equal-frequency buckets: 8 customers per rank for every metric
    for ranks in [
        rows.iter().map(|r| r.ranks.recency.get()).collect::<Vec<_>>(),
        rows.iter().map(|r| r.ranks.frequency.get()).collect(),
        rows.iter().map(|r| r.ranks.monetary.get()).collect(),
    ] {
        for rank in 1..=5u8 {
            let size = ranks.iter().filter(|&&r| r == rank).count();
            assert_eq!(size, 8, "rank {rank} holds {size} customers");
        }
    }
}

#[test]
fn test_most_recent_customer_ranks_highest() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    let config = RfmConfig::new(analysis_date()).unwrap();
    let rows = compute_segments(&table.records, &config).unwrap();

    let most_recent = rows.iter().min_by_key(|r| r.recency).unwrap();
    let least_recent = rows.iter().max_by_key(|r| r.recency).unwrap();
    assert_eq!(most_recent.ranks.recency.get(), 5);
    assert_eq!(least_recent.ranks.recency.get(), 1);
}

#[test]
fn test_pipeline_is_idempotent() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    let config = RfmConfig::new(analysis_date()).unwrap();

    let dir = tempdir().unwrap();
    let first_path = dir.path().join("first.csv");
    let second_path = dir.path().join("second.csv");
    report::write_segments_csv(&compute_segments(&table.records, &config).unwrap(), &first_path)
        .unwrap();
    report::write_segments_csv(&compute_segments(&table.records, &config).unwrap(), &second_path)
        .unwrap();

    assert_eq!(
        std::fs::read(&first_path).unwrap(),
        std::fs::read(&second_path).unwrap()
    );
}

#[test]
fn test_analysis_date_before_purchases_is_rejected() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    let early = NaiveDate::from_ymd_opt(2020, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let config = RfmConfig::new(early).unwrap();

    let result = compute_segments(&table.records, &config);
    assert!(matches!(result, Err(RfmError::InvalidInput { .. })));
}

#[test]
fn test_campaign_exports() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    let config = RfmConfig::new(analysis_date()).unwrap();
    let rows = compute_segments(&table.records, &config).unwrap();

    let dir = tempdir().unwrap();
    let campaigns = [
        (Campaign::new_brand(250.0), NEW_BRAND_FILE),
        (Campaign::discount(), DISCOUNT_FILE),
    ];

    for (campaign, file_name) in &campaigns {
        let ids = campaign.select(&rows, &table.records).unwrap();
        let path = dir.path().join(file_name);
        write_customer_ids(&ids, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("master_id"));
        let written: Vec<&str> = lines.collect();
        assert_eq!(written.len(), ids.len());

        let selected: HashSet<&str> = written.into_iter().collect();
        for row in &rows {
            if !selected.contains(row.customer_id.as_str()) {
                continue;
            }
            assert!(campaign.segments.contains(&row.segment));
            let record = table
                .records
                .iter()
                .find(|r| r.customer_id == row.customer_id)
                .unwrap();
            assert!(campaign
                .categories
                .iter()
                .any(|category| record.is_interested_in(category)));
        }
    }
}

#[test]
fn test_segment_summary_covers_population() {
    let test_file = create_test_csv();
    let table = load_customer_table(test_file.path()).unwrap();
    let config = RfmConfig::new(analysis_date()).unwrap();
    let rows = compute_segments(&table.records, &config).unwrap();

    let summary = report::segment_summary(&rows).unwrap();
    let distinct: HashSet<Segment> = rows.iter().map(|r| r.segment).collect();
    assert_eq!(summary.height(), distinct.len());
}
