//! Segment charts using Plotters

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::pipeline::SegmentRow;
use crate::segment::Segment;

/// One colour per segment, in `Segment::ALL` order
const SEGMENT_COLORS: [RGBColor; 10] = [
    RGBColor(99, 110, 125),
    RGBColor(214, 39, 40),
    RGBColor(255, 127, 14),
    RGBColor(188, 189, 34),
    RGBColor(148, 103, 189),
    RGBColor(31, 119, 180),
    RGBColor(23, 190, 207),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(44, 160, 44),
];

/// Customer count per segment, in `Segment::ALL` order
pub fn segment_counts(rows: &[SegmentRow]) -> [usize; 10] {
    let mut counts = [0; 10];
    for row in rows {
        counts[row.segment.index()] += 1;
    }
    counts
}

/// Bar chart of customers per segment
pub fn create_segment_size_chart(rows: &[SegmentRow], output_path: &Path) -> crate::Result<()> {
    let counts = segment_counts(rows);
    let max_size = counts.iter().copied().max().unwrap_or(1).max(1) as f64;

    let root = BitMapBackend::new(output_path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customers per Segment", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(counts.len() as f64 - 0.5), 0f64..(max_size * 1.1))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len())
        .x_label_formatter(&|x| {
            let index = x.round();
            if index >= 0.0 && (index as usize) < Segment::ALL.len() {
                Segment::ALL[index as usize].to_string()
            } else {
                String::new()
            }
        })
        .y_desc("Number of Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (index, &size) in counts.iter().enumerate() {
        let x = index as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, size as f64)],
            SEGMENT_COLORS[index].filled(),
        )))?;
    }

    root.present()?;
    info!(path = %output_path.display(), "segment size chart saved");

    Ok(())
}

/// Scatter of frequency against monetary, coloured by segment
pub fn create_segment_scatter(rows: &[SegmentRow], output_path: &Path) -> crate::Result<()> {
    let freq_max = rows.iter().map(|r| f64::from(r.frequency)).fold(1.0, f64::max);
    let mon_max = rows.iter().map(|r| r.monetary).fold(1.0, f64::max);

    let root = BitMapBackend::new(output_path, (900, 650)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Frequency vs Monetary by Segment", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..(freq_max * 1.05), 0f64..(mon_max * 1.05))?;

    chart
        .configure_mesh()
        .x_desc("Frequency (orders)")
        .y_desc("Monetary (total spend)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for segment in Segment::ALL {
        let color = SEGMENT_COLORS[segment.index()];
        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter(|r| r.segment == segment)
            .map(|r| (f64::from(r.frequency), r.monetary))
            .collect();
        if points.is_empty() {
            continue;
        }

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|point| Circle::new(point, 3, color.filled())),
            )?
            .label(segment.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!(path = %output_path.display(), "segment scatter saved");

    Ok(())
}

/// Render both segment charts into `output_dir`
pub fn generate_segment_charts(rows: &[SegmentRow], output_dir: &Path) -> crate::Result<()> {
    create_segment_size_chart(rows, &output_dir.join("segments.png"))?;
    create_segment_scatter(rows, &output_dir.join("segments_scatter.png"))?;
    Ok(())
}
