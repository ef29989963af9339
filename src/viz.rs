//! Cluster scatter plot using Plotters

use std::path::Path;

use plotters::prelude::*;

use crate::pipeline::SegmentationOutcome;

/// Color palette for different clusters
const CLUSTER_COLORS: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
    RGBColor(229, 107, 93),
];

fn cluster_color(cluster: usize) -> RGBColor {
    CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()]
}

/// Padded axis range covering `values`.
fn axis_range(values: &[f64]) -> std::ops::Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad)..(max + pad)
}

/// Scatter plot of two clustering features in original units, one series per
/// cluster, with a legend naming each cluster's persona.
pub fn plot_clusters(
    outcome: &SegmentationOutcome,
    x_feature: &str,
    y_feature: &str,
    output_path: &Path,
) -> crate::Result<()> {
    let matrix = &outcome.matrix;
    let x_idx = matrix
        .feature_index(x_feature)
        .ok_or_else(|| anyhow::anyhow!("Plot feature '{x_feature}' was not clustered"))?;
    let y_idx = matrix
        .feature_index(y_feature)
        .ok_or_else(|| anyhow::anyhow!("Plot feature '{y_feature}' was not clustered"))?;

    let xs = matrix.raw.column(x_idx).to_vec();
    let ys = matrix.raw.column(y_idx).to_vec();

    let root = BitMapBackend::new(output_path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("Customer Segments based on {x_feature} vs. {y_feature}");
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(axis_range(&xs), axis_range(&ys))?;

    chart
        .configure_mesh()
        .x_desc(x_feature)
        .y_desc(y_feature)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let labels = &outcome.model.labels;
    for cluster in 0..outcome.model.n_clusters {
        let color = cluster_color(cluster);
        let points = xs
            .iter()
            .zip(&ys)
            .zip(labels.iter())
            .filter(|(_, label)| **label == cluster)
            .map(|((&x, &y), _)| Circle::new((x, y), 5, color.mix(0.7).filled()));

        chart
            .draw_series(points)?
            .label(format!("{}: {}", cluster, outcome.label_of(cluster)))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    log::info!("Cluster plot saved to {}", output_path.display());

    Ok(())
}
