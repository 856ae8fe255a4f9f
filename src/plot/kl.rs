//! KL-divergence bar panels.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AnalysisError;
use crate::plot::settings::PlotContext;
use crate::plot::{plot_err, settings};

/// Render three stacked bar panels showing the KL divergence of firing rate,
/// correlation and irregularity distributions, grouped per population with
/// one bar per run permutation, and a shared legend beneath.
pub fn kl_figure(
    populations: &[String],
    permutations: &[String],
    rate: &[Vec<f64>],
    correlation: &[Vec<f64>],
    irregularity: &[Vec<f64>],
    ctx: &PlotContext,
    out_path: &Path,
) -> Result<(), AnalysisError> {
    for (name, metric) in [
        ("rate", rate),
        ("correlation", correlation),
        ("irregularity", irregularity),
    ] {
        if metric.len() != permutations.len()
            || metric.iter().any(|row| row.len() != populations.len())
        {
            return Err(AnalysisError::ShapeMismatch(format!(
                "{} divergences do not form a {} x {} table",
                name,
                permutations.len(),
                populations.len()
            )));
        }
    }

    let (width, height) = (settings::cm(17.0), settings::cm(10.0));
    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let legend_height = 50;
    let (panel_area, legend_area) = root.split_vertically((height - legend_height) as i32);
    let panels = panel_area.split_evenly((3, 1));

    for (panel, (title, metric)) in panels.iter().zip([
        ("A", rate),
        ("B", correlation),
        ("C", irregularity),
    ]) {
        draw_panel(panel, title, metric, populations, permutations.len(), ctx)?;
    }

    draw_legend(&legend_area, permutations, ctx)?;
    root.present().map_err(plot_err)
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    title: &str,
    metric: &[Vec<f64>],
    populations: &[String],
    num_permutations: usize,
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let max = metric
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
        .max(1e-12);

    let num_pops = populations.len();
    let labels: Vec<String> = populations.to_vec();

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", ctx.title_size))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.6..(num_pops as f64 - 0.4), 0.0..max * 1.1)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(num_pops)
        .x_label_formatter(&move |x| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .y_desc("D_KL")
        .label_style(("sans-serif", ctx.label_size))
        .draw()
        .map_err(plot_err)?;

    // One bar per permutation inside each population group
    let bar_width = 0.8 / num_permutations as f64;
    for (i, row) in metric.iter().enumerate() {
        let color = settings::palette(i);
        chart
            .draw_series(row.iter().enumerate().filter(|(_, v)| v.is_finite()).map(
                |(j, &value)| {
                    let x0 = j as f64 - 0.4 + i as f64 * bar_width;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, value)], color.filled())
                },
            ))
            .map_err(plot_err)?;
    }

    Ok(())
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    permutations: &[String],
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let (width, _) = area.dim_in_pixel();
    let columns: usize = 3;
    let column_width = width as i32 / columns as i32;

    for (i, label) in permutations.iter().enumerate() {
        let col = (i % columns) as i32;
        let row = (i / columns) as i32;
        let x = col * column_width + 10;
        let y = row * 22 + 5;
        area.draw(&Rectangle::new(
            [(x, y), (x + 14, y + 14)],
            settings::palette(i).filled(),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(
            label.clone(),
            (x + 20, y + 2),
            ("sans-serif", ctx.label_size),
        ))
        .map_err(plot_err)?;
    }

    Ok(())
}
