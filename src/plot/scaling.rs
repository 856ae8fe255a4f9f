//! Simulation-time scaling across devices.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AnalysisError;
use crate::io::timing::check_columns;
use crate::plot::settings::PlotContext;
use crate::plot::{plot_err, settings};

/// Mean and standard deviation of the repeats of one measurement point.
struct ScalingPoint {
    num_neurons: f64,
    mean: f64,
    std: f64,
}

/// Render one log-log panel per device: simulation time against network size,
/// one mean +/- std errorbar line per connectivity algorithm, with a shared
/// legend beneath. The timing table holds the neuron and synapse counts in
/// its first two columns followed by `num_repeats` raw timings per device and
/// algorithm; rows with any missing repeat are masked out per algorithm.
pub fn scaling_figure(
    rows: &[Vec<f64>],
    devices: &[String],
    algorithms: &[String],
    num_repeats: usize,
    ctx: &PlotContext,
    out_path: &Path,
) -> Result<(), AnalysisError> {
    if devices.is_empty() || algorithms.is_empty() || num_repeats == 0 {
        return Err(AnalysisError::InvalidParameter(
            "need at least one device, one algorithm and one repeat".to_string(),
        ));
    }
    check_columns(rows, 2 + num_repeats * devices.len() * algorithms.len())?;

    let series = collect_series(rows, devices.len(), algorithms.len(), num_repeats);

    // Shared log-log ranges across the device panels
    let (x_range, y_range) = axis_ranges(&series)?;

    let (width, height) = (settings::cm(17.0), settings::cm(6.5));
    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let legend_height = 30;
    let (panel_area, legend_area) = root.split_vertically((height - legend_height) as i32);
    let panels = panel_area.split_evenly((1, devices.len()));

    for (d, panel) in panels.iter().enumerate() {
        let title = char::from(b'A' + (d % 26) as u8).to_string();
        let mut chart = ChartBuilder::on(panel)
            .caption(title, ("sans-serif", ctx.title_size))
            .margin(5)
            .x_label_area_size(35)
            .y_label_area_size(if d == 0 { 50 } else { 35 })
            .build_cartesian_2d(
                (x_range.0..x_range.1).log_scale(),
                (y_range.0..y_range.1).log_scale(),
            )
            .map_err(plot_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Number of neurons")
            .label_style(("sans-serif", ctx.label_size));
        if d == 0 {
            mesh.y_desc("Simulation time [s]");
        }
        mesh.draw().map_err(plot_err)?;

        for (a, _) in algorithms.iter().enumerate() {
            let color = settings::palette(a);
            let points = &series[d][a];

            chart
                .draw_series(points.iter().map(|p| {
                    ErrorBar::new_vertical(
                        p.num_neurons,
                        (p.mean - p.std).max(y_range.0),
                        p.mean,
                        p.mean + p.std,
                        color.filled(),
                        4,
                    )
                }))
                .map_err(plot_err)?;
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (p.num_neurons, p.mean)),
                    &color,
                ))
                .map_err(plot_err)?;
        }
    }

    draw_legend(&legend_area, algorithms, ctx)?;
    root.present().map_err(plot_err)
}

/// Per device and algorithm, the valid measurement points of the table.
fn collect_series(
    rows: &[Vec<f64>],
    num_devices: usize,
    num_algorithms: usize,
    num_repeats: usize,
) -> Vec<Vec<Vec<ScalingPoint>>> {
    (0..num_devices)
        .map(|d| {
            (0..num_algorithms)
                .map(|a| {
                    let start = 2 + (d * num_algorithms + a) * num_repeats;
                    rows.iter()
                        .filter_map(|row| {
                            let repeats = &row[start..start + num_repeats];
                            // A single missing repeat masks the whole row
                            if repeats.iter().any(|v| !v.is_finite()) {
                                return None;
                            }
                            let mean = repeats.iter().sum::<f64>() / num_repeats as f64;
                            let var = repeats
                                .iter()
                                .map(|v| (v - mean) * (v - mean))
                                .sum::<f64>()
                                / num_repeats as f64;
                            Some(ScalingPoint {
                                num_neurons: row[0],
                                mean,
                                std: var.sqrt(),
                            })
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}

fn axis_ranges(
    series: &[Vec<Vec<ScalingPoint>>],
) -> Result<((f64, f64), (f64, f64)), AnalysisError> {
    let points: Vec<&ScalingPoint> = series.iter().flatten().flatten().collect();
    if points.is_empty() {
        return Err(AnalysisError::InvalidParameter(
            "the timing table holds no complete measurement".to_string(),
        ));
    }

    let x_min = points.iter().map(|p| p.num_neurons).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.num_neurons).fold(0.0, f64::max);
    let y_min = points.iter().map(|p| p.mean).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| (p.mean + p.std)).fold(0.0, f64::max);

    Ok((
        (x_min * 0.8, x_max * 1.25),
        ((y_min * 0.5).max(1e-6), y_max * 2.0),
    ))
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    algorithms: &[String],
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let (width, _) = area.dim_in_pixel();
    let column_width = width as i32 / algorithms.len() as i32;

    for (i, label) in algorithms.iter().enumerate() {
        let x = i as i32 * column_width + 10;
        area.draw(&Rectangle::new(
            [(x, 8), (x + 18, 11)],
            settings::palette(i).filled(),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(
            label.clone(),
            (x + 24, 2),
            ("sans-serif", ctx.label_size),
        ))
        .map_err(plot_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Vec<f64>> {
        // 2 devices x 2 algorithms x 2 repeats
        vec![
            vec![1e3, 1e5, 0.1, 0.12, 0.2, 0.22, 0.15, 0.17, 0.3, 0.32],
            vec![1e4, 1e6, 1.0, 1.2, 2.0, 2.2, 1.5, 1.7, 3.0, 3.2],
            vec![1e5, 1e7, 10.0, 12.0, f64::NAN, 22.0, 15.0, 17.0, 30.0, 32.0],
        ]
    }

    #[test]
    fn test_scaling_figure_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling.png");

        let devices = vec!["Device 1".to_string(), "Device 2".to_string()];
        let algorithms = vec!["Sparse".to_string(), "Procedural".to_string()];
        scaling_figure(&table(), &devices, &algorithms, 2, &PlotContext::paper(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_nan_rows_are_masked() {
        let series = collect_series(&table(), 2, 2, 2);
        // Device 0, algorithm 1 has a NaN repeat in the last row
        assert_eq!(series[0][0].len(), 3);
        assert_eq!(series[0][1].len(), 2);
        assert_eq!(series[1][1].len(), 3);
    }

    #[test]
    fn test_scaling_figure_shape_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling.png");

        let devices = vec!["Device 1".to_string()];
        let algorithms = vec!["Sparse".to_string()];
        // Expect 2 + 1*1*2 = 4 columns, rows have 10
        assert!(scaling_figure(
            &table(),
            &devices,
            &algorithms,
            2,
            &PlotContext::paper(),
            &path
        )
        .is_err());
    }
}
