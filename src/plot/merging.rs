//! Kernel-merging scaling panels.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AnalysisError;
use crate::io::timing::check_columns;
use crate::plot::settings::PlotContext;
use crate::plot::{plot_err, settings};

/// Column count of a merging table: population count, then five measurements
/// for each of the two toolchain versions.
pub const MERGING_COLUMNS: usize = 11;

/// Render the 2x2 kernel-merging figure over the population count: compile
/// time, simulation time, memory-bandwidth utilisation (fixed 0-100 % axis)
/// and instruction-stall count, one line per toolchain version, with a
/// shared legend beneath.
///
/// Table columns: population count, then simulation time, compile time,
/// bandwidth %, spare and stall count for the first version, and the same
/// five columns for the second.
pub fn merging_figure(
    rows: &[Vec<f64>],
    versions: (&str, &str),
    ctx: &PlotContext,
    out_path: &Path,
) -> Result<(), AnalysisError> {
    check_columns(rows, MERGING_COLUMNS)?;
    if rows.is_empty() {
        return Err(AnalysisError::InvalidParameter(
            "the merging table holds no rows".to_string(),
        ));
    }

    let (width, height) = (settings::cm(9.0), settings::cm(7.5));
    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let legend_height = 30;
    let (panel_area, legend_area) = root.split_vertically((height - legend_height) as i32);
    let panels = panel_area.split_evenly((2, 2));

    // (title, first-version column, second-version column, y label, fixed y range)
    let specs: [(&str, usize, usize, &str, Option<(f64, f64)>); 4] = [
        ("A", 2, 7, "T_comp [s]", None),
        ("B", 1, 6, "T_sim [s]", None),
        ("C", 3, 8, "K_mem [%]", Some((0.0, 100.0))),
        ("D", 5, 10, "N_stall", None),
    ];

    for (index, (panel, (title, first_col, second_col, y_label, y_range))) in
        panels.iter().zip(specs).enumerate()
    {
        let first = column_series(rows, first_col);
        let second = column_series(rows, second_col);

        let x_max = rows.iter().map(|r| r[0]).fold(0.0, f64::max).max(1.0);
        let (y_lo, y_hi) = y_range.unwrap_or_else(|| {
            let max = first
                .iter()
                .chain(&second)
                .map(|&(_, y)| y)
                .fold(0.0, f64::max);
            (0.0, max.max(1e-12) * 1.1)
        });

        let mut chart = ChartBuilder::on(panel)
            .caption(title, ("sans-serif", ctx.title_size))
            .margin(5)
            .x_label_area_size(if index >= 2 { 35 } else { 20 })
            .y_label_area_size(55)
            .build_cartesian_2d(0.0..x_max * 1.05, y_lo..y_hi)
            .map_err(plot_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .disable_y_mesh()
            .y_desc(y_label)
            .label_style(("sans-serif", ctx.label_size));
        if index >= 2 {
            mesh.x_desc("N_pop");
        }
        mesh.draw().map_err(plot_err)?;

        chart
            .draw_series(LineSeries::new(first, &settings::palette(0)))
            .map_err(plot_err)?;
        chart
            .draw_series(LineSeries::new(second, &settings::palette(1)))
            .map_err(plot_err)?;
    }

    draw_legend(&legend_area, versions, ctx)?;
    root.present().map_err(plot_err)
}

/// Finite (population count, value) pairs of one table column.
fn column_series(rows: &[Vec<f64>], column: usize) -> Vec<(f64, f64)> {
    rows.iter()
        .filter(|row| row[0].is_finite() && row[column].is_finite())
        .map(|row| (row[0], row[column]))
        .collect()
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    versions: (&str, &str),
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let (width, _) = area.dim_in_pixel();
    let column_width = width as i32 / 2;

    for (i, label) in [versions.0, versions.1].into_iter().enumerate() {
        let x = i as i32 * column_width + 10;
        area.draw(&Rectangle::new(
            [(x, 8), (x + 18, 11)],
            settings::palette(i).filled(),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(
            label.to_string(),
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

    #[test]
    fn test_merging_figure_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merging.png");

        let rows: Vec<Vec<f64>> = (1..=8)
            .map(|n| {
                let n = n as f64;
                vec![
                    n,
                    n * 0.5,
                    n * 2.0,
                    40.0 + n,
                    0.0,
                    n * 100.0,
                    n * 0.4,
                    n * 3.0,
                    50.0 + n,
                    0.0,
                    n * 120.0,
                ]
            })
            .collect();

        merging_figure(&rows, ("Latest", "Release"), &PlotContext::paper(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_merging_figure_shape_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merging.png");
        let rows = vec![vec![1.0, 2.0]];
        assert!(merging_figure(&rows, ("a", "b"), &PlotContext::paper(), &path).is_err());
    }
}
