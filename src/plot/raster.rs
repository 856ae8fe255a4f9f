//! Spike raster with a population rate trace.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AnalysisError;
use crate::plot::{plot_err, settings};
use crate::plot::settings::PlotContext;
use crate::record::SpikeRecord;

/// Render a two-panel figure: the spike raster of one population on top and
/// the mean firing-rate trace from `bin_ms` histogram bins below, scaled to
/// spikes/s per neuron.
pub fn raster_figure(
    record: &SpikeRecord,
    num_neurons: usize,
    duration_ms: f64,
    bin_ms: f64,
    ctx: &PlotContext,
    out_path: &Path,
) -> Result<(), AnalysisError> {
    if num_neurons == 0 {
        return Err(AnalysisError::InvalidParameter(
            "the number of neurons must be positive".to_string(),
        ));
    }
    if duration_ms <= 0.0 || bin_ms <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "duration {} ms and bin width {} ms must be positive",
            duration_ms, bin_ms
        )));
    }

    let (width, height) = settings::medium_figure();
    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (spike_area, rate_area) = root.split_vertically((height / 2) as i32);

    let mut spike_chart = ChartBuilder::on(&spike_area)
        .caption("Spikes", ("sans-serif", ctx.title_size))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..duration_ms, 0.0..num_neurons as f64)
        .map_err(plot_err)?;
    spike_chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_desc("Neuron number")
        .label_style(("sans-serif", ctx.label_size))
        .draw()
        .map_err(plot_err)?;
    spike_chart
        .draw_series(
            record
                .times()
                .iter()
                .zip(record.ids())
                .map(|(&t, &id)| Circle::new((t, id as f64), 1, settings::palette(0).filled())),
        )
        .map_err(plot_err)?;

    // Rate per bin in spikes/s per neuron
    let num_bins = (duration_ms / bin_ms).ceil() as usize;
    let mut counts = vec![0u64; num_bins];
    for &t in record.times() {
        if t >= 0.0 && t < duration_ms {
            counts[((t / bin_ms) as usize).min(num_bins - 1)] += 1;
        }
    }
    let scale = (1000.0 / bin_ms) / num_neurons as f64;
    let rates: Vec<(f64, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f64 * bin_ms, c as f64 * scale))
        .collect();
    let max_rate = rates.iter().map(|&(_, r)| r).fold(0.0, f64::max).max(1.0);

    let mut rate_chart = ChartBuilder::on(&rate_area)
        .caption("Firing rates", ("sans-serif", ctx.title_size))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..duration_ms, 0.0..max_rate * 1.1)
        .map_err(plot_err)?;
    rate_chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Time [ms]")
        .y_desc("Mean firing rate [Hz]")
        .label_style(("sans-serif", ctx.label_size))
        .draw()
        .map_err(plot_err)?;
    rate_chart
        .draw_series(LineSeries::new(rates, &settings::palette(0)))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}
