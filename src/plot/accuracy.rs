//! Area rasters beside per-population distribution panels.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::data::Quartiles;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::accuracy::PopulationRaster;
use crate::error::AnalysisError;
use crate::plot::settings::PlotContext;
use crate::plot::{plot_err, settings};

/// Fraction of spikes drawn in the area raster panels.
const RASTER_SUBSAMPLE: f64 = 0.03;

/// One distribution panel comparing the two simulators per population.
#[derive(Debug, PartialEq, Clone)]
pub struct MetricPanel {
    /// Axis label of the metric.
    pub label: String,
    /// Fixed value-axis range.
    pub limit: (f64, f64),
    /// Per-population value distributions, sorted by population name.
    pub groups: Vec<PopulationGroup>,
}

/// The values of one population under both simulators.
#[derive(Debug, PartialEq, Clone)]
pub struct PopulationGroup {
    pub population: String,
    pub reference: Vec<f64>,
    pub computed: Vec<f64>,
}

impl MetricPanel {
    /// Group loose (population, value) pairs of both simulators into sorted
    /// per-population distributions.
    pub fn from_pairs(
        label: &str,
        limit: (f64, f64),
        reference: &[(String, f64)],
        computed: &[(String, f64)],
    ) -> Self {
        fn group<'a>(
            groups: &'a mut BTreeMap<String, PopulationGroup>,
            population: &str,
        ) -> &'a mut PopulationGroup {
            groups
                .entry(population.to_string())
                .or_insert_with(|| PopulationGroup {
                    population: population.to_string(),
                    reference: Vec::new(),
                    computed: Vec::new(),
                })
        }

        let mut groups: BTreeMap<String, PopulationGroup> = BTreeMap::new();
        for (pop, value) in reference {
            group(&mut groups, pop).reference.push(*value);
        }
        for (pop, value) in computed {
            group(&mut groups, pop).computed.push(*value);
        }

        MetricPanel {
            label: label.to_string(),
            limit,
            groups: groups.into_values().collect(),
        }
    }
}

/// Render the accuracy figure: one raster panel per area on the left (a 3 %
/// spike subsample, inhibitory populations in firebrick, excitatory in navy,
/// layers labelled by cumulative neuron counts) and one quartile-box panel
/// per metric on the right, comparing the reference simulator against the
/// computed statistics per population.
pub fn accuracy_figure(
    areas: &[(String, Vec<PopulationRaster>)],
    panels: &[MetricPanel],
    raster_window_s: (f64, f64),
    simulators: (&str, &str),
    ctx: &PlotContext,
    out_path: &Path,
) -> Result<(), AnalysisError> {
    if areas.is_empty() || panels.is_empty() {
        return Err(AnalysisError::InvalidParameter(
            "need at least one area and one metric panel".to_string(),
        ));
    }
    if raster_window_s.1 <= raster_window_s.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "empty raster window [{}, {}]",
            raster_window_s.0, raster_window_s.1
        )));
    }

    let (width, height) = (settings::cm(18.0), settings::cm(11.0));
    let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (raster_area, metric_area) = root.split_horizontally((width * 2 / 3) as i32);
    let raster_panels = raster_area.split_evenly((1, areas.len()));

    let mut rng = StdRng::seed_from_u64(42);
    for (i, (panel, (name, populations))) in raster_panels.iter().zip(areas).enumerate() {
        let title = format!("{}: {}", char::from(b'A' + (i % 26) as u8), name);
        draw_area_raster(panel, &title, populations, raster_window_s, ctx, &mut rng)?;
    }

    let legend_height = 26;
    let (panel_area, legend_area) = metric_area.split_vertically((height - legend_height) as i32);
    let metric_panels = panel_area.split_evenly((panels.len(), 1));
    for (i, (area, panel)) in metric_panels.iter().zip(panels).enumerate() {
        let title = char::from(b'A' + ((areas.len() + i) % 26) as u8).to_string();
        draw_metric_panel(area, &title, panel, ctx)?;
    }

    draw_legend(&legend_area, simulators, ctx)?;
    root.present().map_err(plot_err)
}

fn draw_area_raster(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    title: &str,
    populations: &[PopulationRaster],
    window_s: (f64, f64),
    ctx: &PlotContext,
    rng: &mut StdRng,
) -> Result<(), AnalysisError> {
    let total_neurons: u64 = populations.iter().map(|p| p.num_neurons).sum();

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", ctx.title_size))
        .margin(5)
        .x_label_area_size(35)
        .y_label_area_size(40)
        .build_cartesian_2d(window_s.0..window_s.1, 0.0..total_neurons as f64)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_y_axis()
        .x_desc("Time [s]")
        .label_style(("sans-serif", ctx.label_size))
        .draw()
        .map_err(plot_err)?;

    let mut start_id = 0u64;
    let mut layer_counts: Vec<u64> = Vec::new();
    let mut layer_names: Vec<String> = Vec::new();
    for (p, population) in populations.iter().enumerate() {
        // Pairs of populations (inhibitory, excitatory) share a layer
        if p % 2 == 0 {
            layer_counts.push(0);
            let name = &population.population;
            layer_names.push(format!("L{}", &name[..name.len().saturating_sub(1)]));
        }
        if let Some(count) = layer_counts.last_mut() {
            *count += population.num_neurons;
        }

        let record = &population.record;
        let num_drawn = (record.len() as f64 * RASTER_SUBSAMPLE).round() as usize;
        let indices = rand::seq::index::sample(rng, record.len(), num_drawn.min(record.len()));

        let color = if population.population.ends_with('I') {
            settings::INHIBITORY
        } else {
            settings::EXCITATORY
        };
        let offset = start_id;
        chart
            .draw_series(indices.iter().map(|k| {
                let t = record.times()[k] / 1000.0;
                let id = record.ids()[k] + offset;
                Circle::new((t, id as f64), 1, color.filled())
            }))
            .map_err(plot_err)?;

        start_id += population.num_neurons;
    }

    // Label each layer at the middle of its cumulative band
    let mut cumulative = 0u64;
    for (count, name) in layer_counts.iter().zip(&layer_names) {
        let y = cumulative as f64 + *count as f64 / 2.0;
        chart
            .draw_series(std::iter::once(Text::new(
                name.clone(),
                (window_s.0, y),
                ("sans-serif", ctx.label_size),
            )))
            .map_err(plot_err)?;
        cumulative += count;
    }

    Ok(())
}

fn draw_metric_panel(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    title: &str,
    panel: &MetricPanel,
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let num_groups = panel.groups.len();
    if num_groups == 0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "metric panel {} has no population groups",
            panel.label
        )));
    }
    let labels: Vec<String> = panel.groups.iter().map(|g| g.population.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", ctx.title_size))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(55)
        .build_cartesian_2d(
            -0.6..(num_groups as f64 - 0.4),
            panel.limit.0 as f32..panel.limit.1 as f32,
        )
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(num_groups)
        .x_label_formatter(&move |x| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .y_desc(panel.label.clone())
        .label_style(("sans-serif", ctx.label_size))
        .draw()
        .map_err(plot_err)?;

    for (j, group) in panel.groups.iter().enumerate() {
        if !group.reference.is_empty() {
            let quartiles = Quartiles::new(&group.reference);
            chart
                .draw_series(std::iter::once(
                    Boxplot::new_vertical(j as f64, &quartiles)
                        .width(8)
                        .whisker_width(0.5)
                        .style(settings::palette(0))
                        .offset(-6.0),
                ))
                .map_err(plot_err)?;
        }
        if !group.computed.is_empty() {
            let quartiles = Quartiles::new(&group.computed);
            chart
                .draw_series(std::iter::once(
                    Boxplot::new_vertical(j as f64, &quartiles)
                        .width(8)
                        .whisker_width(0.5)
                        .style(settings::palette(1))
                        .offset(6.0),
                ))
                .map_err(plot_err)?;
        }
    }

    Ok(())
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    simulators: (&str, &str),
    ctx: &PlotContext,
) -> Result<(), AnalysisError> {
    let (width, _) = area.dim_in_pixel();
    let column_width = width as i32 / 2;

    for (i, label) in [simulators.0, simulators.1].into_iter().enumerate() {
        let x = i as i32 * column_width + 10;
        area.draw(&Rectangle::new(
            [(x, 6), (x + 14, 18)],
            settings::palette(i).filled(),
        ))
        .map_err(plot_err)?;
        area.draw(&Text::new(
            label.to_string(),
            (x + 20, 6),
            ("sans-serif", ctx.label_size),
        ))
        .map_err(plot_err)?;
    }

    Ok(())
}
