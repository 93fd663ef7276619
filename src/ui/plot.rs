use std::collections::BTreeMap;
use std::f64::consts::TAU;

use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::{
    genre_distribution, gross_by_rating, gross_by_year, gross_points, inflation_adjusted_by_year,
    GenreShare,
};
use crate::state::AppState;
use crate::ui::format::compact_money;
use crate::ui::pages::{page_title, visible_view};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Visualizations page (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the currently visible movies.
pub fn visualizations(ui: &mut Ui, state: &AppState) {
    page_title(ui, "Visualizations");

    let Some(view) = visible_view(ui, state) else {
        return;
    };

    let by_year = gross_by_year(view.records());
    let adjusted_by_year = inflation_adjusted_by_year(view.records());
    let shares = genre_distribution(view.records());
    let points = gross_points(view.records());
    let by_rating = gross_by_rating(view.records());

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Total gross by release year");
            area_chart(ui, &by_year);
            ui.add_space(12.0);

            ui.strong("Movies per genre");
            pie_chart(ui, &shares, &state.genre_colors);
            ui.add_space(12.0);

            ui.strong("Total vs inflation-adjusted gross by year");
            line_chart(ui, &by_year, &adjusted_by_year);
            ui.add_space(12.0);

            ui.strong("Total vs inflation-adjusted gross per movie");
            scatter_chart(ui, &points);
            ui.add_space(12.0);

            ui.strong("Total gross by MPAA rating");
            bar_chart(ui, &by_rating);
        });
}

fn year_series(sums: &BTreeMap<i32, f64>) -> PlotPoints {
    sums.iter().map(|(&year, &sum)| [year as f64, sum]).collect()
}

/// Plot with the shared height, legend and money-formatted y axis.
macro_rules! money_plot {
    ($id:expr) => {
        Plot::new($id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .y_axis_formatter(|mark, _range| compact_money(mark.value))
            .allow_scroll(false)
    };
}

// ---------------------------------------------------------------------------
// Area: gross by year
// ---------------------------------------------------------------------------

fn area_chart(ui: &mut Ui, by_year: &BTreeMap<i32, f64>) {
    money_plot!("gross_area")
        .x_axis_label("Year")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(year_series(by_year))
                    .name("Total gross")
                    .color(Color32::from_rgb(90, 160, 230))
                    .fill(0.0_f32),
            );
        });
}

// ---------------------------------------------------------------------------
// Pie: genre distribution
// ---------------------------------------------------------------------------

/// One convex slice of a pie, in plot coordinates around the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

/// Largest angle covered by one polygon; egui only fills convex shapes.
const MAX_WEDGE_ANGLE: f64 = TAU / 4.0;

/// Split a unit pie into wedges proportional to each share's percentage,
/// starting at twelve o'clock and running clockwise. Slices wider than a
/// quarter turn are split into several wedges with the same label.
pub fn pie_wedges(shares: &[GenreShare]) -> Vec<Wedge> {
    let mut wedges = Vec::new();
    let mut start = 0.0_f64;

    for share in shares {
        let sweep = TAU * share.percentage / 100.0;
        let end = start + sweep;
        let pieces = (sweep / MAX_WEDGE_ANGLE - 1e-9).ceil().max(1.0) as usize;

        for piece in 0..pieces {
            let a0 = start + sweep * piece as f64 / pieces as f64;
            let a1 = start + sweep * (piece + 1) as f64 / pieces as f64;
            let steps = (((a1 - a0) / TAU) * 96.0).ceil().max(2.0) as usize;

            let mut points = Vec::with_capacity(steps + 2);
            points.push([0.0, 0.0]);
            for s in 0..=steps {
                let angle = a0 + (a1 - a0) * s as f64 / steps as f64;
                points.push([angle.sin(), angle.cos()]);
            }
            wedges.push(Wedge {
                label: share.genre.clone(),
                points,
            });
        }
        start = end;
    }
    wedges
}

fn pie_chart(ui: &mut Ui, shares: &[GenreShare], colors: &ColorMap) {
    let wedges = pie_wedges(shares);
    let labels: BTreeMap<&str, f64> = shares
        .iter()
        .map(|s| (s.genre.as_str(), s.percentage))
        .collect();

    Plot::new("genre_pie")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for wedge in wedges {
                let pct = labels.get(wedge.label.as_str()).copied().unwrap_or(0.0);
                let colour = colors.color_for(&wedge.label);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge.points))
                        .name(format!("{} ({pct:.1}%)", wedge.label))
                        .fill_color(colour)
                        .stroke(Stroke::new(1.0, colour)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Line: total vs inflation-adjusted gross by year
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, total: &BTreeMap<i32, f64>, adjusted: &BTreeMap<i32, f64>) {
    let palette = generate_palette(2);
    money_plot!("gross_lines")
        .x_axis_label("Year")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(year_series(total))
                    .name("Total gross")
                    .color(palette[0])
                    .width(1.5),
            );
            plot_ui.line(
                Line::new(year_series(adjusted))
                    .name("Inflation-adjusted gross")
                    .color(palette[1])
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter: one point per movie
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, points: &[[f64; 2]]) {
    if points.is_empty() {
        ui.label("No movies with both gross figures.");
        return;
    }
    money_plot!("gross_scatter")
        .x_axis_label("Total gross")
        .x_axis_formatter(|mark, _range| compact_money(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points.to_vec()))
                    .name("Movies")
                    .radius(3.0_f32)
                    .color(Color32::from_rgb(240, 170, 60)),
            );
        });
}

// ---------------------------------------------------------------------------
// Bar: gross by rating
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, by_rating: &BTreeMap<String, f64>) {
    let labels: Vec<String> = by_rating.keys().cloned().collect();
    let palette = generate_palette(by_rating.len());
    let bars: Vec<Bar> = by_rating
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((rating, &sum), colour))| {
            Bar::new(i as f64, sum)
                .name(rating)
                .fill(colour)
                .width(0.6)
        })
        .collect();

    money_plot!("gross_bars")
        .x_axis_label("MPAA rating")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total gross"));
        });
}
