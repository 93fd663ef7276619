use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{genre_distribution, summarize, top_grossing, Summary};
use crate::data::filter::MovieView;
use crate::data::model::MovieRecord;
use crate::state::{AppState, Page};
use crate::ui::format::{compact_money, money, opt_money};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Page dispatch
// ---------------------------------------------------------------------------

/// Render the body of `page` into the central panel.
pub fn render_page(ui: &mut Ui, page: Page, state: &AppState) {
    match page {
        Page::Home => home(ui, state),
        Page::Explore => explore(ui, state),
        Page::Visualizations => plot::visualizations(ui, state),
        Page::Insights => insights(ui, state),
    }
}

/// The filtered rows, or `None` after drawing a placeholder explaining why
/// there is nothing to show.
pub fn visible_view<'a>(ui: &mut Ui, state: &'a AppState) -> Option<MovieView<'a>> {
    let Some(view) = state.view() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore movies  (File → Open…)");
        });
        return None;
    };
    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No movies match the current filters");
        });
        return None;
    }
    Some(view)
}

pub fn page_title(ui: &mut Ui, title: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(title).size(28.0).strong());
    });
    ui.add_space(8.0);
}

fn metric_card(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(label).size(16.0));
            ui.label(RichText::new(value).size(30.0).strong());
        });
    });
}

fn summary_cards(ui: &mut Ui, summary: &Summary) {
    let years = match (summary.first_year, summary.last_year, summary.year_span()) {
        (Some(first), Some(last), Some(span)) => format!("{span} ({first}–{last})"),
        _ => "n/a".to_string(),
    };
    ui.columns(3, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Movies", summary.movies.to_string());
        metric_card(&mut cols[1], "Years covered", years);
        metric_card(&mut cols[2], "Box office", compact_money(summary.total_gross));
    });
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn home(ui: &mut Ui, state: &AppState) {
    page_title(ui, "Movie Box Office Analysis");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new("Explore box-office history through data.").size(18.0));
        ui.label("Filter the catalogue in the side panel, then browse the table, charts and insights.");
    });
    ui.add_space(16.0);

    match &state.dataset {
        Some(ds) => summary_cards(ui, &summarize(&ds.records)),
        None => {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label("No dataset loaded yet. Use File → Open… to pick a CSV, JSON or Parquet file.");
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Explore
// ---------------------------------------------------------------------------

const TABLE_HEADERS: [&str; 6] = [
    "Title",
    "Genre",
    "Rating",
    "Release date",
    "Total gross",
    "Inflation-adjusted",
];

fn explore(ui: &mut Ui, state: &AppState) {
    page_title(ui, "Explore Data");
    let Some(view) = visible_view(ui, state) else {
        return;
    };
    let records: Vec<&MovieRecord> = view.records().collect();
    ui.label(format!("{} movies", records.len()));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::initial(240.0).at_least(120.0).clip(true))
        .columns(Column::auto().at_least(80.0), 4)
        .column(Column::remainder().at_least(100.0))
        .header(22.0, |mut header| {
            for title in TABLE_HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, records.len(), |mut row| {
                let rec = records[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(rec.display_title());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.genre());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.mpaa_rating());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(
                        rec.release_date()
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "n/a".to_string()),
                    );
                });
                row.col(|ui: &mut Ui| {
                    ui.label(opt_money(rec.total_gross()));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(opt_money(rec.inflation_adjusted_gross()));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

fn insights(ui: &mut Ui, state: &AppState) {
    page_title(ui, "Insights");
    let Some(view) = visible_view(ui, state) else {
        return;
    };

    let summary = summarize(view.records());
    summary_cards(ui, &summary);
    if let Some(mean) = summary.mean_gross {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(format!("Average gross per movie: {}", money(mean)));
        });
    }
    ui.add_space(12.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("Top 10 by total gross");
                egui::Grid::new("top_grossing")
                    .striped(true)
                    .num_columns(3)
                    .show(&mut cols[0], |ui: &mut Ui| {
                        for (rank, rec) in top_grossing(view.records(), 10).into_iter().enumerate() {
                            ui.label(format!("{}.", rank + 1));
                            ui.label(rec.display_title());
                            ui.label(opt_money(rec.total_gross()));
                            ui.end_row();
                        }
                    });

                cols[1].strong("Genre share");
                for share in genre_distribution(view.records()) {
                    let colour = state.genre_colors.color_for(&share.genre);
                    cols[1].label(RichText::new(&share.genre).color(colour));
                    cols[1].add(
                        egui::ProgressBar::new((share.percentage / 100.0) as f32)
                            .fill(colour)
                            .text(format!("{} movies, {:.1}%", share.count, share.percentage)),
                    );
                }
            });
        });
}
