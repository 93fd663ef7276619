use std::collections::BTreeSet;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::filter::FilterSpec;
use crate::data::model::{MovieDataset, MovieRecord};
use crate::state::{AppState, Page};
use crate::ui::format::money;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page buttons, then the filter widgets.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Box Office");
    ui.add_space(4.0);

    for page in Page::ALL {
        let button = egui::SelectableLabel::new(state.page == page, page.label());
        if ui.add_sized([ui.available_width(), 28.0], button).clicked() {
            state.page = page;
        }
    }

    ui.separator();
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(current)) = (&state.dataset, state.filter()) else {
        ui.label("No dataset loaded.");
        return;
    };

    // Widgets edit a copy; the copy replaces the live filter afterwards.
    let mut next = current.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filter_widgets(ui, dataset, &state.genre_colors, &mut next);
        });

    state.apply_filter(next);
}

fn filter_widgets(ui: &mut Ui, dataset: &MovieDataset, genre_colors: &ColorMap, spec: &mut FilterSpec) {
    ui.strong("Search title");
    let mut text = spec.search.clone().unwrap_or_default();
    if ui
        .add(egui::TextEdit::singleline(&mut text).hint_text("e.g. frozen"))
        .changed()
    {
        spec.search = Some(text).filter(|t| !t.is_empty());
    }
    ui.separator();

    multi_select(ui, "Genre", &dataset.genres, &mut spec.genres, Some(genre_colors));
    multi_select(ui, "MPAA rating", &dataset.ratings, &mut spec.ratings, None);
    ui.separator();

    ui.strong("Release year");
    match dataset.year_bounds {
        Some((min, max)) => {
            let (lo, hi) = &mut spec.year_range;
            range_sliders(ui, lo, hi, min..=max, false);
        }
        None => {
            ui.label("No release dates available.");
        }
    }
    ui.separator();

    ui.strong("Total gross");
    match dataset.gross_bounds {
        Some((min, max)) => {
            let (lo, hi) = &mut spec.gross_range;
            range_sliders(ui, lo, hi, min..=max, true);
            ui.label(format!("{} – {}", money(*lo), money(*hi)));
        }
        None => {
            ui.label("No gross values available.");
        }
    }
}

/// Checkbox list over `options` with All/None shortcuts. Deselecting
/// everything hides every movie.
fn multi_select(
    ui: &mut Ui,
    title: &str,
    options: &BTreeSet<String>,
    selected: &mut BTreeSet<String>,
    colors: Option<&ColorMap>,
) {
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = options.clone();
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                }
            });

            for option in options {
                let mut text = RichText::new(option);
                if let Some(cm) = colors {
                    text = text.color(cm.color_for(option));
                }

                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, text).changed() {
                    if checked {
                        selected.insert(option.clone());
                    } else {
                        selected.remove(option);
                    }
                }
            }
        });
}

/// A pair of "from"/"to" sliders that keeps `lo <= hi`.
fn range_sliders<N: egui::emath::Numeric>(
    ui: &mut Ui,
    lo: &mut N,
    hi: &mut N,
    bounds: std::ops::RangeInclusive<N>,
    logarithmic: bool,
) {
    let from = ui.add(
        egui::Slider::new(lo, bounds.clone())
            .logarithmic(logarithmic)
            .text("from"),
    );
    let to = ui.add(
        egui::Slider::new(hi, bounds)
            .logarithmic(logarithmic)
            .text("to"),
    );

    if from.changed() && lo.to_f64() > hi.to_f64() {
        *hi = *lo;
    }
    if to.changed() && hi.to_f64() < lo.to_f64() {
        *lo = *hi;
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_rows = state.visible_count() > 0;
            if ui
                .add_enabled(has_rows, egui::Button::new("Export filtered JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(total) = state.dataset.as_ref().map(|ds| ds.len()) {
            ui.label(format!(
                "{total} movies loaded, {} visible",
                state.visible_count()
            ));
            if let Some(path) = &state.source_path {
                ui.label(RichText::new(path.display().to_string()).weak());
            }

            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filter();
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export filtered movies")
        .add_filter("JSON", &["json"])
        .set_file_name("filtered_movies.json")
        .save_file()
    else {
        return;
    };

    let result = match state.view() {
        Some(view) => {
            let records: Vec<&MovieRecord> = view.records().collect();
            write_json(&path, &records).map(|()| records.len())
        }
        None => return,
    };

    match result {
        Ok(n) => {
            log::info!("Exported {n} movies to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Write records as a JSON array that the loader can read back.
pub fn write_json(path: &Path, records: &[&MovieRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records).context("writing JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::loader::load_file;

    #[test]
    fn exported_json_loads_back_unchanged() {
        let records = vec![
            MovieRecord::new(
                Some("Frozen".into()),
                Some("Animation".into()),
                Some("PG".into()),
                NaiveDate::from_ymd_opt(2013, 11, 27),
                Some(1280.0),
                Some(1300.5),
            ),
            MovieRecord::new(Some("Lost".into()), None, None, None, None, None),
        ];
        let refs: Vec<&MovieRecord> = records.iter().collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &refs).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.records, records);
    }

    #[test]
    fn export_to_missing_directory_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.json");
        let err = write_json(&path, &[]).unwrap_err();
        assert!(format!("{err:#}").contains("creating"));
    }
}
