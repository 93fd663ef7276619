use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, FilterSpec, MovieView};
use crate::data::loader::load_file;
use crate::data::model::MovieDataset;

// ---------------------------------------------------------------------------
// Page selector
// ---------------------------------------------------------------------------

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Explore,
    Visualizations,
    Insights,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Explore, Page::Visualizations, Page::Insights];

    /// Label used on the navigation buttons.
    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Explore => "Explore Data",
            Page::Visualizations => "Visualizations",
            Page::Insights => "Insights",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<MovieDataset>,

    /// Where the dataset came from.
    pub source_path: Option<PathBuf>,

    /// The filter currently applied. Replaced wholesale, never edited.
    filter: Option<FilterSpec>,

    /// Indices of records passing the current filter (cached).
    visible_indices: Vec<usize>,

    /// Current page.
    pub page: Page,

    /// Genre colours, shared by the pie chart and the side panel.
    pub genre_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` and make it the current dataset. On failure the previous
    /// dataset stays in place and the error becomes the status message.
    pub fn load(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "{} genres, {} ratings, years {:?}",
                    dataset.genres.len(),
                    dataset.ratings.len(),
                    dataset.year_bounds
                );
                self.set_dataset(dataset);
                self.source_path = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the filter to its full bounds.
    /// Rows without a year or a gross fall outside those bounds and stay
    /// hidden, exactly as after `reset_filter`.
    pub fn set_dataset(&mut self, dataset: MovieDataset) {
        let spec = FilterSpec::everything(&dataset);
        self.genre_colors = ColorMap::new(&dataset.genres);
        self.visible_indices = filtered_indices(&dataset, &spec);
        self.filter = Some(spec);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Replace the current filter and recompute the visible rows.
    pub fn apply_filter(&mut self, spec: FilterSpec) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if self.filter.as_ref() == Some(&spec) {
            return;
        }
        self.visible_indices = filtered_indices(ds, &spec);
        log::debug!("Filter applied: {} of {} movies visible", self.visible_indices.len(), ds.len());
        self.filter = Some(spec);
    }

    /// Reset the filter to select the whole dataset.
    pub fn reset_filter(&mut self) {
        if let Some(everything) = self.dataset.as_ref().map(FilterSpec::everything) {
            self.apply_filter(everything);
        }
    }

    /// The rows passing the current filter.
    pub fn view(&self) -> Option<MovieView<'_>> {
        self.dataset
            .as_ref()
            .map(|ds| MovieView::from_indices(ds, &self.visible_indices))
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::MovieRecord;

    fn dataset() -> MovieDataset {
        let movie = |title: &str, genre: &str, year: i32, gross: f64| {
            MovieRecord::new(
                Some(title.into()),
                Some(genre.into()),
                Some("PG".into()),
                NaiveDate::from_ymd_opt(year, 3, 1),
                Some(gross),
                None,
            )
        };
        MovieDataset::from_records(vec![
            movie("Frozen", "Animation", 2013, 1280.0),
            movie("Tron", "Action", 1982, 33.0),
        ])
    }

    #[test]
    fn new_dataset_shows_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert_eq!(state.visible_count(), 2);
        assert_eq!(state.page, Page::Home);
        assert_eq!(state.view().map(|v| v.len()), Some(2));
    }

    #[test]
    fn applying_a_filter_replaces_the_visible_rows() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let spec = state.filter().cloned().unwrap().with_genres(["Action"]);
        state.apply_filter(spec.clone());
        assert_eq!(state.visible_count(), 1);
        assert_eq!(state.filter(), Some(&spec));

        state.reset_filter();
        assert_eq!(state.visible_count(), 2);
    }

    #[test]
    fn filter_without_dataset_is_ignored() {
        let mut state = AppState::default();
        let ds = dataset();
        state.apply_filter(FilterSpec::everything(&ds));
        assert!(state.filter().is_none());
        assert!(state.view().is_none());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let dir = tempfile::tempdir().unwrap();
        state.load(&dir.path().join("missing.csv"));

        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(2));
        let status = state.status_message.as_deref().unwrap_or("");
        assert!(status.starts_with("Error: cannot read"), "{status}");
        assert!(state.source_path.is_none());
    }

    #[test]
    fn load_replaces_dataset_and_clears_status() {
        let mut state = AppState::default();
        state.status_message = Some("Error: earlier".into());

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "movie_title,genre,mpaa_rating,release_date,total_gross,inflation_adjusted_gross\n\
             Frozen,Animation,PG,2013-11-27,1280,1300\n"
        )
        .unwrap();
        state.load(file.path());

        assert_eq!(state.visible_count(), 1);
        assert_eq!(state.source_path.as_deref(), Some(file.path()));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn rows_outside_the_full_bounds_stay_hidden_after_load() {
        let undated = MovieRecord::new(
            Some("Someday".into()),
            Some("Drama".into()),
            None,
            None,
            Some(50.0),
            None,
        );
        let ungrossed = MovieRecord::new(
            Some("Unreleased".into()),
            Some("Drama".into()),
            None,
            NaiveDate::from_ymd_opt(2000, 1, 1),
            None,
            None,
        );
        let mut records = dataset().records;
        records.extend([undated, ungrossed]);

        let mut state = AppState::default();
        state.set_dataset(MovieDataset::from_records(records));

        let ds = state.dataset.as_ref().unwrap();
        let spec = state.filter().unwrap();
        assert_eq!(state.view().unwrap().indices(), filtered_indices(ds, spec).as_slice());
        assert_eq!(state.visible_count(), 2);

        let after_load: Vec<usize> = state.view().unwrap().indices().to_vec();
        state.reset_filter();
        assert_eq!(state.view().unwrap().indices(), after_load.as_slice());
    }
}
