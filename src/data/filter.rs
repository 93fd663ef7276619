use std::borrow::Cow;
use std::collections::BTreeSet;

use super::model::{MovieDataset, MovieRecord};

// ---------------------------------------------------------------------------
// FilterSpec – the complete set of predicates chosen in the side panel
// ---------------------------------------------------------------------------

/// One immutable filter configuration, consumed as a whole by the pipeline.
///
/// A record passes when every dimension accepts it:
/// * its genre is in `genres` and its rating is in `ratings` (an empty set
///   accepts nothing),
/// * its year lies in `year_range` and its total gross in `gross_range`,
///   both inclusive; a null year or null gross never passes,
/// * when `search` holds non-blank text, its title contains that text
///   case-insensitively; a null title never passes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub genres: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
    pub year_range: (i32, i32),
    pub gross_range: (f64, f64),
    pub search: Option<String>,
}

impl FilterSpec {
    /// The spec that selects every genre and rating and the full year and
    /// gross bounds of `dataset`, with no title search.
    pub fn everything(dataset: &MovieDataset) -> Self {
        FilterSpec {
            genres: dataset.genres.clone(),
            ratings: dataset.ratings.clone(),
            year_range: dataset.year_bounds.unwrap_or((0, 0)),
            gross_range: dataset.gross_bounds.unwrap_or((0.0, 0.0)),
            search: None,
        }
    }

    pub fn with_genres<I, S>(self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSpec {
            genres: genres.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_ratings<I, S>(self, ratings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSpec {
            ratings: ratings.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_year_range(self, lo: i32, hi: i32) -> Self {
        FilterSpec {
            year_range: (lo, hi),
            ..self
        }
    }

    pub fn with_gross_range(self, lo: f64, hi: f64) -> Self {
        FilterSpec {
            gross_range: (lo, hi),
            ..self
        }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        FilterSpec {
            search: Some(search.into()),
            ..self
        }
    }

    /// Lower-cased search needle, or `None` when there is nothing to search.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &MovieRecord) -> bool {
        self.matches_with(record, self.needle().as_deref())
    }

    fn matches_with(&self, record: &MovieRecord, needle: Option<&str>) -> bool {
        let (year_lo, year_hi) = self.year_range;
        let (gross_lo, gross_hi) = self.gross_range;

        self.genres.contains(record.genre())
            && self.ratings.contains(record.mpaa_rating())
            && record
                .year()
                .is_some_and(|y| (year_lo..=year_hi).contains(&y))
            && record
                .total_gross()
                .is_some_and(|g| g >= gross_lo && g <= gross_hi)
            && match needle {
                None => true,
                Some(needle) => record
                    .title()
                    .is_some_and(|t| t.to_lowercase().contains(needle)),
            }
    }
}

/// Return indices of records that pass `spec`.
pub fn filtered_indices(dataset: &MovieDataset, spec: &FilterSpec) -> Vec<usize> {
    let needle = spec.needle();
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| spec.matches_with(rec, needle.as_deref()))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// MovieView – a filtered, read-only window onto the dataset
// ---------------------------------------------------------------------------

/// A subset of dataset rows, in dataset order. Never copies records.
#[derive(Debug, Clone)]
pub struct MovieView<'a> {
    dataset: &'a MovieDataset,
    indices: Cow<'a, [usize]>,
}

impl<'a> MovieView<'a> {
    /// Every row of the dataset.
    pub fn all(dataset: &'a MovieDataset) -> Self {
        MovieView {
            dataset,
            indices: Cow::Owned((0..dataset.len()).collect()),
        }
    }

    /// The rows of `dataset` that pass `spec`.
    pub fn filter(dataset: &'a MovieDataset, spec: &FilterSpec) -> Self {
        MovieView {
            dataset,
            indices: Cow::Owned(filtered_indices(dataset, spec)),
        }
    }

    /// Wrap indices computed earlier (e.g. cached in the UI state).
    pub fn from_indices(dataset: &'a MovieDataset, indices: &'a [usize]) -> Self {
        MovieView {
            dataset,
            indices: Cow::Borrowed(indices),
        }
    }

    /// Apply `spec` again on top of this view.
    pub fn refine(&self, spec: &FilterSpec) -> MovieView<'a> {
        let needle = spec.needle();
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| spec.matches_with(&self.dataset.records[i], needle.as_deref()))
            .collect::<Vec<_>>();
        MovieView {
            dataset: self.dataset,
            indices: Cow::Owned(indices),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &'a MovieRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
