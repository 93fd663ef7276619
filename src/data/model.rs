use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Sentinel genre for rows whose genre cell is absent.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Sentinel rating for rows whose MPAA rating cell is absent.
pub const NOT_RATED: &str = "Not Rated";

// ---------------------------------------------------------------------------
// MovieRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single movie after type coercion.
///
/// Fields are private so `year` can only ever be derived from
/// `release_date`; construct through [`MovieRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    #[serde(rename = "movie_title")]
    title: Option<String>,
    genre: String,
    mpaa_rating: String,
    release_date: Option<NaiveDate>,
    year: Option<i32>,
    total_gross: Option<f64>,
    inflation_adjusted_gross: Option<f64>,
}

impl MovieRecord {
    /// Build a record, applying the genre/rating defaults and deriving `year`.
    pub fn new(
        title: Option<String>,
        genre: Option<String>,
        mpaa_rating: Option<String>,
        release_date: Option<NaiveDate>,
        total_gross: Option<f64>,
        inflation_adjusted_gross: Option<f64>,
    ) -> Self {
        Self {
            title,
            genre: genre.unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
            mpaa_rating: mpaa_rating.unwrap_or_else(|| NOT_RATED.to_string()),
            year: release_date.map(|d| d.year()),
            release_date,
            total_gross: total_gross.filter(|v| v.is_finite()),
            inflation_adjusted_gross: inflation_adjusted_gross.filter(|v| v.is_finite()),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn mpaa_rating(&self) -> &str {
        &self.mpaa_rating
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn total_gross(&self) -> Option<f64> {
        self.total_gross
    }

    pub fn inflation_adjusted_gross(&self) -> Option<f64> {
        self.inflation_adjusted_gross
    }

    /// Title for display, with a placeholder for untitled rows.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

// ---------------------------------------------------------------------------
// MovieDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices for the widgets.
#[derive(Debug, Clone, Default)]
pub struct MovieDataset {
    /// All records (rows), in file order.
    pub records: Vec<MovieRecord>,
    /// Sorted distinct genres (defaults included).
    pub genres: BTreeSet<String>,
    /// Sorted distinct MPAA ratings (defaults included).
    pub ratings: BTreeSet<String>,
    /// Min/max of the non-null years.
    pub year_bounds: Option<(i32, i32)>,
    /// Min/max of the non-null total gross values.
    pub gross_bounds: Option<(f64, f64)>,
}

impl MovieDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut genres = BTreeSet::new();
        let mut ratings = BTreeSet::new();
        let mut year_bounds: Option<(i32, i32)> = None;
        let mut gross_bounds: Option<(f64, f64)> = None;

        for rec in &records {
            genres.insert(rec.genre.clone());
            ratings.insert(rec.mpaa_rating.clone());
            if let Some(y) = rec.year {
                year_bounds = Some(match year_bounds {
                    Some((lo, hi)) => (lo.min(y), hi.max(y)),
                    None => (y, y),
                });
            }
            if let Some(g) = rec.total_gross {
                gross_bounds = Some(match gross_bounds {
                    Some((lo, hi)) => (lo.min(g), hi.max(g)),
                    None => (g, g),
                });
            }
        }

        MovieDataset {
            records,
            genres,
            ratings,
            year_bounds,
            gross_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
