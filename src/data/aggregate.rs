use std::collections::BTreeMap;

use super::model::MovieRecord;

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// Sum of total gross per release year.
///
/// Rows without a year are skipped. Null gross values add nothing, so a
/// year whose grosses are all null still appears with a sum of zero.
pub fn gross_by_year<'a>(records: impl IntoIterator<Item = &'a MovieRecord>) -> BTreeMap<i32, f64> {
    sum_by(records, |r| r.year(), |r| r.total_gross())
}

/// Sum of inflation-adjusted gross per release year.
pub fn inflation_adjusted_by_year<'a>(
    records: impl IntoIterator<Item = &'a MovieRecord>,
) -> BTreeMap<i32, f64> {
    sum_by(records, |r| r.year(), |r| r.inflation_adjusted_gross())
}

/// Sum of total gross per MPAA rating.
pub fn gross_by_rating<'a>(
    records: impl IntoIterator<Item = &'a MovieRecord>,
) -> BTreeMap<String, f64> {
    sum_by(
        records,
        |r| Some(r.mpaa_rating().to_string()),
        |r| r.total_gross(),
    )
}

fn sum_by<'a, K: Ord>(
    records: impl IntoIterator<Item = &'a MovieRecord>,
    key: impl Fn(&MovieRecord) -> Option<K>,
    value: impl Fn(&MovieRecord) -> Option<f64>,
) -> BTreeMap<K, f64> {
    let mut sums = BTreeMap::new();
    for rec in records {
        if let Some(k) = key(rec) {
            *sums.entry(k).or_insert(0.0) += value(rec).unwrap_or(0.0);
        }
    }
    sums
}

// ---------------------------------------------------------------------------
// Genre distribution
// ---------------------------------------------------------------------------

/// Share of the records belonging to one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreShare {
    pub genre: String,
    pub count: usize,
    /// Percentage of all records, 0–100.
    pub percentage: f64,
}

/// Count and percentage of records per genre, largest first (ties by name).
///
/// Every record is counted, including those with null gross and those
/// that received the default genre.
pub fn genre_distribution<'a>(
    records: impl IntoIterator<Item = &'a MovieRecord>,
) -> Vec<GenreShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total = 0usize;
    for rec in records {
        *counts.entry(rec.genre()).or_insert(0) += 1;
        total += 1;
    }

    let mut shares: Vec<GenreShare> = counts
        .into_iter()
        .map(|(genre, count)| GenreShare {
            genre: genre.to_string(),
            count,
            percentage: count as f64 * 100.0 / total as f64,
        })
        .collect();
    // BTreeMap order is by name already; a stable sort keeps it for ties.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

// ---------------------------------------------------------------------------
// Per-movie series
// ---------------------------------------------------------------------------

/// `[total_gross, inflation_adjusted_gross]` for rows where both are known.
pub fn gross_points<'a>(records: impl IntoIterator<Item = &'a MovieRecord>) -> Vec<[f64; 2]> {
    records
        .into_iter()
        .filter_map(|r| Some([r.total_gross()?, r.inflation_adjusted_gross()?]))
        .collect()
}

/// The `n` highest-grossing records, largest first. Null gross is skipped.
pub fn top_grossing<'a>(
    records: impl IntoIterator<Item = &'a MovieRecord>,
    n: usize,
) -> Vec<&'a MovieRecord> {
    let mut ranked: Vec<(&MovieRecord, f64)> = records
        .into_iter()
        .filter_map(|r| r.total_gross().map(|g| (r, g)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(r, _)| r).collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline numbers for the home and insights pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub movies: usize,
    pub total_gross: f64,
    /// Mean over the records that have a gross value.
    pub mean_gross: Option<f64>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

impl Summary {
    /// Number of years spanned, counting both ends.
    pub fn year_span(&self) -> Option<i32> {
        Some(self.last_year? - self.first_year? + 1)
    }
}

pub fn summarize<'a>(records: impl IntoIterator<Item = &'a MovieRecord>) -> Summary {
    let mut summary = Summary::default();
    let mut grossing = 0usize;

    for rec in records {
        summary.movies += 1;
        if let Some(g) = rec.total_gross() {
            summary.total_gross += g;
            grossing += 1;
        }
        if let Some(y) = rec.year() {
            summary.first_year = Some(summary.first_year.map_or(y, |f| f.min(y)));
            summary.last_year = Some(summary.last_year.map_or(y, |l| l.max(y)));
        }
    }

    if grossing > 0 {
        summary.mean_gross = Some(summary.total_gross / grossing as f64);
    }
    summary
}
