use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const GENRES: [&str; 8] = [
    "Adventure",
    "Comedy",
    "Drama",
    "Action",
    "Musical",
    "Romantic Comedy",
    "Thriller/Suspense",
    "Western",
];

const RATINGS: [&str; 5] = ["G", "PG", "PG-13", "R", "Not Rated"];

const WORDS: [&str; 16] = [
    "Lost", "Kingdom", "Secret", "Island", "Return", "Star", "Winter", "Dragon", "Heart",
    "Castle", "Ocean", "Night", "Golden", "Forest", "Legend", "Voyage",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// One generated row, already in its on-disk text form.
struct Row {
    title: String,
    genre: Option<String>,
    rating: Option<String>,
    release_date: String,
    total_gross: String,
    inflation_adjusted_gross: String,
}

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let title = format!("{} {} {}", rng.pick(&WORDS), rng.pick(&WORDS), i + 1);
            let year = 1937 + rng.below(80) as i32;
            let month = rng.below(12);
            let day = 1 + rng.below(28);

            // Log-uniform gross between $100K and $1B, inflated by age.
            let gross = 10f64.powf(5.0 + rng.next_f64() * 4.0).round();
            let adjusted = (gross * 1.035f64.powi(2016 - year)).round();

            let mut row = Row {
                title,
                genre: Some(rng.pick(&GENRES).to_string()),
                rating: Some(rng.pick(&RATINGS).to_string()),
                release_date: format!("{year}-{:02}-{day:02}", month + 1),
                total_gross: format!("{gross}"),
                inflation_adjusted_gross: format!("${}", group_thousands(adjusted as u64)),
            };

            // Sprinkle the defects the loader has to tolerate.
            match i % 23 {
                3 => row.release_date = "TBA".to_string(),
                7 => row.total_gross = "unknown".to_string(),
                11 => row.genre = None,
                13 => row.rating = None,
                17 => row.release_date = format!("{} {day}, {year}", MONTHS[month]),
                _ => {}
            }
            row
        })
        .collect()
}

fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "movie_title",
        "genre",
        "mpaa_rating",
        "release_date",
        "total_gross",
        "inflation_adjusted_gross",
    ])?;
    for row in rows {
        writer.write_record([
            row.title.as_str(),
            row.genre.as_deref().unwrap_or(""),
            row.rating.as_deref().unwrap_or(""),
            row.release_date.as_str(),
            row.total_gross.as_str(),
            row.inflation_adjusted_gross.as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn text_column<'a>(rows: &'a [Row], cell: impl Fn(&'a Row) -> Option<&'a str>) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(cell).collect::<Vec<_>>()))
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    // Numbers go in as real floats here; unparsable ones become nulls.
    let gross = Float64Array::from(
        rows.iter()
            .map(|r| r.total_gross.parse::<f64>().ok())
            .collect::<Vec<_>>(),
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new("movie_title", DataType::Utf8, false),
        Field::new("genre", DataType::Utf8, true),
        Field::new("mpaa_rating", DataType::Utf8, true),
        Field::new("release_date", DataType::Utf8, false),
        Field::new("total_gross", DataType::Float64, true),
        Field::new("inflation_adjusted_gross", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text_column(rows, |r| Some(r.title.as_str())),
            text_column(rows, |r| r.genre.as_deref()),
            text_column(rows, |r| r.rating.as_deref()),
            text_column(rows, |r| Some(r.release_date.as_str())),
            Arc::new(gross),
            text_column(rows, |r| Some(r.inflation_adjusted_gross.as_str())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 240);

    write_csv(&rows, "sample_movies.csv")?;
    write_parquet(&rows, "sample_movies.parquet")?;

    println!(
        "Wrote {} movies to sample_movies.csv and sample_movies.parquet",
        rows.len()
    );
    Ok(())
}
