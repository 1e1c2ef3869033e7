use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One output row. Field order is the column order the viewer relies on:
/// stock, date, five attributes, classification.
#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Stock")]
    stock: String,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Predicted Close")]
    predicted_close: f64,
    #[serde(rename = "Predicted Low")]
    predicted_low: f64,
    #[serde(rename = "Predicted High")]
    predicted_high: f64,
    #[serde(rename = "Volume")]
    volume: i64,
    #[serde(rename = "Classification")]
    classification: String,
}

/// (ticker, classification, start price, daily volatility)
const STOCKS: &[(&str, &str, f64, f64)] = &[
    ("ACME", "Low Risk", 120.0, 0.006),
    ("GLOBEX", "Low Risk", 85.0, 0.008),
    ("INITECH", "Medium Risk", 42.0, 0.015),
    ("UMBRELLA", "Medium Risk", 230.0, 0.018),
    ("HOOLI", "High Risk", 12.0, 0.035),
    ("STARK", "High Risk", 310.0, 0.03),
];

const TRADING_DAYS: usize = 120;

fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut d = start;
    while days.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(d);
        }
        d += Duration::days(1);
    }
    days
}

fn generate_rows(rng: &mut SimpleRng) -> Result<Vec<SampleRow>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).context("invalid start date")?;
    let days = trading_days(start, TRADING_DAYS);

    let mut rows: Vec<SampleRow> = Vec::with_capacity(STOCKS.len() * days.len());
    for &day in &days {
        for &(ticker, class, base, vol) in STOCKS {
            // Geometric random walk: the same stock's row one day earlier.
            let prev_close = rows
                .len()
                .checked_sub(STOCKS.len())
                .map(|j| rows[j].close)
                .unwrap_or(base);
            let close = prev_close * (1.0 + rng.gauss(0.0005, vol));
            let predicted_close = close * (1.0 + rng.gauss(0.0, vol / 2.0));
            let band = close * vol * 2.0;

            rows.push(SampleRow {
                stock: ticker.to_string(),
                date: day,
                close: round2(close),
                predicted_close: round2(predicted_close),
                predicted_low: round2(predicted_close - band),
                predicted_high: round2(predicted_close + band),
                volume: (1_000_000.0 * (1.0 + rng.next_f64())) as i64,
                classification: class.to_string(),
            });
        }
    }
    Ok(rows)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn write_csv(rows: &[SampleRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &Path) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("Stock", DataType::Utf8, false),
        Field::new("Date", DataType::Date32, false),
        Field::new("Close", DataType::Float64, false),
        Field::new("Predicted Close", DataType::Float64, false),
        Field::new("Predicted Low", DataType::Float64, false),
        Field::new("Predicted High", DataType::Float64, false),
        Field::new("Volume", DataType::Int64, false),
        Field::new("Classification", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.stock.as_str()))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| (r.date - epoch).num_days() as i32),
            )),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.close))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.predicted_close))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.predicted_low))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.predicted_high))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.volume))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.classification.as_str()),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng)?;

    let out_dir = Path::new("sample_data");
    std::fs::create_dir_all(out_dir).context("creating sample_data directory")?;

    let csv_path = out_dir.join("stocks.csv");
    let parquet_path = out_dir.join("stocks.parquet");
    write_csv(&rows, &csv_path)?;
    write_parquet(&rows, &parquet_path)?;

    println!(
        "Wrote {} rows ({} stocks × {TRADING_DAYS} days) to {} and {}",
        rows.len(),
        STOCKS.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
