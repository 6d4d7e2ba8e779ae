use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const TYPES: [&str; 16] = [
    "INFJ", "ISFJ", "INTP", "ISFP", "ENTP", "INFP", "ENTJ", "ISTP", "INTJ", "ESFP", "ESTJ",
    "ENFP", "ESTP", "ISTJ", "ENFJ", "ESFJ",
];

/// Rough worldwide shares used as the centre of every country's distribution.
const BASE_SHARES: [f64; 16] = [
    0.03, 0.10, 0.06, 0.07, 0.04, 0.07, 0.03, 0.05, 0.04, 0.06, 0.08, 0.08, 0.05, 0.09, 0.03,
    0.12,
];

const COUNTRIES: [&str; 40] = [
    "Argentina", "Australia", "Austria", "Belgium", "Brazil", "Canada", "Chile", "China",
    "Colombia", "Czechia", "Denmark", "Egypt", "Finland", "France", "Germany", "Greece",
    "India", "Indonesia", "Ireland", "Israel", "Italy", "Japan", "Kenya", "Mexico",
    "Netherlands", "New Zealand", "Nigeria", "Norway", "Peru", "Philippines", "Poland",
    "Portugal", "South Africa", "South Korea", "Spain", "Sweden", "Turkey",
    "United Kingdom", "United States", "Vietnam",
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Perturb the base shares log-normally and renormalise so the row sums to 1.
fn country_shares(rng: &mut SimpleRng, spread: f64) -> [f64; 16] {
    let mut shares = BASE_SHARES.map(|s| s * rng.gauss(0.0, spread).exp());
    let total: f64 = shares.iter().sum();
    for s in &mut shares {
        *s = (*s / total * 10_000.0).round() / 10_000.0;
    }
    shares
}

fn write_csv(path: &str, rows: &[(&str, [f64; 16])]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header = vec!["Country"];
    header.extend(TYPES);
    writer.write_record(&header)?;
    for (country, shares) in rows {
        let mut record = vec![country.to_string()];
        record.extend(shares.iter().map(|v| format!("{v:.4}")));
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[(&str, [f64; 16])]) -> Result<()> {
    let mut fields = vec![Field::new("Country", DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        rows.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
    ))];
    for (i, label) in TYPES.iter().enumerate() {
        fields.push(Field::new(*label, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|(_, s)| s[i]).collect::<Vec<_>>(),
        )));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // A few countries get a much wider spread so the variance heatmap has
    // something to show.
    let rows: Vec<(&str, [f64; 16])> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, &country)| {
            let spread = if i % 7 == 3 { 0.9 } else { 0.3 };
            (country, country_shares(&mut rng, spread))
        })
        .collect();

    write_csv("mbti_countries.csv", &rows)?;
    write_parquet("mbti_countries.parquet", &rows)?;

    println!(
        "Wrote {} countries ({} types each) to mbti_countries.csv and mbti_countries.parquet",
        rows.len(),
        TYPES.len()
    );
    Ok(())
}
