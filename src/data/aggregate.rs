use super::model::{CountryRecord, DataError, Dataset, Dichotomy, TypeKey};

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// One heatmap row: a country and the spread of its type distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryVariance {
    /// Index into [`Dataset::records`].
    pub row: usize,
    pub country: String,
    pub variance: f64,
}

/// Mean and extremes of one type across all countries, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSummary {
    pub key: TypeKey,
    pub mean: f64,
    pub min: (String, f64),
    pub max: (String, f64),
}

/// Summed percent on each side of one letter axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DichotomyShare {
    pub axis: Dichotomy,
    pub first: f64,
    pub second: f64,
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Countries ranked by the share of `key`, highest first, as percentages.
///
/// Equal values keep their file order. Returns every row when `n` exceeds
/// the dataset size.
pub fn top_n(
    dataset: &Dataset,
    key: TypeKey,
    n: usize,
) -> Result<Vec<(String, f64)>, DataError> {
    if n == 0 {
        return Err(DataError::InvalidCount(n));
    }
    let mut rows: Vec<(String, f64)> = dataset
        .records
        .iter()
        .map(|r| (r.country.clone(), r.percent(key)))
        .collect();
    // `sort_by` is stable.
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows.truncate(n);
    Ok(rows)
}

/// [`top_n`] with the type given by its label, e.g. `"INFP"`.
#[allow(dead_code)] // Entry point for callers holding a column label
pub fn top_n_by_name(
    dataset: &Dataset,
    key: &str,
    n: usize,
) -> Result<Vec<(String, f64)>, DataError> {
    let key: TypeKey = key.parse()?;
    top_n(dataset, key, n)
}

/// Mean share of `key` over all countries, in percent.
pub fn global_average(dataset: &Dataset, key: TypeKey) -> Result<f64, DataError> {
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    let sum: f64 = dataset.records.iter().map(|r| r.value(key)).sum();
    Ok(sum / dataset.len() as f64 * 100.0)
}

/// All 16 types ranked by their global average, highest first.
/// Equal averages keep enumeration order.
pub fn rank_types_by_global_average(dataset: &Dataset) -> Result<Vec<(TypeKey, f64)>, DataError> {
    let mut ranking = TypeKey::ALL
        .iter()
        .map(|&key| Ok((key, global_average(dataset, key)?)))
        .collect::<Result<Vec<_>, DataError>>()?;
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranking)
}

/// Sample variance (ddof = 1). `None` with fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(sq / (n - 1.0))
}

/// The `n` countries whose 16 fractions are most spread out, highest
/// variance first. Equal variances keep file order.
pub fn top_variance_countries(
    dataset: &Dataset,
    n: usize,
) -> Result<Vec<CountryVariance>, DataError> {
    if n == 0 {
        return Err(DataError::InvalidCount(n));
    }
    let mut rows: Vec<CountryVariance> = dataset
        .records
        .iter()
        .enumerate()
        .map(|(row, r)| CountryVariance {
            row,
            country: r.country.clone(),
            // 16 values, so always Some.
            variance: sample_variance(&r.values).unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| b.variance.total_cmp(&a.variance));
    rows.truncate(n);
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Per-type and per-country views
// ---------------------------------------------------------------------------

pub fn type_summary(dataset: &Dataset, key: TypeKey) -> Result<TypeSummary, DataError> {
    let mean = global_average(dataset, key)?;
    let mut min: Option<&CountryRecord> = None;
    let mut max: Option<&CountryRecord> = None;
    for rec in &dataset.records {
        // Strict comparisons keep the first country on ties.
        if min.map_or(true, |m| rec.value(key) < m.value(key)) {
            min = Some(rec);
        }
        if max.map_or(true, |m| rec.value(key) > m.value(key)) {
            max = Some(rec);
        }
    }
    let (Some(min), Some(max)) = (min, max) else {
        return Err(DataError::EmptyDataset);
    };
    Ok(TypeSummary {
        key,
        mean,
        min: (min.country.clone(), min.percent(key)),
        max: (max.country.clone(), max.percent(key)),
    })
}

/// The 16 types of the country in `row`, highest share first.
pub fn country_profile(dataset: &Dataset, row: usize) -> Option<Vec<(TypeKey, f64)>> {
    let rec = dataset.records.get(row)?;
    let mut profile: Vec<(TypeKey, f64)> =
        TypeKey::ALL.iter().map(|&k| (k, rec.percent(k))).collect();
    profile.sort_by(|a, b| b.1.total_cmp(&a.1));
    Some(profile)
}

/// Most common type of a country; the earlier type wins a tie.
pub fn dominant_type(record: &CountryRecord) -> TypeKey {
    let mut best = TypeKey::ALL[0];
    for key in TypeKey::ALL {
        if record.value(key) > record.value(best) {
            best = key;
        }
    }
    best
}

pub fn dichotomy_shares(record: &CountryRecord) -> [DichotomyShare; 4] {
    Dichotomy::ALL.map(|axis| {
        let (first, second) = axis.poles();
        let side = |letter: char| -> f64 {
            TypeKey::ALL
                .iter()
                .filter(|k| k.has_letter(letter))
                .map(|&k| record.percent(k))
                .sum()
        };
        DichotomyShare {
            axis,
            first: side(first),
            second: side(second),
        }
    })
}
