use std::path::Path;

use crate::config::{DashboardConfig, TOP_N_RANGE};
use crate::data::aggregate::{
    self, CountryVariance, TypeSummary, rank_types_by_global_average, top_n,
    top_variance_countries, type_summary,
};
use crate::data::loader;
use crate::data::model::{CountryRecord, DataError, Dataset, TypeKey};

// ---------------------------------------------------------------------------
// Views shown in the central panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    TopCountries,
    GlobalRanking,
    Heatmap,
    CountryProfile,
    Table,
}

impl View {
    pub const ALL: [View; 5] = [
        View::TopCountries,
        View::GlobalRanking,
        View::Heatmap,
        View::CountryProfile,
        View::Table,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::TopCountries => "Top countries",
            View::GlobalRanking => "Global ranking",
            View::Heatmap => "Heatmap",
            View::CountryProfile => "Country profile",
            View::Table => "Data",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views, recomputed only when an input changes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DerivedViews {
    /// Top-N countries for the selected type, in percent.
    pub top_countries: Vec<(String, f64)>,
    pub summary: Option<TypeSummary>,
    /// All 16 types by global average.
    pub ranking: Vec<(TypeKey, f64)>,
    /// Countries with the most uneven type distribution.
    pub high_variance: Vec<CountryVariance>,
    pub profile: Option<Vec<(TypeKey, f64)>>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    pub selected_type: TypeKey,

    /// Length of the top-countries chart, within [`TOP_N_RANGE`].
    pub top_n: usize,

    /// Row of the country shown in the profile view. Country names may
    /// repeat, so the selection is a row rather than a name.
    pub selected_row: Option<usize>,

    pub view: View,

    pub derived: DerivedViews,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            selected_type: config.initial_type(),
            top_n: config.initial_top_n(),
            config,
            dataset: None,
            selected_row: None,
            view: View::TopCountries,
            derived: DerivedViews::default(),
            status_message: None,
        }
    }

    /// Load the configured data file. A missing file is not an error: the
    /// UI asks the user to pick one instead.
    pub fn load_default(&mut self) {
        let path = self.config.data_path.clone();
        if path.exists() {
            self.load_path(&path);
        } else {
            log::info!("Default data file {} not found", path.display());
            self.status_message = Some(format!(
                "{} not found. Open or drop a CSV file.",
                path.display()
            ));
        }
    }

    /// Load a file and make it the active dataset. On failure the previous
    /// dataset stays and the error is shown in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => self.report_load_error(e),
        }
    }

    /// Same as [`AppState::load_path`] for a file delivered as bytes.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        match loader::load_bytes(name, bytes) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => self.report_load_error(e),
        }
    }

    fn report_load_error(&mut self, e: anyhow::Error) {
        log::error!("Failed to load file: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }

    /// Ingest a newly loaded dataset and recompute every view.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            "Loaded {} countries from {}",
            dataset.len(),
            dataset.source
        );
        // Keep the profile on the same country if the new table has it.
        let previous = self.selected_record().map(|r| r.country.clone());
        self.selected_row = previous
            .and_then(|c| dataset.position(&c))
            .or_else(|| (!dataset.is_empty()).then_some(0));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    pub fn set_type(&mut self, key: TypeKey) {
        if self.selected_type != key {
            self.selected_type = key;
            self.refresh_selected_type();
        }
    }

    pub fn set_top_n(&mut self, n: usize) {
        let n = n.clamp(*TOP_N_RANGE.start(), *TOP_N_RANGE.end());
        if self.top_n != n {
            self.top_n = n;
            self.refresh_selected_type();
        }
    }

    /// Select the country in `row`; rows outside the dataset are ignored.
    pub fn set_country_row(&mut self, row: usize) {
        let in_range = self.dataset.as_ref().is_some_and(|ds| row < ds.len());
        if in_range && self.selected_row != Some(row) {
            self.selected_row = Some(row);
            self.refresh_profile();
        }
    }

    pub fn selected_record(&self) -> Option<&CountryRecord> {
        let row = self.selected_row?;
        self.dataset.as_ref()?.records.get(row)
    }

    /// Recompute all derived views from the current dataset.
    pub fn refresh(&mut self) {
        self.derived = DerivedViews::default();
        let Some(ds) = &self.dataset else {
            return;
        };
        if ds.is_empty() {
            self.status_message = Some(format!("{}: {}", ds.source, DataError::EmptyDataset));
            return;
        }
        log::debug!("Recomputing all views");

        let ranking = rank_types_by_global_average(ds);
        let high_variance = top_variance_countries(ds, self.config.heatmap_rows());
        match (ranking, high_variance) {
            (Ok(ranking), Ok(high_variance)) => {
                self.derived.ranking = ranking;
                self.derived.high_variance = high_variance;
            }
            (Err(e), _) | (_, Err(e)) => self.status_message = Some(format!("Error: {e}")),
        }
        self.refresh_selected_type();
        self.refresh_profile();
    }

    /// Recompute the views that depend on the type selector and slider.
    fn refresh_selected_type(&mut self) {
        let Some(ds) = self.dataset.as_ref().filter(|ds| !ds.is_empty()) else {
            return;
        };
        log::debug!("Recomputing views for {} (top {})", self.selected_type, self.top_n);

        match top_n(ds, self.selected_type, self.top_n) {
            Ok(rows) => self.derived.top_countries = rows,
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
        self.derived.summary = type_summary(ds, self.selected_type).ok();
    }

    fn refresh_profile(&mut self) {
        self.derived.profile = match (&self.dataset, self.selected_row) {
            (Some(ds), Some(row)) => aggregate::country_profile(ds, row),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn record(country: &str, key: TypeKey, v: f64) -> CountryRecord {
        let mut values = [0.0; TypeKey::COUNT];
        values[key.index()] = v;
        CountryRecord::new(country, values)
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                record("A", TypeKey::Infp, 0.30),
                record("B", TypeKey::Infp, 0.10),
                record("C", TypeKey::Estj, 0.50),
            ],
            "sample.csv",
        )
    }

    #[test]
    fn starts_from_config() {
        let state = AppState::new(DashboardConfig {
            default_type: "ISTJ".into(),
            default_top_n: 7,
            ..Default::default()
        });
        assert_eq!(state.selected_type, TypeKey::Istj);
        assert_eq!(state.top_n, 7);
        assert!(state.dataset.is_none());
    }

    #[test]
    fn set_dataset_fills_views() {
        let mut state = AppState::default();
        state.set_dataset(sample());

        assert_eq!(state.derived.top_countries.len(), 3);
        assert_eq!(state.derived.top_countries[0].0, "A");
        assert_eq!(state.derived.ranking.len(), TypeKey::COUNT);
        assert_eq!(state.derived.ranking[0].0, TypeKey::Estj);
        assert_eq!(state.derived.high_variance[0].country, "C");
        assert_eq!(state.selected_row, Some(0));
        assert_eq!(state.selected_record().unwrap().country, "A");
        assert!(state.derived.profile.is_some());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn selection_changes_recompute() {
        let mut state = AppState::default();
        state.set_dataset(sample());

        state.set_type(TypeKey::Estj);
        assert_eq!(state.derived.top_countries[0].0, "C");
        assert_eq!(state.derived.summary.as_ref().unwrap().key, TypeKey::Estj);

        state.set_top_n(100);
        assert_eq!(state.top_n, 20);
        state.set_top_n(0);
        assert_eq!(state.top_n, 5);

        state.set_country_row(2);
        let profile = state.derived.profile.as_ref().unwrap();
        assert_eq!(profile[0].0, TypeKey::Estj);
    }

    #[test]
    fn duplicate_names_select_by_row() {
        let mut state = AppState::default();
        state.set_dataset(Dataset::new(
            vec![
                record("Georgia", TypeKey::Intp, 0.4),
                record("Georgia", TypeKey::Esfp, 0.6),
            ],
            "dupes.csv",
        ));

        state.set_country_row(1);
        assert_eq!(state.selected_row, Some(1));
        assert_eq!(state.derived.profile.as_ref().unwrap()[0].0, TypeKey::Esfp);

        state.set_country_row(0);
        assert_eq!(state.derived.profile.as_ref().unwrap()[0].0, TypeKey::Intp);

        state.set_country_row(9);
        assert_eq!(state.selected_row, Some(0));
    }

    #[test]
    fn reload_keeps_selected_country() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.set_country_row(2);

        state.set_dataset(Dataset::new(
            vec![record("C", TypeKey::Estj, 0.2), record("Z", TypeKey::Infj, 0.1)],
            "other.csv",
        ));
        assert_eq!(state.selected_row, Some(0));

        state.set_dataset(Dataset::new(vec![record("Q", TypeKey::Infj, 0.1)], "q.csv"));
        assert_eq!(state.selected_row, Some(0));
        assert_eq!(state.selected_record().unwrap().country, "Q");
    }

    #[test]
    fn empty_dataset_reports_status() {
        let mut state = AppState::default();
        state.set_dataset(Dataset::new(Vec::new(), "empty.csv"));
        assert!(state.derived.ranking.is_empty());
        assert!(state.derived.top_countries.is_empty());
        assert!(state.status_message.as_deref().unwrap().contains("empty"));
    }

    #[test]
    fn missing_default_file_prompts() {
        let mut state = AppState::new(DashboardConfig {
            data_path: PathBuf::from("/nonexistent/mbti.csv"),
            ..Default::default()
        });
        state.load_default();
        assert!(state.dataset.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.load_bytes("broken.csv", b"Country,INFJ\nX,0.1\n");
        assert_eq!(state.dataset.as_ref().unwrap().source, "sample.csv");
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }
}
