use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ConditionPalette;
use crate::data::cache::DatasetCache;
use crate::data::filter::{apply, Choice, FilterSelection, FilterView};
use crate::data::model::{Dataset, YearRange};

// ---------------------------------------------------------------------------
// Chart toggles
// ---------------------------------------------------------------------------

/// Which charts the user asked to see. All start hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartToggles {
    pub show_year_histogram: bool,
    pub show_scatter: bool,
    pub show_condition_histogram: bool,
    pub show_model_bar: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loads each file at most once per modification.
    pub cache: DatasetCache,

    /// Cleaned base dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Path of the active dataset, or of the last failed attempt.
    pub data_path: Option<PathBuf>,

    /// Requested filter selection.
    pub selection: Option<FilterSelection>,

    /// Result of the last filter pass (recomputed on selection change).
    pub view: Option<FilterView>,

    pub toggles: ChartToggles,

    /// Whether to list the filtered rows under the charts.
    pub show_table: bool,

    /// Colours for the conditions present in the dataset.
    pub palette: Option<ConditionPalette>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` through the cache. On failure the previous dataset stays
    /// active and the error is kept for display.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        self.data_path = Some(path.to_path_buf());
        let result = self
            .cache
            .get_or_load(path)
            .with_context(|| format!("loading {}", path.display()));

        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} listings, {} types, years {:?}",
                    dataset.len(),
                    dataset.types.len(),
                    dataset.year_bounds
                );
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset and reset filters to the identity.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = Some(FilterSelection::full(&dataset));
        self.palette = Some(ConditionPalette::new(&dataset.conditions()));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filter view after a selection change. A model choice
    /// the new subset no longer offers is dropped rather than kept pending.
    pub fn refilter(&mut self) {
        self.view = match (&self.dataset, &self.selection) {
            (Some(ds), Some(selection)) => Some(apply(ds, selection)),
            _ => None,
        };
        if let (Some(view), Some(selection)) = (&self.view, &mut self.selection) {
            selection.model_choice = view.selection.model_choice.clone();
        }
    }

    pub fn set_type_choice(&mut self, choice: Choice) {
        if let Some(selection) = &mut self.selection {
            selection.type_choice = choice;
            self.refilter();
        }
    }

    /// Set the year range, ordered and clamped to the observed bounds.
    pub fn set_year_range(&mut self, range: YearRange) {
        let bounds = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.year_bounds)
            .unwrap_or(YearRange::UNBOUNDED);
        if let Some(selection) = &mut self.selection {
            selection.year_range = range.clamped_to(bounds);
            self.refilter();
        }
    }

    pub fn set_model_choice(&mut self, choice: Choice) {
        if let Some(selection) = &mut self.selection {
            selection.model_choice = choice;
            self.refilter();
        }
    }

    /// Restore the identity selection.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = Some(FilterSelection::full(ds));
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "model_year,odometer,condition,type,model,price\n\
                       2010,1000,good,sedan,kia soul,5000\n\
                       2014,2000,fair,truck,ram 1500,9000\n\
                       2016,3000,excellent,truck,ford f-150,15000\n";

    fn loaded() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut state = AppState::default();
        state.load_path(&path).unwrap();
        (dir, state)
    }

    #[test]
    fn loading_resets_to_identity_view() {
        let (_dir, state) = loaded();
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.indices, [0, 1, 2]);
        assert_eq!(
            state.selection.as_ref().unwrap().year_range,
            YearRange::new(2010, 2016)
        );
    }

    #[test]
    fn changing_type_recomputes_model_options() {
        let (_dir, mut state) = loaded();
        state.set_model_choice(Choice::Only("kia soul".into()));
        assert_eq!(state.view.as_ref().unwrap().indices, [0]);

        state.set_type_choice(Choice::Only("truck".into()));
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.indices, [1, 2]);
        assert_eq!(view.model_options, ["ford f-150", "ram 1500"]);
        assert_eq!(view.selection.model_choice, Choice::All);

        // Going back does not resurrect the dropped choice.
        state.set_type_choice(Choice::Only("sedan".into()));
        assert_eq!(state.selection.as_ref().unwrap().model_choice, Choice::All);
    }

    #[test]
    fn year_range_is_clamped() {
        let (_dir, mut state) = loaded();
        state.set_year_range(YearRange::new(2020, 2013));
        assert_eq!(
            state.selection.as_ref().unwrap().year_range,
            YearRange::new(2013, 2016)
        );
        assert_eq!(state.view.as_ref().unwrap().indices, [1, 2]);

        state.reset_filters();
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let (dir, mut state) = loaded();
        let err = state.load_path(&dir.path().join("missing.csv"));
        assert!(err.is_err());
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
    }
}
