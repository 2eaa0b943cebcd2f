use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::model::{Dataset, Record, YearRange};

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// A categorical choice: everything, or one specific label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// Build from an optional label; `None` means no constraint.
    pub fn from_option(label: Option<String>) -> Self {
        label.map_or(Choice::All, Choice::Only)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Only(label) => f.write_str(label),
        }
    }
}

/// The user-chosen predicate parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub type_choice: Choice,
    pub year_range: YearRange,
    pub model_choice: Choice,
}

impl FilterSelection {
    /// The identity selection: every type, the full observed year range,
    /// every model.
    pub fn full(dataset: &Dataset) -> Self {
        Self {
            type_choice: Choice::All,
            year_range: dataset.year_bounds.unwrap_or(YearRange::UNBOUNDED),
            model_choice: Choice::All,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter evaluation
// ---------------------------------------------------------------------------

/// Result of one filter pass: the effective selection, the model choices
/// legal under it, and the surviving base-row indices in base order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterView {
    /// The selection actually applied. `model_choice` is reset to `All`
    /// when the requested model is absent from the type/year subset.
    pub selection: FilterSelection,
    /// Sorted distinct models after the type and year filters.
    pub model_options: Vec<String>,
    pub indices: Vec<usize>,
}

/// What a filter pass produced.
#[derive(Debug)]
pub enum FilterOutcome<'a> {
    /// No record matched; callers show a "no data" state and skip
    /// aggregation.
    Empty,
    Rows(FilteredDataset<'a>),
}

/// A non-empty, order-preserving subset of a base dataset.
#[derive(Debug, Clone, Copy)]
pub struct FilteredDataset<'a> {
    base: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> FilteredDataset<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let (base, indices) = (self.base, self.indices);
        indices.iter().map(move |&i| &base.records[i])
    }

    /// Record at position `n` of the subset.
    pub fn get(&self, n: usize) -> Option<&'a Record> {
        let base = self.base;
        self.indices.get(n).map(|&i| &base.records[i])
    }
}

impl FilterView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Classify the view against the dataset it was computed from.
    pub fn outcome<'a>(&'a self, base: &'a Dataset) -> FilterOutcome<'a> {
        if self.indices.is_empty() {
            FilterOutcome::Empty
        } else {
            FilterOutcome::Rows(FilteredDataset {
                base,
                indices: &self.indices,
            })
        }
    }
}

/// Apply type, year and model filters to `base`, in that order.
///
/// The legal model choices are derived from the type/year subset on every
/// call; a model choice outside that set is treated as `All`.
pub fn apply(base: &Dataset, selection: &FilterSelection) -> FilterView {
    let type_and_year: Vec<usize> = base
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            selection.type_choice.matches(&r.vehicle_type)
                && selection.year_range.contains(r.model_year)
        })
        .map(|(i, _)| i)
        .collect();

    let model_options: Vec<String> = type_and_year
        .iter()
        .map(|&i| base.records[i].model.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let model_choice = match &selection.model_choice {
        Choice::Only(model) if model_options.binary_search(model).is_err() => {
            log::debug!("Model '{model}' not available for current filters, showing all models");
            Choice::All
        }
        other => other.clone(),
    };

    let indices: Vec<usize> = type_and_year
        .into_iter()
        .filter(|&i| model_choice.matches(&base.records[i].model))
        .collect();

    log::debug!(
        "Filter type={} years={} model={} kept {} of {} listings",
        selection.type_choice,
        selection.year_range,
        model_choice,
        indices.len(),
        base.len()
    );

    FilterView {
        selection: FilterSelection {
            model_choice,
            ..selection.clone()
        },
        model_options,
        indices,
    }
}
