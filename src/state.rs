use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use crate::data::background::BackgroundLoader;
use crate::data::filter::{FilterCriteria, InvalidCriteriaError, filtered_indices};
use crate::data::loader::DataSource;
use crate::data::model::{CpId, JobDataset, Language};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Fixed-size pages over the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    /// Zero-based current page.
    pub page: usize,
    pub page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages for `total` rows; an empty table still has one page.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Positions (into the visible rows) shown on the current page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Keep the current page inside `[0, page_count)`.
    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }

    pub fn next(&mut self, total: usize) {
        self.page += 1;
        self.clamp(total);
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn last(&mut self, total: usize) {
        self.page = self.page_count(total) - 1;
    }
}

// ---------------------------------------------------------------------------
// Control options derived from the dataset
// ---------------------------------------------------------------------------

/// Choices offered by the filter widgets; computed once per dataset.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub cp_ids: Vec<CpId>,
    pub categories: Vec<String>,
    pub regional_job_bounds: Option<(i64, i64)>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &JobDataset) -> Self {
        Self {
            cp_ids: dataset.distinct_cp_ids().into_iter().collect(),
            categories: dataset.distinct_categories().into_iter().collect(),
            regional_job_bounds: dataset.regional_job_bounds(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until the first load completes).
    pub dataset: Option<Arc<JobDataset>>,

    /// Options for the multi-selects and the regional job range.
    pub options: FilterOptions,

    /// Criteria as currently edited in the side panel.
    pub criteria: FilterCriteria,

    /// Criteria the cached result was computed from.
    evaluated: Option<FilterCriteria>,

    /// Indices of postings passing the last valid criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Set while the edited criteria are rejected; the table keeps showing
    /// the last good result.
    pub criteria_error: Option<InvalidCriteriaError>,

    pub pager: Pager,

    /// Where "Reload source" fetches from.
    pub source: DataSource,
    pub timeout: Duration,
    pub loader: BackgroundLoader,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: DataSource, timeout: Duration, page_size: usize) -> Self {
        Self {
            dataset: None,
            options: FilterOptions::default(),
            criteria: FilterCriteria::default(),
            evaluated: None,
            visible_indices: Vec::new(),
            criteria_error: None,
            pager: Pager::new(page_size),
            source,
            timeout,
            loader: BackgroundLoader::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset filters to its bounds.
    pub fn set_dataset(&mut self, dataset: JobDataset) {
        self.criteria = FilterCriteria::defaults_for(&dataset);
        self.options = FilterOptions::from_dataset(&dataset);
        self.evaluated = None;
        self.criteria_error = None;
        self.visible_indices.clear();
        self.pager.page = 0;
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.refilter();
    }

    /// Whether a dataset is available; nothing is filtered or drawn before.
    pub fn is_ready(&self) -> bool {
        self.dataset.is_some()
    }

    /// Recompute `visible_indices` if the criteria changed since the last
    /// evaluation. Invalid criteria leave the previous result in place.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if self.evaluated.as_ref() == Some(&self.criteria) {
            return;
        }

        match filtered_indices(ds, &self.criteria) {
            Ok(indices) => {
                log::debug!("{} of {} postings match", indices.len(), ds.len());
                if indices != self.visible_indices {
                    self.pager.page = 0;
                }
                self.visible_indices = indices;
                self.criteria_error = None;
            }
            Err(e) => {
                log::debug!("criteria rejected: {e}");
                self.criteria_error = Some(e);
            }
        }
        self.pager.clamp(self.visible_indices.len());
        self.evaluated = Some(self.criteria.clone());
    }

    /// Restore every control to its initial state.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::defaults_for(ds);
            self.refilter();
        }
    }

    pub fn toggle_cp_id(&mut self, id: &CpId) {
        if !self.criteria.cp_ids.remove(id) {
            self.criteria.cp_ids.insert(id.clone());
        }
        self.refilter();
    }

    pub fn toggle_category(&mut self, name: &str) {
        if !self.criteria.category_names.remove(name) {
            self.criteria.category_names.insert(name.to_string());
        }
        self.refilter();
    }

    pub fn set_language(&mut self, language: Language, selected: bool) {
        if selected {
            self.criteria.languages.insert(language);
        } else {
            self.criteria.languages.remove(&language);
        }
        self.refilter();
    }

    /// Start a background load; the current dataset stays until it lands.
    pub fn start_load(&mut self, source: DataSource, ctx: Option<eframe::egui::Context>) {
        log::info!("loading postings from {source}");
        self.loader.spawn(source, self.timeout, move || {
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });
    }

    /// Pick up a finished background load, if any.
    pub fn poll_load(&mut self) {
        match self.loader.poll() {
            Some(Ok(dataset)) => {
                log::info!(
                    "Loaded {} postings with columns {:?}",
                    dataset.len(),
                    dataset.column_names
                );
                self.set_dataset(dataset);
            }
            Some(Err(e)) => {
                log::error!("Failed to load postings: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
            None => {}
        }
    }

    /// Number of postings on screen after filtering.
    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }
}
