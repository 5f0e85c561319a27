use std::collections::BTreeSet;
use std::path::Path;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::{
    BinnedRate, FareRow, GroupBy, GroupRate, Summary, binned_rate, group_rate, top_fares,
    top_groups,
};
use crate::data::distribution::{FareSpread, HistogramBin, age_histogram, fare_spread};
use crate::data::filter::{FilterSpec, FilteredView, apply};
use crate::data::loader::load_file;
use crate::data::model::PassengerTable;

// ---------------------------------------------------------------------------
// Dashboard: everything the main panels render
// ---------------------------------------------------------------------------

/// The outputs of one filter application, computed in one pass and handed
/// to the renderers by reference.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub view: FilteredView,
    pub summary: Summary,
    pub by_sex: Vec<GroupRate>,
    pub by_class: Vec<GroupRate>,
    pub by_port: Vec<GroupRate>,
    pub heatmap: Vec<BinnedRate>,
    pub age_histogram: Vec<HistogramBin>,
    pub fare_spread: Vec<FareSpread>,
    pub top_families: Vec<GroupRate>,
    pub top_fares: Vec<FareRow>,
}

impl Dashboard {
    pub fn compute(table: &PassengerTable, spec: &FilterSpec, config: &DashboardConfig) -> Self {
        let view = apply(&table.passengers, spec);
        log::debug!("filtered {} of {} passengers", view.len(), table.len());

        let by_family = group_rate(&view, GroupBy::FamilySize);
        Dashboard {
            summary: Summary::of(&view),
            by_sex: group_rate(&view, GroupBy::Sex),
            by_class: group_rate(&view, GroupBy::Class),
            by_port: group_rate(&view, GroupBy::Port),
            heatmap: binned_rate(&view, config.age_bin_width, config.age_bin_count),
            age_histogram: age_histogram(&view, config.histogram_bins),
            fare_spread: fare_spread(&view),
            top_families: top_groups(&by_family, config.top_families),
            top_fares: top_fares(&view, config.top_fares),
            view,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The multiselect fields of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Class,
    Sex,
    Port,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until a file is loaded).
    pub table: Option<PassengerTable>,

    /// Current sidebar selections.
    pub filters: FilterSpec,

    /// Outputs for the current selections, rebuilt wholesale by `refilter`.
    pub dashboard: Option<Dashboard>,

    /// Per-category chart colours.
    pub colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load the configured start-up dataset if it exists.
    pub fn load_default(&mut self) {
        let path = self.config.data_path.clone();
        if path.exists() {
            self.load_path(&path);
        } else {
            log::warn!("default dataset {} not found", path.display());
        }
    }

    /// Load a file, replacing the current table on success. On failure the
    /// previous table stays and the error is shown in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                log::info!("Loaded {} passengers from {}", table.len(), path.display());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table, reset filters and colours.
    pub fn set_table(&mut self, table: PassengerTable) {
        self.filters = FilterSpec::for_table(&table);
        self.colors = CategoryColors::for_table(&table);
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the dashboard after a filter change.
    pub fn refilter(&mut self) {
        self.dashboard = self
            .table
            .as_ref()
            .map(|table| Dashboard::compute(table, &self.filters, &self.config));
    }

    /// Restore the widget defaults of the loaded table.
    pub fn reset_filters(&mut self) {
        if let Some(table) = &self.table {
            self.filters = FilterSpec::for_table(table);
            self.refilter();
        }
    }

    /// Select every option of a categorical field.
    pub fn select_all(&mut self, category: Category) {
        let Some(table) = &self.table else {
            return;
        };
        match category {
            Category::Class => self.filters.classes = table.classes.clone(),
            Category::Sex => self.filters.sexes = table.sexes.iter().cloned().collect(),
            Category::Port => self.filters.ports = table.ports.iter().cloned().collect(),
        }
        self.refilter();
    }

    /// Clear a categorical selection, which lifts the filter on that field.
    pub fn clear(&mut self, category: Category) {
        match category {
            Category::Class => self.filters.classes.clear(),
            Category::Sex => self.filters.sexes.clear(),
            Category::Port => self.filters.ports.clear(),
        }
        self.refilter();
    }

    pub fn toggle_class(&mut self, class: u8) {
        toggle(&mut self.filters.classes, &class);
        self.refilter();
    }

    pub fn toggle_sex(&mut self, sex: &str) {
        toggle(&mut self.filters.sexes, &sex.to_string());
        self.refilter();
    }

    pub fn toggle_port(&mut self, port: &str) {
        toggle(&mut self.filters.ports, &port.to_string());
        self.refilter();
    }
}

fn toggle<T: Ord + Clone>(set: &mut BTreeSet<T>, value: &T) {
    if !set.remove(value) {
        set.insert(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{GroupKey, Passenger};

    fn table() -> PassengerTable {
        PassengerTable::from_passengers(vec![
            Passenger::new("A", 1, "female", Some(29.0), 0, 0, Some(211.34), Some("S".into()), true),
            Passenger::new("B", 1, "male", Some(0.92), 1, 2, Some(151.55), Some("S".into()), true),
            Passenger::new("C", 3, "male", None, 0, 0, Some(7.75), Some("Q".into()), false),
            Passenger::new("D", 3, "female", Some(2.0), 3, 2, Some(21.07), None, false),
            Passenger::new("E", 2, "male", Some(30.0), 0, 0, None, Some("C".into()), false),
        ])
    }

    #[test]
    fn default_dashboard_covers_passengers_with_a_port() {
        let table = table();
        let spec = FilterSpec::for_table(&table);
        let dash = Dashboard::compute(&table, &spec, &DashboardConfig::default());

        // D has no port and the default selection holds every port.
        assert_eq!(dash.view.len(), 4);
        assert!(dash.view.iter().all(|p| p.port.is_some()));
        assert_eq!(dash.summary.survived, 2);
        assert_eq!(dash.by_class.len(), 3);
        assert_eq!(dash.by_port.len(), 3);
        assert_eq!(dash.top_fares.len(), 3);
        assert_eq!(dash.top_fares[0].name, "A");
        assert_eq!(dash.top_families.first().map(|g| &g.key), Some(&GroupKey::Integer(3)));
        // C has no age; A, B and E fall in three distinct (class, bin) cells.
        assert_eq!(dash.heatmap.len(), 3);
    }

    #[test]
    fn refilter_follows_toggles() {
        let mut state = AppState::default();
        state.set_table(table());
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(4));

        state.toggle_sex("male");
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.view.len(), 1);
        assert!(dash.view.iter().all(|p| p.sex == "female"));

        state.reset_filters();
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(4));
    }

    #[test]
    fn clearing_a_selection_removes_the_filter() {
        let mut state = AppState::default();
        state.set_table(table());
        state.toggle_class(2);
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(3));
        for class in [1, 3] {
            state.toggle_class(class);
        }
        assert!(state.filters.classes.is_empty());
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(4));

        state.select_all(Category::Port);
        state.toggle_port("S");
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(2));
        // With no port selected, D and its missing port come back.
        state.clear(Category::Port);
        assert_eq!(state.dashboard.as_ref().map(|d| d.view.len()), Some(5));
    }

    #[test]
    fn empty_view_computes_without_panicking() {
        let mut state = AppState::default();
        state.set_table(table());
        state.filters.drop_missing_port = true;
        state.filters.drop_missing_age = true;
        state.filters.fare.hi = 0.0;
        state.refilter();

        let dash = state.dashboard.as_ref().unwrap();
        // E has no fare, so it passes the fare range.
        assert_eq!(dash.view.len(), 1);
        state.toggle_port("C");
        let dash = state.dashboard.as_ref().unwrap();
        assert!(dash.view.is_empty());
        assert_eq!(dash.summary.survived_pct(), None);
        assert!(dash.by_sex.is_empty());
        assert!(dash.fare_spread.is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = AppState::default();
        state.set_table(table());
        state.load_path(Path::new("/nonexistent/passengers.csv"));
        assert_eq!(state.table.as_ref().map(PassengerTable::len), Some(5));
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
    }
}
