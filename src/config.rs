use std::path::PathBuf;

/// Tunables for the dashboard computations.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset loaded at start-up when it exists.
    pub data_path: PathBuf,
    /// Width in years of each heatmap age bin.
    pub age_bin_width: u32,
    /// Number of heatmap age bins, starting at 0.
    pub age_bin_count: u32,
    /// Family-size groups shown in the ranking.
    pub top_families: usize,
    /// Rows in the fare ranking table.
    pub top_fares: usize,
    /// Bins of the age histogram.
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("titanic.csv"),
            age_bin_width: 10,
            age_bin_count: 9,
            top_families: 5,
            top_fares: 10,
            histogram_bins: 30,
        }
    }
}
