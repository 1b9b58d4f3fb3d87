use crate::filter::Snapshot;
use crate::loader::Repository;
use crate::map::{build_map, MapSettings, MapView};
use crate::types::{DistributionRow, SubstationRecord, SummaryStats, TableRow, TrendRow, MISSING_LABEL};
use crate::util::{format_number, format_optional, mean_present};
use crate::view_state::TileMode;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const TREND_TITLE: &str = "Spend Trend Analysis";
pub const TREND_X_LABEL: &str = "Fiscal Year";
pub const TREND_Y_LABEL: &str = "Average Spend";
pub const PLANNING_SERIES: &str = "Planning Plant";
pub const MAINTENANCE_SERIES: &str = "Maintenence Plant";

/// Mean spend for one fiscal year. A metric with no values that year is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub mean_planning: Option<f64>,
    pub mean_maintenance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipSlice {
    pub ownership: String,
    pub count: usize,
    pub share: f64,
}

/// Ownership breakdown. Shares are undefined without rows, hence `NoData`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "slices", rename_all = "snake_case")]
pub enum OwnershipDistribution {
    NoData,
    Slices(Vec<OwnershipSlice>),
}

impl OwnershipDistribution {
    pub fn total(&self) -> usize {
        match self {
            OwnershipDistribution::NoData => 0,
            OwnershipDistribution::Slices(slices) => slices.iter().map(|s| s.count).sum(),
        }
    }

    pub fn slices(&self) -> &[OwnershipSlice] {
        match self {
            OwnershipDistribution::NoData => &[],
            OwnershipDistribution::Slices(slices) => slices,
        }
    }
}

/// The four derived views, always computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub trend: Vec<TrendPoint>,
    pub distribution: OwnershipDistribution,
    pub table: Vec<TableRow>,
    pub map: MapView,
    /// Rendered map page.
    pub map_html: String,
}

pub fn trend_series(records: &[SubstationRecord]) -> Vec<TrendPoint> {
    let mut by_year: BTreeMap<i32, Vec<&SubstationRecord>> = BTreeMap::new();
    for r in records {
        by_year.entry(r.fiscal_year).or_default().push(r);
    }
    by_year
        .into_iter()
        .map(|(year, rows)| TrendPoint {
            year,
            mean_planning: mean_present(rows.iter().map(|r| r.planning_spend)),
            mean_maintenance: mean_present(rows.iter().map(|r| r.maintenance_spend)),
        })
        .collect()
}

pub fn ownership_distribution(records: &[SubstationRecord]) -> OwnershipDistribution {
    if records.is_empty() {
        return OwnershipDistribution::NoData;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.ownership.as_str()).or_default() += 1;
    }
    let total = records.len() as f64;
    let mut slices: Vec<OwnershipSlice> = counts
        .into_iter()
        .map(|(ownership, count)| OwnershipSlice {
            ownership: ownership.to_string(),
            count,
            share: count as f64 / total,
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ownership.cmp(&b.ownership)));
    OwnershipDistribution::Slices(slices)
}

pub fn table_rows(records: &[SubstationRecord]) -> Vec<TableRow> {
    records
        .iter()
        .map(|r| TableRow {
            name: r.name.clone(),
            region: r.region.clone(),
            ownership: r.ownership.clone(),
            fiscal_year: r.fiscal_year,
        })
        .collect()
}

/// Recomputes every view from one snapshot and the current tile mode.
pub fn derive_views(snapshot: &Snapshot, tile_mode: TileMode, settings: &MapSettings) -> DashboardViews {
    let records = snapshot.records();
    let map = build_map(records, tile_mode, settings);
    let map_html = map.to_html();
    DashboardViews {
        trend: trend_series(records),
        distribution: ownership_distribution(records),
        table: table_rows(records),
        map,
        map_html,
    }
}

/// Metric cards over the whole repository, independent of any filter.
pub fn generate_summary(repo: &Repository, data_updated: &str) -> SummaryStats {
    let records = repo.records();
    let regions: HashSet<&str> = records
        .iter()
        .map(|r| r.region.as_str())
        .filter(|region| *region != MISSING_LABEL)
        .collect();
    let planning = mean_present(records.iter().map(|r| r.planning_spend));
    let maintenance = mean_present(records.iter().map(|r| r.maintenance_spend));
    SummaryStats {
        total_substations: records.len(),
        regions_covered: regions.len(),
        avg_spend: mean_present([planning, maintenance]),
        data_updated: data_updated.to_string(),
    }
}

pub fn trend_rows(trend: &[TrendPoint]) -> Vec<TrendRow> {
    trend
        .iter()
        .map(|p| TrendRow {
            fiscal_year: p.year,
            planning: format_optional(p.mean_planning, 2),
            maintenance: format_optional(p.mean_maintenance, 2),
        })
        .collect()
}

pub fn distribution_rows(distribution: &OwnershipDistribution) -> Vec<DistributionRow> {
    distribution
        .slices()
        .iter()
        .map(|s| DistributionRow {
            ownership: s.ownership.clone(),
            count: s.count,
            share: format!("{}%", format_number(s.share * 100.0, 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{commit, reset, StagedCriteria};

    fn record(name: &str, ownership: &str, year: i32, planning: Option<f64>, maintenance: Option<f64>) -> SubstationRecord {
        SubstationRecord {
            name: name.into(),
            region: "North".into(),
            ownership: ownership.into(),
            fiscal_year: year,
            latitude: None,
            longitude: None,
            planning_spend: planning,
            maintenance_spend: maintenance,
        }
    }

    #[test]
    fn trend_is_ascending_with_absent_means() {
        let records = vec![
            record("a", "PublicCo", 2022, Some(10.0), None),
            record("b", "PublicCo", 2020, Some(4.0), Some(1.0)),
            record("c", "PublicCo", 2022, Some(20.0), None),
            record("d", "PublicCo", 2020, None, Some(3.0)),
        ];
        let trend = trend_series(&records);
        assert_eq!(
            trend,
            vec![
                TrendPoint { year: 2020, mean_planning: Some(4.0), mean_maintenance: Some(2.0) },
                TrendPoint { year: 2022, mean_planning: Some(15.0), mean_maintenance: None },
            ]
        );
        assert!(trend_series(&[]).is_empty());
    }

    #[test]
    fn distribution_counts_sum_to_snapshot_size() {
        let records = vec![
            record("a", "PublicCo", 2021, None, None),
            record("b", "PrivateCo", 2021, None, None),
            record("c", "PrivateCo", 2021, None, None),
        ];
        let dist = ownership_distribution(&records);
        assert_eq!(dist.total(), 3);
        let pairs: Vec<(&str, usize)> = dist.slices().iter().map(|s| (s.ownership.as_str(), s.count)).collect();
        assert_eq!(pairs, vec![("PrivateCo", 2), ("PublicCo", 1)]);
        let shares: f64 = dist.slices().iter().map(|s| s.share).sum();
        assert!((shares - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_snapshot_has_no_distribution() {
        let dist = ownership_distribution(&[]);
        assert_eq!(dist, OwnershipDistribution::NoData);
        assert_eq!(dist.total(), 0);
        assert!(distribution_rows(&dist).is_empty());
    }

    #[test]
    fn table_keeps_snapshot_order() {
        let records = vec![
            record("z", "PublicCo", 2021, None, None),
            record("a", "PrivateCo", 2019, None, None),
        ];
        let rows = table_rows(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "z");
        assert_eq!(rows[1].fiscal_year, 2019);
    }

    #[test]
    fn summary_averages_column_means() {
        let repo = Repository::from_records(vec![
            record("a", "PublicCo", 2021, Some(10.0), Some(100.0)),
            record("b", "PublicCo", 2021, Some(30.0), None),
        ])
        .unwrap();
        let summary = generate_summary(&repo, "Q2 2023");
        assert_eq!(summary.total_substations, 2);
        assert_eq!(summary.regions_covered, 1);
        // mean(20, 100)
        assert_eq!(summary.avg_spend, Some(60.0));
    }

    #[test]
    fn blank_region_is_not_a_covered_region() {
        let mut blank = record("b", "PublicCo", 2021, None, None);
        blank.region = MISSING_LABEL.to_string();
        let repo = Repository::from_records(vec![record("a", "PublicCo", 2021, None, None), blank]).unwrap();
        let summary = generate_summary(&repo, "Q2 2023");
        assert_eq!(summary.total_substations, 2);
        assert_eq!(summary.regions_covered, 1);
        // Still grouped for the distribution.
        assert_eq!(ownership_distribution(repo.records()).total(), 2);
    }

    #[test]
    fn derive_views_handles_empty_snapshot() {
        let repo = Repository::from_records(vec![record("a", "PublicCo", 2021, None, None)]).unwrap();
        let mut staged = StagedCriteria::new(&repo);
        staged.set_regions(["Nowhere"]);
        let views = derive_views(&commit(staged.criteria(), &repo), TileMode::Dark, &MapSettings::default());
        assert!(views.trend.is_empty());
        assert!(views.table.is_empty());
        assert_eq!(views.distribution, OwnershipDistribution::NoData);
        assert!(views.map.markers.is_empty());

        let all = derive_views(&commit(&reset(&repo), &repo), TileMode::Dark, &MapSettings::default());
        assert_eq!(all.table.len(), 1);
    }

    #[test]
    fn export_rows_format_values() {
        let rows = trend_rows(&[TrendPoint { year: 2021, mean_planning: Some(1234.5), mean_maintenance: None }]);
        assert_eq!(rows[0].planning, "1,234.50");
        assert_eq!(rows[0].maintenance, "N/A");
    }
}
