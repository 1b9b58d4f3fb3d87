use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Placeholder shown for blank text fields and absent values.
pub const MISSING_LABEL: &str = "N/A";

/// One CSV row exactly as it appears in the spreadsheet export.
///
/// Every field is optional text; coercion happens in the loader so a single
/// bad cell never fails the whole row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Substation Name")]
    pub name: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Substation Ownership")]
    pub ownership: Option<String>,
    #[serde(rename = "SS_FisYearName")]
    pub fiscal_year_serial: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    // The source sheet ships this column as "Longitudes".
    #[serde(rename = "Longitude", alias = "Longitudes")]
    pub longitude: Option<String>,
    #[serde(rename = "Planning Plant")]
    pub planning_spend: Option<String>,
    #[serde(rename = "Maintenence Plant")]
    pub maintenance_spend: Option<String>,
}

/// A normalized substation row. Only rows with a valid fiscal year exist.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstationRecord {
    pub name: String,
    pub region: String,
    pub ownership: String,
    pub fiscal_year: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub planning_spend: Option<f64>,
    pub maintenance_spend: Option<f64>,
}

impl SubstationRecord {
    /// Both coordinates present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Table projection of a record: the four display columns.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct TableRow {
    #[serde(rename = "Substation Name")]
    #[tabled(rename = "Substation Name")]
    pub name: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Substation Ownership")]
    #[tabled(rename = "Substation Ownership")]
    pub ownership: String,
    #[serde(rename = "SS_FisYearName")]
    #[tabled(rename = "SS_FisYearName")]
    pub fiscal_year: i32,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "FiscalYear")]
    #[tabled(rename = "FiscalYear")]
    pub fiscal_year: i32,
    #[serde(rename = "Planning Plant")]
    #[tabled(rename = "Planning Plant")]
    pub planning: String,
    #[serde(rename = "Maintenence Plant")]
    #[tabled(rename = "Maintenence Plant")]
    pub maintenance: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistributionRow {
    #[serde(rename = "Ownership")]
    #[tabled(rename = "Ownership")]
    pub ownership: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

/// Headline metric cards, computed once over the whole repository.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_substations: usize,
    pub regions_covered: usize,
    pub avg_spend: Option<f64>,
    pub data_updated: String,
}
