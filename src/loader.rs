use crate::types::{RawRow, SubstationRecord, MISSING_LABEL};
use crate::util::{parse_amount_safe, parse_f64_safe, parse_year_serial, text_or_missing};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Columns the export must carry. Longitude may arrive as "Longitudes".
const REQUIRED_COLUMNS: [&[&str]; 8] = [
    &["Substation Name"],
    &["Region"],
    &["Substation Ownership"],
    &["SS_FisYearName"],
    &["Latitude"],
    &["Longitude", "Longitudes"],
    &["Planning Plant"],
    &["Maintenence Plant"],
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read substation table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("substation table is missing required column `{0}`")]
    MissingColumn(String),
    #[error("substation table has no rows with a valid fiscal year")]
    NoValidRows,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows dropped because the row or its fiscal year could not be parsed.
    pub dropped_rows: usize,
    /// Loaded rows that are not geolocated.
    pub missing_coords: usize,
}

/// The immutable, normalized record set.
///
/// Construction guarantees at least one record, so year bounds always exist.
#[derive(Debug, Clone)]
pub struct Repository {
    records: Vec<SubstationRecord>,
    min_year: i32,
    max_year: i32,
}

impl Repository {
    pub fn from_records(records: Vec<SubstationRecord>) -> Result<Self, LoadError> {
        let min_year = records.iter().map(|r| r.fiscal_year).min();
        let max_year = records.iter().map(|r| r.fiscal_year).max();
        match (min_year, max_year) {
            (Some(min_year), Some(max_year)) => Ok(Self { records, min_year, max_year }),
            _ => Err(LoadError::NoValidRows),
        }
    }

    pub fn records(&self) -> &[SubstationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inclusive `(min, max)` of observed fiscal years.
    pub fn year_bounds(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }

    /// Sorted distinct regions, for the region picker. Blank regions are
    /// not offered.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Sorted distinct ownership types, for the ownership picker. Blank
    /// ownership is not offered.
    pub fn ownerships(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.ownership.as_str()))
    }

    /// Sorted distinct fiscal years, for the year range marks.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.fiscal_year).collect();
        years.into_iter().collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = values.filter(|v| *v != MISSING_LABEL).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn load_repository(path: impl AsRef<Path>) -> Result<(Repository, LoadReport), LoadError> {
    let path = path.as_ref();
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;
    let result = read_repository(rdr, path);
    if let Ok((repo, report)) = &result {
        info!(
            path = %path.display(),
            total_rows = report.total_rows,
            loaded_rows = repo.len(),
            non_geolocated = report.missing_coords,
            "substation table loaded"
        );
        if report.dropped_rows > 0 {
            warn!(dropped_rows = report.dropped_rows, "rows without a valid fiscal year were dropped");
        }
    }
    result
}

/// Load from any reader, e.g. an in-memory export.
pub fn load_repository_from_reader<R: Read>(reader: R) -> Result<(Repository, LoadReport), LoadError> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    read_repository(rdr, Path::new("<reader>"))
}

fn read_repository<R: Read>(
    mut rdr: csv::Reader<R>,
    path: &Path,
) -> Result<(Repository, LoadReport), LoadError> {
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?
        .clone();
    for names in REQUIRED_COLUMNS {
        if !names.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(LoadError::MissingColumn(names[0].to_string()));
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.dropped_rows += 1;
                continue;
            }
        };
        let Some(fiscal_year) = parse_year_serial(row.fiscal_year_serial.as_deref()) else {
            report.dropped_rows += 1;
            continue;
        };
        let record = SubstationRecord {
            fiscal_year,
            latitude: parse_f64_safe(row.latitude.as_deref()),
            longitude: parse_f64_safe(row.longitude.as_deref()),
            planning_spend: parse_amount_safe(row.planning_spend.as_deref()),
            maintenance_spend: parse_amount_safe(row.maintenance_spend.as_deref()),
            name: text_or_missing(row.name),
            region: text_or_missing(row.region),
            ownership: text_or_missing(row.ownership),
        };
        if record.coordinates().is_none() {
            report.missing_coords += 1;
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    let repo = Repository::from_records(records)?;
    Ok((repo, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Substation Name,Region,Substation Ownership,SS_FisYearName,Latitude,Longitudes,Planning Plant,Maintenence Plant\n";

    fn load(body: &str) -> Result<(Repository, LoadReport), LoadError> {
        load_repository_from_reader(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn longitudes_column_is_renamed() {
        let (repo, report) = load("Alpha,North,PublicCo,44197,10.5,20.25,100,50\n").unwrap();
        assert_eq!(report.total_rows, 1);
        let r = &repo.records()[0];
        assert_eq!(r.longitude, Some(20.25));
        assert_eq!(r.fiscal_year, 2021);
        assert_eq!(r.coordinates(), Some((10.5, 20.25)));
    }

    #[test]
    fn invalid_year_drops_row_but_bad_coords_do_not() {
        let (repo, report) = load(
            "Alpha,North,PublicCo,44197,abc,20,100,50\n\
             Beta,South,PrivateCo,not-a-date,1,2,3,4\n\
             Gamma,South,PrivateCo,44562,,,\"1,000\",\n",
        )
        .unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.missing_coords, 2);
        assert_eq!(repo.records()[0].latitude, None);
        assert_eq!(repo.records()[1].planning_spend, Some(1000.0));
        assert_eq!(repo.records()[1].maintenance_spend, None);
    }

    #[test]
    fn keeps_file_order_and_exposes_bounds() {
        let (repo, _) = load(
            "B,South,PrivateCo,44562,,,,\n\
             A,North,PublicCo,43831,,,,\n\
             C,North,,44197,,,,\n",
        )
        .unwrap();
        let names: Vec<&str> = repo.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
        assert_eq!(repo.year_bounds(), (2020, 2022));
        assert_eq!(repo.years(), vec![2020, 2021, 2022]);
        assert_eq!(repo.regions(), vec!["North", "South"]);
        assert_eq!(repo.ownerships(), vec!["PrivateCo", "PublicCo"]);
        assert_eq!(repo.records()[2].ownership, MISSING_LABEL);
    }

    #[test]
    fn padded_headers_still_bind_to_fields() {
        let (repo, report) = load_repository_from_reader(
            " Substation Name ,Region ,Substation Ownership,SS_FisYearName ,Latitude,Longitudes ,Planning Plant,Maintenence Plant\n\
             A,North,PublicCo,44197,1,2,3,4\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(report.dropped_rows, 0);
        let r = &repo.records()[0];
        assert_eq!(r.name, "A");
        assert_eq!(r.region, "North");
        assert_eq!(r.fiscal_year, 2021);
        assert_eq!(r.longitude, Some(2.0));
    }

    #[test]
    fn blank_region_is_not_offered_as_an_option() {
        let (repo, _) = load("A,North,PublicCo,44197,,,,\nB,,PublicCo,44197,,,,\n").unwrap();
        assert_eq!(repo.regions(), vec!["North"]);
        assert_eq!(repo.records()[1].region, MISSING_LABEL);
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = load_repository_from_reader("Substation Name,Region\nA,North\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "Substation Ownership"));
    }

    #[test]
    fn no_surviving_rows_is_fatal() {
        let err = load("A,North,PublicCo,,1,2,3,4\n").unwrap_err();
        assert!(matches!(err, LoadError::NoValidRows));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{HEADER}A,North,PublicCo,44197,1,2,3,4\n").unwrap();
        let (repo, report) = load_repository(file.path()).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(report.loaded_rows, 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_repository("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
