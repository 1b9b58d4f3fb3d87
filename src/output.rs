use crate::reports::{distribution_rows, trend_rows, DashboardViews, OwnershipDistribution};
use crate::types::SummaryStats;
use crate::util::{format_int, format_optional};
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub const TABLE_FILE: &str = "substation_table.csv";
pub const TREND_FILE: &str = "spend_trend.csv";
pub const DISTRIBUTION_FILE: &str = "ownership_distribution.csv";
pub const MAP_FILE: &str = "substation_map.html";
pub const SUMMARY_FILE: &str = "summary.json";

/// One CSV file, header taken from the row type's serde names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    rows.iter().try_for_each(|row| writer.serialize(row))?;
    writer.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(())
}

/// Writes every view plus the summary into `dir`, returning the files written.
pub fn export_views(
    dir: &Path,
    views: &DashboardViews,
    summary: &SummaryStats,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let table = dir.join(TABLE_FILE);
    write_csv(&table, &views.table)?;
    let trend = dir.join(TREND_FILE);
    write_csv(&trend, &trend_rows(&views.trend))?;
    let distribution = dir.join(DISTRIBUTION_FILE);
    write_csv(&distribution, &distribution_rows(&views.distribution))?;
    let map = dir.join(MAP_FILE);
    std::fs::write(&map, &views.map_html)?;
    let summary_path = dir.join(SUMMARY_FILE);
    write_json(&summary_path, summary)?;
    Ok(vec![table, trend, distribution, map, summary_path])
}

/// Markdown table of the first `max_rows` rows, or a "(no rows)" marker.
pub fn preview_table_rows<T: Tabled>(rows: &[T], max_rows: usize) {
    if rows.is_empty() || max_rows == 0 {
        println!("(no rows)\n");
        return;
    }
    let mut table = Table::new(rows.iter().take(max_rows));
    table.with(Style::markdown());
    println!("{table}\n");
}

pub fn print_summary(summary: &SummaryStats) {
    println!("Total Substations: {}", format_int(summary.total_substations));
    println!("Regions Covered:   {}", format_int(summary.regions_covered));
    println!("Avg Spend:         ${}", format_optional(summary.avg_spend, 0));
    println!("Data Updated:      {}\n", summary.data_updated);
}

/// Console rendering of one refresh of the views.
pub fn print_views(views: &DashboardViews, max_rows: usize) {
    println!("Spend Trend Analysis\n");
    preview_table_rows(&trend_rows(&views.trend), max_rows);

    println!("Ownership Distribution\n");
    match &views.distribution {
        OwnershipDistribution::NoData => println!("(no data)\n"),
        dist => preview_table_rows(&distribution_rows(dist), max_rows),
    }

    println!(
        "Substation Locations: {} markers, {} route segments, tiles: {}\n",
        format_int(views.map.markers.len()),
        format_int(views.map.route.len()),
        views.map.tiles.name
    );

    println!("Substation Data ({} rows)\n", format_int(views.table.len()));
    preview_table_rows(&views.table, max_rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::commit;
    use crate::filter::reset;
    use crate::loader::Repository;
    use crate::map::MapSettings;
    use crate::reports::{derive_views, generate_summary};
    use crate::types::SubstationRecord;
    use crate::view_state::TileMode;

    #[test]
    fn export_writes_every_view() {
        let repo = Repository::from_records(vec![SubstationRecord {
            name: "Alpha".into(),
            region: "North".into(),
            ownership: "PublicCo".into(),
            fiscal_year: 2021,
            latitude: Some(1.0),
            longitude: Some(2.0),
            planning_spend: Some(10.0),
            maintenance_spend: None,
        }])
        .unwrap();
        let views = derive_views(&commit(&reset(&repo), &repo), TileMode::Dark, &MapSettings::default());
        let dir = tempfile::tempdir().unwrap();
        let files = export_views(dir.path(), &views, &generate_summary(&repo, "Q2 2023")).unwrap();
        assert_eq!(files.len(), 5);
        for f in &files {
            assert!(f.exists());
        }
        let table = std::fs::read_to_string(dir.path().join(TABLE_FILE)).unwrap();
        assert!(table.starts_with("Substation Name,Region,Substation Ownership,SS_FisYearName"));
        assert!(table.contains("Alpha,North,PublicCo,2021"));
        let summary = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert!(summary.contains("\"total_substations\": 1"));
    }
}
