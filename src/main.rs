// Entry point and interactive terminal flow.
//
// The repository is loaded once at startup. Filter edits are only staged
// until "Apply filters"; tile mode and theme are UI state on the side.
use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use substation_dash::output;
use substation_dash::reports::generate_summary;
use substation_dash::table::{query_table, SortOrder, TableColumn, TableQuery};
use substation_dash::util::format_int;
use substation_dash::{load_repository, Dashboard, DashboardConfig, TileMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "substation_dash")]
#[command(about = "Interactive analytics over the substation dataset")]
struct Cli {
    /// TOML config file (falls back to $SUBSTATION_DASH_CONFIG)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Substation CSV export; overrides the configured path
    #[arg(long, short)]
    data: Option<PathBuf>,
    /// Directory for exported views; overrides the configured one
    #[arg(long, short)]
    out: Option<PathBuf>,
}

/// Print `label` and read one trimmed line. `None` on end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Picks values from `options` by number or by name; blank picks nothing.
fn pick_values(title: &str, options: &[String]) -> Option<Vec<String>> {
    println!("{title} (comma separated numbers or names, blank for all):");
    for (idx, opt) in options.iter().enumerate() {
        println!("  [{}] {}", idx + 1, opt);
    }
    let line = prompt("Selection: ")?;
    let picked = line
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Some(options[n - 1].clone()),
            _ => options.iter().find(|o| o.eq_ignore_ascii_case(s)).cloned(),
        })
        .collect();
    Some(picked)
}

fn handle_year_range(dash: &mut Dashboard) -> Option<()> {
    let (lo, hi) = dash.repository().year_bounds();
    let years: Vec<String> = dash.repository().years().iter().map(i32::to_string).collect();
    println!("Fiscal years available: {}", years.join(", "));
    let from = prompt(&format!("From year [{lo}]: "))?;
    let to = prompt(&format!("To year [{hi}]: "))?;
    let from = from.parse::<i32>().unwrap_or(lo).clamp(lo, hi);
    let to = to.parse::<i32>().unwrap_or(hi).clamp(lo, hi);
    dash.staged_mut().set_year_range(from, to);
    println!("Staged years {from}-{to}. Apply filters to update the views.\n");
    Some(())
}

fn handle_tile_mode(dash: &mut Dashboard) -> Option<()> {
    let line = prompt("Map tiles (satellite/dark/light): ")?;
    match line.parse::<TileMode>() {
        Ok(mode) => {
            dash.select_tile_mode(mode);
            let buttons: Vec<String> = dash
                .view_state()
                .indicators()
                .iter()
                .map(|(m, on)| if *on { format!("[{m}]") } else { m.to_string() })
                .collect();
            println!("Tiles: {}\n", buttons.join("  "));
        }
        Err(e) => println!("{e}\n"),
    }
    Some(())
}

fn handle_browse(dash: &Dashboard, page_size: usize) -> Option<()> {
    let Some(views) = dash.views() else {
        println!("Apply filters first.\n");
        return Some(());
    };
    let mut query = TableQuery::new(page_size);
    let filter = prompt("Filter (column=text, blank for none): ")?;
    if let Some((col, text)) = filter.split_once('=') {
        match col.parse::<TableColumn>() {
            Ok(col) => query.filter = Some((col, text.trim().to_string())),
            Err(e) => println!("{e}"),
        }
    }
    let sort = prompt("Sort (column[,desc], blank for none): ")?;
    if !sort.is_empty() {
        let (col, dir) = sort.split_once(',').unwrap_or((sort.as_str(), "asc"));
        let order = if dir.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        match col.parse::<TableColumn>() {
            Ok(col) => query.sort = Some((col, order)),
            Err(e) => println!("{e}"),
        }
    }
    loop {
        let page = query_table(&views.table, &query);
        println!(
            "Page {} of {} ({} matching rows)",
            page.page + 1,
            page.page_count,
            format_int(page.matched)
        );
        output::preview_table_rows(&page.rows, page_size);
        if page.page + 1 >= page.page_count {
            return Some(());
        }
        if !prompt("Next page (Y/N): ")?.eq_ignore_ascii_case("y") {
            return Some(());
        }
        query.page += 1;
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DashboardConfig::load(cli.config.as_deref());
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(out) = cli.out {
        config.output_dir = out;
    }

    let (repo, report) = load_repository(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        format_int(report.total_rows),
        format_int(report.loaded_rows)
    );
    if report.dropped_rows > 0 {
        println!(
            "Note: {} rows dropped for an unreadable fiscal year.",
            format_int(report.dropped_rows)
        );
    }
    println!();

    let summary = generate_summary(&repo, &config.data_updated);
    output::print_summary(&summary);
    let mut dash = Dashboard::new(Arc::new(repo), config.map.clone());

    loop {
        println!("Substation Intelligence Platform");
        println!("[1] Select regions");
        println!("[2] Select ownership types");
        println!("[3] Set year range");
        println!("[4] Apply filters");
        println!("[5] Reset filters");
        println!("[6] Map tiles");
        println!("[7] Toggle dark mode");
        println!("[8] Browse table");
        println!("[9] Export views");
        println!("[0] Exit\n");
        let Some(choice) = prompt("Enter choice: ") else { break };
        let handled = match choice.as_str() {
            "1" => {
                let options = dash.repository().regions();
                pick_values("Select Regions", &options).map(|v| dash.staged_mut().set_regions(v))
            }
            "2" => {
                let options = dash.repository().ownerships();
                pick_values("Ownership Type", &options).map(|v| dash.staged_mut().set_ownerships(v))
            }
            "3" => handle_year_range(&mut dash),
            "4" => {
                println!();
                output::print_views(dash.apply(), config.preview_rows);
                Some(())
            }
            "5" => {
                dash.reset();
                println!("Filters reset. Apply filters to update the views.\n");
                Some(())
            }
            "6" => handle_tile_mode(&mut dash),
            "7" => {
                let ui = dash.toggle_theme();
                println!("Theme: {}\n", ui.theme.css_class());
                Some(())
            }
            "8" => handle_browse(&dash, config.page_size),
            "9" => {
                match dash.views() {
                    Some(views) => match output::export_views(&config.output_dir, views, &summary) {
                        Ok(files) => {
                            for f in files {
                                println!("Wrote {}", f.display());
                            }
                            println!();
                        }
                        Err(e) => eprintln!("Write error: {}\n", e),
                    },
                    None => println!("Apply filters first.\n"),
                }
                Some(())
            }
            "0" => break,
            _ => {
                println!("Invalid choice. Please enter 0-9.\n");
                Some(())
            }
        };
        if handled.is_none() {
            break;
        }
    }
    println!("Exiting the program.");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    run(Cli::parse())
}
