//! Filter-commit-and-derive core of the substation analytics dashboard.
//!
//! A [`Repository`] is loaded once. Staged filter edits become an immutable
//! [`Snapshot`] only on commit, and every view is derived from that snapshot.
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod map;
pub mod output;
pub mod reports;
pub mod table;
pub mod types;
pub mod util;
pub mod view_state;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use filter::{commit, reset, FilterCriteria, Selection, Snapshot, StagedCriteria, YearRange};
pub use loader::{load_repository, LoadError, LoadReport, Repository};
pub use map::{MapSettings, MapView};
pub use reports::{DashboardViews, OwnershipDistribution, TrendPoint};
pub use types::{SubstationRecord, TableRow};
pub use view_state::{ThemeMode, TileMode, UiState, ViewState};
