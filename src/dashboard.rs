//! Single-writer controller behind the interactive surface.
//!
//! Every call is one synchronous transaction: it finishes recomputing before
//! it returns, so the last call always determines what is shown.

use crate::filter::{self, Snapshot, StagedCriteria};
use crate::loader::Repository;
use crate::map::MapSettings;
use crate::reports::{derive_views, DashboardViews};
use crate::view_state::{TileMode, UiState, ViewState};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Dashboard {
    repo: Arc<Repository>,
    map_settings: MapSettings,
    staged: StagedCriteria,
    snapshot: Option<Snapshot>,
    view: ViewState,
    views: Option<DashboardViews>,
    commits: u64,
}

impl Dashboard {
    pub fn new(repo: Arc<Repository>, map_settings: MapSettings) -> Self {
        let staged = StagedCriteria::new(&repo);
        Self {
            repo,
            map_settings,
            staged,
            snapshot: None,
            view: ViewState::new(),
            views: None,
            commits: 0,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn staged(&self) -> &StagedCriteria {
        &self.staged
    }

    /// Edits here are not visible until [`Dashboard::apply`].
    pub fn staged_mut(&mut self) -> &mut StagedCriteria {
        &mut self.staged
    }

    /// Last committed snapshot, if Apply has been pressed.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Views of the last snapshot; `None` until the first Apply.
    pub fn views(&self) -> Option<&DashboardViews> {
        self.views.as_ref()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn ui_state(&self) -> UiState {
        self.view.ui_state()
    }

    /// Commits the staged criteria and recomputes all views.
    pub fn apply(&mut self) -> &DashboardViews {
        self.commits += 1;
        let snapshot = filter::commit(self.staged.criteria(), &self.repo).with_generation(self.commits);
        info!(
            generation = snapshot.generation(),
            rows = snapshot.len(),
            of = self.repo.len(),
            "filters applied"
        );
        let views = derive_views(&snapshot, self.view.tile_mode(), &self.map_settings);
        self.snapshot = Some(snapshot);
        self.views.insert(views)
    }

    /// Clears the staged criteria. The committed snapshot and views stay.
    pub fn reset(&mut self) {
        self.staged.replace(filter::reset(&self.repo));
        debug!("staged filters reset");
    }

    pub fn select_tile_mode(&mut self, mode: TileMode) -> UiState {
        self.view.select_tile_mode(mode);
        debug!(tile_mode = %mode, "tile mode selected");
        self.refresh();
        self.view.ui_state()
    }

    /// Theme is presentation-only; nothing is recomputed.
    pub fn toggle_theme(&mut self) -> UiState {
        let theme = self.view.toggle_theme();
        debug!(theme = theme.css_class(), "theme toggled");
        self.view.ui_state()
    }

    fn refresh(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.views = Some(derive_views(snapshot, self.view.tile_mode(), &self.map_settings));
        }
    }
}
