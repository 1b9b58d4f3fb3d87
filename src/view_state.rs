//! UI-only state: basemap tile mode and colour theme. Neither affects which
//! records are shown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileMode {
    Satellite,
    #[default]
    Dark,
    Light,
}

impl TileMode {
    pub const ALL: [TileMode; 3] = [TileMode::Satellite, TileMode::Dark, TileMode::Light];

    pub fn as_str(self) -> &'static str {
        match self {
            TileMode::Satellite => "satellite",
            TileMode::Dark => "dark",
            TileMode::Light => "light",
        }
    }
}

impl fmt::Display for TileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "satellite" => Ok(TileMode::Satellite),
            "dark" => Ok(TileMode::Dark),
            "light" => Ok(TileMode::Light),
            other => Err(format!("unknown tile mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Class name applied to the page container.
    pub fn css_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "light-mode",
            ThemeMode::Dark => "dark-mode",
        }
    }
}

/// Snapshot of both UI values, handed to the presentation after each change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub tile_mode: TileMode,
    pub theme: ThemeMode,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    tile_mode: TileMode,
    theme: ThemeMode,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_mode(&self) -> TileMode {
        self.tile_mode
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Returns whether the mode changed.
    pub fn select_tile_mode(&mut self, mode: TileMode) -> bool {
        let changed = self.tile_mode != mode;
        self.tile_mode = mode;
        changed
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Highlight flag for a tile-mode button.
    pub fn active_indicator(&self, mode: TileMode) -> bool {
        self.tile_mode == mode
    }

    pub fn indicators(&self) -> [(TileMode, bool); 3] {
        TileMode::ALL.map(|mode| (mode, self.active_indicator(mode)))
    }

    pub fn ui_state(&self) -> UiState {
        UiState { tile_mode: self.tile_mode, theme: self.theme }
    }
}
