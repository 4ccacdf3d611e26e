use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::board::Board;
use crate::error::{Result, StoreError};

/// JSON snapshot of the board kept between command invocations
#[derive(Debug, Clone)]
pub struct BoardStore {
    path: PathBuf,
}

impl BoardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BoardStore { path: path.into() }
    }

    /// Default snapshot location in the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dispatchboard", "dispatch-board")
            .map(|proj_dirs| proj_dirs.data_dir().join("board.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the board from disk; a missing snapshot yields an empty board
    pub fn load(&self) -> Result<Board> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No snapshot yet, starting empty board");
            return Ok(Board::new());
        }

        let data = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::LoadFailed(format!("{}: {}", self.path.display(), e)))?;

        let board: Board = serde_json::from_str(&data)
            .map_err(|e| StoreError::LoadFailed(format!("{}: {}", self.path.display(), e)))?;

        Ok(board)
    }

    /// Save the board to disk
    pub fn save(&self, board: &Board) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::SaveFailed(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let data = serde_json::to_string_pretty(board)?;

        fs::write(&self.path, data)
            .map_err(|e| StoreError::SaveFailed(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), "Saved board snapshot");
        Ok(())
    }
}
