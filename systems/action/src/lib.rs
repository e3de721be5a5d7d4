#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that translates fixed-shape discrete actions into server commands.

use thiserror::Error;
use tower_gym_core::{
    ActionDescriptor, ActionKind, ActionSpace, GameCommand, GameInfo, GridAction, Position,
};

/// Caller contract violations detected while translating an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The action type index is outside the action catalogue.
    #[error("action index {index} outside catalogue of {len}")]
    ActionOutOfRange {
        /// Offending index.
        index: usize,
        /// Catalogue length.
        len: usize,
    },
    /// The tower type index is outside the tower catalogue.
    #[error("tower index {index} outside catalogue of {len}")]
    TowerOutOfRange {
        /// Offending index.
        index: usize,
        /// Catalogue length.
        len: usize,
    },
    /// The target cell lies outside the grid.
    #[error("cell ({column}, {row}) outside grid of {columns}x{rows}")]
    CellOutOfRange {
        /// Requested column.
        column: usize,
        /// Requested row.
        row: usize,
        /// Grid width in cells.
        columns: usize,
        /// Grid height in cells.
        rows: usize,
    },
}

/// Translator owning copies of the catalogues it reads.
#[derive(Clone, Debug)]
pub struct ActionTranslator {
    actions: Vec<ActionDescriptor>,
    tower_types: Vec<String>,
    cell_size: f64,
    columns: usize,
    rows: usize,
}

impl ActionTranslator {
    /// Creates a translator for the provided static configuration.
    #[must_use]
    pub fn new(info: &GameInfo) -> Self {
        Self {
            actions: info.actions.clone(),
            tower_types: info.towers.iter().map(|tower| tower.kind.clone()).collect(),
            cell_size: info.map.cell_size,
            columns: info.grid_columns(),
            rows: info.grid_rows(),
        }
    }

    /// Multi-discrete action space accepted by [`ActionTranslator::translate`].
    #[must_use]
    pub fn space(&self) -> ActionSpace {
        ActionSpace::new(
            self.actions.len(),
            self.tower_types.len(),
            self.columns,
            self.rows,
        )
    }

    /// World position of the centre of the cell at `(column, row)`.
    #[must_use]
    pub fn cell_center(&self, column: usize, row: usize) -> Position {
        Position::new(self.axis_center(column), self.axis_center(row))
    }

    fn axis_center(&self, index: usize) -> f64 {
        self.cell_size / 2.0 + self.cell_size * index as f64
    }

    /// Builds the server command for `action`.
    ///
    /// Only build actions read the tower and cell components; every other
    /// action kind ignores them.
    pub fn translate(&self, action: GridAction) -> Result<GameCommand, TranslateError> {
        let descriptor =
            self.actions
                .get(action.action_type)
                .ok_or(TranslateError::ActionOutOfRange {
                    index: action.action_type,
                    len: self.actions.len(),
                })?;

        let mut command = descriptor.instantiate();
        if descriptor.kind != ActionKind::BuildTower {
            return Ok(command);
        }

        let tower_type =
            self.tower_types
                .get(action.tower_type)
                .ok_or(TranslateError::TowerOutOfRange {
                    index: action.tower_type,
                    len: self.tower_types.len(),
                })?;

        if action.column >= self.columns || action.row >= self.rows {
            return Err(TranslateError::CellOutOfRange {
                column: action.column,
                row: action.row,
                columns: self.columns,
                rows: self.rows,
            });
        }

        command.set_tower_type(tower_type);
        command.set_position(self.cell_center(action.column, action.row));
        Ok(command)
    }
}
