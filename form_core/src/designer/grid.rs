//! The designer canvas: ordered rows that grow as the last one fills up.
//!
//! A grid starts with `max(min_rows, highest occupied row + 1)` rows. Dropping
//! into the last column of the last row appends a fresh row. Dropping below
//! the last row creates the missing rows first. A grid never holds more than
//! [`MAX_ROWS`] rows; locations at or past that bound are rejected.
//!
//! Moving a control is two independent steps, [`Grid::move_control`] out of
//! its old cell and [`Grid::drop`] into the new one. They are not atomic: if
//! the drop fails the control is already gone from its old cell.

use std::sync::Arc;

use tracing::debug;

use super::{DesignerControl, Row, RowCompleted, Wrapper};
use crate::errors::{FormError, FormResult};
use crate::metadata::{ControlMetadata, Location};
use crate::view::View;

/// Upper bound on the rows a grid will allocate.
pub const MAX_ROWS: usize = 1024;

#[derive(Debug)]
pub struct Grid {
    rows: Vec<Row>,
    columns: usize,
    min_rows: usize,
    wrapper: Arc<dyn Wrapper>,
}

impl Grid {
    /// Lay out existing `controls` at their recorded locations (row 0,
    /// column 0 when they carry none).
    pub fn new(
        controls: &[ControlMetadata],
        columns: usize,
        min_rows: usize,
        wrapper: Arc<dyn Wrapper>,
    ) -> FormResult<Self> {
        for control in controls {
            check_row(control.row(), control.location().map_or(0, |l| l.column))?;
        }
        let occupied = controls.iter().map(|c| c.row() + 1).max().unwrap_or(0);
        let mut grid = Grid {
            rows: Vec::new(),
            columns: columns.max(1),
            min_rows,
            wrapper,
        };
        grid.ensure_rows(occupied.max(min_rows).min(MAX_ROWS));

        for control in controls {
            let location = control.location().unwrap_or(Location::new(0, 0));
            let mut control = control.clone();
            control.properties.location = Some(location);
            grid.rows[location.row].place(location.column, control)?;
        }
        Ok(grid)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    fn ensure_rows(&mut self, count: usize) {
        while self.rows.len() < count {
            let row = Row::new(self.rows.len(), self.columns, Arc::clone(&self.wrapper));
            self.rows.push(row);
        }
    }

    /// Drop `metadata` at `location`.
    ///
    /// Returns the row completion signal, if the drop raised one.
    pub fn drop(&mut self, location: Location, metadata: ControlMetadata) -> FormResult<Option<RowCompleted>> {
        if location.column >= self.columns {
            return Err(FormError::invalid_location(
                location.row,
                location.column,
                format!("grid has {} columns", self.columns),
            ));
        }
        check_row(location.row, location.column)?;
        self.ensure_rows(location.row + 1);

        let completed = self.rows[location.row].drop(location.column, &metadata)?;
        if let Some(RowCompleted(row)) = completed {
            if row + 1 == self.rows.len() && self.rows.len() < MAX_ROWS {
                self.ensure_rows(row + 2);
                debug!(rows = self.rows.len(), "grid grew");
            }
        }
        Ok(completed)
    }

    /// Take the control `id` out of the cell at `location`.
    pub fn move_control(&mut self, location: Location, id: &str) -> Option<ControlMetadata> {
        self.rows.get_mut(location.row)?.move_out(location.column, id)
    }

    /// Move `id` from `from` to `to`. See the module docs on atomicity.
    pub fn relocate(&mut self, from: Location, id: &str, to: Location) -> FormResult<Option<RowCompleted>> {
        let metadata = self
            .move_control(from, id)
            .ok_or_else(|| FormError::unknown_control(id))?;
        self.drop(to, metadata)
    }

    /// Every definition in the grid, row by row.
    pub fn get_controls(&self) -> Vec<ControlMetadata> {
        self.rows.iter().flat_map(Row::row_definition).collect()
    }

    /// A placed designer control with `id`, searched in this grid only.
    pub fn find_control_mut(&mut self, id: &str) -> Option<&mut dyn DesignerControl> {
        self.rows.iter_mut().find_map(|row| row.control_mut(id))
    }

    pub fn render(&self) -> View {
        View::element("grid").with_children(self.rows.iter().map(Row::render).collect())
    }
}

fn check_row(row: usize, column: usize) -> FormResult<()> {
    if row >= MAX_ROWS {
        return Err(FormError::invalid_location(
            row,
            column,
            format!("grid holds at most {MAX_ROWS} rows"),
        ));
    }
    Ok(())
}
